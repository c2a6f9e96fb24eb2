//! 自由文字分詞與鍍層 tier 判定
//!
//! 顏色 / 名稱標籤是土耳其語與英語混雜的自由文字，tier 判定以
//! 小寫 token 集合對固定詞彙表比對。gold/copper 規則先於 silver，
//! 兩者同時出現時以規則順序決定（確定性 tie-break）。

use std::collections::HashSet;
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// token 樣式：小寫拉丁字母、數字與土耳其重音字元
static TOKEN_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[a-z0-9çğıöşü]+").unwrap());

/// 分詞時剔除的功能詞（單位、連接詞、泛用材質詞）
static STOP_TOKENS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "cm", "x", "adet", "li", "ve", "ile", "icin", "için",
        "metal", "ahsap", "ahşap", "cam", "boyali", "boyalı", "kaplama",
    ]
    .into_iter()
    .collect()
});

/// silver tier 詞彙
static SILVER_TOKENS: Lazy<HashSet<&'static str>> =
    Lazy::new(|| ["silver", "gumus", "gümüş", "gümus"].into_iter().collect());

/// gold/copper tier 詞彙（含 bronze 與 rose gold）
static GOLD_COPPER_TOKENS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "gold", "altin", "altın",
        "copper", "bakir", "bakır",
        "bronze", "pirinc", "pirinç",
        "rosegold",
    ]
    .into_iter()
    .collect()
});

/// 鍍層 tier 分類
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum KaplamaTier {
    /// gold / copper / bronze / rose gold
    GoldCopper,
    /// silver
    Silver,
    /// 其他
    Other,
}

impl KaplamaTier {
    /// 群組鍵中使用的固定字串
    pub fn as_str(&self) -> &'static str {
        match self {
            KaplamaTier::GoldCopper => "gold_copper",
            KaplamaTier::Silver => "silver",
            KaplamaTier::Other => "other",
        }
    }
}

impl fmt::Display for KaplamaTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 將自由文字切為小寫 token 集合
///
/// 長度 1 的 token 與功能詞被剔除。大小寫折疊用 `to_lowercase`，
/// 已帶重音的土耳其字元保持原樣。
pub fn tokenize_text(value: &str) -> HashSet<String> {
    let lowered = value.to_lowercase();
    TOKEN_PATTERN
        .find_iter(&lowered)
        .map(|m| m.as_str().to_string())
        .filter(|t| t.chars().count() > 1 && !STOP_TOKENS.contains(t.as_str()))
        .collect()
}

/// 由多段文字判定鍍層 tier
///
/// 規則依序：gold/copper 詞彙 → silver 詞彙 → other。
pub fn detect_kaplama_tier<'a, I>(values: I) -> KaplamaTier
where
    I: IntoIterator<Item = &'a str>,
{
    let mut tokens: HashSet<String> = HashSet::new();
    for value in values {
        tokens.extend(tokenize_text(value));
    }
    if tokens.iter().any(|t| GOLD_COPPER_TOKENS.contains(t.as_str())) {
        return KaplamaTier::GoldCopper;
    }
    if tokens.iter().any(|t| SILVER_TOKENS.contains(t.as_str())) {
        return KaplamaTier::Silver;
    }
    KaplamaTier::Other
}

/// 組合 name-group 鍵：`名稱||tier`
///
/// 名稱去頭尾空白；空名稱回傳 None（無法成組）。
pub fn build_kaplama_group_key(name: &str, tier: KaplamaTier) -> Option<String> {
    let normalized = name.trim();
    if normalized.is_empty() {
        return None;
    }
    Some(format!("{}||{}", normalized, tier))
}

/// 將成本名稱清單正規化：去空白、剔除空值、大小寫不敏感去重
///
/// 保留第一次出現的拼寫與順序。
pub fn normalize_cost_name_list<I, S>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    for raw in values {
        let name = raw.as_ref().trim();
        if name.is_empty() {
            continue;
        }
        let key = name.to_lowercase();
        if seen.insert(key) {
            out.push(name.to_string());
        }
    }
    out
}
