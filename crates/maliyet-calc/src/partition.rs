//! 變體分組器
//!
//! 把 parent 底下的 child 投影為兩種短暫群組：
//! - size-group：以尺寸標籤（逐字、大小寫敏感）為鍵，貨運成本與重量的映射粒度
//! - name-group：以 `名稱||tier` 複合鍵為鍵，鍍層成本的映射粒度
//!
//! 群組永不持久化，每次繼承作業由當前 child 列重建。

use std::collections::{BTreeMap, BTreeSet, HashSet};

use maliyet_core::parse::parse_label_sides;
use maliyet_core::product::SIZE_FALLBACK_LABEL;
use maliyet_core::{build_kaplama_group_key, detect_kaplama_tier, tokenize_text};
use maliyet_core::{Child, KaplamaTier};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::geometry;

/// 尺寸群組（短暫投影）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SizeGroup {
    /// 尺寸標籤（逐字保留；無標籤時為 `(boyutsuz)`）
    pub size_label: String,

    /// 成員 SKU
    pub member_skus: Vec<String>,

    /// 成員寬度範圍
    pub min_en: Option<Decimal>,
    pub max_en: Option<Decimal>,

    /// 成員長度範圍
    pub min_boy: Option<Decimal>,
    pub max_boy: Option<Decimal>,

    /// 由最大尺寸推得的面積（m²）
    pub alan_m2: Option<Decimal>,

    /// 從標籤解析出的（長邊, 短邊），結構化尺寸的次要來源
    label_sides: Option<(Decimal, Decimal)>,

    /// 成員的最大長邊 / 最大短邊
    member_long: Option<Decimal>,
    member_short: Option<Decimal>,
}

impl SizeGroup {
    fn new(size_label: String) -> Self {
        let label_sides = parse_label_sides(&size_label);
        Self {
            size_label,
            member_skus: Vec::new(),
            min_en: None,
            max_en: None,
            min_boy: None,
            max_boy: None,
            alan_m2: None,
            label_sides,
            member_long: None,
            member_short: None,
        }
    }

    fn add_member(&mut self, child: &Child) {
        self.member_skus.push(child.child_sku.clone());

        if let Some(en) = child.en {
            self.min_en = Some(self.min_en.map_or(en, |v| v.min(en)));
            self.max_en = Some(self.max_en.map_or(en, |v| v.max(en)));
        }
        if let Some(boy) = child.boy {
            self.min_boy = Some(self.min_boy.map_or(boy, |v| v.min(boy)));
            self.max_boy = Some(self.max_boy.map_or(boy, |v| v.max(boy)));
        }
        if let Some(long) = child.long_side() {
            self.member_long = Some(self.member_long.map_or(long, |v| v.max(long)));
        }
        if let Some(short) = child.short_side() {
            self.member_short = Some(self.member_short.map_or(short, |v| v.max(short)));
        }
        self.alan_m2 = geometry::area(self.max_en, self.max_boy);
    }

    /// 群組的包絡（長邊, 短邊）
    ///
    /// 裝箱必須容納所有成員，取成員最大長邊與最大短邊，
    /// 並與標籤解析值合併（取大）補足結構化尺寸的缺漏。
    pub fn bounding_sides(&self) -> Option<(Decimal, Decimal)> {
        let merged = match (self.member_long.zip(self.member_short), self.label_sides) {
            (Some((ml, ms)), Some((ll, ls))) => Some((ml.max(ll), ms.max(ls))),
            (Some(sides), None) => Some(sides),
            (None, Some(sides)) => Some(sides),
            (None, None) => None,
        };
        merged
    }

    /// 成員數量
    pub fn member_count(&self) -> usize {
        self.member_skus.len()
    }
}

/// 名稱 + 鍍層 tier 群組（短暫投影）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NameGroup {
    /// 複合鍵 `名稱||tier`
    pub key: String,

    /// 顯示名稱（去頭尾空白）
    pub name: String,

    /// 鍍層 tier
    pub tier: KaplamaTier,

    /// 成員 SKU
    pub member_skus: Vec<String>,

    /// 觀察到的顏色標籤
    pub colors: BTreeSet<String>,

    /// 觀察到的尺寸標籤
    pub sizes: BTreeSet<String>,

    /// 名稱 + 顏色 + 尺寸的 token 集合（建議引擎用）
    pub tokens: HashSet<String>,
}

impl NameGroup {
    fn new(key: String, name: String, tier: KaplamaTier) -> Self {
        Self {
            key,
            name,
            tier,
            member_skus: Vec::new(),
            colors: BTreeSet::new(),
            sizes: BTreeSet::new(),
            tokens: HashSet::new(),
        }
    }

    /// 成員數量
    pub fn member_count(&self) -> usize {
        self.member_skus.len()
    }

    fn add_member(&mut self, child: &Child) {
        self.member_skus.push(child.child_sku.clone());
        self.tokens.extend(tokenize_text(&self.name));
        if let Some(color) = child.variation_color.as_deref() {
            let color = color.trim();
            if !color.is_empty() {
                self.colors.insert(color.to_string());
                self.tokens.extend(tokenize_text(color));
            }
        }
        let size = child.size_label().to_string();
        self.tokens.extend(tokenize_text(&size));
        self.sizes.insert(size);
    }
}

/// 把 child 列分割為 size-group 與 name-group
///
/// 每個 child 恰好落入一個 size-group 與一個 name-group。
/// 名稱為空的 child 以 SKU 充當群組名稱，不會被靜默剔除。
pub fn partition(children: &[Child]) -> (BTreeMap<String, SizeGroup>, BTreeMap<String, NameGroup>) {
    let mut size_groups: BTreeMap<String, SizeGroup> = BTreeMap::new();
    let mut name_groups: BTreeMap<String, NameGroup> = BTreeMap::new();

    for child in children {
        let size_label = child.size_label().to_string();
        size_groups
            .entry(size_label.clone())
            .or_insert_with(|| SizeGroup::new(size_label))
            .add_member(child);

        let name = {
            let trimmed = child.child_name.trim();
            if trimmed.is_empty() {
                child.child_sku.as_str()
            } else {
                trimmed
            }
        };
        let color = child.variation_color.as_deref().unwrap_or("");
        let tier = detect_kaplama_tier([name, color]);
        if let Some(key) = build_kaplama_group_key(name, tier) {
            name_groups
                .entry(key.clone())
                .or_insert_with(|| NameGroup::new(key, name.to_string(), tier))
                .add_member(child);
        }
    }

    (size_groups, name_groups)
}

/// 群組映射項的選取狀態
///
/// 顯式三態：空值但「使用者動過」的項不算未設定，
/// 自動建議不得覆寫。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectionState {
    /// 尚未設定
    Unset,
    /// 建議引擎自動填入
    AutoFilled,
    /// 使用者明確選取（或明確清空）
    UserConfirmed,
}

/// 單一群組鍵的映射項
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MappingEntry<T> {
    /// 選取值（UserConfirmed 且 None = 使用者明確清空）
    pub value: Option<T>,

    /// 選取狀態
    pub state: SelectionState,
}

impl<T> Default for MappingEntry<T> {
    fn default() -> Self {
        Self {
            value: None,
            state: SelectionState::Unset,
        }
    }
}

/// 群組鍵 → 映射項的持續狀態
///
/// child 集合變動重建群組時，仍在場的鍵保留既有選取、
/// 消失的鍵丟棄：合併而非重置，避免遺失操作者進行中的工作。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MappingState<T> {
    entries: BTreeMap<String, MappingEntry<T>>,
}

impl<T> MappingState<T> {
    /// 創建空狀態
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// 與新的群組鍵集合合併：保留仍在場的項，丟棄消失的鍵
    pub fn merge_keys<I, S>(&mut self, keys: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keep: BTreeSet<String> = keys.into_iter().map(|k| k.as_ref().to_string()).collect();
        self.entries.retain(|key, _| keep.contains(key));
        for key in keep {
            self.entries.entry(key).or_default();
        }
    }

    /// 自動建議填值：只在 Unset 時生效
    pub fn set_auto(&mut self, key: &str, value: T) {
        if let Some(entry) = self.entries.get_mut(key) {
            if entry.state == SelectionState::Unset {
                entry.value = Some(value);
                entry.state = SelectionState::AutoFilled;
            }
        }
    }

    /// 使用者明確選取：一律生效
    pub fn set_user(&mut self, key: &str, value: Option<T>) {
        if let Some(entry) = self.entries.get_mut(key) {
            entry.value = value;
            entry.state = SelectionState::UserConfirmed;
        }
    }

    /// 讀取映射項
    pub fn get(&self, key: &str) -> Option<&MappingEntry<T>> {
        self.entries.get(key)
    }

    /// 所有項目
    pub fn entries(&self) -> impl Iterator<Item = (&String, &MappingEntry<T>)> {
        self.entries.iter()
    }

    /// 仍未設定的鍵
    pub fn unset_keys(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(_, e)| e.state == SelectionState::Unset)
            .map(|(k, _)| k.as_str())
            .collect()
    }
}
