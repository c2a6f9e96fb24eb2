//! 鍍層（kaplama）建議引擎
//!
//! 以 name-group 的 token 集合對啟用中的 kaplama 目錄打分：
//! token 重疊加權，tier 相符加分、tier 衝突扣分。建議只是預設值，
//! 採用 / 替換 / 加選都是使用者的明確動作；重跑不會移除既有選取
//! （由 `MappingState` 的三態保證）。

use maliyet_core::{detect_kaplama_tier, tokenize_text, CostDefinition, KaplamaTier};
use serde::{Deserialize, Serialize};

use crate::partition::NameGroup;

/// 建議信心等級
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Confidence {
    /// 低
    Dusuk,
    /// 中
    Orta,
    /// 高
    Yuksek,
}

impl Confidence {
    /// 回應中使用的固定字串
    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::Dusuk => "düşük",
            Confidence::Orta => "orta",
            Confidence::Yuksek => "yüksek",
        }
    }
}

/// 一筆鍍層建議
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoatingSuggestion {
    /// 建議的成本名稱
    pub cost_name: String,

    /// 信心等級
    pub confidence: Confidence,

    /// 原始分數
    pub score: i64,

    /// tier 相符次數
    pub tier_hits: u32,
}

/// token 重疊權重
const OVERLAP_WEIGHT: i64 = 6;
/// tier 相符加分
const TIER_MATCH_BONUS: i64 = 8;
/// tier 衝突扣分
const TIER_CONFLICT_PENALTY: i64 = 7;

fn score_definition(group: &NameGroup, def: &CostDefinition) -> (i64, u32) {
    let def_tokens = tokenize_text(&def.name);
    let overlap = def_tokens
        .iter()
        .filter(|t| group.tokens.contains(*t))
        .count() as i64;

    let mut score = overlap * OVERLAP_WEIGHT;
    let mut tier_hits = 0u32;

    if group.tier != KaplamaTier::Other {
        let def_tier = detect_kaplama_tier([def.name.as_str()]);
        if def_tier == group.tier {
            score += TIER_MATCH_BONUS;
            tier_hits += 1;
        } else if def_tier != KaplamaTier::Other {
            score -= TIER_CONFLICT_PENALTY;
        }
    }

    (score, tier_hits)
}

/// 為 name-group 建議最匹配的 kaplama 成本定義
///
/// 分數 ≤ 0 的候選不建議；完全無正分候選時回 None，
/// 由呼叫端提示人工選取。
pub fn suggest_coating(group: &NameGroup, catalog: &[CostDefinition]) -> Option<CoatingSuggestion> {
    let mut best: Option<(i64, u32, &CostDefinition)> = None;

    for def in catalog.iter().filter(|d| d.is_active_kaplama()) {
        let (score, tier_hits) = score_definition(group, def);
        if score <= 0 {
            continue;
        }
        let better = match best {
            None => true,
            Some((best_score, best_hits, best_def)) => {
                // 分數高者勝；同分比 tier 相符，再以名稱字典序決勝
                (score, tier_hits, std::cmp::Reverse(def.name.to_lowercase()))
                    > (
                        best_score,
                        best_hits,
                        std::cmp::Reverse(best_def.name.to_lowercase()),
                    )
            }
        };
        if better {
            best = Some((score, tier_hits, def));
        }
    }

    best.map(|(score, tier_hits, def)| {
        let confidence = if score >= 24 || tier_hits >= 2 {
            Confidence::Yuksek
        } else if score >= 10 {
            Confidence::Orta
        } else {
            Confidence::Dusuk
        };
        CoatingSuggestion {
            cost_name: def.name.clone(),
            confidence,
            score,
            tier_hits,
        }
    })
}

/// 呈現順序：tier 相符的子集在前，其餘在後
///
/// 只排序、永不剔除——完整目錄始終是可選項。
pub fn ranked_options<'a>(
    group: &NameGroup,
    catalog: &'a [CostDefinition],
) -> Vec<&'a CostDefinition> {
    let mut tier_matching: Vec<&CostDefinition> = Vec::new();
    let mut rest: Vec<&CostDefinition> = Vec::new();

    for def in catalog.iter().filter(|d| d.is_active_kaplama()) {
        if group.tier != KaplamaTier::Other
            && detect_kaplama_tier([def.name.as_str()]) == group.tier
        {
            tier_matching.push(def);
        } else {
            rest.push(def);
        }
    }

    tier_matching.extend(rest);
    tier_matching
}

#[cfg(test)]
mod tests {
    use super::*;
    use maliyet_core::Child;

    use crate::partition::partition;

    fn name_group(name: &str, color: &str) -> NameGroup {
        let mut child = Child::new("SKU-1".to_string(), name.to_string(), "P1".to_string());
        child.variation_color = Some(color.to_string());
        let (_, mut name_groups) = partition(std::slice::from_ref(&child));
        let key = name_groups.keys().next().unwrap().clone();
        name_groups.remove(&key).unwrap()
    }

    fn catalog() -> Vec<CostDefinition> {
        vec![
            CostDefinition::kaplama(1, "Gold Kaplama".to_string()),
            CostDefinition::kaplama(2, "Silver Kaplama".to_string()),
            CostDefinition::kaplama(3, "Eskitme".to_string()),
        ]
    }

    #[test]
    fn test_tier_match_suggested() {
        let group = name_group("Ayna Model A", "Gold");
        let suggestion = suggest_coating(&group, &catalog()).unwrap();
        assert_eq!(suggestion.cost_name, "Gold Kaplama");
        // token "gold" 重疊 ×6 + tier 相符 +8
        assert_eq!(suggestion.score, 14);
        assert_eq!(suggestion.confidence, Confidence::Orta);
    }

    #[test]
    fn test_conflicting_tier_penalized() {
        let group = name_group("Ayna Model A", "Silver");
        let suggestion = suggest_coating(&group, &catalog()).unwrap();
        assert_eq!(suggestion.cost_name, "Silver Kaplama");
    }

    #[test]
    fn test_no_signal_yields_none() {
        let group = name_group("Ayna Model A", "Matte Black");
        // other tier、無 token 重疊 → 不猜
        assert!(suggest_coating(&group, &catalog()).is_none());
    }

    #[test]
    fn test_ranked_options_never_exclude() {
        let group = name_group("Ayna Model A", "Gold");
        let catalog = catalog();
        let options = ranked_options(&group, &catalog);
        // tier 相符者在前，但完整目錄都在
        assert_eq!(options.len(), 3);
        assert_eq!(options[0].name, "Gold Kaplama");
    }

    #[test]
    fn test_inactive_definitions_ignored() {
        let catalog = vec![CostDefinition::kaplama(1, "Gold Kaplama".to_string())
            .with_is_active(false)];
        let group = name_group("Ayna", "Gold");
        assert!(suggest_coating(&group, &catalog).is_none());
        assert!(ranked_options(&group, &catalog).is_empty());
    }
}
