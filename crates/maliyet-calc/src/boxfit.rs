//! 貨運箱最佳匹配
//!
//! 在有限的箱目錄中為 size-group 選最緊的箱：先過濾裝得下的候選
//! （含 0.5cm 量測容差），再取底面積最小者；同面積以長邊鬆量、
//! 短邊鬆量依序決勝，結果恆為單一確定贏家。找不到就回 None，
//! 交給人工指定，絕不退回任意箱。

use maliyet_core::CostDefinition;
use rust_decimal::Decimal;

use crate::partition::SizeGroup;

/// 量測 / 捨入容差（公分）；只放寬、不收緊
pub fn fit_tolerance() -> Decimal {
    Decimal::new(5, 1)
}

/// 為 size-group 建議最合身的 kargo 成本定義
///
/// 群組完全無尺寸（結構化與標籤皆缺）時無法匹配，回傳 None。
pub fn suggest_box<'a>(
    group: &SizeGroup,
    catalog: &'a [CostDefinition],
) -> Option<&'a CostDefinition> {
    let (product_long, product_short) = group.bounding_sides()?;
    let tolerance = fit_tolerance();

    catalog
        .iter()
        .filter(|def| def.is_active_kargo())
        .filter_map(|def| def.capacity.map(|cap| (def, cap)))
        .filter(|(_, cap)| {
            product_long <= cap.max_long + tolerance && product_short <= cap.max_short + tolerance
        })
        .min_by_key(|(_, cap)| {
            (
                cap.footprint(),
                cap.max_long - product_long,
                cap.max_short - product_short,
            )
        })
        .map(|(def, _)| def)
}

#[cfg(test)]
mod tests {
    use super::*;
    use maliyet_core::{BoxCapacity, Child};
    use std::str::FromStr;

    use crate::partition::partition;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn group(en: &str, boy: &str) -> SizeGroup {
        let child = Child::new("SKU-1".to_string(), "Ayna".to_string(), "P1".to_string())
            .with_dims(d(en), d(boy));
        let (mut size_groups, _) = partition(&[child]);
        size_groups.remove("(boyutsuz)").unwrap()
    }

    fn kargo(id: i64, name: &str, long: &str, short: &str) -> CostDefinition {
        CostDefinition::kargo(id, name.to_string(), BoxCapacity::new(d(long), d(short)))
    }

    #[test]
    fn test_picks_tightest_fitting_box() {
        let catalog = vec![
            kargo(1, "M-1", "100", "80"),
            kargo(2, "M-2", "50", "40"),
            kargo(3, "M-3", "60", "50"),
        ];
        let best = suggest_box(&group("30", "45"), &catalog).unwrap();
        // 三個都裝得下，最小底面積的 M-2 勝出
        assert_eq!(best.name, "M-2");
    }

    #[test]
    fn test_tolerance_is_a_fit_margin() {
        let catalog = vec![kargo(1, "M-1", "45", "30")];
        // 長邊 45.5 = 上限 45 + 容差 0.5，仍算合身
        assert!(suggest_box(&group("30", "45.5"), &catalog).is_some());
        // 超過容差就不合身
        assert!(suggest_box(&group("30", "45.6"), &catalog).is_none());
    }

    #[test]
    fn test_equal_area_tie_breaks_by_long_slack() {
        // 底面積相同（1200），長邊鬆量不同
        let catalog = vec![
            kargo(1, "M-GENIS", "60", "20"),
            kargo(2, "M-DAR", "40", "30"),
        ];
        let best = suggest_box(&group("20", "38"), &catalog).unwrap();
        // M-DAR 長邊鬆量 2，M-GENIS 長邊鬆量 22
        assert_eq!(best.name, "M-DAR");
    }

    #[test]
    fn test_no_fit_returns_none() {
        let catalog = vec![kargo(1, "M-1", "30", "20")];
        assert!(suggest_box(&group("50", "90"), &catalog).is_none());
    }

    #[test]
    fn test_inactive_and_kaplama_entries_ignored() {
        let catalog = vec![
            kargo(1, "M-1", "100", "80").with_is_active(false),
            CostDefinition::kaplama(2, "Gold Kaplama".to_string()),
        ];
        assert!(suggest_box(&group("30", "45"), &catalog).is_none());
    }

    #[test]
    fn test_suggested_box_fits_all_members() {
        // 兩個成員，包絡 45 x 40
        let children = vec![
            Child::new("SKU-1".to_string(), "Ayna".to_string(), "P1".to_string())
                .with_dims(d("30"), d("45"))
                .with_variation_size("Standart".to_string()),
            Child::new("SKU-2".to_string(), "Ayna".to_string(), "P1".to_string())
                .with_dims(d("40"), d("42"))
                .with_variation_size("Standart".to_string()),
        ];
        let (size_groups, _) = partition(&children);
        let group = &size_groups["Standart"];

        let catalog = vec![kargo(1, "M-KUCUK", "46", "35"), kargo(2, "M-BUYUK", "50", "42")];
        let best = suggest_box(group, &catalog).unwrap();
        // M-KUCUK 裝得下第一個成員但短邊擋下第二個成員
        assert_eq!(best.name, "M-BUYUK");

        let (long, short) = group.bounding_sides().unwrap();
        let cap = best.capacity.unwrap();
        assert!(long <= cap.max_long + d("0.5"));
        assert!(short <= cap.max_short + d("0.5"));
    }
}
