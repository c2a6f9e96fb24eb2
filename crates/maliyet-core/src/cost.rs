//! 成本定義模型（kargo / kaplama）

use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 貨運代碼樣式：`m- 13`、`M -13C` 等皆正規化為 `M-13` 形式
static KARGO_CODE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([A-Z])\s*-\s*([0-9]+[A-Z]?)").unwrap());

/// 成本分類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CostCategory {
    /// 貨運
    Kargo,
    /// 鍍層
    Kaplama,
}

/// 貨運箱容量上限
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BoxCapacity {
    /// 長邊上限（公分）
    pub max_long: Decimal,

    /// 短邊上限（公分）
    pub max_short: Decimal,

    /// 高（公分，體積 desi 計算用，可缺）
    pub yukseklik: Option<Decimal>,
}

impl BoxCapacity {
    /// 創建新的箱容量（長短邊自動取大小，方向無關）
    pub fn new(en: Decimal, boy: Decimal) -> Self {
        Self {
            max_long: en.max(boy),
            max_short: en.min(boy),
            yukseklik: None,
        }
    }

    /// 建構器模式：設置高度
    pub fn with_yukseklik(mut self, yukseklik: Decimal) -> Self {
        self.yukseklik = Some(yukseklik);
        self
    }

    /// 箱底面積（長邊 × 短邊），裝箱匹配的主要排序鍵
    pub fn footprint(&self) -> Decimal {
        self.max_long * self.max_short
    }
}

/// 成本定義：一個命名的成本項目
///
/// kargo 項目內嵌箱容量與貨運代碼；kaplama 項目只有名稱與啟用旗標。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostDefinition {
    /// 成本定義ID
    pub id: i64,

    /// 名稱（唯一）
    pub name: String,

    /// 分類
    pub category: CostCategory,

    /// 貨運代碼（只有 kargo 分類有值）
    pub kargo_code: Option<String>,

    /// 箱容量（只有 kargo 分類有值）
    pub capacity: Option<BoxCapacity>,

    /// 是否啟用
    pub is_active: bool,
}

impl CostDefinition {
    /// 創建 kargo 成本定義（代碼先由名稱正規化，失敗則留空）
    pub fn kargo(id: i64, name: String, capacity: BoxCapacity) -> Self {
        let kargo_code = normalize_kargo_code(&name);
        Self {
            id,
            name,
            category: CostCategory::Kargo,
            kargo_code,
            capacity: Some(capacity),
            is_active: true,
        }
    }

    /// 創建 kaplama 成本定義
    pub fn kaplama(id: i64, name: String) -> Self {
        Self {
            id,
            name,
            category: CostCategory::Kaplama,
            kargo_code: None,
            capacity: None,
            is_active: true,
        }
    }

    /// 建構器模式：設置貨運代碼（自動正規化）
    pub fn with_kargo_code(mut self, code: &str) -> Self {
        self.kargo_code = normalize_kargo_code(code);
        self
    }

    /// 建構器模式：設置啟用旗標
    pub fn with_is_active(mut self, active: bool) -> Self {
        self.is_active = active;
        self
    }

    /// 是否為啟用中的 kargo 定義
    pub fn is_active_kargo(&self) -> bool {
        self.is_active && self.category == CostCategory::Kargo
    }

    /// 是否為啟用中的 kaplama 定義
    pub fn is_active_kaplama(&self) -> bool {
        self.is_active && self.category == CostCategory::Kaplama
    }
}

/// 將 `m- 13`、`M -13c` 等自由格式正規化為 `M-13` 形式
pub fn normalize_kargo_code(value: &str) -> Option<String> {
    let upper = value.trim().to_uppercase();
    if upper.is_empty() {
        return None;
    }
    KARGO_CODE_PATTERN
        .captures(&upper)
        .map(|caps| format!("{}-{}", &caps[1], &caps[2]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("M-13", Some("M-13"))]
    #[case("m- 13", Some("M-13"))]
    #[case("M - 13C", Some("M-13C"))]
    #[case("Kargo m-7 standart", Some("M-7"))]
    #[case("Gold Kaplama", None)]
    #[case("", None)]
    fn test_normalize_kargo_code(#[case] input: &str, #[case] expected: Option<&str>) {
        assert_eq!(normalize_kargo_code(input).as_deref(), expected);
    }

    #[test]
    fn test_box_capacity_orientation_free() {
        let cap = BoxCapacity::new(Decimal::from(30), Decimal::from(45));
        assert_eq!(cap.max_long, Decimal::from(45));
        assert_eq!(cap.max_short, Decimal::from(30));
        assert_eq!(cap.footprint(), Decimal::from(1350));
    }

    #[test]
    fn test_kargo_definition_gets_code_from_name() {
        let def = CostDefinition::kargo(
            1,
            "M-13".to_string(),
            BoxCapacity::new(Decimal::from(60), Decimal::from(40)),
        );
        assert_eq!(def.kargo_code.as_deref(), Some("M-13"));
        assert!(def.is_active_kargo());
        assert!(!def.is_active_kaplama());
    }
}
