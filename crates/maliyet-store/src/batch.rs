//! 寫入批次模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// child 貨運欄位更新
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShippingUpdate {
    /// child SKU
    pub child_sku: String,

    /// 貨運代碼
    pub kargo_kodu: Option<String>,

    /// 箱寬（短邊上限）
    pub kargo_en: Option<Decimal>,

    /// 箱長（長邊上限）
    pub kargo_boy: Option<Decimal>,

    /// 箱高
    pub kargo_yukseklik: Option<Decimal>,

    /// 貨運重量（公斤）
    pub kargo_agirlik: Decimal,

    /// 計費單位 desi
    pub kargo_desi: Option<Decimal>,
}

/// 產品-原物料數量 upsert
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaterialUpsert {
    /// child SKU
    pub child_sku: String,

    /// 原物料ID
    pub material_id: i64,

    /// 數量
    pub quantity: Decimal,
}

/// 單一 child 的成本指派寫入
///
/// kargo 指派取代既有的 kargo 指派（不並存）；
/// kaplama 清單整組取代該 child 先前的 kaplama 集合（不與舊值合併）。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostAssignmentWrite {
    /// child SKU
    pub child_sku: String,

    /// kargo 成本名稱
    pub kargo_cost_name: String,

    /// kaplama 成本名稱清單（可為空）
    pub kaplama_cost_names: Vec<String>,
}

/// 一次繼承作業的完整寫入批次
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WriteBatch {
    /// 貨運欄位更新
    pub shipping_updates: Vec<ShippingUpdate>,

    /// 原物料數量 upsert
    pub material_upserts: Vec<MaterialUpsert>,

    /// 成本指派寫入
    pub cost_assignments: Vec<CostAssignmentWrite>,
}

impl WriteBatch {
    /// 創建空批次
    pub fn new() -> Self {
        Self::default()
    }

    /// 批次是否為空
    pub fn is_empty(&self) -> bool {
        self.shipping_updates.is_empty()
            && self.material_upserts.is_empty()
            && self.cost_assignments.is_empty()
    }

    /// 批次內寫入筆數合計
    pub fn len(&self) -> usize {
        self.shipping_updates.len() + self.material_upserts.len() + self.cost_assignments.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_batch() {
        let batch = WriteBatch::new();
        assert!(batch.is_empty());
        assert_eq!(batch.len(), 0);
    }

    #[test]
    fn test_batch_len() {
        let mut batch = WriteBatch::new();
        batch.material_upserts.push(MaterialUpsert {
            child_sku: "SKU-1".to_string(),
            material_id: 1,
            quantity: Decimal::from(2),
        });
        batch.cost_assignments.push(CostAssignmentWrite {
            child_sku: "SKU-1".to_string(),
            kargo_cost_name: "M-13".to_string(),
            kaplama_cost_names: vec!["Gold Kaplama".to_string()],
        });
        assert!(!batch.is_empty());
        assert_eq!(batch.len(), 2);
    }
}
