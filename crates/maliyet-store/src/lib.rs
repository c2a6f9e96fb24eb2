//! # Maliyet Store
//!
//! 持久化抽象層：繼承引擎只透過 [`CostStore`] 介面讀寫，
//! 不感知具體存儲技術。寫入一律以 [`WriteBatch`] 單一批次提交。

pub mod batch;
pub mod memory;

// Re-export 主要類型
pub use batch::{CostAssignmentWrite, MaterialUpsert, ShippingUpdate, WriteBatch};
pub use memory::MemoryStore;

use chrono::{DateTime, Utc};
use maliyet_core::{Child, CostDefinition, Material, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 產品-原物料指派（每對一列）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductMaterial {
    /// child SKU
    pub child_sku: String,

    /// 原物料ID
    pub material_id: i64,

    /// 數量
    pub quantity: Decimal,

    /// 最後更新時間
    pub updated_at: DateTime<Utc>,
}

/// 產品-成本指派（每對一列，assigned 旗標表示目前生效）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductCost {
    /// child SKU
    pub child_sku: String,

    /// 成本名稱
    pub cost_name: String,

    /// 是否生效
    pub assigned: bool,

    /// 最後更新時間
    pub updated_at: DateTime<Utc>,
}

/// 持久化介面
///
/// 執行器以固定順序呼叫：讀全部輸入 → 計算 → 一次提交批次。
/// 瞬時失敗的重試是實作方的責任。
pub trait CostStore: Send + Sync {
    /// 讀取 parent 底下所有啟用中的 child
    fn fetch_children(&self, parent_name: &str) -> Result<Vec<Child>>;

    /// 讀取啟用中的原物料目錄
    fn fetch_materials(&self) -> Result<Vec<Material>>;

    /// 讀取成本定義目錄（含 kargo 箱容量）
    fn fetch_cost_definitions(&self) -> Result<Vec<CostDefinition>>;

    /// 讀取 parent 底下所有產品-原物料指派
    fn fetch_product_materials(&self, parent_name: &str) -> Result<Vec<ProductMaterial>>;

    /// 讀取 parent 底下所有生效中的產品-成本指派
    fn fetch_assigned_costs(&self, parent_name: &str) -> Result<Vec<ProductCost>>;

    /// 以單一邏輯單位提交寫入批次（不允許部分提交）
    fn commit(&self, batch: WriteBatch) -> Result<()>;
}
