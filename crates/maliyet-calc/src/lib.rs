//! # Maliyet Calc - 成本繼承計算引擎
//!
//! 核心計算引擎，提供：
//! - 尺寸 / 名稱-tier 分組（`partition`）
//! - 幾何推導量：面積、desi、角色數量（`geometry`)
//! - 貨運箱最適匹配（`boxfit`）
//! - Kaplama 成本建議（`kaplama`）
//! - 既有資料回填重建（`prefill`）
//! - 繼承執行器：讀 → 驗證 → 計算 → 單批提交（`executor`）

pub mod boxfit;
pub mod executor;
pub mod geometry;
pub mod kaplama;
pub mod partition;
pub mod prefill;

pub use boxfit::{fit_tolerance, suggest_box};
pub use executor::{InheritanceExecutor, ParentGuard, ParentLocks};
pub use kaplama::{ranked_options, suggest_coating, CoatingSuggestion, Confidence};
pub use partition::{partition, MappingEntry, MappingState, NameGroup, SelectionState, SizeGroup};
pub use prefill::{reconstruct_prefill, PrefillSuggestion};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 繼承作業的完整結果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InheritanceResult {
    /// 本次執行的唯一識別
    pub run_id: Uuid,

    /// Parent 名稱
    pub parent_name: String,

    /// 已寫入的 child 數量
    pub children_updated: usize,

    /// 記入 skip 清單的 child 數量（仍可能有部分寫入）
    pub children_skipped: usize,

    /// 逐 child 明細
    pub details: Vec<ChildDetail>,

    /// Skip 清單與原因
    pub skipped: Vec<SkippedChild>,

    /// 執行耗時（毫秒）
    pub elapsed_ms: Option<u128>,
}

/// 單一 child 的繼承明細
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChildDetail {
    pub child_sku: String,
    pub child_name: String,
    pub variation_size: String,

    /// 指派的 kargo 成本名稱
    pub kargo_cost_name: String,

    /// 指派的 kaplama 成本名稱清單（可為空）
    pub kaplama_cost_names: Vec<String>,

    /// 正規化貨運代碼，如 `M-13`
    pub kargo_kodu: Option<String>,

    /// 箱短邊（公分）
    pub kargo_en: Option<Decimal>,

    /// 箱長邊（公分）
    pub kargo_boy: Option<Decimal>,

    /// 箱高（公分）
    pub kargo_yukseklik: Option<Decimal>,

    /// 貨運重量（公斤）
    pub kargo_agirlik: Decimal,

    /// 計費 desi（0.5 進位）
    pub kargo_desi: Option<Decimal>,

    /// 產品面積（平方米）
    pub alan_m2: Option<Decimal>,

    /// 保麗龍數量 = 面積 × 1.2
    pub strafor: Option<Decimal>,

    /// 烤漆工時數量 = 面積 × 5
    pub boya_iscilik: Option<Decimal>,

    /// 鈑金數量 = 面積
    pub sac: Option<Decimal>,

    /// MDF 數量 = 面積
    pub mdf: Option<Decimal>,
}

/// Skip 清單項目
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedChild {
    pub child_sku: String,
    pub variation_size: String,
    pub reason: String,
}
