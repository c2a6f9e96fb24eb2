//! # Maliyet Core
//!
//! 成本繼承引擎的核心資料模型與類型定義

pub mod cost;
pub mod material;
pub mod parse;
pub mod product;
pub mod request;
pub mod token;

// Re-export 主要類型
pub use cost::{normalize_kargo_code, BoxCapacity, CostCategory, CostDefinition};
pub use material::{Material, MaterialRole};
pub use product::Child;
pub use request::InheritanceRequest;
pub use token::{
    build_kaplama_group_key, detect_kaplama_tier, normalize_cost_name_list, tokenize_text,
    KaplamaTier,
};

/// 成本繼承錯誤類型
#[derive(Debug, thiserror::Error)]
pub enum MaliyetError {
    #[error("找不到 parent 底下的產品: {0}")]
    ParentNotFound(String),

    #[error("映射不完整: {}", incomplete.join("; "))]
    IncompleteMapping { incomplete: Vec<String> },

    #[error("找不到原物料 id: {0}")]
    MaterialNotFound(i64),

    #[error("原物料角色不符: {0}")]
    MaterialRoleMismatch(String),

    #[error("找不到成本定義: {0}")]
    CostDefinitionNotFound(String),

    #[error("同一 parent 的繼承作業執行中: {0}")]
    InheritanceInProgress(String),

    #[error("存儲層錯誤: {0}")]
    StorageError(String),

    #[error("計算錯誤: {0}")]
    CalculationError(String),

    #[error("其他錯誤: {0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, MaliyetError>;
