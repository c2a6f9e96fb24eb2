//! 原物料模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 原物料角色
///
/// 角色決定繼承作業中數量的來源：`None` 角色的數量只接受使用者映射，
/// 其餘角色的數量一律由面積推導，絕不接受直接輸入。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MaterialRole {
    /// 一般原物料（數量來自使用者映射）
    None,
    /// 保麗龍 / 隔熱層（數量 = 面積 × 1.2）
    Insulation,
    /// 油漆 + 工資（數量 = 面積 × 5）
    PaintLabor,
    /// 可選鈑金（數量 = 面積，使用者指定一項）
    SheetSelectable,
    /// 可選 MDF（數量 = 面積，使用者指定一項）
    MdfSelectable,
}

impl MaterialRole {
    /// 是否為面積自動推導角色
    pub fn is_auto_derived(&self) -> bool {
        !matches!(self, MaterialRole::None)
    }
}

/// 原物料目錄項目
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Material {
    /// 原物料ID
    pub id: i64,

    /// 名稱
    pub name: String,

    /// 計量單位（m²、kg、lt、adet）
    pub unit: String,

    /// 單價
    pub unit_price: Decimal,

    /// 幣別
    pub currency: String,

    /// 角色（推導規則以此為準，不做名稱比對）
    pub role: MaterialRole,

    /// 是否啟用
    pub is_active: bool,
}

impl Material {
    /// 創建新的原物料
    pub fn new(id: i64, name: String, unit: String) -> Self {
        Self {
            id,
            name,
            unit,
            unit_price: Decimal::ZERO,
            currency: "TRY".to_string(),
            role: MaterialRole::None,
            is_active: true,
        }
    }

    /// 建構器模式：設置角色
    pub fn with_role(mut self, role: MaterialRole) -> Self {
        self.role = role;
        self
    }

    /// 建構器模式：設置單價
    pub fn with_unit_price(mut self, price: Decimal) -> Self {
        self.unit_price = price;
        self
    }
}
