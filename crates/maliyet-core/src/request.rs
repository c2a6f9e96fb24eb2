//! 繼承作業請求模型

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 映射中的萬用鍵：未被明確映射的群組以此鍵回退
pub const WILDCARD_KEY: &str = "*";

/// Parent-to-Child 成本繼承請求
///
/// 整份映射一次組裝、一次提交；執行器先整體驗證再計算，
/// 不做部分寫入。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InheritanceRequest {
    /// Parent 名稱（歸組鍵）
    pub parent_name: String,

    /// 尺寸標籤 → kargo 成本名稱
    pub cost_map: BTreeMap<String, String>,

    /// 尺寸標籤 → 貨運重量（公斤，≥ 0）
    pub weight_map: BTreeMap<String, Decimal>,

    /// `名稱||tier` 群組鍵 → kaplama 成本名稱清單
    pub kaplama_name_map: BTreeMap<String, Vec<String>>,

    /// 原物料ID → 數量（套用到 parent 下所有 child）
    pub materials: BTreeMap<i64, Decimal>,

    /// 使用者選定的鈑金原物料（數量 = 面積）
    pub sac_material_id: Option<i64>,

    /// 使用者選定的 MDF 原物料（數量 = 面積）
    pub mdf_material_id: Option<i64>,

    /// true 時允許 name-group 沒有任何 kaplama 映射
    pub allow_missing_kaplama: bool,
}

impl InheritanceRequest {
    /// 創建新的繼承請求
    pub fn new(parent_name: String) -> Self {
        Self {
            parent_name,
            ..Default::default()
        }
    }

    /// 建構器模式：加入一筆尺寸 → kargo 成本映射
    pub fn with_cost(mut self, size: &str, cost_name: &str) -> Self {
        self.cost_map.insert(size.to_string(), cost_name.to_string());
        self
    }

    /// 建構器模式：加入一筆尺寸 → 重量映射
    pub fn with_weight(mut self, size: &str, weight: Decimal) -> Self {
        self.weight_map.insert(size.to_string(), weight);
        self
    }

    /// 建構器模式：加入一筆 name-group → kaplama 映射
    pub fn with_kaplama(mut self, group_key: &str, cost_names: Vec<String>) -> Self {
        self.kaplama_name_map.insert(group_key.to_string(), cost_names);
        self
    }

    /// 建構器模式：加入一筆原物料數量
    pub fn with_material(mut self, material_id: i64, quantity: Decimal) -> Self {
        self.materials.insert(material_id, quantity);
        self
    }

    /// 建構器模式：設置鈑金原物料
    pub fn with_sac_material(mut self, material_id: i64) -> Self {
        self.sac_material_id = Some(material_id);
        self
    }

    /// 建構器模式：設置 MDF 原物料
    pub fn with_mdf_material(mut self, material_id: i64) -> Self {
        self.mdf_material_id = Some(material_id);
        self
    }

    /// 建構器模式：允許缺漏 kaplama 映射
    pub fn with_allow_missing_kaplama(mut self, allow: bool) -> Self {
        self.allow_missing_kaplama = allow;
        self
    }

    /// 以群組鍵查 kargo 成本名稱（精確鍵優先，萬用鍵回退）
    pub fn resolve_cost(&self, size: &str) -> Option<&str> {
        let lookup = |key: &str| {
            self.cost_map
                .get(key)
                .map(String::as_str)
                .filter(|s| !s.trim().is_empty())
        };
        lookup(size).or_else(|| lookup(WILDCARD_KEY))
    }

    /// 以群組鍵查重量（精確鍵優先，萬用鍵回退）
    pub fn resolve_weight(&self, size: &str) -> Option<Decimal> {
        self.weight_map
            .get(size)
            .or_else(|| self.weight_map.get(WILDCARD_KEY))
            .copied()
    }
}
