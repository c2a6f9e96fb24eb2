//! 既有資料回填重建
//!
//! 從 child 身上已寫入的貨運欄位、原物料數量與成本指派，
//! 以多數決反推出一份繼承映射草稿。編輯既有 parent 時
//! 先回填再微調，不必從零重建整份映射。

use std::collections::{BTreeMap, HashMap};

use maliyet_core::{build_kaplama_group_key, detect_kaplama_tier, normalize_kargo_code};
use maliyet_core::{Child, CostCategory, InheritanceRequest, MaliyetError, Material, Result};
use maliyet_store::CostStore;
use rust_decimal::Decimal;

use crate::geometry;

/// 回填重建出的映射草稿
#[derive(Debug, Clone, Default)]
pub struct PrefillSuggestion {
    pub parent_name: String,
    pub cost_map: BTreeMap<String, String>,
    pub weight_map: BTreeMap<String, Decimal>,
    pub kaplama_name_map: BTreeMap<String, Vec<String>>,
    pub materials: BTreeMap<i64, Decimal>,
    pub sac_material_id: Option<i64>,
    pub mdf_material_id: Option<i64>,
}

impl PrefillSuggestion {
    /// 是否有任何可回填的內容
    pub fn has_prefill(&self) -> bool {
        !self.cost_map.is_empty()
            || !self.weight_map.is_empty()
            || !self.kaplama_name_map.is_empty()
            || !self.materials.is_empty()
            || self.sac_material_id.is_some()
            || self.mdf_material_id.is_some()
    }

    /// 轉為可直接送執行器的請求
    pub fn into_request(self) -> InheritanceRequest {
        InheritanceRequest {
            parent_name: self.parent_name,
            cost_map: self.cost_map,
            weight_map: self.weight_map,
            kaplama_name_map: self.kaplama_name_map,
            materials: self.materials,
            sac_material_id: self.sac_material_id,
            mdf_material_id: self.mdf_material_id,
            allow_missing_kaplama: false,
        }
    }
}

/// 票箱：值 → 票數
type Ballot<T> = BTreeMap<T, usize>;

/// 名稱票的勝者：票數最多，平手取小寫字典序最小
fn winning_name(ballot: &Ballot<String>) -> Option<String> {
    ballot
        .iter()
        .min_by_key(|(name, count)| (usize::MAX - **count, name.to_lowercase()))
        .map(|(name, _)| name.clone())
}

/// 數值票的勝者：票數最多，平手取最小值
fn winning_value(ballot: &Ballot<Decimal>) -> Option<Decimal> {
    ballot
        .iter()
        .min_by_key(|(value, count)| (usize::MAX - **count, **value))
        .map(|(value, _)| *value)
}

/// Child 的 name-group 鍵（與 `partition` 相同規則）
fn child_group_key(child: &Child) -> Option<String> {
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
    build_kaplama_group_key(name, tier)
}

/// 從存儲層重建 parent 的映射草稿
pub fn reconstruct_prefill<S: CostStore>(store: &S, parent_name: &str) -> Result<PrefillSuggestion> {
    let children = store.fetch_children(parent_name)?;
    if children.is_empty() {
        return Err(MaliyetError::ParentNotFound(parent_name.to_string()));
    }
    let materials = store.fetch_materials()?;
    let definitions = store.fetch_cost_definitions()?;
    let product_materials = store.fetch_product_materials(parent_name)?;
    let assigned_costs = store.fetch_assigned_costs(parent_name)?;

    tracing::debug!(
        "回填重建：parent={}，child {} 筆，指派 {} 筆",
        parent_name,
        children.len(),
        assigned_costs.len()
    );

    // 目錄上的 kargo 名稱（小寫），名稱不在目錄時再用代碼形狀判斷
    let kargo_catalog: HashMap<String, &str> = definitions
        .iter()
        .filter(|d| d.category == CostCategory::Kargo)
        .map(|d| (d.name.to_lowercase(), d.name.as_str()))
        .collect();
    let is_kargo_name =
        |name: &str| kargo_catalog.contains_key(&name.to_lowercase()) || normalize_kargo_code(name).is_some();

    let mut assigned_by_sku: HashMap<&str, Vec<&str>> = HashMap::new();
    for cost in &assigned_costs {
        if cost.assigned {
            assigned_by_sku
                .entry(cost.child_sku.as_str())
                .or_default()
                .push(cost.cost_name.as_str());
        }
    }

    let mut cost_votes: BTreeMap<String, Ballot<String>> = BTreeMap::new();
    let mut weight_votes: BTreeMap<String, Ballot<Decimal>> = BTreeMap::new();
    let mut kaplama_votes: BTreeMap<String, Ballot<String>> = BTreeMap::new();
    let mut code_by_size: BTreeMap<String, Vec<String>> = BTreeMap::new();

    for child in &children {
        let size = child.size_label().to_string();

        if let Some(names) = assigned_by_sku.get(child.child_sku.as_str()) {
            for name in names {
                if is_kargo_name(name) {
                    *cost_votes
                        .entry(size.clone())
                        .or_default()
                        .entry(name.to_string())
                        .or_insert(0) += 1;
                } else if let Some(key) = child_group_key(child) {
                    *kaplama_votes
                        .entry(key)
                        .or_default()
                        .entry(name.to_string())
                        .or_insert(0) += 1;
                }
            }
        }

        if let Some(weight) = child.kargo_agirlik {
            *weight_votes
                .entry(size.clone())
                .or_default()
                .entry(weight.round_dp(6))
                .or_insert(0) += 1;
        }

        if let Some(code) = &child.kargo_kodu {
            code_by_size.entry(size).or_default().push(code.clone());
        }
    }

    let mut suggestion = PrefillSuggestion {
        parent_name: parent_name.to_string(),
        ..Default::default()
    };

    for (size, ballot) in &cost_votes {
        if let Some(name) = winning_name(ballot) {
            suggestion.cost_map.insert(size.clone(), name);
        }
    }
    // 成本指派列缺失時，退回 child 身上的貨運代碼找成本定義
    for (size, codes) in &code_by_size {
        if suggestion.cost_map.contains_key(size) {
            continue;
        }
        let mut ballot: Ballot<String> = BTreeMap::new();
        for code in codes {
            *ballot.entry(code.clone()).or_insert(0) += 1;
        }
        if let Some(code) = winning_name(&ballot) {
            let name = definitions
                .iter()
                .filter(|d| {
                    d.category == CostCategory::Kargo
                        && d.kargo_code.as_deref() == Some(code.as_str())
                })
                .map(|d| d.name.clone())
                .min_by_key(|name| name.to_lowercase());
            if let Some(name) = name {
                suggestion.cost_map.insert(size.clone(), name);
            }
        }
    }

    for (size, ballot) in &weight_votes {
        if let Some(weight) = winning_value(ballot) {
            suggestion.weight_map.insert(size.clone(), weight);
        }
    }

    for (key, ballot) in &kaplama_votes {
        let mut names: Vec<String> = ballot.keys().cloned().collect();
        names.sort_by_key(|n| n.to_lowercase());
        if !names.is_empty() {
            suggestion.kaplama_name_map.insert(key.clone(), names);
        }
    }

    reconstruct_materials(&mut suggestion, &children, &materials, &product_materials);

    Ok(suggestion)
}

/// 重建原物料數量與 sac / mdf 選取
fn reconstruct_materials(
    suggestion: &mut PrefillSuggestion,
    children: &[Child],
    materials: &[Material],
    product_materials: &[maliyet_store::ProductMaterial],
) {
    use maliyet_core::MaterialRole;

    let by_id: HashMap<i64, &Material> = materials.iter().map(|m| (m.id, m)).collect();
    let area_by_sku: HashMap<&str, Option<Decimal>> = children
        .iter()
        .map(|c| (c.child_sku.as_str(), geometry::area(c.en, c.boy)))
        .collect();

    // (material_id, sku) → 數量
    let mut quantity_rows: HashMap<i64, Vec<(&str, Decimal)>> = HashMap::new();
    for row in product_materials {
        quantity_rows
            .entry(row.material_id)
            .or_default()
            .push((row.child_sku.as_str(), row.quantity.round_dp(6)));
    }

    // 角色可選原物料：有幾個 child 的數量恰等於自身面積
    let pick_for_role = |role: MaterialRole| -> Option<i64> {
        let mut candidates: Vec<(i64, usize, usize)> = materials
            .iter()
            .filter(|m| m.role == role)
            .filter_map(|m| {
                let rows = quantity_rows.get(&m.id)?;
                let matches = rows
                    .iter()
                    .filter(|(sku, qty)| area_by_sku.get(sku).copied().flatten() == Some(*qty))
                    .count();
                Some((m.id, matches, rows.len()))
            })
            .collect();
        candidates.sort_by_key(|&(id, matches, presence)| {
            (usize::MAX - matches, usize::MAX - presence, id)
        });
        candidates.first().map(|&(id, _, _)| id)
    };
    suggestion.sac_material_id = pick_for_role(MaterialRole::SheetSelectable);
    suggestion.mdf_material_id = pick_for_role(MaterialRole::MdfSelectable);

    for (&material_id, rows) in &quantity_rows {
        let material = match by_id.get(&material_id) {
            Some(m) => m,
            None => continue,
        };
        // 自動推導角色與 sac/mdf 選取不進手動數量
        if material.role.is_auto_derived() {
            continue;
        }
        if Some(material_id) == suggestion.sac_material_id
            || Some(material_id) == suggestion.mdf_material_id
        {
            continue;
        }
        let mut ballot: Ballot<Decimal> = BTreeMap::new();
        for (_, qty) in rows {
            *ballot.entry(*qty).or_insert(0) += 1;
        }
        if let Some(quantity) = winning_value(&ballot) {
            suggestion.materials.insert(material_id, quantity);
        }
    }
}
