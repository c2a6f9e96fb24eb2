//! 繼承執行器
//!
//! 單一寫入入口：讀全部輸入 → 整體驗證 → 純計算 → 單一批次提交。
//! 驗證失敗時整個作業原子拒絕，零寫入。同一 parent 的並發執行
//! 以 parent 級鎖註冊表擋下，回傳可重試的衝突錯誤。

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex};

use maliyet_core::{
    build_kaplama_group_key, detect_kaplama_tier, normalize_cost_name_list, normalize_kargo_code,
};
use maliyet_core::{
    BoxCapacity, Child, CostDefinition, InheritanceRequest, MaliyetError, Material, MaterialRole,
    Result,
};
use maliyet_store::{CostAssignmentWrite, CostStore, MaterialUpsert, ShippingUpdate, WriteBatch};
use rayon::prelude::*;
use rust_decimal::Decimal;

use crate::partition::{partition, NameGroup, SizeGroup};
use crate::{ChildDetail, InheritanceResult, SkippedChild};
use crate::geometry;

/// 缺尺寸 child 的 skip 原因
pub const REASON_MISSING_DIMENSIONS: &str = "missing dimensions";

/// 進行中 parent 的鎖註冊表
///
/// 同一 parent 同時只允許一個繼承作業；第二個請求直接被拒，
/// 不排隊也不靜默合併。
#[derive(Debug, Clone, Default)]
pub struct ParentLocks {
    inflight: Arc<Mutex<HashSet<String>>>,
}

impl ParentLocks {
    /// 創建空註冊表
    pub fn new() -> Self {
        Self::default()
    }

    /// 嘗試取得 parent 鎖；已有作業進行中則回傳衝突錯誤
    pub fn acquire(&self, parent_name: &str) -> Result<ParentGuard> {
        let mut inflight = self.inflight.lock().unwrap();
        if !inflight.insert(parent_name.to_string()) {
            return Err(MaliyetError::InheritanceInProgress(parent_name.to_string()));
        }
        Ok(ParentGuard {
            parent_name: parent_name.to_string(),
            inflight: Arc::clone(&self.inflight),
        })
    }
}

/// RAII 鎖：釋放時移除 in-flight 標記
#[derive(Debug)]
pub struct ParentGuard {
    parent_name: String,
    inflight: Arc<Mutex<HashSet<String>>>,
}

impl Drop for ParentGuard {
    fn drop(&mut self) {
        self.inflight.lock().unwrap().remove(&self.parent_name);
    }
}

/// 一個 size-group 驗證後的決議值
#[derive(Debug, Clone)]
struct SizeResolution {
    cost_name: String,
    kargo_kodu: Option<String>,
    capacity: Option<BoxCapacity>,
    weight: Decimal,
}

/// 正規化後的 kaplama 映射（精確鍵 + 小寫鍵回退）
struct KaplamaLookup {
    exact: BTreeMap<String, Vec<String>>,
    folded: HashMap<String, Vec<String>>,
}

impl KaplamaLookup {
    fn build(request: &InheritanceRequest) -> Self {
        let mut exact = BTreeMap::new();
        let mut folded = HashMap::new();
        for (key, names) in &request.kaplama_name_map {
            let key = key.trim();
            if key.is_empty() {
                continue;
            }
            let names = normalize_cost_name_list(names);
            if names.is_empty() {
                continue;
            }
            exact.insert(key.to_string(), names.clone());
            folded.insert(key.to_lowercase(), names);
        }
        Self { exact, folded }
    }

    fn resolve(&self, group: &NameGroup) -> Vec<String> {
        // 依序嘗試：精確鍵 → 小寫鍵 → 無 tier 的裸名稱 → 萬用鍵
        let candidates = [group.key.clone(), group.name.clone(), "*".to_string()];
        for key in &candidates {
            if let Some(names) = self.exact.get(key) {
                return names.clone();
            }
            if let Some(names) = self.folded.get(&key.to_lowercase()) {
                return names.clone();
            }
        }
        Vec::new()
    }
}

/// 繼承執行器
pub struct InheritanceExecutor<S: CostStore> {
    store: S,
    locks: ParentLocks,
}

impl<S: CostStore> InheritanceExecutor<S> {
    /// 創建新的執行器
    pub fn new(store: S) -> Self {
        Self {
            store,
            locks: ParentLocks::new(),
        }
    }

    /// 以共用鎖註冊表創建（多執行器共享同一組 parent 鎖時使用）
    pub fn with_locks(store: S, locks: ParentLocks) -> Self {
        Self { store, locks }
    }

    /// 存儲層引用
    pub fn store(&self) -> &S {
        &self.store
    }

    /// 鎖註冊表引用
    pub fn locks(&self) -> &ParentLocks {
        &self.locks
    }

    /// 主入口：套用 parent → child 成本繼承
    pub fn apply(&self, request: &InheritanceRequest) -> Result<InheritanceResult> {
        let _guard = self.locks.acquire(&request.parent_name)?;
        let start_time = std::time::Instant::now();

        tracing::info!(
            "開始繼承作業：parent={}，cost_map {} 筆，weight_map {} 筆，kaplama_map {} 筆",
            request.parent_name,
            request.cost_map.len(),
            request.weight_map.len(),
            request.kaplama_name_map.len()
        );

        // Step 1: 讀全部輸入
        let children = self.store.fetch_children(&request.parent_name)?;
        if children.is_empty() {
            return Err(MaliyetError::ParentNotFound(request.parent_name.clone()));
        }
        let materials = self.store.fetch_materials()?;
        let definitions = self.store.fetch_cost_definitions()?;

        // Step 2: 分組
        tracing::debug!("Step 2: 分組，child {} 筆", children.len());
        let (size_groups, name_groups) = partition(&children);
        tracing::debug!(
            "size-group {} 個，name-group {} 個",
            size_groups.len(),
            name_groups.len()
        );

        // Step 3: 整體驗證（原子拒絕，零寫入）
        let kaplama_lookup = KaplamaLookup::build(request);
        let size_resolutions =
            validate_mappings(request, &size_groups, &name_groups, &definitions, &kaplama_lookup)?;
        let material_plan = MaterialPlan::build(request, &materials)?;

        // Step 4: 逐 child 純計算（可並行）
        let computed: Vec<(ChildDetail, Option<SkippedChild>)> = children
            .par_iter()
            .map(|child| {
                compute_child(
                    child,
                    &size_resolutions,
                    &kaplama_lookup,
                    &name_groups,
                    &material_plan,
                )
            })
            .collect();

        // Step 5: 組批次，單一邏輯單位提交
        let mut batch = WriteBatch::new();
        let mut details = Vec::with_capacity(computed.len());
        let mut skipped = Vec::new();
        for (detail, skip) in computed {
            stage_child_writes(&mut batch, &detail, &material_plan);
            if let Some(s) = skip {
                skipped.push(s);
            }
            details.push(detail);
        }
        self.store.commit(batch)?;

        let result = InheritanceResult {
            run_id: uuid::Uuid::new_v4(),
            parent_name: request.parent_name.clone(),
            children_updated: details.len(),
            children_skipped: skipped.len(),
            details,
            skipped,
            elapsed_ms: Some(start_time.elapsed().as_millis()),
        };

        tracing::info!(
            "繼承作業完成：parent={}，updated={}，skipped={}，耗時 {:?}",
            result.parent_name,
            result.children_updated,
            result.children_skipped,
            start_time.elapsed()
        );

        Ok(result)
    }
}

/// 驗證整份映射並決議每個 size-group 的貨運值
///
/// 任何 size-group 缺 kargo 成本 / 重量、重量為負、成本定義不存在，
/// 或 name-group 缺 kaplama（未放行時），都會收進同一個
/// `IncompleteMapping` 錯誤，一次回報所有缺漏。
fn validate_mappings(
    request: &InheritanceRequest,
    size_groups: &BTreeMap<String, SizeGroup>,
    name_groups: &BTreeMap<String, NameGroup>,
    definitions: &[CostDefinition],
    kaplama_lookup: &KaplamaLookup,
) -> Result<BTreeMap<String, SizeResolution>> {
    let mut incomplete = Vec::new();
    let mut resolutions = BTreeMap::new();

    for (label, _group) in size_groups {
        let cost_name = match request.resolve_cost(label) {
            Some(name) => name,
            None => {
                incomplete.push(format!("size-group '{label}' kargo 成本未映射"));
                continue;
            }
        };

        let definition = definitions
            .iter()
            .find(|d| d.is_active_kargo() && d.name == cost_name)
            .or_else(|| {
                definitions
                    .iter()
                    .find(|d| d.is_active_kargo() && d.name.eq_ignore_ascii_case(cost_name))
            });
        let definition = match definition {
            Some(def) => def,
            None => {
                incomplete.push(format!(
                    "size-group '{label}' 的 kargo 成本定義不存在: '{cost_name}'"
                ));
                continue;
            }
        };

        let weight = match request.resolve_weight(label) {
            Some(w) => w,
            None => {
                incomplete.push(format!("size-group '{label}' 重量未映射"));
                continue;
            }
        };
        // 重量 0 合法：永遠不會超過體積項而已
        if weight < Decimal::ZERO {
            incomplete.push(format!("size-group '{label}' 重量為負: {weight}"));
            continue;
        }

        let kargo_kodu = definition
            .kargo_code
            .clone()
            .or_else(|| normalize_kargo_code(&definition.name));
        resolutions.insert(
            label.clone(),
            SizeResolution {
                cost_name: definition.name.clone(),
                kargo_kodu,
                capacity: definition.capacity,
                weight: weight.round_dp(6),
            },
        );
    }

    if !request.allow_missing_kaplama {
        for (key, group) in name_groups {
            if kaplama_lookup.resolve(group).is_empty() {
                incomplete.push(format!("name-group '{key}' kaplama 未映射"));
            }
        }
    }

    if !incomplete.is_empty() {
        return Err(MaliyetError::IncompleteMapping { incomplete });
    }
    Ok(resolutions)
}

/// 驗證後的原物料計畫
struct MaterialPlan {
    /// 手動數量（自動推導角色與 sac/mdf 選取已剔除）
    manual: Vec<(i64, Decimal)>,
    insulation_id: Option<i64>,
    paint_labor_id: Option<i64>,
    sac_id: Option<i64>,
    mdf_id: Option<i64>,
}

impl MaterialPlan {
    fn build(request: &InheritanceRequest, materials: &[Material]) -> Result<Self> {
        let by_id: HashMap<i64, &Material> = materials.iter().map(|m| (m.id, m)).collect();

        let select = |id: Option<i64>, role: MaterialRole| -> Result<Option<i64>> {
            match id {
                None => Ok(None),
                Some(id) => {
                    let material = by_id.get(&id).ok_or(MaliyetError::MaterialNotFound(id))?;
                    if material.role != role {
                        return Err(MaliyetError::MaterialRoleMismatch(format!(
                            "原物料 {}（id {}）角色為 {:?}，需要 {:?}",
                            material.name, id, material.role, role
                        )));
                    }
                    Ok(Some(id))
                }
            }
        };
        let sac_id = select(request.sac_material_id, MaterialRole::SheetSelectable)?;
        let mdf_id = select(request.mdf_material_id, MaterialRole::MdfSelectable)?;

        // 角色表上的第一個 insulation / paint_labor 原物料（id 序）
        let first_with_role = |role: MaterialRole| -> Option<i64> {
            materials
                .iter()
                .filter(|m| m.role == role)
                .map(|m| m.id)
                .min()
        };
        let insulation_id = first_with_role(MaterialRole::Insulation);
        let paint_labor_id = first_with_role(MaterialRole::PaintLabor);

        let mut manual = Vec::new();
        for (&material_id, &quantity) in &request.materials {
            let material = by_id
                .get(&material_id)
                .ok_or(MaliyetError::MaterialNotFound(material_id))?;
            // 自動推導角色的數量絕不接受直接輸入
            if material.role.is_auto_derived() {
                continue;
            }
            if Some(material_id) == sac_id || Some(material_id) == mdf_id {
                continue;
            }
            manual.push((material_id, quantity.round_dp(6)));
        }

        Ok(Self {
            manual,
            insulation_id,
            paint_labor_id,
            sac_id,
            mdf_id,
        })
    }
}

/// 單一 child 的純計算
fn compute_child(
    child: &Child,
    size_resolutions: &BTreeMap<String, SizeResolution>,
    kaplama_lookup: &KaplamaLookup,
    name_groups: &BTreeMap<String, NameGroup>,
    plan: &MaterialPlan,
) -> (ChildDetail, Option<SkippedChild>) {
    let size_label = child.size_label().to_string();
    // 驗證通過後每個 size-group 必有決議
    let resolution = &size_resolutions[&size_label];

    let kaplama_cost_names = resolve_child_kaplama(child, kaplama_lookup, name_groups);

    let alan_m2 = geometry::area(child.en, child.boy);
    let (kargo_en, kargo_boy, kargo_yukseklik) = match resolution.capacity {
        Some(cap) => (Some(cap.max_short), Some(cap.max_long), cap.yukseklik),
        None => (None, None, None),
    };
    let kargo_desi = geometry::desi(
        kargo_en,
        kargo_boy,
        kargo_yukseklik,
        Some(resolution.weight),
    );

    let detail = ChildDetail {
        child_sku: child.child_sku.clone(),
        child_name: child.child_name.clone(),
        variation_size: size_label.clone(),
        kargo_cost_name: resolution.cost_name.clone(),
        kaplama_cost_names,
        kargo_kodu: resolution.kargo_kodu.clone(),
        kargo_en,
        kargo_boy,
        kargo_yukseklik,
        kargo_agirlik: resolution.weight,
        kargo_desi,
        alan_m2,
        strafor: plan
            .insulation_id
            .and_then(|_| geometry::derived_quantity(MaterialRole::Insulation, alan_m2)),
        boya_iscilik: plan
            .paint_labor_id
            .and_then(|_| geometry::derived_quantity(MaterialRole::PaintLabor, alan_m2)),
        sac: plan
            .sac_id
            .and_then(|_| geometry::derived_quantity(MaterialRole::SheetSelectable, alan_m2)),
        mdf: plan
            .mdf_id
            .and_then(|_| geometry::derived_quantity(MaterialRole::MdfSelectable, alan_m2)),
    };

    // 缺尺寸：非幾何欄位照常更新，但記入 skip 清單
    let skip = if alan_m2.is_none() {
        Some(SkippedChild {
            child_sku: child.child_sku.clone(),
            variation_size: size_label,
            reason: REASON_MISSING_DIMENSIONS.to_string(),
        })
    } else {
        None
    };

    (detail, skip)
}

/// 決議單一 child 的 kaplama 清單（群組鍵 → 裸名稱 → 萬用鍵）
fn resolve_child_kaplama(
    child: &Child,
    kaplama_lookup: &KaplamaLookup,
    name_groups: &BTreeMap<String, NameGroup>,
) -> Vec<String> {
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
    if let Some(key) = build_kaplama_group_key(name, tier) {
        if let Some(group) = name_groups.get(&key) {
            return kaplama_lookup.resolve(group);
        }
    }
    Vec::new()
}

/// 把單一 child 的計算結果化為批次寫入
fn stage_child_writes(batch: &mut WriteBatch, detail: &ChildDetail, plan: &MaterialPlan) {
    batch.shipping_updates.push(ShippingUpdate {
        child_sku: detail.child_sku.clone(),
        kargo_kodu: detail.kargo_kodu.clone(),
        kargo_en: detail.kargo_en,
        kargo_boy: detail.kargo_boy,
        kargo_yukseklik: detail.kargo_yukseklik,
        kargo_agirlik: detail.kargo_agirlik,
        kargo_desi: detail.kargo_desi,
    });

    // 手動原物料：整個 parent 一體適用
    for &(material_id, quantity) in &plan.manual {
        batch.material_upserts.push(MaterialUpsert {
            child_sku: detail.child_sku.clone(),
            material_id,
            quantity,
        });
    }

    // 面積推導原物料：面積缺漏時省略，不是補零
    let auto_pairs = [
        (plan.insulation_id, detail.strafor),
        (plan.paint_labor_id, detail.boya_iscilik),
        (plan.sac_id, detail.sac),
        (plan.mdf_id, detail.mdf),
    ];
    for (material_id, quantity) in auto_pairs {
        if let (Some(material_id), Some(quantity)) = (material_id, quantity) {
            batch.material_upserts.push(MaterialUpsert {
                child_sku: detail.child_sku.clone(),
                material_id,
                quantity,
            });
        }
    }

    batch.cost_assignments.push(CostAssignmentWrite {
        child_sku: detail.child_sku.clone(),
        kargo_cost_name: detail.kargo_cost_name.clone(),
        kaplama_cost_names: detail.kaplama_cost_names.clone(),
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use maliyet_store::MemoryStore;
    use std::str::FromStr;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn seeded_store() -> MemoryStore {
        let store = MemoryStore::new();

        store.insert_child(
            Child::new("SKU-G".to_string(), "Ayna".to_string(), "P1".to_string())
                .with_dims(d("20"), d("30"))
                .with_variation_size("20x30".to_string())
                .with_variation_color("Gold".to_string()),
        );
        store.insert_child(
            Child::new("SKU-S".to_string(), "Ayna".to_string(), "P1".to_string())
                .with_dims(d("20"), d("30"))
                .with_variation_size("20x30".to_string())
                .with_variation_color("Silver".to_string()),
        );

        store.insert_material(
            Material::new(1, "Strafor".to_string(), "m²".to_string())
                .with_role(MaterialRole::Insulation),
        );
        store.insert_material(
            Material::new(2, "Boya + İşçilik".to_string(), "m²".to_string())
                .with_role(MaterialRole::PaintLabor),
        );
        store.insert_material(Material::new(3, "Vida".to_string(), "adet".to_string()));
        store.insert_material(
            Material::new(4, "Saç 2mm".to_string(), "m²".to_string())
                .with_role(MaterialRole::SheetSelectable),
        );

        store.insert_cost_definition(CostDefinition::kargo(
            1,
            "M-13".to_string(),
            BoxCapacity::new(d("40"), d("30")).with_yukseklik(d("10")),
        ));
        store.insert_cost_definition(CostDefinition::kaplama(2, "Gold Kaplama".to_string()));
        store.insert_cost_definition(CostDefinition::kaplama(3, "Silver Kaplama".to_string()));

        store
    }

    fn full_request() -> InheritanceRequest {
        InheritanceRequest::new("P1".to_string())
            .with_cost("20x30", "M-13")
            .with_weight("20x30", d("3.1"))
            .with_kaplama("Ayna||gold_copper", vec!["Gold Kaplama".to_string()])
            .with_kaplama("Ayna||silver", vec!["Silver Kaplama".to_string()])
            .with_material(3, d("8"))
            .with_sac_material(4)
    }

    #[test]
    fn test_apply_full_flow() {
        let executor = InheritanceExecutor::new(seeded_store());
        let result = executor.apply(&full_request()).unwrap();

        assert_eq!(result.children_updated, 2);
        assert_eq!(result.children_skipped, 0);

        let gold = result
            .details
            .iter()
            .find(|c| c.child_sku == "SKU-G")
            .unwrap();
        assert_eq!(gold.kargo_cost_name, "M-13");
        assert_eq!(gold.kargo_kodu.as_deref(), Some("M-13"));
        assert_eq!(gold.alan_m2, Some(d("0.06")));
        // 箱 40x30x10 → 2.4 體積 desi，重量 3.1 勝出 → 3.5
        assert_eq!(gold.kargo_desi, Some(d("3.5")));
        assert_eq!(gold.strafor, Some(d("0.072")));
        assert_eq!(gold.boya_iscilik, Some(d("0.3")));
        assert_eq!(gold.sac, Some(d("0.06")));
        assert_eq!(gold.mdf, None);
        assert_eq!(gold.kaplama_cost_names, vec!["Gold Kaplama".to_string()]);

        let silver = result
            .details
            .iter()
            .find(|c| c.child_sku == "SKU-S")
            .unwrap();
        assert_eq!(silver.kaplama_cost_names, vec!["Silver Kaplama".to_string()]);

        // 寫入已生效
        let store = executor.store();
        assert_eq!(store.material_quantity("SKU-G", 3), Some(d("8")));
        assert_eq!(store.material_quantity("SKU-G", 1), Some(d("0.072")));
        assert_eq!(
            store.assigned_cost_names("SKU-G"),
            vec!["Gold Kaplama".to_string(), "M-13".to_string()]
        );
    }

    #[test]
    fn test_missing_weight_rejected_atomically() {
        let executor = InheritanceExecutor::new(seeded_store());
        let mut request = full_request();
        request.weight_map.clear();

        let err = executor.apply(&request).unwrap_err();
        assert!(matches!(err, MaliyetError::IncompleteMapping { .. }));

        // 零寫入
        let store = executor.store();
        assert_eq!(store.material_quantity("SKU-G", 3), None);
        assert!(store.assigned_cost_names("SKU-G").is_empty());
        assert!(store.child("SKU-G").unwrap().kargo_desi.is_none());
    }

    #[test]
    fn test_negative_weight_rejected() {
        let executor = InheritanceExecutor::new(seeded_store());
        let request = full_request().with_weight("20x30", d("-1"));
        assert!(matches!(
            executor.apply(&request),
            Err(MaliyetError::IncompleteMapping { .. })
        ));
    }

    #[test]
    fn test_missing_kaplama_rejected_unless_allowed() {
        let executor = InheritanceExecutor::new(seeded_store());
        let mut request = full_request();
        request.kaplama_name_map.remove("Ayna||silver");

        assert!(matches!(
            executor.apply(&request),
            Err(MaliyetError::IncompleteMapping { .. })
        ));

        let request = request.with_allow_missing_kaplama(true);
        let result = executor.apply(&request).unwrap();
        assert_eq!(result.children_updated, 2);
        let silver = result
            .details
            .iter()
            .find(|c| c.child_sku == "SKU-S")
            .unwrap();
        assert!(silver.kaplama_cost_names.is_empty());
    }

    #[test]
    fn test_dimensionless_child_skipped_but_written() {
        let store = seeded_store();
        store.insert_child(
            Child::new("SKU-D".to_string(), "Ayna".to_string(), "P1".to_string())
                .with_variation_size("20x30".to_string())
                .with_variation_color("Gold".to_string()),
        );
        let executor = InheritanceExecutor::new(store);
        let result = executor.apply(&full_request()).unwrap();

        assert_eq!(result.children_updated, 3);
        assert_eq!(result.children_skipped, 1);
        assert_eq!(result.skipped[0].child_sku, "SKU-D");
        assert_eq!(result.skipped[0].reason, REASON_MISSING_DIMENSIONS);

        // 幾何推導省略，但手動原物料與成本照常寫入
        let detail = result
            .details
            .iter()
            .find(|c| c.child_sku == "SKU-D")
            .unwrap();
        assert_eq!(detail.alan_m2, None);
        assert_eq!(detail.strafor, None);
        // 箱尺寸來自成本定義，desi 仍可由箱體積與重量算出
        assert!(detail.kargo_desi.is_some());

        let store = executor.store();
        assert_eq!(store.material_quantity("SKU-D", 3), Some(d("8")));
        assert_eq!(store.material_quantity("SKU-D", 1), None);
        assert!(store
            .assigned_cost_names("SKU-D")
            .contains(&"M-13".to_string()));
    }

    #[test]
    fn test_apply_is_idempotent() {
        let executor = InheritanceExecutor::new(seeded_store());
        let request = full_request();

        let first = executor.apply(&request).unwrap();
        let second = executor.apply(&request).unwrap();

        // details 完全一致（run_id / 耗時除外）
        let a = serde_json::to_value(&first.details).unwrap();
        let b = serde_json::to_value(&second.details).unwrap();
        assert_eq!(a, b);

        // 指派列無累積
        assert_eq!(executor.store().cost_row_count("SKU-G"), 2);
    }

    #[test]
    fn test_manual_quantity_for_auto_material_ignored() {
        let executor = InheritanceExecutor::new(seeded_store());
        // Strafor（insulation 角色）of 手動數量 99 絕不能採納
        let request = full_request().with_material(1, d("99"));
        executor.apply(&request).unwrap();
        assert_eq!(
            executor.store().material_quantity("SKU-G", 1),
            Some(d("0.072"))
        );
    }

    #[test]
    fn test_unknown_parent() {
        let executor = InheritanceExecutor::new(seeded_store());
        let request = full_request();
        let request = InheritanceRequest {
            parent_name: "YOK".to_string(),
            ..request
        };
        assert!(matches!(
            executor.apply(&request),
            Err(MaliyetError::ParentNotFound(_))
        ));
    }

    #[test]
    fn test_sac_material_role_checked() {
        let executor = InheritanceExecutor::new(seeded_store());
        // id 3（Vida，一般角色）不能當鈑金選取
        let request = full_request().with_sac_material(3);
        assert!(matches!(
            executor.apply(&request),
            Err(MaliyetError::MaterialRoleMismatch(_))
        ));
    }

    #[test]
    fn test_parent_lock_conflict() {
        let locks = ParentLocks::new();
        let guard = locks.acquire("P1").unwrap();

        // 同 parent 第二個作業被拒，不同 parent 不受影響
        assert!(matches!(
            locks.acquire("P1"),
            Err(MaliyetError::InheritanceInProgress(_))
        ));
        let other = locks.acquire("P2").unwrap();
        drop(other);

        // 釋放後可重試
        drop(guard);
        assert!(locks.acquire("P1").is_ok());
    }

    #[test]
    fn test_executor_rejects_concurrent_same_parent() {
        let locks = ParentLocks::new();
        let executor = InheritanceExecutor::with_locks(seeded_store(), locks.clone());

        let _guard = locks.acquire("P1").unwrap();
        assert!(matches!(
            executor.apply(&full_request()),
            Err(MaliyetError::InheritanceInProgress(_))
        ));
    }
}
