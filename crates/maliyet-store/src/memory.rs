//! 記憶體存儲實作
//!
//! 測試與示例用的 [`CostStore`] 實作。提交批次時整體持有內部鎖，
//! 確保批次語意（取代 kargo、整組替換 kaplama）與唯一鍵約束
//! `(child_sku, material_id)` / `(child_sku, cost_name)`。

use std::collections::BTreeMap;
use std::sync::Mutex;

use chrono::Utc;
use maliyet_core::{normalize_kargo_code, Child, CostCategory, CostDefinition, Material};
use maliyet_core::{MaliyetError, Result};
use rust_decimal::Decimal;

use crate::{CostAssignmentWrite, CostStore, ProductCost, ProductMaterial, WriteBatch};

#[derive(Debug, Default)]
struct Inner {
    children: Vec<Child>,
    materials: Vec<Material>,
    cost_definitions: Vec<CostDefinition>,
    /// (child_sku, material_id) → 指派列
    product_materials: BTreeMap<(String, i64), ProductMaterial>,
    /// (child_sku, cost_name) → 指派列
    product_costs: BTreeMap<(String, String), ProductCost>,
}

/// 記憶體存儲
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    /// 創建空存儲
    pub fn new() -> Self {
        Self::default()
    }

    /// 加入一個 child
    pub fn insert_child(&self, child: Child) {
        self.inner.lock().unwrap().children.push(child);
    }

    /// 加入一個原物料
    pub fn insert_material(&self, material: Material) {
        self.inner.lock().unwrap().materials.push(material);
    }

    /// 加入一個成本定義
    pub fn insert_cost_definition(&self, definition: CostDefinition) {
        self.inner.lock().unwrap().cost_definitions.push(definition);
    }

    /// 直接寫入一筆原物料指派（測試 / 既有資料重建用）
    pub fn seed_product_material(&self, child_sku: &str, material_id: i64, quantity: Decimal) {
        let mut inner = self.inner.lock().unwrap();
        inner.product_materials.insert(
            (child_sku.to_string(), material_id),
            ProductMaterial {
                child_sku: child_sku.to_string(),
                material_id,
                quantity,
                updated_at: Utc::now(),
            },
        );
    }

    /// 直接寫入一筆生效成本指派（測試 / 既有資料重建用）
    pub fn seed_product_cost(&self, child_sku: &str, cost_name: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner.product_costs.insert(
            (child_sku.to_string(), cost_name.to_string()),
            ProductCost {
                child_sku: child_sku.to_string(),
                cost_name: cost_name.to_string(),
                assigned: true,
                updated_at: Utc::now(),
            },
        );
    }

    /// 查詢 child 目前快照
    pub fn child(&self, child_sku: &str) -> Option<Child> {
        self.inner
            .lock()
            .unwrap()
            .children
            .iter()
            .find(|c| c.child_sku == child_sku)
            .cloned()
    }

    /// 查詢 child 生效中的成本名稱（排序後）
    pub fn assigned_cost_names(&self, child_sku: &str) -> Vec<String> {
        let inner = self.inner.lock().unwrap();
        let mut names: Vec<String> = inner
            .product_costs
            .values()
            .filter(|pc| pc.child_sku == child_sku && pc.assigned)
            .map(|pc| pc.cost_name.clone())
            .collect();
        names.sort();
        names
    }

    /// 查詢 (child, material) 數量
    pub fn material_quantity(&self, child_sku: &str, material_id: i64) -> Option<Decimal> {
        self.inner
            .lock()
            .unwrap()
            .product_materials
            .get(&(child_sku.to_string(), material_id))
            .map(|pm| pm.quantity)
    }

    /// 指派列總數（重複列檢查用）
    pub fn cost_row_count(&self, child_sku: &str) -> usize {
        self.inner
            .lock()
            .unwrap()
            .product_costs
            .values()
            .filter(|pc| pc.child_sku == child_sku)
            .count()
    }

    fn is_kargo_name(definitions: &[CostDefinition], cost_name: &str) -> bool {
        let by_catalog = definitions
            .iter()
            .any(|d| d.category == CostCategory::Kargo && d.name == cost_name);
        // 目錄缺漏時退回代碼樣式判斷
        by_catalog || normalize_kargo_code(cost_name).is_some()
    }

    fn apply_cost_assignment(inner: &mut Inner, write: &CostAssignmentWrite) {
        let now = Utc::now();

        // 取代語意：舊的 kargo 指派撤銷；kaplama 集合整組替換
        for pc in inner.product_costs.values_mut() {
            if pc.child_sku != write.child_sku || !pc.assigned {
                continue;
            }
            if Self::is_kargo_name(&inner.cost_definitions, &pc.cost_name) {
                if pc.cost_name != write.kargo_cost_name {
                    pc.assigned = false;
                    pc.updated_at = now;
                }
            } else if !write.kaplama_cost_names.contains(&pc.cost_name) {
                pc.assigned = false;
                pc.updated_at = now;
            }
        }

        let mut assign = |cost_name: &str| {
            let key = (write.child_sku.clone(), cost_name.to_string());
            inner
                .product_costs
                .entry(key)
                .and_modify(|pc| {
                    if !pc.assigned {
                        pc.assigned = true;
                        pc.updated_at = now;
                    }
                })
                .or_insert_with(|| ProductCost {
                    child_sku: write.child_sku.clone(),
                    cost_name: cost_name.to_string(),
                    assigned: true,
                    updated_at: now,
                });
        };

        assign(&write.kargo_cost_name);
        for name in &write.kaplama_cost_names {
            assign(name);
        }
    }
}

impl CostStore for MemoryStore {
    fn fetch_children(&self, parent_name: &str) -> Result<Vec<Child>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .children
            .iter()
            .filter(|c| c.parent_name == parent_name && c.is_active)
            .cloned()
            .collect())
    }

    fn fetch_materials(&self) -> Result<Vec<Material>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .materials
            .iter()
            .filter(|m| m.is_active)
            .cloned()
            .collect())
    }

    fn fetch_cost_definitions(&self) -> Result<Vec<CostDefinition>> {
        Ok(self.inner.lock().unwrap().cost_definitions.clone())
    }

    fn fetch_product_materials(&self, parent_name: &str) -> Result<Vec<ProductMaterial>> {
        let inner = self.inner.lock().unwrap();
        let skus: Vec<&str> = inner
            .children
            .iter()
            .filter(|c| c.parent_name == parent_name && c.is_active)
            .map(|c| c.child_sku.as_str())
            .collect();
        Ok(inner
            .product_materials
            .values()
            .filter(|pm| skus.contains(&pm.child_sku.as_str()))
            .cloned()
            .collect())
    }

    fn fetch_assigned_costs(&self, parent_name: &str) -> Result<Vec<ProductCost>> {
        let inner = self.inner.lock().unwrap();
        let skus: Vec<&str> = inner
            .children
            .iter()
            .filter(|c| c.parent_name == parent_name && c.is_active)
            .map(|c| c.child_sku.as_str())
            .collect();
        Ok(inner
            .product_costs
            .values()
            .filter(|pc| pc.assigned && skus.contains(&pc.child_sku.as_str()))
            .cloned()
            .collect())
    }

    fn commit(&self, batch: WriteBatch) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();

        // 先驗證所有 SKU 存在，批次才動手寫（不允許部分提交）
        for update in &batch.shipping_updates {
            if !inner.children.iter().any(|c| c.child_sku == update.child_sku) {
                return Err(MaliyetError::StorageError(format!(
                    "未知的 child_sku: {}",
                    update.child_sku
                )));
            }
        }

        for update in &batch.shipping_updates {
            if let Some(child) = inner
                .children
                .iter_mut()
                .find(|c| c.child_sku == update.child_sku)
            {
                child.kargo_kodu = update.kargo_kodu.clone();
                child.kargo_en = update.kargo_en;
                child.kargo_boy = update.kargo_boy;
                child.kargo_yukseklik = update.kargo_yukseklik;
                child.kargo_agirlik = Some(update.kargo_agirlik);
                child.kargo_desi = update.kargo_desi;
            }
        }

        for upsert in &batch.material_upserts {
            let key = (upsert.child_sku.clone(), upsert.material_id);
            let now = Utc::now();
            inner
                .product_materials
                .entry(key)
                .and_modify(|pm| {
                    if pm.quantity != upsert.quantity {
                        pm.quantity = upsert.quantity;
                        pm.updated_at = now;
                    }
                })
                .or_insert_with(|| ProductMaterial {
                    child_sku: upsert.child_sku.clone(),
                    material_id: upsert.material_id,
                    quantity: upsert.quantity,
                    updated_at: now,
                });
        }

        for write in &batch.cost_assignments {
            Self::apply_cost_assignment(&mut inner, write);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MaterialUpsert, ShippingUpdate};
    use maliyet_core::BoxCapacity;

    fn store_with_defs() -> MemoryStore {
        let store = MemoryStore::new();
        store.insert_child(Child::new(
            "SKU-1".to_string(),
            "Ayna".to_string(),
            "P1".to_string(),
        ));
        store.insert_cost_definition(CostDefinition::kargo(
            1,
            "M-13".to_string(),
            BoxCapacity::new(Decimal::from(60), Decimal::from(40)),
        ));
        store.insert_cost_definition(CostDefinition::kargo(
            2,
            "M-7".to_string(),
            BoxCapacity::new(Decimal::from(30), Decimal::from(20)),
        ));
        store.insert_cost_definition(CostDefinition::kaplama(3, "Gold Kaplama".to_string()));
        store.insert_cost_definition(CostDefinition::kaplama(4, "Silver Kaplama".to_string()));
        store
    }

    #[test]
    fn test_kargo_assignment_supersedes() {
        let store = store_with_defs();
        store.seed_product_cost("SKU-1", "M-7");

        let mut batch = WriteBatch::new();
        batch.cost_assignments.push(CostAssignmentWrite {
            child_sku: "SKU-1".to_string(),
            kargo_cost_name: "M-13".to_string(),
            kaplama_cost_names: vec!["Gold Kaplama".to_string()],
        });
        store.commit(batch).unwrap();

        // 舊的 kargo 撤銷，不會同時存在兩個 kargo 指派
        assert_eq!(
            store.assigned_cost_names("SKU-1"),
            vec!["Gold Kaplama".to_string(), "M-13".to_string()]
        );
    }

    #[test]
    fn test_kaplama_set_is_replaced_not_merged() {
        let store = store_with_defs();
        store.seed_product_cost("SKU-1", "Silver Kaplama");

        let mut batch = WriteBatch::new();
        batch.cost_assignments.push(CostAssignmentWrite {
            child_sku: "SKU-1".to_string(),
            kargo_cost_name: "M-13".to_string(),
            kaplama_cost_names: vec!["Gold Kaplama".to_string()],
        });
        store.commit(batch).unwrap();

        let names = store.assigned_cost_names("SKU-1");
        assert!(!names.contains(&"Silver Kaplama".to_string()));
        assert!(names.contains(&"Gold Kaplama".to_string()));
    }

    #[test]
    fn test_material_upsert_no_duplicate_rows() {
        let store = store_with_defs();
        for _ in 0..2 {
            let mut batch = WriteBatch::new();
            batch.material_upserts.push(MaterialUpsert {
                child_sku: "SKU-1".to_string(),
                material_id: 9,
                quantity: Decimal::from(3),
            });
            store.commit(batch).unwrap();
        }
        assert_eq!(store.material_quantity("SKU-1", 9), Some(Decimal::from(3)));
    }

    #[test]
    fn test_commit_rejects_unknown_sku() {
        let store = store_with_defs();
        let mut batch = WriteBatch::new();
        batch.shipping_updates.push(ShippingUpdate {
            child_sku: "YOK".to_string(),
            kargo_kodu: None,
            kargo_en: None,
            kargo_boy: None,
            kargo_yukseklik: None,
            kargo_agirlik: Decimal::ONE,
            kargo_desi: None,
        });
        assert!(store.commit(batch).is_err());
    }
}
