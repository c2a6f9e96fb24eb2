//! 成本繼承示例

use maliyet_calc::{partition, reconstruct_prefill, suggest_box, InheritanceExecutor};
use maliyet_core::{BoxCapacity, Child, CostDefinition, InheritanceRequest, Material, MaterialRole};
use maliyet_store::MemoryStore;
use rust_decimal::Decimal;
use std::str::FromStr;

fn d(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Parent → Child 成本繼承示例 ===\n");

    // 建存儲層並播種產品與目錄
    let store = MemoryStore::new();
    store.insert_child(
        Child::new(
            "AYN-2030-G".to_string(),
            "Ayna".to_string(),
            "Ayna-P1".to_string(),
        )
        .with_dims(d("20"), d("30"))
        .with_variation_size("20x30".to_string())
        .with_variation_color("Gold".to_string()),
    );
    store.insert_child(
        Child::new(
            "AYN-2030-S".to_string(),
            "Ayna".to_string(),
            "Ayna-P1".to_string(),
        )
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

    store.insert_cost_definition(CostDefinition::kargo(
        1,
        "M-13".to_string(),
        BoxCapacity::new(d("35"), d("25")).with_yukseklik(d("10")),
    ));
    store.insert_cost_definition(CostDefinition::kaplama(2, "Gold Kaplama".to_string()));
    store.insert_cost_definition(CostDefinition::kaplama(3, "Silver Kaplama".to_string()));

    // 分組與箱建議
    let children = maliyet_store::CostStore::fetch_children(&store, "Ayna-P1")?;
    let definitions = maliyet_store::CostStore::fetch_cost_definitions(&store)?;
    let (size_groups, name_groups) = partition(&children);
    println!(
        "size-group {} 個、name-group {} 個",
        size_groups.len(),
        name_groups.len()
    );
    for (label, group) in &size_groups {
        match suggest_box(group, &definitions) {
            Some(definition) => println!("  尺寸 {label} → 建議箱 {}", definition.name),
            None => println!("  尺寸 {label} → 無合適箱"),
        }
    }

    // 組繼承請求並執行
    let request = InheritanceRequest::new("Ayna-P1".to_string())
        .with_cost("20x30", "M-13")
        .with_weight("20x30", d("3.1"))
        .with_kaplama("Ayna||gold_copper", vec!["Gold Kaplama".to_string()])
        .with_kaplama("Ayna||silver", vec!["Silver Kaplama".to_string()])
        .with_material(3, d("8"));

    let executor = InheritanceExecutor::new(store);
    let result = executor.apply(&request)?;

    println!(
        "\n繼承完成：updated={}，skipped={}",
        result.children_updated, result.children_skipped
    );
    for detail in &result.details {
        println!(
            "  - {}: kargo={}, desi={:?}, 面積={:?}, kaplama={:?}",
            detail.child_sku,
            detail.kargo_cost_name,
            detail.kargo_desi,
            detail.alan_m2,
            detail.kaplama_cost_names
        );
    }

    // 由寫入後的資料反推映射草稿
    let prefill = reconstruct_prefill(executor.store(), "Ayna-P1")?;
    println!("\n回填草稿:");
    for (size, cost_name) in &prefill.cost_map {
        println!("  {size} → {cost_name}");
    }

    Ok(())
}
