//! 幾何與自動推導數量計算
//!
//! 全部為純函數、無狀態、確定性。無尺寸產品是合法輸入：
//! 缺尺寸時回傳 None，不拋錯也不補零。

use maliyet_core::MaterialRole;
use rust_decimal::Decimal;

/// 面積換算除數：cm² → m²
fn area_divisor() -> Decimal {
    Decimal::from(10_000)
}

/// desi 體積除數
fn desi_divisor() -> Decimal {
    Decimal::from(5_000)
}

/// 面積（m²）：`en * boy / 10000`
///
/// 兩個尺寸都必須存在，否則回傳 None。
pub fn area(en: Option<Decimal>, boy: Option<Decimal>) -> Option<Decimal> {
    match (en, boy) {
        (Some(en), Some(boy)) => Some((en * boy / area_divisor()).round_dp(6)),
        _ => None,
    }
}

/// 向上取到最近的 0.5 倍數
///
/// desi 是計費單位，只許向上、不許向下：低估即違反貨運合約。
pub fn ceil_to_half(value: Decimal) -> Decimal {
    (value * Decimal::TWO).ceil() / Decimal::TWO
}

/// 貨運計費單位 desi：`max(en*boy*yukseklik/5000, agirlik)`，向上取 0.5
///
/// 體積項需要三個箱尺寸皆為正；缺體積時退回重量單獨計費，
/// 重量與體積皆缺時無法計算，回傳 None（呼叫端記入 skip 清單）。
pub fn desi(
    en: Option<Decimal>,
    boy: Option<Decimal>,
    yukseklik: Option<Decimal>,
    agirlik: Option<Decimal>,
) -> Option<Decimal> {
    let hacim_desi = match (en, boy, yukseklik) {
        (Some(en), Some(boy), Some(y))
            if en > Decimal::ZERO && boy > Decimal::ZERO && y > Decimal::ZERO =>
        {
            Some(en * boy * y / desi_divisor())
        }
        _ => None,
    };

    match (hacim_desi, agirlik) {
        (Some(h), Some(a)) => Some(ceil_to_half(h.max(a))),
        (Some(h), None) => Some(ceil_to_half(h)),
        (None, Some(a)) => Some(ceil_to_half(a)),
        (None, None) => None,
    }
}

/// 依原物料角色推導數量
///
/// - `Insulation`：面積 × 1.2
/// - `PaintLabor`：面積 × 5
/// - `SheetSelectable` / `MdfSelectable`：面積（1:1 覆蓋）
/// - `None`：不推導，數量只來自使用者映射
///
/// 面積缺漏時一律 None（省略，不是零）。
pub fn derived_quantity(role: MaterialRole, alan_m2: Option<Decimal>) -> Option<Decimal> {
    let alan = alan_m2?;
    let quantity = match role {
        MaterialRole::Insulation => alan * Decimal::new(12, 1),
        MaterialRole::PaintLabor => alan * Decimal::from(5),
        MaterialRole::SheetSelectable | MaterialRole::MdfSelectable => alan,
        MaterialRole::None => return None,
    };
    Some(quantity.round_dp(6))
}
