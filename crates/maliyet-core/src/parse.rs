//! 自由文字數值 / 尺寸解析
//!
//! 目錄資料的尺寸常以 `"20x99"`、`"35*45*10"` 這類自由格式出現，
//! 小數點可能是逗號，`ÖZEL`（特規）視為無值。

use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;

/// 尺寸分隔符：`x`、`X`、`×`、`*`
static DIM_SEPARATOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"[xX×*]").unwrap());

/// 解析單一十進位數值；逗號小數點容忍，`ÖZEL` 與空字串回傳 None
pub fn parse_decimal(value: &str) -> Option<Decimal> {
    let raw = value.trim().trim_matches('"').replace(',', ".");
    if raw.is_empty() || raw.to_uppercase() == "ÖZEL" {
        return None;
    }
    Decimal::from_str(&raw).ok()
}

/// 解析 `en*boy*yukseklik` / `en x boy` 格式的尺寸字串
///
/// 回傳依序出現的前三個數值；不足的維度為 None。
pub fn parse_dims(value: &str) -> (Option<Decimal>, Option<Decimal>, Option<Decimal>) {
    let raw = value.trim().trim_matches('"');
    if raw.is_empty() || raw.to_uppercase() == "ÖZEL" {
        return (None, None, None);
    }

    let nums: Vec<Decimal> = DIM_SEPARATOR
        .split(raw)
        .filter_map(parse_decimal)
        .collect();

    match nums.len() {
        0 => (None, None, None),
        1 => (Some(nums[0]), None, None),
        2 => (Some(nums[0]), Some(nums[1]), None),
        _ => (Some(nums[0]), Some(nums[1]), Some(nums[2])),
    }
}

/// 從尺寸標籤解析（長邊, 短邊）
///
/// 只接受兩個正數的標籤（如 "20x99"）；此為裝箱匹配在結構化尺寸
/// 缺漏時的次要來源。
pub fn parse_label_sides(label: &str) -> Option<(Decimal, Decimal)> {
    let (a, b, _) = parse_dims(label);
    match (a, b) {
        (Some(a), Some(b)) if a > Decimal::ZERO && b > Decimal::ZERO => {
            Some((a.max(b), a.min(b)))
        }
        _ => None,
    }
}
