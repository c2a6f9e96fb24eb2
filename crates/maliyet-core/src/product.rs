//! 產品變體（child）模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 產品變體（variant / child）
///
/// 每個 child 以唯一 SKU 識別，透過 `parent_name` 歸屬於一個 parent。
/// 實體尺寸 `en` / `boy`（公分）允許為空：無尺寸產品是合法常態，
/// 只會被排除在依賴尺寸的推導步驟之外。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Child {
    /// 唯一 SKU
    pub child_sku: String,

    /// 顯示名稱
    pub child_name: String,

    /// 分類
    pub kategori: String,

    /// 所屬 parent（以名稱歸組）
    pub parent_name: String,

    /// 寬（公分）
    pub en: Option<Decimal>,

    /// 長（公分）
    pub boy: Option<Decimal>,

    /// 尺寸標籤（自由文字，如 "20x99"，大小寫敏感）
    pub variation_size: Option<String>,

    /// 顏色 / 變化標籤（自由文字）
    pub variation_color: Option<String>,

    /// 貨運代碼（繼承作業寫入）
    pub kargo_kodu: Option<String>,

    /// 貨運箱寬（公分）
    pub kargo_en: Option<Decimal>,

    /// 貨運箱長（公分）
    pub kargo_boy: Option<Decimal>,

    /// 貨運箱高（公分）
    pub kargo_yukseklik: Option<Decimal>,

    /// 貨運重量（公斤）
    pub kargo_agirlik: Option<Decimal>,

    /// 貨運計費單位 desi
    pub kargo_desi: Option<Decimal>,

    /// 是否啟用
    pub is_active: bool,
}

impl Child {
    /// 創建新的產品變體
    pub fn new(child_sku: String, child_name: String, parent_name: String) -> Self {
        Self {
            child_sku,
            child_name,
            kategori: String::new(),
            parent_name,
            en: None,
            boy: None,
            variation_size: None,
            variation_color: None,
            kargo_kodu: None,
            kargo_en: None,
            kargo_boy: None,
            kargo_yukseklik: None,
            kargo_agirlik: None,
            kargo_desi: None,
            is_active: true,
        }
    }

    /// 建構器模式：設置分類
    pub fn with_kategori(mut self, kategori: String) -> Self {
        self.kategori = kategori;
        self
    }

    /// 建構器模式：設置實體尺寸（公分）
    pub fn with_dims(mut self, en: Decimal, boy: Decimal) -> Self {
        self.en = Some(en);
        self.boy = Some(boy);
        self
    }

    /// 建構器模式：設置尺寸標籤
    pub fn with_variation_size(mut self, size: String) -> Self {
        self.variation_size = Some(size);
        self
    }

    /// 建構器模式：設置顏色標籤
    pub fn with_variation_color(mut self, color: String) -> Self {
        self.variation_color = Some(color);
        self
    }

    /// 尺寸標籤，空值時回傳保留標籤 `(boyutsuz)`
    pub fn size_label(&self) -> &str {
        match self.variation_size.as_deref() {
            Some(s) if !s.is_empty() => s,
            _ => SIZE_FALLBACK_LABEL,
        }
    }

    /// 長邊（兩個尺寸中較大者）
    pub fn long_side(&self) -> Option<Decimal> {
        match (self.en, self.boy) {
            (Some(a), Some(b)) => Some(a.max(b)),
            _ => None,
        }
    }

    /// 短邊（兩個尺寸中較小者）
    pub fn short_side(&self) -> Option<Decimal> {
        match (self.en, self.boy) {
            (Some(a), Some(b)) => Some(a.min(b)),
            _ => None,
        }
    }

    /// 是否具備面積計算所需的兩個尺寸
    pub fn has_dims(&self) -> bool {
        self.en.is_some() && self.boy.is_some()
    }
}

/// 無尺寸標籤 child 的保留群組標籤
pub const SIZE_FALLBACK_LABEL: &str = "(boyutsuz)";
