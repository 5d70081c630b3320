use serde::{Deserialize, Serialize};

/// Catalog entry offered to the SKU picker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkuSummary {
    pub sku_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock_quantity: Option<u32>,
}

impl SkuSummary {
    pub fn bare(sku_id: impl Into<String>) -> Self {
        Self {
            sku_id: sku_id.into(),
            product_name: None,
            category: None,
            brand: None,
            price: None,
            stock_quantity: None,
        }
    }
}
