use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

use crate::external::sales_provider::{
    normalize_quantity, normalize_revenue, parse_sale_date, SalesProvider, SalesProviderError,
};
use crate::models::{SalesRecord, SkuSummary};

/// REST client for the point-of-sale backend.
pub struct PosApiProvider {
    client: reqwest::Client,
    base_url: String,
}

impl PosApiProvider {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, SalesProviderError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SalesProviderError::Network(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct PosSaleRow {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "SKU_ID", default)]
    sku_id: Option<String>,
    #[serde(rename = "Quantity_Sold", default)]
    quantity_sold: f64,
    #[serde(rename = "Sold_Cost", default)]
    sold_cost: f64,
}

#[derive(Debug, Deserialize)]
struct PosSkuRow {
    #[serde(rename = "SKU", default)]
    sku: Option<String>,
    #[serde(default)]
    sku_id: Option<String>,
    #[serde(default)]
    product_name: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    brand: Option<String>,
    #[serde(default)]
    price: Option<f64>,
    #[serde(default)]
    stock_quantity: Option<u32>,
}

impl PosSaleRow {
    fn into_record(self, sku_id: String) -> Result<SalesRecord, SalesProviderError> {
        Ok(SalesRecord::new(
            parse_sale_date(&self.date)?,
            sku_id,
            normalize_quantity(self.quantity_sold),
            normalize_revenue(self.sold_cost),
        ))
    }
}

impl PosSkuRow {
    fn into_summary(self) -> Option<SkuSummary> {
        let sku_id = self
            .sku
            .filter(|s| !s.trim().is_empty())
            .or(self.sku_id.filter(|s| !s.trim().is_empty()))?;

        Some(SkuSummary {
            sku_id,
            product_name: self.product_name,
            category: self.category,
            brand: self.brand,
            price: self.price,
            stock_quantity: self.stock_quantity,
        })
    }
}

async fn read_json<T: serde::de::DeserializeOwned>(resp: reqwest::Response) -> Result<T, SalesProviderError> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(SalesProviderError::BadResponse(format!(
            "HTTP {}: {}",
            status.as_u16(),
            body.chars().take(200).collect::<String>()
        )));
    }

    resp.json::<T>()
        .await
        .map_err(|e| SalesProviderError::Parse(e.to_string()))
}

#[async_trait]
impl SalesProvider for PosApiProvider {
    async fn fetch_sales_records(&self, sku_id: &str) -> Result<Vec<SalesRecord>, SalesProviderError> {
        let url = format!("{}/api/pos/sales/sku_sales_by_skuid/{}", self.base_url, sku_id);
        debug!("Fetching POS sales from {}", url);

        let resp = self.client.get(&url).send().await?;
        let rows: Vec<PosSaleRow> = read_json(resp).await?;

        let records = rows
            .into_iter()
            .map(|mut row| {
                let row_sku = row.sku_id.take().unwrap_or_else(|| sku_id.to_string());
                row.into_record(row_sku)
            })
            .collect::<Result<Vec<_>, _>>()?;

        info!("Fetched {} POS sales rows for SKU {}", records.len(), sku_id);
        Ok(records)
    }

    async fn fetch_all_sales(&self) -> Result<Vec<SalesRecord>, SalesProviderError> {
        let url = format!("{}/api/pos/sales/fetch", self.base_url);
        debug!("Fetching all POS sales from {}", url);

        let resp = self
            .client
            .post(&url)
            .json(&json!({ "additionalProp1": {} }))
            .send()
            .await?;
        let rows: Vec<PosSaleRow> = read_json(resp).await?;

        // Rows without a SKU cannot be attributed to any product
        let records = rows
            .into_iter()
            .filter_map(|mut row| {
                let sku_id = row.sku_id.take().filter(|s| !s.trim().is_empty())?;
                Some(row.into_record(sku_id))
            })
            .collect::<Result<Vec<_>, _>>()?;

        info!("Fetched {} POS sales rows across all SKUs", records.len());
        Ok(records)
    }

    async fn list_skus(&self) -> Result<Vec<SkuSummary>, SalesProviderError> {
        let url = format!("{}/api/skus/fetch", self.base_url);

        let resp = self
            .client
            .post(&url)
            .json(&json!({ "additionalProp1": {} }))
            .send()
            .await?;
        let rows: Vec<PosSkuRow> = read_json(resp).await?;

        Ok(rows.into_iter().filter_map(PosSkuRow::into_summary).collect())
    }
}
