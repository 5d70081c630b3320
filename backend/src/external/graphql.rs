use std::collections::BTreeSet;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::external::sales_provider::{
    normalize_quantity, normalize_revenue, parse_sale_date, SalesProvider, SalesProviderError,
};
use crate::models::{SalesRecord, SkuSummary};

const SALES_BY_SKU_QUERY: &str = r#"
query SalesBySku($skuId: String!) {
  salesBySku(skuId: $skuId) {
    transactionId
    date
    skuId
    quantitySold
    soldCost
  }
}
"#;

const ALL_SALES_QUERY: &str = r#"
query {
  sales {
    transactionId
    date
    skuId
    quantitySold
    soldCost
  }
}
"#;

const SKU_IDS_QUERY: &str = r#"
query {
  sales {
    skuId
  }
}
"#;

/// Client for the backend's GraphQL endpoint.
pub struct GraphQlProvider {
    client: reqwest::Client,
    endpoint: String,
}

impl GraphQlProvider {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, SalesProviderError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SalesProviderError::Network(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: format!("{}/api/graphql", base_url.trim_end_matches('/')),
        })
    }

    async fn request<T: DeserializeOwned>(&self, query: &str, variables: Value) -> Result<T, SalesProviderError> {
        let resp = self
            .client
            .post(&self.endpoint)
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(SalesProviderError::BadResponse(format!("HTTP {}", status.as_u16())));
        }

        let body: GraphQlResponse<T> = resp
            .json()
            .await
            .map_err(|e| SalesProviderError::Parse(e.to_string()))?;

        if let Some(first) = body.errors.as_ref().and_then(|errs| errs.first()) {
            return Err(SalesProviderError::BadResponse(first.message.clone()));
        }

        body.data
            .ok_or_else(|| SalesProviderError::BadResponse("missing data in GraphQL response".into()))
    }
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    errors: Option<Vec<GraphQlError>>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SalesBySkuData {
    sales_by_sku: Vec<GraphQlSale>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GraphQlSale {
    date: String,
    sku_id: Option<String>,
    quantity_sold: Option<f64>,
    sold_cost: Option<f64>,
}

impl GraphQlSale {
    fn into_record(self, sku_id: String) -> Result<SalesRecord, SalesProviderError> {
        Ok(SalesRecord::new(
            parse_sale_date(&self.date)?,
            sku_id,
            normalize_quantity(self.quantity_sold.unwrap_or(0.0)),
            normalize_revenue(self.sold_cost.unwrap_or(0.0)),
        ))
    }
}

#[derive(Debug, Deserialize)]
struct AllSalesData {
    sales: Vec<GraphQlSale>,
}

#[derive(Debug, Deserialize)]
struct SalesSkuData {
    sales: Vec<SkuIdRow>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SkuIdRow {
    sku_id: Option<String>,
}

#[async_trait]
impl SalesProvider for GraphQlProvider {
    async fn fetch_sales_records(&self, sku_id: &str) -> Result<Vec<SalesRecord>, SalesProviderError> {
        debug!("Querying salesBySku({}) at {}", sku_id, self.endpoint);

        let data: SalesBySkuData = self
            .request(SALES_BY_SKU_QUERY, json!({ "skuId": sku_id }))
            .await?;

        let records = data
            .sales_by_sku
            .into_iter()
            .map(|mut sale| {
                let sale_sku = sale.sku_id.take().unwrap_or_else(|| sku_id.to_string());
                sale.into_record(sale_sku)
            })
            .collect::<Result<Vec<_>, _>>()?;

        info!("Fetched {} GraphQL sales rows for SKU {}", records.len(), sku_id);
        Ok(records)
    }

    async fn fetch_all_sales(&self) -> Result<Vec<SalesRecord>, SalesProviderError> {
        let data: AllSalesData = self.request(ALL_SALES_QUERY, json!({})).await?;

        let records = data
            .sales
            .into_iter()
            .filter_map(|mut sale| {
                let sku_id = sale.sku_id.take().filter(|s| !s.trim().is_empty())?;
                Some(sale.into_record(sku_id))
            })
            .collect::<Result<Vec<_>, _>>()?;

        info!("Fetched {} GraphQL sales rows across all SKUs", records.len());
        Ok(records)
    }

    async fn list_skus(&self) -> Result<Vec<SkuSummary>, SalesProviderError> {
        let data: SalesSkuData = self.request(SKU_IDS_QUERY, json!({})).await?;

        // One row per sale, so collapse to distinct ids
        let unique: BTreeSet<String> = data
            .sales
            .into_iter()
            .filter_map(|row| row.sku_id)
            .filter(|id| !id.trim().is_empty())
            .collect();

        Ok(unique.into_iter().map(SkuSummary::bare).collect())
    }
}
