use async_trait::async_trait;
use chrono::{DateTime, NaiveDate};
use thiserror::Error;

use crate::models::{DataSource, SalesBatch, SalesFeed, SalesRecord, SkuSummary};

#[derive(Debug, Error)]
pub enum SalesProviderError {
    #[error("network error: {0}")]
    Network(String),

    #[error("upstream timed out")]
    Timeout,

    #[error("bad response: {0}")]
    BadResponse(String),

    #[error("parse error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for SalesProviderError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            SalesProviderError::Timeout
        } else if e.is_decode() {
            SalesProviderError::Parse(e.to_string())
        } else {
            SalesProviderError::Network(e.to_string())
        }
    }
}

/// Source of raw per-transaction sales rows.
///
/// Implementations normalize their wire schema into [`SalesRecord`]s; date
/// filtering happens downstream.
#[async_trait]
pub trait SalesProvider: Send + Sync {
    async fn fetch_sales_records(&self, sku_id: &str) -> Result<Vec<SalesRecord>, SalesProviderError>;

    /// All sales rows across every SKU.
    async fn fetch_all_sales(&self) -> Result<Vec<SalesRecord>, SalesProviderError>;

    async fn list_skus(&self) -> Result<Vec<SkuSummary>, SalesProviderError>;

    /// Records tagged with where they came from. Plain sources are upstream data.
    async fn fetch_batch(&self, sku_id: &str) -> Result<SalesBatch, SalesProviderError> {
        let records = self.fetch_sales_records(sku_id).await?;
        Ok(SalesBatch {
            sku_id: sku_id.to_string(),
            source: DataSource::Upstream,
            records,
        })
    }

    async fn fetch_feed(&self) -> Result<SalesFeed, SalesProviderError> {
        let records = self.fetch_all_sales().await?;
        Ok(SalesFeed {
            source: DataSource::Upstream,
            records,
        })
    }
}

/// Reduces an upstream date to a calendar day in UTC.
///
/// Accepts plain `YYYY-MM-DD`, RFC 3339 timestamps and `YYYY-MM-DD HH:MM:SS`.
pub fn parse_sale_date(raw: &str) -> Result<NaiveDate, SalesProviderError> {
    let raw = raw.trim();

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date);
    }

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.naive_utc().date());
    }

    raw.split(|c: char| c == ' ' || c == 'T')
        .next()
        .and_then(|date_part| NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok())
        .ok_or_else(|| SalesProviderError::Parse(format!("invalid sale date '{}'", raw)))
}

/// Clamps an upstream quantity into the non-negative unit count we aggregate.
pub fn normalize_quantity(raw: f64) -> u32 {
    if raw.is_finite() && raw > 0.0 {
        raw.round().min(u32::MAX as f64) as u32
    } else {
        0
    }
}

/// Clamps an upstream monetary amount to a finite, non-negative value.
pub fn normalize_revenue(raw: f64) -> f64 {
    if raw.is_finite() && raw > 0.0 {
        raw
    } else {
        0.0
    }
}
