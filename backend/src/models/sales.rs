use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One observed transaction line for a single SKU.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesRecord {
    pub date: NaiveDate,
    pub product_id: String,
    pub quantity: u32,
    pub revenue: f64, // post-discount, never negative
}

impl SalesRecord {
    pub fn new(date: NaiveDate, product_id: impl Into<String>, quantity: u32, revenue: f64) -> Self {
        Self {
            date,
            product_id: product_id.into(),
            quantity,
            revenue: revenue.max(0.0),
        }
    }
}

/// Date window applied to fetched records. Both ends are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, String> {
        if start >= end {
            return Err(format!(
                "Invalid date range: start {} must be before end {}",
                start, end
            ));
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start < date && date < self.end
    }
}

/// Where a batch of records came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    Upstream,
    Mock,
}

/// Records fetched for one SKU together with their origin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalesBatch {
    pub sku_id: String,
    pub source: DataSource,
    pub records: Vec<SalesRecord>,
}

/// Every SKU's records from one fetch of the whole sales table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalesFeed {
    pub source: DataSource,
    pub records: Vec<SalesRecord>,
}
