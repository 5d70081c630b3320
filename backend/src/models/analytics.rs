use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::DataSource;

/// Per-day totals with optional moving average and peak flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyPoint {
    pub date: NaiveDate,
    pub quantity: u64,
    pub revenue: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_quantity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_revenue: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_peak: Option<bool>,
}

/// Per-month totals. `month_key` is "YYYY-MM" and sorts chronologically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyPoint {
    pub month_key: String,
    pub month_label: String,
    pub quantity: u64,
    pub revenue: f64,
}

/// Last 7 days against the 7 before them, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GrowthStats {
    pub quantity_growth_pct: f64,
    pub revenue_growth_pct: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsResponse {
    pub sku_id: String,
    pub source: DataSource,
    pub record_count: usize,
    pub daily: Vec<DailyPoint>,
    pub monthly: Vec<MonthlyPoint>,
    /// `None` while fewer than 14 daily points exist.
    pub growth: Option<GrowthStats>,
}
