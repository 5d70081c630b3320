use serde::{Deserialize, Serialize};

use super::{DataSource, MonthlyPoint};

/// Single month in a demand forecast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub month_key: String,
    pub predicted_demand: u64,
    pub lower_bound: u64,
    pub upper_bound: u64,
}

/// Knobs the dashboard exposes on the forecast page
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastParams {
    pub horizon_months: u32,
    pub confidence_level: u32, // 50..=99
    pub seasonal_adjustment: bool,
}

impl Default for ForecastParams {
    fn default() -> Self {
        Self {
            horizon_months: 2,
            confidence_level: 80,
            seasonal_adjustment: true,
        }
    }
}

/// Complete demand forecast for one SKU
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemandForecast {
    pub sku_id: String,
    pub source: DataSource,
    pub history: Vec<MonthlyPoint>,
    pub forecast: Vec<ForecastPoint>,
    pub params: ForecastParams,
}
