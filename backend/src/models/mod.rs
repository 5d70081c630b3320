mod analytics;
mod forecast;
mod product;
mod sales;

pub use analytics::{AnalyticsResponse, DailyPoint, GrowthStats, MonthlyPoint};
pub use forecast::{DemandForecast, ForecastParams, ForecastPoint};
pub use product::SkuSummary;
pub use sales::{DataSource, DateRange, SalesBatch, SalesFeed, SalesRecord};
