pub mod aggregation_service;
pub mod analytics_service;
pub mod failure_cache;
pub mod forecasting_service;
pub mod growth_service;
