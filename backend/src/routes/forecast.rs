use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::errors::AppError;
use crate::models::{DemandForecast, ForecastParams};
use crate::routes::parse_range;
use crate::services;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/:sku_id", get(get_forecast))
}

#[derive(Debug, Deserialize)]
struct ForecastQuery {
    months: Option<u32>,
    confidence: Option<u32>,
    seasonal: Option<bool>,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
}

async fn get_forecast(
    Path(sku_id): Path<String>,
    query: Result<Query<ForecastQuery>, QueryRejection>,
    State(state): State<AppState>,
) -> Result<Json<DemandForecast>, AppError> {
    let Query(query) = query?;
    let defaults = ForecastParams::default();
    let params = ForecastParams {
        horizon_months: query.months.unwrap_or(defaults.horizon_months),
        confidence_level: query.confidence.unwrap_or(defaults.confidence_level),
        seasonal_adjustment: query.seasonal.unwrap_or(defaults.seasonal_adjustment),
    };
    let range = parse_range(query.start, query.end)?;

    services::analytics_service::get_demand_forecast(state.sales_provider.as_ref(), &sku_id, range, params)
        .await
        .map(Json)
}
