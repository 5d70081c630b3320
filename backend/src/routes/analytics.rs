use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::errors::AppError;
use crate::models::AnalyticsResponse;
use crate::routes::parse_range;
use crate::services;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/:sku_id", get(get_analytics))
}

#[derive(Debug, Deserialize)]
struct AnalyticsQuery {
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
}

async fn get_analytics(
    Path(sku_id): Path<String>,
    query: Result<Query<AnalyticsQuery>, QueryRejection>,
    State(state): State<AppState>,
) -> Result<Json<AnalyticsResponse>, AppError> {
    let Query(params) = query?;
    let range = parse_range(params.start, params.end)?;

    services::analytics_service::get_analytics(state.sales_provider.as_ref(), &sku_id, range)
        .await
        .map(Json)
}
