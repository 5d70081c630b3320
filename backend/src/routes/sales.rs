use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::errors::AppError;
use crate::models::{SalesBatch, SalesFeed};
use crate::routes::parse_range;
use crate::services;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_all_sales))
        .route("/sku", get(get_sku_sales))
}

#[derive(Debug, Deserialize)]
struct AllSalesQuery {
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
}

async fn get_all_sales(
    query: Result<Query<AllSalesQuery>, QueryRejection>,
    State(state): State<AppState>,
) -> Result<Json<SalesFeed>, AppError> {
    let Query(params) = query?;
    let range = parse_range(params.start, params.end)?;

    services::analytics_service::get_all_sales(state.sales_provider.as_ref(), range)
        .await
        .map(Json)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SkuSalesQuery {
    sku_id: Option<String>,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
}

async fn get_sku_sales(
    query: Result<Query<SkuSalesQuery>, QueryRejection>,
    State(state): State<AppState>,
) -> Result<Json<SalesBatch>, AppError> {
    let Query(params) = query?;
    let sku_id = params
        .sku_id
        .ok_or_else(|| AppError::Validation("SKU ID parameter is required".to_string()))?;
    let range = parse_range(params.start, params.end)?;

    services::analytics_service::get_sales(state.sales_provider.as_ref(), &sku_id, range)
        .await
        .map(Json)
}
