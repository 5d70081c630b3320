use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use crate::errors::AppError;
use crate::models::SkuSummary;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list_skus))
}

async fn list_skus(State(state): State<AppState>) -> Result<Json<Vec<SkuSummary>>, AppError> {
    let skus = state.sales_provider.list_skus().await?;
    Ok(Json(skus))
}
