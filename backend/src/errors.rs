use axum::extract::rejection::QueryRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::external::sales_provider::SalesProviderError;
use crate::services::forecasting_service::ForecastError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Not found")]
    NotFound,
    #[error("Insufficient data: {0}")]
    InsufficientData(String),
    #[error("External error: {0}")]
    External(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::InsufficientData(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::External(_) => StatusCode::BAD_GATEWAY,
            AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let message = match &self {
            AppError::Config(_) => "Internal server error".to_string(),
            other => other.to_string(),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<SalesProviderError> for AppError {
    fn from(value: SalesProviderError) -> Self {
        AppError::External(value.to_string())
    }
}

impl From<ForecastError> for AppError {
    fn from(value: ForecastError) -> Self {
        match value {
            ForecastError::InsufficientData { .. } => AppError::InsufficientData(value.to_string()),
            ForecastError::InvalidParams(msg) => AppError::Validation(msg),
        }
    }
}

impl From<String> for AppError {
    fn from(value: String) -> Self {
        AppError::Validation(value)
    }
}

impl From<QueryRejection> for AppError {
    fn from(value: QueryRejection) -> Self {
        AppError::Validation(value.body_text())
    }
}
