use axum::{
    extract::State,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tracing::debug;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(health))
        .route("/upstream", get(upstream_status))
}

async fn health() -> &'static str {
    debug!("GET /health - Health check");
    "OK"
}

/// How many SKUs are currently being served synthetic data after an upstream failure.
async fn upstream_status(State(state): State<AppState>) -> Json<Value> {
    state.failure_cache.cleanup_expired();
    let failing = state.failure_cache.len();

    Json(json!({
        "status": if failing == 0 { "ok" } else { "degraded" },
        "skus_on_fallback": failing,
    }))
}
