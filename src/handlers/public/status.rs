use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::database::SharedStore;
use crate::error::ApiError;

/// GET / - liveness
pub async fn root() -> &'static str {
    "Hello sp watch hut!"
}

/// GET /health - readiness, 503 while the store is unreachable
pub async fn health(State(store): State<SharedStore>) -> Result<Json<Value>, ApiError> {
    if let Err(e) = store.ping().await {
        tracing::error!("Store health check failed: {}", e);
        return Err(ApiError::service_unavailable("document store unavailable"));
    }

    Ok(Json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now(),
        "store": "ok"
    })))
}
