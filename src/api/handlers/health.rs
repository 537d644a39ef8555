use axum::Json;
use serde_json::{json, Value};

/// Liveness check
#[utoipa::path(
    get,
    path = "/",
    responses((status = 200, description = "Service is up")),
    tag = "health"
)]
pub async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
