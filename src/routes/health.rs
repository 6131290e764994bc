use axum::{http::StatusCode, response::Json};
use chrono::Utc;
use serde_json::json;

pub async fn health_check() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({ "status": "ok", "timestamp": Utc::now().to_rfc3339() })),
    )
}
