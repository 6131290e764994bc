use axum::extract::{Json, State};
use axum::http::{HeaderMap, StatusCode};

use crate::error::{AppError, AppResult};
use crate::models::Document;
use crate::state::AppState;
use crate::validation::ExternalUploadInput;

pub const INGEST_KEY_HEADER: &str = "x-ingest-key";

pub async fn external_upload(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<ExternalUploadInput>,
) -> AppResult<(StatusCode, Json<Document>)> {
    if let Some(expected) = state.config.external_ingest_key.as_deref() {
        let provided = headers
            .get(INGEST_KEY_HEADER)
            .and_then(|value| value.to_str().ok());
        if provided != Some(expected) {
            tracing::warn!(
                service_name = %payload.service_name,
                "rejected external upload with missing or wrong ingest key"
            );
            return Err(AppError::unauthorized());
        }
    }

    let stored = state.ingest.external_upload(payload)?;
    Ok((StatusCode::CREATED, Json(stored)))
}
