use axum::extract::{Json, Path, Query, State};
use axum::http::StatusCode;
use serde::Serialize;
use serde_json::Value;

use crate::auth::AuthenticatedUser;
use crate::error::{AppResult, ArchiveError};
use crate::models::{Document, DocumentPage};
use crate::state::AppState;
use crate::validation::{
    document_patch_from_json, ListDocumentsInput, SearchDocumentsInput, UploadDocumentInput,
};

#[derive(Serialize)]
pub struct DeleteDocumentResponse {
    pub deleted: bool,
}

pub async fn upload_document(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(payload): Json<UploadDocumentInput>,
) -> AppResult<(StatusCode, Json<Document>)> {
    let document = payload.into_new_document()?;
    let stored = state.documents.create(document, user.user_id)?;
    Ok((StatusCode::CREATED, Json(stored)))
}

pub async fn list_documents(
    State(state): State<AppState>,
    Query(params): Query<ListDocumentsInput>,
    user: AuthenticatedUser,
) -> AppResult<Json<DocumentPage>> {
    let pagination = params.pagination()?;
    let page = state
        .documents
        .list(user.user_id, params.file_type, pagination)?;
    Ok(Json(page))
}

pub async fn search_documents(
    State(state): State<AppState>,
    Query(params): Query<SearchDocumentsInput>,
    user: AuthenticatedUser,
) -> AppResult<Json<DocumentPage>> {
    let pagination = params.validate()?;
    let page = state
        .documents
        .search(user.user_id, &params.query, params.file_type, pagination)?;
    Ok(Json(page))
}

pub async fn get_document(
    State(state): State<AppState>,
    Path(document_id): Path<i64>,
    user: AuthenticatedUser,
) -> AppResult<Json<Document>> {
    state
        .documents
        .get(document_id, user.user_id)?
        .map(Json)
        .ok_or_else(|| ArchiveError::NotFoundOrForbidden.into())
}

pub async fn update_document(
    State(state): State<AppState>,
    Path(document_id): Path<i64>,
    user: AuthenticatedUser,
    Json(payload): Json<Value>,
) -> AppResult<Json<Document>> {
    let patch = document_patch_from_json(&payload)?;
    let updated = state.documents.update(document_id, user.user_id, &patch)?;
    Ok(Json(updated))
}

pub async fn delete_document(
    State(state): State<AppState>,
    Path(document_id): Path<i64>,
    user: AuthenticatedUser,
) -> AppResult<Json<DeleteDocumentResponse>> {
    let deleted = state.documents.delete(document_id, user.user_id)?;
    Ok(Json(DeleteDocumentResponse { deleted }))
}
