use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use diesel::result::DatabaseErrorKind;
use serde::Serialize;
use std::fmt::Display;
use thiserror::Error;

pub type ArchiveResult<T> = Result<T, ArchiveError>;
pub type AppResult<T> = Result<T, AppError>;

/// Failures produced by the document access layer.
///
/// Not-found and not-owned are deliberately one variant so callers cannot
/// probe for the existence of other users' documents.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ArchiveError {
    #[error("a user with this email already exists")]
    DuplicateEmail,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("user not found")]
    UserNotFound,
    #[error("document not found")]
    NotFoundOrForbidden,
    #[error("{0}")]
    Validation(String),
    #[error("storage failure: {0}")]
    Storage(String),
}

impl ArchiveError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn storage<E: Display>(error: E) -> Self {
        Self::Storage(error.to_string())
    }
}

impl From<diesel::result::Error> for ArchiveError {
    fn from(value: diesel::result::Error) -> Self {
        match value {
            diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info)
                if info.constraint_name() == Some("users_email_key") =>
            {
                ArchiveError::DuplicateEmail
            }
            _ => ArchiveError::storage(value),
        }
    }
}

impl From<diesel::r2d2::PoolError> for ArchiveError {
    fn from(value: diesel::r2d2::PoolError) -> Self {
        ArchiveError::storage(format!("database pool error: {value}"))
    }
}

#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
}

impl AppError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "unauthorized")
    }

    pub fn internal<E: Display>(error: E) -> Self {
        tracing::error!(error = %error, "internal error");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status;
        let body = Json(ErrorResponse {
            error: self.message,
        });
        (status, body).into_response()
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl From<ArchiveError> for AppError {
    fn from(value: ArchiveError) -> Self {
        match value {
            ArchiveError::Validation(message) => AppError::bad_request(message),
            ArchiveError::InvalidCredentials => {
                AppError::new(StatusCode::UNAUTHORIZED, value.to_string())
            }
            ArchiveError::DuplicateEmail => AppError::new(StatusCode::CONFLICT, value.to_string()),
            ArchiveError::UserNotFound | ArchiveError::NotFoundOrForbidden => {
                AppError::new(StatusCode::NOT_FOUND, value.to_string())
            }
            ArchiveError::Storage(_) => AppError::internal(value),
        }
    }
}
