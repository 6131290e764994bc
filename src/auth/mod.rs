pub mod jwt;
pub mod password;

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use axum_extra::headers::{authorization::Bearer, Authorization};
use axum_extra::TypedHeader;
use serde::{Deserialize, Serialize};

use crate::{error::AppError, state::AppState};

/// Mints and checks bearer tokens. Verification needs no server-side state.
pub trait TokenIssuer: Send + Sync + 'static {
    fn issue(&self, user_id: i64) -> anyhow::Result<IssuedToken>;

    /// `None` means unauthenticated: malformed, tampered or expired.
    fn verify(&self, token: &str) -> Option<i64>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: String,
    pub expires_in: i64,
}

/// Caller identity resolved from the `Authorization: Bearer` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    pub user_id: i64,
}

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| AppError::unauthorized())?;

        let user_id = state
            .tokens
            .verify(bearer.token())
            .ok_or_else(AppError::unauthorized)?;

        Ok(AuthenticatedUser { user_id })
    }
}
