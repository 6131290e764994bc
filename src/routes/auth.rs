use axum::{extract::State, http::StatusCode, Json};

use crate::{
    accounts::AuthSession,
    auth::AuthenticatedUser,
    error::AppResult,
    models::UserProfile,
    state::AppState,
    validation::{LoginInput, RegisterInput},
};

pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterInput>,
) -> AppResult<(StatusCode, Json<AuthSession>)> {
    let session = state.accounts.register(payload)?;
    Ok((StatusCode::CREATED, Json(session)))
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginInput>,
) -> AppResult<Json<AuthSession>> {
    Ok(Json(state.accounts.login(payload)?))
}

pub async fn me(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> AppResult<Json<UserProfile>> {
    Ok(Json(state.accounts.profile(user.user_id)?))
}
