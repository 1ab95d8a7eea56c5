// src/handlers/user.rs

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use serde_json::json;

use crate::{
    error::AppError,
    services::{progress, quiz, users::require_user},
    store::DynStore,
};

/// Seen/unseen breakdown of the pool for a user.
pub async fn get_progress(
    State(store): State<DynStore>,
    Path(user_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    require_user(store.as_ref(), user_id).await?;
    let progress = progress::user_progress(store.as_ref(), user_id).await?;
    Ok(Json(progress))
}

/// Clears the user's seen-question ledger.
pub async fn reset_progress(
    State(store): State<DynStore>,
    Path(user_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    require_user(store.as_ref(), user_id).await?;
    progress::reset_progress(store.as_ref(), user_id).await?;
    Ok(Json(json!({ "message": "Progress reset successfully" })))
}

/// Every session of the user, newest first.
pub async fn list_sessions(
    State(store): State<DynStore>,
    Path(user_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    require_user(store.as_ref(), user_id).await?;
    let sessions = quiz::user_sessions(store.as_ref(), user_id).await?;
    Ok(Json(sessions))
}
