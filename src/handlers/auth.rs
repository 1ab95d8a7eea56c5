// src/handlers/auth.rs

use axum::{Json, extract::State, response::IntoResponse};
use validator::Validate;

use crate::{
    config::{Config, FLUSH_SENTINEL_USER_ID},
    error::AppError,
    models::user::{LoginRequest, User},
    services::{leaderboard::flush_scoreboards, users::find_or_create_user},
    store::DynStore,
};

/// Logs a user in by display name, creating the user on first use.
///
/// While `LEGACY_FLUSH_LOGIN` is on, the name "flush" (any case) wipes every
/// quiz session and ledger row instead and answers with a synthetic user.
pub async fn login(
    State(store): State<DynStore>,
    State(config): State<Config>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    if config.legacy_flush_login && payload.user_name.trim().eq_ignore_ascii_case("flush") {
        flush_scoreboards(store.as_ref()).await?;
        return Ok(Json(User {
            id: FLUSH_SENTINEL_USER_ID,
            username: "flush".to_string(),
            display_name: "Scoreboards Flushed".to_string(),
            created_at: None,
        }));
    }

    let user = find_or_create_user(store.as_ref(), &payload.user_name).await?;
    Ok(Json(user))
}
