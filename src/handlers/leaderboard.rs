// src/handlers/leaderboard.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};

use crate::{
    error::AppError,
    models::leaderboard::LeaderboardQuery,
    services::{leaderboard, users::require_user},
    store::DynStore,
};

/// Top 10 completed sessions across all users.
pub async fn global(
    State(store): State<DynStore>,
    Query(params): Query<LeaderboardQuery>,
) -> Result<impl IntoResponse, AppError> {
    let entries = leaderboard::global_leaderboard(store.as_ref(), params.question_count)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch global leaderboard: {:?}", e);
            e
        })?;

    Ok(Json(entries))
}

/// Top 10 completed sessions of one user.
pub async fn for_user(
    State(store): State<DynStore>,
    Path(user_id): Path<i64>,
    Query(params): Query<LeaderboardQuery>,
) -> Result<impl IntoResponse, AppError> {
    require_user(store.as_ref(), user_id).await?;
    let entries =
        leaderboard::user_leaderboard(store.as_ref(), user_id, params.question_count).await?;

    Ok(Json(entries))
}
