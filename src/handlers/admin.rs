// src/handlers/admin.rs

use axum::{Json, extract::State, response::IntoResponse};

use crate::{error::AppError, services::leaderboard::flush_scoreboards, store::DynStore};

/// Deletes every quiz session and every seen-question row.
/// Admin only.
pub async fn flush(State(store): State<DynStore>) -> Result<impl IntoResponse, AppError> {
    let summary = flush_scoreboards(store.as_ref()).await?;
    Ok(Json(summary))
}
