// src/handlers/questions.rs

use axum::{Json, extract::State, response::IntoResponse};

use crate::{error::AppError, store::DynStore};

/// Lists the whole question pool, answers included.
pub async fn list_questions(State(store): State<DynStore>) -> Result<impl IntoResponse, AppError> {
    let questions = store.list_questions().await.map_err(|e| {
        tracing::error!("Failed to fetch questions: {:?}", e);
        AppError::from(e)
    })?;

    Ok(Json(questions))
}
