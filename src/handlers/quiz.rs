// src/handlers/quiz.rs

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use validator::Validate;

use crate::{
    error::AppError,
    models::quiz_session::{StartQuizRequest, UpdateQuizRequest},
    services::{quiz, users::find_or_create_user},
    store::DynStore,
};

/// Starts a quiz session.
///
/// * Finds or creates the user by display name.
/// * Selects `questionCount` questions, unseen ones first.
/// * Marks the selected questions seen before answering.
pub async fn start_quiz(
    State(store): State<DynStore>,
    Json(req): Json<StartQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = req.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let user = find_or_create_user(store.as_ref(), &req.user_name).await?;
    let session = quiz::start_quiz(store.as_ref(), &user, req.question_count as usize).await?;

    Ok(Json(session))
}

/// Returns a session together with its questions in presentation order.
pub async fn get_quiz(
    State(store): State<DynStore>,
    Path(session_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let detail = quiz::session_detail(store.as_ref(), session_id).await?;
    Ok(Json(detail))
}

/// Saves answers and timer state. Rejected once the session is completed.
pub async fn update_quiz(
    State(store): State<DynStore>,
    Path(session_id): Path<i64>,
    Json(req): Json<UpdateQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = req.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let session = quiz::update_session(store.as_ref(), session_id, req).await?;
    Ok(Json(session))
}

/// Scores the session and completes it. A second submit is a 409.
pub async fn submit_quiz(
    State(store): State<DynStore>,
    Path(session_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let results = quiz::submit_session(store.as_ref(), session_id).await?;
    Ok(Json(results))
}
