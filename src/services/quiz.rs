// src/services/quiz.rs

//! Quiz session lifecycle: start, inspect, save progress, submit.

use std::collections::{HashMap, HashSet};

use chrono::Utc;

use crate::{
    error::AppError,
    models::{
        question::Question,
        quiz_session::{
            NewQuizSession, QuizResults, QuizSession, QuizSessionDetail, SessionStatus,
            UpdateQuizRequest,
        },
        user::User,
    },
    services::{scoring::calculate_results, selector::select_question_ids},
    store::QuizStore,
};

/// Countdown granted to a session of `count` questions, in seconds.
pub fn time_limit_secs(count: usize) -> i32 {
    if count == 30 { 30 * 60 } else { 60 * 60 }
}

/// Creates a session of `count` questions for `user`, unseen questions first,
/// and records every selected question in the user's ledger.
pub async fn start_quiz(
    store: &dyn QuizStore,
    user: &User,
    count: usize,
) -> Result<QuizSession, AppError> {
    let pool = store.question_ids().await?;
    let seen: HashSet<i64> = store
        .seen_question_ids(user.id)
        .await?
        .into_iter()
        .collect();

    let selection = select_question_ids(&pool, &seen, count, &mut rand::thread_rng())
        .map_err(|e| {
            AppError::BadRequest(format!(
                "Requested {} questions but only {} are available",
                e.requested, e.available
            ))
        })?;

    if selection.reset_ledger {
        tracing::info!(
            "User {} has seen the whole pool ({} of {}), resetting progress",
            user.id,
            seen.len(),
            pool.len()
        );
    }

    let new = NewQuizSession {
        user_id: user.id,
        question_ids: selection.question_ids,
        time_remaining: time_limit_secs(count),
    };
    let session = store.create_session(&new, selection.reset_ledger).await?;

    tracing::info!(
        "Quiz session {} created for user {} with {} questions",
        session.id,
        user.id,
        session.total_questions
    );
    Ok(session)
}

pub async fn load_session(store: &dyn QuizStore, session_id: i64) -> Result<QuizSession, AppError> {
    store
        .get_session(session_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Quiz session not found".to_string()))
}

/// Fetches the session's questions in session order.
async fn ordered_questions(
    store: &dyn QuizStore,
    session: &QuizSession,
) -> Result<Vec<Question>, AppError> {
    let mut by_id: HashMap<i64, Question> = store
        .questions_by_ids(&session.question_ids)
        .await?
        .into_iter()
        .map(|q| (q.id, q))
        .collect();

    session
        .question_ids
        .iter()
        .map(|id| {
            by_id.remove(id).ok_or_else(|| {
                AppError::InternalServerError(format!(
                    "question {} of session {} is missing from the pool",
                    id, session.id
                ))
            })
        })
        .collect()
}

pub async fn session_detail(
    store: &dyn QuizStore,
    session_id: i64,
) -> Result<QuizSessionDetail, AppError> {
    let session = load_session(store, session_id).await?;
    let questions = ordered_questions(store, &session).await?;
    Ok(QuizSessionDetail { session, questions })
}

fn ensure_in_progress(session: &QuizSession) -> Result<(), AppError> {
    if session.is_completed() {
        tracing::warn!("Rejected write to completed quiz session {}", session.id);
        return Err(AppError::Conflict(format!(
            "Quiz session {} has already been submitted",
            session.id
        )));
    }
    Ok(())
}

/// Saves answers and timer state of an in-progress session.
pub async fn update_session(
    store: &dyn QuizStore,
    session_id: i64,
    req: UpdateQuizRequest,
) -> Result<QuizSession, AppError> {
    if req.completed == Some(true) {
        return Err(AppError::BadRequest(
            "Sessions are completed through the submit endpoint".to_string(),
        ));
    }

    let mut session = load_session(store, session_id).await?;
    ensure_in_progress(&session)?;

    if let Some(answers) = req.answers {
        let questions: HashMap<i64, Question> = store
            .questions_by_ids(&session.question_ids)
            .await?
            .into_iter()
            .map(|q| (q.id, q))
            .collect();

        for (question_id, key) in &answers {
            if !session.question_ids.contains(question_id) {
                return Err(AppError::BadRequest(format!(
                    "Question {} is not part of quiz session {}",
                    question_id, session.id
                )));
            }
            let valid_key = questions
                .get(question_id)
                .is_some_and(|q| q.has_option(key));
            if !valid_key {
                return Err(AppError::BadRequest(format!(
                    "'{}' is not an option of question {}",
                    key, question_id
                )));
            }
        }
        session.answers = answers;
    }

    if let Some(remaining) = req.time_remaining {
        session.time_remaining = Some(remaining);
    }
    if let Some(elapsed) = req.time_elapsed {
        session.time_elapsed = Some(elapsed);
    }

    let saved = store.update_session(&session).await?;
    tracing::debug!(
        "Saved quiz session {} ({} answers, version {})",
        saved.id,
        saved.answers.len(),
        saved.version
    );
    Ok(saved)
}

/// Scores a session once and finalizes it.
pub async fn submit_session(store: &dyn QuizStore, session_id: i64) -> Result<QuizResults, AppError> {
    let mut session = load_session(store, session_id).await?;
    ensure_in_progress(&session)?;

    let questions: HashMap<i64, Question> = ordered_questions(store, &session)
        .await?
        .into_iter()
        .map(|q| (q.id, q))
        .collect();

    let results = calculate_results(&session.question_ids, &session.answers, &questions)
        .map_err(|id| {
            AppError::InternalServerError(format!("question {} disappeared while scoring", id))
        })?;

    let now = Utc::now();
    let server_elapsed = (now - session.created_at).num_seconds().clamp(0, i32::MAX as i64) as i32;

    session.score = Some(results.score);
    session.percentage = Some(results.percentage);
    session.time_elapsed = Some(session.time_elapsed.unwrap_or(0));
    session.server_time_elapsed = Some(server_elapsed);
    session.status = SessionStatus::Completed;
    session.completed_at = Some(now);

    store.update_session(&session).await?;

    tracing::info!(
        "Quiz session {} submitted: {}/{} ({}%)",
        session.id,
        results.score,
        results.total_questions,
        results.percentage
    );
    Ok(results)
}

/// Sessions of one user, newest first.
pub async fn user_sessions(store: &dyn QuizStore, user_id: i64) -> Result<Vec<QuizSession>, AppError> {
    Ok(store.user_sessions(user_id).await?)
}
