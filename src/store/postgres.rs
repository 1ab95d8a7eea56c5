// src/store/postgres.rs

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, types::Json};

use super::{QuizStore, StoreError};
use crate::models::{
    leaderboard::{FlushSummary, LeaderboardEntry, LeaderboardFilter},
    question::{NewQuestion, Question},
    quiz_session::{NewQuizSession, QuizSession},
    user::User,
};

/// `QuizStore` backed by the Postgres schema in `migrations/`.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Helper struct for reading the JSONB `options` column.
#[derive(FromRow)]
struct QuestionRow {
    id: i64,
    question: String,
    options: Json<BTreeMap<String, String>>,
    answer: String,
    explanation: Option<String>,
}

impl From<QuestionRow> for Question {
    fn from(row: QuestionRow) -> Self {
        Question {
            id: row.id,
            question: row.question,
            options: row.options.0,
            answer: row.answer,
            explanation: row.explanation,
        }
    }
}

/// Raw 'quiz_sessions' row; `status` is stored as text.
#[derive(FromRow)]
struct SessionRow {
    id: i64,
    user_id: i64,
    question_ids: Json<Vec<i64>>,
    answers: Json<BTreeMap<i64, String>>,
    total_questions: i32,
    status: String,
    time_remaining: Option<i32>,
    time_elapsed: Option<i32>,
    server_time_elapsed: Option<i32>,
    score: Option<i32>,
    percentage: Option<i32>,
    version: i32,
    created_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

impl TryFrom<SessionRow> for QuizSession {
    type Error = StoreError;

    fn try_from(row: SessionRow) -> Result<Self, Self::Error> {
        let status = row
            .status
            .parse()
            .map_err(|e| StoreError::Corrupt(format!("quiz session {}: {}", row.id, e)))?;
        Ok(QuizSession {
            id: row.id,
            user_id: row.user_id,
            question_ids: row.question_ids.0,
            answers: row.answers.0,
            total_questions: row.total_questions,
            status,
            time_remaining: row.time_remaining,
            time_elapsed: row.time_elapsed,
            server_time_elapsed: row.server_time_elapsed,
            score: row.score,
            percentage: row.percentage,
            version: row.version,
            created_at: row.created_at,
            completed_at: row.completed_at,
        })
    }
}

const QUESTION_COLUMNS: &str = "id, question, options, answer, explanation";

const USER_COLUMNS: &str = "id, username, display_name, created_at";

const SESSION_COLUMNS: &str = "id, user_id, question_ids, answers, total_questions, status, \
     time_remaining, time_elapsed, server_time_elapsed, score, percentage, version, \
     created_at, completed_at";

#[async_trait]
impl QuizStore for PgStore {
    async fn seed_questions(&self, questions: &[NewQuestion]) -> Result<u64, StoreError> {
        let mut tx = self.pool.begin().await?;

        // Two instances booting together must not both seed.
        sqlx::query("LOCK TABLE questions IN EXCLUSIVE MODE")
            .execute(&mut *tx)
            .await?;

        let (existing,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM questions")
            .fetch_one(&mut *tx)
            .await?;
        if existing > 0 {
            tx.rollback().await?;
            return Ok(0);
        }

        for q in questions {
            sqlx::query(
                "INSERT INTO questions (question, options, answer, explanation) VALUES ($1, $2, $3, $4)",
            )
            .bind(&q.question)
            .bind(Json(q.options.clone()))
            .bind(&q.answer)
            .bind(&q.explanation)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(questions.len() as u64)
    }

    async fn list_questions(&self) -> Result<Vec<Question>, StoreError> {
        let rows: Vec<QuestionRow> =
            sqlx::query_as(&format!("SELECT {} FROM questions ORDER BY id", QUESTION_COLUMNS))
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.into_iter().map(Question::from).collect())
    }

    async fn questions_by_ids(&self, ids: &[i64]) -> Result<Vec<Question>, StoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows: Vec<QuestionRow> = sqlx::query_as(&format!(
            "SELECT {} FROM questions WHERE id = ANY($1)",
            QUESTION_COLUMNS
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Question::from).collect())
    }

    async fn question_ids(&self) -> Result<Vec<i64>, StoreError> {
        let ids: Vec<(i64,)> = sqlx::query_as("SELECT id FROM questions ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(ids.into_iter().map(|(id,)| id).collect())
    }

    async fn find_user(&self, id: i64) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_user_by_display_name(
        &self,
        display_name: &str,
    ) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as(&format!(
            "SELECT {} FROM users WHERE display_name = $1 ORDER BY id LIMIT 1",
            USER_COLUMNS
        ))
        .bind(display_name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as(&format!(
            "SELECT {} FROM users WHERE username = $1",
            USER_COLUMNS
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn insert_user(&self, username: &str, display_name: &str) -> Result<User, StoreError> {
        let user = sqlx::query_as(&format!(
            "INSERT INTO users (username, display_name) VALUES ($1, $2) RETURNING {}",
            USER_COLUMNS
        ))
        .bind(username)
        .bind(display_name)
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }

    async fn create_session(
        &self,
        new: &NewQuizSession,
        reset_ledger: bool,
    ) -> Result<QuizSession, StoreError> {
        let mut tx = self.pool.begin().await?;

        if reset_ledger {
            sqlx::query("DELETE FROM user_question_history WHERE user_id = $1")
                .bind(new.user_id)
                .execute(&mut *tx)
                .await?;
        }

        let row: SessionRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO quiz_sessions (user_id, question_ids, answers, total_questions, time_remaining, time_elapsed)
            VALUES ($1, $2, '{{}}'::JSONB, $3, $4, 0)
            RETURNING {}
            "#,
            SESSION_COLUMNS
        ))
        .bind(new.user_id)
        .bind(Json(new.question_ids.clone()))
        .bind(new.total_questions())
        .bind(new.time_remaining)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO user_question_history (user_id, question_id)
            SELECT $1, q FROM UNNEST($2::BIGINT[]) AS q
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(new.user_id)
        .bind(&new.question_ids)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        QuizSession::try_from(row)
    }

    async fn get_session(&self, id: i64) -> Result<Option<QuizSession>, StoreError> {
        let row: Option<SessionRow> = sqlx::query_as(&format!(
            "SELECT {} FROM quiz_sessions WHERE id = $1",
            SESSION_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(QuizSession::try_from).transpose()
    }

    async fn user_sessions(&self, user_id: i64) -> Result<Vec<QuizSession>, StoreError> {
        let rows: Vec<SessionRow> = sqlx::query_as(&format!(
            "SELECT {} FROM quiz_sessions WHERE user_id = $1 ORDER BY created_at DESC, id DESC",
            SESSION_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(QuizSession::try_from).collect()
    }

    async fn update_session(&self, session: &QuizSession) -> Result<QuizSession, StoreError> {
        let row: Option<SessionRow> = sqlx::query_as(&format!(
            r#"
            UPDATE quiz_sessions SET
                answers = $3,
                status = $4,
                time_remaining = $5,
                time_elapsed = $6,
                server_time_elapsed = $7,
                score = $8,
                percentage = $9,
                completed_at = $10,
                version = version + 1
            WHERE id = $1 AND version = $2
            RETURNING {}
            "#,
            SESSION_COLUMNS
        ))
        .bind(session.id)
        .bind(session.version)
        .bind(Json(session.answers.clone()))
        .bind(session.status.as_str())
        .bind(session.time_remaining)
        .bind(session.time_elapsed)
        .bind(session.server_time_elapsed)
        .bind(session.score)
        .bind(session.percentage)
        .bind(session.completed_at)
        .fetch_optional(&self.pool)
        .await?;

        row.ok_or(StoreError::Stale { id: session.id })
            .and_then(QuizSession::try_from)
    }

    async fn seen_question_ids(&self, user_id: i64) -> Result<Vec<i64>, StoreError> {
        let ids: Vec<(i64,)> = sqlx::query_as(
            "SELECT question_id FROM user_question_history WHERE user_id = $1 ORDER BY question_id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(ids.into_iter().map(|(id,)| id).collect())
    }

    async fn mark_seen(&self, user_id: i64, question_ids: &[i64]) -> Result<(), StoreError> {
        if question_ids.is_empty() {
            return Ok(());
        }
        sqlx::query(
            r#"
            INSERT INTO user_question_history (user_id, question_id)
            SELECT $1, q FROM UNNEST($2::BIGINT[]) AS q
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(question_ids)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn reset_seen(&self, user_id: i64) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM user_question_history WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn leaderboard(
        &self,
        filter: LeaderboardFilter,
    ) -> Result<Vec<LeaderboardEntry>, StoreError> {
        let entries = sqlx::query_as::<_, LeaderboardEntry>(
            r#"
            SELECT
                s.id AS session_id,
                u.display_name,
                s.score,
                s.percentage,
                s.total_questions,
                s.time_elapsed,
                s.created_at
            FROM quiz_sessions s
            JOIN users u ON s.user_id = u.id
            WHERE s.status = 'completed'
              AND s.score IS NOT NULL
              AND s.percentage IS NOT NULL
              AND s.time_elapsed IS NOT NULL
              AND ($1::BIGINT IS NULL OR s.user_id = $1)
              AND ($2::INTEGER IS NULL OR s.total_questions = $2)
            ORDER BY s.percentage DESC, s.time_elapsed ASC, s.created_at ASC, s.id ASC
            LIMIT $3
            "#,
        )
        .bind(filter.user_id)
        .bind(filter.question_count)
        .bind(filter.limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(entries)
    }

    async fn flush(&self) -> Result<FlushSummary, StoreError> {
        let mut tx = self.pool.begin().await?;
        let sessions = sqlx::query("DELETE FROM quiz_sessions")
            .execute(&mut *tx)
            .await?;
        let ledger = sqlx::query("DELETE FROM user_question_history")
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(FlushSummary {
            sessions_deleted: sessions.rows_affected(),
            ledger_rows_deleted: ledger.rows_affected(),
        })
    }
}
