// src/store/mod.rs

//! Storage port for users, questions, quiz sessions and the seen-question
//! ledger, with a Postgres adapter and an in-memory adapter.

use std::sync::Arc;

use async_trait::async_trait;

use crate::models::{
    leaderboard::{FlushSummary, LeaderboardEntry, LeaderboardFilter},
    question::{NewQuestion, Question},
    quiz_session::{NewQuizSession, QuizSession},
    user::User,
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Shared handle the router state carries.
pub type DynStore = Arc<dyn QuizStore>;

/// Errors raised by storage adapters.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A unique constraint rejected the write.
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),

    /// The session changed since it was read.
    #[error("quiz session {id} has a newer version")]
    Stale { id: i64 },

    /// A stored row could not be mapped back into a record.
    #[error("corrupt row: {0}")]
    Corrupt(String),

    /// Query or connection failure.
    #[error("storage query failed: {0}")]
    Query(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let Some(db_err) = err.as_database_error() {
            if db_err.is_unique_violation() {
                return StoreError::UniqueViolation(db_err.message().to_string());
            }
        }
        StoreError::Query(err.to_string())
    }
}

#[async_trait]
pub trait QuizStore: Send + Sync {
    /// Insert the pool only when no question exists yet. Returns rows inserted.
    async fn seed_questions(&self, questions: &[NewQuestion]) -> Result<u64, StoreError>;

    /// All questions ordered by id.
    async fn list_questions(&self) -> Result<Vec<Question>, StoreError>;

    /// Questions with the given ids, in no particular order. Unknown ids are skipped.
    async fn questions_by_ids(&self, ids: &[i64]) -> Result<Vec<Question>, StoreError>;

    /// Ids of the whole pool ordered by id.
    async fn question_ids(&self) -> Result<Vec<i64>, StoreError>;

    async fn find_user(&self, id: i64) -> Result<Option<User>, StoreError>;

    async fn find_user_by_display_name(
        &self,
        display_name: &str,
    ) -> Result<Option<User>, StoreError>;

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    /// Fails with `StoreError::UniqueViolation` when the username is taken.
    async fn insert_user(&self, username: &str, display_name: &str) -> Result<User, StoreError>;

    /// Insert a session and mark its questions seen for its user, atomically.
    /// With `reset_ledger` the user's ledger is cleared first, inside the same unit.
    /// The caller decides `reset_ledger` from an earlier read, so concurrent starts are
    /// last-write-wins on the ledger.
    async fn create_session(
        &self,
        new: &NewQuizSession,
        reset_ledger: bool,
    ) -> Result<QuizSession, StoreError>;

    async fn get_session(&self, id: i64) -> Result<Option<QuizSession>, StoreError>;

    /// Sessions of one user, newest first.
    async fn user_sessions(&self, user_id: i64) -> Result<Vec<QuizSession>, StoreError>;

    /// Persist the mutable fields of `session` if the stored version still equals
    /// `session.version`. Returns the stored row with its bumped version.
    async fn update_session(&self, session: &QuizSession) -> Result<QuizSession, StoreError>;

    async fn seen_question_ids(&self, user_id: i64) -> Result<Vec<i64>, StoreError>;

    /// Idempotent: ids already recorded for the user are ignored.
    async fn mark_seen(&self, user_id: i64, question_ids: &[i64]) -> Result<(), StoreError>;

    /// Delete every ledger row of the user. Returns rows deleted.
    async fn reset_seen(&self, user_id: i64) -> Result<u64, StoreError>;

    /// Completed sessions ranked by percentage desc, then elapsed time asc.
    async fn leaderboard(
        &self,
        filter: LeaderboardFilter,
    ) -> Result<Vec<LeaderboardEntry>, StoreError>;

    /// Delete every quiz session and every ledger row.
    async fn flush(&self) -> Result<FlushSummary, StoreError>;
}
