// src/store/memory.rs

use std::collections::{BTreeMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::{QuizStore, StoreError};
use crate::models::{
    leaderboard::{FlushSummary, LeaderboardEntry, LeaderboardFilter},
    question::{NewQuestion, Question},
    quiz_session::{NewQuizSession, QuizSession, SessionStatus},
    user::User,
};

/// Process-local store. Used by the test suite and when no `DATABASE_URL` is set.
///
/// Every operation takes the single lock, so multi-step writes such as
/// `create_session` are atomic.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    next_user_id: i64,
    next_question_id: i64,
    next_session_id: i64,
    users: BTreeMap<i64, User>,
    questions: BTreeMap<i64, Question>,
    sessions: BTreeMap<i64, QuizSession>,
    /// user id -> question id -> when it was first presented
    seen: BTreeMap<i64, BTreeMap<i64, DateTime<Utc>>>,
}

impl Inner {
    fn mark_seen(&mut self, user_id: i64, question_ids: &[i64], at: DateTime<Utc>) {
        let ledger = self.seen.entry(user_id).or_default();
        for id in question_ids {
            ledger.entry(*id).or_insert(at);
        }
    }

    fn reset_seen(&mut self, user_id: i64) -> u64 {
        self.seen
            .remove(&user_id)
            .map(|ledger| ledger.len() as u64)
            .unwrap_or(0)
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl QuizStore for MemoryStore {
    async fn seed_questions(&self, questions: &[NewQuestion]) -> Result<u64, StoreError> {
        let mut inner = self.inner.write().await;
        if !inner.questions.is_empty() {
            return Ok(0);
        }
        for q in questions {
            inner.next_question_id += 1;
            let id = inner.next_question_id;
            inner.questions.insert(
                id,
                Question {
                    id,
                    question: q.question.clone(),
                    options: q.options.clone(),
                    answer: q.answer.clone(),
                    explanation: q.explanation.clone(),
                },
            );
        }
        Ok(questions.len() as u64)
    }

    async fn list_questions(&self) -> Result<Vec<Question>, StoreError> {
        Ok(self.inner.read().await.questions.values().cloned().collect())
    }

    async fn questions_by_ids(&self, ids: &[i64]) -> Result<Vec<Question>, StoreError> {
        let inner = self.inner.read().await;
        let wanted: HashSet<i64> = ids.iter().copied().collect();
        Ok(wanted
            .into_iter()
            .filter_map(|id| inner.questions.get(&id).cloned())
            .collect())
    }

    async fn question_ids(&self) -> Result<Vec<i64>, StoreError> {
        Ok(self.inner.read().await.questions.keys().copied().collect())
    }

    async fn find_user(&self, id: i64) -> Result<Option<User>, StoreError> {
        Ok(self.inner.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_display_name(
        &self,
        display_name: &str,
    ) -> Result<Option<User>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .users
            .values()
            .find(|u| u.display_name == display_name)
            .cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.users.values().find(|u| u.username == username).cloned())
    }

    async fn insert_user(&self, username: &str, display_name: &str) -> Result<User, StoreError> {
        let mut inner = self.inner.write().await;
        if inner.users.values().any(|u| u.username == username) {
            return Err(StoreError::UniqueViolation(format!(
                "username '{}' already exists",
                username
            )));
        }
        inner.next_user_id += 1;
        let user = User {
            id: inner.next_user_id,
            username: username.to_string(),
            display_name: display_name.to_string(),
            created_at: Some(Utc::now()),
        };
        inner.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn create_session(
        &self,
        new: &NewQuizSession,
        reset_ledger: bool,
    ) -> Result<QuizSession, StoreError> {
        let mut inner = self.inner.write().await;
        let now = Utc::now();
        if reset_ledger {
            inner.reset_seen(new.user_id);
        }

        inner.next_session_id += 1;
        let session = QuizSession {
            id: inner.next_session_id,
            user_id: new.user_id,
            question_ids: new.question_ids.clone(),
            answers: BTreeMap::new(),
            total_questions: new.total_questions(),
            status: SessionStatus::InProgress,
            time_remaining: Some(new.time_remaining),
            time_elapsed: Some(0),
            server_time_elapsed: None,
            score: None,
            percentage: None,
            version: 0,
            created_at: now,
            completed_at: None,
        };
        inner.sessions.insert(session.id, session.clone());
        inner.mark_seen(new.user_id, &new.question_ids, now);
        Ok(session)
    }

    async fn get_session(&self, id: i64) -> Result<Option<QuizSession>, StoreError> {
        Ok(self.inner.read().await.sessions.get(&id).cloned())
    }

    async fn user_sessions(&self, user_id: i64) -> Result<Vec<QuizSession>, StoreError> {
        let inner = self.inner.read().await;
        let mut sessions: Vec<QuizSession> = inner
            .sessions
            .values()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect();
        sessions.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(sessions)
    }

    async fn update_session(&self, session: &QuizSession) -> Result<QuizSession, StoreError> {
        let mut inner = self.inner.write().await;
        let stored = inner
            .sessions
            .get_mut(&session.id)
            .filter(|stored| stored.version == session.version)
            .ok_or(StoreError::Stale { id: session.id })?;

        stored.answers = session.answers.clone();
        stored.status = session.status;
        stored.time_remaining = session.time_remaining;
        stored.time_elapsed = session.time_elapsed;
        stored.server_time_elapsed = session.server_time_elapsed;
        stored.score = session.score;
        stored.percentage = session.percentage;
        stored.completed_at = session.completed_at;
        stored.version += 1;
        Ok(stored.clone())
    }

    async fn seen_question_ids(&self, user_id: i64) -> Result<Vec<i64>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .seen
            .get(&user_id)
            .map(|ledger| ledger.keys().copied().collect())
            .unwrap_or_default())
    }

    async fn mark_seen(&self, user_id: i64, question_ids: &[i64]) -> Result<(), StoreError> {
        self.inner
            .write()
            .await
            .mark_seen(user_id, question_ids, Utc::now());
        Ok(())
    }

    async fn reset_seen(&self, user_id: i64) -> Result<u64, StoreError> {
        Ok(self.inner.write().await.reset_seen(user_id))
    }

    async fn leaderboard(
        &self,
        filter: LeaderboardFilter,
    ) -> Result<Vec<LeaderboardEntry>, StoreError> {
        let inner = self.inner.read().await;
        let mut entries: Vec<LeaderboardEntry> = inner
            .sessions
            .values()
            .filter(|s| s.status == SessionStatus::Completed)
            .filter(|s| filter.user_id.is_none_or(|uid| s.user_id == uid))
            .filter(|s| filter.question_count.is_none_or(|n| s.total_questions == n))
            .filter_map(|s| {
                let user = inner.users.get(&s.user_id)?;
                Some(LeaderboardEntry {
                    session_id: s.id,
                    display_name: user.display_name.clone(),
                    score: s.score?,
                    percentage: s.percentage?,
                    total_questions: s.total_questions,
                    time_elapsed: s.time_elapsed?,
                    created_at: s.created_at,
                })
            })
            .collect();

        entries.sort_by(|a, b| {
            b.percentage
                .cmp(&a.percentage)
                .then(a.time_elapsed.cmp(&b.time_elapsed))
                .then(a.created_at.cmp(&b.created_at))
                .then(a.session_id.cmp(&b.session_id))
        });
        entries.truncate(filter.limit.max(0) as usize);
        Ok(entries)
    }

    async fn flush(&self) -> Result<FlushSummary, StoreError> {
        let mut inner = self.inner.write().await;
        let summary = FlushSummary {
            sessions_deleted: inner.sessions.len() as u64,
            ledger_rows_deleted: inner.seen.values().map(|l| l.len() as u64).sum(),
        };
        inner.sessions.clear();
        inner.seen.clear();
        Ok(summary)
    }
}
