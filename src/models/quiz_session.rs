// src/models/quiz_session.rs

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::config::{MAX_QUESTION_COUNT, MIN_QUESTION_COUNT};
use crate::models::question::Question;

/// Lifecycle of a quiz session. `Completed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    InProgress,
    Completed,
}

impl SessionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SessionStatus::InProgress => "in_progress",
            SessionStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in_progress" => Ok(SessionStatus::InProgress),
            "completed" => Ok(SessionStatus::Completed),
            other => Err(format!("unknown session status '{}'", other)),
        }
    }
}

/// Represents the 'quiz_sessions' table in the database.
/// One attempt at a quiz, from question selection through submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizSession {
    pub id: i64,
    pub user_id: i64,

    /// Question ids in presentation order. Length equals `total_questions`.
    pub question_ids: Vec<i64>,

    /// Question id to chosen option key. Keys are always a subset of `question_ids`.
    pub answers: BTreeMap<i64, String>,

    pub total_questions: i32,
    pub status: SessionStatus,

    /// Client-reported countdown state.
    pub time_remaining: Option<i32>,
    pub time_elapsed: Option<i32>,

    /// Seconds between creation and submission as measured by the server.
    pub server_time_elapsed: Option<i32>,

    pub score: Option<i32>,
    pub percentage: Option<i32>,

    /// Optimistic concurrency counter, bumped by every successful write.
    pub version: i32,

    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl QuizSession {
    pub fn is_completed(&self) -> bool {
        self.status == SessionStatus::Completed
    }
}

/// Values for a session about to be inserted.
#[derive(Debug, Clone)]
pub struct NewQuizSession {
    pub user_id: i64,
    pub question_ids: Vec<i64>,
    pub time_remaining: i32,
}

impl NewQuizSession {
    pub fn total_questions(&self) -> i32 {
        self.question_ids.len() as i32
    }
}

fn default_question_count() -> i32 {
    MIN_QUESTION_COUNT
}

/// DTO for `POST /api/quiz/start`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct StartQuizRequest {
    #[serde(default = "default_question_count")]
    #[validate(range(
        min = MIN_QUESTION_COUNT,
        max = MAX_QUESTION_COUNT,
        message = "Question count must be between 20 and 60."
    ))]
    pub question_count: i32,

    #[validate(length(
        min = 1,
        max = 50,
        message = "User name length must be between 1 and 50 characters."
    ))]
    pub user_name: String,
}

/// DTO for `PUT /api/quiz/{id}`. Absent fields are left untouched.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateQuizRequest {
    /// Replaces the stored answers wholesale.
    pub answers: Option<BTreeMap<i64, String>>,
    #[validate(range(min = 0))]
    pub time_remaining: Option<i32>,
    #[validate(range(min = 0))]
    pub time_elapsed: Option<i32>,
    pub completed: Option<bool>,
}

/// Response for `GET /api/quiz/{id}`.
#[derive(Debug, Serialize)]
pub struct QuizSessionDetail {
    pub session: QuizSession,
    /// Questions in the session's presentation order.
    pub questions: Vec<Question>,
}

/// Per-question outcome included in the submit response.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionResult {
    pub question_id: i64,
    pub question: String,
    pub options: BTreeMap<String, String>,
    pub correct_answer: String,
    pub user_answer: Option<String>,
    pub is_correct: bool,
}

/// Response for `POST /api/quiz/{id}/submit`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizResults {
    pub score: i32,
    pub total_questions: i32,
    pub percentage: i32,
    pub results: Vec<QuestionResult>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_its_column_text() {
        for status in [SessionStatus::InProgress, SessionStatus::Completed] {
            assert_eq!(status.as_str().parse::<SessionStatus>(), Ok(status));
        }
        assert!("abandoned".parse::<SessionStatus>().is_err());
    }

    #[test]
    fn start_request_defaults_to_twenty_questions() {
        let req: StartQuizRequest = serde_json::from_str(r#"{"userName":"Alice"}"#).unwrap();
        assert_eq!(req.question_count, 20);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn start_request_rejects_out_of_range_counts() {
        for count in [19, 61, 0] {
            let req = StartQuizRequest {
                question_count: count,
                user_name: "Alice".into(),
            };
            assert!(req.validate().is_err(), "count {} should be rejected", count);
        }
    }

    #[test]
    fn start_request_accepts_both_bounds() {
        for count in [MIN_QUESTION_COUNT, MAX_QUESTION_COUNT] {
            let req = StartQuizRequest {
                question_count: count,
                user_name: "Alice".into(),
            };
            assert!(req.validate().is_ok(), "count {} should be accepted", count);
        }
    }

    #[test]
    fn update_request_parses_string_keyed_answers() {
        let req: UpdateQuizRequest =
            serde_json::from_str(r#"{"answers":{"3":"B","11":"D"},"timeElapsed":42}"#).unwrap();
        let answers = req.answers.unwrap();
        assert_eq!(answers.get(&3).map(String::as_str), Some("B"));
        assert_eq!(answers.get(&11).map(String::as_str), Some("D"));
        assert_eq!(req.time_elapsed, Some(42));
    }

    #[test]
    fn update_request_rejects_negative_time() {
        let req = UpdateQuizRequest {
            time_elapsed: Some(-1),
            ..Default::default()
        };
        assert!(req.validate().is_err());
    }
}
