// src/models/leaderboard.rs

use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;

/// Aggregated struct for displaying a leaderboard row.
/// Represents a completed session joined with its user.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub session_id: i64,
    pub display_name: String,
    pub score: i32,
    pub percentage: i32,
    pub total_questions: i32,
    pub time_elapsed: i32,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// `?questionCount=` filter shared by both leaderboards.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardQuery {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub question_count: Option<i32>,
}

/// `?questionCount=` with no value means no filter.
fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

/// Which completed sessions a leaderboard read considers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LeaderboardFilter {
    /// Restrict to one user's sessions.
    pub user_id: Option<i64>,
    /// Restrict to sessions of exactly this size.
    pub question_count: Option<i32>,
    pub limit: i64,
}

/// Rows removed by a flush.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlushSummary {
    pub sessions_deleted: u64,
    pub ledger_rows_deleted: u64,
}
