// src/models/user.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'users' table in the database.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,

    /// Slug of the display name; unique.
    pub username: String,

    /// The name the user typed at login. Used as the lookup key.
    pub display_name: String,

    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// DTO for the name-only login.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[validate(length(
        min = 1,
        max = 50,
        message = "User name length must be between 1 and 50 characters."
    ))]
    pub user_name: String,
}

/// Seen/unseen breakdown of the question pool for one user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProgress {
    pub total_questions: usize,
    pub seen_questions: usize,
    pub unseen_questions: usize,
    pub progress_percentage: i32,
}
