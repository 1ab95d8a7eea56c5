// src/config.rs

use std::env;
use dotenvy::dotenv;

/// Smallest quiz a user may request.
pub const MIN_QUESTION_COUNT: i32 = 20;

/// Largest quiz a user may request.
pub const MAX_QUESTION_COUNT: i32 = 60;

/// Leaderboards only ever show this many rows.
pub const LEADERBOARD_LIMIT: i64 = 10;

/// Id returned by the legacy "flush" login instead of a real user row.
pub const FLUSH_SENTINEL_USER_ID: i64 = 999;

#[derive(Debug, Clone)]
pub struct Config {
    /// Postgres connection string. The in-memory store is used when absent.
    pub database_url: Option<String>,
    pub rust_log: String,
    pub port: u16,
    pub log_dir: String,
    /// Optional JSON file that replaces the embedded question pool.
    pub questions_path: Option<String>,
    /// Shared secret for `/api/admin/*`. Admin routes refuse every call when unset.
    pub admin_token: Option<String>,
    /// Whether logging in as "flush" still wipes every session and ledger row.
    pub legacy_flush_login: bool,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url = non_empty_var("DATABASE_URL");

        let rust_log = env::var("RUST_LOG")
            .unwrap_or_else(|_| "info".to_string());

        let port = env::var("PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(10000);

        let log_dir = env::var("LOG_DIR")
            .unwrap_or_else(|_| "logs".to_string());

        let legacy_flush_login = env::var("LEGACY_FLUSH_LOGIN")
            .map(|v| parse_flag(&v))
            .unwrap_or(true);

        Self {
            database_url,
            rust_log,
            port,
            log_dir,
            questions_path: non_empty_var("QUESTIONS_PATH"),
            admin_token: non_empty_var("ADMIN_TOKEN"),
            legacy_flush_login,
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_flag(value: &str) -> bool {
    !matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "0" | "false" | "no" | "off"
    )
}
