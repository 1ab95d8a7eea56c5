// src/services/mod.rs

pub mod leaderboard;
pub mod progress;
pub mod quiz;
pub mod scoring;
pub mod seed;
pub mod selector;
pub mod users;
