// src/utils/mod.rs

pub mod admin;
pub mod percent;
pub mod slug;
