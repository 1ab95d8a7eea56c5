// src/services/progress.rs

use std::collections::HashSet;

use crate::{
    error::AppError,
    models::user::UserProgress,
    store::QuizStore,
    utils::percent::rounded_percentage,
};

/// Splits the pool into seen and unseen for one user.
pub fn compute_progress(pool: &[i64], seen: &[i64]) -> UserProgress {
    let seen: HashSet<i64> = seen.iter().copied().collect();
    let seen_count = pool.iter().filter(|id| seen.contains(id)).count();
    UserProgress {
        total_questions: pool.len(),
        seen_questions: seen_count,
        unseen_questions: pool.len() - seen_count,
        progress_percentage: rounded_percentage(seen_count, pool.len()),
    }
}

pub async fn user_progress(store: &dyn QuizStore, user_id: i64) -> Result<UserProgress, AppError> {
    let pool = store.question_ids().await?;
    let seen = store.seen_question_ids(user_id).await?;
    Ok(compute_progress(&pool, &seen))
}

pub async fn reset_progress(store: &dyn QuizStore, user_id: i64) -> Result<u64, AppError> {
    let removed = store.reset_seen(user_id).await?;
    tracing::info!("Reset progress for user {} ({} ledger rows removed)", user_id, removed);
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_only_ids_in_the_pool() {
        let pool: Vec<i64> = (1..=10).collect();
        let progress = compute_progress(&pool, &[1, 2, 3, 42]);
        assert_eq!(
            progress,
            UserProgress {
                total_questions: 10,
                seen_questions: 3,
                unseen_questions: 7,
                progress_percentage: 30,
            }
        );
    }

    #[test]
    fn empty_pool_reports_zero() {
        let progress = compute_progress(&[], &[]);
        assert_eq!(progress.progress_percentage, 0);
        assert_eq!(progress.unseen_questions, 0);
    }
}
