// src/services/leaderboard.rs

use crate::{
    config::LEADERBOARD_LIMIT,
    error::AppError,
    models::leaderboard::{FlushSummary, LeaderboardEntry, LeaderboardFilter},
    store::QuizStore,
};

/// A `questionCount` of 0 or less means "every quiz size".
fn size_filter(question_count: Option<i32>) -> Option<i32> {
    question_count.filter(|n| *n > 0)
}

/// Top completed sessions across all users.
pub async fn global_leaderboard(
    store: &dyn QuizStore,
    question_count: Option<i32>,
) -> Result<Vec<LeaderboardEntry>, AppError> {
    let filter = LeaderboardFilter {
        user_id: None,
        question_count: size_filter(question_count),
        limit: LEADERBOARD_LIMIT,
    };
    Ok(store.leaderboard(filter).await?)
}

/// Top completed sessions of a single user.
pub async fn user_leaderboard(
    store: &dyn QuizStore,
    user_id: i64,
    question_count: Option<i32>,
) -> Result<Vec<LeaderboardEntry>, AppError> {
    let filter = LeaderboardFilter {
        user_id: Some(user_id),
        question_count: size_filter(question_count),
        limit: LEADERBOARD_LIMIT,
    };
    Ok(store.leaderboard(filter).await?)
}

/// Wipes every quiz session and every seen-question row. Irrecoverable.
pub async fn flush_scoreboards(store: &dyn QuizStore) -> Result<FlushSummary, AppError> {
    let summary = store.flush().await?;
    tracing::warn!(
        "Scoreboards flushed: {} sessions and {} ledger rows deleted",
        summary.sessions_deleted,
        summary.ledger_rows_deleted
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::models::{question::NewQuestion, quiz_session::UpdateQuizRequest};
    use crate::services::{progress::user_progress, quiz, users::find_or_create_user};
    use crate::store::MemoryStore;

    async fn seeded(n: usize) -> MemoryStore {
        let store = MemoryStore::new();
        let questions: Vec<NewQuestion> = (1..=n)
            .map(|i| NewQuestion {
                question: format!("Question {}", i),
                options: [("A", "Yes"), ("B", "No")]
                    .into_iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
                answer: "A".to_string(),
                explanation: None,
            })
            .collect();
        store.seed_questions(&questions).await.unwrap();
        store
    }

    /// Runs a full quiz answering `correct` questions right.
    async fn play(store: &MemoryStore, name: &str, count: usize, correct: usize, elapsed: i32) -> i64 {
        let user = find_or_create_user(store, name).await.unwrap();
        let session = quiz::start_quiz(store, &user, count).await.unwrap();
        let answers: BTreeMap<i64, String> = session
            .question_ids
            .iter()
            .enumerate()
            .map(|(i, id)| (*id, if i < correct { "A" } else { "B" }.to_string()))
            .collect();
        quiz::update_session(
            store,
            session.id,
            UpdateQuizRequest {
                answers: Some(answers),
                time_elapsed: Some(elapsed),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        quiz::submit_session(store, session.id).await.unwrap();
        user.id
    }

    #[tokio::test]
    async fn higher_percentage_wins_regardless_of_time() {
        let store = seeded(20).await;
        play(&store, "Slow", 10, 9, 600).await; // 90%
        play(&store, "Fast", 10, 8, 30).await; // 80%

        let board = global_leaderboard(&store, None).await.unwrap();
        let names: Vec<&str> = board.iter().map(|e| e.display_name.as_str()).collect();
        assert_eq!(names, vec!["Slow", "Fast"]);
        assert_eq!(board[0].percentage, 90);
    }

    #[tokio::test]
    async fn equal_percentage_ranks_faster_first() {
        let store = seeded(20).await;
        play(&store, "Steady", 10, 9, 120).await;
        play(&store, "Quick", 10, 9, 90).await;

        let board = global_leaderboard(&store, None).await.unwrap();
        assert_eq!(board[0].display_name, "Quick");
        assert_eq!(board[0].time_elapsed, 90);
        assert_eq!(board[1].display_name, "Steady");
    }

    #[tokio::test]
    async fn question_count_filter_and_top_ten() {
        let store = seeded(20).await;
        for i in 0..12 {
            play(&store, &format!("Player {}", i), 10, i % 10, 100 + i as i32).await;
        }
        play(&store, "Long", 20, 20, 50).await;

        let ten = global_leaderboard(&store, Some(10)).await.unwrap();
        assert_eq!(ten.len(), 10);
        assert!(ten.iter().all(|e| e.total_questions == 10));

        let twenty = global_leaderboard(&store, Some(20)).await.unwrap();
        assert_eq!(twenty.len(), 1);

        // 0 behaves like no filter
        let all = global_leaderboard(&store, Some(0)).await.unwrap();
        assert_eq!(all[0].display_name, "Long");
    }

    #[tokio::test]
    async fn unfinished_sessions_are_not_ranked() {
        let store = seeded(20).await;
        let user = find_or_create_user(&store, "Idle").await.unwrap();
        quiz::start_quiz(&store, &user, 10).await.unwrap();
        assert!(global_leaderboard(&store, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn user_board_only_holds_that_user() {
        let store = seeded(20).await;
        let alice = play(&store, "Alice", 10, 5, 60).await;
        play(&store, "Bob", 10, 10, 60).await;
        play(&store, "Alice", 10, 7, 80).await;

        let board = user_leaderboard(&store, alice, None).await.unwrap();
        assert_eq!(board.len(), 2);
        assert!(board.iter().all(|e| e.display_name == "Alice"));
        assert_eq!(board[0].percentage, 70);
    }

    #[tokio::test]
    async fn flush_clears_sessions_and_progress() {
        let store = seeded(20).await;
        let alice = play(&store, "Alice", 10, 5, 60).await;
        let bob = play(&store, "Bob", 10, 10, 60).await;

        let summary = flush_scoreboards(&store).await.unwrap();
        assert_eq!(summary.sessions_deleted, 2);
        assert_eq!(summary.ledger_rows_deleted, 20);

        assert!(global_leaderboard(&store, None).await.unwrap().is_empty());
        for user in [alice, bob] {
            assert_eq!(user_progress(&store, user).await.unwrap().seen_questions, 0);
        }
    }
}
