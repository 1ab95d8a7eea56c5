// src/services/seed.rs

use validator::Validate;

use crate::{error::AppError, models::question::NewQuestion, store::QuizStore};

/// Question pool compiled into the binary.
const EMBEDDED_QUESTIONS: &str = include_str!("../../data/questions.json");

/// Parses and validates a JSON array of questions.
pub fn parse_questions(json: &str) -> Result<Vec<NewQuestion>, AppError> {
    let questions: Vec<NewQuestion> = serde_json::from_str(json)?;
    for (index, question) in questions.iter().enumerate() {
        question.validate().map_err(|e| {
            AppError::BadRequest(format!("seed question #{} is invalid: {}", index + 1, e))
        })?;
    }
    Ok(questions)
}

/// Loads the pool from `path`, or the embedded pool when no path is given.
pub fn load_questions(path: Option<&str>) -> Result<Vec<NewQuestion>, AppError> {
    match path {
        Some(path) => {
            let json = std::fs::read_to_string(path).map_err(|e| {
                AppError::InternalServerError(format!("cannot read {}: {}", path, e))
            })?;
            parse_questions(&json)
        }
        None => parse_questions(EMBEDDED_QUESTIONS),
    }
}

/// Seeds the question table if it is still empty.
pub async fn seed_questions(store: &dyn QuizStore, path: Option<&str>) -> Result<u64, AppError> {
    let questions = load_questions(path)?;
    let inserted = store.seed_questions(&questions).await?;
    if inserted > 0 {
        tracing::info!("Seeded {} questions", inserted);
    } else {
        tracing::info!("Question pool already present, skipping seed");
    }
    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn embedded_pool_is_valid() {
        let questions = load_questions(None).unwrap();
        assert!(questions.len() >= 20);
    }

    #[test]
    fn rejects_answer_that_is_not_an_option() {
        let json = r#"[{"question": "Q?", "options": {"A": "x", "B": "y"}, "answer": "C"}]"#;
        assert!(matches!(parse_questions(json), Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn seeding_twice_inserts_once() {
        let store = MemoryStore::new();
        let first = seed_questions(&store, None).await.unwrap();
        assert!(first > 0);
        assert_eq!(seed_questions(&store, None).await.unwrap(), 0);
    }
}
