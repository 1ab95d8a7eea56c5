// src/services/scoring.rs

use std::collections::{BTreeMap, HashMap};

use crate::models::{
    question::Question,
    quiz_session::{QuestionResult, QuizResults},
};
use crate::utils::percent::rounded_percentage;

/// Scores a session.
///
/// Walks `question_ids` in session order and compares the stored answer (if any)
/// with the question's correct key. Ids missing from `questions` are returned
/// as `Err` so a broken pool never yields a silently inflated percentage.
pub fn calculate_results(
    question_ids: &[i64],
    answers: &BTreeMap<i64, String>,
    questions: &HashMap<i64, Question>,
) -> Result<QuizResults, i64> {
    let mut results = Vec::with_capacity(question_ids.len());
    let mut correct_count = 0;

    for id in question_ids {
        let question = questions.get(id).ok_or(*id)?;
        let user_answer = answers.get(id).cloned();
        // Strict key match: "a" is not "A".
        let is_correct = user_answer.as_deref() == Some(question.answer.as_str());
        if is_correct {
            correct_count += 1;
        }

        results.push(QuestionResult {
            question_id: question.id,
            question: question.question.clone(),
            options: question.options.clone(),
            correct_answer: question.answer.clone(),
            user_answer,
            is_correct,
        });
    }

    Ok(QuizResults {
        score: correct_count as i32,
        total_questions: question_ids.len() as i32,
        percentage: rounded_percentage(correct_count, question_ids.len()),
        results,
    })
}
