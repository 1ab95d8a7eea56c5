// src/models/question.rs

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// A multiple-choice question from the immutable pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: i64,

    /// The question prompt.
    pub question: String,

    /// Option key ("A", "B", ...) to option text.
    pub options: BTreeMap<String, String>,

    /// Key of the correct option.
    pub answer: String,

    pub explanation: Option<String>,
}

impl Question {
    pub fn has_option(&self, key: &str) -> bool {
        self.options.contains_key(key)
    }
}

/// A question as it appears in the seed file, before it has an id.
#[derive(Debug, Clone, Deserialize, Validate)]
#[validate(schema(function = validate_answer_key))]
pub struct NewQuestion {
    #[validate(length(min = 1, max = 2000))]
    pub question: String,
    #[validate(custom(function = validate_options))]
    pub options: BTreeMap<String, String>,
    #[validate(length(min = 1, max = 10))]
    pub answer: String,
    #[validate(length(max = 4000))]
    #[serde(default)]
    pub explanation: Option<String>,
}

fn validate_options(options: &BTreeMap<String, String>) -> Result<(), ValidationError> {
    if options.len() < 2 {
        return Err(ValidationError::new("options_need_at_least_two_entries"));
    }
    for (key, text) in options {
        if key.trim().is_empty() || text.trim().is_empty() {
            return Err(ValidationError::new("option_cannot_be_blank"));
        }
    }
    Ok(())
}

fn validate_answer_key(question: &NewQuestion) -> Result<(), ValidationError> {
    if !question.options.contains_key(&question.answer) {
        return Err(ValidationError::new("answer_must_be_an_option_key"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(keys: &[&str]) -> BTreeMap<String, String> {
        keys.iter()
            .map(|k| (k.to_string(), format!("Option {}", k)))
            .collect()
    }

    #[test]
    fn accepts_answer_that_is_an_option() {
        let q = NewQuestion {
            question: "Which phase defines the baseline?".into(),
            options: options(&["A", "B", "C"]),
            answer: "B".into(),
            explanation: None,
        };
        assert!(q.validate().is_ok());
    }

    #[test]
    fn rejects_answer_outside_options() {
        let q = NewQuestion {
            question: "Which phase defines the baseline?".into(),
            options: options(&["A", "B"]),
            answer: "E".into(),
            explanation: None,
        };
        assert!(q.validate().is_err());
    }

    #[test]
    fn rejects_single_option() {
        let q = NewQuestion {
            question: "Pick one".into(),
            options: options(&["A"]),
            answer: "A".into(),
            explanation: None,
        };
        assert!(q.validate().is_err());
    }
}
