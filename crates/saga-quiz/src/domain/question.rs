//! Quiz questions and upload validation.

use saga_core::error::DomainError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Number of options every question must offer.
pub const OPTION_COUNT: usize = 4;

const REQUIRED_FIELDS: [&str; 4] = ["id", "question", "options", "answer"];

/// A multiple-choice question as stored in `questions.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    /// 1-based position within the character's question set.
    pub id: u32,
    /// The question text.
    pub question: String,
    /// The four answer options.
    pub options: Vec<String>,
    /// The correct option.
    pub answer: String,
    /// Any extra keys (difficulty, explanation, ...) kept as uploaded.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Question {
    /// Case-insensitive, whitespace-trimmed comparison with the expected answer.
    #[must_use]
    pub fn is_correct(&self, given: &str) -> bool {
        given.trim().to_lowercase() == self.answer.trim().to_lowercase()
    }
}

fn invalid(message: String) -> DomainError {
    DomainError::Validation(message)
}

/// Validates an uploaded question set and renumbers it `1..n`.
///
/// # Errors
///
/// Returns `DomainError::Validation` naming the first offending question
/// (1-based) when the JSON is malformed, is not an array, or a question is
/// missing a field, does not have exactly four string options, or has an
/// answer that is not one of its options.
pub fn validate_questions(raw: &str) -> Result<Vec<Question>, DomainError> {
    let parsed: Value =
        serde_json::from_str(raw).map_err(|e| invalid(format!("Invalid JSON format: {e}")))?;
    let Value::Array(items) = parsed else {
        return Err(invalid("Questions must be an array".to_owned()));
    };

    let mut questions = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        let idx = index + 1;
        let Value::Object(mut fields) = item else {
            return Err(invalid(format!("Question {idx} must be an object")));
        };
        if let Some(missing) = REQUIRED_FIELDS.iter().find(|f| !fields.contains_key(**f)) {
            return Err(invalid(format!(
                "Question {idx} missing required field: {missing}"
            )));
        }

        let Some(Value::Array(raw_options)) = fields.remove("options") else {
            return Err(invalid(format!("Question {idx}: options must be an array")));
        };
        if raw_options.len() != OPTION_COUNT {
            return Err(invalid(format!(
                "Question {idx}: must have exactly {OPTION_COUNT} options"
            )));
        }
        let options = raw_options
            .into_iter()
            .map(|o| match o {
                Value::String(s) => Ok(s),
                _ => Err(invalid(format!("Question {idx}: options must be strings"))),
            })
            .collect::<Result<Vec<_>, _>>()?;

        let answer = match fields.remove("answer") {
            Some(Value::String(s)) => s,
            _ => return Err(invalid(format!("Question {idx}: answer must be a string"))),
        };
        if !options.contains(&answer) {
            return Err(invalid(format!(
                "Question {idx}: answer '{answer}' must be one of the options"
            )));
        }

        let question = match fields.remove("question") {
            Some(Value::String(s)) => s,
            _ => return Err(invalid(format!("Question {idx}: question must be a string"))),
        };
        fields.remove("id");

        questions.push(Question {
            id: u32::try_from(idx)
                .map_err(|_| invalid("too many questions".to_owned()))?,
            question,
            options,
            answer,
            extra: fields,
        });
    }
    Ok(questions)
}
