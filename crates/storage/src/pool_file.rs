//! JSON question pools.
//!
//! A pool file is an array of objects:
//!
//! ```json
//! [{ "id": 1, "french_word": "Bonjour", "english_translation": "Hello",
//!    "options": ["Good evening", "Hello", "Goodbye", "Thank you"],
//!    "correct_answer": "Hello", "difficulty_level": "A1", "category": "greetings" }]
//! ```
//!
//! `english_translation`, `category` and `created_at` are optional.

use chrono::{DateTime, Utc};
use quest_core::model::{DifficultyLevel, Question, QuestionDraft, QuestionError, QuestionId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PoolFileError {
    #[error("cannot access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("question {id} is invalid: {source}")]
    InvalidRecord {
        id: u64,
        #[source]
        source: QuestionError,
    },

    #[error("question id {0} appears more than once")]
    DuplicateId(u64),
}

/// On-disk shape of one question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionRecord {
    pub id: u64,
    pub french_word: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub english_translation: Option<String>,
    pub options: Vec<String>,
    pub correct_answer: String,
    pub difficulty_level: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl QuestionRecord {
    #[must_use]
    pub fn from_question(question: &Question) -> Self {
        Self {
            id: question.id().value(),
            french_word: question.french_word().to_owned(),
            english_translation: Some(question.english_translation().to_owned()),
            options: question.options().to_vec(),
            correct_answer: question.correct_answer().to_owned(),
            difficulty_level: question.difficulty_level().as_str().to_owned(),
            category: question.category().map(str::to_owned),
            created_at: Some(question.created_at()),
        }
    }

    /// Validate the record into a domain `Question`.
    ///
    /// `loaded_at` stands in for a missing `created_at`.
    ///
    /// # Errors
    ///
    /// Returns `PoolFileError::InvalidRecord` if the difficulty is unknown or the
    /// question fails validation.
    pub fn into_question(self, loaded_at: DateTime<Utc>) -> Result<Question, PoolFileError> {
        let id = self.id;
        let invalid = |source: QuestionError| PoolFileError::InvalidRecord { id, source };

        let difficulty_level: DifficultyLevel = self.difficulty_level.parse().map_err(invalid)?;
        QuestionDraft {
            french_word: self.french_word,
            english_translation: self.english_translation,
            correct_answer: self.correct_answer,
            options: self.options,
            category: self.category,
            difficulty_level,
        }
        .validate(QuestionId::new(id), self.created_at.unwrap_or(loaded_at))
        .map_err(invalid)
    }
}

/// Parse a JSON pool.
///
/// # Errors
///
/// Returns `PoolFileError` on malformed JSON, invalid questions or duplicate ids.
pub fn parse_pool(json: &str, loaded_at: DateTime<Utc>) -> Result<Vec<Question>, PoolFileError> {
    let records: Vec<QuestionRecord> = serde_json::from_str(json)?;
    let mut seen = HashSet::with_capacity(records.len());
    let mut questions = Vec::with_capacity(records.len());
    for record in records {
        if !seen.insert(record.id) {
            return Err(PoolFileError::DuplicateId(record.id));
        }
        questions.push(record.into_question(loaded_at)?);
    }
    Ok(questions)
}

/// Read and parse a pool file.
///
/// # Errors
///
/// Returns `PoolFileError::Io` if the file cannot be read, or any parse error.
pub fn load_pool(path: &Path, loaded_at: DateTime<Utc>) -> Result<Vec<Question>, PoolFileError> {
    let json = std::fs::read_to_string(path).map_err(|source| PoolFileError::Io {
        path: path.to_owned(),
        source,
    })?;
    parse_pool(&json, loaded_at)
}

/// Render questions as a pretty-printed JSON pool.
///
/// # Errors
///
/// Returns `PoolFileError::Json` if serialization fails.
pub fn to_json(questions: &[Question]) -> Result<String, PoolFileError> {
    let records: Vec<QuestionRecord> = questions.iter().map(QuestionRecord::from_question).collect();
    Ok(serde_json::to_string_pretty(&records)?)
}

/// Write questions to `path` as a JSON pool.
///
/// # Errors
///
/// Returns `PoolFileError` if serialization or the write fails.
pub fn write_pool(path: &Path, questions: &[Question]) -> Result<(), PoolFileError> {
    let json = to_json(questions)?;
    std::fs::write(path, json).map_err(|source| PoolFileError::Io {
        path: path.to_owned(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use quest_core::time::fixed_now;

    const POOL: &str = r#"[
        {
            "id": 1,
            "french_word": "Bonjour",
            "english_translation": "Hello",
            "options": ["Good evening", "Hello", "Goodbye", "Thank you"],
            "correct_answer": "Hello",
            "difficulty_level": "A1",
            "category": "greetings"
        },
        {
            "id": 2,
            "french_word": "le fromage",
            "options": ["cheese", "bread"],
            "correct_answer": "cheese",
            "difficulty_level": "a2"
        }
    ]"#;

    #[test]
    fn parses_records_with_optional_fields() {
        let pool = parse_pool(POOL, fixed_now()).unwrap();
        assert_eq!(pool.len(), 2);
        assert_eq!(pool[0].category(), Some("greetings"));
        assert_eq!(pool[1].english_translation(), "cheese");
        assert_eq!(pool[1].difficulty_level(), DifficultyLevel::A2);
        assert_eq!(pool[1].created_at(), fixed_now());
    }

    #[test]
    fn rejects_answer_outside_options() {
        let json = r#"[{"id": 7, "french_word": "chat", "options": ["dog", "bird"],
                        "correct_answer": "cat", "difficulty_level": "A1"}]"#;
        let err = parse_pool(json, fixed_now()).unwrap_err();
        assert!(matches!(
            err,
            PoolFileError::InvalidRecord {
                id: 7,
                source: QuestionError::CorrectAnswerMissing(_)
            }
        ));
    }

    #[test]
    fn rejects_unknown_difficulty_and_duplicates() {
        let json = r#"[{"id": 1, "french_word": "chat", "options": ["cat", "dog"],
                        "correct_answer": "cat", "difficulty_level": "Z9"}]"#;
        assert!(matches!(
            parse_pool(json, fixed_now()),
            Err(PoolFileError::InvalidRecord {
                source: QuestionError::InvalidDifficulty(_),
                ..
            })
        ));

        let json = r#"[
            {"id": 1, "french_word": "chat", "options": ["cat", "dog"], "correct_answer": "cat", "difficulty_level": "A1"},
            {"id": 1, "french_word": "chien", "options": ["cat", "dog"], "correct_answer": "dog", "difficulty_level": "A1"}
        ]"#;
        assert!(matches!(
            parse_pool(json, fixed_now()),
            Err(PoolFileError::DuplicateId(1))
        ));
    }

    #[test]
    fn malformed_json_is_reported() {
        assert!(matches!(
            parse_pool("{not json", fixed_now()),
            Err(PoolFileError::Json(_))
        ));
    }

    #[test]
    fn rendered_pool_parses_back_to_the_same_questions() {
        let pool = parse_pool(POOL, fixed_now()).unwrap();
        let json = to_json(&pool).unwrap();
        assert_eq!(parse_pool(&json, fixed_now()).unwrap(), pool);
    }
}
