use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::ids::QuestionId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("french word cannot be empty")]
    EmptyFrenchWord,

    #[error("correct answer cannot be empty")]
    EmptyCorrectAnswer,

    #[error("a question needs at least 2 options, got {count}")]
    TooFewOptions { count: usize },

    #[error("option {index} is empty")]
    EmptyOption { index: usize },

    #[error("duplicate option: {0}")]
    DuplicateOption(String),

    #[error("correct answer {0:?} is not among the options")]
    CorrectAnswerMissing(String),

    #[error("unknown difficulty level: {0}")]
    InvalidDifficulty(String),
}

//
// ─── DIFFICULTY ────────────────────────────────────────────────────────────────
//

/// CEFR level of a vocabulary question, ordered from easiest to hardest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DifficultyLevel {
    A1,
    A2,
    B1,
    B2,
    C1,
    C2,
}

impl DifficultyLevel {
    pub const ALL: [DifficultyLevel; 6] = [
        DifficultyLevel::A1,
        DifficultyLevel::A2,
        DifficultyLevel::B1,
        DifficultyLevel::B2,
        DifficultyLevel::C1,
        DifficultyLevel::C2,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            DifficultyLevel::A1 => "A1",
            DifficultyLevel::A2 => "A2",
            DifficultyLevel::B1 => "B1",
            DifficultyLevel::B2 => "B2",
            DifficultyLevel::C1 => "C1",
            DifficultyLevel::C2 => "C2",
        }
    }
}

impl fmt::Display for DifficultyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DifficultyLevel {
    type Err = QuestionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| QuestionError::InvalidDifficulty(wanted.to_owned()))
    }
}

//
// ─── QUESTION TYPES ────────────────────────────────────────────────────────────
//

/// Unvalidated question as it arrives from a question source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionDraft {
    pub french_word: String,
    /// Defaults to `correct_answer` when absent.
    pub english_translation: Option<String>,
    pub correct_answer: String,
    pub options: Vec<String>,
    pub category: Option<String>,
    pub difficulty_level: DifficultyLevel,
}

impl QuestionDraft {
    /// Validate the draft and assign its identity.
    ///
    /// Text fields are trimmed; a blank category is treated as missing.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` when the word or answer is blank, when fewer than two
    /// options are given, when options repeat, or when the answer is not an option.
    pub fn validate(
        self,
        id: QuestionId,
        created_at: DateTime<Utc>,
    ) -> Result<Question, QuestionError> {
        let french_word = self.french_word.trim().to_owned();
        if french_word.is_empty() {
            return Err(QuestionError::EmptyFrenchWord);
        }

        let correct_answer = self.correct_answer.trim().to_owned();
        if correct_answer.is_empty() {
            return Err(QuestionError::EmptyCorrectAnswer);
        }

        if self.options.len() < 2 {
            return Err(QuestionError::TooFewOptions {
                count: self.options.len(),
            });
        }

        let mut seen = HashSet::with_capacity(self.options.len());
        let mut options = Vec::with_capacity(self.options.len());
        for (index, raw) in self.options.into_iter().enumerate() {
            let option = raw.trim().to_owned();
            if option.is_empty() {
                return Err(QuestionError::EmptyOption { index });
            }
            if !seen.insert(option.clone()) {
                return Err(QuestionError::DuplicateOption(option));
            }
            options.push(option);
        }

        if !seen.contains(&correct_answer) {
            return Err(QuestionError::CorrectAnswerMissing(correct_answer));
        }

        let english_translation = self
            .english_translation
            .map(|t| t.trim().to_owned())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| correct_answer.clone());

        let category = self
            .category
            .map(|c| c.trim().to_owned())
            .filter(|c| !c.is_empty());

        Ok(Question {
            id,
            french_word,
            english_translation,
            correct_answer,
            options,
            category,
            difficulty_level: self.difficulty_level,
            created_at,
        })
    }
}

/// A validated multiple-choice translation question. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    id: QuestionId,
    french_word: String,
    english_translation: String,
    correct_answer: String,
    options: Vec<String>,
    category: Option<String>,
    difficulty_level: DifficultyLevel,
    created_at: DateTime<Utc>,
}

impl Question {
    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    #[must_use]
    pub fn french_word(&self) -> &str {
        &self.french_word
    }

    #[must_use]
    pub fn english_translation(&self) -> &str {
        &self.english_translation
    }

    #[must_use]
    pub fn correct_answer(&self) -> &str {
        &self.correct_answer
    }

    /// Choices in presentation order.
    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    #[must_use]
    pub fn difficulty_level(&self) -> DifficultyLevel {
        self.difficulty_level
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub fn has_option(&self, option: &str) -> bool {
        self.options.iter().any(|o| o == option)
    }

    #[must_use]
    pub fn is_correct(&self, option: &str) -> bool {
        self.correct_answer == option
    }

    /// Looks up an option by its letter label (`A` is the first option).
    #[must_use]
    pub fn option_for_label(&self, label: char) -> Option<&str> {
        let upper = label.to_ascii_uppercase();
        if !upper.is_ascii_uppercase() {
            return None;
        }
        let index = usize::from(upper as u8 - b'A');
        self.options.get(index).map(String::as_str)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
