use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ids::{QuestionId, UserId};
use crate::model::question::Question;

//
// ─── ANSWER ────────────────────────────────────────────────────────────────────
//

/// One recorded answer within a quiz session.
///
/// Created exactly once per question and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    question_id: QuestionId,
    selected_answer: String,
    is_correct: bool,
    answered_at: DateTime<Utc>,
}

impl Answer {
    /// Rehydrate an answer whose correctness was already decided.
    #[must_use]
    pub fn new(
        question_id: QuestionId,
        selected_answer: impl Into<String>,
        is_correct: bool,
        answered_at: DateTime<Utc>,
    ) -> Self {
        Self {
            question_id,
            selected_answer: selected_answer.into(),
            is_correct,
            answered_at,
        }
    }

    /// Grade `selected` against the question's correct answer.
    #[must_use]
    pub fn for_question(question: &Question, selected: &str, answered_at: DateTime<Utc>) -> Self {
        Self::new(
            question.id(),
            selected,
            question.is_correct(selected),
            answered_at,
        )
    }

    #[must_use]
    pub fn question_id(&self) -> QuestionId {
        self.question_id
    }

    #[must_use]
    pub fn selected_answer(&self) -> &str {
        &self.selected_answer
    }

    #[must_use]
    pub fn is_correct(&self) -> bool {
        self.is_correct
    }

    #[must_use]
    pub fn answered_at(&self) -> DateTime<Utc> {
        self.answered_at
    }
}

//
// ─── ANSWER RECORD ─────────────────────────────────────────────────────────────
//

/// Per-answer progress row kept by the persistence service.
///
/// Carries the question category so progress statistics can be computed
/// without joining back to the question source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub user_id: UserId,
    pub question_id: QuestionId,
    pub category: Option<String>,
    pub selected_answer: String,
    pub is_correct: bool,
    pub answered_at: DateTime<Utc>,
    pub summary_id: Option<i64>,
}

impl AnswerRecord {
    #[must_use]
    pub fn from_answer(user_id: UserId, question: &Question, answer: &Answer) -> Self {
        Self {
            user_id,
            question_id: answer.question_id(),
            category: question.category().map(str::to_owned),
            selected_answer: answer.selected_answer().to_owned(),
            is_correct: answer.is_correct(),
            answered_at: answer.answered_at(),
            summary_id: None,
        }
    }

    #[must_use]
    pub fn with_summary_id(mut self, id: i64) -> Self {
        self.summary_id = Some(id);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DifficultyLevel, QuestionDraft};
    use crate::time::fixed_now;

    fn merci() -> Question {
        QuestionDraft {
            french_word: "Merci".into(),
            english_translation: Some("Thank you".into()),
            correct_answer: "Thank you".into(),
            options: vec![
                "Please".into(),
                "Thank you".into(),
                "Sorry".into(),
                "You're welcome".into(),
            ],
            category: Some("politeness".into()),
            difficulty_level: DifficultyLevel::A1,
        }
        .validate(QuestionId::new(3), fixed_now())
        .unwrap()
    }

    #[test]
    fn answer_grades_selection() {
        let q = merci();
        let right = Answer::for_question(&q, "Thank you", fixed_now());
        let wrong = Answer::for_question(&q, "Sorry", fixed_now());
        assert!(right.is_correct());
        assert!(!wrong.is_correct());
        assert_eq!(wrong.selected_answer(), "Sorry");
        assert_eq!(wrong.question_id(), QuestionId::new(3));
    }

    #[test]
    fn record_copies_category_and_links_summary() {
        let q = merci();
        let user = UserId::random();
        let answer = Answer::for_question(&q, "Please", fixed_now());
        let record = AnswerRecord::from_answer(user, &q, &answer).with_summary_id(9);
        assert_eq!(record.category.as_deref(), Some("politeness"));
        assert!(!record.is_correct);
        assert_eq!(record.summary_id, Some(9));
        assert_eq!(record.user_id, user);
    }
}
