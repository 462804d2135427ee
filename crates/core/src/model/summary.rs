use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::{DifficultyLevel, UserId};
use crate::results::{QuizResults, calculate_score};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionSummaryError {
    #[error("completed_at is before started_at")]
    InvalidTimeRange,

    #[error("correct answers ({correct}) exceed total questions ({total})")]
    CorrectExceedsTotal { correct: u32, total: u32 },

    #[error("stored score {stored} does not match {expected} computed from the counts")]
    ScoreMismatch { stored: u32, expected: u32 },

    #[error("a session without questions cannot be summarized")]
    EmptySession,

    #[error("too many questions for a single session: {len}")]
    TooManyQuestions { len: usize },
}

/// Aggregate record of one completed quiz, as kept by the persistence service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    user_id: UserId,
    started_at: DateTime<Utc>,
    completed_at: DateTime<Utc>,
    total_questions: u32,
    correct_answers: u32,
    score_percentage: u32,
    difficulty_level: DifficultyLevel,
    category: Option<String>,
}

impl SessionSummary {
    /// Rehydrate a summary from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns `SessionSummaryError` if the time range is inverted, the counts are
    /// inconsistent or the stored score disagrees with them.
    #[allow(clippy::too_many_arguments)]
    pub fn from_persisted(
        user_id: UserId,
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
        total_questions: u32,
        correct_answers: u32,
        score_percentage: u32,
        difficulty_level: DifficultyLevel,
        category: Option<String>,
    ) -> Result<Self, SessionSummaryError> {
        if completed_at < started_at {
            return Err(SessionSummaryError::InvalidTimeRange);
        }
        if correct_answers > total_questions {
            return Err(SessionSummaryError::CorrectExceedsTotal {
                correct: correct_answers,
                total: total_questions,
            });
        }
        let expected = calculate_score(correct_answers as usize, total_questions as usize);
        if score_percentage != expected {
            return Err(SessionSummaryError::ScoreMismatch {
                stored: score_percentage,
                expected,
            });
        }

        Ok(Self {
            user_id,
            started_at,
            completed_at,
            total_questions,
            correct_answers,
            score_percentage,
            difficulty_level,
            category: category.filter(|c| !c.trim().is_empty()),
        })
    }

    /// Build the summary for a finished quiz.
    ///
    /// The difficulty is the level shared by every question, or the lowest one
    /// present when levels are mixed. The category is kept only when all
    /// questions share it.
    ///
    /// # Errors
    ///
    /// Returns `SessionSummaryError::EmptySession` for a quiz without questions,
    /// `InvalidTimeRange` if `completed_at` is before `started_at`.
    pub fn from_results(
        user_id: UserId,
        results: &QuizResults,
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
    ) -> Result<Self, SessionSummaryError> {
        let questions: Vec<_> = results.review().iter().map(|r| r.question()).collect();

        let Some(difficulty_level) = questions.iter().map(|q| q.difficulty_level()).min() else {
            return Err(SessionSummaryError::EmptySession);
        };

        let first_category = questions.first().and_then(|q| q.category());
        let category = if questions.iter().all(|q| q.category() == first_category) {
            first_category.map(str::to_owned)
        } else {
            None
        };

        let total = results.total();
        let total_questions = u32::try_from(total)
            .map_err(|_| SessionSummaryError::TooManyQuestions { len: total })?;
        let correct_answers = u32::try_from(results.correct_count())
            .map_err(|_| SessionSummaryError::TooManyQuestions { len: total })?;

        Self::from_persisted(
            user_id,
            started_at,
            completed_at,
            total_questions,
            correct_answers,
            results.score_percentage(),
            difficulty_level,
            category,
        )
    }

    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }

    #[must_use]
    pub fn total_questions(&self) -> u32 {
        self.total_questions
    }

    #[must_use]
    pub fn correct_answers(&self) -> u32 {
        self.correct_answers
    }

    #[must_use]
    pub fn score_percentage(&self) -> u32 {
        self.score_percentage
    }

    #[must_use]
    pub fn difficulty_level(&self) -> DifficultyLevel {
        self.difficulty_level
    }

    #[must_use]
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    #[must_use]
    pub fn passed(&self, passing_score: u32) -> bool {
        self.score_percentage >= passing_score
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Answer, Question, QuestionDraft, QuestionId};
    use crate::time::fixed_now;
    use chrono::Duration;

    fn question(id: u64, category: Option<&str>, level: DifficultyLevel) -> Question {
        QuestionDraft {
            french_word: format!("mot{id}"),
            english_translation: None,
            correct_answer: "yes".into(),
            options: vec!["yes".into(), "no".into()],
            category: category.map(str::to_owned),
            difficulty_level: level,
        }
        .validate(QuestionId::new(id), fixed_now())
        .unwrap()
    }

    fn results(questions: &[Question], picks: &[&str]) -> QuizResults {
        let answers: Vec<Answer> = questions
            .iter()
            .zip(picks)
            .map(|(q, pick)| Answer::for_question(q, pick, fixed_now()))
            .collect();
        QuizResults::summarize(questions, &answers).unwrap()
    }

    #[test]
    fn summary_from_results_copies_score_and_shared_category() {
        let qs = vec![
            question(1, Some("greetings"), DifficultyLevel::A2),
            question(2, Some("greetings"), DifficultyLevel::A1),
            question(3, Some("greetings"), DifficultyLevel::B1),
        ];
        let r = results(&qs, &["yes", "no", "yes"]);
        let user = UserId::random();
        let done = fixed_now() + Duration::minutes(2);

        let summary = SessionSummary::from_results(user, &r, fixed_now(), done).unwrap();

        assert_eq!(summary.user_id(), user);
        assert_eq!(summary.total_questions(), 3);
        assert_eq!(summary.correct_answers(), 2);
        assert_eq!(summary.score_percentage(), 67);
        assert_eq!(summary.difficulty_level(), DifficultyLevel::A1);
        assert_eq!(summary.category(), Some("greetings"));
        assert_eq!(summary.completed_at(), done);
        assert!(!summary.passed(70));
    }

    #[test]
    fn mixed_categories_drop_the_category() {
        let qs = vec![
            question(1, Some("greetings"), DifficultyLevel::A1),
            question(2, Some("food"), DifficultyLevel::A1),
        ];
        let r = results(&qs, &["yes", "yes"]);
        let summary =
            SessionSummary::from_results(UserId::random(), &r, fixed_now(), fixed_now()).unwrap();
        assert_eq!(summary.category(), None);
        assert!(summary.passed(70));
    }

    #[test]
    fn empty_results_cannot_be_summarized() {
        let r = QuizResults::summarize(&[], &[]).unwrap();
        assert_eq!(
            SessionSummary::from_results(UserId::random(), &r, fixed_now(), fixed_now()),
            Err(SessionSummaryError::EmptySession)
        );
    }

    #[test]
    fn persisted_rows_are_checked() {
        let user = UserId::random();
        let now = fixed_now();
        let earlier = now - Duration::seconds(1);

        assert_eq!(
            SessionSummary::from_persisted(user, now, earlier, 5, 5, 100, DifficultyLevel::A1, None),
            Err(SessionSummaryError::InvalidTimeRange)
        );
        assert_eq!(
            SessionSummary::from_persisted(user, now, now, 5, 6, 100, DifficultyLevel::A1, None),
            Err(SessionSummaryError::CorrectExceedsTotal {
                correct: 6,
                total: 5
            })
        );
        assert_eq!(
            SessionSummary::from_persisted(user, now, now, 3, 1, 34, DifficultyLevel::A1, None),
            Err(SessionSummaryError::ScoreMismatch {
                stored: 34,
                expected: 33
            })
        );
        assert!(
            SessionSummary::from_persisted(user, now, now, 3, 1, 33, DifficultyLevel::A1, None)
                .is_ok()
        );
    }
}
