//! Scoring and per-question review for a finished quiz.

use thiserror::Error;

use crate::model::{Answer, Question, QuestionId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Inconsistencies between the question list and the answer log.
///
/// A completed session always pairs every question with exactly one answer,
/// so any of these means a caller summarized a session that never finished.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ResultsError {
    #[error("question {question_id} at position {position} was never answered")]
    Unanswered {
        position: usize,
        question_id: QuestionId,
    },

    #[error("answer at position {position} belongs to question {found}, expected {expected}")]
    QuestionMismatch {
        position: usize,
        expected: QuestionId,
        found: QuestionId,
    },

    #[error("{answers} answers recorded for {questions} questions")]
    ExtraAnswers { questions: usize, answers: usize },
}

//
// ─── SCORE ─────────────────────────────────────────────────────────────────────
//

/// Percentage of correct answers, rounded half up. Zero when `total == 0`.
#[must_use]
pub fn calculate_score(correct: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    let correct = correct.min(total);
    let rounded = (correct * 200 + total) / (2 * total);
    u32::try_from(rounded).unwrap_or(100)
}

/// Letter grade shown on the results screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreGrade {
    APlus,
    A,
    B,
    C,
    D,
}

impl ScoreGrade {
    #[must_use]
    pub fn from_score(score: u32) -> Self {
        match score {
            90.. => ScoreGrade::APlus,
            80..=89 => ScoreGrade::A,
            70..=79 => ScoreGrade::B,
            60..=69 => ScoreGrade::C,
            _ => ScoreGrade::D,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            ScoreGrade::APlus => "A+",
            ScoreGrade::A => "A",
            ScoreGrade::B => "B",
            ScoreGrade::C => "C",
            ScoreGrade::D => "D",
        }
    }

    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            ScoreGrade::APlus => "Outstanding! You're mastering French vocabulary!",
            ScoreGrade::A => "Excellent work! Keep up the great progress!",
            ScoreGrade::B => "Good job! You're making solid progress!",
            ScoreGrade::C => "Not bad! Keep practicing to improve!",
            ScoreGrade::D => "Keep trying! Practice makes perfect!",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreBadge {
    Excellent,
    GoodJob,
    KeepPracticing,
}

impl ScoreBadge {
    #[must_use]
    pub fn from_score(score: u32) -> Self {
        match score {
            80.. => ScoreBadge::Excellent,
            60..=79 => ScoreBadge::GoodJob,
            _ => ScoreBadge::KeepPracticing,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            ScoreBadge::Excellent => "Excellent!",
            ScoreBadge::GoodJob => "Good Job!",
            ScoreBadge::KeepPracticing => "Keep Practicing!",
        }
    }
}

//
// ─── REVIEW ────────────────────────────────────────────────────────────────────
//

/// A question paired with the answer recorded for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionReview {
    question: Question,
    answer: Answer,
}

impl QuestionReview {
    #[must_use]
    pub fn question(&self) -> &Question {
        &self.question
    }

    #[must_use]
    pub fn answer(&self) -> &Answer {
        &self.answer
    }

    #[must_use]
    pub fn is_correct(&self) -> bool {
        self.answer.is_correct()
    }

    #[must_use]
    pub fn selected_answer(&self) -> &str {
        self.answer.selected_answer()
    }

    #[must_use]
    pub fn correct_answer(&self) -> &str {
        self.question.correct_answer()
    }
}

/// Aggregate outcome of a completed quiz.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizResults {
    correct_count: usize,
    total: usize,
    score_percentage: u32,
    review: Vec<QuestionReview>,
}

impl QuizResults {
    /// Pair each question with its answer and score the attempt.
    ///
    /// `questions` and `answers` must have the same length and order.
    ///
    /// # Errors
    ///
    /// Returns `ResultsError::Unanswered` for the first question without an answer,
    /// `ResultsError::QuestionMismatch` if an answer is out of order, and
    /// `ResultsError::ExtraAnswers` if there are more answers than questions.
    pub fn summarize(questions: &[Question], answers: &[Answer]) -> Result<Self, ResultsError> {
        if answers.len() > questions.len() {
            return Err(ResultsError::ExtraAnswers {
                questions: questions.len(),
                answers: answers.len(),
            });
        }

        let mut review = Vec::with_capacity(questions.len());
        for (position, question) in questions.iter().enumerate() {
            let Some(answer) = answers.get(position) else {
                return Err(ResultsError::Unanswered {
                    position,
                    question_id: question.id(),
                });
            };
            if answer.question_id() != question.id() {
                return Err(ResultsError::QuestionMismatch {
                    position,
                    expected: question.id(),
                    found: answer.question_id(),
                });
            }
            review.push(QuestionReview {
                question: question.clone(),
                answer: answer.clone(),
            });
        }

        let correct_count = review.iter().filter(|r| r.is_correct()).count();
        let total = review.len();

        Ok(Self {
            correct_count,
            total,
            score_percentage: calculate_score(correct_count, total),
            review,
        })
    }

    #[must_use]
    pub fn correct_count(&self) -> usize {
        self.correct_count
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.total
    }

    #[must_use]
    pub fn score_percentage(&self) -> u32 {
        self.score_percentage
    }

    #[must_use]
    pub fn review(&self) -> &[QuestionReview] {
        &self.review
    }

    #[must_use]
    pub fn grade(&self) -> ScoreGrade {
        ScoreGrade::from_score(self.score_percentage)
    }

    #[must_use]
    pub fn badge(&self) -> ScoreBadge {
        ScoreBadge::from_score(self.score_percentage)
    }

    #[must_use]
    pub fn passed(&self, passing_score: u32) -> bool {
        self.score_percentage >= passing_score
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DifficultyLevel, QuestionDraft};
    use crate::time::fixed_now;

    fn question(id: u64) -> Question {
        QuestionDraft {
            french_word: format!("mot{id}"),
            english_translation: None,
            correct_answer: "yes".into(),
            options: vec!["yes".into(), "no".into()],
            category: None,
            difficulty_level: DifficultyLevel::A1,
        }
        .validate(QuestionId::new(id), fixed_now())
        .unwrap()
    }

    fn answer(q: &Question, selected: &str) -> Answer {
        Answer::for_question(q, selected, fixed_now())
    }

    #[test]
    fn score_rounds_half_up_and_handles_zero_total() {
        assert_eq!(calculate_score(0, 0), 0);
        assert_eq!(calculate_score(1, 3), 33);
        assert_eq!(calculate_score(2, 3), 67);
        assert_eq!(calculate_score(1, 8), 13);
        assert_eq!(calculate_score(5, 5), 100);
    }

    #[test]
    fn score_is_always_a_percentage() {
        for total in 0..=25 {
            for correct in 0..=total {
                assert!(calculate_score(correct, total) <= 100);
            }
        }
    }

    #[test]
    fn summarize_scores_and_pairs_answers() {
        let qs = vec![question(1), question(2), question(3)];
        let answers = vec![
            answer(&qs[0], "yes"),
            answer(&qs[1], "no"),
            answer(&qs[2], "yes"),
        ];

        let results = QuizResults::summarize(&qs, &answers).unwrap();

        assert_eq!(results.correct_count(), 2);
        assert_eq!(results.total(), 3);
        assert_eq!(results.score_percentage(), 67);
        assert_eq!(results.review()[1].selected_answer(), "no");
        assert_eq!(results.review()[1].correct_answer(), "yes");
        assert!(!results.review()[1].is_correct());
        assert_eq!(results.grade(), ScoreGrade::C);
        assert_eq!(results.badge(), ScoreBadge::GoodJob);
        assert!(!results.passed(70));
    }

    #[test]
    fn empty_quiz_scores_zero() {
        let results = QuizResults::summarize(&[], &[]).unwrap();
        assert_eq!(results.score_percentage(), 0);
        assert_eq!(results.total(), 0);
    }

    #[test]
    fn missing_answer_fails_loudly() {
        let qs = vec![question(1), question(2)];
        let answers = vec![answer(&qs[0], "yes")];
        let err = QuizResults::summarize(&qs, &answers).unwrap_err();
        assert_eq!(
            err,
            ResultsError::Unanswered {
                position: 1,
                question_id: QuestionId::new(2),
            }
        );
    }

    #[test]
    fn out_of_order_answer_is_rejected() {
        let qs = vec![question(1), question(2)];
        let answers = vec![answer(&qs[1], "yes"), answer(&qs[0], "yes")];
        let err = QuizResults::summarize(&qs, &answers).unwrap_err();
        assert!(matches!(err, ResultsError::QuestionMismatch { position: 0, .. }));
    }

    #[test]
    fn extra_answers_are_rejected() {
        let qs = vec![question(1)];
        let answers = vec![answer(&qs[0], "yes"), answer(&qs[0], "no")];
        let err = QuizResults::summarize(&qs, &answers).unwrap_err();
        assert_eq!(
            err,
            ResultsError::ExtraAnswers {
                questions: 1,
                answers: 2,
            }
        );
    }

    #[test]
    fn grade_and_badge_thresholds() {
        assert_eq!(ScoreGrade::from_score(90).label(), "A+");
        assert_eq!(ScoreGrade::from_score(89).label(), "A");
        assert_eq!(ScoreGrade::from_score(70).label(), "B");
        assert_eq!(ScoreGrade::from_score(60).label(), "C");
        assert_eq!(ScoreGrade::from_score(59).label(), "D");
        assert_eq!(ScoreBadge::from_score(80).label(), "Excellent!");
        assert_eq!(ScoreBadge::from_score(60).label(), "Good Job!");
        assert_eq!(ScoreBadge::from_score(0).label(), "Keep Practicing!");
    }
}
