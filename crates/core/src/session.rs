//! Quiz session state machine.
//!
//! ```text
//! Loading ──start──▶ InProgress(AwaitingAnswer) ──submit──▶ InProgress(ShowingFeedback)
//!    │                        ▲                                      │
//!    │                        └──────────────advance─────────────────┤
//!    └──start (no questions)──▶ NoQuestions          Complete ◀──advance (last)
//! ```
//!
//! Transitions are plain methods on an owned value. Scheduling the
//! `advance` after the feedback interval is the caller's job.

use chrono::{DateTime, Utc};
use rand::Rng;
use thiserror::Error;

use crate::feedback::{Feedback, feedback_for};
use crate::model::{Answer, Question, QuestionId};
use crate::results::{QuizResults, ResultsError};
use crate::selector::select_questions;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
    #[error("no questions available")]
    EmptyPool,

    #[error("{selected:?} is not an option of question {question_id}")]
    InvalidAnswer {
        question_id: QuestionId,
        selected: String,
    },

    #[error("session is not in progress")]
    NotInProgress,

    #[error("no answer is awaiting its reveal")]
    NothingToAdvance,

    #[error("session already completed")]
    Completed,
}

//
// ─── STATES ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubPhase {
    AwaitingAnswer,
    ShowingFeedback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Loading,
    InProgress(SubPhase),
    Complete,
    /// Terminal: the pool or requested count was empty.
    NoQuestions,
}

/// Result of a submission that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Accepted(Feedback),
    /// A second submission for the question already being revealed.
    /// `answers` is left untouched.
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceOutcome {
    NextQuestion { index: usize },
    Completed,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// One quiz attempt from question selection to final score.
///
/// Invariants:
/// - `answers.len() == current_index` except while showing feedback, where it
///   is `current_index + 1`.
/// - `streak` is the length of the trailing run of correct answers.
/// - `state == Complete` exactly when `current_index == questions.len() > 0`.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizSession {
    questions: Vec<Question>,
    current_index: usize,
    answers: Vec<Answer>,
    streak: u32,
    state: SessionState,
    feedback: Option<Feedback>,
    started_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
}

impl QuizSession {
    /// A session whose questions are still being fetched.
    #[must_use]
    pub fn loading() -> Self {
        Self {
            questions: Vec::new(),
            current_index: 0,
            answers: Vec::new(),
            streak: 0,
            state: SessionState::Loading,
            feedback: None,
            started_at: None,
            completed_at: None,
        }
    }

    /// Select `count` random questions from `pool` and begin the quiz.
    ///
    /// An empty selection yields a session in `NoQuestions`.
    pub fn start<R: Rng + ?Sized>(
        pool: &[Question],
        count: usize,
        rng: &mut R,
        started_at: DateTime<Utc>,
    ) -> Self {
        let selection = select_questions(pool, count, rng);
        Self::from_questions(selection.questions, started_at)
    }

    /// Begin a quiz over `questions` in the given order.
    #[must_use]
    pub fn from_questions(questions: Vec<Question>, started_at: DateTime<Utc>) -> Self {
        let state = if questions.is_empty() {
            SessionState::NoQuestions
        } else {
            SessionState::InProgress(SubPhase::AwaitingAnswer)
        };

        Self {
            questions,
            state,
            started_at: Some(started_at),
            ..Self::loading()
        }
    }

    /// Accept an answer for the current question.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidAnswer` (without touching state) when `selected`
    /// is not one of the current options, `EmptyPool` in `NoQuestions`,
    /// `NotInProgress` while loading and `Completed` once finished.
    pub fn submit_answer<R: Rng + ?Sized>(
        &mut self,
        selected: &str,
        answered_at: DateTime<Utc>,
        rng: &mut R,
    ) -> Result<SubmitOutcome, SessionError> {
        match self.state {
            SessionState::InProgress(SubPhase::AwaitingAnswer) => {}
            SessionState::InProgress(SubPhase::ShowingFeedback) => {
                return Ok(SubmitOutcome::Ignored);
            }
            SessionState::Loading => return Err(SessionError::NotInProgress),
            SessionState::Complete => return Err(SessionError::Completed),
            SessionState::NoQuestions => return Err(SessionError::EmptyPool),
        }

        let Some(question) = self.questions.get(self.current_index) else {
            return Err(SessionError::Completed);
        };
        if !question.has_option(selected) {
            return Err(SessionError::InvalidAnswer {
                question_id: question.id(),
                selected: selected.to_owned(),
            });
        }

        let answer = Answer::for_question(question, selected, answered_at);
        self.streak = if answer.is_correct() {
            self.streak.saturating_add(1)
        } else {
            0
        };

        let feedback = feedback_for(answer.is_correct(), self.streak, rng);
        self.answers.push(answer);
        self.feedback = Some(feedback);
        self.state = SessionState::InProgress(SubPhase::ShowingFeedback);

        Ok(SubmitOutcome::Accepted(feedback))
    }

    /// Leave the feedback reveal: move to the next question or finish.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NothingToAdvance` unless feedback is showing.
    pub fn advance(&mut self, at: DateTime<Utc>) -> Result<AdvanceOutcome, SessionError> {
        if self.state != SessionState::InProgress(SubPhase::ShowingFeedback) {
            return Err(SessionError::NothingToAdvance);
        }

        self.current_index += 1;
        self.feedback = None;

        if self.current_index < self.questions.len() {
            self.state = SessionState::InProgress(SubPhase::AwaitingAnswer);
            Ok(AdvanceOutcome::NextQuestion {
                index: self.current_index,
            })
        } else {
            self.state = SessionState::Complete;
            self.completed_at = Some(at);
            Ok(AdvanceOutcome::Completed)
        }
    }

    /// Score and review. Only meaningful once complete.
    ///
    /// # Errors
    ///
    /// Returns `ResultsError::Unanswered` when called before every question was answered.
    pub fn results(&self) -> Result<QuizResults, ResultsError> {
        QuizResults::summarize(&self.questions, &self.answers)
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// The question being asked or revealed; `None` outside `InProgress`.
    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        match self.state {
            SessionState::InProgress(_) => self.questions.get(self.current_index),
            _ => None,
        }
    }

    #[must_use]
    pub fn answers(&self) -> &[Answer] {
        &self.answers
    }

    #[must_use]
    pub fn last_answer(&self) -> Option<&Answer> {
        self.answers.last()
    }

    #[must_use]
    pub fn correct_count(&self) -> usize {
        self.answers.iter().filter(|a| a.is_correct()).count()
    }

    #[must_use]
    pub fn streak(&self) -> u32 {
        self.streak
    }

    /// Feedback for the latest answer while it is being revealed.
    #[must_use]
    pub fn feedback(&self) -> Option<Feedback> {
        self.feedback
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.state == SessionState::Complete
    }

    #[must_use]
    pub fn has_no_questions(&self) -> bool {
        self.state == SessionState::NoQuestions
    }

    #[must_use]
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
