use quest_core::feedback::Feedback;
use quest_core::model::{Answer, Question};
use quest_core::results::QuizResults;
use quest_core::session::{QuizSession, SessionState, SubPhase};
use tracing::warn;

/// Coarse phase of the quiz as seen by the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizPhase {
    Loading,
    AwaitingAnswer,
    ShowingFeedback,
    Complete,
    NoQuestions,
}

impl From<SessionState> for QuizPhase {
    fn from(state: SessionState) -> Self {
        match state {
            SessionState::Loading => QuizPhase::Loading,
            SessionState::InProgress(SubPhase::AwaitingAnswer) => QuizPhase::AwaitingAnswer,
            SessionState::InProgress(SubPhase::ShowingFeedback) => QuizPhase::ShowingFeedback,
            SessionState::Complete => QuizPhase::Complete,
            SessionState::NoQuestions => QuizPhase::NoQuestions,
        }
    }
}

/// Whether the finished session reached the persistence service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordStatus {
    /// No recorder configured.
    Disabled,
    /// Nothing to record yet.
    Idle,
    Saving,
    Saved { summary_id: i64 },
    Failed { reason: String },
}

/// Everything a view needs to render the current quiz state.
///
/// A new snapshot is published after every transition.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizSnapshot {
    pub phase: QuizPhase,
    /// 1-based; 0 when no question is on screen.
    pub question_number: usize,
    pub total_questions: usize,
    pub question: Option<Question>,
    pub streak: u32,
    pub correct_so_far: usize,
    pub feedback: Option<Feedback>,
    /// The answer being revealed while `phase == ShowingFeedback`.
    pub last_answer: Option<Answer>,
    pub results: Option<QuizResults>,
    pub record_status: RecordStatus,
    pub generation: u64,
}

impl QuizSnapshot {
    pub(crate) fn capture(
        session: &QuizSession,
        generation: u64,
        record_status: RecordStatus,
    ) -> Self {
        let phase = QuizPhase::from(session.state());
        let question = session.current_question().cloned();
        let question_number = if question.is_some() {
            session.current_index() + 1
        } else {
            0
        };
        let last_answer = if phase == QuizPhase::ShowingFeedback {
            session.last_answer().cloned()
        } else {
            None
        };
        let results = if phase == QuizPhase::Complete {
            match session.results() {
                Ok(results) => Some(results),
                Err(err) => {
                    warn!(error = %err, "completed session has no consistent results");
                    None
                }
            }
        } else {
            None
        };

        Self {
            phase,
            question_number,
            total_questions: session.total_questions(),
            question,
            streak: session.streak(),
            correct_so_far: session.correct_count(),
            feedback: session.feedback(),
            last_answer,
            results,
            record_status,
            generation,
        }
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.phase == QuizPhase::Loading
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.phase == QuizPhase::Complete
    }

    /// Answered questions over total, in `0.0..=1.0`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn progress_fraction(&self) -> f64 {
        if self.total_questions == 0 {
            return 0.0;
        }
        let answered = match self.phase {
            QuizPhase::ShowingFeedback => self.question_number,
            QuizPhase::Complete => self.total_questions,
            _ => self.question_number.saturating_sub(1),
        };
        answered as f64 / self.total_questions as f64
    }
}
