use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_QUESTIONS_PER_SESSION: u32 = 10;
pub const DEFAULT_FEEDBACK_MILLIS: u64 = 2_500;
pub const DEFAULT_RESTART_MILLIS: u64 = 500;
pub const DEFAULT_PASSING_SCORE: u32 = 70;

const MAX_DELAY_MILLIS: u64 = 60_000;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizConfigError {
    #[error("feedback duration must be between 1 and 60000 ms, got {0}")]
    InvalidFeedbackDuration(u64),

    #[error("restart delay must be between 1 and 60000 ms, got {0}")]
    InvalidRestartDelay(u64),

    #[error("passing score must be <= 100, got {0}")]
    InvalidPassingScore(u32),
}

/// Tunables for one quiz attempt.
///
/// `questions_per_session` may be zero; such a quiz never leaves the
/// "no questions available" state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizConfig {
    questions_per_session: u32,
    feedback_duration: Duration,
    restart_delay: Duration,
    passing_score: u32,
}

impl QuizConfig {
    /// # Errors
    ///
    /// Returns `QuizConfigError` if a delay is zero or longer than a minute,
    /// or if the passing score exceeds 100.
    pub fn new(
        questions_per_session: u32,
        feedback_millis: u64,
        restart_millis: u64,
        passing_score: u32,
    ) -> Result<Self, QuizConfigError> {
        if !(1..=MAX_DELAY_MILLIS).contains(&feedback_millis) {
            return Err(QuizConfigError::InvalidFeedbackDuration(feedback_millis));
        }
        if !(1..=MAX_DELAY_MILLIS).contains(&restart_millis) {
            return Err(QuizConfigError::InvalidRestartDelay(restart_millis));
        }
        if passing_score > 100 {
            return Err(QuizConfigError::InvalidPassingScore(passing_score));
        }

        Ok(Self {
            questions_per_session,
            feedback_duration: Duration::from_millis(feedback_millis),
            restart_delay: Duration::from_millis(restart_millis),
            passing_score,
        })
    }

    #[must_use]
    pub fn with_questions_per_session(mut self, count: u32) -> Self {
        self.questions_per_session = count;
        self
    }

    /// # Errors
    ///
    /// Returns `QuizConfigError::InvalidFeedbackDuration` when out of range.
    pub fn with_feedback_millis(self, millis: u64) -> Result<Self, QuizConfigError> {
        Self::new(
            self.questions_per_session,
            millis,
            duration_millis(self.restart_delay),
            self.passing_score,
        )
    }

    #[must_use]
    pub fn questions_per_session(&self) -> u32 {
        self.questions_per_session
    }

    /// How long feedback stays visible before the quiz auto-advances.
    #[must_use]
    pub fn feedback_duration(&self) -> Duration {
        self.feedback_duration
    }

    /// Loading pause between discarding a session and starting the next one.
    #[must_use]
    pub fn restart_delay(&self) -> Duration {
        self.restart_delay
    }

    #[must_use]
    pub fn passing_score(&self) -> u32 {
        self.passing_score
    }
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            questions_per_session: DEFAULT_QUESTIONS_PER_SESSION,
            feedback_duration: Duration::from_millis(DEFAULT_FEEDBACK_MILLIS),
            restart_delay: Duration::from_millis(DEFAULT_RESTART_MILLIS),
            passing_score: DEFAULT_PASSING_SCORE,
        }
    }
}

fn duration_millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}
