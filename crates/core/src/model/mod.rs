mod answer;
mod ids;
mod question;
mod quiz_config;
mod summary;

pub use ids::{ParseIdError, QuestionId, UserId};

pub use answer::{Answer, AnswerRecord};
pub use question::{DifficultyLevel, Question, QuestionDraft, QuestionError};
pub use quiz_config::{
    DEFAULT_FEEDBACK_MILLIS, DEFAULT_PASSING_SCORE, DEFAULT_QUESTIONS_PER_SESSION,
    DEFAULT_RESTART_MILLIS, QuizConfig, QuizConfigError,
};
pub use summary::{SessionSummary, SessionSummaryError};
