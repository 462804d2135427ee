#![forbid(unsafe_code)]

pub mod error;
pub mod progress_service;
pub mod sessions;

pub use quest_core::Clock;

pub use error::{ProgressError, QuizError};
pub use progress_service::{ProgressService, SessionSummaryId, SessionSummaryListItem};
pub use sessions::{QuizController, QuizPhase, QuizSnapshot, RecordStatus, SessionRecorder};
