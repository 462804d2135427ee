//! Shared error types for the services crate.

use thiserror::Error;

use quest_core::model::SessionSummaryError;
use quest_core::results::ResultsError;
use quest_core::session::SessionError;
use storage::repository::StorageError;

/// Errors emitted by `QuizController` and `SessionRecorder`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizError {
    #[error("no async runtime available to schedule the next question")]
    NoRuntime,
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Results(#[from] ResultsError),
    #[error(transparent)]
    Summary(#[from] SessionSummaryError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `ProgressService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProgressError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}
