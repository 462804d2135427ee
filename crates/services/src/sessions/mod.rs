mod controller;
mod pending;
mod recorder;
mod snapshot;

// Public API of the quiz session subsystem.
pub use controller::QuizController;
pub use recorder::SessionRecorder;
pub use snapshot::{QuizPhase, QuizSnapshot, RecordStatus};
