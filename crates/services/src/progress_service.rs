use chrono::{DateTime, Utc};
use std::sync::Arc;

use quest_core::model::{DEFAULT_PASSING_SCORE, DifficultyLevel, SessionSummary, UserId};
use quest_core::progress::ProgressReport;
use storage::repository::{
    AnswerLogRepository, InMemoryRepository, SessionSummaryRepository, SessionSummaryRow, Storage,
};

use crate::error::ProgressError;

/// Storage identifier for a persisted session summary.
pub type SessionSummaryId = i64;

/// Presentation-agnostic list item for a session summary.
///
/// No pre-formatted strings; the view decides how to render timestamps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummaryListItem {
    pub id: SessionSummaryId,
    pub completed_at: DateTime<Utc>,
    pub total: u32,
    pub correct: u32,
    pub score: u32,
    pub difficulty_level: DifficultyLevel,
    pub category: Option<String>,
}

impl SessionSummaryListItem {
    #[must_use]
    pub fn from_summary(id: SessionSummaryId, summary: &SessionSummary) -> Self {
        Self {
            id,
            completed_at: summary.completed_at(),
            total: summary.total_questions(),
            correct: summary.correct_answers(),
            score: summary.score_percentage(),
            difficulty_level: summary.difficulty_level(),
            category: summary.category().map(str::to_owned),
        }
    }

    #[must_use]
    pub fn from_row(row: &SessionSummaryRow) -> Self {
        Self::from_summary(row.id, &row.summary)
    }
}

/// Read side of a learner's history: dashboards and recent-session lists.
#[derive(Clone)]
pub struct ProgressService {
    summaries: Arc<dyn SessionSummaryRepository>,
    answers: Arc<dyn AnswerLogRepository>,
    passing_score: u32,
}

impl ProgressService {
    #[must_use]
    pub fn new(
        summaries: Arc<dyn SessionSummaryRepository>,
        answers: Arc<dyn AnswerLogRepository>,
    ) -> Self {
        Self {
            summaries,
            answers,
            passing_score: DEFAULT_PASSING_SCORE,
        }
    }

    #[must_use]
    pub fn from_storage(storage: &Storage) -> Self {
        Self::new(
            Arc::clone(&storage.session_summaries),
            Arc::clone(&storage.answer_log),
        )
    }

    #[must_use]
    pub fn in_memory() -> Self {
        Self::from_storage(&Storage::from_repository(InMemoryRepository::new()))
    }

    /// Score a session must reach to extend the learner's streak.
    #[must_use]
    pub fn with_passing_score(mut self, passing_score: u32) -> Self {
        self.passing_score = passing_score.min(100);
        self
    }

    /// Build the full statistics report for `user_id`.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::Storage` on repository failures.
    pub async fn report(&self, user_id: UserId) -> Result<ProgressReport, ProgressError> {
        let rows = self.summaries.list_summary_rows(user_id, u32::MAX).await?;
        let answers = self.answers.list_answers(user_id).await?;
        let summaries: Vec<SessionSummary> = rows.into_iter().map(|row| row.summary).collect();

        Ok(ProgressReport::build(
            &summaries,
            &answers,
            self.passing_score,
        ))
    }

    /// The most recent sessions of `user_id`, newest first.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::Storage` on repository failures.
    pub async fn recent(
        &self,
        user_id: UserId,
        limit: u32,
    ) -> Result<Vec<SessionSummaryListItem>, ProgressError> {
        let rows = self.summaries.list_summary_rows(user_id, limit).await?;
        Ok(rows.iter().map(SessionSummaryListItem::from_row).collect())
    }
}
