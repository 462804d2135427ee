use std::sync::Arc;

use quest_core::model::{AnswerRecord, SessionSummary, UserId};
use quest_core::session::{QuizSession, SessionError};
use storage::repository::{SessionPersistence, Storage};
use tracing::info;

use crate::error::QuizError;

/// Appends finished sessions to the persistence service.
#[derive(Clone)]
pub struct SessionRecorder {
    sessions: Arc<dyn SessionPersistence>,
}

impl SessionRecorder {
    #[must_use]
    pub fn new(sessions: Arc<dyn SessionPersistence>) -> Self {
        Self { sessions }
    }

    #[must_use]
    pub fn from_storage(storage: &Storage) -> Self {
        Self::new(Arc::clone(&storage.sessions))
    }

    /// Store the summary and the per-answer records of a completed session.
    ///
    /// Returns the id of the stored summary.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Session` if the session is not complete, and
    /// `QuizError::Storage` if the write fails, in which case nothing is stored.
    pub async fn record(&self, user_id: UserId, session: &QuizSession) -> Result<i64, QuizError> {
        let (Some(started_at), Some(completed_at)) = (session.started_at(), session.completed_at())
        else {
            return Err(SessionError::NotInProgress.into());
        };

        let results = session.results()?;
        let summary = SessionSummary::from_results(user_id, &results, started_at, completed_at)?;
        let records: Vec<AnswerRecord> = results
            .review()
            .iter()
            .map(|r| AnswerRecord::from_answer(user_id, r.question(), r.answer()))
            .collect();
        let summary_id = self.sessions.append_session(&summary, &records).await?;

        info!(
            user_id = %user_id,
            summary_id,
            score = summary.score_percentage(),
            answers = records.len(),
            "quiz session recorded"
        );
        Ok(summary_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quest_core::model::{DifficultyLevel, Question, QuestionDraft, QuestionId};
    use quest_core::time::fixed_now;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn question(id: u64) -> Question {
        QuestionDraft {
            french_word: format!("mot {id}"),
            english_translation: None,
            correct_answer: "yes".into(),
            options: vec!["yes".into(), "no".into()],
            category: Some("test".into()),
            difficulty_level: DifficultyLevel::A2,
        }
        .validate(QuestionId::new(id), fixed_now())
        .unwrap()
    }

    #[tokio::test]
    async fn records_summary_and_answers() {
        let storage = Storage::in_memory();
        let recorder = SessionRecorder::from_storage(&storage);
        let user = UserId::random();
        let mut rng = StdRng::seed_from_u64(5);
        let mut session = QuizSession::from_questions(vec![question(1), question(2)], fixed_now());
        for pick in ["yes", "no"] {
            session.submit_answer(pick, fixed_now(), &mut rng).unwrap();
            session.advance(fixed_now()).unwrap();
        }

        let id = recorder.record(user, &session).await.unwrap();

        let summary = storage.session_summaries.get_summary(id).await.unwrap();
        assert_eq!(summary.score_percentage(), 50);
        assert_eq!(summary.category(), Some("test"));
        let answers = storage.answer_log.list_answers(user).await.unwrap();
        assert_eq!(answers.len(), 2);
        assert!(answers.iter().all(|a| a.summary_id == Some(id)));
    }

    #[tokio::test]
    async fn unfinished_session_is_not_recorded() {
        let storage = Storage::in_memory();
        let recorder = SessionRecorder::from_storage(&storage);
        let session = QuizSession::from_questions(vec![question(1)], fixed_now());

        let err = recorder.record(UserId::random(), &session).await.unwrap_err();

        assert!(matches!(err, QuizError::Session(SessionError::NotInProgress)));
    }
}
