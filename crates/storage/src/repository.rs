use async_trait::async_trait;
use quest_core::model::{AnswerRecord, Question, QuestionId, SessionSummary, UserId};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// A persisted session summary with its storage id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummaryRow {
    pub id: i64,
    pub summary: SessionSummary,
}

impl SessionSummaryRow {
    #[must_use]
    pub fn new(id: i64, summary: SessionSummary) -> Self {
        Self { id, summary }
    }
}

/// Source of quiz questions.
#[async_trait]
pub trait QuestionRepository: Send + Sync {
    /// Every question in the pool, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the pool cannot be read.
    async fn list_questions(&self) -> Result<Vec<Question>, StorageError>;

    /// Fetch a question by id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing, or other storage errors.
    async fn get_question(&self, id: QuestionId) -> Result<Question, StorageError>;

    /// Insert or replace a question.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the question cannot be stored.
    async fn upsert_question(&self, question: &Question) -> Result<(), StorageError>;
}

/// Completed-session summaries, keyed by learner.
#[async_trait]
pub trait SessionSummaryRepository: Send + Sync {
    /// Append a summary and return its new id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the summary cannot be stored.
    async fn append_summary(&self, summary: &SessionSummary) -> Result<i64, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing, or other storage errors.
    async fn get_summary(&self, id: i64) -> Result<SessionSummary, StorageError>;

    /// Most recent summaries for `user_id` first, at most `limit` of them.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if summaries cannot be read.
    async fn list_summary_rows(
        &self,
        user_id: UserId,
        limit: u32,
    ) -> Result<Vec<SessionSummaryRow>, StorageError>;
}

/// Per-answer progress records.
#[async_trait]
pub trait AnswerLogRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` if the records cannot be stored.
    async fn append_answers(&self, records: &[AnswerRecord]) -> Result<(), StorageError>;

    /// All records for `user_id` in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if records cannot be read.
    async fn list_answers(&self, user_id: UserId) -> Result<Vec<AnswerRecord>, StorageError>;
}

/// Writes a finished session as one unit.
#[async_trait]
pub trait SessionPersistence: Send + Sync {
    /// Store `summary` and its per-answer `records`, or neither.
    ///
    /// Every record is stamped with the new summary id, which is returned.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if the records belong to another user or
    /// do not match the summary's question count; other storage errors otherwise.
    /// Nothing is stored on error.
    async fn append_session(
        &self,
        summary: &SessionSummary,
        records: &[AnswerRecord],
    ) -> Result<i64, StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    questions: Arc<Mutex<BTreeMap<QuestionId, Question>>>,
    summaries: Arc<Mutex<Vec<SessionSummaryRow>>>,
    answers: Arc<Mutex<Vec<AnswerRecord>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A repository preloaded with `questions`; later duplicates of an id win.
    #[must_use]
    pub fn with_questions(questions: impl IntoIterator<Item = Question>) -> Self {
        let map = questions.into_iter().map(|q| (q.id(), q)).collect();
        Self {
            questions: Arc::new(Mutex::new(map)),
            ..Self::default()
        }
    }
}

fn poisoned<E: std::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

fn next_summary_id(rows: &[SessionSummaryRow]) -> Result<i64, StorageError> {
    i64::try_from(rows.len())
        .map(|len| len + 1)
        .map_err(|_| StorageError::Serialization("summary id overflow".into()))
}

#[async_trait]
impl QuestionRepository for InMemoryRepository {
    async fn list_questions(&self) -> Result<Vec<Question>, StorageError> {
        let guard = self.questions.lock().map_err(poisoned)?;
        Ok(guard.values().cloned().collect())
    }

    async fn get_question(&self, id: QuestionId) -> Result<Question, StorageError> {
        let guard = self.questions.lock().map_err(poisoned)?;
        guard.get(&id).cloned().ok_or(StorageError::NotFound)
    }

    async fn upsert_question(&self, question: &Question) -> Result<(), StorageError> {
        let mut guard = self.questions.lock().map_err(poisoned)?;
        guard.insert(question.id(), question.clone());
        Ok(())
    }
}

#[async_trait]
impl SessionSummaryRepository for InMemoryRepository {
    async fn append_summary(&self, summary: &SessionSummary) -> Result<i64, StorageError> {
        let mut guard = self.summaries.lock().map_err(poisoned)?;
        let id = next_summary_id(&guard)?;
        guard.push(SessionSummaryRow::new(id, summary.clone()));
        Ok(id)
    }

    async fn get_summary(&self, id: i64) -> Result<SessionSummary, StorageError> {
        let guard = self.summaries.lock().map_err(poisoned)?;
        guard
            .iter()
            .find(|row| row.id == id)
            .map(|row| row.summary.clone())
            .ok_or(StorageError::NotFound)
    }

    async fn list_summary_rows(
        &self,
        user_id: UserId,
        limit: u32,
    ) -> Result<Vec<SessionSummaryRow>, StorageError> {
        let guard = self.summaries.lock().map_err(poisoned)?;
        let mut rows: Vec<SessionSummaryRow> = guard
            .iter()
            .filter(|row| row.summary.user_id() == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| {
            b.summary
                .completed_at()
                .cmp(&a.summary.completed_at())
                .then(b.id.cmp(&a.id))
        });
        rows.truncate(limit as usize);
        Ok(rows)
    }
}

#[async_trait]
impl AnswerLogRepository for InMemoryRepository {
    async fn append_answers(&self, records: &[AnswerRecord]) -> Result<(), StorageError> {
        let mut guard = self.answers.lock().map_err(poisoned)?;
        guard.extend_from_slice(records);
        Ok(())
    }

    async fn list_answers(&self, user_id: UserId) -> Result<Vec<AnswerRecord>, StorageError> {
        let guard = self.answers.lock().map_err(poisoned)?;
        Ok(guard
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl SessionPersistence for InMemoryRepository {
    async fn append_session(
        &self,
        summary: &SessionSummary,
        records: &[AnswerRecord],
    ) -> Result<i64, StorageError> {
        let expected = usize::try_from(summary.total_questions()).unwrap_or(usize::MAX);
        if records.len() != expected || records.iter().any(|r| r.user_id != summary.user_id()) {
            return Err(StorageError::Conflict);
        }

        // Both locks are held before either log changes.
        let mut summaries = self.summaries.lock().map_err(poisoned)?;
        let mut answers = self.answers.lock().map_err(poisoned)?;
        let id = next_summary_id(&summaries)?;
        summaries.push(SessionSummaryRow::new(id, summary.clone()));
        answers.extend(records.iter().cloned().map(|r| r.with_summary_id(id)));
        Ok(id)
    }
}

/// Aggregates the repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub questions: Arc<dyn QuestionRepository>,
    pub session_summaries: Arc<dyn SessionSummaryRepository>,
    pub answer_log: Arc<dyn AnswerLogRepository>,
    pub sessions: Arc<dyn SessionPersistence>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        Self::from_repository(InMemoryRepository::new())
    }

    /// Share one in-memory repository across every role.
    #[must_use]
    pub fn from_repository(repo: InMemoryRepository) -> Self {
        let questions: Arc<dyn QuestionRepository> = Arc::new(repo.clone());
        let session_summaries: Arc<dyn SessionSummaryRepository> = Arc::new(repo.clone());
        let answer_log: Arc<dyn AnswerLogRepository> = Arc::new(repo.clone());
        let sessions: Arc<dyn SessionPersistence> = Arc::new(repo);
        Self {
            questions,
            session_summaries,
            answer_log,
            sessions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use quest_core::model::{Answer, DifficultyLevel, QuestionDraft};
    use quest_core::time::fixed_now;

    fn build_question(id: u64) -> Question {
        QuestionDraft {
            french_word: format!("mot {id}"),
            english_translation: None,
            correct_answer: "a".into(),
            options: vec!["a".into(), "b".into()],
            category: None,
            difficulty_level: DifficultyLevel::A1,
        }
        .validate(QuestionId::new(id), fixed_now())
        .unwrap()
    }

    fn summary(user: UserId, minutes: i64) -> SessionSummary {
        let at = fixed_now() + Duration::minutes(minutes);
        SessionSummary::from_persisted(user, at, at, 2, 1, 50, DifficultyLevel::A1, None).unwrap()
    }

    #[tokio::test]
    async fn questions_are_listed_by_id() {
        let repo = InMemoryRepository::with_questions([build_question(3), build_question(1)]);
        repo.upsert_question(&build_question(2)).await.unwrap();

        let ids: Vec<u64> = repo
            .list_questions()
            .await
            .unwrap()
            .iter()
            .map(|q| q.id().value())
            .collect();

        assert_eq!(ids, vec![1, 2, 3]);
        assert!(matches!(
            repo.get_question(QuestionId::new(9)).await,
            Err(StorageError::NotFound)
        ));
    }

    #[tokio::test]
    async fn summaries_are_listed_newest_first_per_user() {
        let repo = InMemoryRepository::new();
        let alice = UserId::random();
        let bob = UserId::random();

        let first = repo.append_summary(&summary(alice, 0)).await.unwrap();
        repo.append_summary(&summary(bob, 5)).await.unwrap();
        let third = repo.append_summary(&summary(alice, 10)).await.unwrap();

        let rows = repo.list_summary_rows(alice, 10).await.unwrap();
        assert_eq!(
            rows.iter().map(|r| r.id).collect::<Vec<_>>(),
            vec![third, first]
        );
        assert_eq!(repo.list_summary_rows(alice, 1).await.unwrap().len(), 1);
        assert_eq!(repo.get_summary(first).await.unwrap(), summary(alice, 0));
    }

    #[tokio::test]
    async fn answer_log_filters_by_user() {
        let storage = Storage::in_memory();
        let alice = UserId::random();
        let q = build_question(1);
        let answer = Answer::for_question(&q, "a", fixed_now());
        let record = AnswerRecord::from_answer(alice, &q, &answer);

        storage
            .answer_log
            .append_answers(&[record.clone()])
            .await
            .unwrap();

        assert_eq!(storage.answer_log.list_answers(alice).await.unwrap(), vec![record]);
        assert!(
            storage
                .answer_log
                .list_answers(UserId::random())
                .await
                .unwrap()
                .is_empty()
        );
    }

    /// A two-question session for `user`, one answer right and one wrong.
    fn finished_session(user: UserId) -> (SessionSummary, Vec<AnswerRecord>) {
        let records = [(1, "a"), (2, "b")]
            .into_iter()
            .map(|(id, pick)| {
                let q = build_question(id);
                AnswerRecord::from_answer(user, &q, &Answer::for_question(&q, pick, fixed_now()))
            })
            .collect();
        (summary(user, 0), records)
    }

    #[tokio::test]
    async fn session_is_stored_with_its_answers() {
        let repo = InMemoryRepository::new();
        let alice = UserId::random();
        let (summary, records) = finished_session(alice);

        let id = repo.append_session(&summary, &records).await.unwrap();

        assert_eq!(repo.get_summary(id).await.unwrap(), summary);
        let logged = repo.list_answers(alice).await.unwrap();
        assert_eq!(logged.len(), 2);
        assert!(logged.iter().all(|r| r.summary_id == Some(id)));
    }

    #[tokio::test]
    async fn mismatched_answers_store_nothing() {
        let repo = InMemoryRepository::new();
        let alice = UserId::random();
        let (summary, mut records) = finished_session(alice);
        records[1].user_id = UserId::random();

        let err = repo.append_session(&summary, &records).await.unwrap_err();
        assert!(matches!(err, StorageError::Conflict));

        let err = repo.append_session(&summary, &records[..1]).await.unwrap_err();
        assert!(matches!(err, StorageError::Conflict));

        assert!(repo.list_summary_rows(alice, 10).await.unwrap().is_empty());
        assert!(repo.list_answers(alice).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn failed_answer_write_leaves_no_summary_behind() {
        let repo = InMemoryRepository::new();
        let answers = Arc::clone(&repo.answers);
        let _ = std::thread::spawn(move || {
            let _guard = answers.lock().unwrap();
            panic!("answer log poisoned");
        })
        .join();
        let alice = UserId::random();
        let (summary, records) = finished_session(alice);

        let err = repo.append_session(&summary, &records).await.unwrap_err();

        assert!(matches!(err, StorageError::Connection(_)));
        assert!(repo.list_summary_rows(alice, 10).await.unwrap().is_empty());
    }
}
