use quest_core::model::{Answer, AnswerRecord, QuestionId, SessionSummary, UserId};
use quest_core::results::QuizResults;
use quest_core::time::fixed_now;
use storage::pool_file::{PoolFileError, load_pool, write_pool};
use storage::repository::{InMemoryRepository, Storage};
use storage::sample::sample_questions;

fn temp_pool_path(name: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!("frenchquest-{}-{name}.json", std::process::id()))
}

#[tokio::test]
async fn written_sample_pool_loads_into_repository() {
    let path = temp_pool_path("sample");
    let sample = sample_questions(fixed_now()).expect("sample pool");
    write_pool(&path, &sample).expect("write pool");

    let loaded = load_pool(&path, fixed_now()).expect("load pool");
    let _ = std::fs::remove_file(&path);
    assert_eq!(loaded, sample);

    let storage = Storage::from_repository(InMemoryRepository::with_questions(loaded));
    let listed = storage.questions.list_questions().await.unwrap();
    assert_eq!(listed.len(), sample.len());
    let bonjour = storage
        .questions
        .get_question(QuestionId::new(1))
        .await
        .unwrap();
    assert_eq!(bonjour.correct_answer(), "Hello");
}

#[test]
fn missing_pool_file_is_an_io_error() {
    let path = temp_pool_path("does-not-exist");
    let err = load_pool(&path, fixed_now()).unwrap_err();
    assert!(matches!(err, PoolFileError::Io { .. }));
    assert!(err.to_string().contains("does-not-exist"));
}

#[tokio::test]
async fn completed_session_persists_summary_and_answers() {
    let storage = Storage::in_memory();
    let user = UserId::random();
    let questions = sample_questions(fixed_now()).unwrap();
    let quiz = &questions[..3];
    let answers: Vec<Answer> = quiz
        .iter()
        .map(|q| Answer::for_question(q, q.correct_answer(), fixed_now()))
        .collect();

    let results = QuizResults::summarize(quiz, &answers).unwrap();
    let summary = SessionSummary::from_results(user, &results, fixed_now(), fixed_now()).unwrap();
    let records: Vec<AnswerRecord> = quiz
        .iter()
        .zip(&answers)
        .map(|(q, a)| AnswerRecord::from_answer(user, q, a))
        .collect();
    let id = storage
        .sessions
        .append_session(&summary, &records)
        .await
        .unwrap();

    let rows = storage
        .session_summaries
        .list_summary_rows(user, 5)
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].summary.score_percentage(), 100);

    let logged = storage.answer_log.list_answers(user).await.unwrap();
    assert_eq!(logged.len(), 3);
    assert!(logged.iter().all(|r| r.summary_id == Some(id)));
}
