//! Line-oriented quiz UI on stdin/stdout.

use std::fmt::Write as _;
use std::io::Write as _;

use quest_core::feedback::{Feedback, explanation, reminder, streak_milestone_message};
use quest_core::model::{Question, UserId};
use quest_core::progress::ProgressReport;
use quest_core::results::QuizResults;
use quest_core::session::{SessionError, SubmitOutcome};
use services::{
    ProgressService, QuizController, QuizError, QuizPhase, QuizSnapshot, RecordStatus,
};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::watch;
use tracing::debug;

struct Prompt {
    lines: Lines<BufReader<Stdin>>,
}

impl Prompt {
    fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }

    /// `None` on end of input.
    async fn ask(&mut self, prompt: &str) -> std::io::Result<Option<String>> {
        print!("{prompt}");
        std::io::stdout().flush()?;
        Ok(self.lines.next_line().await?.map(|l| l.trim().to_owned()))
    }
}

/// Run quizzes until the learner quits or input ends.
///
/// # Errors
///
/// Returns I/O errors from the terminal and storage errors from the quiz.
pub async fn play(
    controller: &QuizController,
    progress: &ProgressService,
    user: UserId,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut prompt = Prompt::new();
    let mut updates = controller.subscribe();

    println!("🇫🇷 FrenchQuest: type the letter of your answer, or q to quit.\n");
    controller.start().await?;

    loop {
        let snap = controller.snapshot();
        match snap.phase {
            QuizPhase::Loading => {
                updates.changed().await?;
            }
            QuizPhase::NoQuestions => {
                println!("No questions available. Add some to the pool and try again.");
                return Ok(());
            }
            QuizPhase::AwaitingAnswer => {
                let Some(question) = snap.question.as_ref() else {
                    updates.changed().await?;
                    continue;
                };
                print!("{}", render_question(&snap, question));
                let Some(line) = prompt.ask("> ").await? else {
                    return Ok(());
                };
                if line.eq_ignore_ascii_case("q") {
                    return Ok(());
                }
                let Some(choice) = parse_choice(question, &line) else {
                    println!("Pick one of the listed letters.\n");
                    continue;
                };
                match controller.submit_answer(&choice) {
                    Ok(SubmitOutcome::Accepted(feedback)) => {
                        let streak = controller.snapshot().streak;
                        print!("{}", render_feedback(&feedback, question, streak));
                        ring(&mut std::io::stdout(), &feedback)?;
                    }
                    Ok(SubmitOutcome::Ignored) => {}
                    Err(QuizError::Session(SessionError::InvalidAnswer { .. })) => {
                        println!("Pick one of the listed options.\n");
                    }
                    Err(err) => return Err(err.into()),
                }
            }
            QuizPhase::ShowingFeedback => {
                wait_until(&mut updates, |s| s.phase != QuizPhase::ShowingFeedback).await?;
            }
            QuizPhase::Complete => {
                let done =
                    wait_until(&mut updates, |s| s.record_status != RecordStatus::Saving).await?;
                if let Some(results) = done.results.as_ref() {
                    print!(
                        "{}",
                        render_results(results, controller.config().passing_score())
                    );
                }
                if let RecordStatus::Failed { reason } = &done.record_status {
                    println!("⚠️  Your result could not be saved: {reason}\n");
                }
                match progress.report(user).await {
                    Ok(report) => print!("{}", render_progress(&report)),
                    Err(err) => debug!(error = %err, "progress report unavailable"),
                }

                let again = prompt.ask("Play again? [y/N] ").await?;
                if !matches!(again.as_deref(), Some("y" | "Y" | "yes")) {
                    return Ok(());
                }
                println!("\nLoading new questions...\n");
                controller.restart().await?;
            }
        }
    }
}

async fn wait_until(
    updates: &mut watch::Receiver<QuizSnapshot>,
    done: impl FnMut(&QuizSnapshot) -> bool,
) -> Result<QuizSnapshot, watch::error::RecvError> {
    let snap = updates.wait_for(done).await?;
    Ok(snap.clone())
}

/// One terminal bell per tone of the cue.
fn ring(out: &mut impl std::io::Write, feedback: &Feedback) -> std::io::Result<()> {
    let bells = "\x07".repeat(feedback.cue().tones().len());
    out.write_all(bells.as_bytes())?;
    out.flush()
}

//
// ─── RENDERING ─────────────────────────────────────────────────────────────────
//

const LABELS: [char; 26] = [
    'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'O', 'P', 'Q', 'R',
    'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z',
];

/// Resolve a typed letter, 1-based number or the option text itself.
fn parse_choice(question: &Question, input: &str) -> Option<String> {
    let input = input.trim();
    let mut chars = input.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        if let Some(option) = question.option_for_label(c) {
            return Some(option.to_owned());
        }
    }
    if let Ok(n) = input.parse::<usize>() {
        return n
            .checked_sub(1)
            .and_then(|i| question.options().get(i))
            .cloned();
    }
    question
        .options()
        .iter()
        .find(|o| o.eq_ignore_ascii_case(input))
        .cloned()
}

fn render_question(snap: &QuizSnapshot, question: &Question) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Question {} of {}   🔥 streak {}   ✅ {}",
        snap.question_number, snap.total_questions, snap.streak, snap.correct_so_far
    );
    let _ = writeln!(
        out,
        "[{}] What does \"{}\" mean?",
        question.difficulty_level(),
        question.french_word()
    );
    for (label, option) in LABELS.iter().zip(question.options()) {
        let _ = writeln!(out, "  {label}) {option}");
    }
    out
}

fn render_feedback(feedback: &Feedback, question: &Question, streak: u32) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\n{}", feedback.message());
    let _ = writeln!(out, "{}", explanation(question));
    if !feedback.is_correct() {
        let _ = writeln!(out, "{}", reminder(question));
    }
    if feedback.celebrate() {
        let banner = streak_milestone_message(streak).unwrap_or("🔥 Streak!");
        let _ = writeln!(out, "\n  ★ {banner} ({streak} correct in a row) ★");
    }
    out.push('\n');
    out
}

fn render_results(results: &QuizResults, passing_score: u32) -> String {
    let mut out = String::new();
    let grade = results.grade();
    let _ = writeln!(out, "═══ Quiz complete ═══");
    let _ = writeln!(
        out,
        "Score: {}% ({}/{})   Grade {}   {}",
        results.score_percentage(),
        results.correct_count(),
        results.total(),
        grade.label(),
        results.badge().label()
    );
    let _ = writeln!(out, "{}", grade.message());
    if results.passed(passing_score) {
        let _ = writeln!(out, "Passed (needed {passing_score}%).");
    } else {
        let _ = writeln!(out, "Not passed yet (needed {passing_score}%).");
    }
    let _ = writeln!(out, "\nReview:");
    for (i, review) in results.review().iter().enumerate() {
        let mark = if review.is_correct() { "✅" } else { "❌" };
        let _ = write!(
            out,
            "  {}. {mark} {} → {}",
            i + 1,
            review.question().french_word(),
            review.selected_answer()
        );
        if !review.is_correct() {
            let _ = write!(out, " (correct: {})", review.correct_answer());
        }
        out.push('\n');
    }
    out.push('\n');
    out
}

fn render_progress(report: &ProgressReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "─── Your progress ───");
    let _ = writeln!(
        out,
        "Quizzes {}   Accuracy {}% ({})   Average {}%   Best {}%",
        report.total_quizzes,
        report.overall_accuracy,
        report.badge().label(),
        report.average_score,
        report.best_score
    );
    let _ = writeln!(
        out,
        "Streak {} (longest {})",
        report.current_streak, report.longest_streak
    );
    for stat in &report.categories {
        let _ = writeln!(
            out,
            "  {:<12} {:>3}%  ({}/{})",
            stat.category, stat.accuracy, stat.correct, stat.total
        );
    }
    if report.weekly.iter().any(|w| w.quizzes > 0) {
        let _ = writeln!(out, "Weekly:");
        for week in report.weekly.iter().filter(|w| w.quizzes > 0) {
            let _ = writeln!(
                out,
                "  week of {}  {} quiz(zes), average {}%",
                week.week.format("%b %d"),
                week.quizzes,
                week.average_score
            );
        }
    }
    if !report.recent.is_empty() {
        let _ = writeln!(out, "Recent:");
        for summary in &report.recent {
            let _ = writeln!(
                out,
                "  {}  {}% ({}/{})",
                summary.completed_at().format("%Y-%m-%d %H:%M"),
                summary.score_percentage(),
                summary.correct_answers(),
                summary.total_questions()
            );
        }
    }
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use quest_core::feedback::feedback_for;
    use quest_core::model::{Answer, DifficultyLevel, QuestionDraft, QuestionId};
    use quest_core::time::fixed_now;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn bonjour() -> Question {
        QuestionDraft {
            french_word: "Bonjour".into(),
            english_translation: Some("Hello".into()),
            correct_answer: "Hello".into(),
            options: vec![
                "Good evening".into(),
                "Hello".into(),
                "Goodbye".into(),
                "Thank you".into(),
            ],
            category: Some("greetings".into()),
            difficulty_level: DifficultyLevel::A1,
        }
        .validate(QuestionId::new(1), fixed_now())
        .unwrap()
    }

    #[test]
    fn choices_resolve_by_letter_number_or_text() {
        let q = bonjour();
        assert_eq!(parse_choice(&q, "b").as_deref(), Some("Hello"));
        assert_eq!(parse_choice(&q, "B").as_deref(), Some("Hello"));
        assert_eq!(parse_choice(&q, "3").as_deref(), Some("Goodbye"));
        assert_eq!(parse_choice(&q, "thank you").as_deref(), Some("Thank you"));
        assert_eq!(parse_choice(&q, "0"), None);
        assert_eq!(parse_choice(&q, "z"), None);
        assert_eq!(parse_choice(&q, "salut"), None);
    }

    #[test]
    fn results_show_correct_answer_only_when_wrong() {
        let q = bonjour();
        let results =
            QuizResults::summarize(&[q.clone()], &[Answer::for_question(&q, "Goodbye", fixed_now())])
                .unwrap();
        let text = render_results(&results, 70);
        assert!(text.contains("Score: 0% (0/1)"));
        assert!(text.contains("(correct: Hello)"));
        assert!(text.contains("Not passed yet"));

        let results =
            QuizResults::summarize(&[q.clone()], &[Answer::for_question(&q, "Hello", fixed_now())])
                .unwrap();
        let text = render_results(&results, 70);
        assert!(!text.contains("(correct:"));
        assert!(text.contains("Grade A+"));
    }

    #[test]
    fn progress_lists_categories() {
        let report = ProgressReport::build(&[], &[], 70);
        let text = render_progress(&report);
        assert!(text.contains("Quizzes 0"));
        assert!(text.contains("Beginner"));
    }

    struct ClosedPipe;

    impl std::io::Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::ErrorKind::BrokenPipe.into())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Err(std::io::ErrorKind::BrokenPipe.into())
        }
    }

    #[test]
    fn bell_rings_once_per_tone() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut out = Vec::new();

        ring(&mut out, &feedback_for(true, 1, &mut rng)).unwrap();
        assert_eq!(out, b"\x07\x07");

        out.clear();
        ring(&mut out, &feedback_for(false, 0, &mut rng)).unwrap();
        assert_eq!(out, b"\x07");
    }

    #[test]
    fn bell_reports_write_errors() {
        let mut rng = StdRng::seed_from_u64(3);
        let err = ring(&mut ClosedPipe, &feedback_for(true, 1, &mut rng)).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::BrokenPipe);
    }
}
