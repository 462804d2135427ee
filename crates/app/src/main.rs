use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use quest_core::model::{QuizConfig, UserId};
use services::{Clock, ProgressService, QuizController, SessionRecorder};
use storage::pool_file::load_pool;
use storage::repository::{InMemoryRepository, Storage};
use storage::sample::sample_questions;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod terminal;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidPool { raw: String },
    InvalidCount { raw: String },
    InvalidFeedbackMs { raw: String },
    InvalidUser { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidPool { raw } => write!(f, "invalid --pool value: {raw:?}"),
            ArgsError::InvalidCount { raw } => write!(f, "invalid --count value: {raw}"),
            ArgsError::InvalidFeedbackMs { raw } => {
                write!(f, "invalid --feedback-ms value: {raw}")
            }
            ArgsError::InvalidUser { raw } => {
                write!(f, "invalid --user value (expected UUID): {raw}")
            }
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Args {
    pool: Option<PathBuf>,
    count: Option<u32>,
    feedback_ms: Option<u64>,
    user: Option<UserId>,
}

fn parse_pool(value: String) -> Result<PathBuf, ArgsError> {
    if value.trim().is_empty() {
        return Err(ArgsError::InvalidPool { raw: value });
    }
    Ok(PathBuf::from(value))
}

fn parse_count(value: &str) -> Result<u32, ArgsError> {
    value.trim().parse().map_err(|_| ArgsError::InvalidCount {
        raw: value.to_owned(),
    })
}

fn parse_feedback_ms(value: &str) -> Result<u64, ArgsError> {
    value.trim().parse().map_err(|_| ArgsError::InvalidFeedbackMs {
        raw: value.to_owned(),
    })
}

fn parse_user(value: &str) -> Result<UserId, ArgsError> {
    value.parse().map_err(|_| ArgsError::InvalidUser {
        raw: value.to_owned(),
    })
}

impl Args {
    /// Environment first, flags override.
    fn parse(
        env: impl Fn(&str) -> Option<String>,
        mut args: impl Iterator<Item = String>,
    ) -> Result<Self, ArgsError> {
        let mut parsed = Self {
            pool: env("FRENCHQUEST_POOL").map(parse_pool).transpose()?,
            count: env("FRENCHQUEST_COUNT")
                .map(|v| parse_count(&v))
                .transpose()?,
            feedback_ms: env("FRENCHQUEST_FEEDBACK_MS")
                .map(|v| parse_feedback_ms(&v))
                .transpose()?,
            user: env("FRENCHQUEST_USER")
                .map(|v| parse_user(&v))
                .transpose()?,
        };

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--pool" => {
                    parsed.pool = Some(parse_pool(require_value(&mut args, "--pool")?)?);
                }
                "--count" => {
                    parsed.count = Some(parse_count(&require_value(&mut args, "--count")?)?);
                }
                "--feedback-ms" => {
                    let value = require_value(&mut args, "--feedback-ms")?;
                    parsed.feedback_ms = Some(parse_feedback_ms(&value)?);
                }
                "--user" => {
                    parsed.user = Some(parse_user(&require_value(&mut args, "--user")?)?);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(parsed)
    }

    fn quiz_config(&self) -> Result<QuizConfig, Box<dyn std::error::Error>> {
        let mut config = QuizConfig::default();
        if let Some(count) = self.count {
            config = config.with_questions_per_session(count);
        }
        if let Some(ms) = self.feedback_ms {
            config = config.with_feedback_millis(ms)?;
        }
        Ok(config)
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p frenchquest -- [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --pool <path>             JSON question pool (default: built-in sample)");
    eprintln!("  --count <n>               Questions per quiz (default: 10)");
    eprintln!("  --feedback-ms <ms>        How long feedback stays up (default: 2500)");
    eprintln!("  --user <uuid>             Learner id for progress (default: random)");
    eprintln!("  -h, --help                Show this help");
    eprintln!();
    eprintln!("Environment (same as flags):");
    eprintln!(
        "  FRENCHQUEST_POOL, FRENCHQUEST_COUNT, FRENCHQUEST_FEEDBACK_MS, FRENCHQUEST_USER"
    );
    eprintln!("  RUST_LOG controls log output on stderr (default: warn)");
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse(|key| std::env::var(key).ok(), std::env::args().skip(1)).map_err(
        |e| {
            eprintln!("{e}");
            print_usage();
            e
        },
    )?;
    init_tracing();

    let config = args.quiz_config()?;
    let now = Utc::now();
    let mut questions = match &args.pool {
        Some(path) => load_pool(path, now)?,
        None => sample_questions(now)?,
    };
    if questions.is_empty() {
        warn!("question pool is empty, using the built-in sample");
        questions = sample_questions(now)?;
    }
    info!(questions = questions.len(), "question pool ready");

    // Progress lives for this process only; the persistence service is external.
    let storage = Storage::from_repository(InMemoryRepository::with_questions(questions));
    let user = args.user.unwrap_or_else(UserId::random);
    let passing_score = config.passing_score();

    let controller = QuizController::new(Arc::clone(&storage.questions), config, Clock::default())
        .with_recorder(SessionRecorder::from_storage(&storage), user);
    let progress = ProgressService::from_storage(&storage).with_passing_score(passing_score);

    terminal::play(&controller, &progress, user).await
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn parse(env: &[(&str, &str)], argv: &[&str]) -> Result<Args, ArgsError> {
        let env: HashMap<String, String> = env
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        Args::parse(
            |key| env.get(key).cloned(),
            argv.iter().map(|a| (*a).to_owned()),
        )
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let args = parse(&[], &[]).unwrap();
        assert_eq!(args.pool, None);
        assert_eq!(args.count, None);
        let config = args.quiz_config().unwrap();
        assert_eq!(config.questions_per_session(), 10);
    }

    #[test]
    fn flags_override_environment() {
        let args = parse(
            &[("FRENCHQUEST_COUNT", "3"), ("FRENCHQUEST_POOL", "a.json")],
            &["--count", "7", "--feedback-ms", "1500"],
        )
        .unwrap();
        assert_eq!(args.count, Some(7));
        assert_eq!(args.pool, Some(PathBuf::from("a.json")));
        let config = args.quiz_config().unwrap();
        assert_eq!(config.questions_per_session(), 7);
        assert_eq!(config.feedback_duration().as_millis(), 1_500);
    }

    #[test]
    fn malformed_values_are_errors() {
        assert!(matches!(
            parse(&[], &["--count", "many"]),
            Err(ArgsError::InvalidCount { .. })
        ));
        assert!(matches!(
            parse(&[("FRENCHQUEST_USER", "nobody")], &[]),
            Err(ArgsError::InvalidUser { .. })
        ));
        assert!(matches!(
            parse(&[], &["--pool"]),
            Err(ArgsError::MissingValue { flag: "--pool" })
        ));
        assert!(matches!(
            parse(&[], &["--verbose"]),
            Err(ArgsError::UnknownArg(_))
        ));
    }

    #[test]
    fn out_of_range_feedback_is_a_config_error() {
        let args = parse(&[], &["--feedback-ms", "0"]).unwrap();
        assert!(args.quiz_config().is_err());
    }

    #[test]
    fn user_flag_accepts_uuid() {
        let args = parse(&[], &["--user", "67e55044-10b1-426f-9247-bb680e5fe0c8"]).unwrap();
        assert_eq!(
            args.user.unwrap().to_string(),
            "67e55044-10b1-426f-9247-bb680e5fe0c8"
        );
    }
}
