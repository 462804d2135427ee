use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use quest_core::Clock;
use quest_core::model::{QuizConfig, UserId};
use quest_core::selector::select_questions;
use quest_core::session::{AdvanceOutcome, QuizSession, SubmitOutcome};
use storage::repository::QuestionRepository;

use super::pending::PendingTransition;
use super::recorder::SessionRecorder;
use super::snapshot::{QuizSnapshot, RecordStatus};
use crate::error::QuizError;

//
// ─── SHARED STATE ──────────────────────────────────────────────────────────────
//

struct Inner {
    session: QuizSession,
    rng: StdRng,
    /// Bumped whenever the current pending transition is replaced or dropped.
    generation: u64,
    pending: Option<PendingTransition>,
    recorder: Option<(SessionRecorder, UserId)>,
    record_status: RecordStatus,
}

impl Inner {
    /// Cancel the pending transition and invalidate any timer already in flight.
    fn supersede(&mut self) -> u64 {
        if let Some(pending) = self.pending.take() {
            pending.cancel();
        }
        self.generation = self.generation.wrapping_add(1);
        self.generation
    }

    fn reset_to_loading(&mut self) {
        self.session = QuizSession::loading();
        self.record_status = if self.recorder.is_some() {
            RecordStatus::Idle
        } else {
            RecordStatus::Disabled
        };
    }
}

struct Shared {
    questions: Arc<dyn QuestionRepository>,
    config: QuizConfig,
    clock: Clock,
    inner: Mutex<Inner>,
    snapshots: watch::Sender<QuizSnapshot>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, inner: &Inner) -> QuizSnapshot {
        let snapshot = QuizSnapshot::capture(
            &inner.session,
            inner.generation,
            inner.record_status.clone(),
        );
        self.snapshots.send_replace(snapshot.clone());
        snapshot
    }

    /// Body of the feedback timer.
    async fn fire_advance(self: Arc<Self>, generation: u64) {
        let to_record = {
            let mut inner = self.lock();
            let current = inner.pending.as_ref().map(PendingTransition::generation);
            if current != Some(generation) {
                debug!(generation, ?current, "stale transition discarded");
                return;
            }
            // Dropping our own handle detaches rather than aborts.
            inner.pending = None;

            let to_record = match inner.session.advance(self.clock.now()) {
                Ok(AdvanceOutcome::NextQuestion { index }) => {
                    debug!(index, streak = inner.session.streak(), "next question");
                    None
                }
                Ok(AdvanceOutcome::Completed) => {
                    info!(
                        correct = inner.session.correct_count(),
                        total = inner.session.total_questions(),
                        "quiz completed"
                    );
                    match inner.recorder.clone() {
                        Some((recorder, user_id)) => {
                            inner.record_status = RecordStatus::Saving;
                            Some((recorder, user_id, inner.session.clone()))
                        }
                        None => None,
                    }
                }
                Err(err) => {
                    warn!(error = %err, generation, "scheduled advance failed");
                    None
                }
            };
            self.publish(&inner);
            to_record
        };

        let Some((recorder, user_id, session)) = to_record else {
            return;
        };

        let status = match recorder.record(user_id, &session).await {
            Ok(summary_id) => RecordStatus::Saved { summary_id },
            Err(err) => {
                warn!(error = %err, user_id = %user_id, "failed to record quiz session");
                RecordStatus::Failed {
                    reason: err.to_string(),
                }
            }
        };

        let mut inner = self.lock();
        if inner.generation == generation {
            inner.record_status = status;
            self.publish(&inner);
        }
    }
}

//
// ─── CONTROLLER ────────────────────────────────────────────────────────────────
//

/// Owns one quiz session and at most one pending deferred transition.
///
/// Every transition publishes a `QuizSnapshot` on a watch channel. After an
/// accepted answer the controller waits `feedback_duration` on a spawned task,
/// then advances to the next question or to the results.
pub struct QuizController {
    shared: Arc<Shared>,
}

impl QuizController {
    #[must_use]
    pub fn new(questions: Arc<dyn QuestionRepository>, config: QuizConfig, clock: Clock) -> Self {
        let inner = Inner {
            session: QuizSession::loading(),
            rng: StdRng::from_os_rng(),
            generation: 0,
            pending: None,
            recorder: None,
            record_status: RecordStatus::Disabled,
        };
        let (snapshots, _) = watch::channel(QuizSnapshot::capture(
            &inner.session,
            inner.generation,
            inner.record_status.clone(),
        ));

        Self {
            shared: Arc::new(Shared {
                questions,
                config,
                clock,
                inner: Mutex::new(inner),
                snapshots,
            }),
        }
    }

    /// Pin question order and message choice.
    #[must_use]
    pub fn with_seed(self, seed: u64) -> Self {
        self.shared.lock().rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Persist every completed session for `user_id`.
    #[must_use]
    pub fn with_recorder(self, recorder: SessionRecorder, user_id: UserId) -> Self {
        {
            let mut inner = self.shared.lock();
            inner.recorder = Some((recorder, user_id));
            if inner.record_status == RecordStatus::Disabled {
                inner.record_status = RecordStatus::Idle;
            }
            self.shared.publish(&inner);
        }
        self
    }

    #[must_use]
    pub fn config(&self) -> &QuizConfig {
        &self.shared.config
    }

    /// The latest published state.
    #[must_use]
    pub fn snapshot(&self) -> QuizSnapshot {
        self.shared.snapshots.borrow().clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<QuizSnapshot> {
        self.shared.snapshots.subscribe()
    }

    #[must_use]
    pub fn has_pending_transition(&self) -> bool {
        self.shared.lock().pending.is_some()
    }

    /// Fetch the pool and begin a fresh session.
    ///
    /// Any previous session and its pending transition are discarded. If
    /// another `start` or `restart` begins while the pool is loading, this
    /// call yields to it and returns the latest snapshot.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Storage` if the pool cannot be fetched; the session is
    /// then left in `NoQuestions`.
    pub async fn start(&self) -> Result<QuizSnapshot, QuizError> {
        let generation = {
            let mut inner = self.shared.lock();
            let generation = inner.supersede();
            inner.reset_to_loading();
            self.shared.publish(&inner);
            generation
        };
        debug!(generation, "loading question pool");

        let pool = match self.shared.questions.list_questions().await {
            Ok(pool) => pool,
            Err(err) => {
                warn!(error = %err, "failed to load question pool");
                let mut inner = self.shared.lock();
                if inner.generation == generation {
                    inner.session = QuizSession::from_questions(Vec::new(), self.shared.clock.now());
                    self.shared.publish(&inner);
                }
                return Err(err.into());
            }
        };

        let mut inner = self.shared.lock();
        if inner.generation != generation {
            debug!(generation, "quiz start superseded");
            return Ok(self.shared.publish(&inner));
        }

        let requested = usize::try_from(self.shared.config.questions_per_session())
            .unwrap_or(usize::MAX);
        let now = self.shared.clock.now();
        let selection = select_questions(&pool, requested, &mut inner.rng);
        if selection.is_short() {
            warn!(
                requested = selection.requested,
                available = selection.available,
                "question pool smaller than the requested quiz"
            );
        }
        let session = QuizSession::from_questions(selection.questions, now);
        if session.has_no_questions() {
            warn!(pool = pool.len(), requested, "no questions available");
        } else {
            info!(
                questions = session.total_questions(),
                pool = pool.len(),
                "quiz started"
            );
        }
        inner.session = session;
        Ok(self.shared.publish(&inner))
    }

    /// Discard the current session, show loading for `restart_delay`, then start again.
    ///
    /// # Errors
    ///
    /// Propagates errors from `start`.
    pub async fn restart(&self) -> Result<QuizSnapshot, QuizError> {
        {
            let mut inner = self.shared.lock();
            inner.supersede();
            inner.reset_to_loading();
            self.shared.publish(&inner);
        }
        info!("quiz restarting");
        tokio::time::sleep(self.shared.config.restart_delay()).await;
        self.start().await
    }

    /// Answer the current question.
    ///
    /// On acceptance exactly one advance is scheduled after `feedback_duration`.
    /// A second submission while feedback is showing returns
    /// `SubmitOutcome::Ignored` and schedules nothing.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Session` when the option is not offered or the quiz is
    /// not accepting answers, and `QuizError::NoRuntime` when called outside a
    /// Tokio runtime.
    pub fn submit_answer(&self, option: &str) -> Result<SubmitOutcome, QuizError> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| QuizError::NoRuntime)?;
        let now = self.shared.clock.now();

        let mut inner = self.shared.lock();
        let Inner { session, rng, .. } = &mut *inner;
        let outcome = match session.submit_answer(option, now, rng) {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(error = %err, "answer rejected");
                return Err(err.into());
            }
        };

        match outcome {
            SubmitOutcome::Ignored => {
                debug!("duplicate submission ignored");
            }
            SubmitOutcome::Accepted(feedback) => {
                let generation = inner.supersede();
                let shared = Arc::downgrade(&self.shared);
                let delay = self.shared.config.feedback_duration();
                let handle = runtime.spawn(async move {
                    tokio::time::sleep(delay).await;
                    if let Some(shared) = shared.upgrade() {
                        shared.fire_advance(generation).await;
                    }
                });
                inner.pending = Some(PendingTransition::new(generation, handle));
                debug!(
                    generation,
                    correct = feedback.is_correct(),
                    streak = inner.session.streak(),
                    "answer accepted"
                );
                self.shared.publish(&inner);
            }
        }

        Ok(outcome)
    }
}

impl Drop for QuizController {
    fn drop(&mut self) {
        if let Some(pending) = self.shared.lock().pending.take() {
            pending.cancel();
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
