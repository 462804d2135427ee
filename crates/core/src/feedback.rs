//! Encouragement shown after each answer.
//!
//! Everything here is a pure function of the answer's correctness and the
//! streak *after* that answer was applied. Variant choice within a tier is
//! random; callers that need repeatable output pass a seeded RNG.

use rand::Rng;

use crate::model::Question;

/// Streak from which the "on fire" message replaces every other correct message.
pub const HIGH_STREAK_THRESHOLD: u32 = 5;
/// Streak from which the encouraging message and celebrations kick in.
pub const CELEBRATION_THRESHOLD: u32 = 3;
/// The celebration overlay only re-triggers on multiples of this.
pub const CELEBRATION_INTERVAL: u32 = 3;

pub const ON_FIRE_MESSAGE: &str = "🔥 Amazing streak! You're on fire!";
pub const KEEP_IT_UP_MESSAGE: &str = "🎉 Great job! Keep it up!";

pub const CORRECT_MESSAGES: [&str; 5] = [
    "✅ Correct! Well done!",
    "🎯 Perfect! You got it!",
    "👏 Excellent work!",
    "⭐ That's right! Great job!",
    "🌟 Fantastic! Keep going!",
];

pub const INCORRECT_MESSAGES: [&str; 5] = [
    "💪 Don't worry, keep trying!",
    "📚 Learning opportunity! Try again!",
    "🎯 Close! You'll get the next one!",
    "💡 No problem, that's how we learn!",
    "🌱 Every mistake helps you grow!",
];

/// A single sine tone of an audio cue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tone {
    pub frequency_hz: u32,
    pub duration_ms: u32,
    /// Delay from the start of the cue.
    pub offset_ms: u32,
}

const SUCCESS_TONES: [Tone; 2] = [
    Tone {
        frequency_hz: 800,
        duration_ms: 100,
        offset_ms: 0,
    },
    Tone {
        frequency_hz: 1_000,
        duration_ms: 100,
        offset_ms: 100,
    },
];

const ERROR_TONES: [Tone; 1] = [Tone {
    frequency_hz: 300,
    duration_ms: 200,
    offset_ms: 0,
}];

/// Transient audio/visual cue accompanying feedback. Playback is up to the
/// presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackCue {
    Success,
    Error,
}

impl FeedbackCue {
    #[must_use]
    pub fn tones(self) -> &'static [Tone] {
        match self {
            FeedbackCue::Success => &SUCCESS_TONES,
            FeedbackCue::Error => &ERROR_TONES,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Feedback {
    message: &'static str,
    celebrate: bool,
    is_correct: bool,
}

impl Feedback {
    /// Never empty.
    #[must_use]
    pub fn message(&self) -> &'static str {
        self.message
    }

    /// Whether the streak celebration overlay should be shown.
    #[must_use]
    pub fn celebrate(&self) -> bool {
        self.celebrate
    }

    #[must_use]
    pub fn is_correct(&self) -> bool {
        self.is_correct
    }

    #[must_use]
    pub fn cue(&self) -> FeedbackCue {
        if self.is_correct {
            FeedbackCue::Success
        } else {
            FeedbackCue::Error
        }
    }
}

/// Derive the feedback for an answer.
///
/// `streak` is the streak after the answer was applied, so a correct answer
/// always arrives with `streak >= 1` and an incorrect one with `streak == 0`.
pub fn feedback_for<R: Rng + ?Sized>(is_correct: bool, streak: u32, rng: &mut R) -> Feedback {
    let message = if !is_correct {
        pick(&INCORRECT_MESSAGES, rng)
    } else if streak >= HIGH_STREAK_THRESHOLD {
        ON_FIRE_MESSAGE
    } else if streak >= CELEBRATION_THRESHOLD {
        KEEP_IT_UP_MESSAGE
    } else {
        pick(&CORRECT_MESSAGES, rng)
    };

    Feedback {
        message,
        celebrate: is_correct && is_celebration_streak(streak),
        is_correct,
    }
}

/// True on 3, 6, 9, ... consecutive correct answers.
#[must_use]
pub fn is_celebration_streak(streak: u32) -> bool {
    streak >= CELEBRATION_THRESHOLD && streak % CELEBRATION_INTERVAL == 0
}

/// Banner text for streak milestones.
#[must_use]
pub fn streak_milestone_message(streak: u32) -> Option<&'static str> {
    match streak {
        3 => Some("🔥 Great streak! You're doing amazing!"),
        5 => Some("🔥🔥 Incredible! Five in a row!"),
        7 => Some("🔥🔥🔥 Unstoppable! Seven correct!"),
        10 => Some("🔥🔥🔥🔥 LEGENDARY! Perfect streak!"),
        _ => None,
    }
}

/// `"Bonjour" means "Hello" in English.`
#[must_use]
pub fn explanation(question: &Question) -> String {
    format!(
        "\"{}\" means \"{}\" in English.",
        question.french_word(),
        question.correct_answer()
    )
}

/// Memory hook shown after a wrong answer.
#[must_use]
pub fn reminder(question: &Question) -> String {
    format!(
        "💡 Try to remember: {} = {}",
        question.french_word(),
        question.correct_answer()
    )
}

fn pick<R: Rng + ?Sized>(pool: &[&'static str; 5], rng: &mut R) -> &'static str {
    pool[rng.random_range(0..pool.len())]
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
