//! Built-in question pool used when no pool file is configured.

use chrono::{DateTime, Utc};
use quest_core::model::{DifficultyLevel, Question, QuestionDraft, QuestionError, QuestionId};

struct Entry {
    french: &'static str,
    answer: &'static str,
    options: [&'static str; 4],
    level: DifficultyLevel,
    category: &'static str,
}

const ENTRIES: [Entry; 15] = [
    Entry {
        french: "Bonjour",
        answer: "Hello",
        options: ["Good evening", "Hello", "Goodbye", "Thank you"],
        level: DifficultyLevel::A1,
        category: "greetings",
    },
    Entry {
        french: "Au revoir",
        answer: "Goodbye",
        options: ["Hello", "Please", "Goodbye", "Excuse me"],
        level: DifficultyLevel::A1,
        category: "greetings",
    },
    Entry {
        french: "Merci",
        answer: "Thank you",
        options: ["Please", "Thank you", "Sorry", "You're welcome"],
        level: DifficultyLevel::A1,
        category: "politeness",
    },
    Entry {
        french: "S'il vous plaît",
        answer: "Please",
        options: ["Thank you", "Excuse me", "Please", "Sorry"],
        level: DifficultyLevel::A1,
        category: "politeness",
    },
    Entry {
        french: "Excusez-moi",
        answer: "Excuse me",
        options: ["Sorry", "Excuse me", "Thank you", "Please"],
        level: DifficultyLevel::A1,
        category: "politeness",
    },
    Entry {
        french: "Bonsoir",
        answer: "Good evening",
        options: ["Good morning", "Good night", "Good evening", "Hello"],
        level: DifficultyLevel::A1,
        category: "greetings",
    },
    Entry {
        french: "le pain",
        answer: "bread",
        options: ["cheese", "bread", "butter", "milk"],
        level: DifficultyLevel::A1,
        category: "food",
    },
    Entry {
        french: "le fromage",
        answer: "cheese",
        options: ["cheese", "apple", "ham", "wine"],
        level: DifficultyLevel::A1,
        category: "food",
    },
    Entry {
        french: "la pomme",
        answer: "apple",
        options: ["potato", "pear", "apple", "plum"],
        level: DifficultyLevel::A1,
        category: "food",
    },
    Entry {
        french: "la boulangerie",
        answer: "bakery",
        options: ["butcher's", "bakery", "bank", "library"],
        level: DifficultyLevel::A2,
        category: "places",
    },
    Entry {
        french: "la gare",
        answer: "train station",
        options: ["airport", "garage", "train station", "harbour"],
        level: DifficultyLevel::A2,
        category: "places",
    },
    Entry {
        french: "le lendemain",
        answer: "the next day",
        options: ["the day before", "the next day", "yesterday", "the weekend"],
        level: DifficultyLevel::B1,
        category: "time",
    },
    Entry {
        french: "désormais",
        answer: "from now on",
        options: ["from now on", "never again", "meanwhile", "recently"],
        level: DifficultyLevel::B2,
        category: "time",
    },
    Entry {
        french: "épuisé",
        answer: "exhausted",
        options: ["excited", "exhausted", "amazed", "bored"],
        level: DifficultyLevel::B1,
        category: "feelings",
    },
    Entry {
        french: "la bienveillance",
        answer: "kindness",
        options: ["wealth", "welcome", "kindness", "wellbeing"],
        level: DifficultyLevel::C1,
        category: "feelings",
    },
];

/// The built-in pool, ids starting at 1.
///
/// # Errors
///
/// Returns `QuestionError` if an entry fails validation.
pub fn sample_questions(created_at: DateTime<Utc>) -> Result<Vec<Question>, QuestionError> {
    ENTRIES
        .iter()
        .zip(1_u64..)
        .map(|(entry, id)| {
            QuestionDraft {
                french_word: entry.french.to_owned(),
                english_translation: Some(entry.answer.to_owned()),
                correct_answer: entry.answer.to_owned(),
                options: entry.options.iter().map(|o| (*o).to_owned()).collect(),
                category: Some(entry.category.to_owned()),
                difficulty_level: entry.level,
            }
            .validate(QuestionId::new(id), created_at)
        })
        .collect()
}
