use rand::Rng;
use rand::seq::index;
use std::collections::HashSet;

use crate::model::Question;

/// Questions drawn for one quiz attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub questions: Vec<Question>,
    pub requested: usize,
    /// Distinct questions the pool could offer.
    pub available: usize,
}

impl Selection {
    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// True when the pool held fewer questions than requested.
    #[must_use]
    pub fn is_short(&self) -> bool {
        self.questions.len() < self.requested
    }
}

/// Draw `count` distinct questions from `pool` in random order.
///
/// Questions repeating an id already seen are skipped, so the result never
/// holds the same question twice. When the pool is smaller than `count` every
/// distinct question is returned, shuffled. The pool itself is left untouched.
pub fn select_questions<R: Rng + ?Sized>(
    pool: &[Question],
    count: usize,
    rng: &mut R,
) -> Selection {
    let mut seen = HashSet::with_capacity(pool.len());
    let distinct: Vec<&Question> = pool.iter().filter(|q| seen.insert(q.id())).collect();

    let available = distinct.len();
    let take = count.min(available);

    let questions = if take == 0 {
        Vec::new()
    } else {
        index::sample(rng, available, take)
            .into_iter()
            .map(|i| distinct[i].clone())
            .collect()
    };

    Selection {
        questions,
        requested: count,
        available,
    }
}
