//! Learner statistics derived from persisted sessions and answers.

use chrono::{Datelike, Days, NaiveDate};
use std::collections::BTreeMap;

use crate::model::{AnswerRecord, SessionSummary};
use crate::results::calculate_score;

pub const RECENT_SESSION_LIMIT: usize = 5;
pub const WEEKS_SHOWN: usize = 8;
pub const UNKNOWN_CATEGORY: &str = "unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccuracyBadge {
    Expert,
    Advanced,
    Intermediate,
    Beginner,
}

impl AccuracyBadge {
    #[must_use]
    pub fn from_accuracy(accuracy: u32) -> Self {
        match accuracy {
            90.. => AccuracyBadge::Expert,
            75..=89 => AccuracyBadge::Advanced,
            60..=74 => AccuracyBadge::Intermediate,
            _ => AccuracyBadge::Beginner,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            AccuracyBadge::Expert => "Expert",
            AccuracyBadge::Advanced => "Advanced",
            AccuracyBadge::Intermediate => "Intermediate",
            AccuracyBadge::Beginner => "Beginner",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryStat {
    pub category: String,
    pub total: u32,
    pub correct: u32,
    pub accuracy: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeeklyProgress {
    /// Sunday starting the week (UTC).
    pub week: NaiveDate,
    pub quizzes: u32,
    pub average_score: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressReport {
    pub total_quizzes: u32,
    pub total_questions: u32,
    pub correct_answers: u32,
    pub overall_accuracy: u32,
    pub average_score: u32,
    pub best_score: u32,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub categories: Vec<CategoryStat>,
    pub weekly: Vec<WeeklyProgress>,
    /// Most recent first.
    pub recent: Vec<SessionSummary>,
}

impl ProgressReport {
    /// Aggregate everything a learner has done so far.
    ///
    /// Input order does not matter. A session counts towards the streaks when
    /// its score reaches `passing_score`.
    #[must_use]
    pub fn build(
        summaries: &[SessionSummary],
        answers: &[AnswerRecord],
        passing_score: u32,
    ) -> Self {
        let mut chronological: Vec<&SessionSummary> = summaries.iter().collect();
        chronological.sort_by_key(|s| s.completed_at());

        let total_questions: u32 = summaries.iter().map(SessionSummary::total_questions).sum();
        let correct_answers: u32 = summaries.iter().map(SessionSummary::correct_answers).sum();
        let scores: Vec<u32> = chronological.iter().map(|s| s.score_percentage()).collect();

        let current_streak = chronological
            .iter()
            .rev()
            .take_while(|s| s.passed(passing_score))
            .count();

        let mut longest_streak = 0_usize;
        let mut run = 0_usize;
        for summary in &chronological {
            if summary.passed(passing_score) {
                run += 1;
                longest_streak = longest_streak.max(run);
            } else {
                run = 0;
            }
        }

        let recent = chronological
            .iter()
            .rev()
            .take(RECENT_SESSION_LIMIT)
            .map(|s| (*s).clone())
            .collect();

        Self {
            total_quizzes: count_u32(summaries.len()),
            total_questions,
            correct_answers,
            overall_accuracy: calculate_score(correct_answers as usize, total_questions as usize),
            average_score: rounded_mean(&scores),
            best_score: scores.iter().copied().max().unwrap_or(0),
            current_streak: count_u32(current_streak),
            longest_streak: count_u32(longest_streak),
            categories: category_stats(answers),
            weekly: weekly_progress(&chronological),
            recent,
        }
    }

    #[must_use]
    pub fn badge(&self) -> AccuracyBadge {
        AccuracyBadge::from_accuracy(self.overall_accuracy)
    }
}

/// The Sunday on or before `date`.
#[must_use]
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let back = u64::from(date.weekday().num_days_from_sunday());
    date.checked_sub_days(Days::new(back)).unwrap_or(date)
}

fn category_stats(answers: &[AnswerRecord]) -> Vec<CategoryStat> {
    let mut buckets: BTreeMap<&str, (u32, u32)> = BTreeMap::new();
    for record in answers {
        let key = record
            .category
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .unwrap_or(UNKNOWN_CATEGORY);
        let entry = buckets.entry(key).or_default();
        entry.0 = entry.0.saturating_add(1);
        if record.is_correct {
            entry.1 = entry.1.saturating_add(1);
        }
    }

    buckets
        .into_iter()
        .map(|(category, (total, correct))| CategoryStat {
            category: category.to_owned(),
            total,
            correct,
            accuracy: calculate_score(correct as usize, total as usize),
        })
        .collect()
}

fn weekly_progress(chronological: &[&SessionSummary]) -> Vec<WeeklyProgress> {
    let mut weeks: BTreeMap<NaiveDate, Vec<u32>> = BTreeMap::new();
    for summary in chronological {
        weeks
            .entry(week_start(summary.completed_at().date_naive()))
            .or_default()
            .push(summary.score_percentage());
    }

    let skip = weeks.len().saturating_sub(WEEKS_SHOWN);
    weeks
        .into_iter()
        .skip(skip)
        .map(|(week, scores)| WeeklyProgress {
            week,
            quizzes: count_u32(scores.len()),
            average_score: rounded_mean(&scores),
        })
        .collect()
}

fn rounded_mean(values: &[u32]) -> u32 {
    if values.is_empty() {
        return 0;
    }
    let n = values.len() as u64;
    let sum: u64 = values.iter().map(|v| u64::from(*v)).sum();
    u32::try_from((sum * 2 + n) / (2 * n)).unwrap_or(u32::MAX)
}

fn count_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}
