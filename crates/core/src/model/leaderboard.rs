use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use crate::model::{QuizName, UserId};

/// One ranked row of the published leaderboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardEntry {
    pub user_id: UserId,
    pub display_name: String,
    pub total_score: u32,
    pub quizzes_passed: u32,
}

impl LeaderboardEntry {
    /// Entry for a user with no recorded results.
    #[must_use]
    pub fn empty(user_id: UserId) -> Self {
        Self {
            user_id,
            display_name: String::new(),
            total_score: 0,
            quizzes_passed: 0,
        }
    }
}

/// Leaderboard order: total score desc, quizzes passed desc, display name asc,
/// then user id asc so the order is total.
#[must_use]
pub fn ranking_order(a: &LeaderboardEntry, b: &LeaderboardEntry) -> Ordering {
    b.total_score
        .cmp(&a.total_score)
        .then_with(|| b.quizzes_passed.cmp(&a.quizzes_passed))
        .then_with(|| a.display_name.cmp(&b.display_name))
        .then_with(|| a.user_id.cmp(&b.user_id))
}

/// Accumulates per-quiz results into per-user totals.
///
/// Duplicate rows for the same user and quiz count once, at their maximum.
#[derive(Debug, Default)]
pub struct LeaderboardTally {
    best: BTreeMap<UserId, BTreeMap<QuizName, u32>>,
    names: HashMap<UserId, String>,
}

impl LeaderboardTally {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one valid result row. The latest display name seen wins.
    pub fn record(&mut self, quiz: &QuizName, user: UserId, display_name: &str, score: u32) {
        self.names.insert(user, display_name.to_string());
        let per_quiz = self.best.entry(user).or_default();
        match per_quiz.get_mut(quiz) {
            Some(best) => *best = (*best).max(score),
            None => {
                per_quiz.insert(quiz.clone(), score);
            }
        }
    }

    #[must_use]
    pub fn users(&self) -> usize {
        self.best.len()
    }

    /// Produce the ranked leaderboard.
    #[must_use]
    pub fn finish(self) -> Vec<LeaderboardEntry> {
        let Self { best, mut names } = self;
        let mut entries: Vec<LeaderboardEntry> = best
            .into_iter()
            .map(|(user_id, per_quiz)| LeaderboardEntry {
                user_id,
                display_name: names.remove(&user_id).unwrap_or_default(),
                total_score: per_quiz
                    .values()
                    .fold(0_u32, |sum, score| sum.saturating_add(*score)),
                quizzes_passed: u32::try_from(per_quiz.len()).unwrap_or(u32::MAX),
            })
            .collect();
        entries.sort_by(ranking_order);
        entries
    }
}
