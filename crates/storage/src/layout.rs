//! Where things live inside the tables.
//!
//! Row 1 of every table is a header; data starts on row 2.

use crate::range::CellRange;

/// `A2:F` of a quiz table: id, text, option 1..3, correct option.
pub const QUESTION_REGION: CellRange = CellRange::open(0, 1, 5);

/// `H2:K` of a quiz table: user id, display name, `score/total`, timestamp.
pub const RESULTS_REGION: CellRange = CellRange::open(7, 1, 10);

/// `A2:D` of the leaderboard table: user id, display name, total, passed.
pub const LEADERBOARD_REGION: CellRange = CellRange::open(0, 1, 3);

/// `A2:A10` of the instructor table. Fields sit on every other row.
pub const INSTRUCTOR_FIELDS: CellRange = CellRange::bounded(0, 1, 0, 9);

/// `B2:B12` of the instructor table, one description line per row.
pub const INSTRUCTOR_DESCRIPTION: CellRange = CellRange::bounded(1, 1, 1, 11);

pub const DEFAULT_LEADERBOARD_TABLE: &str = "Leaderboard";
pub const DEFAULT_INSTRUCTOR_TABLE: &str = "Teacher";

/// Tables that are never quizzes.
///
/// A table is reserved if its name contains one of the keywords
/// (case-insensitive) or equals one of the reserved names exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservedTables {
    leaderboard: String,
    instructor: String,
    keywords: Vec<String>,
}

impl Default for ReservedTables {
    fn default() -> Self {
        Self::new(DEFAULT_LEADERBOARD_TABLE, DEFAULT_INSTRUCTOR_TABLE)
    }
}

impl ReservedTables {
    #[must_use]
    pub fn new(leaderboard: impl Into<String>, instructor: impl Into<String>) -> Self {
        Self {
            leaderboard: leaderboard.into(),
            instructor: instructor.into(),
            keywords: vec!["leaderboard".into(), "results".into()],
        }
    }

    #[must_use]
    pub fn leaderboard(&self) -> &str {
        &self.leaderboard
    }

    #[must_use]
    pub fn instructor(&self) -> &str {
        &self.instructor
    }

    #[must_use]
    pub fn is_reserved(&self, table: &str) -> bool {
        if table == self.leaderboard || table == self.instructor {
            return true;
        }
        let lower = table.to_lowercase();
        self.keywords.iter().any(|k| lower.contains(k.as_str()))
    }
}
