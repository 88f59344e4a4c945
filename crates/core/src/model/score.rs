use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::model::UserId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("expected `<score>/<total>`, got {raw:?}")]
pub struct ScoreTextError {
    raw: String,
}

/// A result as stored in a results cell: `"<score>/<total>"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreText {
    score: u32,
    total: u32,
}

impl ScoreText {
    #[must_use]
    pub fn new(score: u32, total: u32) -> Self {
        Self { score, total }
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.total
    }
}

impl fmt::Display for ScoreText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.score, self.total)
    }
}

impl FromStr for ScoreText {
    type Err = ScoreTextError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ScoreTextError { raw: s.to_string() };
        let mut parts = s.split('/');
        let (Some(score), Some(total), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(err());
        };
        let score = score.trim().parse::<u32>().map_err(|_| err())?;
        let total = total.trim().parse::<u32>().map_err(|_| err())?;
        Ok(Self { score, total })
    }
}

/// A user's best result in one quiz.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreRecord {
    pub user_id: UserId,
    pub display_name: String,
    pub result: ScoreText,
    /// Formatted with `time::format_timestamp`.
    pub recorded_at: String,
}

/// What a best-score upsert did to the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// No previous row; a new one was appended.
    Inserted,
    /// The previous best was beaten and its row overwritten in place.
    Improved { previous: u32 },
    /// The previous best was not beaten; nothing was written.
    Unchanged { best: u32 },
}

impl UpsertOutcome {
    #[must_use]
    pub fn written(self) -> bool {
        !matches!(self, UpsertOutcome::Unchanged { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_score_text() {
        let parsed: ScoreText = "7/10".parse().unwrap();
        assert_eq!(parsed, ScoreText::new(7, 10));
        assert_eq!(parsed.to_string(), "7/10");
    }

    #[test]
    fn rejects_malformed_score_text() {
        for raw in ["", "7", "seven/10", "7/10/1", "-1/10", "7/ten"] {
            assert!(raw.parse::<ScoreText>().is_err(), "{raw:?} should not parse");
        }
    }

    #[test]
    fn unchanged_is_the_only_unwritten_outcome() {
        assert!(UpsertOutcome::Inserted.written());
        assert!(UpsertOutcome::Improved { previous: 1 }.written());
        assert!(!UpsertOutcome::Unchanged { best: 3 }.written());
    }
}
