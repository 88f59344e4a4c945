//! Typed boundary between string cells and domain values.
//!
//! One parser per field type. A failure rejects the row it came from; callers
//! decide whether that skips the row or falls back to a default.

use quiz_core::model::{
    InstructorProfile, LeaderboardEntry, Question, QuestionError, ScoreRecord,
    ScoreText, UserId,
};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CellError {
    #[error("row has {found} cells, expected at least {expected}")]
    TooShort { expected: usize, found: usize },

    #[error("invalid user id: {0:?}")]
    UserId(String),

    #[error("invalid score cell: {0:?}")]
    Score(String),

    #[error("invalid count: {0:?}")]
    Count(String),

    #[error("invalid correct option: {0:?}")]
    CorrectOption(String),

    #[error(transparent)]
    Question(#[from] QuestionError),
}

fn require(row: &[String], expected: usize) -> Result<(), CellError> {
    if row.len() < expected {
        return Err(CellError::TooShort {
            expected,
            found: row.len(),
        });
    }
    Ok(())
}

// ─── Field parsers ─────────────────────────────────────────────────────────────

pub fn parse_user_id(cell: &str) -> Result<UserId, CellError> {
    cell.parse().map_err(|_| CellError::UserId(cell.to_string()))
}

pub fn parse_score_text(cell: &str) -> Result<ScoreText, CellError> {
    cell.parse().map_err(|_| CellError::Score(cell.to_string()))
}

pub fn parse_count(cell: &str) -> Result<u32, CellError> {
    cell.trim()
        .parse()
        .map_err(|_| CellError::Count(cell.to_string()))
}

pub fn parse_correct_option(cell: &str) -> Result<i64, CellError> {
    cell.trim()
        .parse()
        .map_err(|_| CellError::CorrectOption(cell.to_string()))
}

// ─── Question rows (`A2:F`) ────────────────────────────────────────────────────

/// id, text, option 1, option 2, option 3, correct option.
pub fn question_from_row(row: &[String]) -> Result<Question, CellError> {
    require(row, 6)?;
    let correct = parse_correct_option(&row[5])?;
    Ok(Question::new(
        row[0].clone(),
        row[1].clone(),
        row[2..5].to_vec(),
        correct,
    )?)
}

// ─── Result rows (`H2:K`) ──────────────────────────────────────────────────────

/// The fields of a result row the leaderboard needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultRow {
    pub user_id: UserId,
    pub display_name: String,
    pub result: ScoreText,
}

/// user id, display name, `score/total` (timestamp optional).
pub fn result_from_row(row: &[String]) -> Result<ResultRow, CellError> {
    require(row, 3)?;
    Ok(ResultRow {
        user_id: parse_user_id(&row[0])?,
        display_name: row[1].clone(),
        result: parse_score_text(&row[2])?,
    })
}

/// User a result row belongs to, if its id cell parses.
#[must_use]
pub fn result_row_owner(row: &[String]) -> Option<UserId> {
    row.first().and_then(|cell| parse_user_id(cell).ok())
}

/// Best score recorded in a result row. An unreadable score counts as 0.
#[must_use]
pub fn result_row_best(row: &[String]) -> u32 {
    row.get(2)
        .and_then(|cell| parse_score_text(cell).ok())
        .map_or(0, |s| s.score())
}

#[must_use]
pub fn score_record_to_row(record: &ScoreRecord) -> Vec<String> {
    vec![
        record.user_id.to_string(),
        record.display_name.clone(),
        record.result.to_string(),
        record.recorded_at.clone(),
    ]
}

// ─── Leaderboard rows (`A2:D`) ─────────────────────────────────────────────────

/// user id, display name, total score, quizzes passed.
///
/// Numeric cells that do not parse read as 0.
pub fn leaderboard_entry_from_row(row: &[String]) -> Result<LeaderboardEntry, CellError> {
    require(row, 4)?;
    Ok(LeaderboardEntry {
        user_id: parse_user_id(&row[0])?,
        display_name: row[1].clone(),
        total_score: parse_count(&row[2]).unwrap_or(0),
        quizzes_passed: parse_count(&row[3]).unwrap_or(0),
    })
}

#[must_use]
pub fn leaderboard_entry_to_row(entry: &LeaderboardEntry) -> Vec<String> {
    vec![
        entry.user_id.to_string(),
        entry.display_name.clone(),
        entry.total_score.to_string(),
        entry.quizzes_passed.to_string(),
    ]
}

// ─── Instructor table ──────────────────────────────────────────────────────────

fn field(rows: &[Vec<String>], index: usize) -> Option<String> {
    rows.get(index)
        .and_then(|row| row.first())
        .filter(|cell| !cell.is_empty())
        .cloned()
}

/// Build a profile from `A2:A10` (fields on every other row) and `B2:B12`.
#[must_use]
pub fn instructor_from_rows(fields: &[Vec<String>], description: &[Vec<String>]) -> InstructorProfile {
    let defaults = InstructorProfile::default();
    InstructorProfile {
        name: field(fields, 0).unwrap_or(defaults.name),
        photo_url: field(fields, 2),
        audio_url: field(fields, 4),
        video_url: field(fields, 6),
        contacts: field(fields, 8).unwrap_or(defaults.contacts),
        description: description
            .iter()
            .map(|row| row.first().map_or("", String::as_str))
            .collect::<Vec<_>>()
            .join("\n"),
    }
}
