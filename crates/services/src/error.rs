//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::model::QuizName;
use storage::{SqliteInitError, StorageError};

/// Errors emitted while loading a quiz for a new session.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizLoadError {
    #[error("table {0} is not a quiz")]
    Reserved(QuizName),
    #[error("quiz {quiz} could not be read")]
    Unreadable {
        quiz: QuizName,
        #[source]
        source: StorageError,
    },
    #[error("quiz {0} has no questions")]
    Empty(QuizName),
    #[error("quiz {quiz} has no valid questions ({rejected} rows rejected)")]
    NoValidQuestions { quiz: QuizName, rejected: usize },
}

impl QuizLoadError {
    #[must_use]
    pub fn quiz(&self) -> &QuizName {
        match self {
            QuizLoadError::Reserved(quiz)
            | QuizLoadError::Unreadable { quiz, .. }
            | QuizLoadError::Empty(quiz)
            | QuizLoadError::NoValidQuestions { quiz, .. } => quiz,
        }
    }
}

/// Errors emitted by `ScoreLedger`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LedgerError {
    #[error("could not persist result for quiz {quiz}")]
    Persist {
        quiz: QuizName,
        #[source]
        source: StorageError,
    },
}

/// Errors emitted by the leaderboard aggregator and reader.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LeaderboardError {
    #[error("listing tables failed")]
    Listing(#[source] StorageError),
    #[error("publishing the leaderboard failed")]
    Publish(#[source] StorageError),
    #[error("reading the leaderboard failed")]
    Read(#[source] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
