#![forbid(unsafe_code)]

pub mod app_services;
pub mod dispatch;
pub mod error;
pub mod instructor;
pub mod leaderboard;
pub mod ledger;
pub mod quiz;
pub mod transport;

pub use quiz_core::Clock;

pub use app_services::QuizServices;
pub use dispatch::{ActionKind, CallbackError, Dispatcher, UserAction};
pub use error::{AppServicesError, LeaderboardError, LedgerError, QuizLoadError};
pub use instructor::InstructorDirectory;
pub use leaderboard::{
    LeaderboardAggregator, LeaderboardReader, RebuildHandle, RebuildReport, RebuildStats,
    RebuildTrigger, RebuildWorker, RequestStatus,
};
pub use ledger::ScoreLedger;
pub use quiz::{
    CompletionSummary, IgnoredAnswer, PersistStatus, QuestionBank, QuestionPrompt, QuizCatalog,
    QuizEngine, QuizReply, SessionStore,
};
pub use transport::{Notice, RecordingTransport, Rendered, Transport, TransportError};
