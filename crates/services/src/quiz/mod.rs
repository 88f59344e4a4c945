//! Quiz selection and the per-user session state machine.

pub mod bank;
pub mod catalog;
pub mod engine;
pub mod store;

pub use bank::QuestionBank;
pub use catalog::QuizCatalog;
pub use engine::{
    CompletionSummary, IgnoredAnswer, PersistStatus, QuestionPrompt, QuizEngine, QuizReply,
};
pub use store::SessionStore;
