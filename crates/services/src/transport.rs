//! Outbound rendering seam.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use thiserror::Error;

use quiz_core::model::{ChatId, InstructorProfile, LeaderboardEntry, QuizName};

use crate::quiz::{CompletionSummary, QuestionPrompt};

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TransportError {
    #[error("transport closed")]
    Closed,
    #[error("send failed: {0}")]
    Send(String),
}

/// Short status messages shown instead of content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Menu,
    QuizUnavailable { quiz: QuizName },
    CatalogUnavailable,
    NoQuizzes,
    LeaderboardUnavailable,
    InstructorUnavailable,
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::Menu => f.write_str("Choose: instructor, personal stats or quizzes."),
            Notice::QuizUnavailable { quiz } => write!(
                f,
                "Could not load questions from {quiz}. Make sure the data starts at A2, or try another quiz."
            ),
            Notice::CatalogUnavailable => f.write_str("Could not load the list of quizzes."),
            Notice::NoQuizzes => f.write_str("No quizzes found."),
            Notice::LeaderboardUnavailable => f.write_str("Could not load your statistics."),
            Notice::InstructorUnavailable => {
                f.write_str("Could not load the instructor profile.")
            }
        }
    }
}

/// Renders replies to a chat.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn render_question(
        &self,
        chat: ChatId,
        prompt: &QuestionPrompt,
    ) -> Result<(), TransportError>;

    async fn render_summary(
        &self,
        chat: ChatId,
        summary: &CompletionSummary,
    ) -> Result<(), TransportError>;

    async fn render_leaderboard_entry(
        &self,
        chat: ChatId,
        entry: &LeaderboardEntry,
    ) -> Result<(), TransportError>;

    async fn render_quiz_list(
        &self,
        chat: ChatId,
        quizzes: &[QuizName],
    ) -> Result<(), TransportError>;

    async fn render_instructor(
        &self,
        chat: ChatId,
        profile: &InstructorProfile,
    ) -> Result<(), TransportError>;

    async fn render_notice(&self, chat: ChatId, notice: &Notice) -> Result<(), TransportError>;
}

/// Something a `RecordingTransport` was asked to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rendered {
    Question(QuestionPrompt),
    Summary(CompletionSummary),
    LeaderboardEntry(LeaderboardEntry),
    QuizList(Vec<QuizName>),
    Instructor(InstructorProfile),
    Notice(Notice),
}

/// Transport that keeps every render in memory, for tests and demos.
#[derive(Clone, Default)]
pub struct RecordingTransport {
    rendered: Arc<Mutex<Vec<(ChatId, Rendered)>>>,
}

impl RecordingTransport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, chat: ChatId, item: Rendered) -> Result<(), TransportError> {
        self.rendered
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((chat, item));
        Ok(())
    }

    /// Remove and return everything rendered so far.
    pub fn take(&self) -> Vec<(ChatId, Rendered)> {
        std::mem::take(&mut *self.rendered.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn render_question(
        &self,
        chat: ChatId,
        prompt: &QuestionPrompt,
    ) -> Result<(), TransportError> {
        self.push(chat, Rendered::Question(prompt.clone()))
    }

    async fn render_summary(
        &self,
        chat: ChatId,
        summary: &CompletionSummary,
    ) -> Result<(), TransportError> {
        self.push(chat, Rendered::Summary(summary.clone()))
    }

    async fn render_leaderboard_entry(
        &self,
        chat: ChatId,
        entry: &LeaderboardEntry,
    ) -> Result<(), TransportError> {
        self.push(chat, Rendered::LeaderboardEntry(entry.clone()))
    }

    async fn render_quiz_list(
        &self,
        chat: ChatId,
        quizzes: &[QuizName],
    ) -> Result<(), TransportError> {
        self.push(chat, Rendered::QuizList(quizzes.to_vec()))
    }

    async fn render_instructor(
        &self,
        chat: ChatId,
        profile: &InstructorProfile,
    ) -> Result<(), TransportError> {
        self.push(chat, Rendered::Instructor(profile.clone()))
    }

    async fn render_notice(&self, chat: ChatId, notice: &Notice) -> Result<(), TransportError> {
        self.push(chat, Rendered::Notice(notice.clone()))
    }
}
