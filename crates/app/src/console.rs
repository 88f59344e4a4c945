//! Line-oriented transport: actions come from stdin, replies go to stdout.

use std::fmt::Write as _;

use async_trait::async_trait;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;

use quiz_core::model::{ChatId, InstructorProfile, LeaderboardEntry, QuizName, UpsertOutcome, UserId};
use services::dispatch::{answer_payload, select_payload};
use services::{
    ActionKind, CallbackError, CompletionSummary, Notice, PersistStatus, QuestionPrompt,
    Transport, TransportError, UserAction,
};

#[derive(Debug, PartialEq, Eq)]
pub enum LineError {
    MissingPayload,
    InvalidUser(String),
    Callback(CallbackError),
}

impl std::fmt::Display for LineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LineError::MissingPayload => f.write_str("expected `<user_id>[:<handle>] <action>`"),
            LineError::InvalidUser(raw) => write!(f, "invalid user id: {raw}"),
            LineError::Callback(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for LineError {}

/// Parse `<user_id>[:<handle>] <action>`.
///
/// The action is a callback payload (`start_tests`, `select_<quiz>`,
/// `answer_<q>|<c>`, ...) or a bare option number for the current question.
pub fn parse_line(line: &str) -> Result<UserAction, LineError> {
    let (who, payload) = line
        .trim()
        .split_once(char::is_whitespace)
        .ok_or(LineError::MissingPayload)?;
    let payload = payload.trim();
    if payload.is_empty() {
        return Err(LineError::MissingPayload);
    }

    let (id, handle) = match who.split_once(':') {
        Some((id, handle)) => (id, Some(handle).filter(|h| !h.is_empty())),
        None => (who, None),
    };
    let user: UserId = id
        .parse()
        .map_err(|_| LineError::InvalidUser(id.to_string()))?;

    let kind = match payload.parse::<u8>() {
        Ok(choice) => ActionKind::Answer {
            question_index: None,
            choice,
        },
        Err(_) => ActionKind::from_callback(payload).map_err(LineError::Callback)?,
    };
    Ok(UserAction::direct(user, handle, kind))
}

pub fn format_question(prompt: &QuestionPrompt) -> String {
    let mut out = format!(
        "[{} {}/{}] {}\n",
        prompt.quiz,
        prompt.question_index + 1,
        prompt.total,
        prompt.text
    );
    for (choice, option) in (1_u8..).zip(&prompt.options) {
        let _ = writeln!(
            out,
            "  {choice}) {option}    ({})",
            answer_payload(prompt.question_index, choice)
        );
    }
    out
}

pub fn format_summary(summary: &CompletionSummary) -> String {
    let saved = match summary.persisted {
        PersistStatus::Saved(UpsertOutcome::Inserted) => "Result saved.".to_string(),
        PersistStatus::Saved(UpsertOutcome::Improved { previous }) => {
            format!("New best, previous was {previous}. Result saved.")
        }
        PersistStatus::Saved(UpsertOutcome::Unchanged { best }) => {
            format!("Your best of {best} stays on record.")
        }
        PersistStatus::Failed => "The result could not be saved.".to_string(),
    };
    format!(
        "{}, quiz {} finished: {} correct. {saved}\n",
        summary.display_name, summary.quiz, summary.result
    )
}

pub fn format_leaderboard_entry(entry: &LeaderboardEntry) -> String {
    let total = if entry.quizzes_passed == 0 {
        "no quizzes passed".to_string()
    } else {
        format!("{} (over {} quizzes)", entry.total_score, entry.quizzes_passed)
    };
    format!(
        "Personal stats\n  Name: {}\n  Total score: {total}\n  Unique quizzes passed: {}\n",
        entry.display_name, entry.quizzes_passed
    )
}

pub fn format_quiz_list(quizzes: &[QuizName]) -> String {
    let mut out = String::from("Available quizzes:\n");
    for quiz in quizzes {
        let _ = writeln!(out, "  {quiz}    ({})", select_payload(quiz));
    }
    out
}

pub fn format_instructor(profile: &InstructorProfile) -> String {
    let mut out = format!("{}\n", profile.name);
    if !profile.description.is_empty() {
        let _ = writeln!(out, "\n{}\n", profile.description);
    }
    let _ = writeln!(out, "Contacts: {}", profile.contacts);
    for link in profile.media() {
        let _ = writeln!(out, "  {link}");
    }
    out
}

/// Writes every render as a text block tagged with its chat.
pub struct ConsoleTransport<W> {
    out: Mutex<W>,
}

impl<W> ConsoleTransport<W>
where
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }

    async fn emit(&self, chat: ChatId, body: String) -> Result<(), TransportError> {
        let block = format!("[chat {chat}]\n{body}\n");
        let mut out = self.out.lock().await;
        out.write_all(block.as_bytes())
            .await
            .map_err(|e| TransportError::Send(e.to_string()))?;
        out.flush()
            .await
            .map_err(|e| TransportError::Send(e.to_string()))
    }
}

#[async_trait]
impl<W> Transport for ConsoleTransport<W>
where
    W: AsyncWrite + Unpin + Send,
{
    async fn render_question(
        &self,
        chat: ChatId,
        prompt: &QuestionPrompt,
    ) -> Result<(), TransportError> {
        self.emit(chat, format_question(prompt)).await
    }

    async fn render_summary(
        &self,
        chat: ChatId,
        summary: &CompletionSummary,
    ) -> Result<(), TransportError> {
        self.emit(chat, format_summary(summary)).await
    }

    async fn render_leaderboard_entry(
        &self,
        chat: ChatId,
        entry: &LeaderboardEntry,
    ) -> Result<(), TransportError> {
        self.emit(chat, format_leaderboard_entry(entry)).await
    }

    async fn render_quiz_list(
        &self,
        chat: ChatId,
        quizzes: &[QuizName],
    ) -> Result<(), TransportError> {
        self.emit(chat, format_quiz_list(quizzes)).await
    }

    async fn render_instructor(
        &self,
        chat: ChatId,
        profile: &InstructorProfile,
    ) -> Result<(), TransportError> {
        self.emit(chat, format_instructor(profile)).await
    }

    async fn render_notice(&self, chat: ChatId, notice: &Notice) -> Result<(), TransportError> {
        self.emit(chat, format!("{notice}\n")).await
    }
}
