//! Routes user actions to services and renders the replies.

pub mod action;

use std::sync::Arc;

use tokio::sync::mpsc;

use quiz_core::model::{ChatId, QuizName, UserId};

pub use action::{ActionKind, CallbackError, UserAction, answer_payload, select_payload};

use crate::instructor::InstructorDirectory;
use crate::leaderboard::LeaderboardReader;
use crate::quiz::{QuizCatalog, QuizEngine, QuizReply};
use crate::transport::{Notice, Transport, TransportError};

/// Handles one action at a time. Failures become notices or log lines.
#[derive(Clone)]
pub struct Dispatcher {
    engine: Arc<QuizEngine>,
    catalog: Arc<QuizCatalog>,
    leaderboard: Arc<LeaderboardReader>,
    instructor: Arc<InstructorDirectory>,
    transport: Arc<dyn Transport>,
}

impl Dispatcher {
    #[must_use]
    pub fn new(
        engine: Arc<QuizEngine>,
        catalog: Arc<QuizCatalog>,
        leaderboard: Arc<LeaderboardReader>,
        instructor: Arc<InstructorDirectory>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            engine,
            catalog,
            leaderboard,
            instructor,
            transport,
        }
    }

    /// Dispatch actions until every sender is dropped.
    pub async fn run(&self, mut actions: mpsc::Receiver<UserAction>) {
        while let Some(action) = actions.recv().await {
            self.dispatch(action).await;
        }
        log::info!("[DISPATCH] action channel closed");
    }

    pub async fn dispatch(&self, action: UserAction) {
        let chat = action.chat;
        let user = action.user;
        let rendered = match action.kind {
            ActionKind::Start { quiz } => self.start(chat, user, &quiz).await,
            ActionKind::Answer {
                question_index,
                choice,
            } => {
                let reply = self
                    .engine
                    .answer(user, &action.display_name, question_index, choice)
                    .await;
                match reply {
                    QuizReply::Question(prompt) => {
                        self.transport.render_question(chat, &prompt).await
                    }
                    QuizReply::Completed(summary) => {
                        self.transport.render_summary(chat, &summary).await
                    }
                    QuizReply::Ignored(_) => Ok(()),
                }
            }
            ActionKind::LookupLeaderboard => match self.leaderboard.lookup(user).await {
                Ok(mut entry) => {
                    if entry.display_name.is_empty() {
                        entry.display_name = action.display_name.as_str().to_string();
                    }
                    self.transport.render_leaderboard_entry(chat, &entry).await
                }
                Err(err) => {
                    log::warn!("[DISPATCH] leaderboard lookup for user {user} failed: {err}");
                    self.notify(chat, Notice::LeaderboardUnavailable).await
                }
            },
            ActionKind::ListQuizzes => match self.catalog.list().await {
                Ok(quizzes) if quizzes.is_empty() => self.notify(chat, Notice::NoQuizzes).await,
                Ok(quizzes) => self.transport.render_quiz_list(chat, &quizzes).await,
                Err(err) => {
                    log::warn!("[DISPATCH] listing quizzes failed: {err}");
                    self.notify(chat, Notice::CatalogUnavailable).await
                }
            },
            ActionKind::ShowInstructor => match self.instructor.load().await {
                Ok(profile) => self.transport.render_instructor(chat, &profile).await,
                Err(err) => {
                    log::warn!("[DISPATCH] loading instructor profile failed: {err}");
                    self.notify(chat, Notice::InstructorUnavailable).await
                }
            },
            ActionKind::ShowMenu => self.notify(chat, Notice::Menu).await,
        };

        if let Err(err) = rendered {
            log::warn!("[DISPATCH] render to chat {chat} failed: {err}");
        }
    }

    async fn start(
        &self,
        chat: ChatId,
        user: UserId,
        quiz: &QuizName,
    ) -> Result<(), TransportError> {
        match self.engine.start(user, quiz).await {
            Ok(prompt) => self.transport.render_question(chat, &prompt).await,
            Err(err) => {
                log::warn!("[DISPATCH] user {user} could not start {quiz}: {err}");
                self.notify(
                    chat,
                    Notice::QuizUnavailable {
                        quiz: err.quiz().clone(),
                    },
                )
                .await
            }
        }
    }

    async fn notify(&self, chat: ChatId, notice: Notice) -> Result<(), TransportError> {
        self.transport.render_notice(chat, &notice).await
    }
}
