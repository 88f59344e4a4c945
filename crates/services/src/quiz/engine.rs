use std::sync::Arc;

use quiz_core::model::{
    AnswerRejected, DisplayName, QuizName, ScoreText, Session, UpsertOutcome, UserId,
};

use super::bank::QuestionBank;
use super::store::SessionStore;
use crate::error::QuizLoadError;
use crate::leaderboard::{RebuildHandle, RebuildTrigger};
use crate::ledger::ScoreLedger;
use crate::Clock;

/// The question a user should answer next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionPrompt {
    pub quiz: QuizName,
    /// 0-based position, echoed back in answer callbacks.
    pub question_index: usize,
    pub total: usize,
    pub text: String,
    pub options: Vec<String>,
}

impl QuestionPrompt {
    /// Prompt for the session's current question, if one remains.
    #[must_use]
    pub fn for_session(session: &Session) -> Option<Self> {
        let question = session.current_question()?;
        Some(Self {
            quiz: session.quiz().clone(),
            question_index: session.question_index(),
            total: session.total(),
            text: question.text().to_string(),
            options: question.options().to_vec(),
        })
    }
}

/// Whether a finished attempt reached the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistStatus {
    Saved(UpsertOutcome),
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionSummary {
    pub quiz: QuizName,
    pub display_name: DisplayName,
    pub result: ScoreText,
    pub persisted: PersistStatus,
}

/// Why an answer had no effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IgnoredAnswer {
    NoSession,
    Rejected(AnswerRejected),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizReply {
    Question(QuestionPrompt),
    Completed(CompletionSummary),
    Ignored(IgnoredAnswer),
}

/// Drives users through quizzes and records finished attempts.
pub struct QuizEngine {
    clock: Clock,
    bank: QuestionBank,
    sessions: Arc<SessionStore>,
    ledger: ScoreLedger,
    rebuilds: Option<RebuildHandle>,
}

impl QuizEngine {
    #[must_use]
    pub fn new(
        clock: Clock,
        bank: QuestionBank,
        sessions: Arc<SessionStore>,
        ledger: ScoreLedger,
    ) -> Self {
        Self {
            clock,
            bank,
            sessions,
            ledger,
            rebuilds: None,
        }
    }

    /// Ask for a leaderboard rebuild after every finished attempt.
    #[must_use]
    pub fn with_rebuilds(mut self, rebuilds: RebuildHandle) -> Self {
        self.rebuilds = Some(rebuilds);
        self
    }

    #[must_use]
    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Load `quiz` and put `user` on its first question, replacing any
    /// session they already had.
    ///
    /// # Errors
    ///
    /// Returns `QuizLoadError` if the quiz cannot be played. The user's
    /// previous session is left untouched in that case.
    pub async fn start(&self, user: UserId, quiz: &QuizName) -> Result<QuestionPrompt, QuizLoadError> {
        let questions = Arc::new(self.bank.load(quiz).await?);
        let session = Session::start(questions, self.clock.now());
        let prompt =
            QuestionPrompt::for_session(&session).ok_or_else(|| QuizLoadError::Empty(quiz.clone()))?;

        if self.sessions.replace(user, session).await.is_some() {
            log::debug!("[QUIZ] user {user} abandoned a session to start {quiz}");
        }
        log::info!("[QUIZ] user {user} started {quiz} ({} questions)", prompt.total);
        Ok(prompt)
    }

    /// Apply `choice` to `user`'s current question.
    ///
    /// `question_index` is the question the answer was given for, when the
    /// transport knows it. Answers without a session, for another question,
    /// or outside the offered options change nothing.
    pub async fn answer(
        &self,
        user: UserId,
        display_name: &DisplayName,
        question_index: Option<usize>,
        choice: u8,
    ) -> QuizReply {
        let mut slot = self.sessions.lock(user).await;
        let Some(session) = slot.as_mut() else {
            log::debug!("[QUIZ] user {user} answered without a session");
            return QuizReply::Ignored(IgnoredAnswer::NoSession);
        };

        match session.answer(question_index, choice) {
            Ok(step) => log::debug!(
                "[QUIZ] user {user} answered {} of {}: correct={}",
                session.question_index(),
                session.total(),
                step.correct()
            ),
            Err(rejected) => {
                log::debug!("[QUIZ] user {user} answer ignored: {rejected}");
                return QuizReply::Ignored(IgnoredAnswer::Rejected(rejected));
            }
        }

        if let Some(prompt) = QuestionPrompt::for_session(session) {
            return QuizReply::Question(prompt);
        }
        let Some(finished) = slot.take() else {
            return QuizReply::Ignored(IgnoredAnswer::NoSession);
        };
        drop(slot);
        self.sessions.release(user);

        QuizReply::Completed(self.complete(user, display_name, &finished).await)
    }

    async fn complete(
        &self,
        user: UserId,
        display_name: &DisplayName,
        session: &Session,
    ) -> CompletionSummary {
        let total = u32::try_from(session.total()).unwrap_or(u32::MAX);
        let result = ScoreText::new(session.score(), total);
        let quiz = session.quiz();
        log::info!("[QUIZ] user {user} finished {quiz} with {result}");

        let persisted = match self
            .ledger
            .upsert(quiz, user, display_name.as_str(), result)
            .await
        {
            Ok(outcome) => PersistStatus::Saved(outcome),
            Err(err) => {
                log::warn!("[QUIZ] result of user {user} in {quiz} not saved: {err}");
                PersistStatus::Failed
            }
        };

        if let Some(rebuilds) = &self.rebuilds {
            let status = rebuilds.request(RebuildTrigger::QuizCompleted);
            log::debug!("[QUIZ] leaderboard rebuild request: {status:?}");
        }

        CompletionSummary {
            quiz: quiz.clone(),
            display_name: display_name.clone(),
            result,
            persisted,
        }
    }
}
