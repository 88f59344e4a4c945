//! Inbound user actions and the callback payloads that encode them.

use thiserror::Error;

use quiz_core::model::{ChatId, DisplayName, QuizName, UserId};

pub const SHOW_LEADERBOARD: &str = "show_lk";
pub const LIST_QUIZZES: &str = "start_tests";
pub const SHOW_INSTRUCTOR: &str = "show_teacher";
pub const SHOW_MENU: &str = "show_start_menu";
const SELECT_PREFIX: &str = "select_";
const ANSWER_PREFIX: &str = "answer_";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CallbackError {
    #[error("unknown callback payload: {0:?}")]
    Unknown(String),
    #[error("malformed answer payload: {0:?}")]
    MalformedAnswer(String),
    #[error("quiz selection without a quiz name")]
    MissingQuiz,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionKind {
    Start { quiz: QuizName },
    Answer { question_index: Option<usize>, choice: u8 },
    LookupLeaderboard,
    ListQuizzes,
    ShowInstructor,
    ShowMenu,
}

impl ActionKind {
    /// Decode a callback payload such as `select_Geography` or `answer_0|2`.
    ///
    /// # Errors
    ///
    /// Returns `CallbackError` for payloads that name no known action.
    pub fn from_callback(data: &str) -> Result<Self, CallbackError> {
        match data {
            SHOW_LEADERBOARD => return Ok(ActionKind::LookupLeaderboard),
            LIST_QUIZZES => return Ok(ActionKind::ListQuizzes),
            SHOW_INSTRUCTOR => return Ok(ActionKind::ShowInstructor),
            SHOW_MENU => return Ok(ActionKind::ShowMenu),
            _ => {}
        }

        if let Some(quiz) = data.strip_prefix(SELECT_PREFIX) {
            let quiz = QuizName::new(quiz).map_err(|_| CallbackError::MissingQuiz)?;
            return Ok(ActionKind::Start { quiz });
        }
        if let Some(answer) = data.strip_prefix(ANSWER_PREFIX) {
            let malformed = || CallbackError::MalformedAnswer(data.to_string());
            let (index, choice) = answer.split_once('|').ok_or_else(malformed)?;
            return Ok(ActionKind::Answer {
                question_index: Some(index.parse().map_err(|_| malformed())?),
                choice: choice.parse().map_err(|_| malformed())?,
            });
        }
        Err(CallbackError::Unknown(data.to_string()))
    }
}

#[must_use]
pub fn select_payload(quiz: &QuizName) -> String {
    format!("{SELECT_PREFIX}{quiz}")
}

#[must_use]
pub fn answer_payload(question_index: usize, choice: u8) -> String {
    format!("{ANSWER_PREFIX}{question_index}|{choice}")
}

/// One thing a user asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAction {
    pub user: UserId,
    pub chat: ChatId,
    pub display_name: DisplayName,
    pub kind: ActionKind,
}

impl UserAction {
    /// Action from a user whose chat id equals their user id.
    #[must_use]
    pub fn direct(user: UserId, handle: Option<&str>, kind: ActionKind) -> Self {
        Self {
            user,
            chat: ChatId::new(user.value()),
            display_name: DisplayName::for_user(user, handle),
            kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_menu_payloads() {
        assert_eq!(ActionKind::from_callback("show_lk"), Ok(ActionKind::LookupLeaderboard));
        assert_eq!(ActionKind::from_callback("start_tests"), Ok(ActionKind::ListQuizzes));
        assert_eq!(ActionKind::from_callback("show_teacher"), Ok(ActionKind::ShowInstructor));
        assert_eq!(ActionKind::from_callback("show_start_menu"), Ok(ActionKind::ShowMenu));
    }

    #[test]
    fn decodes_quiz_selection_with_spaces() {
        let quiz = QuizName::new("World Capitals").unwrap();
        assert_eq!(
            ActionKind::from_callback(&select_payload(&quiz)),
            Ok(ActionKind::Start { quiz })
        );
        assert_eq!(ActionKind::from_callback("select_"), Err(CallbackError::MissingQuiz));
    }

    #[test]
    fn decodes_answers() {
        assert_eq!(
            ActionKind::from_callback(&answer_payload(3, 2)),
            Ok(ActionKind::Answer { question_index: Some(3), choice: 2 })
        );
        for bad in ["answer_", "answer_1", "answer_x|2", "answer_1|two", "answer_1|-1"] {
            assert!(
                matches!(ActionKind::from_callback(bad), Err(CallbackError::MalformedAnswer(_))),
                "{bad}"
            );
        }
        assert!(matches!(
            ActionKind::from_callback("dance"),
            Err(CallbackError::Unknown(_))
        ));
    }
}
