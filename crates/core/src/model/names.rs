use thiserror::Error;

use crate::model::UserId;

/// Name of a quiz, which is also the name of the table holding it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QuizName(String);

impl QuizName {
    /// Create a validated quiz name.
    ///
    /// # Errors
    ///
    /// Returns `NameError::EmptyQuizName` if the name is empty or blank.
    /// Other names are kept as given, surrounding whitespace included.
    pub fn new(value: impl Into<String>) -> Result<Self, NameError> {
        let raw = value.into();
        if raw.trim().is_empty() {
            return Err(NameError::EmptyQuizName);
        }
        Ok(Self(raw))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for QuizName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Name shown next to a user's results.
///
/// Falls back to `ID_<user id>` when the transport has no handle for the user.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DisplayName(String);

impl DisplayName {
    #[must_use]
    pub fn for_user(user: UserId, handle: Option<&str>) -> Self {
        match handle.map(str::trim) {
            Some(handle) if !handle.is_empty() => Self(handle.to_string()),
            _ => Self::fallback(user),
        }
    }

    #[must_use]
    pub fn fallback(user: UserId) -> Self {
        Self(format!("ID_{user}"))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DisplayName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum NameError {
    #[error("quiz name cannot be empty")]
    EmptyQuizName,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiz_name_keeps_padding() {
        let name = QuizName::new("Math ").unwrap();
        assert_eq!(name.as_str(), "Math ");
        assert_ne!(name, QuizName::new("Math").unwrap());
    }

    #[test]
    fn blank_quiz_name_is_rejected() {
        assert_eq!(QuizName::new("   "), Err(NameError::EmptyQuizName));
    }

    #[test]
    fn display_name_falls_back_to_user_id() {
        let user = UserId::new(77);
        assert_eq!(DisplayName::for_user(user, None).as_str(), "ID_77");
        assert_eq!(DisplayName::for_user(user, Some(" ")).as_str(), "ID_77");
        assert_eq!(DisplayName::for_user(user, Some("alice")).as_str(), "alice");
    }
}
