use thiserror::Error;

use crate::model::QuizName;

/// Every question offers exactly this many choices, numbered from 1.
pub const OPTION_COUNT: usize = 3;

//
// ─── ERRORS ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("expected {} options, got {0}", OPTION_COUNT)]
    OptionCount(usize),

    #[error("correct option {0} is outside 1..={}", OPTION_COUNT)]
    CorrectOutOfRange(i64),

    #[error("question set for {0} has no questions")]
    EmptySet(QuizName),
}

//
// ─── QUESTION ─────────────────────────────────────────────────────────────────
//

/// A single multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    id: String,
    text: String,
    options: [String; OPTION_COUNT],
    correct_option: u8,
}

impl Question {
    /// Build a question, validating the option count and the correct option.
    ///
    /// `correct_option` is 1-based.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::OptionCount` unless exactly `OPTION_COUNT` options are given.
    /// Returns `QuestionError::CorrectOutOfRange` if `correct_option` does not index an option.
    pub fn new(
        id: impl Into<String>,
        text: impl Into<String>,
        options: Vec<String>,
        correct_option: i64,
    ) -> Result<Self, QuestionError> {
        let count = options.len();
        let options: [String; OPTION_COUNT] = options
            .try_into()
            .map_err(|_| QuestionError::OptionCount(count))?;

        let correct = u8::try_from(correct_option)
            .ok()
            .filter(|c| (1..=OPTION_COUNT).contains(&usize::from(*c)))
            .ok_or(QuestionError::CorrectOutOfRange(correct_option))?;

        Ok(Self {
            id: id.into(),
            text: text.into(),
            options,
            correct_option: correct,
        })
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn correct_option(&self) -> u8 {
        self.correct_option
    }

    /// Returns true if `choice` is a valid 1-based option number.
    #[must_use]
    pub fn accepts(&self, choice: u8) -> bool {
        (1..=self.options.len()).contains(&usize::from(choice))
    }

    #[must_use]
    pub fn is_correct(&self, choice: u8) -> bool {
        choice == self.correct_option
    }
}

//
// ─── QUESTION SET ─────────────────────────────────────────────────────────────
//

/// Ordered, immutable questions of one quiz.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionSet {
    quiz: QuizName,
    questions: Vec<Question>,
}

impl QuestionSet {
    /// # Errors
    ///
    /// Returns `QuestionError::EmptySet` if `questions` is empty.
    pub fn new(quiz: QuizName, questions: Vec<Question>) -> Result<Self, QuestionError> {
        if questions.is_empty() {
            return Err(QuestionError::EmptySet(quiz));
        }
        Ok(Self { quiz, questions })
    }

    #[must_use]
    pub fn quiz(&self) -> &QuizName {
        &self.quiz
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Question> {
        self.questions.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> Vec<String> {
        vec!["a".into(), "b".into(), "c".into()]
    }

    #[test]
    fn rejects_out_of_range_correct_option() {
        for bad in [0, 4, -1, 300] {
            let err = Question::new("q1", "Q?", options(), bad).unwrap_err();
            assert_eq!(err, QuestionError::CorrectOutOfRange(bad));
        }
    }

    #[test]
    fn rejects_wrong_option_count() {
        let err = Question::new("q1", "Q?", vec!["a".into(), "b".into()], 1).unwrap_err();
        assert_eq!(err, QuestionError::OptionCount(2));
    }

    #[test]
    fn correctness_is_exact_match() {
        let q = Question::new("q1", "Q?", options(), 2).unwrap();
        assert!(q.is_correct(2));
        assert!(!q.is_correct(1));
        assert!(q.accepts(3));
        assert!(!q.accepts(0));
        assert!(!q.accepts(4));
    }

    #[test]
    fn empty_set_is_rejected() {
        let quiz = QuizName::new("Empty").unwrap();
        let err = QuestionSet::new(quiz.clone(), Vec::new()).unwrap_err();
        assert_eq!(err, QuestionError::EmptySet(quiz));
    }
}
