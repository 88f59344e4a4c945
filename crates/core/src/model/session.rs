use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::{Question, QuestionSet, QuizName};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AnswerRejected {
    #[error("choice {choice} is outside 1..={options}")]
    ChoiceOutOfRange { choice: u8, options: usize },

    #[error("answer targets question {given} but the session is at question {current}")]
    StaleQuestion { given: usize, current: usize },

    #[error("session already completed")]
    Completed,
}

/// Where a user stands in a quiz.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizState {
    NotStarted,
    InProgress { question_index: usize },
    Completed,
}

/// Effect of one accepted answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerStep {
    /// More questions remain.
    Next { correct: bool },
    /// That was the last question.
    Finished { correct: bool },
}

impl AnswerStep {
    #[must_use]
    pub fn correct(self) -> bool {
        match self {
            AnswerStep::Next { correct } | AnswerStep::Finished { correct } => correct,
        }
    }
}

/// One user's attempt at one quiz.
///
/// `question_index` and `score` only ever grow, and `score <= question_index`.
#[derive(Debug, Clone)]
pub struct Session {
    questions: Arc<QuestionSet>,
    question_index: usize,
    score: u32,
    started_at: DateTime<Utc>,
}

impl Session {
    #[must_use]
    pub fn start(questions: Arc<QuestionSet>, started_at: DateTime<Utc>) -> Self {
        Self {
            questions,
            question_index: 0,
            score: 0,
            started_at,
        }
    }

    #[must_use]
    pub fn quiz(&self) -> &QuizName {
        self.questions.quiz()
    }

    #[must_use]
    pub fn questions(&self) -> &QuestionSet {
        &self.questions
    }

    #[must_use]
    pub fn question_index(&self) -> usize {
        self.question_index
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.question_index)
    }

    #[must_use]
    pub fn state(&self) -> QuizState {
        if self.question_index >= self.questions.len() {
            QuizState::Completed
        } else {
            QuizState::InProgress {
                question_index: self.question_index,
            }
        }
    }

    /// Apply an answer to the current question.
    ///
    /// `question_index`, when given, must name the current question; answers to
    /// earlier questions (a re-pressed button) are rejected.
    ///
    /// # Errors
    ///
    /// Returns `AnswerRejected` without touching index or score when the answer
    /// is stale, out of range, or arrives after the last question.
    pub fn answer(
        &mut self,
        question_index: Option<usize>,
        choice: u8,
    ) -> Result<AnswerStep, AnswerRejected> {
        let current = self.question_index;
        let Some(question) = self.questions.get(current) else {
            return Err(AnswerRejected::Completed);
        };
        if let Some(given) = question_index {
            if given != current {
                return Err(AnswerRejected::StaleQuestion { given, current });
            }
        }
        if !question.accepts(choice) {
            return Err(AnswerRejected::ChoiceOutOfRange {
                choice,
                options: question.options().len(),
            });
        }

        let correct = question.is_correct(choice);
        if correct {
            self.score = self.score.saturating_add(1);
        }
        self.question_index += 1;

        if self.question_index == self.questions.len() {
            Ok(AnswerStep::Finished { correct })
        } else {
            Ok(AnswerStep::Next { correct })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    fn question_set(correct: &[i64]) -> Arc<QuestionSet> {
        let questions = correct
            .iter()
            .enumerate()
            .map(|(i, c)| {
                Question::new(
                    format!("q{i}"),
                    format!("Question {i}"),
                    vec!["one".into(), "two".into(), "three".into()],
                    *c,
                )
                .unwrap()
            })
            .collect();
        Arc::new(QuestionSet::new(QuizName::new("Sample").unwrap(), questions).unwrap())
    }

    #[test]
    fn counts_only_exact_matches() {
        let mut session = Session::start(question_set(&[2, 1]), fixed_now());

        assert_eq!(session.answer(None, 2), Ok(AnswerStep::Next { correct: true }));
        assert_eq!(
            session.answer(None, 3),
            Ok(AnswerStep::Finished { correct: false })
        );
        assert_eq!(session.score(), 1);
        assert_eq!(session.state(), QuizState::Completed);
    }

    #[test]
    fn out_of_range_choice_leaves_session_untouched() {
        let mut session = Session::start(question_set(&[1, 1]), fixed_now());

        for bad in [0, 4, 255] {
            let err = session.answer(None, bad).unwrap_err();
            assert!(matches!(err, AnswerRejected::ChoiceOutOfRange { .. }));
        }
        assert_eq!(session.question_index(), 0);
        assert_eq!(session.score(), 0);
    }

    #[test]
    fn stale_question_index_is_rejected() {
        let mut session = Session::start(question_set(&[1, 1, 1]), fixed_now());
        session.answer(Some(0), 1).unwrap();

        let err = session.answer(Some(0), 1).unwrap_err();
        assert_eq!(err, AnswerRejected::StaleQuestion { given: 0, current: 1 });
        assert_eq!(session.question_index(), 1);
        assert_eq!(session.score(), 1);
    }

    #[test]
    fn answers_after_completion_are_rejected() {
        let mut session = Session::start(question_set(&[3]), fixed_now());
        session.answer(None, 3).unwrap();
        assert_eq!(session.answer(None, 3), Err(AnswerRejected::Completed));
        assert_eq!(session.score(), 1);
    }

    #[test]
    fn score_never_exceeds_index() {
        let mut session = Session::start(question_set(&[1, 2, 3, 1, 2]), fixed_now());
        for choice in [1, 1, 3, 2, 2] {
            session.answer(None, choice).unwrap();
            assert!(session.score() as usize <= session.question_index());
        }
        assert_eq!(session.score(), 3);
    }
}
