use std::sync::Arc;

use quiz_core::model::{QuestionSet, QuizName};
use storage::cells::question_from_row;
use storage::layout::{QUESTION_REGION, ReservedTables};
use storage::TableStore;

use crate::error::QuizLoadError;

/// Loads question sets from quiz tables.
#[derive(Clone)]
pub struct QuestionBank {
    tables: Arc<dyn TableStore>,
    reserved: Arc<ReservedTables>,
}

impl QuestionBank {
    #[must_use]
    pub fn new(tables: Arc<dyn TableStore>, reserved: Arc<ReservedTables>) -> Self {
        Self { tables, reserved }
    }

    /// Read the question region of `quiz`.
    ///
    /// Rows that fail validation are dropped and logged.
    ///
    /// # Errors
    ///
    /// Returns `QuizLoadError` if the table is reserved or unreadable, or if no
    /// valid question remains.
    pub async fn load(&self, quiz: &QuizName) -> Result<QuestionSet, QuizLoadError> {
        if self.reserved.is_reserved(quiz.as_str()) {
            return Err(QuizLoadError::Reserved(quiz.clone()));
        }

        let rows = self
            .tables
            .read_range(quiz.as_str(), QUESTION_REGION)
            .await
            .map_err(|source| QuizLoadError::Unreadable {
                quiz: quiz.clone(),
                source,
            })?;
        if rows.is_empty() {
            return Err(QuizLoadError::Empty(quiz.clone()));
        }

        let mut questions = Vec::with_capacity(rows.len());
        let mut rejected = 0;
        for (offset, row) in rows.iter().enumerate() {
            match question_from_row(row) {
                Ok(question) => questions.push(question),
                Err(err) => {
                    rejected += 1;
                    log::warn!(
                        "[QUIZ] {quiz}: skipping question row {}: {err}",
                        offset + QUESTION_REGION.first_row() as usize + 1
                    );
                }
            }
        }

        QuestionSet::new(quiz.clone(), questions).map_err(|_| QuizLoadError::NoValidQuestions {
            quiz: quiz.clone(),
            rejected,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storage::InMemoryTableStore;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| (*c).to_string()).collect()
    }

    async fn bank_with(rows: Vec<Vec<String>>) -> QuestionBank {
        let store = InMemoryTableStore::new();
        store.ensure_table("Geography").await.unwrap();
        if !rows.is_empty() {
            store.write_range("Geography", QUESTION_REGION, rows).await.unwrap();
        }
        QuestionBank::new(Arc::new(store), Arc::new(ReservedTables::default()))
    }

    fn quiz(name: &str) -> QuizName {
        QuizName::new(name).unwrap()
    }

    #[tokio::test]
    async fn invalid_rows_are_dropped() {
        let bank = bank_with(vec![
            row(&["g1", "Capital of France?", "Rome", "Paris", "Oslo", "2"]),
            row(&["g2", "Broken", "a", "b", "c", "9"]),
            row(&["g3", "Too short", "a"]),
            row(&["g4", "Largest ocean?", "Atlantic", "Indian", "Pacific", "3"]),
        ])
        .await;

        let set = bank.load(&quiz("Geography")).await.unwrap();
        let ids: Vec<_> = set.iter().map(|q| q.id().to_string()).collect();
        assert_eq!(ids, ["g1", "g4"]);
    }

    #[tokio::test]
    async fn empty_and_all_invalid_tables_fail() {
        let bank = bank_with(Vec::new()).await;
        assert!(matches!(
            bank.load(&quiz("Geography")).await,
            Err(QuizLoadError::Empty(_))
        ));

        let bank = bank_with(vec![row(&["g1", "Q?", "a", "b", "c", "x"])]).await;
        assert!(matches!(
            bank.load(&quiz("Geography")).await,
            Err(QuizLoadError::NoValidQuestions { rejected: 1, .. })
        ));
    }

    #[tokio::test]
    async fn reserved_and_missing_tables_fail() {
        let bank = bank_with(Vec::new()).await;
        assert!(matches!(
            bank.load(&quiz("Leaderboard")).await,
            Err(QuizLoadError::Reserved(_))
        ));
        assert!(matches!(
            bank.load(&quiz("History")).await,
            Err(QuizLoadError::Unreadable { .. })
        ));
    }
}
