use std::sync::Arc;

use quiz_core::model::{QuizName, ScoreRecord, ScoreText, UpsertOutcome, UserId};
use storage::cells::{result_row_best, result_row_owner, score_record_to_row};
use storage::layout::RESULTS_REGION;
use storage::{StorageError, TableStore};

use crate::error::LedgerError;
use crate::Clock;

/// Best score per user, kept in the results region of each quiz table.
#[derive(Clone)]
pub struct ScoreLedger {
    clock: Clock,
    tables: Arc<dyn TableStore>,
}

impl ScoreLedger {
    #[must_use]
    pub fn new(clock: Clock, tables: Arc<dyn TableStore>) -> Self {
        Self { clock, tables }
    }

    /// Record `result` for `user` if it beats their stored best.
    ///
    /// The first row owned by `user` is the one compared and overwritten. When
    /// the results cannot be read the row is appended anyway.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::Persist` if the write fails.
    pub async fn upsert(
        &self,
        quiz: &QuizName,
        user: UserId,
        display_name: &str,
        result: ScoreText,
    ) -> Result<UpsertOutcome, LedgerError> {
        let table = quiz.as_str();
        let existing = match self.tables.read_range(table, RESULTS_REGION).await {
            Ok(rows) => rows
                .iter()
                .position(|row| result_row_owner(row) == Some(user))
                .map(|index| (index, result_row_best(&rows[index]))),
            Err(err) => {
                log::warn!("[LEDGER] reading results of {quiz} failed, appending: {err}");
                None
            }
        };

        let record = ScoreRecord {
            user_id: user,
            display_name: display_name.to_string(),
            result,
            recorded_at: self.clock.timestamp(),
        };
        let persist = |source: StorageError| LedgerError::Persist {
            quiz: quiz.clone(),
            source,
        };

        match existing {
            Some((_, best)) if result.score() <= best => {
                log::debug!("[LEDGER] {quiz}: user {user} kept best {best}");
                Ok(UpsertOutcome::Unchanged { best })
            }
            Some((index, previous)) => {
                let offset = u32::try_from(index).map_err(|_| {
                    persist(StorageError::Serialization(format!("result row {index} out of range")))
                })?;
                let range = RESULTS_REGION.row(RESULTS_REGION.first_row() + offset);
                self.tables
                    .write_range(table, range, vec![score_record_to_row(&record)])
                    .await
                    .map_err(persist)?;
                log::info!("[LEDGER] {quiz}: user {user} improved {previous} -> {result}");
                Ok(UpsertOutcome::Improved { previous })
            }
            None => {
                self.tables
                    .append_rows(table, RESULTS_REGION, vec![score_record_to_row(&record)])
                    .await
                    .map_err(persist)?;
                log::info!("[LEDGER] {quiz}: user {user} recorded {result}");
                Ok(UpsertOutcome::Inserted)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use quiz_core::time::fixed_now;
    use storage::{Fault, InMemoryTableStore};

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| (*c).to_string()).collect()
    }

    async fn setup() -> (InMemoryTableStore, QuizName) {
        let store = InMemoryTableStore::new();
        store.ensure_table("Geography").await.unwrap();
        (store, QuizName::new("Geography").unwrap())
    }

    async fn results(store: &InMemoryTableStore) -> Vec<Vec<String>> {
        store.read_range("Geography", RESULTS_REGION).await.unwrap()
    }

    #[tokio::test]
    async fn best_score_never_decreases() {
        let (store, quiz) = setup().await;
        let user = UserId::new(42);
        let first = ScoreLedger::new(Clock::fixed(fixed_now()), Arc::new(store.clone()));
        let later = ScoreLedger::new(
            Clock::fixed(fixed_now() + Duration::hours(1)),
            Arc::new(store.clone()),
        );

        let outcome = first.upsert(&quiz, user, "ann", ScoreText::new(2, 3)).await.unwrap();
        assert_eq!(outcome, UpsertOutcome::Inserted);

        let outcome = later.upsert(&quiz, user, "ann_renamed", ScoreText::new(2, 3)).await.unwrap();
        assert_eq!(outcome, UpsertOutcome::Unchanged { best: 2 });
        let outcome = later.upsert(&quiz, user, "ann", ScoreText::new(1, 3)).await.unwrap();
        assert_eq!(outcome, UpsertOutcome::Unchanged { best: 2 });
        // equal scores leave name and timestamp alone
        assert_eq!(results(&store).await, vec![row(&["42", "ann", "2/3", "2023-11-14 22:13:20"])]);

        let outcome = later.upsert(&quiz, user, "ann", ScoreText::new(3, 3)).await.unwrap();
        assert_eq!(outcome, UpsertOutcome::Improved { previous: 2 });
        assert_eq!(results(&store).await, vec![row(&["42", "ann", "3/3", "2023-11-14 23:13:20"])]);
    }

    #[tokio::test]
    async fn improvement_overwrites_the_users_row_in_place() {
        let (store, quiz) = setup().await;
        store
            .write_range(
                "Geography",
                RESULTS_REGION,
                vec![
                    row(&["1", "ann", "1/3", "t"]),
                    row(&["2", "bob", "garbage", "t"]),
                    row(&["3", "cat", "2/3", "t"]),
                ],
            )
            .await
            .unwrap();
        let ledger = ScoreLedger::new(Clock::fixed(fixed_now()), Arc::new(store.clone()));

        // an unreadable best counts as 0
        let outcome = ledger.upsert(&quiz, UserId::new(2), "bob", ScoreText::new(1, 3)).await.unwrap();
        assert_eq!(outcome, UpsertOutcome::Improved { previous: 0 });

        let rows = results(&store).await;
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1], row(&["2", "bob", "1/3", "2023-11-14 22:13:20"]));
        assert_eq!(rows[2], row(&["3", "cat", "2/3", "t"]));
    }

    #[tokio::test]
    async fn unreadable_results_still_append() {
        let (store, quiz) = setup().await;
        store.set_fault("Geography", Fault::Read);
        let ledger = ScoreLedger::new(Clock::fixed(fixed_now()), Arc::new(store.clone()));

        let outcome = ledger.upsert(&quiz, UserId::new(9), "zed", ScoreText::new(1, 2)).await.unwrap();
        assert_eq!(outcome, UpsertOutcome::Inserted);

        store.clear_fault("Geography");
        assert_eq!(results(&store).await.len(), 1);
    }

    #[tokio::test]
    async fn write_failures_are_reported() {
        let (store, quiz) = setup().await;
        store.set_fault("Geography", Fault::Write);
        let ledger = ScoreLedger::new(Clock::fixed(fixed_now()), Arc::new(store));

        let err = ledger
            .upsert(&quiz, UserId::new(9), "zed", ScoreText::new(1, 2))
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::Persist { .. }));
    }
}
