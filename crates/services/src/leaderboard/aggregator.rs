use std::sync::Arc;

use quiz_core::model::{LeaderboardEntry, LeaderboardTally, QuizName};
use storage::cells::{leaderboard_entry_to_row, result_from_row};
use storage::layout::{LEADERBOARD_REGION, RESULTS_REGION, ReservedTables};
use storage::TableStore;
use tokio::sync::Mutex;

use crate::error::LeaderboardError;

/// What one rebuild saw.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RebuildStats {
    pub tables_scanned: usize,
    pub tables_skipped: usize,
    pub rows_skipped: usize,
    pub entries: usize,
}

/// Recomputes the leaderboard from scratch and publishes it.
///
/// Rebuilds are serialized on a gate, so two publishes never interleave.
/// Readers do not take it.
pub struct LeaderboardAggregator {
    tables: Arc<dyn TableStore>,
    reserved: Arc<ReservedTables>,
    gate: Arc<Mutex<()>>,
}

impl LeaderboardAggregator {
    #[must_use]
    pub fn new(tables: Arc<dyn TableStore>, reserved: Arc<ReservedTables>) -> Self {
        Self {
            tables,
            reserved,
            gate: Arc::new(Mutex::new(())),
        }
    }

    #[must_use]
    pub fn reserved(&self) -> &ReservedTables {
        &self.reserved
    }

    /// Scan every quiz, rank users and replace the published leaderboard.
    ///
    /// Unreadable quiz tables and malformed rows are skipped.
    ///
    /// # Errors
    ///
    /// Returns `LeaderboardError` if the tables cannot be listed or the new
    /// leaderboard cannot be published.
    pub async fn rebuild(&self) -> Result<RebuildStats, LeaderboardError> {
        let _gate = self.gate.lock().await;

        let names = self
            .tables
            .list_tables()
            .await
            .map_err(LeaderboardError::Listing)?;

        let mut stats = RebuildStats::default();
        let mut tally = LeaderboardTally::new();
        for name in names {
            if self.reserved.is_reserved(&name) {
                continue;
            }
            let quiz = match QuizName::new(name) {
                Ok(quiz) => quiz,
                Err(err) => {
                    log::debug!("[LEADERBOARD] skipping unnamed table: {err}");
                    stats.tables_skipped += 1;
                    continue;
                }
            };
            let rows = match self.tables.read_range(quiz.as_str(), RESULTS_REGION).await {
                Ok(rows) => rows,
                Err(err) => {
                    log::warn!("[LEADERBOARD] skipping {quiz}: {err}");
                    stats.tables_skipped += 1;
                    continue;
                }
            };
            stats.tables_scanned += 1;

            for row in &rows {
                match result_from_row(row) {
                    Ok(result) => tally.record(
                        &quiz,
                        result.user_id,
                        &result.display_name,
                        result.result.score(),
                    ),
                    Err(err) => {
                        log::debug!("[LEADERBOARD] {quiz}: skipping result row: {err}");
                        stats.rows_skipped += 1;
                    }
                }
            }
        }

        let entries = tally.finish();
        stats.entries = entries.len();
        self.publish(&entries).await?;
        Ok(stats)
    }

    async fn publish(&self, entries: &[LeaderboardEntry]) -> Result<(), LeaderboardError> {
        let table = self.reserved.leaderboard();
        self.tables
            .ensure_table(table)
            .await
            .map_err(LeaderboardError::Publish)?;
        self.tables
            .clear_range(table, LEADERBOARD_REGION)
            .await
            .map_err(LeaderboardError::Publish)?;
        if entries.is_empty() {
            return Ok(());
        }
        let rows = entries.iter().map(leaderboard_entry_to_row).collect();
        self.tables
            .write_range(table, LEADERBOARD_REGION, rows)
            .await
            .map_err(LeaderboardError::Publish)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storage::{Fault, InMemoryTableStore};

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| (*c).to_string()).collect()
    }

    async fn quiz_with_results(store: &InMemoryTableStore, quiz: &str, results: &[&[&str]]) {
        store.ensure_table(quiz).await.unwrap();
        let rows = results.iter().map(|r| row(r)).collect();
        store.write_range(quiz, RESULTS_REGION, rows).await.unwrap();
    }

    fn aggregator(store: &InMemoryTableStore) -> LeaderboardAggregator {
        LeaderboardAggregator::new(Arc::new(store.clone()), Arc::new(ReservedTables::default()))
    }

    async fn published(store: &InMemoryTableStore) -> Vec<Vec<String>> {
        store.read_range("Leaderboard", LEADERBOARD_REGION).await.unwrap()
    }

    #[tokio::test]
    async fn sums_best_scores_across_quizzes() {
        let store = InMemoryTableStore::new();
        quiz_with_results(&store, "Geography", &[&["1", "ann", "2/3"], &["2", "bob", "3/3"], &["1", "ann", "3/3"]]).await;
        quiz_with_results(&store, "Science", &[&["1", "ann_new", "1/2"]]).await;

        let stats = aggregator(&store).rebuild().await.unwrap();
        assert_eq!(stats.tables_scanned, 2);
        assert_eq!(stats.entries, 2);
        assert_eq!(
            published(&store).await,
            vec![row(&["1", "ann_new", "4", "2"]), row(&["2", "bob", "3", "1"])]
        );
    }

    #[tokio::test]
    async fn malformed_rows_do_not_change_the_result() {
        let clean = InMemoryTableStore::new();
        quiz_with_results(&clean, "Geography", &[&["1", "ann", "2/3"], &["2", "bob", "1/3"]]).await;
        aggregator(&clean).rebuild().await.unwrap();

        let noisy = InMemoryTableStore::new();
        quiz_with_results(
            &noisy,
            "Geography",
            &[&["1", "ann", "2/3"], &["3", "cat", "abc"], &["x", "dan", "3/3"], &["4", "eve"], &["2", "bob", "1/3"]],
        )
        .await;
        let stats = aggregator(&noisy).rebuild().await.unwrap();

        assert_eq!(stats.rows_skipped, 3);
        assert_eq!(published(&clean).await, published(&noisy).await);
    }

    #[tokio::test]
    async fn rebuilding_twice_publishes_the_same_rows() {
        let store = InMemoryTableStore::new();
        quiz_with_results(&store, "Geography", &[&["1", "ann", "2/3"], &["2", "bob", "2/3"]]).await;
        let aggregator = aggregator(&store);

        aggregator.rebuild().await.unwrap();
        let first = published(&store).await;
        aggregator.rebuild().await.unwrap();
        assert_eq!(first, published(&store).await);
    }

    #[tokio::test]
    async fn reserved_and_unreadable_tables_are_skipped() {
        let store = InMemoryTableStore::new();
        quiz_with_results(&store, "Geography", &[&["1", "ann", "1/1"]]).await;
        quiz_with_results(&store, "Broken", &[&["2", "bob", "5/5"]]).await;
        quiz_with_results(&store, "Archived results", &[&["3", "cat", "9/9"]]).await;
        store.set_fault("Broken", Fault::Read);

        let stats = aggregator(&store).rebuild().await.unwrap();
        assert_eq!(stats.tables_scanned, 1);
        assert_eq!(stats.tables_skipped, 1);
        assert_eq!(published(&store).await, vec![row(&["1", "ann", "1", "1"])]);
    }

    #[tokio::test]
    async fn padded_table_names_are_read_as_listed() {
        let store = InMemoryTableStore::new();
        quiz_with_results(&store, "Math ", &[&["1", "ann", "2/2"]]).await;

        let stats = aggregator(&store).rebuild().await.unwrap();
        assert_eq!((stats.tables_scanned, stats.tables_skipped), (1, 0));
        assert_eq!(published(&store).await, vec![row(&["1", "ann", "2", "1"])]);
    }

    #[tokio::test]
    async fn blank_table_names_count_as_skipped() {
        let store = InMemoryTableStore::new();
        quiz_with_results(&store, "Geography", &[&["1", "ann", "1/1"]]).await;
        quiz_with_results(&store, "  ", &[&["2", "bob", "5/5"]]).await;

        let stats = aggregator(&store).rebuild().await.unwrap();
        assert_eq!(stats.tables_scanned, 1);
        assert_eq!(stats.tables_skipped, 1);
        assert_eq!(published(&store).await, vec![row(&["1", "ann", "1", "1"])]);
    }

    #[tokio::test]
    async fn stale_rows_are_cleared_when_nobody_is_left() {
        let store = InMemoryTableStore::new();
        store.ensure_table("Leaderboard").await.unwrap();
        store
            .write_range("Leaderboard", LEADERBOARD_REGION, vec![row(&["9", "old", "5", "1"])])
            .await
            .unwrap();

        let stats = aggregator(&store).rebuild().await.unwrap();
        assert_eq!(stats.entries, 0);
        assert!(published(&store).await.is_empty());
    }

    #[tokio::test]
    async fn publish_failures_are_returned() {
        let store = InMemoryTableStore::new();
        quiz_with_results(&store, "Geography", &[&["1", "ann", "1/1"]]).await;
        store.ensure_table("Leaderboard").await.unwrap();
        store.set_fault("Leaderboard", Fault::Write);

        let err = aggregator(&store).rebuild().await.unwrap_err();
        assert!(matches!(err, LeaderboardError::Publish(_)));

        store.set_listing_fails(true);
        let err = aggregator(&store).rebuild().await.unwrap_err();
        assert!(matches!(err, LeaderboardError::Listing(_)));
    }
}
