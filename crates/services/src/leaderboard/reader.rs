use std::sync::Arc;

use quiz_core::model::{LeaderboardEntry, UserId};
use storage::cells::leaderboard_entry_from_row;
use storage::layout::LEADERBOARD_REGION;
use storage::TableStore;

use super::aggregator::LeaderboardAggregator;
use crate::error::LeaderboardError;

/// Reads the published leaderboard. Nothing is cached.
///
/// Reads never wait for a rebuild. A lookup that lands between the clear and
/// the write of a publish sees an empty or partial table.
#[derive(Clone)]
pub struct LeaderboardReader {
    tables: Arc<dyn TableStore>,
    table: String,
}

impl LeaderboardReader {
    /// Reader over the table `aggregator` publishes to.
    #[must_use]
    pub fn for_aggregator(tables: Arc<dyn TableStore>, aggregator: &LeaderboardAggregator) -> Self {
        Self {
            tables,
            table: aggregator.reserved().leaderboard().to_string(),
        }
    }

    /// `user`'s published row, or an all-zero entry when they are not ranked.
    ///
    /// # Errors
    ///
    /// Returns `LeaderboardError::Read` if the leaderboard cannot be read.
    pub async fn lookup(&self, user: UserId) -> Result<LeaderboardEntry, LeaderboardError> {
        let rows = self.read().await?;
        Ok(rows
            .iter()
            .filter_map(|row| leaderboard_entry_from_row(row).ok())
            .find(|entry| entry.user_id == user)
            .unwrap_or_else(|| LeaderboardEntry::empty(user)))
    }

    /// The whole published ranking, best first.
    ///
    /// # Errors
    ///
    /// Returns `LeaderboardError::Read` if the leaderboard cannot be read.
    pub async fn snapshot(&self) -> Result<Vec<LeaderboardEntry>, LeaderboardError> {
        let rows = self.read().await?;
        Ok(rows
            .iter()
            .filter_map(|row| leaderboard_entry_from_row(row).ok())
            .collect())
    }

    async fn read(&self) -> Result<Vec<Vec<String>>, LeaderboardError> {
        self.tables
            .read_range(&self.table, LEADERBOARD_REGION)
            .await
            .map_err(LeaderboardError::Read)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storage::layout::ReservedTables;
    use storage::InMemoryTableStore;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| (*c).to_string()).collect()
    }

    async fn reader_over(rows: Vec<Vec<String>>) -> LeaderboardReader {
        let store = InMemoryTableStore::new();
        store.ensure_table("Leaderboard").await.unwrap();
        store.write_range("Leaderboard", LEADERBOARD_REGION, rows).await.unwrap();
        let tables: Arc<dyn TableStore> = Arc::new(store);
        let aggregator =
            LeaderboardAggregator::new(Arc::clone(&tables), Arc::new(ReservedTables::default()));
        LeaderboardReader::for_aggregator(tables, &aggregator)
    }

    #[tokio::test]
    async fn lookup_scans_for_the_user() {
        let reader = reader_over(vec![
            row(&["1", "ann", "7", "2"]),
            row(&["2", "bob"]),
            row(&["3", "cat", "oops", "1"]),
        ])
        .await;

        let ann = reader.lookup(UserId::new(1)).await.unwrap();
        assert_eq!((ann.total_score, ann.quizzes_passed), (7, 2));

        // short rows are ignored, bad numbers read as 0
        assert_eq!(reader.lookup(UserId::new(2)).await.unwrap(), LeaderboardEntry::empty(UserId::new(2)));
        let cat = reader.lookup(UserId::new(3)).await.unwrap();
        assert_eq!((cat.display_name.as_str(), cat.total_score, cat.quizzes_passed), ("cat", 0, 1));

        assert_eq!(reader.snapshot().await.unwrap().len(), 2);
    }
}
