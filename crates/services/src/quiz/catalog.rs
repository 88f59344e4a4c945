use std::sync::Arc;

use quiz_core::model::QuizName;
use storage::layout::ReservedTables;
use storage::{StorageError, TableStore};

/// Lists the quizzes a user can start.
#[derive(Clone)]
pub struct QuizCatalog {
    tables: Arc<dyn TableStore>,
    reserved: Arc<ReservedTables>,
}

impl QuizCatalog {
    #[must_use]
    pub fn new(tables: Arc<dyn TableStore>, reserved: Arc<ReservedTables>) -> Self {
        Self { tables, reserved }
    }

    /// Every non-reserved table, in store order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the tables cannot be listed.
    pub async fn list(&self) -> Result<Vec<QuizName>, StorageError> {
        let names = self.tables.list_tables().await?;
        Ok(names
            .into_iter()
            .filter(|name| !self.reserved.is_reserved(name))
            .filter_map(|name| QuizName::new(name).ok())
            .collect())
    }
}
