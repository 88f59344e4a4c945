use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::memory::InMemoryTableStore;
use crate::range::CellRange;

/// Rows of opaque string cells, top to bottom.
pub type Rows = Vec<Vec<String>>;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("unknown table: {0}")]
    UnknownTable(String),

    #[error("{rows}x{cols} values do not fit range {range}")]
    RangeOverflow {
        range: CellRange,
        rows: usize,
        cols: usize,
    },

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Spreadsheet-like store: named tables of string cells addressed by range.
///
/// Reads follow sheet semantics: trailing empty rows are dropped and every row
/// stops at its last non-empty cell. Empty strings clear cells on write.
#[async_trait]
pub trait TableStore: Send + Sync {
    /// Names of all tables, in display order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be reached.
    async fn list_tables(&self) -> Result<Vec<String>, StorageError>;

    /// Create `table` if it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be reached.
    async fn ensure_table(&self, table: &str) -> Result<(), StorageError>;

    /// Read the populated cells of `range`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::UnknownTable` for a missing table, or other storage errors.
    async fn read_range(&self, table: &str, range: CellRange) -> Result<Rows, StorageError>;

    /// Write `rows` starting at the top-left corner of `range`, as one batch.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::RangeOverflow` if `rows` do not fit, or other storage errors.
    async fn write_range(
        &self,
        table: &str,
        range: CellRange,
        rows: Rows,
    ) -> Result<(), StorageError>;

    /// Write `rows` below the last populated row of `range`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::RangeOverflow` if `rows` do not fit, or other storage errors.
    async fn append_rows(
        &self,
        table: &str,
        range: CellRange,
        rows: Rows,
    ) -> Result<(), StorageError>;

    /// Blank every cell of `range`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::UnknownTable` for a missing table, or other storage errors.
    async fn clear_range(&self, table: &str, range: CellRange) -> Result<(), StorageError>;
}

/// Table store behind a trait object for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub tables: Arc<dyn TableStore>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        Self::from_store(InMemoryTableStore::new())
    }

    #[must_use]
    pub fn from_store(store: impl TableStore + 'static) -> Self {
        Self {
            tables: Arc::new(store),
        }
    }
}
