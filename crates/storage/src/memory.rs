use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use crate::grid::Grid;
use crate::range::CellRange;
use crate::table::{Rows, StorageError, TableStore};

/// Injected failure for a single table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// Reads fail; writes succeed.
    Read,
    /// Writes, appends and clears fail; reads succeed.
    Write,
    /// Everything touching the table fails.
    All,
}

impl Fault {
    fn blocks_read(self) -> bool {
        matches!(self, Fault::Read | Fault::All)
    }

    fn blocks_write(self) -> bool {
        matches!(self, Fault::Write | Fault::All)
    }
}

#[derive(Debug, Default)]
struct Workbook {
    order: Vec<String>,
    tables: HashMap<String, Grid>,
    faults: HashMap<String, Fault>,
    listing_fails: bool,
}

impl Workbook {
    fn grid(&self, table: &str, for_write: bool) -> Result<&Grid, StorageError> {
        self.check_fault(table, for_write)?;
        self.tables
            .get(table)
            .ok_or_else(|| StorageError::UnknownTable(table.to_string()))
    }

    fn grid_mut(&mut self, table: &str) -> Result<&mut Grid, StorageError> {
        self.check_fault(table, true)?;
        self.tables
            .get_mut(table)
            .ok_or_else(|| StorageError::UnknownTable(table.to_string()))
    }

    fn check_fault(&self, table: &str, for_write: bool) -> Result<(), StorageError> {
        match self.faults.get(table) {
            Some(fault) if for_write && fault.blocks_write() => Err(StorageError::Unavailable(
                format!("write to {table} failed (injected)"),
            )),
            Some(fault) if !for_write && fault.blocks_read() => Err(StorageError::Unavailable(
                format!("read of {table} failed (injected)"),
            )),
            _ => Ok(()),
        }
    }
}

/// Simple in-memory table store for testing and prototyping.
///
/// Clones share the same tables. Failures can be injected per table with
/// [`InMemoryTableStore::set_fault`].
#[derive(Clone, Default)]
pub struct InMemoryTableStore {
    book: Arc<Mutex<Workbook>>,
}

impl InMemoryTableStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Workbook>, StorageError> {
        self.book
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))
    }

    /// Make operations on `table` fail until [`Self::clear_fault`] is called.
    pub fn set_fault(&self, table: &str, fault: Fault) {
        if let Ok(mut book) = self.lock() {
            book.faults.insert(table.to_string(), fault);
        }
    }

    pub fn clear_fault(&self, table: &str) {
        if let Ok(mut book) = self.lock() {
            book.faults.remove(table);
        }
    }

    /// Make `list_tables` fail (or succeed again).
    pub fn set_listing_fails(&self, fails: bool) {
        if let Ok(mut book) = self.lock() {
            book.listing_fails = fails;
        }
    }
}

#[async_trait]
impl TableStore for InMemoryTableStore {
    async fn list_tables(&self) -> Result<Vec<String>, StorageError> {
        let book = self.lock()?;
        if book.listing_fails {
            return Err(StorageError::Unavailable("listing failed (injected)".into()));
        }
        Ok(book.order.clone())
    }

    async fn ensure_table(&self, table: &str) -> Result<(), StorageError> {
        let mut book = self.lock()?;
        if !book.tables.contains_key(table) {
            book.tables.insert(table.to_string(), Grid::default());
            book.order.push(table.to_string());
        }
        Ok(())
    }

    async fn read_range(&self, table: &str, range: CellRange) -> Result<Rows, StorageError> {
        let book = self.lock()?;
        Ok(book.grid(table, false)?.read(range))
    }

    async fn write_range(
        &self,
        table: &str,
        range: CellRange,
        rows: Rows,
    ) -> Result<(), StorageError> {
        let mut book = self.lock()?;
        book.grid_mut(table)?.write(range, range.first_row(), rows)
    }

    async fn append_rows(
        &self,
        table: &str,
        range: CellRange,
        rows: Rows,
    ) -> Result<(), StorageError> {
        let mut book = self.lock()?;
        let grid = book.grid_mut(table)?;
        let first_row = grid.next_free_row(range);
        grid.write(range, first_row, rows)
    }

    async fn clear_range(&self, table: &str, range: CellRange) -> Result<(), StorageError> {
        let mut book = self.lock()?;
        book.grid_mut(table)?.clear(range);
        Ok(())
    }
}
