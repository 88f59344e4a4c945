#![forbid(unsafe_code)]

pub mod cells;
mod grid;
pub mod layout;
pub mod memory;
pub mod range;
pub mod sqlite;
pub mod table;

pub use memory::{Fault, InMemoryTableStore};
pub use range::CellRange;
pub use sqlite::{SqliteInitError, SqliteRepository};
pub use table::{Rows, Storage, StorageError, TableStore};
