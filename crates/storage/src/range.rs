use std::fmt;

/// A rectangular block of cells, 0-based, inclusive on both ends.
///
/// `last_row: None` means the range runs down to the last populated row,
/// like `H2:K` in A1 notation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellRange {
    first_col: u32,
    first_row: u32,
    last_col: u32,
    last_row: Option<u32>,
}

impl CellRange {
    /// Columns `first_col..=last_col`, rows from `first_row` down.
    #[must_use]
    pub const fn open(first_col: u32, first_row: u32, last_col: u32) -> Self {
        assert!(last_col >= first_col, "range columns are reversed");
        Self {
            first_col,
            first_row,
            last_col,
            last_row: None,
        }
    }

    #[must_use]
    pub const fn bounded(first_col: u32, first_row: u32, last_col: u32, last_row: u32) -> Self {
        assert!(last_col >= first_col, "range columns are reversed");
        assert!(last_row >= first_row, "range rows are reversed");
        Self {
            first_col,
            first_row,
            last_col,
            last_row: Some(last_row),
        }
    }

    /// The single row `row` across the same columns.
    #[must_use]
    pub const fn row(self, row: u32) -> Self {
        Self {
            first_col: self.first_col,
            first_row: row,
            last_col: self.last_col,
            last_row: Some(row),
        }
    }

    #[must_use]
    pub fn first_col(&self) -> u32 {
        self.first_col
    }

    #[must_use]
    pub fn first_row(&self) -> u32 {
        self.first_row
    }

    #[must_use]
    pub fn last_col(&self) -> u32 {
        self.last_col
    }

    #[must_use]
    pub fn last_row(&self) -> Option<u32> {
        self.last_row
    }

    /// Number of columns.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.last_col - self.first_col + 1
    }

    /// Number of rows, if bounded.
    #[must_use]
    pub fn height(&self) -> Option<u32> {
        self.last_row.map(|last| last - self.first_row + 1)
    }

    #[must_use]
    pub fn contains(&self, row: u32, col: u32) -> bool {
        col >= self.first_col
            && col <= self.last_col
            && row >= self.first_row
            && self.last_row.is_none_or(|last| row <= last)
    }
}

/// Column letters for a 0-based index: 0 → `A`, 25 → `Z`, 26 → `AA`.
#[must_use]
pub fn column_letters(col: u32) -> String {
    let mut n = col + 1;
    let mut out = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        out.push(char::from(b'A' + u8::try_from(rem).unwrap_or(0)));
        n = (n - 1) / 26;
    }
    out.iter().rev().collect()
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}:{}",
            column_letters(self.first_col),
            self.first_row + 1,
            column_letters(self.last_col)
        )?;
        if let Some(last) = self.last_row {
            write!(f, "{}", last + 1)?;
        }
        Ok(())
    }
}
