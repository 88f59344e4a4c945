use std::collections::BTreeMap;

use crate::range::CellRange;
use crate::table::{Rows, StorageError};

/// Check that `rows` fit inside `range` when written at `first_row`.
pub(crate) fn check_fits(range: CellRange, first_row: u32, rows: &Rows) -> Result<(), StorageError> {
    let cols = rows.iter().map(Vec::len).max().unwrap_or(0);
    let overflow = || StorageError::RangeOverflow {
        range,
        rows: rows.len(),
        cols,
    };

    if cols > range.width() as usize {
        return Err(overflow());
    }
    if let Some(last) = range.last_row() {
        let needed = u32::try_from(rows.len()).map_err(|_| overflow())?;
        if needed > 0 && first_row.saturating_add(needed - 1) > last {
            return Err(overflow());
        }
    }
    Ok(())
}

/// Turn populated `(row, col, value)` cells into sheet-style rows of `range`.
///
/// Cells must arrive ordered by row, then column. Cells outside `range` and
/// empty values are ignored.
pub(crate) fn assemble<I>(range: CellRange, cells: I) -> Rows
where
    I: IntoIterator<Item = (u32, u32, String)>,
{
    let mut rows: Rows = Vec::new();
    for (row, col, value) in cells {
        if value.is_empty() || !range.contains(row, col) {
            continue;
        }
        let r = (row - range.first_row()) as usize;
        let c = (col - range.first_col()) as usize;
        if rows.len() <= r {
            rows.resize_with(r + 1, Vec::new);
        }
        let line = &mut rows[r];
        if line.len() <= c {
            line.resize(c + 1, String::new());
        }
        line[c] = value;
    }
    rows
}

/// One table held in memory, keyed by `(row, col)`.
#[derive(Debug, Clone, Default)]
pub(crate) struct Grid {
    cells: BTreeMap<(u32, u32), String>,
}

impl Grid {
    pub(crate) fn read(&self, range: CellRange) -> Rows {
        assemble(
            range,
            self.cells
                .range((range.first_row(), 0)..)
                .map(|(&(row, col), value)| (row, col, value.clone())),
        )
    }

    pub(crate) fn write(
        &mut self,
        range: CellRange,
        first_row: u32,
        rows: Rows,
    ) -> Result<(), StorageError> {
        check_fits(range, first_row, &rows)?;
        for (r, line) in (first_row..).zip(rows) {
            for (c, value) in (range.first_col()..).zip(line) {
                if value.is_empty() {
                    self.cells.remove(&(r, c));
                } else {
                    self.cells.insert((r, c), value);
                }
            }
        }
        Ok(())
    }

    /// First row of `range` below every populated cell in its columns.
    pub(crate) fn next_free_row(&self, range: CellRange) -> u32 {
        self.cells
            .keys()
            .filter(|&&(row, col)| range.contains(row, col))
            .map(|&(row, _)| row + 1)
            .max()
            .unwrap_or(range.first_row())
    }

    pub(crate) fn clear(&mut self, range: CellRange) {
        self.cells.retain(|&(row, col), _| !range.contains(row, col));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| (*c).to_string()).collect()
    }

    #[test]
    fn read_trims_trailing_blanks() {
        let mut grid = Grid::default();
        let range = CellRange::open(0, 1, 3);
        grid.write(
            range,
            1,
            vec![row(&["1", "a", "", ""]), row(&["", "", "", ""]), row(&["3", "", "c"])],
        )
        .unwrap();

        let rows = grid.read(range);
        assert_eq!(rows, vec![row(&["1", "a"]), Vec::new(), row(&["3", "", "c"])]);
    }

    #[test]
    fn read_only_sees_its_columns() {
        let mut grid = Grid::default();
        grid.write(CellRange::open(0, 1, 5), 1, vec![row(&["q1", "Q?", "a", "b", "c", "2"])])
            .unwrap();
        grid.write(CellRange::open(7, 1, 10), 1, vec![row(&["42", "bob", "1/1"])])
            .unwrap();

        assert_eq!(grid.read(CellRange::open(7, 1, 10)), vec![row(&["42", "bob", "1/1"])]);
        assert_eq!(grid.read(CellRange::bounded(1, 1, 1, 1)), vec![row(&["Q?"])]);
    }

    #[test]
    fn append_goes_below_the_last_populated_row() {
        let mut grid = Grid::default();
        let range = CellRange::open(7, 1, 10);
        assert_eq!(grid.next_free_row(range), 1);

        grid.write(range, 1, vec![row(&["1"]), row(&["2"])]).unwrap();
        assert_eq!(grid.next_free_row(range), 3);
        // other columns do not move the results region
        grid.write(CellRange::open(0, 1, 5), 1, vec![row(&["x"]); 5]).unwrap();
        assert_eq!(grid.next_free_row(range), 3);
    }

    #[test]
    fn write_rejects_values_wider_than_the_range() {
        let mut grid = Grid::default();
        let err = grid
            .write(CellRange::open(0, 1, 1), 1, vec![row(&["a", "b", "c"])])
            .unwrap_err();
        assert!(matches!(err, StorageError::RangeOverflow { cols: 3, .. }));
    }

    #[test]
    fn write_rejects_rows_past_a_bounded_range() {
        let mut grid = Grid::default();
        let range = CellRange::bounded(0, 1, 0, 2);
        let err = grid.write(range, 1, vec![row(&["a"]); 3]).unwrap_err();
        assert!(matches!(err, StorageError::RangeOverflow { rows: 3, .. }));
        grid.write(range, 1, vec![row(&["a"]); 2]).unwrap();
    }

    #[test]
    fn clear_blanks_only_the_range() {
        let mut grid = Grid::default();
        grid.write(CellRange::open(0, 0, 3), 0, vec![row(&["h1", "h2", "h3", "h4"]), row(&["1", "a", "5", "2"])])
            .unwrap();
        grid.clear(CellRange::open(0, 1, 3));

        assert_eq!(grid.read(CellRange::open(0, 0, 3)), vec![row(&["h1", "h2", "h3", "h4"])]);
    }
}
