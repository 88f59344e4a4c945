use async_trait::async_trait;
use sqlx::{Row, SqliteConnection};

use super::SqliteRepository;
use crate::grid::{assemble, check_fits};
use crate::range::CellRange;
use crate::table::{Rows, StorageError, TableStore};

fn conn_err<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

fn u32_from_i64(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

async fn require_sheet(conn: &mut SqliteConnection, table: &str) -> Result<(), StorageError> {
    let found = sqlx::query("SELECT 1 FROM sheets WHERE name = ?1")
        .bind(table)
        .fetch_optional(&mut *conn)
        .await
        .map_err(conn_err)?;
    if found.is_none() {
        return Err(StorageError::UnknownTable(table.to_string()));
    }
    Ok(())
}

/// Selects the cells of a range. Binds sheet, first col, last col, first row
/// and an optional last row, in that order.
const RANGE_FILTER: &str =
    "sheet = ?1 AND col_idx BETWEEN ?2 AND ?3 AND row_idx >= ?4 AND (?5 IS NULL OR row_idx <= ?5)";

async fn write_cells(
    conn: &mut SqliteConnection,
    table: &str,
    range: CellRange,
    first_row: u32,
    rows: Rows,
) -> Result<(), StorageError> {
    for (r, line) in (first_row..).zip(rows) {
        for (c, value) in (range.first_col()..).zip(line) {
            if value.is_empty() {
                sqlx::query("DELETE FROM cells WHERE sheet = ?1 AND row_idx = ?2 AND col_idx = ?3")
                    .bind(table)
                    .bind(i64::from(r))
                    .bind(i64::from(c))
                    .execute(&mut *conn)
                    .await
                    .map_err(conn_err)?;
            } else {
                sqlx::query(
                    r"
                    INSERT INTO cells (sheet, row_idx, col_idx, value)
                    VALUES (?1, ?2, ?3, ?4)
                    ON CONFLICT(sheet, row_idx, col_idx) DO UPDATE SET value = excluded.value
                    ",
                )
                .bind(table)
                .bind(i64::from(r))
                .bind(i64::from(c))
                .bind(value)
                .execute(&mut *conn)
                .await
                .map_err(conn_err)?;
            }
        }
    }
    Ok(())
}

#[async_trait]
impl TableStore for SqliteRepository {
    async fn list_tables(&self) -> Result<Vec<String>, StorageError> {
        let rows = sqlx::query("SELECT name FROM sheets ORDER BY position ASC, name ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(conn_err)?;
        rows.iter()
            .map(|row| row.try_get::<String, _>("name").map_err(conn_err))
            .collect()
    }

    async fn ensure_table(&self, table: &str) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO sheets (name, position)
            VALUES (?1, (SELECT COALESCE(MAX(position) + 1, 0) FROM sheets))
            ON CONFLICT(name) DO NOTHING
            ",
        )
        .bind(table)
        .execute(&self.pool)
        .await
        .map_err(conn_err)?;
        Ok(())
    }

    async fn read_range(&self, table: &str, range: CellRange) -> Result<Rows, StorageError> {
        let mut conn = self.pool.acquire().await.map_err(conn_err)?;
        require_sheet(&mut conn, table).await?;

        let sql = format!("SELECT row_idx, col_idx, value FROM cells WHERE {RANGE_FILTER} ORDER BY row_idx ASC, col_idx ASC");
        let rows = sqlx::query(&sql)
            .bind(table)
            .bind(i64::from(range.first_col()))
            .bind(i64::from(range.last_col()))
            .bind(i64::from(range.first_row()))
            .bind(range.last_row().map(i64::from))
            .fetch_all(&mut *conn)
            .await
            .map_err(conn_err)?;

        let mut cells = Vec::with_capacity(rows.len());
        for row in rows {
            cells.push((
                u32_from_i64("row", row.try_get("row_idx").map_err(conn_err)?)?,
                u32_from_i64("col", row.try_get("col_idx").map_err(conn_err)?)?,
                row.try_get::<String, _>("value").map_err(conn_err)?,
            ));
        }
        Ok(assemble(range, cells))
    }

    async fn write_range(
        &self,
        table: &str,
        range: CellRange,
        rows: Rows,
    ) -> Result<(), StorageError> {
        check_fits(range, range.first_row(), &rows)?;
        let mut tx = self.pool.begin().await.map_err(conn_err)?;
        require_sheet(&mut tx, table).await?;
        write_cells(&mut tx, table, range, range.first_row(), rows).await?;
        tx.commit().await.map_err(conn_err)
    }

    async fn append_rows(
        &self,
        table: &str,
        range: CellRange,
        rows: Rows,
    ) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await.map_err(conn_err)?;
        require_sheet(&mut tx, table).await?;

        let last: Option<i64> = sqlx::query(&format!(
            "SELECT MAX(row_idx) AS last FROM cells WHERE {RANGE_FILTER}"
        ))
        .bind(table)
        .bind(i64::from(range.first_col()))
        .bind(i64::from(range.last_col()))
        .bind(i64::from(range.first_row()))
        .bind(range.last_row().map(i64::from))
        .fetch_one(&mut *tx)
        .await
        .map_err(conn_err)?
        .try_get("last")
        .map_err(conn_err)?;

        let first_row = match last {
            Some(last) => u32_from_i64("row", last)?.saturating_add(1),
            None => range.first_row(),
        };
        check_fits(range, first_row, &rows)?;
        write_cells(&mut tx, table, range, first_row, rows).await?;
        tx.commit().await.map_err(conn_err)
    }

    async fn clear_range(&self, table: &str, range: CellRange) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await.map_err(conn_err)?;
        require_sheet(&mut tx, table).await?;

        sqlx::query(&format!("DELETE FROM cells WHERE {RANGE_FILTER}"))
            .bind(table)
            .bind(i64::from(range.first_col()))
            .bind(i64::from(range.last_col()))
            .bind(i64::from(range.first_row()))
            .bind(range.last_row().map(i64::from))
            .execute(&mut *tx)
            .await
            .map_err(conn_err)?;
        tx.commit().await.map_err(conn_err)
    }
}
