//! SQLite storage implementation

use std::path::Path;

use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};

use super::schema;
use crate::record::{value_as_integer, Filter, Row, RowSet, StockFields};
use crate::schema::{Column, SCHEMA_VERSION, TABLE_NAME};
use crate::{Error, Result};

/// SQLite-backed storage for stock records.
///
/// Owns the only handle to the database file.
pub struct StockStore {
    conn: Connection,
}

impl StockStore {
    /// Open a database file (creates if doesn't exist)
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .map_err(|e| Error::StorageUnavailable(format!("{}: {}", path.display(), e)))?;
        tracing::info!("Opened stock database at {}", path.display());
        Self::with_connection(conn)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| Error::StorageUnavailable(e.to_string()))?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        let store = Self { conn };
        store
            .initialize_schema()
            .map_err(|e| Error::StorageUnavailable(e.to_string()))?;
        Ok(store)
    }

    /// Create the table on first use; recreate it when the stamped version differs
    fn initialize_schema(&self) -> rusqlite::Result<()> {
        let version: i64 = self.conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;

        if version != 0 && version != SCHEMA_VERSION {
            tracing::warn!(
                "Schema version {} does not match {}, recreating {}",
                version,
                SCHEMA_VERSION,
                TABLE_NAME
            );
            self.conn.execute(schema::DROP_STOCKS_TABLE, [])?;
        }

        for stmt in schema::all_schema_statements() {
            self.conn.execute(stmt, [])?;
        }
        self.conn.execute_batch(&schema::set_version_statement())?;
        Ok(())
    }

    /// Stamped schema version
    pub fn schema_version(&self) -> Result<i64> {
        Ok(self.conn.query_row("PRAGMA user_version", [], |row| row.get(0))?)
    }

    // ========== Primitive Operations ==========

    /// Select rows projected to `columns` (all columns when empty).
    ///
    /// `filter` and `order` are passed through to SQL verbatim. Without an
    /// order, rows come back in rowid order.
    pub fn query(&self, columns: &[Column], filter: Option<&Filter>, order: Option<&str>) -> Result<RowSet> {
        let columns: Vec<Column> = if columns.is_empty() {
            Column::all().to_vec()
        } else {
            columns.to_vec()
        };

        let projection = columns.iter().map(Column::as_str).collect::<Vec<_>>().join(", ");
        let mut sql = format!("SELECT {} FROM {}", projection, TABLE_NAME);
        let args = push_filter(&mut sql, filter);
        if let Some(order) = order.filter(|o| !o.trim().is_empty()) {
            sql.push_str(" ORDER BY ");
            sql.push_str(order);
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let width = columns.len();
        let rows = stmt
            .query_map(params_from_iter(args.iter()), |row| {
                (0..width).map(|i| row.get::<_, Value>(i)).collect::<rusqlite::Result<Vec<_>>>()
            })?
            .map(|values| values.map(|v| Row::new(columns.clone(), v)))
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(RowSet { columns, rows })
    }

    /// Insert one row and return its new `_id`
    pub fn insert(&self, fields: &StockFields) -> Result<i64> {
        let sql = if fields.is_empty() {
            format!("INSERT INTO {} DEFAULT VALUES", TABLE_NAME)
        } else {
            let names = fields.iter().map(|(c, _)| c.as_str()).collect::<Vec<_>>().join(", ");
            let placeholders = vec!["?"; fields.len()].join(", ");
            format!("INSERT INTO {} ({}) VALUES ({})", TABLE_NAME, names, placeholders)
        };

        self.conn
            .execute(&sql, params_from_iter(fields.iter().map(|(_, v)| v)))
            .map_err(write_failed)?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Apply `fields` to every row matching `filter`; returns rows affected
    pub fn update(&self, fields: &StockFields, filter: Option<&Filter>) -> Result<usize> {
        if fields.is_empty() {
            return Ok(0);
        }

        let assignments = fields
            .iter()
            .map(|(c, _)| format!("{} = ?", c.as_str()))
            .collect::<Vec<_>>()
            .join(", ");
        let mut sql = format!("UPDATE {} SET {}", TABLE_NAME, assignments);
        let filter_args = push_filter(&mut sql, filter);

        let args = fields.iter().map(|(_, v)| v).chain(filter_args.iter());
        self.conn.execute(&sql, params_from_iter(args)).map_err(write_failed)
    }

    /// Remove every row matching `filter`; no filter removes all rows
    pub fn delete(&self, filter: Option<&Filter>) -> Result<usize> {
        let mut sql = format!("DELETE FROM {}", TABLE_NAME);
        let args = push_filter(&mut sql, filter);
        self.conn
            .execute(&sql, params_from_iter(args.iter()))
            .map_err(write_failed)
    }

    // ========== Aggregates ==========

    /// Count rows matching `filter`
    pub fn count(&self, filter: Option<&Filter>) -> Result<usize> {
        let mut sql = format!("SELECT COUNT(*) FROM {}", TABLE_NAME);
        let args = push_filter(&mut sql, filter);
        let count: i64 = self
            .conn
            .query_row(&sql, params_from_iter(args.iter()), |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Get database statistics.
    ///
    /// Totals saturate at `i64::MAX` instead of overflowing.
    pub fn stats(&self) -> Result<StoreStats> {
        let sql = format!("SELECT quantity, price FROM {}", TABLE_NAME);
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query([])?;

        let mut stats = StoreStats::default();
        while let Some(row) = rows.next()? {
            let quantity = value_as_integer(&row.get::<_, Value>(0)?).unwrap_or(0);
            let price = value_as_integer(&row.get::<_, Value>(1)?).unwrap_or(0);
            stats.records += 1;
            stats.units = stats.units.saturating_add(quantity);
            stats.value = stats.value.saturating_add(quantity.saturating_mul(price));
        }
        Ok(stats)
    }
}

/// Append ` WHERE <clause>` when a non-empty filter is given; returns its args
fn push_filter<'f>(sql: &mut String, filter: Option<&'f Filter>) -> &'f [Value] {
    match filter {
        Some(f) if !f.clause.trim().is_empty() => {
            sql.push_str(" WHERE ");
            sql.push_str(&f.clause);
            &f.args
        }
        _ => &[],
    }
}

fn write_failed(e: rusqlite::Error) -> Error {
    Error::StorageWriteFailed(e.to_string())
}

/// Database statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct StoreStats {
    pub records: usize,
    pub units: i64,
    pub value: i64,
}

impl std::fmt::Display for StoreStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Database Statistics:")?;
        writeln!(f, "  Records: {}", self.records)?;
        writeln!(f, "  Units in stock: {}", self.units)?;
        writeln!(f, "  Stock value: {}", self.value)
    }
}
