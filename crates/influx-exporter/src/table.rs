// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Read-only tabular snapshot model consumed by the encoder.
//!
//! Cell values arrive already resolved upstream; this crate never computes
//! or mutates them. A snapshot is enqueued by a producer, consumed exactly
//! once by the worker and then discarded.

use chrono::{DateTime, Utc};

/// Column type tag. Only `String` changes serialization: its values are
/// double-quoted, every other type is emitted raw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    String,
    Number,
    Boolean,
    Timestamp,
}

/// A named, typed column of a table snapshot.
#[derive(Debug, Clone)]
pub struct Column {
    name: String,
    column_type: ColumnType,
}

impl Column {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn column_type(&self) -> ColumnType {
        self.column_type
    }
}

/// One resolved cell: the upstream-computed string value and, for
/// timestamp columns, the value as seconds since epoch.
#[derive(Debug, Clone, Default)]
pub struct Cell {
    value: Option<String>,
    timestamp_seconds: Option<i64>,
}

impl Cell {
    pub fn value(value: impl Into<String>) -> Self {
        Self {
            value: Some(value.into()),
            timestamp_seconds: None,
        }
    }

    pub fn timestamp(seconds: i64) -> Self {
        Self {
            value: Some(seconds.to_string()),
            timestamp_seconds: Some(seconds),
        }
    }

    /// The resolved value, `None` when unset upstream.
    pub fn resolved(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// The resolved value as seconds since epoch, for timestamp cells.
    pub fn resolved_timestamp_seconds(&self) -> Option<i64> {
        self.timestamp_seconds
    }
}

/// One row: cells parallel to the table's column list. A missing entry
/// means the cell was never produced for that column.
#[derive(Debug, Clone, Default)]
pub struct TableRow {
    cells: Vec<Option<Cell>>,
}

impl TableRow {
    pub fn new(cells: Vec<Option<Cell>>) -> Self {
        Self { cells }
    }

    pub fn cell(&self, column_index: usize) -> Option<&Cell> {
        self.cells.get(column_index).and_then(|c| c.as_ref())
    }
}

/// A named table with ordered columns and rows.
#[derive(Debug, Clone)]
pub struct TableSnapshot {
    name: String,
    columns: Vec<Column>,
    timestamp_column: Option<usize>,
    rows: Vec<TableRow>,
}

impl TableSnapshot {
    pub fn new(
        name: impl Into<String>,
        columns: Vec<Column>,
        timestamp_column: Option<usize>,
        rows: Vec<TableRow>,
    ) -> Self {
        Self {
            name: name.into(),
            columns,
            timestamp_column,
            rows,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rows(&self) -> &[TableRow] {
        &self.rows
    }

    /// Index of the designated timestamp column, if the table has one.
    pub fn timestamp_column(&self) -> Option<usize> {
        self.timestamp_column
    }

    /// Ordered `(index, column)` pairs excluding the timestamp column.
    pub fn columns_without_timestamp(&self) -> impl Iterator<Item = (usize, &Column)> {
        self.columns
            .iter()
            .enumerate()
            .filter(|(i, _)| Some(*i) != self.timestamp_column)
    }
}

/// One unit of exportable data: a timestamp plus the tables captured at
/// that moment. Snapshots without tables are rejected at enqueue time.
#[derive(Debug, Clone)]
pub struct Snapshot {
    timestamp: DateTime<Utc>,
    tables: Vec<TableSnapshot>,
}

impl Snapshot {
    pub fn new(timestamp: DateTime<Utc>, tables: Vec<TableSnapshot>) -> Self {
        Self { timestamp, tables }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn tables(&self) -> &[TableSnapshot] {
        &self.tables
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_columns_without_timestamp_skips_designated_column() {
        let table = TableSnapshot::new(
            "solar",
            vec![
                Column::new("power", ColumnType::Number),
                Column::new("time", ColumnType::Timestamp),
                Column::new("state", ColumnType::String),
            ],
            Some(1),
            vec![],
        );

        let names: Vec<&str> = table
            .columns_without_timestamp()
            .map(|(_, c)| c.name())
            .collect();
        assert_eq!(names, vec!["power", "state"]);
    }

    #[test]
    fn test_row_cell_lookup_out_of_range() {
        let row = TableRow::new(vec![Some(Cell::value("1")), None]);
        assert!(row.cell(0).is_some());
        assert!(row.cell(1).is_none());
        assert!(row.cell(7).is_none());
    }

    #[test]
    fn test_timestamp_cell_resolves_both_ways() {
        let cell = Cell::timestamp(1_700_000_000);
        assert_eq!(cell.resolved(), Some("1700000000"));
        assert_eq!(cell.resolved_timestamp_seconds(), Some(1_700_000_000));

        let plain = Cell::value("42.5");
        assert_eq!(plain.resolved(), Some("42.5"));
        assert!(plain.resolved_timestamp_seconds().is_none());
    }
}
