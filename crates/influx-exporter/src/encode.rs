// SPDX-License-Identifier: Apache-2.0 OR MIT

//! InfluxDB Line Protocol encoder.
//!
//! Produces the write-request body for one snapshot:
//!
//! ```text
//! measurement field1=val1,field2=val2 timestamp_seconds
//! ```
//!
//! No tags are emitted and `precision=s` is always assumed. Measurement
//! names, field names and string values are embedded verbatim with no
//! escaping; deployments rely on this exact wire output.

use crate::table::{Cell, Column, ColumnType, Snapshot, TableSnapshot};

/// Encode every table of a snapshot into a single request body.
///
/// `fallback_secs` is the timestamp used for rows without a timestamp
/// cell, captured once at export start. An empty result means every row
/// was skipped and no request should be made.
pub fn encode_snapshot(snapshot: &Snapshot, fallback_secs: i64) -> String {
    let mut body = String::new();
    for table in snapshot.tables() {
        encode_table(table, fallback_secs, &mut body);
    }
    body
}

/// Append the line-protocol representation of one table to `out`.
///
/// Rows in which every non-timestamp field resolves to empty or absent
/// produce no line at all.
pub fn encode_table(table: &TableSnapshot, fallback_secs: i64, out: &mut String) {
    for row in table.rows() {
        let mut fields: Vec<String> = Vec::new();
        for (index, column) in table.columns_without_timestamp() {
            if let Some(field) = encode_field(column, row.cell(index)) {
                fields.push(field);
            }
        }
        if fields.is_empty() {
            continue;
        }

        let timestamp = table
            .timestamp_column()
            .and_then(|ts| row.cell(ts))
            .and_then(Cell::resolved_timestamp_seconds)
            .unwrap_or(fallback_secs);

        out.push_str(table.name());
        out.push(' ');
        out.push_str(&fields.join(","));
        out.push(' ');
        out.push_str(&timestamp.to_string());
        out.push('\n');
    }
}

/// Encode a single `name=value` field, or `None` when the field is dropped.
///
/// String columns are double-quoted and keep their value verbatim, even
/// when empty. Any other type drops the field when the trimmed value is
/// empty, so `field=` is never emitted.
fn encode_field(column: &Column, cell: Option<&Cell>) -> Option<String> {
    let value = cell?.resolved()?;
    if column.column_type() == ColumnType::String {
        return Some(format!("{}=\"{}\"", column.name(), value));
    }
    if value.trim().is_empty() {
        return None;
    }
    Some(format!("{}={}", column.name(), value))
}
