// ⬇️ Export - pass-through CSV formatting for tables and result sets
// No contract beyond column order: tables export in schema order, insight
// results in SELECT order.

use crate::db::Database;
use crate::insights::ResultSet;
use crate::schema::{Row, Table};
use crate::store;
use anyhow::{Context, Result};
use serde_json::Value;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Render a JSON cell the way it should appear in a CSV field.
fn field(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// Write `rows` to `writer` with the given header order. Cells missing from
/// a row come out empty.
pub fn write_csv<W: Write>(writer: W, columns: &[String], rows: &[Row]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(columns)?;
    for row in rows {
        let record: Vec<String> = columns
            .iter()
            .map(|c| row.get(c).map(field).unwrap_or_default())
            .collect();
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Render a full table as a CSV string (schema column order).
pub fn table_to_csv(db: &Database, table: Table) -> Result<String> {
    let rows = store::list(db, table, &[])?;
    let columns: Vec<String> = table.column_names().iter().map(|c| c.to_string()).collect();
    let mut buf = Vec::new();
    write_csv(&mut buf, &columns, &rows)?;
    Ok(String::from_utf8(buf)?)
}

/// Render an insight result set as a CSV string (SELECT column order).
pub fn result_set_to_csv(result: &ResultSet) -> Result<String> {
    let mut buf = Vec::new();
    write_csv(&mut buf, &result.columns, &result.rows)?;
    Ok(String::from_utf8(buf)?)
}

/// Dump a full table to a CSV file, returning the row count.
pub fn export_table(db: &Database, table: Table, path: &Path) -> Result<usize> {
    let rows = store::list(db, table, &[])?;
    let columns: Vec<String> = table.column_names().iter().map(|c| c.to_string()).collect();
    let file = File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    write_csv(file, &columns, &rows)?;
    Ok(rows.len())
}
