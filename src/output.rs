use serde::Serialize;
use std::path::Path;
use tabled::{builder::Builder, settings::Style, Table, Tabled};

use crate::error::Result;
use crate::types::DisplayTable;

/// Marker appended to a highlighted cell on the console.
pub const HIGHLIGHT_MARKER: &str = " ▼";

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write a display table; `flags` appends a named boolean column.
pub fn write_display_csv(
    path: &Path,
    table: &DisplayTable,
    flags: Option<(&str, &[bool])>,
) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    let mut header: Vec<&str> = table.columns.iter().map(String::as_str).collect();
    if let Some((name, _)) = flags {
        header.push(name);
    }
    wtr.write_record(&header)?;
    for (idx, row) in table.rows.iter().enumerate() {
        let mut record: Vec<&str> = row.iter().map(String::as_str).collect();
        if let Some((_, values)) = flags {
            record.push(if values.get(idx).copied().unwrap_or(false) {
                "true"
            } else {
                "false"
            });
        }
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

pub fn print_table_rows<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().take(max_rows).cloned().collect();
    if slice.is_empty() {
        println!("(no rows)\n");
        return;
    }
    let table_str = Table::new(slice).with(Style::markdown()).to_string();
    println!("{}\n", table_str);
}

/// Markdown rendering of a display table with a 1-based row index.
///
/// `highlight` names a column and the rows whose cell in it gets the marker.
pub fn render_display_table(
    table: &DisplayTable,
    max_rows: usize,
    highlight: Option<(&str, &[bool])>,
) -> String {
    if table.rows.is_empty() {
        return "(no rows)".to_string();
    }
    let marked_col = highlight
        .and_then(|(name, _)| table.columns.iter().position(|c| c == name));

    let mut builder = Builder::default();
    builder.push_record(std::iter::once("#".to_string()).chain(table.columns.iter().cloned()));
    for (idx, row) in table.rows.iter().take(max_rows).enumerate() {
        let flagged = highlight
            .map(|(_, flags)| flags.get(idx).copied().unwrap_or(false))
            .unwrap_or(false);
        let cells = row.iter().enumerate().map(|(col, cell)| {
            if flagged && Some(col) == marked_col {
                format!("{cell}{HIGHLIGHT_MARKER}")
            } else {
                cell.clone()
            }
        });
        builder.push_record(std::iter::once((idx + 1).to_string()).chain(cells));
    }
    let mut rendered = builder.build();
    rendered.with(Style::markdown());
    let mut out = rendered.to_string();
    if table.rows.len() > max_rows {
        out.push_str(&format!(
            "\n({} of {} rows shown)",
            max_rows,
            table.rows.len()
        ));
    }
    out
}
