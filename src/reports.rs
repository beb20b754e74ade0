use crate::loader::{read_ratio, Ratio};
use crate::types::{columns, AvailabilityReport, Cell, DisplayTable, Table};
use crate::util::{percent_2dp, ratio_to_percent};
use log::warn;

/// Highlight rule for the availability report: compared on the rounded
/// percentages, and only when both values are present.
pub fn is_below_target(actual_pct: Option<f64>, target_pct: Option<f64>) -> bool {
    matches!((actual_pct, target_pct), (Some(a), Some(t)) if a < t)
}

pub fn format_availability_report(data: &Table) -> AvailabilityReport {
    let percent_cols: Vec<bool> = data
        .columns
        .iter()
        .map(|c| columns::AVAILABILITY_PERCENT.contains(&c.as_str()))
        .collect();
    let actual_idx = data.column_index(columns::ACTUAL_AVAILABILITY);
    let target_idx = data.column_index(columns::TARGET_AVAILABILITY);

    let mut rows = Vec::with_capacity(data.len());
    let mut below_target = Vec::with_capacity(data.len());
    for row in &data.rows {
        let mut rounded: Vec<Option<f64>> = vec![None; row.len()];
        let cells: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(idx, cell)| {
                if !percent_cols[idx] {
                    // Blank text columns (comment, solution ids, site) render as "".
                    return cell.to_string();
                }
                match read_ratio(cell) {
                    Ratio::Value(v) => {
                        let (pct, text) = ratio_to_percent(v);
                        rounded[idx] = Some(pct);
                        text
                    }
                    Ratio::Blank => String::new(),
                    Ratio::Malformed => cell.to_string(),
                }
            })
            .collect();
        let pick = |idx: Option<usize>| idx.and_then(|i| rounded[i]);
        below_target.push(is_below_target(pick(actual_idx), pick(target_idx)));
        rows.push(cells);
    }

    AvailabilityReport {
        table: DisplayTable {
            columns: data.columns.clone(),
            rows,
        },
        below_target,
    }
}

fn is_numeric_column(data: &Table, idx: usize) -> bool {
    let mut seen_number = false;
    for row in &data.rows {
        match &row[idx] {
            Cell::Number(_) => seen_number = true,
            Cell::Empty => {}
            _ => return false,
        }
    }
    seen_number
}

/// Trend table: numeric columns become two-decimal percentages, the rest
/// pass through as text.
pub fn format_adhoc_trend(data: &Table) -> DisplayTable {
    let numeric: Vec<bool> = (0..data.columns.len())
        .map(|idx| is_numeric_column(data, idx))
        .collect();
    let rows = data
        .rows
        .iter()
        .map(|row| {
            row.iter()
                .zip(&numeric)
                .map(|(cell, is_numeric)| match (cell, is_numeric) {
                    (Cell::Number(v), true) => percent_2dp(*v),
                    (other, _) => other.to_string(),
                })
                .collect()
        })
        .collect();
    DisplayTable {
        columns: data.columns.clone(),
        rows,
    }
}

/// The incident report columns, in report order. No rows are dropped.
pub fn select_incident_columns(data: &Table) -> DisplayTable {
    let indices: Vec<Option<usize>> = columns::INCIDENT_REPORT
        .iter()
        .map(|name| {
            let idx = data.column_index(name);
            if idx.is_none() {
                warn!("Incident sheet has no '{}' column; it will be blank", name);
            }
            idx
        })
        .collect();
    let rows = data
        .rows
        .iter()
        .map(|row| {
            indices
                .iter()
                .map(|idx| idx.map(|i| row[i].to_string()).unwrap_or_default())
                .collect()
        })
        .collect();
    DisplayTable {
        columns: columns::INCIDENT_REPORT.iter().map(|c| c.to_string()).collect(),
        rows,
    }
}
