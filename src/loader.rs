use crate::error::{ReportError, Result};
use crate::types::{
    columns, sheets, AvailabilityRecord, Cell, CustomerInfo, IncidentRecord, SheetSet, Table,
    Workbook,
};
use crate::util::{parse_datetime_safe, parse_f64_safe};
use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};
use log::{debug, info, warn};
use std::io::Cursor;

/// Parse an uploaded workbook into one `Table` per sheet.
///
/// `None` means nothing was uploaded. Bytes that no spreadsheet reader
/// accepts fail with `UnreadableFile` instead of producing empty tables.
pub fn load(file: Option<&[u8]>) -> Result<Workbook> {
    let bytes = file.ok_or(ReportError::MissingInput)?;
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;

    let mut tables = Workbook::new();
    for name in workbook.sheet_names() {
        let range = workbook.worksheet_range(&name)?;
        let table = range_to_table(&range);
        debug!(
            "Sheet '{}': {} columns, {} rows",
            name,
            table.columns.len(),
            table.len()
        );
        tables.insert(name, table);
    }
    info!("Workbook loaded ({} sheets)", tables.len());
    Ok(tables)
}

fn range_to_table(range: &Range<Data>) -> Table {
    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Table::default();
    };
    let columns: Vec<String> = header
        .iter()
        .enumerate()
        .map(|(idx, cell)| match convert_cell(cell) {
            Cell::Empty => format!("Unnamed: {idx}"),
            other => other.to_string().trim().to_string(),
        })
        .collect();

    let data = rows
        .map(|row| {
            let mut cells: Vec<Cell> = row.iter().map(convert_cell).collect();
            cells.resize(columns.len(), Cell::Empty);
            cells
        })
        .filter(|cells| cells.iter().any(|c| !c.is_empty()))
        .collect();
    Table::new(columns, data)
}

fn convert_cell(data: &Data) -> Cell {
    match data {
        Data::Empty | Data::Error(_) => Cell::Empty,
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Float(f) => Cell::Number(*f),
        Data::Bool(b) => Cell::Bool(*b),
        Data::String(s) if s.trim().is_empty() => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(value) => Cell::DateTime(value),
            None => Cell::Number(dt.as_f64()),
        },
        Data::DateTimeIso(s) => match parse_datetime_safe(Some(s)) {
            Some(value) => Cell::DateTime(value),
            None => Cell::Text(s.clone()),
        },
        other => Cell::Text(other.to_string()),
    }
}

/// Fail with the list of every required sheet the workbook lacks.
pub fn validate_required_sheets(tables: &Workbook) -> Result<()> {
    let missing: Vec<String> = sheets::REQUIRED
        .iter()
        .filter(|name| !tables.contains_key(**name))
        .map(|name| name.to_string())
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ReportError::MissingSheets(missing))
    }
}

/// Pull the four dashboard sheets out of the workbook.
///
/// The ad-hoc sheet is optional: when absent it becomes an empty table.
pub fn extract(mut tables: Workbook) -> Result<SheetSet> {
    validate_required_sheets(&tables)?;
    let mut take = |name: &str| tables.remove(name).unwrap_or_default();
    let customer_info = take(sheets::CUSTOMER_INFO);
    let incidents = take(sheets::INCIDENTS);
    let availability = take(sheets::AVAILABILITY);
    if incidents.is_empty() {
        info!("Sheet '{}' has no rows; incident counts will be zero", sheets::INCIDENTS);
    }
    let adhoc = match tables.remove(sheets::ADHOC) {
        Some(table) => table,
        None => {
            warn!(
                "Sheet '{}' not found; the trend table will be empty",
                sheets::ADHOC
            );
            Table::default()
        }
    };
    Ok(SheetSet {
        customer_info,
        incidents,
        availability,
        adhoc,
    })
}

/// Session labels from the customer sheet. The first row carries the
/// period and customer name; every row may name a service manager.
pub fn parse_customer_info(table: &Table) -> Result<CustomerInfo> {
    let first = table
        .rows
        .first()
        .ok_or_else(|| ReportError::EmptySheet(sheets::CUSTOMER_INFO.to_string()))?;
    let service_managers = table
        .rows
        .iter()
        .filter_map(|row| table.cell(row, columns::SERVICE_MANAGER).as_text())
        .collect();
    Ok(CustomerInfo {
        period: table.cell(first, columns::DATE).to_string(),
        customer_name: table.cell(first, columns::CUSTOMER_NAME).to_string(),
        service_managers,
    })
}

pub fn parse_incidents(table: &Table) -> Vec<IncidentRecord> {
    table
        .rows
        .iter()
        .map(|row| IncidentRecord {
            site_name: table.cell(row, columns::SITE_NAME).as_text(),
            root_cause: table.cell(row, columns::ROOT_CAUSE).as_text(),
            status: table.cell(row, columns::STATUS).as_text(),
            time_logged: match table.cell(row, columns::TIME_LOGGED) {
                Cell::DateTime(dt) => Some(*dt),
                Cell::Text(s) => parse_datetime_safe(Some(s)),
                _ => None,
            },
        })
        .collect()
}

/// A ratio cell: numeric value, blank, or something that is not a number.
pub(crate) enum Ratio {
    Value(f64),
    Blank,
    Malformed,
}

pub(crate) fn read_ratio(cell: &Cell) -> Ratio {
    match cell {
        Cell::Number(n) => Ratio::Value(*n),
        Cell::Empty => Ratio::Blank,
        Cell::Text(s) => parse_f64_safe(Some(s)).map_or(Ratio::Malformed, Ratio::Value),
        Cell::Bool(_) | Cell::DateTime(_) => Ratio::Malformed,
    }
}

/// Typed availability rows plus the number of ratio cells that held
/// something other than a number. Malformed cells read as null.
pub fn parse_availability(table: &Table) -> (Vec<AvailabilityRecord>, usize) {
    let mut malformed = 0usize;
    let mut ratio = |cell: &Cell| match read_ratio(cell) {
        Ratio::Value(v) => Some(v),
        Ratio::Blank => None,
        Ratio::Malformed => {
            malformed += 1;
            None
        }
    };
    let records = table
        .rows
        .iter()
        .map(|row| AvailabilityRecord {
            site: table.cell(row, columns::SITE).as_text(),
            actual: ratio(table.cell(row, columns::ACTUAL_AVAILABILITY)),
            target: ratio(table.cell(row, columns::TARGET_AVAILABILITY)),
        })
        .collect();
    if malformed > 0 {
        warn!(
            "{} availability ratio cell(s) are not numbers and were treated as blank",
            malformed
        );
    }
    (records, malformed)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn text(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    pub(crate) fn table(columns: &[&str], rows: Vec<Vec<Cell>>) -> Table {
        Table::new(columns.iter().map(|c| c.to_string()).collect(), rows)
    }

    fn workbook(names: &[&str]) -> Workbook {
        names
            .iter()
            .map(|n| (n.to_string(), Table::default()))
            .collect()
    }

    #[test]
    fn range_becomes_table_with_typed_cells() {
        use calamine::{CellErrorType, ExcelDateTime, ExcelDateTimeType};
        use chrono::NaiveDate;

        let mut range: Range<Data> = Range::new((0, 0), (4, 3));
        range.set_value((0, 0), Data::String("Site".to_string()));
        range.set_value((0, 2), Data::String(" Actual Site Availability ".to_string()));
        range.set_value((0, 3), Data::String(columns::TIME_LOGGED.to_string()));
        range.set_value((1, 0), Data::String("A".to_string()));
        range.set_value((1, 1), Data::Error(CellErrorType::NA));
        range.set_value((1, 2), Data::Float(0.955));
        range.set_value(
            (1, 3),
            Data::DateTime(ExcelDateTime::new(45047.5, ExcelDateTimeType::DateTime, false)),
        );
        range.set_value((2, 0), Data::String("   ".to_string()));
        range.set_value((3, 0), Data::Int(7));
        range.set_value((3, 1), Data::Bool(true));
        range.set_value((3, 3), Data::DateTimeIso("2023-05-02T08:30:00".to_string()));
        range.set_value((4, 3), Data::DateTimeIso("soon".to_string()));

        let t = range_to_table(&range);
        assert_eq!(
            t.columns,
            vec!["Site", "Unnamed: 1", "Actual Site Availability", "Time Logged"]
        );
        // Row 2 holds only blanks and is dropped.
        assert_eq!(t.len(), 3);

        let logged = NaiveDate::from_ymd_opt(2023, 5, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        assert_eq!(
            t.rows[0],
            vec![text("A"), Cell::Empty, Cell::Number(0.955), Cell::DateTime(logged)]
        );
        let iso = NaiveDate::from_ymd_opt(2023, 5, 2)
            .unwrap()
            .and_hms_opt(8, 30, 0)
            .unwrap();
        assert_eq!(
            t.rows[1],
            vec![Cell::Number(7.0), Cell::Bool(true), Cell::Empty, Cell::DateTime(iso)]
        );
        assert_eq!(
            t.rows[2],
            vec![Cell::Empty, Cell::Empty, Cell::Empty, text("soon")]
        );

        let (records, malformed) = parse_availability(&t);
        assert_eq!(malformed, 0);
        assert_eq!(records[0].actual, Some(0.955));
    }

    #[test]
    fn empty_range_becomes_empty_table() {
        let range: Range<Data> = Range::empty();
        assert_eq!(range_to_table(&range), Table::default());
    }

    #[test]
    fn load_without_file_is_missing_input() {
        assert!(matches!(load(None), Err(ReportError::MissingInput)));
    }

    #[test]
    fn load_rejects_bytes_that_are_not_a_workbook() {
        let result = load(Some(b"Site,Actual\nA,0.9\n".as_slice()));
        assert!(matches!(result, Err(ReportError::UnreadableFile(_))));
    }

    #[test]
    fn validate_lists_all_missing_required_sheets() {
        let tables = workbook(&[sheets::CUSTOMER_INFO, sheets::ADHOC]);
        match validate_required_sheets(&tables) {
            Err(ReportError::MissingSheets(missing)) => {
                assert_eq!(missing, vec!["Incident Data", "Availability Data"]);
            }
            other => panic!("expected missing sheets, got {other:?}"),
        }
    }

    #[test]
    fn validate_does_not_require_adhoc() {
        let tables = workbook(&sheets::REQUIRED);
        assert!(validate_required_sheets(&tables).is_ok());
    }

    #[test]
    fn extract_defaults_missing_adhoc_to_empty() {
        let mut tables = workbook(&sheets::REQUIRED);
        tables.insert(
            sheets::INCIDENTS.to_string(),
            table(&[columns::SITE_NAME], vec![vec![text("A")]]),
        );
        let set = extract(tables).unwrap();
        assert_eq!(set.incidents.len(), 1);
        assert!(set.adhoc.is_empty());
        assert!(set.adhoc.columns.is_empty());
    }

    #[test]
    fn extract_fails_on_missing_required_sheet() {
        let tables = workbook(&[sheets::CUSTOMER_INFO, sheets::INCIDENTS]);
        assert!(matches!(
            extract(tables),
            Err(ReportError::MissingSheets(_))
        ));
    }

    #[test]
    fn customer_info_uses_first_row_labels() {
        let t = table(
            &[columns::DATE, columns::CUSTOMER_NAME, columns::SERVICE_MANAGER],
            vec![
                vec![text("May 2023"), text("Acme"), text("Jo")],
                vec![text("May 2023"), text("Acme"), text("Sam")],
                vec![Cell::Empty, Cell::Empty, Cell::Empty],
            ],
        );
        let info = parse_customer_info(&t).unwrap();
        assert_eq!(info.period, "May 2023");
        assert_eq!(info.customer_name, "Acme");
        assert_eq!(info.service_managers, vec!["Jo", "Sam"]);
    }

    #[test]
    fn customer_info_requires_a_row() {
        let t = table(&[columns::DATE], vec![]);
        assert!(matches!(
            parse_customer_info(&t),
            Err(ReportError::EmptySheet(_))
        ));
    }

    #[test]
    fn availability_counts_malformed_ratios() {
        let t = table(
            &[
                columns::SITE,
                columns::ACTUAL_AVAILABILITY,
                columns::TARGET_AVAILABILITY,
            ],
            vec![
                vec![text("A"), Cell::Number(0.9), text("0.95")],
                vec![text("B"), text("down"), Cell::Number(0.95)],
                vec![text("C"), Cell::Empty, Cell::Number(0.95)],
            ],
        );
        let (records, malformed) = parse_availability(&t);
        assert_eq!(malformed, 1);
        assert_eq!(records[0].target, Some(0.95));
        assert_eq!(records[1].actual, None);
        assert_eq!(records[2].actual, None);
    }

    #[test]
    fn incidents_read_missing_columns_as_null() {
        let t = table(
            &[columns::SITE_NAME, columns::TIME_LOGGED],
            vec![vec![text("A"), text("2023-05-01 10:00:00")]],
        );
        let records = parse_incidents(&t);
        assert_eq!(records[0].site_name.as_deref(), Some("A"));
        assert!(records[0].root_cause.is_none());
        assert!(records[0].status.is_none());
        assert!(records[0].time_logged.is_some());
    }
}
