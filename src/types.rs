use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use tabled::Tabled;

use crate::util::{format_datetime, format_plain_number};

/// A single worksheet cell, typed the way the workbook stored it.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    /// Text content, `None` for empty cells.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Cell::Empty => None,
            other => Some(other.to_string()),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Text(s) => f.write_str(s),
            Cell::Number(n) => f.write_str(&format_plain_number(*n)),
            Cell::Bool(b) => f.write_str(if *b { "True" } else { "False" }),
            Cell::DateTime(dt) => f.write_str(&format_datetime(dt)),
        }
    }
}

static EMPTY_CELL: Cell = Cell::Empty;

/// One worksheet: a header row plus data rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        Self { columns, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Cell at `row` in column `name`; missing columns and short rows read as empty.
    pub fn cell<'a>(&'a self, row: &'a [Cell], name: &str) -> &'a Cell {
        self.column_index(name)
            .and_then(|idx| row.get(idx))
            .unwrap_or(&EMPTY_CELL)
    }
}

/// Every sheet of a workbook keyed by sheet name.
pub type Workbook = HashMap<String, Table>;

/// The four sheets the dashboard works from.
#[derive(Debug, Clone)]
pub struct SheetSet {
    pub customer_info: Table,
    pub incidents: Table,
    pub availability: Table,
    pub adhoc: Table,
}

#[derive(Debug, Clone, Serialize)]
pub struct CustomerInfo {
    pub period: String,
    pub customer_name: String,
    pub service_managers: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct IncidentRecord {
    pub site_name: Option<String>,
    pub root_cause: Option<String>,
    pub status: Option<String>,
    pub time_logged: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Default)]
pub struct AvailabilityRecord {
    pub site: Option<String>,
    pub actual: Option<f64>,
    pub target: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AvailabilityMetrics {
    pub total_sites: usize,
    pub missed_count: usize,
    pub above_target_count: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IncidentMetrics {
    pub total: usize,
    pub customer_caused: usize,
    pub vendor_caused: usize,
    pub closed: usize,
    pub open: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Tabled)]
pub struct ProblemSiteRow {
    #[serde(rename = "Rank")]
    #[tabled(rename = "#")]
    pub rank: usize,
    #[serde(rename = "Site Name")]
    #[tabled(rename = "Site Name")]
    pub site_name: String,
    #[serde(rename = "Number of Incidents")]
    #[tabled(rename = "Number of Incidents")]
    pub incidents: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Tabled)]
pub struct RootCauseCount {
    #[serde(rename = "Root Cause")]
    #[tabled(rename = "Root Cause")]
    pub root_cause: String,
    #[serde(rename = "Count")]
    #[tabled(rename = "Count")]
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Tabled)]
pub struct TimeLoggedBucket {
    #[serde(rename = "Day")]
    #[tabled(rename = "Day")]
    pub day: String,
    #[serde(rename = "Root Cause")]
    #[tabled(rename = "Root Cause")]
    pub root_cause: String,
    #[serde(rename = "Count")]
    #[tabled(rename = "Count")]
    pub count: usize,
}

/// A display-ready table: every cell already rendered to text, rows indexed from 1.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DisplayTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AvailabilityReport {
    pub table: DisplayTable,
    /// One entry per row: actual availability strictly below the SLA target.
    pub below_target: Vec<bool>,
}

#[derive(Debug, Serialize)]
pub struct DashboardSummary {
    pub period: String,
    pub customer_name: String,
    pub service_managers: Vec<String>,
    pub availability: AvailabilityMetrics,
    pub incidents: IncidentMetrics,
    pub top_sites: Vec<ProblemSiteRow>,
    pub root_causes: Vec<RootCauseCount>,
    pub malformed_ratio_cells: usize,
}

/// Sheet names the workbook is expected to carry.
pub mod sheets {
    pub const CUSTOMER_INFO: &str = "Customer Information";
    pub const INCIDENTS: &str = "Incident Data";
    pub const AVAILABILITY: &str = "Availability Data";
    pub const ADHOC: &str = "Ad hoc Data";

    /// Sheets whose absence stops the report. The ad-hoc sheet is optional.
    pub const REQUIRED: [&str; 3] = [CUSTOMER_INFO, INCIDENTS, AVAILABILITY];
}

/// Column headers, exactly as they appear in the workbook.
pub mod columns {
    pub const DATE: &str = "Date";
    pub const CUSTOMER_NAME: &str = "Customer Name";
    pub const SERVICE_MANAGER: &str = "Service Manager";

    pub const SR_NUMBER: &str = "SR Number";
    pub const SITE_NAME: &str = "Site Name";
    pub const ROOT_CAUSE: &str = "Root Cause";
    pub const SR_TYPE: &str = "SR Type";
    pub const AGENT_PRIORITY: &str = "Agent Priority";
    pub const STATUS: &str = "Status";
    pub const TIME_LOGGED: &str = "Time Logged";
    pub const TIME_RESOLVED: &str = "Time Resolved";
    pub const RESOLUTION: &str = "Resolution";
    pub const SOURCE: &str = "Source";
    pub const ACTUAL_DURATION: &str = "Actual Duration(DD:HH:MM:SS)";
    pub const SUMMARY: &str = "Summary";

    pub const SITE: &str = "Site";
    pub const ACTUAL_AVAILABILITY: &str = "Actual Site Availability";
    pub const TARGET_AVAILABILITY: &str = "Target Availability (SLA)";
    pub const PRIMARY_GROSS: &str = "Primary Gross Availability";
    pub const SECONDARY_GROSS: &str = "Secondary Gross Availability";
    pub const NON_CONTRACTUAL_DOWNTIME: &str = "Non-Contractual Downtime";

    /// Ratio columns rendered as percentages in the availability report.
    pub const AVAILABILITY_PERCENT: [&str; 5] = [
        TARGET_AVAILABILITY,
        PRIMARY_GROSS,
        SECONDARY_GROSS,
        NON_CONTRACTUAL_DOWNTIME,
        ACTUAL_AVAILABILITY,
    ];

    /// Incident report projection, in display order.
    pub const INCIDENT_REPORT: [&str; 11] = [
        SR_NUMBER,
        SITE_NAME,
        ROOT_CAUSE,
        SR_TYPE,
        AGENT_PRIORITY,
        TIME_LOGGED,
        TIME_RESOLVED,
        RESOLUTION,
        SOURCE,
        ACTUAL_DURATION,
        SUMMARY,
    ];
}
