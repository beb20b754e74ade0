//! Error taxonomy for the report pipeline.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    /// No workbook was supplied at all.
    #[error("Upload Excel File! No input workbook was supplied (use --input)")]
    MissingInput,
    #[error("unable to read the workbook: {0}")]
    UnreadableFile(#[from] calamine::Error),
    /// Required sheets that were not found, in required order.
    #[error("Excel file doesn't contain the required sheets! Missing: {}", .0.join(", "))]
    MissingSheets(Vec<String>),
    #[error("sheet '{0}' has no data rows")]
    EmptySheet(String),
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, ReportError>;
