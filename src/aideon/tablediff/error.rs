use std::path::PathBuf;

use thiserror::Error;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, ToolError>;

/// Error type covering the different failure cases that can occur when the
/// tool reads tables, compares them, or emits a report.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Wrapper for IO failures such as reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised when JSON parsing or serialization fails.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Raised when a CSV source cannot be parsed.
    #[error("CSV read error: {0}")]
    Csv(#[from] csv::Error),

    /// Errors bubbled up from the Excel writer implementation.
    #[error("Excel write error: {0}")]
    ExcelWrite(#[from] rust_xlsxwriter::XlsxError),

    /// Errors bubbled up from the Excel reader implementation.
    #[error("Excel read error: {0}")]
    ExcelRead(#[from] calamine::XlsxError),

    /// Raised when a workbook does not contain a usable sheet.
    #[error("invalid workbook structure: {0}")]
    InvalidWorkbook(String),

    /// Raised when the comparison receives structurally invalid tables.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Raised when a comparison configuration cannot be resolved.
    #[error("configuration error: {0}")]
    Config(String),

    /// Raised when a file extension maps to no known reader or writer.
    #[error("unsupported file format: {0}")]
    UnsupportedFormat(PathBuf),

    /// Raised when a requested job is not declared in the configuration.
    #[error("unknown comparison job '{0}'")]
    UnknownJob(String),

    /// Raised when a report colour is not a six digit hex value.
    #[error("invalid colour '{0}', expected six hex digits")]
    InvalidColor(String),

    /// Raised when the user provides a path that does not exist.
    #[error("input file not found: {0}")]
    MissingInput(PathBuf),

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}

impl ToolError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
