use std::path::{Path, PathBuf};

use crate::aideon::tablediff::error::{Result, ToolError};

pub mod report_json;
pub mod report_write;
pub mod table_read;

/// Source table encodings understood by [`table_read`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Csv,
    Xlsx,
}

/// Report encodings understood by the writers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Xlsx,
    Json,
}

/// Guesses a source format from the file extension.
pub fn detect_table_format(path: &Path) -> Option<TableFormat> {
    let extension = extension(path)?;
    match extension.as_str() {
        "csv" | "txt" => Some(TableFormat::Csv),
        "xlsx" | "xlsm" => Some(TableFormat::Xlsx),
        _ => None,
    }
}

/// Resolves the report path and format. A path without extension receives
/// `.xlsx`.
pub fn resolve_report_path(path: &Path) -> Result<(PathBuf, ReportFormat)> {
    match extension(path).as_deref() {
        None => Ok((path.with_extension("xlsx"), ReportFormat::Xlsx)),
        Some("xlsx") => Ok((path.to_path_buf(), ReportFormat::Xlsx)),
        Some("json") => Ok((path.to_path_buf(), ReportFormat::Json)),
        Some(_) => Err(ToolError::UnsupportedFormat(path.to_path_buf())),
    }
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
}
