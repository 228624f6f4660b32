use std::path::Path;

use calamine::{DataType, Reader, Xlsx, open_workbook};
use csv::ReaderBuilder;
use tracing::{debug, instrument};

use crate::aideon::tablediff::error::{Result, ToolError};
use crate::aideon::tablediff::io::{TableFormat, detect_table_format};
use crate::aideon::tablediff::model::RawTable;

/// Reads the first sheet of a CSV or Excel file. The first row is the
/// header; fully blank rows are dropped.
#[instrument(level = "debug", skip_all, fields(path = %path.display()))]
pub fn read_table(path: &Path) -> Result<RawTable> {
    let format =
        detect_table_format(path).ok_or_else(|| ToolError::UnsupportedFormat(path.to_path_buf()))?;
    let rows = match format {
        TableFormat::Csv => read_csv_rows(path)?,
        TableFormat::Xlsx => read_xlsx_rows(path)?,
    };
    let rows: Vec<Vec<String>> = rows.into_iter().filter(|row| !is_blank(row)).collect();
    debug!(row_count = rows.len(), "read source rows");
    RawTable::from_rows(rows)
}

fn read_csv_rows(path: &Path) -> Result<Vec<Vec<String>>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(rows)
}

fn read_xlsx_rows(path: &Path) -> Result<Vec<Vec<String>>> {
    let mut workbook: Xlsx<_> = open_workbook(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| ToolError::InvalidWorkbook(format!("{} has no worksheet", path.display())))?
        .map_err(ToolError::from)?;

    Ok(range
        .rows()
        .map(|row| row.iter().map(|cell| cell_to_string(Some(cell))).collect())
        .collect())
}

fn cell_to_string(cell: Option<&DataType>) -> String {
    match cell {
        Some(DataType::String(value)) => value.clone(),
        Some(DataType::Float(value)) => value.to_string(),
        Some(DataType::Int(value)) => value.to_string(),
        Some(DataType::Bool(value)) => value.to_string(),
        Some(DataType::Empty) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

fn is_blank(row: &[String]) -> bool {
    row.iter().all(|cell| cell.trim().is_empty())
}
