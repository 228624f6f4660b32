//! Styled grid layout of a comparison.
//!
//! The layout is independent of any file format: it places text cells tagged
//! with a [`CellStyle`] on a sparse grid, which the writers under
//! [`crate::io`] then materialise.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::aideon::tablediff::compare::{Comparison, group_order};
use crate::aideon::tablediff::error::{Result, ToolError};
use crate::aideon::tablediff::model::{DiffEntry, Header, Record};

/// Name of the worksheet holding the report.
pub const REPORT_SHEET: &str = "Table difference";
/// Heading of the operation column.
pub const OPERATION_HEADING: &str = "Operation";
/// Heading of the legend column.
pub const LEGEND_HEADING: &str = "LEGEND";

/// How before/after rows are placed relative to each other.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ResultMode {
    /// Both sides share the same columns; modified records take two rows.
    #[default]
    Inline,
    /// "after" values get their own block of columns to the right.
    Side,
}

/// Fill colours as six digit hex RGB strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReportColors {
    pub unmodified: String,
    pub added: String,
    pub removed: String,
    pub modified_before: String,
    pub modified_after: String,
    pub modified_field: String,
}

impl Default for ReportColors {
    fn default() -> Self {
        Self {
            unmodified: "E2E4E6".into(),
            added: "61FFAC".into(),
            removed: "FD919B".into(),
            modified_before: "FFE269".into(),
            modified_after: "92CDDC".into(),
            modified_field: "B1A0C7".into(),
        }
    }
}

impl ReportColors {
    /// Fill colour for a style; `None` for unstyled cells.
    pub fn rgb(&self, style: CellStyle) -> Result<Option<u32>> {
        let hex = match style {
            CellStyle::Plain => return Ok(None),
            CellStyle::Unmodified => &self.unmodified,
            CellStyle::Added => &self.added,
            CellStyle::Removed => &self.removed,
            CellStyle::ModifiedBefore => &self.modified_before,
            CellStyle::ModifiedAfter => &self.modified_after,
            CellStyle::ModifiedField => &self.modified_field,
        };
        parse_hex_color(hex).map(Some)
    }
}

/// Parses `RRGGBB`, optionally prefixed with `#`.
pub fn parse_hex_color(value: &str) -> Result<u32> {
    let digits = value.trim().trim_start_matches('#');
    if digits.len() != 6 || !digits.chars().all(|ch| ch.is_ascii_hexdigit()) {
        return Err(ToolError::InvalidColor(value.to_string()));
    }
    u32::from_str_radix(digits, 16).map_err(|_| ToolError::InvalidColor(value.to_string()))
}

/// Presentation knobs for the workbook report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReportSettings {
    pub result_mode: ResultMode,
    /// Groups entries by kind, then key, instead of merged key order.
    pub result_group: bool,
    pub include_unmodified: bool,
    pub include_captions: bool,
    pub captions_spacing: usize,
    pub include_operation: bool,
    pub operation_spacing: usize,
    pub side_spacing: usize,
    pub row_spacing: usize,
    pub colors: ReportColors,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            result_mode: ResultMode::Inline,
            result_group: false,
            include_unmodified: false,
            include_captions: true,
            captions_spacing: 1,
            include_operation: true,
            operation_spacing: 1,
            side_spacing: 0,
            row_spacing: 0,
            colors: ReportColors::default(),
        }
    }
}

/// Names of the two environments being reconciled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentLabels {
    pub before: String,
    pub after: String,
}

impl Default for EnvironmentLabels {
    fn default() -> Self {
        Self {
            before: "before".into(),
            after: "after".into(),
        }
    }
}

/// Visual role of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellStyle {
    Plain,
    Unmodified,
    Added,
    Removed,
    ModifiedBefore,
    ModifiedAfter,
    ModifiedField,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportCell {
    pub text: String,
    pub style: CellStyle,
}

impl ReportCell {
    pub fn new(text: impl Into<String>, style: CellStyle) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(text, CellStyle::Plain)
    }
}

/// Sparse grid of cells addressed by zero-based `(row, column)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportSheet {
    pub name: String,
    cells: BTreeMap<(usize, usize), ReportCell>,
}

impl ReportSheet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cells: BTreeMap::new(),
        }
    }

    pub fn set(&mut self, row: usize, col: usize, cell: ReportCell) {
        self.cells.insert((row, col), cell);
    }

    /// Writes `cells` left to right starting at `(row, col)`.
    pub fn set_row(&mut self, row: usize, col: usize, cells: Vec<ReportCell>) {
        for (offset, cell) in cells.into_iter().enumerate() {
            self.set(row, col + offset, cell);
        }
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&ReportCell> {
        self.cells.get(&(row, col))
    }

    /// Text at `(row, col)`, empty when the cell is unset.
    pub fn text(&self, row: usize, col: usize) -> &str {
        self.cell(row, col).map(|cell| cell.text.as_str()).unwrap_or("")
    }

    /// Cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, &ReportCell)> {
        self.cells.iter().map(|((row, col), cell)| (*row, *col, cell))
    }

    /// Number of rows up to the last populated one.
    pub fn height(&self) -> usize {
        self.cells.keys().map(|(row, _)| row + 1).max().unwrap_or(0)
    }

    /// Number of columns up to the last populated one.
    pub fn width(&self) -> usize {
        self.cells.keys().map(|(_, col)| col + 1).max().unwrap_or(0)
    }
}

struct OperationLabels {
    unmodified: String,
    created: String,
    removed: String,
    modified_before: String,
    modified_after: String,
    modified: String,
    value_modified: String,
}

impl OperationLabels {
    fn new(labels: &EnvironmentLabels) -> Self {
        let EnvironmentLabels { before, after } = labels;
        Self {
            unmodified: "Unchanged".into(),
            created: format!("Created in {after}"),
            removed: format!("Removed from {after}"),
            modified_before: format!("Modified (record in {before})"),
            modified_after: format!("Modified (record in {after})"),
            modified: "Modified".into(),
            value_modified: format!("Value modified in {after}"),
        }
    }
}

/// Lays out a comparison as a styled grid.
pub fn build_report(
    comparison: &Comparison,
    labels: &EnvironmentLabels,
    settings: &ReportSettings,
) -> ReportSheet {
    let header = &comparison.header;
    let ops = OperationLabels::new(labels);
    let side = settings.result_mode == ResultMode::Side;
    let width = header.len();
    let right_col = width + settings.side_spacing;

    let mut sheet = ReportSheet::new(REPORT_SHEET);

    let names: Vec<ReportCell> = header.names().map(ReportCell::plain).collect();
    sheet.set_row(0, 0, names.clone());
    let mut spacing = width;
    if side {
        sheet.set_row(0, right_col, names);
        spacing = width * 2 + settings.side_spacing;
    }

    let operation_col = spacing + settings.operation_spacing;
    if settings.include_operation {
        sheet.set(0, operation_col, ReportCell::plain(OPERATION_HEADING));
        spacing += 1 + settings.operation_spacing;
    }

    if settings.include_captions {
        let legend_col = spacing + settings.captions_spacing;
        let mut captions = vec![ReportCell::plain(LEGEND_HEADING)];
        if settings.include_unmodified {
            captions.push(ReportCell::new(&ops.unmodified, CellStyle::Unmodified));
        }
        captions.extend([
            ReportCell::new(&ops.created, CellStyle::Added),
            ReportCell::new(&ops.removed, CellStyle::Removed),
            ReportCell::new(&ops.modified_before, CellStyle::ModifiedBefore),
            ReportCell::new(&ops.modified_after, CellStyle::ModifiedAfter),
            ReportCell::new(&ops.value_modified, CellStyle::ModifiedField),
        ]);
        for (row, caption) in captions.into_iter().enumerate() {
            sheet.set(row, legend_col, caption);
        }
    }

    let mut entries: Vec<&DiffEntry> = comparison.entries.iter().collect();
    if settings.result_group {
        entries.sort_by(|lhs, rhs| group_order(lhs, rhs));
    }

    let set_operation = |sheet: &mut ReportSheet, row: usize, text: &str, style: CellStyle| {
        if settings.include_operation {
            sheet.set(row, operation_col, ReportCell::new(text, style));
        }
    };

    let mut row = 1;
    for entry in entries {
        match entry {
            DiffEntry::Unmodified { record, .. } => {
                if !settings.include_unmodified {
                    continue;
                }
                let cells = record_cells(record, header, |_| CellStyle::Unmodified);
                if side {
                    sheet.set_row(row, right_col, cells.clone());
                }
                sheet.set_row(row, 0, cells);
                set_operation(&mut sheet, row, &ops.unmodified, CellStyle::Unmodified);
            }
            DiffEntry::Added { record, .. } => {
                let cells = record_cells(record, header, |_| CellStyle::Added);
                sheet.set_row(row, if side { right_col } else { 0 }, cells);
                set_operation(&mut sheet, row, &ops.created, CellStyle::Added);
            }
            DiffEntry::Removed { record, .. } => {
                let cells = record_cells(record, header, |_| CellStyle::Removed);
                sheet.set_row(row, 0, cells);
                set_operation(&mut sheet, row, &ops.removed, CellStyle::Removed);
            }
            DiffEntry::Modified {
                before,
                after,
                changed_fields,
                ..
            } => {
                let before_cells = record_cells(before, header, |_| CellStyle::ModifiedBefore);
                let after_cells = record_cells(after, header, |name| {
                    if changed_fields.iter().any(|field| field == name) {
                        CellStyle::ModifiedField
                    } else {
                        CellStyle::ModifiedAfter
                    }
                });
                sheet.set_row(row, 0, before_cells);
                if side {
                    sheet.set_row(row, right_col, after_cells);
                    set_operation(&mut sheet, row, &ops.modified, CellStyle::ModifiedAfter);
                } else {
                    sheet.set_row(row + 1, 0, after_cells);
                    set_operation(&mut sheet, row, &ops.modified_before, CellStyle::ModifiedBefore);
                    set_operation(&mut sheet, row + 1, &ops.modified_after, CellStyle::ModifiedAfter);
                    row += 1;
                }
            }
        }
        row += 1 + settings.row_spacing;
    }

    sheet
}

fn record_cells(
    record: &Record,
    header: &Header,
    style: impl Fn(&str) -> CellStyle,
) -> Vec<ReportCell> {
    header
        .names()
        .map(|name| ReportCell::new(record.value(name), style(name)))
        .collect()
}
