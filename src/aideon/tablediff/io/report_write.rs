use std::collections::HashMap;
use std::fs;
use std::path::Path;

use rust_xlsxwriter::{Color, Format, FormatPattern, Workbook};
use tracing::instrument;

use crate::aideon::tablediff::error::{Result, ToolError};
use crate::aideon::tablediff::report::{CellStyle, ReportColors, ReportSheet};

const STYLES: [CellStyle; 6] = [
    CellStyle::Unmodified,
    CellStyle::Added,
    CellStyle::Removed,
    CellStyle::ModifiedBefore,
    CellStyle::ModifiedAfter,
    CellStyle::ModifiedField,
];

/// Writes the report grid to an `.xlsx` file, creating parent directories.
#[instrument(level = "debug", skip_all, fields(path = %path.display()))]
pub fn write_report(path: &Path, sheet: &ReportSheet, colors: &ReportColors) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let formats = style_formats(colors)?;
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(&sheet.name)?;

    for (row, col, cell) in sheet.cells() {
        let row = u32::try_from(row)
            .map_err(|_| ToolError::InvalidWorkbook(format!("row {row} out of range")))?;
        let col = u16::try_from(col)
            .map_err(|_| ToolError::InvalidWorkbook(format!("column {col} out of range")))?;
        match formats.get(&cell.style) {
            Some(format) => {
                worksheet.write_string_with_format(row, col, cell.text.as_str(), format)?;
            }
            None => {
                worksheet.write_string(row, col, cell.text.as_str())?;
            }
        }
    }
    worksheet.autofit();

    workbook.save(path)?;
    Ok(())
}

fn style_formats(colors: &ReportColors) -> Result<HashMap<CellStyle, Format>> {
    let mut formats = HashMap::new();
    for style in STYLES {
        if let Some(rgb) = colors.rgb(style)? {
            let format = Format::new()
                .set_pattern(FormatPattern::Solid)
                .set_background_color(Color::RGB(rgb));
            formats.insert(style, format);
        }
    }
    Ok(formats)
}
