use aideon_tablediff::ToolError;
use aideon_tablediff::compare::{CompareOptions, Comparison, compare_tables};
use aideon_tablediff::io::{report_json, report_write};
use aideon_tablediff::model::RawTable;
use aideon_tablediff::report::{
    CellStyle, EnvironmentLabels, REPORT_SHEET, ReportColors, ReportSettings, ResultMode,
    build_report,
};
use calamine::{DataType, Reader, Xlsx, open_workbook};
use tempfile::tempdir;

fn comparison() -> Comparison {
    let before = RawTable::from_rows(vec![
        vec!["id".into(), "name".into()],
        vec!["1".into(), "A".into()],
        vec!["2".into(), "B".into()],
        vec!["3".into(), "C".into()],
    ])
    .expect("before table");
    let after = RawTable::from_rows(vec![
        vec!["id".into(), "name".into()],
        vec!["1".into(), "A".into()],
        vec!["2".into(), "X".into()],
        vec!["4".into(), "D".into()],
    ])
    .expect("after table");
    let options = CompareOptions {
        keys: vec!["id".into()],
        ..CompareOptions::default()
    };
    compare_tables(&before, &after, &options).expect("compared")
}

fn labels() -> EnvironmentLabels {
    EnvironmentLabels {
        before: "PFS".into(),
        after: "TC2".into(),
    }
}

#[test]
fn inline_layout_stacks_modified_rows() {
    let sheet = build_report(&comparison(), &labels(), &ReportSettings::default());

    assert_eq!(sheet.name, REPORT_SHEET);
    assert_eq!(sheet.text(0, 0), "id");
    assert_eq!(sheet.text(0, 1), "name");
    assert_eq!(sheet.text(0, 3), "Operation");
    assert_eq!(sheet.text(0, 5), "LEGEND");
    assert_eq!(sheet.text(1, 5), "Created in TC2");
    assert_eq!(sheet.text(2, 5), "Removed from TC2");
    assert_eq!(sheet.text(3, 5), "Modified (record in PFS)");
    assert_eq!(sheet.text(4, 5), "Modified (record in TC2)");
    assert_eq!(sheet.text(5, 5), "Value modified in TC2");

    assert_eq!(sheet.text(1, 1), "B");
    assert_eq!(sheet.text(1, 3), "Modified (record in PFS)");
    assert_eq!(sheet.text(2, 1), "X");
    assert_eq!(sheet.text(2, 3), "Modified (record in TC2)");
    assert_eq!(sheet.cell(1, 0).map(|c| c.style), Some(CellStyle::ModifiedBefore));
    assert_eq!(sheet.cell(2, 0).map(|c| c.style), Some(CellStyle::ModifiedAfter));
    assert_eq!(sheet.cell(2, 1).map(|c| c.style), Some(CellStyle::ModifiedField));

    assert_eq!(sheet.text(3, 0), "3");
    assert_eq!(sheet.text(3, 3), "Removed from TC2");
    assert_eq!(sheet.cell(3, 0).map(|c| c.style), Some(CellStyle::Removed));
    assert_eq!(sheet.text(4, 0), "4");
    assert_eq!(sheet.text(4, 3), "Created in TC2");
    assert_eq!(sheet.cell(4, 1).map(|c| c.style), Some(CellStyle::Added));
    assert_eq!(sheet.height(), 6);
}

#[test]
fn side_layout_places_after_values_to_the_right() {
    let settings = ReportSettings {
        result_mode: ResultMode::Side,
        include_unmodified: true,
        ..ReportSettings::default()
    };

    let sheet = build_report(&comparison(), &labels(), &settings);

    assert_eq!(sheet.text(0, 2), "id");
    assert_eq!(sheet.text(0, 3), "name");
    assert_eq!(sheet.text(0, 5), "Operation");
    assert_eq!(sheet.text(0, 7), "LEGEND");
    assert_eq!(sheet.text(1, 7), "Unchanged");

    assert_eq!(sheet.text(1, 1), "A");
    assert_eq!(sheet.text(1, 3), "A");
    assert_eq!(sheet.text(1, 5), "Unchanged");
    assert_eq!(sheet.cell(1, 3).map(|c| c.style), Some(CellStyle::Unmodified));

    assert_eq!(sheet.text(2, 1), "B");
    assert_eq!(sheet.text(2, 3), "X");
    assert_eq!(sheet.text(2, 5), "Modified");
    assert_eq!(sheet.cell(2, 2).map(|c| c.style), Some(CellStyle::ModifiedAfter));
    assert_eq!(sheet.cell(2, 3).map(|c| c.style), Some(CellStyle::ModifiedField));

    assert_eq!(sheet.text(3, 0), "3");
    assert!(sheet.cell(3, 2).is_none());
    assert!(sheet.cell(4, 0).is_none());
    assert_eq!(sheet.text(4, 2), "4");
    assert_eq!(sheet.text(4, 5), "Created in TC2");
}

#[test]
fn grouping_and_spacing_change_row_placement() {
    let settings = ReportSettings {
        result_group: true,
        row_spacing: 1,
        include_captions: false,
        include_operation: false,
        ..ReportSettings::default()
    };

    let sheet = build_report(&comparison(), &labels(), &settings);

    assert_eq!(sheet.text(1, 0), "4");
    assert!(sheet.cell(2, 0).is_none());
    assert_eq!(sheet.text(3, 0), "3");
    assert_eq!(sheet.text(5, 1), "B");
    assert_eq!(sheet.text(6, 1), "X");
    assert_eq!(sheet.width(), 2);
}

#[test]
fn workbook_report_is_written_with_fills() {
    let sheet = build_report(&comparison(), &labels(), &ReportSettings::default());
    let temp_dir = tempdir().expect("temporary directory");
    let xlsx_path = temp_dir.path().join("nested").join("diff.xlsx");

    report_write::write_report(&xlsx_path, &sheet, &ReportColors::default())
        .expect("report written");

    let mut workbook: Xlsx<_> = open_workbook(&xlsx_path).expect("report opened");
    let range = workbook
        .worksheet_range(REPORT_SHEET)
        .expect("report sheet present")
        .expect("report sheet read");
    assert_eq!(
        range.get_value((0, 0)),
        Some(&DataType::String("id".into()))
    );
    assert_eq!(
        range.get_value((2, 1)),
        Some(&DataType::String("X".into()))
    );
    assert_eq!(
        range.get_value((4, 3)),
        Some(&DataType::String("Created in TC2".into()))
    );
}

#[test]
fn malformed_colours_are_rejected() {
    let sheet = build_report(&comparison(), &labels(), &ReportSettings::default());
    let temp_dir = tempdir().expect("temporary directory");
    let colors = ReportColors {
        added: "green".into(),
        ..ReportColors::default()
    };

    let result = report_write::write_report(&temp_dir.path().join("diff.xlsx"), &sheet, &colors);

    assert!(matches!(result, Err(ToolError::InvalidColor(value)) if value == "green"));
}

#[test]
fn json_report_carries_summary_and_tagged_entries() {
    let temp_dir = tempdir().expect("temporary directory");
    let json_path = temp_dir.path().join("diff.json");

    report_json::write_report_json(&json_path, &comparison(), &labels()).expect("json written");

    let written = std::fs::read_to_string(&json_path).expect("json read");
    let parsed: serde_json::Value = serde_json::from_str(&written).expect("json parsed");
    assert_eq!(parsed["afterEnvironment"], "TC2");
    assert_eq!(parsed["header"], serde_json::json!(["id", "name"]));
    assert_eq!(
        parsed["summary"],
        serde_json::json!({"unmodified": 1, "added": 1, "removed": 1, "modified": 1})
    );
    assert_eq!(parsed["entries"][1]["kind"], "modified");
    assert_eq!(parsed["entries"][1]["changedFields"], serde_json::json!(["name"]));
    assert_eq!(parsed["entries"][1]["after"]["values"]["name"], "X");
    assert_eq!(parsed["entries"][3]["kind"], "added");
}
