use std::fs;
use std::path::Path;

use aideon_tablediff::ToolError;
use aideon_tablediff::config::{self, JobConfig};
use aideon_tablediff::io::table_read;
use aideon_tablediff::report::REPORT_SHEET;
use aideon_tablediff::run::{run_job, run_jobs};
use calamine::{DataType, Reader, Xlsx, open_workbook};
use rust_xlsxwriter::Workbook;
use tempfile::tempdir;

fn job_json(name: &str, dir: &Path, output: &str) -> serde_json::Value {
    serde_json::json!({
        "name": name,
        "beforeFile": dir.join("before.csv"),
        "afterFile": dir.join("after.csv"),
        "outputFile": dir.join(output),
        "keys": ["id"]
    })
}

fn write_csv_pair(dir: &Path) {
    fs::write(
        dir.join("before.csv"),
        "id,name,born\n1,Alice,1990-02-01\n2,Bob,?\n3,Carol,1985-07-30\n\n",
    )
    .expect("before written");
    fs::write(
        dir.join("after.csv"),
        "id,name,born\n1,Alice,01/02/1990\n2,Robert,?\n4,Dan,unknown\n",
    )
    .expect("after written");
}

#[test]
fn includes_are_resolved_relative_to_the_including_file() {
    let temp_dir = tempdir().expect("temporary directory");
    let dir = temp_dir.path();
    fs::create_dir_all(dir.join("nested")).expect("nested dir");

    let mut disabled = job_json("disabled", dir, "disabled");
    disabled["disabled"] = serde_json::json!(true);
    let main = serde_json::json!([
        {"configPath": "nested/inner.cfg"},
        job_json("outer", dir, "outer"),
        disabled,
        {"configPath": "nested/missing", "disabled": true}
    ]);
    let inner = serde_json::json!([job_json("inner", dir, "inner")]);
    fs::write(dir.join("main.json"), main.to_string()).expect("main written");
    fs::write(dir.join("nested").join("inner.json"), inner.to_string()).expect("inner written");

    let jobs = config::load_jobs(&dir.join("main")).expect("jobs loaded");

    let names: Vec<&str> = jobs.iter().map(|job| job.name.as_str()).collect();
    assert_eq!(names, vec!["inner", "outer"]);
    assert_eq!(jobs[1].keys, vec!["id".to_string()]);
}

#[test]
fn include_cycles_are_reported() {
    let temp_dir = tempdir().expect("temporary directory");
    let dir = temp_dir.path();
    fs::write(dir.join("a.json"), r#"[{"configPath": "b"}]"#).expect("a written");
    fs::write(dir.join("b.json"), r#"[{"configPath": "a"}]"#).expect("b written");

    let result = config::load_jobs(&dir.join("a.json"));

    assert!(matches!(result, Err(ToolError::Config(_))));
}

#[test]
fn missing_configuration_is_reported() {
    let temp_dir = tempdir().expect("temporary directory");

    let result = config::load_jobs(&temp_dir.path().join("absent"));

    assert!(matches!(result, Err(ToolError::MissingInput(_))));
}

#[test]
fn job_settings_parse_with_defaults() {
    let temp_dir = tempdir().expect("temporary directory");
    let path = temp_dir.path().join("jobs.json");
    fs::write(
        &path,
        r#"[{
            "name": "groups",
            "beforeFile": "a.csv",
            "afterFile": "b.csv",
            "outputFile": "out/groups",
            "remapBefore": [{"column": "d", "type": "DATE", "from": "YYYY", "to": "YY"}],
            "beforeEnvironment": "PFS",
            "report": {"resultMode": "SIDE", "includeUnmodified": true}
        }]"#,
    )
    .expect("config written");

    let jobs = config::load_jobs(&path).expect("jobs loaded");

    let job = &jobs[0];
    assert_eq!(job.remap_before.len(), 1);
    assert!(job.remap_after.is_empty());
    assert_eq!(job.labels().before, "PFS");
    assert_eq!(job.labels().after, "after");
    assert!(job.report.include_unmodified);
    assert!(job.report.include_captions);
    assert_eq!(job.report.operation_spacing, 1);
}

#[test]
fn csv_job_writes_a_workbook_report() {
    let temp_dir = tempdir().expect("temporary directory");
    let dir = temp_dir.path();
    write_csv_pair(dir);
    let mut job: JobConfig =
        serde_json::from_value(job_json("people", dir, "out/people")).expect("job parsed");
    job.remap_before = serde_json::from_value(serde_json::json!([
        {"column": "born", "type": "DATE", "from": "YYYY-MM-DD", "to": "DD/MM/YYYY"}
    ]))
    .expect("rules parsed");
    job.remap_after = serde_json::from_value(serde_json::json!([
        {"column": "born", "type": "DATE", "from": "DD/MM/YYYY", "to": "DD/MM/YYYY"}
    ]))
    .expect("rules parsed");
    job.ignore_fields = vec!["born".into()];

    let outcome = run_job(&job).expect("job ran");

    assert_eq!(outcome.output, dir.join("out").join("people.xlsx"));
    assert_eq!(outcome.summary.unmodified, 1);
    assert_eq!(outcome.summary.modified, 1);
    assert_eq!(outcome.summary.removed, 1);
    assert_eq!(outcome.summary.added, 1);

    let mut workbook: Xlsx<_> = open_workbook(&outcome.output).expect("report opened");
    let range = workbook
        .worksheet_range(REPORT_SHEET)
        .expect("report sheet present")
        .expect("report sheet read");
    assert_eq!(
        range.get_value((1, 1)),
        Some(&DataType::String("Bob".into()))
    );
    assert_eq!(
        range.get_value((2, 1)),
        Some(&DataType::String("Robert".into()))
    );
    assert_eq!(
        range.get_value((3, 2)),
        Some(&DataType::String("1985-07-30 - 30/07/1985".into()))
    );
    assert_eq!(
        range.get_value((4, 2)),
        Some(&DataType::String(
            "[invalid date] unknown - Invalid date".into()
        ))
    );
}

#[test]
fn json_output_is_selected_by_extension() {
    let temp_dir = tempdir().expect("temporary directory");
    let dir = temp_dir.path();
    write_csv_pair(dir);
    let job: JobConfig =
        serde_json::from_value(job_json("people", dir, "people.json")).expect("job parsed");

    let outcome = run_job(&job).expect("job ran");

    let written = fs::read_to_string(&outcome.output).expect("json read");
    let parsed: serde_json::Value = serde_json::from_str(&written).expect("json parsed");
    assert_eq!(parsed["summary"]["modified"], 2);
    assert_eq!(parsed["entries"].as_array().map(Vec::len), Some(4));
}

#[test]
fn xlsx_sources_are_read_from_the_first_sheet() {
    let temp_dir = tempdir().expect("temporary directory");
    let dir = temp_dir.path();
    let source = dir.join("source.xlsx");

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.write_string(0, 0, " id ").expect("header");
    worksheet.write_string(0, 1, "amount").expect("header");
    worksheet.write_number(1, 0, 10.0).expect("cell");
    worksheet.write_number(1, 1, 2.5).expect("cell");
    worksheet.write_number(3, 0, 11.0).expect("cell");
    workbook.save(&source).expect("source saved");

    let table = table_read::read_table(&source).expect("table read");

    assert_eq!(table.header, vec![" id ".to_string(), "amount".to_string()]);
    assert_eq!(
        table.rows,
        vec![
            vec!["10".to_string(), "2.5".to_string()],
            vec!["11".to_string(), String::new()],
        ]
    );
}

#[test]
fn unknown_source_extension_is_rejected() {
    let temp_dir = tempdir().expect("temporary directory");
    let path = temp_dir.path().join("table.parquet");
    fs::write(&path, "").expect("file written");

    let result = table_read::read_table(&path);

    assert!(matches!(result, Err(ToolError::UnsupportedFormat(_))));
}

#[test]
fn selecting_an_unknown_job_fails_before_running() {
    let temp_dir = tempdir().expect("temporary directory");
    let job: JobConfig = serde_json::from_value(job_json("people", temp_dir.path(), "people"))
        .expect("job parsed");

    let result = run_jobs(&[job], &["nobody".to_string()]);

    assert!(matches!(result, Err(ToolError::UnknownJob(name)) if name == "nobody"));
}

#[test]
fn missing_source_file_is_reported() {
    let temp_dir = tempdir().expect("temporary directory");
    let job: JobConfig = serde_json::from_value(job_json("people", temp_dir.path(), "people"))
        .expect("job parsed");

    let result = run_job(&job);

    assert!(matches!(result, Err(ToolError::MissingInput(_))));
}
