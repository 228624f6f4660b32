use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::aideon::tablediff::compare::{Comparison, DiffSummary};
use crate::aideon::tablediff::error::Result;
use crate::aideon::tablediff::model::DiffEntry;
use crate::aideon::tablediff::report::EnvironmentLabels;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonReport<'a> {
    before_environment: &'a str,
    after_environment: &'a str,
    header: Vec<&'a str>,
    summary: DiffSummary,
    entries: &'a [DiffEntry],
}

/// Serialises a comparison as pretty-printed JSON.
pub fn write_report_json(
    path: &Path,
    comparison: &Comparison,
    labels: &EnvironmentLabels,
) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let report = JsonReport {
        before_environment: &labels.before,
        after_environment: &labels.after,
        header: comparison.header.names().collect(),
        summary: comparison.summary(),
        entries: &comparison.entries,
    };
    fs::write(path, serde_json::to_string_pretty(&report)?)?;
    Ok(())
}
