use std::path::PathBuf;

use tracing::{info, instrument};

use crate::aideon::tablediff::compare::{DiffSummary, compare_tables, regroup};
use crate::aideon::tablediff::config::JobConfig;
use crate::aideon::tablediff::error::{Result, ToolError};
use crate::aideon::tablediff::io::{ReportFormat, report_json, report_write, resolve_report_path, table_read};
use crate::aideon::tablediff::report::build_report;

/// Outcome of a finished job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobOutcome {
    pub name: String,
    pub output: PathBuf,
    pub summary: DiffSummary,
}

/// Reads both tables of a job, compares them and writes the report.
#[instrument(level = "info", skip_all, fields(job = %job.name))]
pub fn run_job(job: &JobConfig) -> Result<JobOutcome> {
    for input in [&job.before_file, &job.after_file] {
        if !input.exists() {
            return Err(ToolError::MissingInput(input.clone()));
        }
    }
    let (output, format) = resolve_report_path(&job.output_file)?;

    let before = table_read::read_table(&job.before_file)?;
    let after = table_read::read_table(&job.after_file)?;
    info!(
        before_rows = before.rows.len(),
        after_rows = after.rows.len(),
        "loaded source tables"
    );

    let mut comparison = compare_tables(&before, &after, &job.compare_options())?;
    let summary = comparison.summary();
    info!(
        unmodified = summary.unmodified,
        added = summary.added,
        removed = summary.removed,
        modified = summary.modified,
        "comparison finished"
    );

    let labels = job.labels();
    match format {
        ReportFormat::Xlsx => {
            let sheet = build_report(&comparison, &labels, &job.report);
            report_write::write_report(&output, &sheet, &job.report.colors)?;
        }
        ReportFormat::Json => {
            if job.report.result_group {
                regroup(&mut comparison.entries);
            }
            report_json::write_report_json(&output, &comparison, &labels)?;
        }
    }
    info!(output = %output.display(), "report written");

    Ok(JobOutcome {
        name: job.name.clone(),
        output,
        summary,
    })
}

/// Runs the jobs named in `selected`, or every job when `selected` is empty,
/// in configuration order.
pub fn run_jobs(jobs: &[JobConfig], selected: &[String]) -> Result<Vec<JobOutcome>> {
    if let Some(unknown) = selected
        .iter()
        .find(|name| !jobs.iter().any(|job| &job.name == *name))
    {
        return Err(ToolError::UnknownJob(unknown.clone()));
    }

    jobs.iter()
        .filter(|job| selected.is_empty() || selected.contains(&job.name))
        .map(run_job)
        .collect()
}
