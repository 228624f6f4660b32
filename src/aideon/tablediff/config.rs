//! Declarative comparison jobs.
//!
//! A configuration file holds a JSON array. Each element is either a job or
//! an include of the form `{"configPath": "other"}`; includes are resolved
//! relative to the including file and always read with a `.json` extension.
//! Entries flagged `"disabled": true` are skipped.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::aideon::tablediff::compare::CompareOptions;
use crate::aideon::tablediff::error::{Result, ToolError};
use crate::aideon::tablediff::model::FieldRule;
use crate::aideon::tablediff::report::{EnvironmentLabels, ReportSettings};

const INCLUDE_KEY: &str = "configPath";

/// A single named comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobConfig {
    pub name: String,
    pub before_file: PathBuf,
    pub after_file: PathBuf,
    /// Report destination; `.json` selects the JSON renderer, anything
    /// without an extension is written as `.xlsx`.
    pub output_file: PathBuf,
    #[serde(default)]
    pub keys: Vec<String>,
    #[serde(default)]
    pub remap_before: Vec<FieldRule>,
    #[serde(default)]
    pub remap_after: Vec<FieldRule>,
    #[serde(default)]
    pub compare_columns: Option<Vec<String>>,
    #[serde(default)]
    pub ignore_fields: Vec<String>,
    #[serde(default)]
    pub before_environment: Option<String>,
    #[serde(default)]
    pub after_environment: Option<String>,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub report: ReportSettings,
}

impl JobConfig {
    pub fn compare_options(&self) -> CompareOptions {
        CompareOptions {
            keys: self.keys.clone(),
            before_rules: self.remap_before.clone(),
            after_rules: self.remap_after.clone(),
            compare_columns: self.compare_columns.clone(),
            ignore_fields: self.ignore_fields.clone(),
        }
    }

    pub fn labels(&self) -> EnvironmentLabels {
        let defaults = EnvironmentLabels::default();
        EnvironmentLabels {
            before: self.before_environment.clone().unwrap_or(defaults.before),
            after: self.after_environment.clone().unwrap_or(defaults.after),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IncludeEntry {
    config_path: PathBuf,
    #[serde(default)]
    disabled: bool,
}

/// Loads every enabled job reachable from `path`, in declaration order.
pub fn load_jobs(path: &Path) -> Result<Vec<JobConfig>> {
    let mut jobs = Vec::new();
    let mut chain = Vec::new();
    load_into(&path.with_extension("json"), &mut chain, &mut jobs)?;
    Ok(jobs)
}

fn load_into(path: &Path, chain: &mut Vec<PathBuf>, jobs: &mut Vec<JobConfig>) -> Result<()> {
    if !path.exists() {
        return Err(ToolError::MissingInput(path.to_path_buf()));
    }
    let canonical = fs::canonicalize(path)?;
    if chain.contains(&canonical) {
        return Err(ToolError::config(format!(
            "configuration {} includes itself",
            path.display()
        )));
    }
    chain.push(canonical);

    let source = fs::read_to_string(path)?;
    let entries: Vec<Value> = serde_json::from_str(&source).map_err(|err| {
        ToolError::config(format!("{}: expected a list of entries: {err}", path.display()))
    })?;
    let base = path.parent().unwrap_or_else(|| Path::new(""));

    for (index, entry) in entries.into_iter().enumerate() {
        if entry.get(INCLUDE_KEY).is_some() {
            let include: IncludeEntry = serde_json::from_value(entry).map_err(|err| {
                ToolError::config(format!("{} entry {index}: {err}", path.display()))
            })?;
            if include.disabled {
                continue;
            }
            let nested = base.join(&include.config_path).with_extension("json");
            debug!(include = %nested.display(), "following configuration include");
            load_into(&nested, chain, jobs)?;
        } else {
            let job: JobConfig = serde_json::from_value(entry).map_err(|err| {
                ToolError::config(format!("{} entry {index}: {err}", path.display()))
            })?;
            if !job.disabled {
                jobs.push(job);
            }
        }
    }

    chain.pop();
    Ok(())
}
