use std::cmp::Ordering;
use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::aideon::tablediff::align::align;
use crate::aideon::tablediff::error::{Result, ToolError};
use crate::aideon::tablediff::key::KeySelection;
use crate::aideon::tablediff::mapper::{index_records, map_sheet};
use crate::aideon::tablediff::model::{DiffEntry, DiffKind, FieldRule, Header, RawTable};

/// Everything that shapes a single comparison besides the two tables.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompareOptions {
    /// Key fields forming a record's identity. Empty means row order.
    #[serde(default)]
    pub keys: Vec<String>,
    /// Transforms applied to the "before" table.
    #[serde(default)]
    pub before_rules: Vec<FieldRule>,
    /// Transforms applied to the "after" table.
    #[serde(default)]
    pub after_rules: Vec<FieldRule>,
    /// Restricts the compared and rendered columns.
    #[serde(default)]
    pub compare_columns: Option<Vec<String>>,
    /// Columns rendered but excluded from change detection.
    #[serde(default)]
    pub ignore_fields: Vec<String>,
}

/// Result of a comparison: the effective header and the ordered entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Comparison {
    pub header: Header,
    pub entries: Vec<DiffEntry>,
}

/// Entry counts per kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DiffSummary {
    pub unmodified: usize,
    pub added: usize,
    pub removed: usize,
    pub modified: usize,
}

impl DiffSummary {
    /// Whether the two tables differ at all.
    pub fn has_changes(&self) -> bool {
        self.added + self.removed + self.modified > 0
    }
}

impl Comparison {
    pub fn summary(&self) -> DiffSummary {
        let mut summary = DiffSummary::default();
        for entry in &self.entries {
            match entry.kind() {
                DiffKind::Unmodified => summary.unmodified += 1,
                DiffKind::Added => summary.added += 1,
                DiffKind::Removed => summary.removed += 1,
                DiffKind::Modified => summary.modified += 1,
            }
        }
        summary
    }
}

/// Compares two raw tables. The effective header is taken from `before`.
#[instrument(
    level = "debug",
    skip_all,
    fields(before_rows = before.rows.len(), after_rows = after.rows.len())
)]
pub fn compare_tables(
    before: &RawTable,
    after: &RawTable,
    options: &CompareOptions,
) -> Result<Comparison> {
    validate_header(&before.header, "before")?;
    validate_header(&after.header, "after")?;

    let allowlist = options.compare_columns.as_deref();
    let before_header = Header::from_raw(&before.header, allowlist);
    let after_header = Header::from_raw(&after.header, allowlist);
    let keys = KeySelection::resolve(&options.keys, &before_header, &after_header);
    debug!(?keys, "resolved record keys");

    let before_sheet = map_sheet(before, before_header, &options.before_rules, &keys)?;
    let after_sheet = map_sheet(after, after_header, &options.after_rules, &keys)?;

    let lengths = before_sheet.key_lengths.union(&after_sheet.key_lengths);
    let header = before_sheet.header;
    let before_records = index_records(before_sheet.records, &lengths);
    let after_records = index_records(after_sheet.records, &lengths);

    let entries = align(before_records, after_records, &header, &options.ignore_fields);
    Ok(Comparison { header, entries })
}

/// Reorders entries by kind, then key. The sort is stable.
pub fn regroup(entries: &mut [DiffEntry]) {
    entries.sort_by(group_order);
}

/// Ordering used when entries are grouped by kind.
pub fn group_order(lhs: &DiffEntry, rhs: &DiffEntry) -> Ordering {
    lhs.kind()
        .cmp(&rhs.kind())
        .then_with(|| lhs.key().cmp(rhs.key()))
}

fn validate_header(header: &[String], side: &str) -> Result<()> {
    if header.iter().all(|name| name.trim().is_empty()) {
        return Err(ToolError::invalid_input(format!(
            "{side} table has an empty header row"
        )));
    }
    let mut seen = HashSet::new();
    for name in header {
        let name = name.trim();
        if !name.is_empty() && !seen.insert(name) {
            return Err(ToolError::invalid_input(format!(
                "{side} table declares column '{name}' more than once"
            )));
        }
    }
    Ok(())
}
