use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::aideon::tablediff::error::{Result, ToolError};

/// Per-field rewrite applied while records are loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum FieldTransform {
    /// Reparses a date written with the `from` pattern and appends the value
    /// rendered with the `to` pattern.
    #[serde(rename = "DATE")]
    Date { from: String, to: String },
    /// Rewrites the `?` sentinel into the literal `null`.
    #[serde(rename = "CHECK_NULL")]
    CheckNull,
}

/// A transform bound to the column it rewrites.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRule {
    pub column: String,
    #[serde(flatten)]
    pub transform: FieldTransform,
}

impl FieldRule {
    pub fn new(column: impl Into<String>, transform: FieldTransform) -> Self {
        Self {
            column: column.into(),
            transform,
        }
    }
}

/// A column that takes part in the comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderField {
    /// Trimmed column name.
    pub name: String,
    /// Position of the column in the raw rows.
    pub source_index: usize,
}

/// Ordered set of columns used for change detection and rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Header {
    fields: Vec<HeaderField>,
}

impl Header {
    /// Builds a header from a raw header row. Unnamed columns are dropped.
    /// When an allowlist is supplied only the listed columns survive, in
    /// their original order.
    pub fn from_raw(names: &[String], allowlist: Option<&[String]>) -> Self {
        let fields = names
            .iter()
            .enumerate()
            .map(|(source_index, name)| HeaderField {
                name: name.trim().to_string(),
                source_index,
            })
            .filter(|field| !field.name.is_empty())
            .filter(|field| match allowlist {
                Some(allowed) => allowed.iter().any(|name| *name == field.name),
                None => true,
            })
            .collect();
        Self { fields }
    }

    pub fn fields(&self) -> &[HeaderField] {
        &self.fields
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|field| field.name.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.iter().any(|field| field.name == name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// A single row keyed by the header's field names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    /// Row position in the source table, header excluded.
    pub source_index: usize,
    /// Padded composite key. Empty until the key normalizer assigns it.
    pub sort_key: String,
    values: IndexMap<String, String>,
}

impl Record {
    /// Creates a record whose field set must match the header exactly.
    pub fn new(
        header: &Header,
        source_index: usize,
        values: IndexMap<String, String>,
    ) -> Result<Self> {
        if let Some(missing) = header.names().find(|name| !values.contains_key(*name)) {
            return Err(ToolError::invalid_input(format!(
                "row {source_index} has no value for column '{missing}'"
            )));
        }
        if values.len() != header.len() {
            return Err(ToolError::invalid_input(format!(
                "row {source_index} carries columns outside the header"
            )));
        }
        Ok(Self {
            source_index,
            sort_key: String::new(),
            values,
        })
    }

    /// Returns the value stored under `name`, or an empty string when the
    /// record has no such field.
    pub fn value(&self, name: &str) -> &str {
        self.values.get(name).map(String::as_str).unwrap_or("")
    }

    pub fn values(&self) -> &IndexMap<String, String> {
        &self.values
    }

    /// Replaces the value of an existing field; unknown names are ignored.
    pub(crate) fn set_value(&mut self, name: &str, value: String) {
        if let Some(slot) = self.values.get_mut(name) {
            *slot = value;
        }
    }

    pub(crate) fn with_sort_key(mut self, sort_key: String) -> Self {
        self.sort_key = sort_key;
        self
    }
}

/// Classification of a diff entry. The declaration order is the order used
/// when a report groups entries by kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DiffKind {
    Unmodified,
    Added,
    Removed,
    Modified,
}

/// One classified outcome of the alignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum DiffEntry {
    /// Present on both sides with identical compared fields.
    Unmodified { key: String, record: Record },
    /// Present only in the "after" table.
    Added { key: String, record: Record },
    /// Present only in the "before" table.
    Removed { key: String, record: Record },
    /// Present on both sides with at least one differing field.
    Modified {
        key: String,
        before: Record,
        after: Record,
        #[serde(rename = "changedFields")]
        changed_fields: Vec<String>,
    },
}

impl DiffEntry {
    pub fn kind(&self) -> DiffKind {
        match self {
            DiffEntry::Unmodified { .. } => DiffKind::Unmodified,
            DiffEntry::Added { .. } => DiffKind::Added,
            DiffEntry::Removed { .. } => DiffKind::Removed,
            DiffEntry::Modified { .. } => DiffKind::Modified,
        }
    }

    pub fn key(&self) -> &str {
        match self {
            DiffEntry::Unmodified { key, .. }
            | DiffEntry::Added { key, .. }
            | DiffEntry::Removed { key, .. }
            | DiffEntry::Modified { key, .. } => key,
        }
    }

    /// Record contributed by the "before" table, if any.
    pub fn before(&self) -> Option<&Record> {
        match self {
            DiffEntry::Unmodified { record, .. } | DiffEntry::Removed { record, .. } => {
                Some(record)
            }
            DiffEntry::Modified { before, .. } => Some(before),
            DiffEntry::Added { .. } => None,
        }
    }

    /// Record contributed by the "after" table, if any.
    pub fn after(&self) -> Option<&Record> {
        match self {
            DiffEntry::Unmodified { record, .. } | DiffEntry::Added { record, .. } => Some(record),
            DiffEntry::Modified { after, .. } => Some(after),
            DiffEntry::Removed { .. } => None,
        }
    }

    /// Changed field names; empty for every kind but [`DiffKind::Modified`].
    pub fn changed_fields(&self) -> &[String] {
        match self {
            DiffEntry::Modified { changed_fields, .. } => changed_fields,
            _ => &[],
        }
    }
}

/// Raw tabular input: a header row and the data rows below it. Rows may be
/// shorter or longer than the header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(header: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { header, rows }
    }

    /// Splits the first row off as the header.
    pub fn from_rows(mut rows: Vec<Vec<String>>) -> Result<Self> {
        if rows.is_empty() {
            return Err(ToolError::invalid_input("table has no header row"));
        }
        let header = rows.remove(0);
        Ok(Self { header, rows })
    }

    /// Accepts a JSON array of arrays whose first element is the header row.
    /// Scalars are stringified and `null` becomes an empty cell.
    pub fn from_json(value: &Value) -> Result<Self> {
        let Value::Array(rows) = value else {
            return Err(ToolError::invalid_input("expected a list of rows"));
        };
        let rows = rows
            .iter()
            .enumerate()
            .map(|(row_idx, row)| match row {
                Value::Array(cells) => cells
                    .iter()
                    .enumerate()
                    .map(|(col_idx, cell)| json_cell_to_string(cell, row_idx, col_idx))
                    .collect::<Result<Vec<_>>>(),
                _ => Err(ToolError::invalid_input(format!(
                    "row {row_idx} is not a list of cells"
                ))),
            })
            .collect::<Result<Vec<_>>>()?;
        Self::from_rows(rows)
    }
}

fn json_cell_to_string(cell: &Value, row_idx: usize, col_idx: usize) -> Result<String> {
    match cell {
        Value::Null => Ok(String::new()),
        Value::String(value) => Ok(value.clone()),
        Value::Bool(value) => Ok(value.to_string()),
        Value::Number(value) => Ok(value.to_string()),
        Value::Array(_) | Value::Object(_) => Err(ToolError::invalid_input(format!(
            "cell {col_idx} of row {row_idx} is not a scalar"
        ))),
    }
}
