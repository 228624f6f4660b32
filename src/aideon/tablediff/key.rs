//! Composite sort keys.
//!
//! Key parts are left-padded to the longest value seen for the same key field
//! across *both* tables before they are joined, so that plain string ordering
//! agrees between the two sides (`" 9" < "10"`). Padding each table on its own
//! would misalign records whose keys differ in width.

use crate::aideon::tablediff::model::{Header, Record};
use tracing::warn;

/// Separator placed between padded key parts.
pub const KEY_DELIMITER: char = ';';
/// Character used to left-pad key parts.
pub const KEY_PAD: char = ' ';

/// Which values make up a record's identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeySelection {
    /// Named key fields, in declaration order.
    Fields(Vec<String>),
    /// The record's row position in its source table.
    RowIndex,
}

impl KeySelection {
    /// Resolves the configured key fields against both effective headers.
    /// Falls back to positional keying when no keys are configured or when
    /// any key field is missing on either side.
    pub fn resolve(keys: &[String], before: &Header, after: &Header) -> Self {
        if keys.is_empty() {
            return KeySelection::RowIndex;
        }
        if let Some(missing) = keys
            .iter()
            .find(|key| !before.contains(key) || !after.contains(key))
        {
            warn!(
                key = %missing,
                "key field missing from compared columns, falling back to row order"
            );
            return KeySelection::RowIndex;
        }
        KeySelection::Fields(keys.to_vec())
    }

    /// Number of key parts each record carries.
    pub fn width(&self) -> usize {
        match self {
            KeySelection::Fields(fields) => fields.len(),
            KeySelection::RowIndex => 1,
        }
    }

    /// Unpadded key parts for a record.
    pub fn parts(&self, record: &Record) -> Vec<String> {
        match self {
            KeySelection::Fields(fields) => fields
                .iter()
                .map(|field| record.value(field).to_string())
                .collect(),
            KeySelection::RowIndex => vec![record.source_index.to_string()],
        }
    }
}

/// Maximum char length per key part.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyLengths(Vec<usize>);

impl KeyLengths {
    /// Measures the longest value for each of the `width` key parts.
    pub fn measure<'a, I>(width: usize, parts: I) -> Self
    where
        I: IntoIterator<Item = &'a [String]>,
    {
        let mut lengths = vec![0; width];
        for record_parts in parts {
            for (slot, part) in lengths.iter_mut().zip(record_parts) {
                *slot = (*slot).max(part.chars().count());
            }
        }
        Self(lengths)
    }

    /// Per-position maximum of two tables' lengths.
    pub fn union(&self, other: &Self) -> Self {
        let width = self.0.len().max(other.0.len());
        let lengths = (0..width)
            .map(|idx| {
                let lhs = self.0.get(idx).copied().unwrap_or(0);
                let rhs = other.0.get(idx).copied().unwrap_or(0);
                lhs.max(rhs)
            })
            .collect();
        Self(lengths)
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }
}

impl From<Vec<usize>> for KeyLengths {
    fn from(lengths: Vec<usize>) -> Self {
        Self(lengths)
    }
}

/// Pads every part to its recorded length and joins them.
pub fn compose_key(parts: &[String], lengths: &KeyLengths) -> String {
    let mut key = String::new();
    for (idx, part) in parts.iter().enumerate() {
        if idx > 0 {
            key.push(KEY_DELIMITER);
        }
        let width = lengths.as_slice().get(idx).copied().unwrap_or(0);
        let pad = width.saturating_sub(part.chars().count());
        key.extend(std::iter::repeat_n(KEY_PAD, pad));
        key.push_str(part);
    }
    key
}
