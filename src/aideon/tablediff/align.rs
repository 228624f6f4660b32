//! Linear merge of two key-sorted record sequences.
//!
//! Both inputs must be sorted ascending by `sort_key`. The merge advances at
//! least one cursor per step and never backtracks, so it performs at most
//! `before.len() + after.len()` steps. Records sharing a key on the same side
//! are paired positionally with their counterparts on the other side.

use std::cmp::Ordering;

use tracing::debug;

use crate::aideon::tablediff::model::{DiffEntry, Header, Record};

enum Step {
    Added,
    Removed,
    Matched,
}

/// Aligns `before` and `after`, emitting one entry per removed, added, or
/// key-matched record in merged key order.
pub fn align(
    before: Vec<Record>,
    after: Vec<Record>,
    header: &Header,
    ignore_fields: &[String],
) -> Vec<DiffEntry> {
    debug!(
        before_count = before.len(),
        after_count = after.len(),
        before_duplicate_keys = duplicate_keys(&before),
        after_duplicate_keys = duplicate_keys(&after),
        "aligning sorted records"
    );

    let mut entries = Vec::with_capacity(before.len().max(after.len()));
    let mut left = before.into_iter().peekable();
    let mut right = after.into_iter().peekable();

    loop {
        let step = match (left.peek(), right.peek()) {
            (None, None) => break,
            (None, Some(_)) => Step::Added,
            (Some(_), None) => Step::Removed,
            (Some(lhs), Some(rhs)) => match rhs.sort_key.cmp(&lhs.sort_key) {
                Ordering::Greater => Step::Removed,
                Ordering::Less => Step::Added,
                Ordering::Equal => Step::Matched,
            },
        };

        match step {
            Step::Added => {
                if let Some(record) = right.next() {
                    entries.push(DiffEntry::Added {
                        key: record.sort_key.clone(),
                        record,
                    });
                }
            }
            Step::Removed => {
                if let Some(record) = left.next() {
                    entries.push(DiffEntry::Removed {
                        key: record.sort_key.clone(),
                        record,
                    });
                }
            }
            Step::Matched => {
                if let (Some(lhs), Some(rhs)) = (left.next(), right.next()) {
                    entries.push(classify(lhs, rhs, header, ignore_fields));
                }
            }
        }
    }

    entries
}

/// Classifies a key-matched pair as unmodified or modified.
pub fn classify(
    before: Record,
    after: Record,
    header: &Header,
    ignore_fields: &[String],
) -> DiffEntry {
    let changed_fields = changed_fields(&before, &after, header, ignore_fields);
    let key = before.sort_key.clone();
    if changed_fields.is_empty() {
        DiffEntry::Unmodified {
            key,
            record: before,
        }
    } else {
        DiffEntry::Modified {
            key,
            before,
            after,
            changed_fields,
        }
    }
}

/// Names of the header fields whose values differ, in header order. Ignored
/// fields never count as changed; missing values compare as empty strings.
pub fn changed_fields(
    before: &Record,
    after: &Record,
    header: &Header,
    ignore_fields: &[String],
) -> Vec<String> {
    header
        .names()
        .filter(|name| !ignore_fields.iter().any(|ignored| ignored == name))
        .filter(|name| before.value(name) != after.value(name))
        .map(str::to_string)
        .collect()
}

fn duplicate_keys(records: &[Record]) -> usize {
    records
        .windows(2)
        .filter(|pair| pair[0].sort_key == pair[1].sort_key)
        .count()
}
