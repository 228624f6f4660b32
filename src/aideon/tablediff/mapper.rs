use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::aideon::tablediff::error::Result;
use crate::aideon::tablediff::key::{KeyLengths, KeySelection, compose_key};
use crate::aideon::tablediff::model::{FieldRule, Header, RawTable, Record};

/// A record together with its unpadded key parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedRecord {
    pub record: Record,
    pub key_parts: Vec<String>,
}

/// One table after trimming, filtering and transformation. Records keep their
/// source order; they are padded and sorted only once the key lengths of
/// both tables are known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedSheet {
    pub header: Header,
    pub records: Vec<MappedRecord>,
    pub key_lengths: KeyLengths,
}

/// Converts raw rows into records restricted to `header`, applying `rules` in
/// declaration order and extracting key parts according to `keys`.
pub fn map_sheet(
    table: &RawTable,
    header: Header,
    rules: &[FieldRule],
    keys: &KeySelection,
) -> Result<MappedSheet> {
    let rules: Vec<&FieldRule> = rules
        .iter()
        .filter(|rule| {
            let known = header.contains(&rule.column);
            if !known {
                warn!(column = %rule.column, "transform targets a column outside the compared header, skipping");
            }
            known
        })
        .collect();

    let mut records = Vec::with_capacity(table.rows.len());
    for (source_index, row) in table.rows.iter().enumerate() {
        let values: IndexMap<String, String> = header
            .fields()
            .iter()
            .map(|field| {
                let value = row
                    .get(field.source_index)
                    .map(|cell| cell.trim().to_string())
                    .unwrap_or_default();
                (field.name.clone(), value)
            })
            .collect();
        let mut record = Record::new(&header, source_index, values)?;

        for rule in &rules {
            let rewritten = rule.transform.apply(record.value(&rule.column));
            record.set_value(&rule.column, rewritten);
        }

        let key_parts = keys.parts(&record);
        records.push(MappedRecord { record, key_parts });
    }

    let key_lengths = KeyLengths::measure(
        keys.width(),
        records.iter().map(|mapped| mapped.key_parts.as_slice()),
    );
    debug!(
        record_count = records.len(),
        column_count = header.len(),
        "mapped table rows"
    );

    Ok(MappedSheet {
        header,
        records,
        key_lengths,
    })
}

/// Assigns padded sort keys and returns the records in ascending key order.
/// The sort is stable, so records sharing a key keep their source order.
pub fn index_records(records: Vec<MappedRecord>, lengths: &KeyLengths) -> Vec<Record> {
    let mut indexed: Vec<Record> = records
        .into_iter()
        .map(|mapped| {
            let key = compose_key(&mapped.key_parts, lengths);
            mapped.record.with_sort_key(key)
        })
        .collect();
    indexed.sort_by(|lhs, rhs| lhs.sort_key.cmp(&rhs.sort_key));
    indexed
}
