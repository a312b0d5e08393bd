//! Merge-by-key aggregation of normalized series.

use std::collections::{BTreeMap, BTreeSet};

use serde_json::Value;

use crate::normalize::NormalizedRecord;

/// One merged row: a distinct key plus the union of every series' fields.
/// Fields a series did not contribute are explicit null, never absent.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedRow {
    pub key: String,
    pub fields: BTreeMap<String, Value>,
}

impl MergedRow {
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }
}

/// Merges normalized series on a shared key field into one row per
/// distinct key, ordered by key ascending.
///
/// Key comparison is exact equality on the stringified key value; no fuzzy
/// date matching. Records lacking the key field contribute no row. When two
/// series share a non-key field name, the later series wins. Output is
/// deterministic, so merging the same inputs twice yields identical rows.
pub fn merge(series_list: &[Vec<NormalizedRecord>], key_field: &str) -> Vec<MergedRow> {
    let mut all_fields: BTreeSet<String> = BTreeSet::new();
    for series in series_list {
        for rec in series {
            for name in rec.field_names() {
                if name != key_field {
                    all_fields.insert(name.to_string());
                }
            }
        }
    }

    let mut rows: BTreeMap<String, BTreeMap<String, Value>> = BTreeMap::new();
    for series in series_list {
        for rec in series {
            let Some(key) = rec.key_text(key_field) else {
                tracing::warn!(key_field, "record without merge key skipped");
                continue;
            };
            let row = rows.entry(key).or_insert_with(|| {
                all_fields
                    .iter()
                    .map(|f| (f.clone(), Value::Null))
                    .collect()
            });
            for (name, value) in rec.fields() {
                if name == key_field {
                    continue;
                }
                row.insert(name.to_string(), value.clone());
            }
        }
    }

    rows.into_iter()
        .map(|(key, fields)| MergedRow { key, fields })
        .collect()
}
