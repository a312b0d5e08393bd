//! Record normalization: heterogeneous raw items to canonical flat records.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveTime};
use serde_json::Value;

use crate::paginate::Page;

/// A canonical flat record: field name to scalar value.
///
/// The field set is whatever the source provided, plus the synthesized
/// additions (`lon`/`lat`, `date`, `time_utc`). Unknown fields are never
/// dropped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedRecord {
    fields: BTreeMap<String, Value>,
}

impl NormalizedRecord {
    pub fn new() -> Self {
        NormalizedRecord::default()
    }

    pub fn set(&mut self, field: &str, value: Value) {
        self.fields.insert(field.to_string(), value);
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The field's value as merge-key text. `None` for null, missing, or
    /// non-scalar values.
    pub fn key_text(&self, field: &str) -> Option<String> {
        match self.fields.get(field)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    fn int_field(&self, name: &str) -> Option<i64> {
        let (_, value) = self
            .fields
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))?;
        match value {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

/// Normalizes one page of raw items. The page itself is left untouched.
pub fn normalize_page(page: &Page) -> Vec<NormalizedRecord> {
    page.items.iter().map(normalize_item).collect()
}

/// Normalizes a single raw item.
///
/// A nested `attributes` object is flattened into the top-level field set;
/// items that are already flat pass through as-is. A geometry sub-object
/// with numeric `x`/`y` projects into `lon`/`lat`. Separate year/month/day
/// integer fields synthesize a composite `date`, null when the three parts
/// do not form a valid calendar date. An ISO date string paired with an
/// `HHMM` clock field composes a `time_utc` timestamp.
pub fn normalize_item(raw: &Value) -> NormalizedRecord {
    let mut rec = NormalizedRecord::new();
    let Some(obj) = raw.as_object() else {
        return rec;
    };

    match obj.get("attributes").and_then(Value::as_object) {
        Some(attrs) => {
            for (key, value) in attrs {
                rec.set(key, value.clone());
            }
        }
        None => {
            for (key, value) in obj {
                if key == "geometry" {
                    continue;
                }
                rec.set(key, value.clone());
            }
        }
    }

    if let Some(geom) = obj.get("geometry").and_then(Value::as_object) {
        if let (Some(x), Some(y)) = (
            geom.get("x").and_then(Value::as_f64),
            geom.get("y").and_then(Value::as_f64),
        ) {
            rec.set("lon", Value::from(x));
            rec.set("lat", Value::from(y));
        }
    }

    synthesize_date(&mut rec);
    compose_timestamp(&mut rec);
    rec
}

/// Builds `date` from year/month/day fields when all three are present.
fn synthesize_date(rec: &mut NormalizedRecord) {
    let parts = (
        rec.int_field("year"),
        rec.int_field("month"),
        rec.int_field("day"),
    );
    let (year, month, day) = match parts {
        (Some(y), Some(m), Some(d)) => (y, m, d),
        _ => return,
    };

    let date = i32::try_from(year)
        .ok()
        .zip(u32::try_from(month).ok())
        .zip(u32::try_from(day).ok())
        .and_then(|((y, m), d)| NaiveDate::from_ymd_opt(y, m, d));

    rec.set(
        "date",
        match date {
            Some(d) => Value::String(d.format("%Y-%m-%d").to_string()),
            None => Value::Null,
        },
    );
}

/// Builds `time_utc` from an `acq_date` ISO date plus an `acq_time` HHMM
/// clock, the shape satellite feeds use.
fn compose_timestamp(rec: &mut NormalizedRecord) {
    let clock = match rec.get("acq_time") {
        Some(Value::String(s)) => format!("{:0>4}", s.trim()),
        Some(Value::Number(n)) => match n.as_u64() {
            Some(n) if n <= 2359 => format!("{:04}", n),
            _ => return,
        },
        _ => return,
    };
    let Some(Value::String(date)) = rec.get("acq_date") else {
        return;
    };

    let stamp = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .ok()
        .zip(NaiveTime::parse_from_str(&clock, "%H%M").ok())
        .map(|(d, t)| d.and_time(t));

    rec.set(
        "time_utc",
        match stamp {
            Some(dt) => Value::String(dt.format("%Y-%m-%d %H:%M").to_string()),
            None => Value::Null,
        },
    );
}
