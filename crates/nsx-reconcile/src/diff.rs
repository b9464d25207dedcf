//! Minimal diff between requested properties and live NSX objects
//!
//! NSX renders every XML leaf as text, so `65001`, `"65001"` and `true`,
//! `"true"` must compare equal. Missing, `null` and empty values are one
//! and the same.

use serde_json::{Map, Value};

use nsx_core::{ensure_object, Properties};

fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        _ => false,
    }
}

pub(crate) fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Equality modulo the text rendering of scalars and singleton lists
pub fn loose_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Object(a), Value::Object(b)) => {
            a.keys()
                .chain(b.keys())
                .all(|key| match (a.get(key), b.get(key)) {
                    (x, y) if is_blank(x) && is_blank(y) => true,
                    (Some(x), Some(y)) => loose_eq(x, y),
                    _ => false,
                })
        }
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| loose_eq(x, y))
        }
        (Value::Array(items), single) | (single, Value::Array(items)) if items.len() == 1 => {
            loose_eq(&items[0], single)
        }
        _ => match (scalar_text(a), scalar_text(b)) {
            (Some(x), Some(y)) => x == y,
            _ => a.is_null() && b.is_null(),
        },
    }
}

/// Whether every non-blank requested field is already present in `entry`
pub fn subset_matches(entry: &Value, desired: &Properties) -> bool {
    desired.iter().all(|(key, wanted)| {
        if is_blank(Some(wanted)) {
            return true;
        }
        match (entry.get(key), wanted) {
            (Some(current), Value::Object(wanted)) if current.is_object() => {
                subset_matches(current, wanted)
            }
            (Some(current), wanted) => loose_eq(current, wanted),
            (None, _) => false,
        }
    })
}

/// Whether `entry` equals `desired` once the manager-assigned `ignored`
/// fields are dropped
///
/// Unlike `subset_matches`, a field missing from `desired` must be blank on
/// `entry` as well.
pub fn identical_entry(entry: &Value, desired: &Properties, ignored: &[&str]) -> bool {
    let Value::Object(entry) = entry else {
        return false;
    };
    let live: Map<String, Value> = entry
        .iter()
        .filter(|(key, _)| !ignored.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();
    loose_eq(&Value::Object(live), &compact(desired))
}

/// Whether `entry` and `desired` agree on every key field
pub fn same_key(entry: &Value, desired: &Properties, fields: &[&str]) -> bool {
    fields.iter().all(|field| {
        let current = entry.get(*field);
        let wanted = desired.get(*field);
        match (current, wanted) {
            (x, y) if is_blank(x) && is_blank(y) => true,
            (Some(x), Some(y)) => loose_eq(x, y),
            _ => false,
        }
    })
}

/// Apply requested fields onto `current`, returning whether it changed
///
/// Blank requested values are skipped; nested dictionaries are merged
/// field by field.
pub fn merge_fields(current: &mut Value, desired: &Properties) -> bool {
    let target = ensure_object(current);
    let mut changed = false;

    for (key, wanted) in desired {
        if is_blank(Some(wanted)) {
            continue;
        }
        let up_to_date = match (target.get_mut(key), wanted) {
            (Some(existing), Value::Object(nested)) if existing.is_object() => {
                changed |= merge_fields(existing, nested);
                true
            }
            (Some(existing), wanted) => loose_eq(existing, wanted),
            (None, _) => false,
        };
        if !up_to_date {
            target.insert(key.clone(), wanted.clone());
            changed = true;
        }
    }

    changed
}

/// Subset of `properties` restricted to `fields`, dropping blank values
pub fn pick(properties: &Properties, fields: &[&str]) -> Properties {
    fields
        .iter()
        .filter_map(|field| {
            properties
                .get(*field)
                .filter(|value| !is_blank(Some(value)))
                .map(|value| (field.to_string(), value.clone()))
        })
        .collect::<Map<String, Value>>()
}

/// Field rendered as text for composite ids; blank when absent
pub fn field_text(properties: &Properties, field: &str) -> String {
    match properties.get(field) {
        Some(value) => scalar_text(value).unwrap_or_default(),
        None => String::new(),
    }
}

/// Properties as a JSON object without `null` values
pub fn compact(properties: &Properties) -> Value {
    Value::Object(
        properties
            .iter()
            .filter(|(_, value)| !value.is_null())
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect(),
    )
}
