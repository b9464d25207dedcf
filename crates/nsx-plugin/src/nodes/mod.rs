//! Node type implementations

pub mod edge;
pub mod logical_switch;
pub mod routing;
pub mod security;

use serde_json::{json, Value};

use nsx_core::{NsxResult, Properties, ValidationError};

/// Remove `field` from `properties` and return it as text
pub(crate) fn take_text(properties: &mut Properties, field: &str) -> NsxResult<String> {
    let text = match properties.remove(field) {
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    };
    if text.is_empty() {
        return Err(ValidationError::MissingField {
            path: field.to_string(),
        }
        .into());
    }
    Ok(text)
}

/// Text field of validated properties, empty when absent
pub(crate) fn text<'a>(properties: &'a Properties, field: &str) -> &'a str {
    properties
        .get(field)
        .and_then(Value::as_str)
        .unwrap_or_default()
}

/// Split the target edge id off the properties of an edge-scoped node
pub(crate) fn split_edge(properties: &Properties) -> NsxResult<(String, Properties)> {
    let mut rest = properties.clone();
    let edge_id = take_text(&mut rest, "edgeId")?;
    Ok((edge_id, rest))
}

/// Fold flat `primaryAddress`/`subnetMask` into NSX `addressGroups`
pub(crate) fn address_groups(properties: &mut Properties) {
    let primary = properties.remove("primaryAddress");
    let mask = properties.remove("subnetMask");
    if let Some(primary) = primary.filter(|v| !v.is_null()) {
        let mut group = json!({ "primaryAddress": primary });
        if let Some(mask) = mask.filter(|v| !v.is_null()) {
            group["subnetMask"] = mask;
        }
        properties.insert(
            "addressGroups".to_string(),
            json!({ "addressGroup": group }),
        );
    }
}
