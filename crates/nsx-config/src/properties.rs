//! Layering of node, runtime and call-time properties

use log::{debug, warn};
use serde_json::Value;

use nsx_core::{Properties, ValidationError};
use nsx_validate::{validate, Schema};

use crate::context::{NodeContext, RESOURCE_ID, USE_EXTERNAL_RESOURCE};

const SECRET_MARKERS: [&str; 2] = ["password", "secret"];

/// Overlay the top-level keys of each object layer, later layers win
pub(crate) fn merge_layers(name: &str, layers: &[Option<&Value>]) -> Properties {
    let mut merged = Properties::new();
    for layer in layers.iter().flatten() {
        match layer {
            Value::Object(object) => {
                for (key, value) in object {
                    merged.insert(key.clone(), value.clone());
                }
            }
            Value::Null => {}
            other => warn!("Ignoring non-dictionary value for '{}': {}", name, other),
        }
    }
    merged
}

/// Properties of `name` merged from the three sources
///
/// Static node properties are overlaid by runtime properties persisted by a
/// previous step, which are overlaid by the properties passed to this call.
pub fn get_properties(ctx: &NodeContext, name: &str, kwargs: &Properties) -> Properties {
    merge_layers(
        name,
        &[
            ctx.properties.get(name),
            ctx.runtime_properties.get(name),
            kwargs.get(name),
        ],
    )
}

fn flag_value(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "yes" | "1" => Some(true),
            "false" | "no" | "0" | "" => Some(false),
            _ => None,
        },
        Value::Number(n) => n.as_i64().map(|i| i != 0),
        _ => None,
    }
}

/// Whether the node binds to an existing remote object
///
/// The first of call-time, runtime and node properties defining the flag
/// decides; the default is to create the object.
pub fn use_external_resource(ctx: &NodeContext, kwargs: &Properties) -> bool {
    [
        kwargs.get(USE_EXTERNAL_RESOURCE),
        ctx.runtime_properties.get(USE_EXTERNAL_RESOURCE),
        ctx.properties.get(USE_EXTERNAL_RESOURCE),
    ]
    .into_iter()
    .flatten()
    .find_map(flag_value)
    .unwrap_or(false)
}

/// Id of the pre-existing remote object named in the call or the node
pub fn external_resource_id(ctx: &NodeContext, kwargs: &Properties) -> Option<String> {
    [kwargs.get(RESOURCE_ID), ctx.properties.get(RESOURCE_ID)]
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
        .find(|id| !id.is_empty())
        .map(str::to_string)
}

/// Copy of `properties` with secret values replaced
pub fn mask_secrets(properties: &Properties) -> Value {
    fn mask(value: &Value) -> Value {
        match value {
            Value::Object(object) => Value::Object(
                object
                    .iter()
                    .map(|(key, value)| {
                        let lower = key.to_lowercase();
                        if SECRET_MARKERS.iter().any(|m| lower.contains(m)) && !value.is_null() {
                            (key.clone(), Value::String("********".to_string()))
                        } else {
                            (key.clone(), mask(value))
                        }
                    })
                    .collect(),
            ),
            Value::Array(items) => Value::Array(items.iter().map(mask).collect()),
            other => other.clone(),
        }
    }
    mask(&Value::Object(properties.clone()))
}

/// Merge the properties of `name` and validate them against `schema`
///
/// Returns the resolved `use_external_resource` flag with the validated
/// properties.
pub fn get_properties_and_validate(
    ctx: &NodeContext,
    name: &str,
    kwargs: &Properties,
    schema: &Schema,
) -> Result<(bool, Properties), ValidationError> {
    let properties = get_properties(ctx, name, kwargs);
    let use_existing = use_external_resource(ctx, kwargs);

    debug!(
        "checking {} (use_external_resource={}): {}",
        name,
        use_existing,
        mask_secrets(&properties)
    );

    let validated = validate(&properties, schema, use_existing)?;
    Ok((use_existing, validated))
}

/// Validated properties together with the already persisted resource id
#[derive(Debug, Clone, PartialEq)]
pub struct PropertiesUpdate {
    pub use_existing: bool,
    pub resource_id: Option<String>,
    pub properties: Properties,
}

pub fn get_properties_update(
    ctx: &NodeContext,
    name: &str,
    kwargs: &Properties,
    schema: &Schema,
) -> Result<PropertiesUpdate, ValidationError> {
    let (use_existing, properties) = get_properties_and_validate(ctx, name, kwargs, schema)?;
    Ok(PropertiesUpdate {
        use_existing,
        resource_id: ctx.resource_id().map(str::to_string),
        properties,
    })
}

/// Forget runtime state after the remote object is gone
pub fn remove_properties(ctx: &mut NodeContext, names: &[&str]) {
    for name in names
        .iter()
        .copied()
        .chain([RESOURCE_ID, USE_EXTERNAL_RESOURCE])
    {
        if ctx.runtime_properties.remove(name).is_some() {
            debug!("{}: removed runtime property {}", ctx.node_id, name);
        }
    }
}
