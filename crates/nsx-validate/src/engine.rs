//! Recursive validation and coercion of property trees

use std::net::IpAddr;

use ipnet::IpNet;
use log::trace;
use serde_json::{Number, Value};

use nsx_core::{Properties, ValidationError};

use crate::schema::{FieldKind, FieldRule, Schema};

/// Validate `properties` against `schema`
///
/// Returns a copy with defaults filled in and values coerced to their
/// declared kinds. With `use_existing` the object is bound to a remote
/// resource that already exists, so missing required fields are tolerated.
/// Fields the schema does not name are passed through untouched.
pub fn validate(
    properties: &Properties,
    schema: &Schema,
    use_existing: bool,
) -> Result<Properties, ValidationError> {
    validate_at("", properties, schema, use_existing)
}

fn validate_at(
    prefix: &str,
    properties: &Properties,
    schema: &Schema,
    use_existing: bool,
) -> Result<Properties, ValidationError> {
    let mut result = properties.clone();

    for (name, rule) in schema.iter() {
        let path = if prefix.is_empty() {
            name.clone()
        } else {
            format!("{}.{}", prefix, name)
        };

        let value = match result.remove(name).filter(|v| !v.is_null()) {
            Some(value) => value,
            None => match &rule.default {
                Some(default) => default.clone(),
                None => {
                    if rule.required && !use_existing {
                        return Err(ValidationError::MissingField { path });
                    }
                    if rule.set_none {
                        result.insert(name.clone(), Value::Null);
                    }
                    continue;
                }
            },
        };

        let value = check_field(&path, value, rule, use_existing)?;
        trace!("{} = {}", path, value);
        result.insert(name.clone(), value);
    }

    Ok(result)
}

fn check_field(
    path: &str,
    value: Value,
    rule: &FieldRule,
    use_existing: bool,
) -> Result<Value, ValidationError> {
    let value = coerce(path, value, rule.kind)?;
    let value = check_allowed(path, value, rule)?;

    let Some(sub_schema) = &rule.sub_schema else {
        return Ok(value);
    };

    match value {
        Value::Object(object) => Ok(Value::Object(validate_at(
            path,
            &object,
            sub_schema,
            use_existing,
        )?)),
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(index, item)| {
                let item_path = format!("{}[{}]", path, index);
                match item {
                    Value::Object(object) => Ok(Value::Object(validate_at(
                        &item_path,
                        &object,
                        sub_schema,
                        use_existing,
                    )?)),
                    other => Err(invalid(&item_path, &other, "expected a dictionary")),
                }
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        other => Err(invalid(path, &other, "expected a dictionary or a list")),
    }
}

fn invalid(path: &str, value: &Value, reason: &str) -> ValidationError {
    ValidationError::InvalidValue {
        path: path.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn coerce(path: &str, value: Value, kind: FieldKind) -> Result<Value, ValidationError> {
    match kind {
        FieldKind::Any => Ok(value),
        FieldKind::String => match value {
            Value::String(_) => Ok(value),
            Value::Number(n) => Ok(Value::String(n.to_string())),
            Value::Bool(b) => Ok(Value::String(b.to_string())),
            other => Err(invalid(path, &other, "expected a string")),
        },
        FieldKind::Boolean => match &value {
            Value::Bool(_) => Ok(value),
            Value::Number(n) => Ok(Value::Bool(n.as_f64().map_or(false, |f| f != 0.0))),
            Value::String(s) => match s.trim().to_lowercase().as_str() {
                "true" | "yes" | "on" | "1" => Ok(Value::Bool(true)),
                "false" | "no" | "off" | "0" => Ok(Value::Bool(false)),
                _ => Err(invalid(path, &value, "expected a boolean")),
            },
            _ => Err(invalid(path, &value, "expected a boolean")),
        },
        FieldKind::Integer => match &value {
            Value::Number(n) if n.is_i64() => Ok(value),
            Value::Number(n) => match n.as_f64() {
                Some(f) if f.fract() != 0.0 => Err(invalid(path, &value, "expected an integer")),
                // i64::MAX as f64 rounds up to 2^63, which is already out of range
                Some(f) if f >= i64::MIN as f64 && f < i64::MAX as f64 => {
                    Ok(Value::Number(Number::from(f as i64)))
                }
                _ => Err(invalid(path, &value, "integer out of range")),
            },
            Value::String(s) => s
                .trim()
                .parse::<i64>()
                .map(|i| Value::Number(Number::from(i)))
                .map_err(|_| invalid(path, &value, "expected an integer")),
            _ => Err(invalid(path, &value, "expected an integer")),
        },
        FieldKind::List => match value {
            Value::Array(_) => Ok(value),
            other => Ok(Value::Array(vec![other])),
        },
        FieldKind::Dict => match value {
            Value::Object(_) => Ok(value),
            other => Err(invalid(path, &other, "expected a dictionary")),
        },
        FieldKind::Ip => match &value {
            Value::String(s) if s.trim().parse::<IpAddr>().is_ok() => {
                Ok(Value::String(s.trim().to_string()))
            }
            _ => Err(invalid(path, &value, "expected an IP address")),
        },
        FieldKind::Cidr => match &value {
            Value::String(s) if s.trim().parse::<IpNet>().is_ok() => {
                Ok(Value::String(s.trim().to_string()))
            }
            _ => Err(invalid(path, &value, "expected a network in address/prefix form")),
        },
    }
}

fn check_allowed(path: &str, value: Value, rule: &FieldRule) -> Result<Value, ValidationError> {
    let Some(allowed) = &rule.values else {
        return Ok(value);
    };

    let text = match &value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };

    let matched = allowed.iter().find(|candidate| {
        if rule.case_sensitive {
            **candidate == text
        } else {
            candidate.eq_ignore_ascii_case(&text)
        }
    });

    match matched {
        Some(canonical) if value.is_string() => Ok(Value::String(canonical.clone())),
        Some(_) => Ok(value),
        None => Err(ValidationError::NotAllowed {
            path: path.to_string(),
            value: text,
            allowed: allowed.join(", "),
        }),
    }
}
