//! Normalisation of NSX response bodies
//!
//! The manager renders XML as JSON: a repeated element is missing when there
//! are none, a bare object when there is exactly one and an array otherwise.
//! Empty wrappers come back as `null` or `""`. Everything that walks such a
//! body goes through these helpers.

use serde_json::{Map, Value};

/// Elements of a repeated NSX element as a list
pub fn as_list(value: Option<&Value>) -> Vec<Value> {
    match value {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::String(s)) if s.is_empty() => Vec::new(),
        Some(Value::Array(items)) => items.clone(),
        Some(other) => vec![other.clone()],
    }
}

fn into_list(value: Value) -> Vec<Value> {
    match value {
        Value::Null => Vec::new(),
        Value::String(s) if s.is_empty() => Vec::new(),
        Value::Array(items) => items,
        other => vec![other],
    }
}

/// Make `value` an object, replacing `null`, `""` or any scalar
pub fn ensure_object(value: &mut Value) -> &mut Map<String, Value> {
    if !value.is_object() {
        *value = Value::Object(Map::new());
    }
    match value {
        Value::Object(map) => map,
        _ => unreachable!("value was just replaced by an object"),
    }
}

/// Normalise `object[key]` in place to an array and return it
pub fn struct_get_list<'a>(object: &'a mut Value, key: &str) -> &'a mut Vec<Value> {
    let entry = ensure_object(object)
        .entry(key.to_string())
        .or_insert(Value::Null);
    let items = into_list(entry.take());
    *entry = Value::Array(items);
    match entry {
        Value::Array(items) => items,
        _ => unreachable!("entry was just replaced by an array"),
    }
}

/// Walk wrapper objects and normalise the final key to an array
///
/// `nested_list(bgp, &["bgpNeighbours", "bgpNeighbour"])` returns the
/// neighbour list, creating the wrapper when it is missing.
pub fn nested_list<'a>(object: &'a mut Value, keys: &[&str]) -> &'a mut Vec<Value> {
    match keys.split_last() {
        None => struct_get_list(object, ""),
        Some((last, wrappers)) => {
            let mut current = object;
            for key in wrappers {
                current = ensure_object(current)
                    .entry(key.to_string())
                    .or_insert(Value::Null);
            }
            struct_get_list(current, last)
        }
    }
}

/// Look up a `/`-separated path in a body
pub fn lookup_path<'a>(body: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('/')
        .filter(|segment| !segment.is_empty())
        .try_fold(body, |current, segment| current.as_object()?.get(segment))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_as_list_shapes() {
        assert!(as_list(None).is_empty());
        assert!(as_list(Some(&Value::Null)).is_empty());
        assert!(as_list(Some(&json!(""))).is_empty());
        assert_eq!(as_list(Some(&json!({"a": 1}))), vec![json!({"a": 1})]);
        assert_eq!(
            as_list(Some(&json!([{"a": 1}, {"a": 2}]))),
            vec![json!({"a": 1}), json!({"a": 2})]
        );
    }

    #[test]
    fn test_struct_get_list_singleton() {
        let mut body = json!({"natRule": {"ruleId": "1"}});
        let rules = struct_get_list(&mut body, "natRule");
        assert_eq!(rules.len(), 1);
        rules.push(json!({"ruleId": "2"}));
        assert_eq!(body["natRule"], json!([{"ruleId": "1"}, {"ruleId": "2"}]));
    }

    #[test]
    fn test_struct_get_list_missing_and_empty_wrapper() {
        let mut body = Value::String(String::new());
        assert!(struct_get_list(&mut body, "member").is_empty());
        assert_eq!(body, json!({"member": []}));
    }

    #[test]
    fn test_nested_list_creates_wrappers() {
        let mut bgp = json!({"enabled": true, "bgpNeighbours": null});
        nested_list(&mut bgp, &["bgpNeighbours", "bgpNeighbour"]).push(json!({"ipAddress": "10.0.0.1"}));
        assert_eq!(
            bgp["bgpNeighbours"]["bgpNeighbour"],
            json!([{"ipAddress": "10.0.0.1"}])
        );
    }

    #[test]
    fn test_lookup_path() {
        let body = json!({"routing": {"bgp": {"localAS": 65000}}});
        assert_eq!(lookup_path(&body, "routing/bgp/localAS"), Some(&json!(65000)));
        assert_eq!(lookup_path(&body, "routing/ospf"), None);
        assert_eq!(lookup_path(&body, ""), Some(&body));
    }
}
