use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// URI template parameters of a session call (`edgeId`, `objectId`, ...)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UriParameters(BTreeMap<String, String>);

impl UriParameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    pub fn edge(edge_id: &str) -> Self {
        Self::new().with("edgeId", edge_id)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn insert(&mut self, key: &str, value: impl Into<String>) {
        self.0.insert(key.to_string(), value.into());
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Result of a session call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionResponse {
    pub status: u16,
    #[serde(default)]
    pub body: Value,
    #[serde(default, rename = "objectId")]
    pub object_id: Option<String>,
}

impl SessionResponse {
    pub fn new(status: u16, body: Value) -> Self {
        Self {
            status,
            body,
            object_id: None,
        }
    }

    pub fn ok(body: Value) -> Self {
        Self::new(200, body)
    }

    pub fn created(object_id: impl Into<String>) -> Self {
        Self {
            status: 201,
            body: Value::Null,
            object_id: Some(object_id.into()),
        }
    }

    pub fn no_content() -> Self {
        Self::new(204, Value::Null)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
