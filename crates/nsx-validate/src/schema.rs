//! Validation schema types

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Expected shape of a field; values are coerced into it
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    #[default]
    Any,
    String,
    Boolean,
    Integer,
    List,
    Dict,
    /// IPv4 or IPv6 address without prefix length
    Ip,
    /// Network in `address/prefix` notation
    Cidr,
}

/// Rule for one field of a property dictionary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldRule {
    pub required: bool,
    pub default: Option<Value>,
    pub set_none: bool,
    #[serde(rename = "type")]
    pub kind: FieldKind,
    pub values: Option<Vec<String>>,
    pub case_sensitive: bool,
    #[serde(rename = "sub_struct")]
    pub sub_schema: Option<Schema>,
}

impl Default for FieldRule {
    fn default() -> Self {
        Self {
            required: false,
            default: None,
            set_none: false,
            kind: FieldKind::Any,
            values: None,
            case_sensitive: true,
            sub_schema: None,
        }
    }
}

impl FieldRule {
    pub fn of(kind: FieldKind) -> Self {
        Self {
            kind,
            ..Default::default()
        }
    }

    pub fn any() -> Self {
        Self::of(FieldKind::Any)
    }

    pub fn string() -> Self {
        Self::of(FieldKind::String)
    }

    pub fn boolean() -> Self {
        Self::of(FieldKind::Boolean)
    }

    pub fn integer() -> Self {
        Self::of(FieldKind::Integer)
    }

    pub fn list() -> Self {
        Self::of(FieldKind::List)
    }

    pub fn dict() -> Self {
        Self::of(FieldKind::Dict)
    }

    pub fn ip() -> Self {
        Self::of(FieldKind::Ip)
    }

    pub fn cidr() -> Self {
        Self::of(FieldKind::Cidr)
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn set_none(mut self) -> Self {
        self.set_none = true;
        self
    }

    pub fn values(mut self, values: &[&str]) -> Self {
        self.values = Some(values.iter().map(|v| v.to_string()).collect());
        self
    }

    pub fn case_insensitive(mut self) -> Self {
        self.case_sensitive = false;
        self
    }

    /// Rules for a nested dict, or for every element of a list
    pub fn sub(mut self, schema: Schema) -> Self {
        self.sub_schema = Some(schema);
        self
    }
}

/// Ordered set of field rules
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schema {
    fields: IndexMap<String, FieldRule>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: &str, rule: FieldRule) -> Self {
        self.fields.insert(name.to_string(), rule);
        self
    }

    pub fn get(&self, name: &str) -> Option<&FieldRule> {
        self.fields.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldRule)> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Schema written as a JSON/YAML dictionary of rules
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }
}
