use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{SharedResult, SharedTypeError};

const SEPARATOR: char = '|';

/// Composite identifier of a remote object
///
/// Sub-objects of an edge or a group have no id of their own in NSX, so the
/// persisted id carries every key needed to find them again, for example
/// `edge-7|196609` for a NAT rule or `edge-7|10.0.0.1|65001||` for a BGP
/// neighbour. Parts may be empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceId {
    parts: Vec<String>,
}

impl ResourceId {
    pub fn new<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            parts: parts.into_iter().map(Into::into).collect(),
        }
    }

    /// Plain object id, e.g. `edge-7` or `securitygroup-12`
    pub fn single(id: impl Into<String>) -> Self {
        Self {
            parts: vec![id.into()],
        }
    }

    /// Split a persisted id; the leading part names the parent object and
    /// must not be empty
    fn split(value: &str) -> Option<Self> {
        let parts: Vec<String> = value.split(SEPARATOR).map(str::to_string).collect();
        if parts[0].is_empty() {
            return None;
        }
        Some(Self { parts })
    }

    /// Parse a persisted id, checking the number of parts
    pub fn parse(value: &str, expected: usize) -> SharedResult<Self> {
        Self::split(value)
            .filter(|id| id.parts.len() == expected)
            .ok_or_else(|| SharedTypeError::InvalidResourceId {
                value: value.to_string(),
                expected,
            })
    }

    /// Part at `index`, empty string when out of range
    pub fn part(&self, index: usize) -> &str {
        self.parts.get(index).map(String::as_str).unwrap_or("")
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut sep = [0u8; 4];
        write!(f, "{}", self.parts.join(SEPARATOR.encode_utf8(&mut sep)))
    }
}

impl Serialize for ResourceId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for ResourceId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::split(&raw).ok_or_else(|| {
            serde::de::Error::custom(format!("invalid resource id '{}': empty object id", raw))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_keeps_empty_parts() {
        let id = ResourceId::new(["edge-7", "10.0.0.1", "65001", "", ""]);
        assert_eq!(id.to_string(), "edge-7|10.0.0.1|65001||");
    }

    #[test]
    fn test_parse_checks_part_count() {
        let id = ResourceId::parse("edge-7|196609", 2).unwrap();
        assert_eq!(id.part(0), "edge-7");
        assert_eq!(id.part(1), "196609");
        assert_eq!(id.part(2), "");

        assert!(ResourceId::parse("edge-7", 2).is_err());
        assert!(ResourceId::parse("|196609", 2).is_err());
    }

    #[test]
    fn test_serde_as_string() {
        let id = ResourceId::new(["securitytag-3", "vm-42"]);
        let json = serde_json::to_value(&id).unwrap();
        assert_eq!(json, serde_json::json!("securitytag-3|vm-42"));

        let back: ResourceId = serde_json::from_value(json).unwrap();
        assert_eq!(back, id);

        let neighbour: ResourceId = serde_json::from_str("\"edge-7|10.0.0.1|65001||\"").unwrap();
        assert_eq!(neighbour, ResourceId::new(["edge-7", "10.0.0.1", "65001", "", ""]));

        assert!(serde_json::from_str::<ResourceId>("\"\"").is_err());
        assert!(serde_json::from_str::<ResourceId>("\"|vm-42\"").is_err());
    }
}
