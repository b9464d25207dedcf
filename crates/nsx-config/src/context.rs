//! Node instance context

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use nsx_core::{ConfigError, Properties};

/// Runtime key holding the id of the remote object owned by the node
pub const RESOURCE_ID: &str = "resource_id";

/// Node/runtime key binding the node to a pre-existing remote object
pub const USE_EXTERNAL_RESOURCE: &str = "use_external_resource";

/// State of one node instance as kept by the orchestration engine
///
/// `properties` are the static properties from the blueprint,
/// `runtime_properties` survive between workflow steps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeContext {
    pub node_id: String,
    pub node_type: String,
    #[serde(default)]
    pub properties: Properties,
    #[serde(default)]
    pub runtime_properties: Properties,
}

impl NodeContext {
    pub fn new(node_id: &str, node_type: &str, properties: Properties) -> Self {
        Self {
            node_id: node_id.to_string(),
            node_type: node_type.to_string(),
            properties,
            runtime_properties: Properties::new(),
        }
    }

    /// Id of the remote object created or bound by a previous step
    pub fn resource_id(&self) -> Option<&str> {
        self.runtime_properties
            .get(RESOURCE_ID)
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
    }

    pub fn set_resource_id(&mut self, resource_id: impl ToString) {
        self.runtime_properties
            .insert(RESOURCE_ID.to_string(), Value::String(resource_id.to_string()));
    }

    pub fn set_runtime(&mut self, key: &str, value: Value) {
        self.runtime_properties.insert(key.to_string(), value);
    }

    /// Load a context persisted as JSON
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| ConfigError::Load(format!("{}: {}", path.display(), e)))?;
        serde_json::from_str(&content)
            .map_err(|e| ConfigError::Load(format!("{}: {}", path.display(), e)))
    }

    /// Persist the context as JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::Persist(format!("{}: {}", path.display(), e)))?;
        fs::write(path, content)
            .map_err(|e| ConfigError::Persist(format!("{}: {}", path.display(), e)))
    }
}
