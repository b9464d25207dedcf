//! List node types

use anyhow::Result;

use nsx_plugin::OperationRegistry;

pub struct TypesCommand {
    registry: OperationRegistry,
}

impl TypesCommand {
    pub fn new(registry: OperationRegistry) -> Self {
        Self { registry }
    }

    /// Node type names with the key of their property dictionary
    pub fn list(&self) -> Vec<(&'static str, &'static str)> {
        self.registry
            .node_types()
            .into_iter()
            .filter_map(|node_type| {
                let lifecycle = self.registry.get(node_type).ok()?;
                Some((node_type, lifecycle.property_name()))
            })
            .collect()
    }

    pub fn execute(&self) -> Result<()> {
        for (node_type, property_name) in self.list() {
            println!("{:<32} {}", node_type, property_name);
        }
        Ok(())
    }
}
