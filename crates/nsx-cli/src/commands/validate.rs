//! Validate command

use std::path::Path;

use anyhow::{Context, Result};

use nsx_config::{mask_secrets, NodeContext};
use nsx_core::Properties;
use nsx_plugin::OperationRegistry;

use crate::input::{load_context, load_kwargs};

/// Check node properties against the schema of the node type
pub struct ValidateCommand {
    registry: OperationRegistry,
}

impl ValidateCommand {
    pub fn new(registry: OperationRegistry) -> Self {
        Self { registry }
    }

    pub fn validate(&self, ctx: &NodeContext, kwargs: &Properties) -> Result<Properties> {
        self.registry
            .validate(ctx, kwargs)
            .with_context(|| format!("{} ({}) is invalid", ctx.node_id, ctx.node_type))
    }

    pub fn execute(&self, context_path: &Path, kwargs_path: Option<&Path>) -> Result<()> {
        let ctx = load_context(context_path)?;
        let kwargs = load_kwargs(kwargs_path)?;

        let properties = self.validate(&ctx, &kwargs)?;
        println!("✓ {} ({}) is valid", ctx.node_id, ctx.node_type);
        println!("{}", serde_json::to_string_pretty(&mask_secrets(&properties))?);
        Ok(())
    }
}
