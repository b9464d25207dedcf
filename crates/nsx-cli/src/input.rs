//! Node context and operation input files

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde_json::Value;

use nsx_config::NodeContext;
use nsx_core::Properties;

pub fn load_context(path: &Path) -> Result<NodeContext> {
    NodeContext::load(path)
        .with_context(|| format!("Failed to load node context: {}", path.display()))
}

pub fn save_context(ctx: &NodeContext, path: &Path) -> Result<()> {
    ctx.save(path)
        .with_context(|| format!("Failed to save node context: {}", path.display()))
}

/// Operation inputs from a YAML or JSON mapping; none means no inputs
pub fn load_kwargs(path: Option<&Path>) -> Result<Properties> {
    let Some(path) = path else {
        return Ok(Properties::new());
    };

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read inputs: {}", path.display()))?;
    parse_kwargs(&content).with_context(|| format!("Invalid inputs: {}", path.display()))
}

pub fn parse_kwargs(content: &str) -> Result<Properties> {
    // JSON is a subset of YAML
    match serde_yaml::from_str::<Value>(content)? {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Properties::new()),
        other => bail!("inputs must be a mapping, got {}", other),
    }
}
