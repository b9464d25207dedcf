//! Create, delete, link and unlink commands

use std::fmt;
use std::path::Path;

use anyhow::{bail, Context, Result};
use log::info;

use nsx_client::nsx_login_from_context;
use nsx_config::{NodeContext, PluginConfig};
use nsx_core::{Properties, Session};
use nsx_plugin::OperationRegistry;

use crate::input::{load_context, load_kwargs, save_context};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Create,
    Delete,
    Link,
    Unlink,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Action::Create => "create",
            Action::Delete => "delete",
            Action::Link => "link",
            Action::Unlink => "unlink",
        };
        f.write_str(name)
    }
}

/// Run one lifecycle operation and persist the updated node context
pub struct LifecycleCommand {
    registry: OperationRegistry,
    config: PluginConfig,
}

impl LifecycleCommand {
    pub fn new(config: PluginConfig) -> Self {
        let registry = OperationRegistry::new().with_retry_policy(config.retry_policy());
        Self { registry, config }
    }

    pub fn with_registry(config: PluginConfig, registry: OperationRegistry) -> Self {
        Self { registry, config }
    }

    pub async fn execute(
        &self,
        action: Action,
        context_path: &Path,
        kwargs_path: Option<&Path>,
        target_path: Option<&Path>,
    ) -> Result<()> {
        let mut ctx = load_context(context_path)?;
        let kwargs = load_kwargs(kwargs_path)?;
        let target = target_path.map(load_context).transpose()?;

        let session = nsx_login_from_context(&ctx, &kwargs, &self.config)
            .context("Failed to open NSX session")?;

        let result = self
            .apply(&session, action, &mut ctx, &kwargs, target.as_ref())
            .await;

        // runtime state gathered before a failure is kept as well
        save_context(&ctx, context_path)?;
        result
    }

    pub async fn apply(
        &self,
        session: &dyn Session,
        action: Action,
        ctx: &mut NodeContext,
        kwargs: &Properties,
        target: Option<&NodeContext>,
    ) -> Result<()> {
        info!("{} {} ({})", action, ctx.node_id, ctx.node_type);

        let result = match (action, target) {
            (Action::Create, _) => self.registry.create(session, ctx, kwargs).await,
            (Action::Delete, _) => self.registry.delete(session, ctx, kwargs).await,
            (Action::Link, Some(target)) => self.registry.link(session, ctx, target).await,
            (Action::Unlink, Some(target)) => self.registry.unlink(session, ctx, target).await,
            (Action::Link | Action::Unlink, None) => {
                bail!("{} needs a target node context", action)
            }
        };

        result.with_context(|| format!("{} of {} failed", action, ctx.node_id))?;
        println!("✓ {} {} done", action, ctx.node_id);
        Ok(())
    }
}
