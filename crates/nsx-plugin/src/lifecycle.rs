//! Shared create/delete flow of NSX node types

use async_trait::async_trait;
use log::{debug, info};
use serde_json::Value;

use nsx_config::{
    external_resource_id, get_properties, get_properties_update, remove_properties,
    use_external_resource, NodeContext, USE_EXTERNAL_RESOURCE,
};
use nsx_core::{
    attempt_with_rerun, NsxError, NsxResult, Properties, ResourceId, RetryPolicy, Session,
    ValidationError,
};
use nsx_validate::Schema;

/// One NSX node type
///
/// Implementors describe their properties and how to provision and release
/// the remote object; `create` and `delete` carry the bookkeeping shared by
/// every node type.
#[async_trait]
pub trait Lifecycle: Send + Sync {
    /// Node type name, `nsx.BGP`
    fn node_type(&self) -> &'static str;

    /// Key of the property dictionary in node and runtime properties
    fn property_name(&self) -> &'static str;

    fn schema(&self) -> Schema;

    /// Writes into an edge configuration are rerun while the edge is busy
    fn edge_scoped(&self) -> bool {
        false
    }

    /// Create or reuse the remote object described by `properties`
    async fn provision(
        &self,
        session: &dyn Session,
        properties: &Properties,
    ) -> NsxResult<ResourceId>;

    /// Remove the remote object `resource_id`
    async fn release(
        &self,
        session: &dyn Session,
        resource_id: &str,
        properties: &Properties,
    ) -> NsxResult<()>;

    /// Find an existing object for a node bound with
    /// `use_external_resource` but no explicit `resource_id`
    async fn lookup(
        &self,
        _session: &dyn Session,
        _properties: &Properties,
    ) -> NsxResult<Option<ResourceId>> {
        Ok(None)
    }

    async fn create(
        &self,
        session: &dyn Session,
        ctx: &mut NodeContext,
        kwargs: &Properties,
        retry: &RetryPolicy,
    ) -> NsxResult<()> {
        let name = self.property_name();
        let update = get_properties_update(ctx, name, kwargs, &self.schema())?;

        if let Some(resource_id) = update.resource_id {
            info!("{}: {} already created", ctx.node_id, resource_id);
            return Ok(());
        }

        if update.use_existing {
            let resource_id = match external_resource_id(ctx, kwargs) {
                Some(resource_id) => resource_id,
                None => self
                    .lookup(session, &update.properties)
                    .await?
                    .map(|id| id.to_string())
                    .ok_or_else(|| ValidationError::MissingField {
                        path: "resource_id".to_string(),
                    })?,
            };
            info!("{}: using existing {}", ctx.node_id, resource_id);
            ctx.set_resource_id(&resource_id);
            ctx.set_runtime(USE_EXTERNAL_RESOURCE, Value::Bool(true));
            ctx.set_runtime(name, Value::Object(update.properties));
            return Ok(());
        }

        let properties = &update.properties;
        let resource_id = if self.edge_scoped() {
            attempt_with_rerun(retry, || self.provision(session, properties)).await?
        } else {
            self.provision(session, properties).await?
        };

        info!("{}: created {} {}", ctx.node_id, self.node_type(), resource_id);
        ctx.set_resource_id(&resource_id);
        ctx.set_runtime(name, Value::Object(update.properties));
        Ok(())
    }

    async fn delete(
        &self,
        session: &dyn Session,
        ctx: &mut NodeContext,
        kwargs: &Properties,
        retry: &RetryPolicy,
    ) -> NsxResult<()> {
        let name = self.property_name();

        if use_external_resource(ctx, kwargs) {
            info!("{}: external resource left in place", ctx.node_id);
            remove_properties(ctx, &[name]);
            return Ok(());
        }

        let resource_id = match ctx.resource_id() {
            Some(resource_id) => resource_id.to_string(),
            None => {
                debug!("{}: nothing to delete", ctx.node_id);
                return Ok(());
            }
        };

        let properties = get_properties(ctx, name, kwargs);
        if self.edge_scoped() {
            attempt_with_rerun(retry, || {
                self.release(session, &resource_id, &properties)
            })
            .await?;
        } else {
            self.release(session, &resource_id, &properties).await?;
        }

        info!("{}: deleted {} {}", ctx.node_id, self.node_type(), resource_id);
        remove_properties(ctx, &[name]);
        Ok(())
    }

    /// Relationship towards `target` established
    async fn link(
        &self,
        _session: &dyn Session,
        _ctx: &mut NodeContext,
        _target: &NodeContext,
    ) -> NsxResult<()> {
        Err(NsxError::Unsupported(format!(
            "{} has no relationship operations",
            self.node_type()
        )))
    }

    async fn unlink(
        &self,
        _session: &dyn Session,
        _ctx: &mut NodeContext,
        _target: &NodeContext,
    ) -> NsxResult<()> {
        Err(NsxError::Unsupported(format!(
            "{} has no relationship operations",
            self.node_type()
        )))
    }
}
