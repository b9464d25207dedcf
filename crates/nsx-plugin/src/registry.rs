//! Registry of node type operations

use std::collections::HashMap;

use log::{debug, info};

use nsx_config::{get_properties_and_validate, NodeContext};
use nsx_core::{NsxError, NsxResult, Properties, RetryPolicy, Session};

use crate::lifecycle::Lifecycle;
use crate::nodes::edge::{Dlr, DlrInterface, Edge, EsgFirewall, EsgInterface, EsgNat};
use crate::nodes::logical_switch::LogicalSwitch;
use crate::nodes::routing::{
    Bgp, BgpNeighbour, DefaultGateway, Ospf, OspfArea, OspfInterface, RoutingGlobal,
    RoutingIpPrefix, RoutingRule, StaticRoute,
};
use crate::nodes::security::{
    SecurityGroup, SecurityGroupMember, SecurityPolicy, SecurityPolicyGroupBind,
    SecurityPolicySection, SecurityTag, SecurityTagVm,
};

/// Lifecycle operations by node type name
pub struct OperationRegistry {
    lifecycles: HashMap<&'static str, Box<dyn Lifecycle>>,
    retry: RetryPolicy,
}

impl Default for OperationRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl OperationRegistry {
    /// Registry with every built-in node type
    pub fn new() -> Self {
        let mut registry = Self::empty();

        registry.register(Box::new(LogicalSwitch));

        registry.register(Box::new(Edge));
        registry.register(Box::new(Dlr));
        registry.register(Box::new(EsgFirewall));
        registry.register(Box::new(EsgNat));
        registry.register(Box::new(EsgInterface));
        registry.register(Box::new(DlrInterface));

        registry.register(Box::new(RoutingGlobal));
        registry.register(Box::new(RoutingIpPrefix));
        registry.register(Box::new(Bgp));
        registry.register(Box::new(BgpNeighbour));
        registry.register(Box::new(Ospf));
        registry.register(Box::new(OspfArea));
        registry.register(Box::new(OspfInterface));
        registry.register(Box::new(RoutingRule));
        registry.register(Box::new(StaticRoute));
        registry.register(Box::new(DefaultGateway));

        registry.register(Box::new(SecurityGroup));
        registry.register(Box::new(SecurityGroupMember));
        registry.register(Box::new(SecurityPolicy));
        registry.register(Box::new(SecurityPolicyGroupBind));
        registry.register(Box::new(SecurityPolicySection));
        registry.register(Box::new(SecurityTag));
        registry.register(Box::new(SecurityTagVm));

        info!("Registered {} NSX node types", registry.lifecycles.len());
        registry
    }

    /// Registry without any node type
    pub fn empty() -> Self {
        Self {
            lifecycles: HashMap::new(),
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Register a node type, replacing one with the same name
    pub fn register(&mut self, lifecycle: Box<dyn Lifecycle>) {
        let node_type = lifecycle.node_type();
        if self.lifecycles.insert(node_type, lifecycle).is_some() {
            debug!("Replaced node type: {}", node_type);
        } else {
            debug!("Registered node type: {}", node_type);
        }
    }

    pub fn get(&self, node_type: &str) -> NsxResult<&dyn Lifecycle> {
        self.lifecycles
            .get(node_type)
            .map(|lifecycle| lifecycle.as_ref())
            .ok_or_else(|| NsxError::UnknownNodeType(node_type.to_string()))
    }

    /// Registered node type names, sorted
    pub fn node_types(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.lifecycles.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Validated properties of a node without touching NSX
    pub fn validate(&self, ctx: &NodeContext, kwargs: &Properties) -> NsxResult<Properties> {
        let lifecycle = self.get(&ctx.node_type)?;
        let (_, properties) = get_properties_and_validate(
            ctx,
            lifecycle.property_name(),
            kwargs,
            &lifecycle.schema(),
        )?;
        Ok(properties)
    }

    pub async fn create(
        &self,
        session: &dyn Session,
        ctx: &mut NodeContext,
        kwargs: &Properties,
    ) -> NsxResult<()> {
        let lifecycle = self.get(&ctx.node_type)?;
        lifecycle.create(session, ctx, kwargs, &self.retry).await
    }

    pub async fn delete(
        &self,
        session: &dyn Session,
        ctx: &mut NodeContext,
        kwargs: &Properties,
    ) -> NsxResult<()> {
        let lifecycle = self.get(&ctx.node_type)?;
        lifecycle.delete(session, ctx, kwargs, &self.retry).await
    }

    pub async fn link(
        &self,
        session: &dyn Session,
        ctx: &mut NodeContext,
        target: &NodeContext,
    ) -> NsxResult<()> {
        let lifecycle = self.get(&ctx.node_type)?;
        lifecycle.link(session, ctx, target).await
    }

    pub async fn unlink(
        &self,
        session: &dyn Session,
        ctx: &mut NodeContext,
        target: &NodeContext,
    ) -> NsxResult<()> {
        let lifecycle = self.get(&ctx.node_type)?;
        lifecycle.unlink(session, ctx, target).await
    }
}
