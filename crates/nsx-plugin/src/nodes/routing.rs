//! Dynamic and static routing of ESGs and DLRs

use async_trait::async_trait;
use log::info;
use serde_json::{json, Value};

use nsx_core::{NsxResult, Properties, ResourceId, Session};
use nsx_reconcile::{
    add_bgp_neighbour, add_ospf_area, add_ospf_interface, add_routing_prefix, add_routing_rule,
    add_static_route, clear_default_gateway, del_bgp_neighbour, del_ospf_area,
    del_ospf_interface, del_routing_prefix, del_routing_rule, del_static_route,
    set_default_gateway, update_bgp, update_ospf, update_routing_global, RoutingProtocol,
};
use nsx_validate::{FieldRule, Schema};

use super::{split_edge, take_text};
use crate::lifecycle::Lifecycle;

fn edge_field() -> Schema {
    Schema::new().field("edgeId", FieldRule::string().required())
}

fn disabled() -> Properties {
    let mut properties = Properties::new();
    properties.insert("enabled".to_string(), Value::Bool(false));
    properties
}

/// `nsx.RoutingGlobal`: router id, ECMP and routing logs
///
/// The router id cannot be removed again, so deleting the node only
/// forgets it.
pub struct RoutingGlobal;

#[async_trait]
impl Lifecycle for RoutingGlobal {
    fn node_type(&self) -> &'static str {
        "nsx.RoutingGlobal"
    }

    fn property_name(&self) -> &'static str {
        "global"
    }

    fn schema(&self) -> Schema {
        edge_field()
            .field("routerId", FieldRule::ip().required())
            .field("ecmp", FieldRule::boolean().with_default(false))
            .field(
                "logging",
                FieldRule::dict().with_default(json!({})).sub(
                    Schema::new()
                        .field("enable", FieldRule::boolean().with_default(false))
                        .field(
                            "logLevel",
                            FieldRule::string()
                                .with_default("info")
                                .values(&[
                                    "emergency",
                                    "alert",
                                    "critical",
                                    "error",
                                    "warning",
                                    "notice",
                                    "info",
                                    "debug",
                                ])
                                .case_insensitive(),
                        ),
                ),
            )
    }

    fn edge_scoped(&self) -> bool {
        true
    }

    async fn provision(
        &self,
        session: &dyn Session,
        properties: &Properties,
    ) -> NsxResult<ResourceId> {
        let (edge_id, global) = split_edge(properties)?;
        update_routing_global(session, &edge_id, &global).await?;
        Ok(ResourceId::single(edge_id))
    }

    async fn release(
        &self,
        _session: &dyn Session,
        resource_id: &str,
        _properties: &Properties,
    ) -> NsxResult<()> {
        info!("{}: global routing configuration kept", resource_id);
        Ok(())
    }
}

/// `nsx.RoutingIPPrefix`: named prefix for redistribution rules
pub struct RoutingIpPrefix;

#[async_trait]
impl Lifecycle for RoutingIpPrefix {
    fn node_type(&self) -> &'static str {
        "nsx.RoutingIPPrefix"
    }

    fn property_name(&self) -> &'static str {
        "prefix"
    }

    fn schema(&self) -> Schema {
        edge_field()
            .field("name", FieldRule::string().required())
            .field("ipAddress", FieldRule::cidr().required())
    }

    fn edge_scoped(&self) -> bool {
        true
    }

    async fn provision(
        &self,
        session: &dyn Session,
        properties: &Properties,
    ) -> NsxResult<ResourceId> {
        let (edge_id, mut prefix) = split_edge(properties)?;
        let name = take_text(&mut prefix, "name")?;
        let ip_address = take_text(&mut prefix, "ipAddress")?;
        add_routing_prefix(session, &edge_id, &name, &ip_address).await
    }

    async fn release(
        &self,
        session: &dyn Session,
        resource_id: &str,
        _properties: &Properties,
    ) -> NsxResult<()> {
        del_routing_prefix(session, resource_id).await
    }
}

/// `nsx.BGP`: BGP process of an edge; deleting disables it
pub struct Bgp;

#[async_trait]
impl Lifecycle for Bgp {
    fn node_type(&self) -> &'static str {
        "nsx.BGP"
    }

    fn property_name(&self) -> &'static str {
        "bgp"
    }

    fn schema(&self) -> Schema {
        edge_field()
            .field("enabled", FieldRule::boolean().with_default(true))
            .field("localAS", FieldRule::integer().required())
            .field("gracefulRestart", FieldRule::boolean().with_default(false))
            .field("defaultOriginate", FieldRule::boolean().with_default(false))
    }

    fn edge_scoped(&self) -> bool {
        true
    }

    async fn provision(
        &self,
        session: &dyn Session,
        properties: &Properties,
    ) -> NsxResult<ResourceId> {
        let (edge_id, bgp) = split_edge(properties)?;
        update_bgp(session, &edge_id, &bgp).await?;
        Ok(ResourceId::single(edge_id))
    }

    async fn release(
        &self,
        session: &dyn Session,
        resource_id: &str,
        _properties: &Properties,
    ) -> NsxResult<()> {
        let id = ResourceId::parse(resource_id, 1)?;
        update_bgp(session, id.part(0), &disabled()).await?;
        Ok(())
    }
}

/// `nsx.BGPNeighbour`
pub struct BgpNeighbour;

#[async_trait]
impl Lifecycle for BgpNeighbour {
    fn node_type(&self) -> &'static str {
        "nsx.BGPNeighbour"
    }

    fn property_name(&self) -> &'static str {
        "neighbour"
    }

    fn schema(&self) -> Schema {
        edge_field()
            .field("ipAddress", FieldRule::ip().required())
            .field("remoteAS", FieldRule::integer().required())
            .field("protocolAddress", FieldRule::ip())
            .field("forwardingAddress", FieldRule::ip())
            .field("weight", FieldRule::integer().with_default(60))
            .field("holdDownTimer", FieldRule::integer().with_default(180))
            .field("keepAliveTimer", FieldRule::integer().with_default(60))
            .field("password", FieldRule::string())
    }

    fn edge_scoped(&self) -> bool {
        true
    }

    async fn provision(
        &self,
        session: &dyn Session,
        properties: &Properties,
    ) -> NsxResult<ResourceId> {
        let (edge_id, neighbour) = split_edge(properties)?;
        add_bgp_neighbour(session, &edge_id, &neighbour).await
    }

    async fn release(
        &self,
        session: &dyn Session,
        resource_id: &str,
        _properties: &Properties,
    ) -> NsxResult<()> {
        del_bgp_neighbour(session, resource_id).await
    }
}

/// `nsx.OSPF`: OSPF process of an edge; deleting disables it
pub struct Ospf;

#[async_trait]
impl Lifecycle for Ospf {
    fn node_type(&self) -> &'static str {
        "nsx.OSPF"
    }

    fn property_name(&self) -> &'static str {
        "ospf"
    }

    fn schema(&self) -> Schema {
        edge_field()
            .field("enabled", FieldRule::boolean().with_default(true))
            .field("defaultOriginate", FieldRule::boolean().with_default(false))
            .field("gracefulRestart", FieldRule::boolean().with_default(false))
            .field("protocolAddress", FieldRule::ip())
            .field("forwardingAddress", FieldRule::ip())
    }

    fn edge_scoped(&self) -> bool {
        true
    }

    async fn provision(
        &self,
        session: &dyn Session,
        properties: &Properties,
    ) -> NsxResult<ResourceId> {
        let (edge_id, ospf) = split_edge(properties)?;
        update_ospf(session, &edge_id, &ospf).await?;
        Ok(ResourceId::single(edge_id))
    }

    async fn release(
        &self,
        session: &dyn Session,
        resource_id: &str,
        _properties: &Properties,
    ) -> NsxResult<()> {
        let id = ResourceId::parse(resource_id, 1)?;
        update_ospf(session, id.part(0), &disabled()).await?;
        Ok(())
    }
}

/// `nsx.OSPFArea`
pub struct OspfArea;

#[async_trait]
impl Lifecycle for OspfArea {
    fn node_type(&self) -> &'static str {
        "nsx.OSPFArea"
    }

    fn property_name(&self) -> &'static str {
        "area"
    }

    fn schema(&self) -> Schema {
        edge_field()
            .field("areaId", FieldRule::integer().required())
            .field(
                "type",
                FieldRule::string()
                    .with_default("normal")
                    .values(&["normal", "nssa"])
                    .case_insensitive(),
            )
            .field(
                "authentication",
                FieldRule::dict().sub(
                    Schema::new()
                        .field(
                            "type",
                            FieldRule::string()
                                .with_default("none")
                                .values(&["none", "password", "md5"])
                                .case_insensitive(),
                        )
                        .field("value", FieldRule::string()),
                ),
            )
    }

    fn edge_scoped(&self) -> bool {
        true
    }

    async fn provision(
        &self,
        session: &dyn Session,
        properties: &Properties,
    ) -> NsxResult<ResourceId> {
        let (edge_id, area) = split_edge(properties)?;
        add_ospf_area(session, &edge_id, &area).await
    }

    async fn release(
        &self,
        session: &dyn Session,
        resource_id: &str,
        _properties: &Properties,
    ) -> NsxResult<()> {
        del_ospf_area(session, resource_id).await
    }
}

/// `nsx.OSPFInterface`: vnic taking part in an OSPF area
pub struct OspfInterface;

#[async_trait]
impl Lifecycle for OspfInterface {
    fn node_type(&self) -> &'static str {
        "nsx.OSPFInterface"
    }

    fn property_name(&self) -> &'static str {
        "interface"
    }

    fn schema(&self) -> Schema {
        edge_field()
            .field("vnic", FieldRule::integer().required())
            .field("areaId", FieldRule::integer().required())
            .field("helloInterval", FieldRule::integer().with_default(10))
            .field("deadInterval", FieldRule::integer().with_default(40))
            .field("priority", FieldRule::integer().with_default(128))
            .field("cost", FieldRule::integer())
            .field("mtuIgnore", FieldRule::boolean().with_default(false))
    }

    fn edge_scoped(&self) -> bool {
        true
    }

    async fn provision(
        &self,
        session: &dyn Session,
        properties: &Properties,
    ) -> NsxResult<ResourceId> {
        let (edge_id, interface) = split_edge(properties)?;
        add_ospf_interface(session, &edge_id, &interface).await
    }

    async fn release(
        &self,
        session: &dyn Session,
        resource_id: &str,
        _properties: &Properties,
    ) -> NsxResult<()> {
        del_ospf_interface(session, resource_id).await
    }
}

/// `nsx.RoutingRule`: redistribution rule of BGP or OSPF
pub struct RoutingRule;

#[async_trait]
impl Lifecycle for RoutingRule {
    fn node_type(&self) -> &'static str {
        "nsx.RoutingRule"
    }

    fn property_name(&self) -> &'static str {
        "rule"
    }

    fn schema(&self) -> Schema {
        let from = ["ospf", "bgp", "static", "connected"]
            .iter()
            .fold(Schema::new(), |schema, source| {
                schema.field(source, FieldRule::boolean().with_default(false))
            });

        edge_field()
            .field(
                "protocol",
                FieldRule::string()
                    .required()
                    .values(&["bgp", "ospf"])
                    .case_insensitive(),
            )
            .field("prefixName", FieldRule::string())
            .field(
                "action",
                FieldRule::string()
                    .with_default("permit")
                    .values(&["permit", "deny"])
                    .case_insensitive(),
            )
            .field("from", FieldRule::dict().with_default(json!({})).sub(from))
    }

    fn edge_scoped(&self) -> bool {
        true
    }

    async fn provision(
        &self,
        session: &dyn Session,
        properties: &Properties,
    ) -> NsxResult<ResourceId> {
        let (edge_id, mut rule) = split_edge(properties)?;
        let protocol: RoutingProtocol = take_text(&mut rule, "protocol")?.parse()?;
        add_routing_rule(session, &edge_id, protocol, &rule).await
    }

    async fn release(
        &self,
        session: &dyn Session,
        resource_id: &str,
        _properties: &Properties,
    ) -> NsxResult<()> {
        del_routing_rule(session, resource_id).await
    }
}

/// `nsx.StaticRoute`
pub struct StaticRoute;

#[async_trait]
impl Lifecycle for StaticRoute {
    fn node_type(&self) -> &'static str {
        "nsx.StaticRoute"
    }

    fn property_name(&self) -> &'static str {
        "route"
    }

    fn schema(&self) -> Schema {
        edge_field()
            .field("network", FieldRule::cidr().required())
            .field("nextHop", FieldRule::ip().required())
            .field("vnic", FieldRule::integer())
            .field("mtu", FieldRule::integer().with_default(1500))
            .field("adminDistance", FieldRule::integer().with_default(1))
            .field("description", FieldRule::string())
    }

    fn edge_scoped(&self) -> bool {
        true
    }

    async fn provision(
        &self,
        session: &dyn Session,
        properties: &Properties,
    ) -> NsxResult<ResourceId> {
        let (edge_id, route) = split_edge(properties)?;
        add_static_route(session, &edge_id, &route).await
    }

    async fn release(
        &self,
        session: &dyn Session,
        resource_id: &str,
        _properties: &Properties,
    ) -> NsxResult<()> {
        del_static_route(session, resource_id).await
    }
}

/// `nsx.DefaultGateway`: default route of an edge
pub struct DefaultGateway;

#[async_trait]
impl Lifecycle for DefaultGateway {
    fn node_type(&self) -> &'static str {
        "nsx.DefaultGateway"
    }

    fn property_name(&self) -> &'static str {
        "gateway"
    }

    fn schema(&self) -> Schema {
        edge_field()
            .field("gatewayAddress", FieldRule::ip().required())
            .field("vnic", FieldRule::integer())
            .field("mtu", FieldRule::integer().with_default(1500))
            .field("adminDistance", FieldRule::integer().with_default(1))
    }

    fn edge_scoped(&self) -> bool {
        true
    }

    async fn provision(
        &self,
        session: &dyn Session,
        properties: &Properties,
    ) -> NsxResult<ResourceId> {
        let (edge_id, gateway) = split_edge(properties)?;
        set_default_gateway(session, &edge_id, &gateway).await
    }

    async fn release(
        &self,
        session: &dyn Session,
        resource_id: &str,
        _properties: &Properties,
    ) -> NsxResult<()> {
        clear_default_gateway(session, resource_id).await
    }
}
