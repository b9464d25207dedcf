//! Edges and per-edge services: firewall default policy, NAT, interfaces

use async_trait::async_trait;
use serde_json::{json, Value};

use nsx_core::{NsxResult, Properties, ResourceId, Session};
use nsx_reconcile::{
    add_nat_rule, create_edge, delete_edge, delete_nat_rule, dlr_add_interface, dlr_del_interface,
    esg_cfg_interface, esg_clear_interface, esg_fw_default_set, find_edge_by_name, EdgeKind,
};
use nsx_validate::{FieldRule, Schema};

use super::{address_groups, split_edge, take_text};
use crate::lifecycle::Lifecycle;

fn edge_schema() -> Schema {
    Schema::new()
        .field("name", FieldRule::string().required())
        .field("datacenterMoid", FieldRule::string().required())
        .field("description", FieldRule::string())
        .field("tenant", FieldRule::string())
        .field("fqdn", FieldRule::string())
        .field("appliances", FieldRule::dict())
        .field("vnics", FieldRule::dict())
        .field("mgmtInterface", FieldRule::dict())
        .field(
            "cliSettings",
            FieldRule::dict().sub(
                Schema::new()
                    .field("remoteAccess", FieldRule::boolean().with_default(false))
                    .field("userName", FieldRule::string())
                    .field("password", FieldRule::string()),
            ),
        )
}

async fn lookup_edge(
    session: &dyn Session,
    properties: &Properties,
) -> NsxResult<Option<ResourceId>> {
    let name = properties.get("name").and_then(Value::as_str).unwrap_or_default();
    Ok(find_edge_by_name(session, name).await?.map(ResourceId::single))
}

/// `nsx.Edge`: Edge Services Gateway
pub struct Edge;

#[async_trait]
impl Lifecycle for Edge {
    fn node_type(&self) -> &'static str {
        "nsx.Edge"
    }

    fn property_name(&self) -> &'static str {
        "edge"
    }

    fn schema(&self) -> Schema {
        edge_schema()
    }

    async fn provision(
        &self,
        session: &dyn Session,
        properties: &Properties,
    ) -> NsxResult<ResourceId> {
        create_edge(session, EdgeKind::Esg, properties).await
    }

    async fn release(
        &self,
        session: &dyn Session,
        resource_id: &str,
        _properties: &Properties,
    ) -> NsxResult<()> {
        delete_edge(session, resource_id).await
    }

    async fn lookup(
        &self,
        session: &dyn Session,
        properties: &Properties,
    ) -> NsxResult<Option<ResourceId>> {
        lookup_edge(session, properties).await
    }
}

/// `nsx.DLR`: Distributed Logical Router
pub struct Dlr;

#[async_trait]
impl Lifecycle for Dlr {
    fn node_type(&self) -> &'static str {
        "nsx.DLR"
    }

    fn property_name(&self) -> &'static str {
        "router"
    }

    fn schema(&self) -> Schema {
        edge_schema()
    }

    async fn provision(
        &self,
        session: &dyn Session,
        properties: &Properties,
    ) -> NsxResult<ResourceId> {
        create_edge(session, EdgeKind::Dlr, properties).await
    }

    async fn release(
        &self,
        session: &dyn Session,
        resource_id: &str,
        _properties: &Properties,
    ) -> NsxResult<()> {
        delete_edge(session, resource_id).await
    }

    async fn lookup(
        &self,
        session: &dyn Session,
        properties: &Properties,
    ) -> NsxResult<Option<ResourceId>> {
        lookup_edge(session, properties).await
    }
}

/// `nsx.ESGFirewall`: default policy of the edge firewall
///
/// Deleting the node restores the deny/no-logging default.
pub struct EsgFirewall;

#[async_trait]
impl Lifecycle for EsgFirewall {
    fn node_type(&self) -> &'static str {
        "nsx.ESGFirewall"
    }

    fn property_name(&self) -> &'static str {
        "firewall"
    }

    fn schema(&self) -> Schema {
        Schema::new()
            .field("edgeId", FieldRule::string().required())
            .field(
                "action",
                FieldRule::string()
                    .with_default("deny")
                    .values(&["accept", "deny", "reject"])
                    .case_insensitive(),
            )
            .field("loggingEnabled", FieldRule::boolean().with_default(false))
    }

    fn edge_scoped(&self) -> bool {
        true
    }

    async fn provision(
        &self,
        session: &dyn Session,
        properties: &Properties,
    ) -> NsxResult<ResourceId> {
        let (edge_id, policy) = split_edge(properties)?;
        esg_fw_default_set(session, &edge_id, &policy).await?;
        Ok(ResourceId::single(edge_id))
    }

    async fn release(
        &self,
        session: &dyn Session,
        resource_id: &str,
        _properties: &Properties,
    ) -> NsxResult<()> {
        let id = ResourceId::parse(resource_id, 1)?;
        let mut reset = Properties::new();
        reset.insert("action".to_string(), json!("deny"));
        reset.insert("loggingEnabled".to_string(), json!(false));
        esg_fw_default_set(session, id.part(0), &reset).await?;
        Ok(())
    }
}

/// `nsx.ESGNat`: one NAT rule
pub struct EsgNat;

#[async_trait]
impl Lifecycle for EsgNat {
    fn node_type(&self) -> &'static str {
        "nsx.ESGNat"
    }

    fn property_name(&self) -> &'static str {
        "rule"
    }

    fn schema(&self) -> Schema {
        Schema::new()
            .field("edgeId", FieldRule::string().required())
            .field(
                "action",
                FieldRule::string()
                    .required()
                    .values(&["snat", "dnat"])
                    .case_insensitive(),
            )
            .field("vnic", FieldRule::integer())
            .field("originalAddress", FieldRule::string().required())
            .field("translatedAddress", FieldRule::string().required())
            .field("loggingEnabled", FieldRule::boolean().with_default(false))
            .field("enabled", FieldRule::boolean().with_default(true))
            .field("description", FieldRule::string())
            .field("protocol", FieldRule::string().with_default("any"))
            .field("originalPort", FieldRule::string().with_default("any"))
            .field("translatedPort", FieldRule::string().with_default("any"))
    }

    fn edge_scoped(&self) -> bool {
        true
    }

    async fn provision(
        &self,
        session: &dyn Session,
        properties: &Properties,
    ) -> NsxResult<ResourceId> {
        let (edge_id, rule) = split_edge(properties)?;
        add_nat_rule(session, &edge_id, &rule).await
    }

    async fn release(
        &self,
        session: &dyn Session,
        resource_id: &str,
        _properties: &Properties,
    ) -> NsxResult<()> {
        delete_nat_rule(session, resource_id).await
    }
}

fn interface_fields(schema: Schema) -> Schema {
    schema
        .field("name", FieldRule::string())
        .field(
            "type",
            FieldRule::string()
                .with_default("internal")
                .values(&["internal", "uplink"])
                .case_insensitive(),
        )
        .field("isConnected", FieldRule::boolean().with_default(true))
        .field("mtu", FieldRule::integer().with_default(1500))
        .field("primaryAddress", FieldRule::ip().required())
        .field("subnetMask", FieldRule::string().required())
}

/// `nsx.ESGInterface`: configuration of an existing ESG vnic
pub struct EsgInterface;

#[async_trait]
impl Lifecycle for EsgInterface {
    fn node_type(&self) -> &'static str {
        "nsx.ESGInterface"
    }

    fn property_name(&self) -> &'static str {
        "interface"
    }

    fn schema(&self) -> Schema {
        interface_fields(
            Schema::new()
                .field("edgeId", FieldRule::string().required())
                .field("index", FieldRule::integer().required())
                .field("portgroupId", FieldRule::string().required()),
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
        let (edge_id, mut vnic) = split_edge(properties)?;
        let index = take_text(&mut vnic, "index")?;
        address_groups(&mut vnic);
        esg_cfg_interface(session, &edge_id, &index, &vnic).await
    }

    async fn release(
        &self,
        session: &dyn Session,
        resource_id: &str,
        _properties: &Properties,
    ) -> NsxResult<()> {
        esg_clear_interface(session, resource_id).await
    }
}

/// `nsx.DLRInterface`: DLR interface attached to a logical switch
pub struct DlrInterface;

#[async_trait]
impl Lifecycle for DlrInterface {
    fn node_type(&self) -> &'static str {
        "nsx.DLRInterface"
    }

    fn property_name(&self) -> &'static str {
        "interface"
    }

    fn schema(&self) -> Schema {
        interface_fields(
            Schema::new()
                .field("edgeId", FieldRule::string().required())
                .field("connectedToId", FieldRule::string().required()),
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
        let (edge_id, mut interface) = split_edge(properties)?;
        address_groups(&mut interface);
        dlr_add_interface(session, &edge_id, &interface).await
    }

    async fn release(
        &self,
        session: &dyn Session,
        resource_id: &str,
        _properties: &Properties,
    ) -> NsxResult<()> {
        dlr_del_interface(session, resource_id).await
    }
}
