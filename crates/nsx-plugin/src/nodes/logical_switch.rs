//! `nsx.LogicalSwitch`

use async_trait::async_trait;

use nsx_core::{nsx_search, NsxResult, Properties, ResourceId, Session, UriParameters};
use nsx_reconcile::{add_logical_switch, del_logical_switch};
use nsx_validate::{FieldRule, Schema};

use super::{take_text, text};
use crate::lifecycle::Lifecycle;

pub struct LogicalSwitch;

#[async_trait]
impl Lifecycle for LogicalSwitch {
    fn node_type(&self) -> &'static str {
        "nsx.LogicalSwitch"
    }

    fn property_name(&self) -> &'static str {
        "switch"
    }

    fn schema(&self) -> Schema {
        Schema::new()
            .field("name", FieldRule::string().required())
            .field("scopeId", FieldRule::string().required())
            .field("description", FieldRule::string())
            .field(
                "tenantId",
                FieldRule::string().with_default("virtual wire tenant"),
            )
            .field(
                "controlPlaneMode",
                FieldRule::string()
                    .with_default("UNICAST_MODE")
                    .values(&["UNICAST_MODE", "HYBRID_MODE", "MULTICAST_MODE"])
                    .case_insensitive(),
            )
    }

    async fn provision(
        &self,
        session: &dyn Session,
        properties: &Properties,
    ) -> NsxResult<ResourceId> {
        let mut spec = properties.clone();
        let scope_id = take_text(&mut spec, "scopeId")?;
        add_logical_switch(session, &scope_id, &spec).await
    }

    async fn release(
        &self,
        session: &dyn Session,
        resource_id: &str,
        _properties: &Properties,
    ) -> NsxResult<()> {
        del_logical_switch(session, resource_id).await
    }

    async fn lookup(
        &self,
        session: &dyn Session,
        properties: &Properties,
    ) -> NsxResult<Option<ResourceId>> {
        let uri = UriParameters::new().with("scopeId", text(properties, "scopeId"));
        let found = nsx_search(
            session,
            "dataPage/data",
            text(properties, "name"),
            "logicalSwitches",
            &uri,
        )
        .await?;
        Ok(found.map(|(object_id, _)| ResourceId::single(object_id)))
    }
}
