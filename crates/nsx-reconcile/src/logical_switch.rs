//! Logical switches (virtual wires) of a transport zone

use log::{debug, info};
use serde_json::{json, Value};

use nsx_core::{nsx_search, NsxResult, Properties, ResourceId, Session, UriParameters};

use crate::diff::{compact, pick};
use crate::{create_object, delete_if_exists};

const SPEC_FIELDS: [&str; 4] = ["name", "description", "tenantId", "controlPlaneMode"];

/// Create a logical switch in transport zone `scope_id`
///
/// A switch with the same name in the zone is reused.
pub async fn add_logical_switch(
    session: &dyn Session,
    scope_id: &str,
    properties: &Properties,
) -> NsxResult<ResourceId> {
    let uri = UriParameters::new().with("scopeId", scope_id);
    let name = properties
        .get("name")
        .and_then(Value::as_str)
        .unwrap_or_default();

    if let Some((object_id, _)) =
        nsx_search(session, "dataPage/data", name, "logicalSwitches", &uri).await?
    {
        debug!("logical switch {} already exists as {}", name, object_id);
        return Ok(ResourceId::single(object_id));
    }

    let body = json!({ "virtualWireCreateSpec": compact(&pick(properties, &SPEC_FIELDS)) });
    let object_id = create_object(session, "logicalSwitches", &uri, body).await?;
    info!("logical switch {} created as {}", name, object_id);
    Ok(ResourceId::single(object_id))
}

pub async fn del_logical_switch(session: &dyn Session, resource_id: &str) -> NsxResult<()> {
    let id = ResourceId::parse(resource_id, 1)?;
    let uri = UriParameters::new().with("virtualWireID", id.part(0));
    delete_if_exists(session, "logicalSwitch", &uri).await?;
    info!("logical switch {} deleted", resource_id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use nsx_test::MockSession;

    use crate::test_support::props;

    fn scope() -> UriParameters {
        UriParameters::new().with("scopeId", "vdnscope-1")
    }

    #[tokio::test]
    async fn test_reuse_existing_switch() {
        let session = MockSession::new().with_document(
            "logicalSwitches",
            &scope(),
            json!({"dataPage": {"data": [
                {"objectId": "virtualwire-1", "name": "web"},
                {"objectId": "virtualwire-2", "name": "db"}
            ]}}),
        );

        let id = add_logical_switch(&session, "vdnscope-1", &props(json!({"name": "db"})))
            .await
            .unwrap();
        assert_eq!(id.to_string(), "virtualwire-2");
        assert!(session.writes().is_empty());
    }

    #[tokio::test]
    async fn test_create_and_delete_switch() {
        let session = MockSession::new()
            .with_document("logicalSwitches", &scope(), json!({"dataPage": {"data": ""}}));

        let properties = props(json!({
            "name": "app",
            "controlPlaneMode": "UNICAST_MODE",
            "use_external_resource": false
        }));
        let id = add_logical_switch(&session, "vdnscope-1", &properties)
            .await
            .unwrap();
        assert_eq!(id.to_string(), "logicalswitches-1");

        let created = &session.writes_to("logicalSwitches")[0];
        assert_eq!(
            created.body,
            Some(json!({"virtualWireCreateSpec": {"name": "app", "controlPlaneMode": "UNICAST_MODE"}}))
        );

        del_logical_switch(&session, &id.to_string()).await.unwrap();
        let deleted = &session.writes_to("logicalSwitch")[0];
        assert_eq!(
            deleted.uri_parameters.get("virtualWireID"),
            Some("logicalswitches-1")
        );
    }
}
