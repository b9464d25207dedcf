//! Interfaces of ESGs (vnics) and DLRs
//!
//! ESG vnics always exist and are configured in place by index. DLR
//! interfaces are created on demand and get their index from the manager.

use log::{debug, info};
use serde_json::{json, Value};

use nsx_core::{
    as_list, check_raw_result, lookup_path, nsx_read, NsxError, NsxResult, Properties,
    ResourceId, Session, UriParameters,
};

use crate::delete_if_exists;
use crate::diff::{compact, merge_fields, scalar_text};
use crate::write;

const DLR_INTERFACES: &str = "interfaces/interface";

fn vnic_uri(edge_id: &str, index: &str) -> UriParameters {
    UriParameters::edge(edge_id).with("index", index)
}

/// Configure vnic `index` of an ESG
pub async fn esg_cfg_interface(
    session: &dyn Session,
    edge_id: &str,
    index: &str,
    properties: &Properties,
) -> NsxResult<ResourceId> {
    let uri = vnic_uri(edge_id, index);
    let mut current = nsx_read(session, "vnic", "vnic", &uri).await?;
    let resource_id = ResourceId::new([edge_id, index]);

    let mut wanted = properties.clone();
    wanted.remove("index");
    if merge_fields(&mut current, &wanted) {
        write(session, "vnic", &uri, json!({ "vnic": current })).await?;
        info!("{}: vnic {} configured", edge_id, index);
    } else {
        debug!("{}: vnic {} already up to date", edge_id, index);
    }
    Ok(resource_id)
}

/// Reset an ESG vnic to its unconfigured state
pub async fn esg_clear_interface(session: &dyn Session, resource_id: &str) -> NsxResult<()> {
    let id = ResourceId::parse(resource_id, 2)?;
    delete_if_exists(session, "vnic", &vnic_uri(id.part(0), id.part(1))).await?;
    info!("vnic {} cleared", resource_id);
    Ok(())
}

async fn find_dlr_interface(
    session: &dyn Session,
    edge_id: &str,
    name: &str,
) -> NsxResult<Option<String>> {
    let response = check_raw_result(session.read("interfaces", &UriParameters::edge(edge_id)).await?)?;
    Ok(interface_index(&response.body, name))
}

fn interface_index(body: &Value, name: &str) -> Option<String> {
    as_list(lookup_path(body, DLR_INTERFACES))
        .into_iter()
        .find(|interface| interface.get("name").and_then(Value::as_str) == Some(name))
        .and_then(|interface| interface.get("index").and_then(scalar_text))
}

/// Add an interface to a DLR, reusing one with the same name
pub async fn dlr_add_interface(
    session: &dyn Session,
    edge_id: &str,
    properties: &Properties,
) -> NsxResult<ResourceId> {
    let name = properties
        .get("name")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    if let Some(index) = find_dlr_interface(session, edge_id, &name).await? {
        debug!("{}: interface {} already present as {}", edge_id, name, index);
        return Ok(ResourceId::new([edge_id.to_string(), index]));
    }

    let uri = UriParameters::edge(edge_id).with("action", "patch");
    let body = json!({ "interfaces": { "interface": [compact(properties)] } });
    let response = check_raw_result(session.create("interfaces", &uri, Some(body)).await?)?;

    // the manager answers with the interface list, an id or nothing at all
    let index = match interface_index(&response.body, &name).or(response.object_id) {
        Some(index) => index,
        None => find_dlr_interface(session, edge_id, &name)
            .await?
            .ok_or_else(|| NsxError::MissingElement {
                resource_type: "interfaces".to_string(),
                path: format!("{}/{}", DLR_INTERFACES, name),
            })?,
    };

    info!("{}: interface {} added as {}", edge_id, name, index);
    Ok(ResourceId::new([edge_id.to_string(), index]))
}

pub async fn dlr_del_interface(session: &dyn Session, resource_id: &str) -> NsxResult<()> {
    let id = ResourceId::parse(resource_id, 2)?;
    delete_if_exists(session, "interface", &vnic_uri(id.part(0), id.part(1))).await?;
    info!("DLR interface {} deleted", resource_id);
    Ok(())
}
