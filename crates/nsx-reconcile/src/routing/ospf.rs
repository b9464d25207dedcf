//! OSPF process, areas and interfaces

use log::{debug, info};
use serde_json::{json, Value};

use nsx_core::{nested_list, nsx_read, NsxResult, Properties, ResourceId, Session, UriParameters};

use crate::diff::{compact, field_text, merge_fields, pick, same_key, subset_matches};
use crate::write;

const RESOURCE: &str = "routingOSPF";
const ELEMENT: &str = "ospf";

const OSPF_FIELDS: [&str; 5] = [
    "enabled",
    "defaultOriginate",
    "gracefulRestart",
    "protocolAddress",
    "forwardingAddress",
];

const AREAS: [&str; 2] = ["ospfAreas", "ospfArea"];
const AREA_KEY: [&str; 1] = ["areaId"];

const INTERFACES: [&str; 2] = ["ospfInterfaces", "ospfInterface"];
const INTERFACE_KEY: [&str; 2] = ["vnic", "areaId"];

/// Add `entry` to the list at `path` or update the one sharing `key`
///
/// Returns whether the configuration changed.
fn upsert(current: &mut Value, path: &[&str], key: &[&str], entry: &Properties) -> bool {
    let list = nested_list(current, path);
    match list.iter_mut().find(|e| same_key(e, entry, key)) {
        Some(existing) if subset_matches(existing, entry) => false,
        Some(existing) => merge_fields(existing, entry),
        None => {
            list.push(compact(entry));
            true
        }
    }
}

fn remove(current: &mut Value, path: &[&str], key: &[&str], entry: &Properties) -> bool {
    let list = nested_list(current, path);
    let before = list.len();
    list.retain(|e| !same_key(e, entry, key));
    list.len() != before
}

fn key_of(id: &ResourceId, key: &[&str]) -> Properties {
    key.iter()
        .enumerate()
        .map(|(i, field)| (field.to_string(), Value::String(id.part(i + 1).to_string())))
        .collect()
}

/// Enable/disable OSPF
pub async fn update_ospf(
    session: &dyn Session,
    edge_id: &str,
    properties: &Properties,
) -> NsxResult<bool> {
    let uri = UriParameters::edge(edge_id);
    let mut current = nsx_read(session, ELEMENT, RESOURCE, &uri).await?;

    if !merge_fields(&mut current, &pick(properties, &OSPF_FIELDS)) {
        debug!("{}: OSPF already up to date", edge_id);
        return Ok(false);
    }

    write(session, RESOURCE, &uri, json!({ ELEMENT: current })).await?;
    info!("{}: OSPF configuration updated", edge_id);
    Ok(true)
}

pub async fn add_ospf_area(
    session: &dyn Session,
    edge_id: &str,
    area: &Properties,
) -> NsxResult<ResourceId> {
    let uri = UriParameters::edge(edge_id);
    let mut current = nsx_read(session, ELEMENT, RESOURCE, &uri).await?;
    let resource_id = ResourceId::new([edge_id.to_string(), field_text(area, "areaId")]);

    if upsert(&mut current, &AREAS, &AREA_KEY, area) {
        write(session, RESOURCE, &uri, json!({ ELEMENT: current })).await?;
        info!("{}: OSPF area {} configured", edge_id, resource_id);
    }
    Ok(resource_id)
}

pub async fn del_ospf_area(session: &dyn Session, resource_id: &str) -> NsxResult<()> {
    let id = ResourceId::parse(resource_id, 1 + AREA_KEY.len())?;
    let uri = UriParameters::edge(id.part(0));
    let mut current = nsx_read(session, ELEMENT, RESOURCE, &uri).await?;

    if remove(&mut current, &AREAS, &AREA_KEY, &key_of(&id, &AREA_KEY)) {
        write(session, RESOURCE, &uri, json!({ ELEMENT: current })).await?;
        info!("OSPF area {} removed", resource_id);
    }
    Ok(())
}

pub async fn add_ospf_interface(
    session: &dyn Session,
    edge_id: &str,
    interface: &Properties,
) -> NsxResult<ResourceId> {
    let uri = UriParameters::edge(edge_id);
    let mut current = nsx_read(session, ELEMENT, RESOURCE, &uri).await?;
    let resource_id = ResourceId::new([
        edge_id.to_string(),
        field_text(interface, "vnic"),
        field_text(interface, "areaId"),
    ]);

    if upsert(&mut current, &INTERFACES, &INTERFACE_KEY, interface) {
        write(session, RESOURCE, &uri, json!({ ELEMENT: current })).await?;
        info!("{}: OSPF interface {} configured", edge_id, resource_id);
    }
    Ok(resource_id)
}

pub async fn del_ospf_interface(session: &dyn Session, resource_id: &str) -> NsxResult<()> {
    let id = ResourceId::parse(resource_id, 1 + INTERFACE_KEY.len())?;
    let uri = UriParameters::edge(id.part(0));
    let mut current = nsx_read(session, ELEMENT, RESOURCE, &uri).await?;

    if remove(
        &mut current,
        &INTERFACES,
        &INTERFACE_KEY,
        &key_of(&id, &INTERFACE_KEY),
    ) {
        write(session, RESOURCE, &uri, json!({ ELEMENT: current })).await?;
        info!("OSPF interface {} removed", resource_id);
    }
    Ok(())
}
