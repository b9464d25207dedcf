//! Global routing configuration and IP prefixes

use log::{debug, info};
use serde_json::{json, Value};

use nsx_core::{nested_list, nsx_read, NsxResult, Properties, ResourceId, Session, UriParameters};

use crate::diff::{loose_eq, merge_fields, pick};
use crate::write;

const RESOURCE: &str = "routingGlobalConfig";
const ELEMENT: &str = "routingGlobalConfig";

const GLOBAL_FIELDS: [&str; 3] = ["routerId", "ecmp", "logging"];

async fn read_global(session: &dyn Session, uri: &UriParameters) -> NsxResult<Value> {
    nsx_read(session, ELEMENT, RESOURCE, uri).await
}

/// Router id, ECMP and routing log settings
pub async fn update_routing_global(
    session: &dyn Session,
    edge_id: &str,
    properties: &Properties,
) -> NsxResult<bool> {
    let uri = UriParameters::edge(edge_id);
    let mut current = read_global(session, &uri).await?;

    if !merge_fields(&mut current, &pick(properties, &GLOBAL_FIELDS)) {
        debug!("{}: global routing already up to date", edge_id);
        return Ok(false);
    }

    write(session, RESOURCE, &uri, json!({ ELEMENT: current })).await?;
    info!("{}: global routing updated", edge_id);
    Ok(true)
}

/// Named prefix usable by redistribution rules
pub async fn add_routing_prefix(
    session: &dyn Session,
    edge_id: &str,
    name: &str,
    ip_address: &str,
) -> NsxResult<ResourceId> {
    let uri = UriParameters::edge(edge_id);
    let mut current = read_global(session, &uri).await?;
    let resource_id = ResourceId::new([edge_id, name]);

    let prefixes = nested_list(&mut current, &["ipPrefixes", "ipPrefix"]);
    let wanted = Value::String(ip_address.to_string());
    match prefixes
        .iter_mut()
        .find(|p| p.get("name").and_then(Value::as_str) == Some(name))
    {
        Some(prefix) if prefix.get("ipAddress").map_or(false, |ip| loose_eq(ip, &wanted)) => {
            debug!("{}: prefix {} already present", edge_id, name);
            return Ok(resource_id);
        }
        Some(prefix) => {
            prefix["ipAddress"] = wanted;
        }
        None => prefixes.push(json!({ "name": name, "ipAddress": ip_address })),
    }

    write(session, RESOURCE, &uri, json!({ ELEMENT: current })).await?;
    info!("{}: prefix {} set to {}", edge_id, name, ip_address);
    Ok(resource_id)
}

pub async fn del_routing_prefix(session: &dyn Session, resource_id: &str) -> NsxResult<()> {
    let id = ResourceId::parse(resource_id, 2)?;
    let (edge_id, name) = (id.part(0), id.part(1));
    let uri = UriParameters::edge(edge_id);
    let mut current = read_global(session, &uri).await?;

    let prefixes = nested_list(&mut current, &["ipPrefixes", "ipPrefix"]);
    let before = prefixes.len();
    prefixes.retain(|p| p.get("name").and_then(Value::as_str) != Some(name));
    if prefixes.len() == before {
        debug!("{}: prefix {} already absent", edge_id, name);
        return Ok(());
    }

    write(session, RESOURCE, &uri, json!({ ELEMENT: current })).await
}
