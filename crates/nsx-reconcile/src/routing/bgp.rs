//! BGP process and neighbours

use log::{debug, info};
use serde_json::{json, Value};

use nsx_core::{nested_list, nsx_read, NsxResult, Properties, ResourceId, Session, UriParameters};

use crate::diff::{compact, field_text, merge_fields, pick, same_key, subset_matches};
use crate::write;

const RESOURCE: &str = "routingBGP";
const ELEMENT: &str = "bgp";

const BGP_FIELDS: [&str; 5] = [
    "enabled",
    "localAS",
    "localASNumber",
    "gracefulRestart",
    "defaultOriginate",
];

/// Fields identifying a neighbour; NSX has no neighbour id
const NEIGHBOUR_KEY: [&str; 4] = [
    "ipAddress",
    "remoteAS",
    "protocolAddress",
    "forwardingAddress",
];

const NEIGHBOURS: [&str; 2] = ["bgpNeighbours", "bgpNeighbour"];

/// Enable/disable BGP and set the local AS
pub async fn update_bgp(
    session: &dyn Session,
    edge_id: &str,
    properties: &Properties,
) -> NsxResult<bool> {
    let uri = UriParameters::edge(edge_id);
    let mut current = nsx_read(session, ELEMENT, RESOURCE, &uri).await?;

    if !merge_fields(&mut current, &pick(properties, &BGP_FIELDS)) {
        debug!("{}: BGP already up to date", edge_id);
        return Ok(false);
    }

    write(session, RESOURCE, &uri, json!({ ELEMENT: current })).await?;
    info!("{}: BGP configuration updated", edge_id);
    Ok(true)
}

/// Add a neighbour, or replace a differing one with the same key
pub async fn add_bgp_neighbour(
    session: &dyn Session,
    edge_id: &str,
    neighbour: &Properties,
) -> NsxResult<ResourceId> {
    let uri = UriParameters::edge(edge_id);
    let mut current = nsx_read(session, ELEMENT, RESOURCE, &uri).await?;

    let resource_id = ResourceId::new(
        std::iter::once(edge_id.to_string())
            .chain(NEIGHBOUR_KEY.iter().map(|field| field_text(neighbour, field))),
    );

    let neighbours = nested_list(&mut current, &NEIGHBOURS);
    match neighbours
        .iter_mut()
        .find(|entry| same_key(entry, neighbour, &NEIGHBOUR_KEY))
    {
        Some(entry) if subset_matches(entry, neighbour) => {
            debug!("{}: neighbour {} already configured", edge_id, resource_id);
            return Ok(resource_id);
        }
        Some(entry) => *entry = compact(neighbour),
        None => neighbours.push(compact(neighbour)),
    }

    write(session, RESOURCE, &uri, json!({ ELEMENT: current })).await?;
    info!("{}: neighbour {} configured", edge_id, resource_id);
    Ok(resource_id)
}

pub async fn del_bgp_neighbour(session: &dyn Session, resource_id: &str) -> NsxResult<()> {
    let id = ResourceId::parse(resource_id, 1 + NEIGHBOUR_KEY.len())?;
    let edge_id = id.part(0);
    let key: Properties = NEIGHBOUR_KEY
        .iter()
        .enumerate()
        .map(|(i, field)| (field.to_string(), Value::String(id.part(i + 1).to_string())))
        .collect();

    let uri = UriParameters::edge(edge_id);
    let mut current = nsx_read(session, ELEMENT, RESOURCE, &uri).await?;

    let neighbours = nested_list(&mut current, &NEIGHBOURS);
    let before = neighbours.len();
    neighbours.retain(|entry| !same_key(entry, &key, &NEIGHBOUR_KEY));
    if neighbours.len() == before {
        debug!("{}: neighbour {} already absent", edge_id, resource_id);
        return Ok(());
    }

    write(session, RESOURCE, &uri, json!({ ELEMENT: current })).await?;
    info!("{}: neighbour {} removed", edge_id, resource_id);
    Ok(())
}
