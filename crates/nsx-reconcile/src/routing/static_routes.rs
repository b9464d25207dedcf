//! Static routes and the default gateway

use log::{debug, info};
use serde_json::{json, Value};

use nsx_core::{
    ensure_object, nested_list, nsx_read, NsxResult, Properties, ResourceId, Session,
    UriParameters,
};

use crate::diff::{compact, field_text, merge_fields, pick, same_key, subset_matches};
use crate::write;

const RESOURCE: &str = "routingConfigStatic";
const ELEMENT: &str = "staticRouting";

const ROUTES: [&str; 2] = ["staticRoutes", "route"];
const ROUTE_KEY: [&str; 2] = ["network", "nextHop"];

const GATEWAY_FIELDS: [&str; 4] = ["vnic", "gatewayAddress", "adminDistance", "mtu"];

pub async fn add_static_route(
    session: &dyn Session,
    edge_id: &str,
    route: &Properties,
) -> NsxResult<ResourceId> {
    let uri = UriParameters::edge(edge_id);
    let mut current = nsx_read(session, ELEMENT, RESOURCE, &uri).await?;
    let resource_id = ResourceId::new([
        edge_id.to_string(),
        field_text(route, "network"),
        field_text(route, "nextHop"),
    ]);

    let routes = nested_list(&mut current, &ROUTES);
    match routes.iter_mut().find(|r| same_key(r, route, &ROUTE_KEY)) {
        Some(existing) if subset_matches(existing, route) => {
            debug!("{}: route {} already present", edge_id, resource_id);
            return Ok(resource_id);
        }
        Some(existing) => {
            merge_fields(existing, route);
        }
        None => routes.push(compact(route)),
    }

    write(session, RESOURCE, &uri, json!({ ELEMENT: current })).await?;
    info!("{}: static route {} configured", edge_id, resource_id);
    Ok(resource_id)
}

pub async fn del_static_route(session: &dyn Session, resource_id: &str) -> NsxResult<()> {
    let id = ResourceId::parse(resource_id, 3)?;
    let edge_id = id.part(0);
    let key: Properties = ROUTE_KEY
        .iter()
        .enumerate()
        .map(|(i, field)| (field.to_string(), Value::String(id.part(i + 1).to_string())))
        .collect();

    let uri = UriParameters::edge(edge_id);
    let mut current = nsx_read(session, ELEMENT, RESOURCE, &uri).await?;

    let routes = nested_list(&mut current, &ROUTES);
    let before = routes.len();
    routes.retain(|r| !same_key(r, &key, &ROUTE_KEY));
    if routes.len() == before {
        debug!("{}: route {} already absent", edge_id, resource_id);
        return Ok(());
    }

    write(session, RESOURCE, &uri, json!({ ELEMENT: current })).await?;
    info!("{}: static route {} removed", edge_id, resource_id);
    Ok(())
}

/// Default route of the edge; the id is the edge id
pub async fn set_default_gateway(
    session: &dyn Session,
    edge_id: &str,
    gateway: &Properties,
) -> NsxResult<ResourceId> {
    let uri = UriParameters::edge(edge_id);
    let mut current = nsx_read(session, ELEMENT, RESOURCE, &uri).await?;

    let default_route = ensure_object(&mut current)
        .entry("defaultRoute".to_string())
        .or_insert(Value::Null);
    if merge_fields(default_route, &pick(gateway, &GATEWAY_FIELDS)) {
        write(session, RESOURCE, &uri, json!({ ELEMENT: current })).await?;
        info!("{}: default gateway updated", edge_id);
    } else {
        debug!("{}: default gateway already up to date", edge_id);
    }
    Ok(ResourceId::single(edge_id))
}

pub async fn clear_default_gateway(session: &dyn Session, resource_id: &str) -> NsxResult<()> {
    let id = ResourceId::parse(resource_id, 1)?;
    let uri = UriParameters::edge(id.part(0));
    let mut current = nsx_read(session, ELEMENT, RESOURCE, &uri).await?;

    match ensure_object(&mut current).remove("defaultRoute") {
        Some(route) if !route.is_null() => {
            write(session, RESOURCE, &uri, json!({ ELEMENT: current })).await?;
            info!("{}: default gateway removed", resource_id);
        }
        _ => debug!("{}: no default gateway", resource_id),
    }
    Ok(())
}
