//! NSX object reconciliation
//!
//! Every helper reads the live representation of an NSX object, computes
//! the minimal change towards the requested properties and writes back only
//! when something differs. Sub-objects without an id of their own are
//! addressed through composite `ResourceId`s.

pub mod diff;
pub mod edge;
pub mod logical_switch;
pub mod routing;
pub mod security;

pub use diff::{
    compact, field_text, identical_entry, loose_eq, merge_fields, pick, same_key, subset_matches,
};
pub use edge::{
    create_edge, delete_edge, delete_nat_rule, dlr_add_interface, dlr_del_interface,
    esg_cfg_interface, esg_clear_interface, esg_fw_default_set, find_edge_by_name, add_nat_rule,
    EdgeKind,
};
pub use logical_switch::{add_logical_switch, del_logical_switch};
pub use routing::{
    add_bgp_neighbour, add_ospf_area, add_ospf_interface, add_routing_prefix, add_routing_rule,
    add_static_route, clear_default_gateway, del_bgp_neighbour, del_ospf_area,
    del_ospf_interface, del_routing_prefix, del_routing_rule, del_static_route,
    set_default_gateway, update_bgp, update_ospf, update_routing_global, RoutingProtocol,
};
pub use security::{
    add_group, add_group_member, add_policy, add_policy_group_bind, add_policy_section, add_tag,
    add_tag_vm, del_group, del_group_member, del_policy, del_policy_group_bind,
    del_policy_section, delete_tag, delete_tag_vm, set_dynamic_member,
};

use log::info;
use serde_json::Value;

use nsx_core::{check_raw_result, NsxError, NsxResult, Session, UriParameters};

/// Write a full object back with `update`
pub(crate) async fn write(
    session: &dyn Session,
    resource_type: &str,
    uri: &UriParameters,
    body: Value,
) -> NsxResult<()> {
    check_raw_result(session.update(resource_type, uri, Some(body)).await?)?;
    Ok(())
}

/// Create an object and return the id assigned by the manager
pub(crate) async fn create_object(
    session: &dyn Session,
    resource_type: &str,
    uri: &UriParameters,
    body: Value,
) -> NsxResult<String> {
    let response = check_raw_result(session.create(resource_type, uri, Some(body)).await?)?;
    response
        .object_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| NsxError::MissingElement {
            resource_type: resource_type.to_string(),
            path: "objectId".to_string(),
        })
}

/// Delete an object; an object that is already gone counts as deleted
pub(crate) async fn delete_if_exists(
    session: &dyn Session,
    resource_type: &str,
    uri: &UriParameters,
) -> NsxResult<()> {
    let response = session.delete(resource_type, uri).await?;
    if response.status == 404 {
        info!("{} {:?} already deleted", resource_type, uri);
        return Ok(());
    }
    check_raw_result(response)?;
    Ok(())
}

#[cfg(test)]
pub(crate) mod test_support;
