//! Security groups and their members

use log::{debug, info};
use serde_json::{json, Value};

use nsx_core::{
    check_raw_result, ensure_object, nsx_read, nsx_search, NsxResult, ResourceId, Session,
    UriParameters,
};

use super::listed_ids;
use crate::diff::loose_eq;
use crate::{create_object, delete_if_exists, write};

fn group_uri(group_id: &str) -> UriParameters {
    UriParameters::new().with("objectId", group_id)
}

/// Create a security group in `scope_id`, reusing one with the same name
pub async fn add_group(
    session: &dyn Session,
    scope_id: &str,
    name: &str,
    description: &str,
) -> NsxResult<ResourceId> {
    let uri = UriParameters::new().with("scopeId", scope_id);

    if let Some((object_id, _)) =
        nsx_search(session, "list/securitygroup", name, "secGroupScope", &uri).await?
    {
        debug!("security group {} already exists as {}", name, object_id);
        return Ok(ResourceId::single(object_id));
    }

    let body = json!({ "securitygroup": { "name": name, "description": description } });
    let object_id = create_object(session, "secGroupBulk", &uri, body).await?;
    info!("security group {} created as {}", name, object_id);
    Ok(ResourceId::single(object_id))
}

/// Delete a group; `force` also removes it from the policies using it
pub async fn del_group(session: &dyn Session, resource_id: &str, force: bool) -> NsxResult<()> {
    let id = ResourceId::parse(resource_id, 1)?;
    let uri = group_uri(id.part(0)).with("force", force.to_string());
    delete_if_exists(session, "secGroupObject", &uri).await?;
    info!("security group {} deleted", resource_id);
    Ok(())
}

/// Replace the dynamic membership criteria of a group
pub async fn set_dynamic_member(
    session: &dyn Session,
    group_id: &str,
    dynamic_sets: &Value,
) -> NsxResult<bool> {
    let uri = group_uri(group_id);
    let mut current = nsx_read(session, "securitygroup", "secGroupObject", &uri).await?;

    let definition = json!({ "dynamicSet": dynamic_sets });
    if current
        .get("dynamicMemberDefinition")
        .map_or(false, |existing| loose_eq(existing, &definition))
    {
        debug!("{}: dynamic membership already up to date", group_id);
        return Ok(false);
    }

    ensure_object(&mut current).insert("dynamicMemberDefinition".to_string(), definition);
    write(session, "secGroupObject", &uri, json!({ "securitygroup": current })).await?;
    info!("{}: dynamic membership updated", group_id);
    Ok(true)
}

/// Add a static member; the id is `group|member`
pub async fn add_group_member(
    session: &dyn Session,
    group_id: &str,
    member_id: &str,
) -> NsxResult<ResourceId> {
    let resource_id = ResourceId::new([group_id, member_id]);
    let members =
        listed_ids(session, "secGroupObject", &group_uri(group_id), "securitygroup/member").await?;

    if members.iter().any(|member| member == member_id) {
        debug!("{} already member of {}", member_id, group_id);
        return Ok(resource_id);
    }

    let uri = group_uri(group_id).with("memberMoref", member_id);
    check_raw_result(session.create("secGroupMember", &uri, None).await?)?;
    info!("{} added to {}", member_id, group_id);
    Ok(resource_id)
}

pub async fn del_group_member(session: &dyn Session, resource_id: &str) -> NsxResult<()> {
    let id = ResourceId::parse(resource_id, 2)?;
    let uri = group_uri(id.part(0)).with("memberMoref", id.part(1));
    delete_if_exists(session, "secGroupMember", &uri).await?;
    info!("{} removed from {}", id.part(1), id.part(0));
    Ok(())
}
