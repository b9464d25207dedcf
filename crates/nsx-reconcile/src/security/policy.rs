//! Security policies, their group bindings and per-category action sections

use log::{debug, info};
use serde_json::{json, Value};

use nsx_core::{
    as_list, nested_list, nsx_read, nsx_search, struct_get_list, NsxResult, Properties,
    ResourceId, Session, UriParameters,
};

use crate::diff::{compact, loose_eq, merge_fields, scalar_text, subset_matches};
use crate::{create_object, delete_if_exists, write};

const RESOURCE: &str = "securityPolicyID";
const ELEMENT: &str = "securityPolicy";

fn policy_uri(policy_id: &str) -> UriParameters {
    UriParameters::new().with("ID", policy_id)
}

/// Create a security policy, reusing one with the same name
pub async fn add_policy(session: &dyn Session, properties: &Properties) -> NsxResult<ResourceId> {
    let name = properties
        .get("name")
        .and_then(Value::as_str)
        .unwrap_or_default();

    if let Some((object_id, _)) = nsx_search(
        session,
        "securityPolicies/securityPolicy",
        name,
        "securityPolicyAll",
        &UriParameters::new(),
    )
    .await?
    {
        debug!("security policy {} already exists as {}", name, object_id);
        return Ok(ResourceId::single(object_id));
    }

    let body = json!({ ELEMENT: compact(properties) });
    let object_id = create_object(session, "securityPolicy", &UriParameters::new(), body).await?;
    info!("security policy {} created as {}", name, object_id);
    Ok(ResourceId::single(object_id))
}

pub async fn del_policy(session: &dyn Session, resource_id: &str) -> NsxResult<()> {
    let id = ResourceId::parse(resource_id, 1)?;
    let uri = policy_uri(id.part(0)).with("force", "true");
    delete_if_exists(session, RESOURCE, &uri).await?;
    info!("security policy {} deleted", resource_id);
    Ok(())
}

/// Apply a policy to a security group; the id is `policy|group`
pub async fn add_policy_group_bind(
    session: &dyn Session,
    policy_id: &str,
    group_id: &str,
) -> NsxResult<ResourceId> {
    let uri = policy_uri(policy_id);
    let resource_id = ResourceId::new([policy_id, group_id]);
    let mut current = nsx_read(session, ELEMENT, RESOURCE, &uri).await?;

    let bindings = struct_get_list(&mut current, "securityGroupBinding");
    if bindings
        .iter()
        .any(|binding| binding.get("objectId").and_then(Value::as_str) == Some(group_id))
    {
        debug!("{} already bound to {}", policy_id, group_id);
        return Ok(resource_id);
    }
    bindings.push(json!({ "objectId": group_id }));

    write(session, RESOURCE, &uri, json!({ ELEMENT: current })).await?;
    info!("{} bound to {}", policy_id, group_id);
    Ok(resource_id)
}

pub async fn del_policy_group_bind(session: &dyn Session, resource_id: &str) -> NsxResult<()> {
    let id = ResourceId::parse(resource_id, 2)?;
    let (policy_id, group_id) = (id.part(0), id.part(1));
    let uri = policy_uri(policy_id);
    let mut current = nsx_read(session, ELEMENT, RESOURCE, &uri).await?;

    let bindings = struct_get_list(&mut current, "securityGroupBinding");
    let before = bindings.len();
    bindings.retain(|binding| binding.get("objectId").and_then(Value::as_str) != Some(group_id));
    if bindings.len() == before {
        debug!("{} not bound to {}", policy_id, group_id);
        return Ok(());
    }

    write(session, RESOURCE, &uri, json!({ ELEMENT: current })).await?;
    info!("{} unbound from {}", policy_id, group_id);
    Ok(())
}

fn same_category(section: &Value, category: &str) -> bool {
    section
        .get("category")
        .and_then(scalar_text)
        .map_or(false, |c| c == category)
}

/// Merge `actions` into the `category` section of a policy
///
/// Actions are matched by name; unknown ones are appended. The id is
/// `policy|category`.
pub async fn add_policy_section(
    session: &dyn Session,
    policy_id: &str,
    category: &str,
    actions: &Value,
) -> NsxResult<ResourceId> {
    let uri = policy_uri(policy_id);
    let resource_id = ResourceId::new([policy_id, category]);
    let mut current = nsx_read(session, ELEMENT, RESOURCE, &uri).await?;

    let sections = struct_get_list(&mut current, "actionsByCategory");
    let position = match sections.iter().position(|s| same_category(s, category)) {
        Some(position) => position,
        None => {
            sections.push(json!({ "category": category }));
            sections.len() - 1
        }
    };

    let listed = nested_list(&mut sections[position], &["action"]);
    let mut changed = false;
    for wanted in as_list(Some(actions)) {
        let Value::Object(wanted) = wanted else {
            continue;
        };
        let name = wanted.get("name").cloned().unwrap_or(Value::Null);
        match listed
            .iter_mut()
            .find(|action| action.get("name").map_or(false, |n| loose_eq(n, &name)))
        {
            Some(action) if subset_matches(action, &wanted) => {}
            Some(action) => changed |= merge_fields(action, &wanted),
            None => {
                listed.push(compact(&wanted));
                changed = true;
            }
        }
    }

    if !changed {
        debug!("{}: {} section already up to date", policy_id, category);
        return Ok(resource_id);
    }

    write(session, RESOURCE, &uri, json!({ ELEMENT: current })).await?;
    info!("{}: {} section updated", policy_id, category);
    Ok(resource_id)
}

pub async fn del_policy_section(session: &dyn Session, resource_id: &str) -> NsxResult<()> {
    let id = ResourceId::parse(resource_id, 2)?;
    let (policy_id, category) = (id.part(0), id.part(1));
    let uri = policy_uri(policy_id);
    let mut current = nsx_read(session, ELEMENT, RESOURCE, &uri).await?;

    let sections = struct_get_list(&mut current, "actionsByCategory");
    let before = sections.len();
    sections.retain(|s| !same_category(s, category));
    if sections.len() == before {
        debug!("{}: no {} section", policy_id, category);
        return Ok(());
    }

    write(session, RESOURCE, &uri, json!({ ELEMENT: current })).await?;
    info!("{}: {} section removed", policy_id, category);
    Ok(())
}
