//! Service composer objects: security groups, policies and tags

pub mod group;
pub mod policy;
pub mod tag;

pub use group::{add_group, add_group_member, del_group, del_group_member, set_dynamic_member};
pub use policy::{
    add_policy, add_policy_group_bind, add_policy_section, del_policy, del_policy_group_bind,
    del_policy_section,
};
pub use tag::{add_tag, add_tag_vm, delete_tag, delete_tag_vm};

use serde_json::Value;

use nsx_core::{as_list, check_raw_result, lookup_path, NsxResult, Session, UriParameters};

/// `objectId`s of the elements listed at `path`
pub(crate) async fn listed_ids(
    session: &dyn Session,
    resource_type: &str,
    uri: &UriParameters,
    path: &str,
) -> NsxResult<Vec<String>> {
    let response = check_raw_result(session.read(resource_type, uri).await?)?;
    Ok(as_list(lookup_path(&response.body, path))
        .iter()
        .filter_map(|item| item.get("objectId").and_then(Value::as_str))
        .map(str::to_string)
        .collect())
}
