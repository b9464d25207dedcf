//! Security tags and their attachment to VMs

use log::{debug, info};
use serde_json::json;

use nsx_core::{check_raw_result, nsx_search, NsxResult, ResourceId, Session, UriParameters};

use super::listed_ids;
use crate::{create_object, delete_if_exists};

const TAGGED_VMS: &str = "basicinfolist/basicinfo";

fn tag_uri(tag_id: &str) -> UriParameters {
    UriParameters::new().with("tagId", tag_id)
}

fn tag_vm_uri(tag_id: &str, vm_id: &str) -> UriParameters {
    tag_uri(tag_id).with("vmMoid", vm_id)
}

/// Create a security tag, reusing one with the same name
pub async fn add_tag(session: &dyn Session, name: &str, description: &str) -> NsxResult<ResourceId> {
    let uri = UriParameters::new();

    if let Some((object_id, _)) =
        nsx_search(session, "securityTags/securityTag", name, "securityTag", &uri).await?
    {
        debug!("security tag {} already exists as {}", name, object_id);
        return Ok(ResourceId::single(object_id));
    }

    let body = json!({ "securityTag": {
        "objectTypeName": "SecurityTag",
        "type": { "typeName": "SecurityTag" },
        "name": name,
        "description": description,
    }});
    let object_id = create_object(session, "securityTag", &uri, body).await?;
    info!("security tag {} created as {}", name, object_id);
    Ok(ResourceId::single(object_id))
}

pub async fn delete_tag(session: &dyn Session, resource_id: &str) -> NsxResult<()> {
    let id = ResourceId::parse(resource_id, 1)?;
    delete_if_exists(session, "securityTagID", &tag_uri(id.part(0))).await?;
    info!("security tag {} deleted", resource_id);
    Ok(())
}

async fn is_tagged(session: &dyn Session, tag_id: &str, vm_id: &str) -> NsxResult<bool> {
    let vms = listed_ids(session, "securityTagVMsList", &tag_uri(tag_id), TAGGED_VMS).await?;
    Ok(vms.iter().any(|vm| vm == vm_id))
}

/// Attach a tag to a VM; the id is `tag|vm`
pub async fn add_tag_vm(session: &dyn Session, tag_id: &str, vm_id: &str) -> NsxResult<ResourceId> {
    let resource_id = ResourceId::new([tag_id, vm_id]);
    if is_tagged(session, tag_id, vm_id).await? {
        debug!("{} already tagged with {}", vm_id, tag_id);
        return Ok(resource_id);
    }

    check_raw_result(
        session
            .create("securityTagVM", &tag_vm_uri(tag_id, vm_id), None)
            .await?,
    )?;
    info!("{} tagged with {}", vm_id, tag_id);
    Ok(resource_id)
}

pub async fn delete_tag_vm(session: &dyn Session, resource_id: &str) -> NsxResult<()> {
    let id = ResourceId::parse(resource_id, 2)?;
    let (tag_id, vm_id) = (id.part(0), id.part(1));
    if !is_tagged(session, tag_id, vm_id).await? {
        debug!("{} not tagged with {}", vm_id, tag_id);
        return Ok(());
    }

    delete_if_exists(session, "securityTagVM", &tag_vm_uri(tag_id, vm_id)).await?;
    info!("{} untagged from {}", vm_id, tag_id);
    Ok(())
}
