//! Security groups, policies and tags

use async_trait::async_trait;
use log::debug;
use serde_json::Value;

use nsx_config::NodeContext;
use nsx_core::{
    nsx_search, NsxResult, Properties, ResourceId, Session, UriParameters, ValidationError,
};
use nsx_reconcile::{
    add_group, add_group_member, add_policy, add_policy_group_bind, add_policy_section, add_tag,
    add_tag_vm, del_group, del_group_member, del_policy, del_policy_group_bind,
    del_policy_section, delete_tag, delete_tag_vm, set_dynamic_member,
};
use nsx_validate::{FieldRule, Schema};

use super::{take_text, text};
use crate::lifecycle::Lifecycle;

fn resource_id_of<'a>(ctx: &'a NodeContext, role: &str) -> NsxResult<&'a str> {
    ctx.resource_id().ok_or_else(|| {
        ValidationError::MissingField {
            path: format!("{}.resource_id", role),
        }
        .into()
    })
}

/// `nsx.SecurityGroup`
///
/// A relationship to another node makes the object behind that node a
/// static member of the group.
pub struct SecurityGroup;

#[async_trait]
impl Lifecycle for SecurityGroup {
    fn node_type(&self) -> &'static str {
        "nsx.SecurityGroup"
    }

    fn property_name(&self) -> &'static str {
        "group"
    }

    fn schema(&self) -> Schema {
        Schema::new()
            .field("name", FieldRule::string().required())
            .field("scopeId", FieldRule::string().with_default("globalroot-0"))
            .field("description", FieldRule::string().with_default(""))
            .field("dynamicSet", FieldRule::list())
    }

    async fn provision(
        &self,
        session: &dyn Session,
        properties: &Properties,
    ) -> NsxResult<ResourceId> {
        let group_id = add_group(
            session,
            text(properties, "scopeId"),
            text(properties, "name"),
            text(properties, "description"),
        )
        .await?;

        if let Some(sets) = properties.get("dynamicSet").filter(|v| !v.is_null()) {
            set_dynamic_member(session, group_id.part(0), sets).await?;
        }
        Ok(group_id)
    }

    async fn release(
        &self,
        session: &dyn Session,
        resource_id: &str,
        _properties: &Properties,
    ) -> NsxResult<()> {
        del_group(session, resource_id, true).await
    }

    async fn lookup(
        &self,
        session: &dyn Session,
        properties: &Properties,
    ) -> NsxResult<Option<ResourceId>> {
        let uri = UriParameters::new().with("scopeId", text(properties, "scopeId"));
        let found = nsx_search(
            session,
            "list/securitygroup",
            text(properties, "name"),
            "secGroupScope",
            &uri,
        )
        .await?;
        Ok(found.map(|(object_id, _)| ResourceId::single(object_id)))
    }

    async fn link(
        &self,
        session: &dyn Session,
        ctx: &mut NodeContext,
        target: &NodeContext,
    ) -> NsxResult<()> {
        let group_id = resource_id_of(ctx, "source")?;
        let member_id = resource_id_of(target, "target")?;
        add_group_member(session, group_id, member_id).await?;
        Ok(())
    }

    async fn unlink(
        &self,
        session: &dyn Session,
        ctx: &mut NodeContext,
        target: &NodeContext,
    ) -> NsxResult<()> {
        let (Some(group_id), Some(member_id)) = (ctx.resource_id(), target.resource_id()) else {
            debug!("{}: no membership to remove", ctx.node_id);
            return Ok(());
        };
        let membership = ResourceId::new([group_id, member_id]);
        del_group_member(session, &membership.to_string()).await
    }
}

/// `nsx.SecurityGroupMember`: static member of a group
pub struct SecurityGroupMember;

#[async_trait]
impl Lifecycle for SecurityGroupMember {
    fn node_type(&self) -> &'static str {
        "nsx.SecurityGroupMember"
    }

    fn property_name(&self) -> &'static str {
        "group_member"
    }

    fn schema(&self) -> Schema {
        Schema::new()
            .field("securityGroupId", FieldRule::string().required())
            .field("memberId", FieldRule::string().required())
    }

    async fn provision(
        &self,
        session: &dyn Session,
        properties: &Properties,
    ) -> NsxResult<ResourceId> {
        add_group_member(
            session,
            text(properties, "securityGroupId"),
            text(properties, "memberId"),
        )
        .await
    }

    async fn release(
        &self,
        session: &dyn Session,
        resource_id: &str,
        _properties: &Properties,
    ) -> NsxResult<()> {
        del_group_member(session, resource_id).await
    }
}

/// `nsx.SecurityPolicy`
pub struct SecurityPolicy;

#[async_trait]
impl Lifecycle for SecurityPolicy {
    fn node_type(&self) -> &'static str {
        "nsx.SecurityPolicy"
    }

    fn property_name(&self) -> &'static str {
        "policy"
    }

    fn schema(&self) -> Schema {
        Schema::new()
            .field("name", FieldRule::string().required())
            .field("description", FieldRule::string())
            .field("precedence", FieldRule::integer().required())
            .field("parent", FieldRule::dict())
            .field("securityGroupBinding", FieldRule::list())
            .field("actionsByCategory", FieldRule::list())
    }

    async fn provision(
        &self,
        session: &dyn Session,
        properties: &Properties,
    ) -> NsxResult<ResourceId> {
        add_policy(session, properties).await
    }

    async fn release(
        &self,
        session: &dyn Session,
        resource_id: &str,
        _properties: &Properties,
    ) -> NsxResult<()> {
        del_policy(session, resource_id).await
    }

    async fn lookup(
        &self,
        session: &dyn Session,
        properties: &Properties,
    ) -> NsxResult<Option<ResourceId>> {
        let found = nsx_search(
            session,
            "securityPolicies/securityPolicy",
            text(properties, "name"),
            "securityPolicyAll",
            &UriParameters::new(),
        )
        .await?;
        Ok(found.map(|(object_id, _)| ResourceId::single(object_id)))
    }
}

/// `nsx.SecurityPolicyGroupBind`: policy applied to a group
pub struct SecurityPolicyGroupBind;

#[async_trait]
impl Lifecycle for SecurityPolicyGroupBind {
    fn node_type(&self) -> &'static str {
        "nsx.SecurityPolicyGroupBind"
    }

    fn property_name(&self) -> &'static str {
        "policy_group_bind"
    }

    fn schema(&self) -> Schema {
        Schema::new()
            .field("securityPolicyId", FieldRule::string().required())
            .field("securityGroupId", FieldRule::string().required())
    }

    async fn provision(
        &self,
        session: &dyn Session,
        properties: &Properties,
    ) -> NsxResult<ResourceId> {
        add_policy_group_bind(
            session,
            text(properties, "securityPolicyId"),
            text(properties, "securityGroupId"),
        )
        .await
    }

    async fn release(
        &self,
        session: &dyn Session,
        resource_id: &str,
        _properties: &Properties,
    ) -> NsxResult<()> {
        del_policy_group_bind(session, resource_id).await
    }
}

/// `nsx.SecurityPolicySection`: actions of one category of a policy
pub struct SecurityPolicySection;

#[async_trait]
impl Lifecycle for SecurityPolicySection {
    fn node_type(&self) -> &'static str {
        "nsx.SecurityPolicySection"
    }

    fn property_name(&self) -> &'static str {
        "policy_section"
    }

    fn schema(&self) -> Schema {
        let action = Schema::new()
            .field("name", FieldRule::string().required())
            .field("class", FieldRule::string())
            .field("action", FieldRule::string())
            .field("direction", FieldRule::string())
            .field("isEnabled", FieldRule::boolean().with_default(true));

        Schema::new()
            .field("securityPolicyId", FieldRule::string().required())
            .field(
                "category",
                FieldRule::string()
                    .required()
                    .values(&["firewall", "endpoint", "traffic_steering"]),
            )
            .field("action", FieldRule::list().required().sub(action))
    }

    async fn provision(
        &self,
        session: &dyn Session,
        properties: &Properties,
    ) -> NsxResult<ResourceId> {
        let mut section = properties.clone();
        let policy_id = take_text(&mut section, "securityPolicyId")?;
        let category = take_text(&mut section, "category")?;
        let actions = section.remove("action").unwrap_or(Value::Null);
        add_policy_section(session, &policy_id, &category, &actions).await
    }

    async fn release(
        &self,
        session: &dyn Session,
        resource_id: &str,
        _properties: &Properties,
    ) -> NsxResult<()> {
        del_policy_section(session, resource_id).await
    }
}

/// `nsx.SecurityTag`
pub struct SecurityTag;

#[async_trait]
impl Lifecycle for SecurityTag {
    fn node_type(&self) -> &'static str {
        "nsx.SecurityTag"
    }

    fn property_name(&self) -> &'static str {
        "tag"
    }

    fn schema(&self) -> Schema {
        Schema::new()
            .field("name", FieldRule::string().required())
            .field("description", FieldRule::string().with_default(""))
    }

    async fn provision(
        &self,
        session: &dyn Session,
        properties: &Properties,
    ) -> NsxResult<ResourceId> {
        add_tag(
            session,
            text(properties, "name"),
            text(properties, "description"),
        )
        .await
    }

    async fn release(
        &self,
        session: &dyn Session,
        resource_id: &str,
        _properties: &Properties,
    ) -> NsxResult<()> {
        delete_tag(session, resource_id).await
    }

    async fn lookup(
        &self,
        session: &dyn Session,
        properties: &Properties,
    ) -> NsxResult<Option<ResourceId>> {
        let found = nsx_search(
            session,
            "securityTags/securityTag",
            text(properties, "name"),
            "securityTag",
            &UriParameters::new(),
        )
        .await?;
        Ok(found.map(|(object_id, _)| ResourceId::single(object_id)))
    }
}

/// `nsx.SecurityTagVM`: tag attached to a VM
pub struct SecurityTagVm;

#[async_trait]
impl Lifecycle for SecurityTagVm {
    fn node_type(&self) -> &'static str {
        "nsx.SecurityTagVM"
    }

    fn property_name(&self) -> &'static str {
        "vm_tag"
    }

    fn schema(&self) -> Schema {
        Schema::new()
            .field("tagId", FieldRule::string().required())
            .field("vmId", FieldRule::string().required())
    }

    async fn provision(
        &self,
        session: &dyn Session,
        properties: &Properties,
    ) -> NsxResult<ResourceId> {
        add_tag_vm(session, text(properties, "tagId"), text(properties, "vmId")).await
    }

    async fn release(
        &self,
        session: &dyn Session,
        resource_id: &str,
        _properties: &Properties,
    ) -> NsxResult<()> {
        delete_tag_vm(session, resource_id).await
    }
}
