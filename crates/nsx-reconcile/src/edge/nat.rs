//! NAT rules of an ESG

use log::{debug, info};
use serde_json::json;

use nsx_core::{
    as_list, lookup_path, nsx_read, NsxResult, Properties, ResourceId, Session, UriParameters,
};

use crate::diff::{compact, identical_entry, scalar_text};
use crate::{create_object, delete_if_exists};

/// Fields the manager adds to every NAT rule
const MANAGED_FIELDS: [&str; 3] = ["ruleId", "ruleTag", "ruleType"];

/// Append a NAT rule unless an identical one exists
///
/// The id is `edge|ruleId`.
pub async fn add_nat_rule(
    session: &dyn Session,
    edge_id: &str,
    rule: &Properties,
) -> NsxResult<ResourceId> {
    let uri = UriParameters::edge(edge_id);
    let nat = nsx_read(session, "nat", "nat", &uri).await?;

    let existing = as_list(lookup_path(&nat, "natRules/natRule"))
        .into_iter()
        .filter(|entry| identical_entry(entry, rule, &MANAGED_FIELDS))
        .find_map(|entry| entry.get("ruleId").and_then(scalar_text));
    if let Some(rule_id) = existing {
        debug!("{}: NAT rule {} already present", edge_id, rule_id);
        return Ok(ResourceId::new([edge_id.to_string(), rule_id]));
    }

    let body = json!({ "natRules": { "natRule": [compact(rule)] } });
    let rule_id = create_object(session, "natRules", &uri, body).await?;
    info!("{}: NAT rule {} added", edge_id, rule_id);
    Ok(ResourceId::new([edge_id.to_string(), rule_id]))
}

pub async fn delete_nat_rule(session: &dyn Session, resource_id: &str) -> NsxResult<()> {
    let id = ResourceId::parse(resource_id, 2)?;
    let uri = UriParameters::edge(id.part(0)).with("ruleID", id.part(1));
    delete_if_exists(session, "natRule", &uri).await?;
    info!("NAT rule {} deleted", resource_id);
    Ok(())
}
