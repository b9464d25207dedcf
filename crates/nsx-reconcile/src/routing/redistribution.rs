//! Route redistribution rules of BGP and OSPF

use std::fmt;
use std::str::FromStr;

use log::{debug, info};
use serde_json::{json, Value};

use nsx_core::{
    ensure_object, nested_list, nsx_read, NsxError, NsxResult, Properties, ResourceId, Session,
    UriParameters, ValidationError,
};

use crate::diff::{compact, identical_entry, loose_eq};
use crate::write;

const RULES: [&str; 3] = ["redistribution", "rules", "rule"];

/// Dynamic routing protocol owning a redistribution table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoutingProtocol {
    Bgp,
    Ospf,
}

impl RoutingProtocol {
    pub fn resource_type(&self) -> &'static str {
        match self {
            RoutingProtocol::Bgp => "routingBGP",
            RoutingProtocol::Ospf => "routingOSPF",
        }
    }

    pub fn element(&self) -> &'static str {
        match self {
            RoutingProtocol::Bgp => "bgp",
            RoutingProtocol::Ospf => "ospf",
        }
    }
}

impl fmt::Display for RoutingProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.element())
    }
}

impl FromStr for RoutingProtocol {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bgp" => Ok(RoutingProtocol::Bgp),
            "ospf" => Ok(RoutingProtocol::Ospf),
            _ => Err(ValidationError::NotAllowed {
                path: "protocol".to_string(),
                value: s.to_string(),
                allowed: "bgp, ospf".to_string(),
            }),
        }
    }
}

fn rule_id(rule: &Value) -> Option<u64> {
    match rule.get("id")? {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

/// Redistribute routes into `protocol`
///
/// Redistribution is switched on for the protocol. An identical rule is
/// reused; a new one gets the next free id.
pub async fn add_routing_rule(
    session: &dyn Session,
    edge_id: &str,
    protocol: RoutingProtocol,
    rule: &Properties,
) -> NsxResult<ResourceId> {
    let uri = UriParameters::edge(edge_id);
    let resource_type = protocol.resource_type();
    let element = protocol.element();
    let mut current = nsx_read(session, element, resource_type, &uri).await?;

    let mut wanted = rule.clone();
    wanted.remove("id");

    let redistribution = ensure_object(&mut current)
        .entry("redistribution".to_string())
        .or_insert(Value::Null);
    let was_enabled = redistribution
        .get("enabled")
        .map_or(false, |enabled| loose_eq(enabled, &json!(true)));
    ensure_object(redistribution).insert("enabled".to_string(), json!(true));

    let rules = nested_list(&mut current, &RULES);
    if let Some(existing) = rules.iter().find(|r| identical_entry(r, &wanted, &["id"])) {
        let id = rule_id(existing).ok_or_else(|| {
            NsxError::Unsupported(format!("{} redistribution rule without id", element))
        })?;
        let resource_id = ResourceId::new([edge_id.to_string(), element.to_string(), id.to_string()]);
        if was_enabled {
            debug!("{}: rule {} already present", edge_id, resource_id);
            return Ok(resource_id);
        }
        write(session, resource_type, &uri, json!({ element: current })).await?;
        info!("{}: {} redistribution enabled", edge_id, element);
        return Ok(resource_id);
    }

    let id = rules.iter().filter_map(rule_id).max().unwrap_or(0) + 1;
    let mut entry = compact(&wanted);
    ensure_object(&mut entry).insert("id".to_string(), json!(id));
    rules.push(entry);

    write(session, resource_type, &uri, json!({ element: current })).await?;
    let resource_id = ResourceId::new([edge_id.to_string(), element.to_string(), id.to_string()]);
    info!("{}: redistribution rule {} added", edge_id, resource_id);
    Ok(resource_id)
}

pub async fn del_routing_rule(session: &dyn Session, resource_id: &str) -> NsxResult<()> {
    let id = ResourceId::parse(resource_id, 3)?;
    let edge_id = id.part(0);
    let protocol: RoutingProtocol = id.part(1).parse()?;
    let rule = id.part(2);

    let uri = UriParameters::edge(edge_id);
    let resource_type = protocol.resource_type();
    let element = protocol.element();
    let mut current = nsx_read(session, element, resource_type, &uri).await?;

    let rules = nested_list(&mut current, &RULES);
    let before = rules.len();
    rules.retain(|r| rule_id(r).map(|n| n.to_string()).as_deref() != Some(rule));
    if rules.len() == before {
        debug!("{}: rule {} already absent", edge_id, resource_id);
        return Ok(());
    }

    write(session, resource_type, &uri, json!({ element: current })).await?;
    info!("{}: redistribution rule {} removed", edge_id, resource_id);
    Ok(())
}
