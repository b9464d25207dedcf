//! Edge Services Gateways and Distributed Logical Routers

use std::fmt;
use std::str::FromStr;

use log::{debug, info};
use serde_json::{json, Value};

use nsx_core::{
    as_list, check_raw_result, ensure_object, lookup_path, NsxResult, Properties,
    ResourceId, Session, UriParameters, ValidationError,
};

use crate::diff::compact;
use crate::{create_object, delete_if_exists};

const EDGES: &str = "pagedEdgeList/edgePage/data";

/// Flavour of an edge appliance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeKind {
    Esg,
    Dlr,
}

impl EdgeKind {
    /// Value of the `type` field of the edge
    pub fn edge_type(&self) -> &'static str {
        match self {
            EdgeKind::Esg => "gatewayServices",
            EdgeKind::Dlr => "distributedRouter",
        }
    }
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EdgeKind::Esg => f.write_str("esg"),
            EdgeKind::Dlr => f.write_str("dlr"),
        }
    }
}

impl FromStr for EdgeKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "esg" | "gatewayservices" => Ok(EdgeKind::Esg),
            "dlr" | "distributedrouter" => Ok(EdgeKind::Dlr),
            _ => Err(ValidationError::NotAllowed {
                path: "type".to_string(),
                value: s.to_string(),
                allowed: "esg, dlr".to_string(),
            }),
        }
    }
}

/// Id of the edge called `name`, if any
///
/// Edge summaries carry their id as `objectId` or `id` depending on the
/// manager version.
pub async fn find_edge_by_name(session: &dyn Session, name: &str) -> NsxResult<Option<String>> {
    let response = check_raw_result(session.read("nsxEdges", &UriParameters::new()).await?)?;

    let found = as_list(lookup_path(&response.body, EDGES))
        .into_iter()
        .find(|edge| edge.get("name").and_then(Value::as_str) == Some(name))
        .and_then(|edge| {
            ["objectId", "id"]
                .iter()
                .find_map(|key| edge.get(*key).and_then(Value::as_str).map(str::to_string))
        });
    Ok(found)
}

/// Deploy an edge, or reuse the one already carrying the requested name
pub async fn create_edge(
    session: &dyn Session,
    kind: EdgeKind,
    properties: &Properties,
) -> NsxResult<ResourceId> {
    let name = properties
        .get("name")
        .and_then(Value::as_str)
        .filter(|name| !name.is_empty())
        .ok_or_else(|| ValidationError::MissingField {
            path: "name".to_string(),
        })?;

    if let Some(edge_id) = find_edge_by_name(session, name).await? {
        debug!("{} {} already deployed as {}", kind, name, edge_id);
        return Ok(ResourceId::single(edge_id));
    }

    let mut edge = compact(properties);
    ensure_object(&mut edge).insert("type".to_string(), json!(kind.edge_type()));

    let edge_id = create_object(
        session,
        "nsxEdges",
        &UriParameters::new(),
        json!({ "edge": edge }),
    )
    .await?;
    info!("{} {} deployed as {}", kind, name, edge_id);
    Ok(ResourceId::single(edge_id))
}

pub async fn delete_edge(session: &dyn Session, resource_id: &str) -> NsxResult<()> {
    let id = ResourceId::parse(resource_id, 1)?;
    delete_if_exists(session, "nsxEdge", &UriParameters::edge(id.part(0))).await?;
    info!("edge {} deleted", resource_id);
    Ok(())
}
