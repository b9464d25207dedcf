//! Default policy of the ESG firewall

use log::{debug, info};
use serde_json::json;

use nsx_core::{nsx_read, NsxResult, Properties, Session, UriParameters};

use crate::diff::{merge_fields, pick};
use crate::write;

const RESOURCE: &str = "defaultFirewallPolicy";
const ELEMENT: &str = "firewallDefaultPolicy";

/// Set the default action and logging of the edge firewall
pub async fn esg_fw_default_set(
    session: &dyn Session,
    edge_id: &str,
    properties: &Properties,
) -> NsxResult<bool> {
    let uri = UriParameters::edge(edge_id);
    let mut current = nsx_read(session, ELEMENT, RESOURCE, &uri).await?;

    if !merge_fields(&mut current, &pick(properties, &["action", "loggingEnabled"])) {
        debug!("{}: default firewall policy already up to date", edge_id);
        return Ok(false);
    }

    write(session, RESOURCE, &uri, json!({ ELEMENT: current })).await?;
    info!("{}: default firewall policy updated", edge_id);
    Ok(true)
}
