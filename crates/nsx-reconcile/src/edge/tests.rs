use serde_json::json;

use nsx_core::{NsxError, SessionResponse, UriParameters, ValidationError};
use nsx_test::{CallKind, MockSession};

use super::*;
use crate::test_support::{props, MockApi};

fn edge() -> UriParameters {
    UriParameters::edge("edge-1")
}

#[tokio::test]
async fn test_create_edge_reuses_by_name() {
    let session = MockSession::new().with_document(
        "nsxEdges",
        &UriParameters::new(),
        json!({"pagedEdgeList": {"edgePage": {"data": {"id": "edge-7", "name": "gw"}}}}),
    );

    let id = create_edge(&session, EdgeKind::Esg, &props(json!({"name": "gw"})))
        .await
        .unwrap();
    assert_eq!(id.to_string(), "edge-7");
    assert!(session.writes().is_empty());
}

#[tokio::test]
async fn test_create_edge_deploys_with_type() {
    let session = MockSession::new().with_document(
        "nsxEdges",
        &UriParameters::new(),
        json!({"pagedEdgeList": {"edgePage": {"data": ""}}}),
    );

    let properties = props(json!({"name": "router", "datacenterMoid": "datacenter-2", "tenant": null}));
    let id = create_edge(&session, EdgeKind::Dlr, &properties).await.unwrap();
    assert_eq!(id.to_string(), "nsxedges-1");

    let writes = session.writes_to("nsxEdges");
    assert_eq!(writes.len(), 1);
    assert_eq!(
        writes[0].body,
        Some(json!({"edge": {
            "name": "router",
            "datacenterMoid": "datacenter-2",
            "type": "distributedRouter"
        }}))
    );
}

#[tokio::test]
async fn test_create_edge_requires_name() {
    let session = MockSession::new();
    let result = create_edge(&session, EdgeKind::Esg, &props(json!({}))).await;
    assert!(matches!(
        result,
        Err(NsxError::Validation(ValidationError::MissingField { .. }))
    ));
}

#[tokio::test]
async fn test_delete_edge_already_gone() {
    let mut session = MockApi::new();
    session
        .expect_delete()
        .withf(|rt, uri| rt == "nsxEdge" && uri.get("edgeId") == Some("edge-3"))
        .times(1)
        .returning(|_, _| Ok(SessionResponse::new(404, json!({"details": "not found"}))));

    delete_edge(&session, "edge-3").await.unwrap();
}

#[test]
fn test_edge_kind_parse() {
    assert_eq!("ESG".parse::<EdgeKind>().unwrap(), EdgeKind::Esg);
    assert_eq!("distributedRouter".parse::<EdgeKind>().unwrap(), EdgeKind::Dlr);
    assert!("vm".parse::<EdgeKind>().is_err());
}

#[tokio::test]
async fn test_default_firewall_policy() {
    let session = MockSession::new().with_document(
        "defaultFirewallPolicy",
        &edge(),
        json!({"firewallDefaultPolicy": {"action": "deny", "loggingEnabled": "false"}}),
    );

    let same = props(json!({"action": "deny", "loggingEnabled": false}));
    assert!(!esg_fw_default_set(&session, "edge-1", &same).await.unwrap());

    let accept = props(json!({"action": "accept", "loggingEnabled": true}));
    assert!(esg_fw_default_set(&session, "edge-1", &accept).await.unwrap());

    let stored = session.document("defaultFirewallPolicy", &edge()).unwrap();
    assert_eq!(
        stored,
        json!({"firewallDefaultPolicy": {"action": "accept", "loggingEnabled": true}})
    );
}

#[tokio::test]
async fn test_nat_rule_reuse_and_create() {
    let session = MockSession::new().with_document(
        "nat",
        &edge(),
        json!({"nat": {"natRules": {"natRule": {
            "ruleId": "196609",
            "action": "snat",
            "vnic": "0",
            "originalAddress": "10.0.0.0/24",
            "translatedAddress": "192.168.1.10"
        }}}}),
    );

    let rule = props(json!({
        "action": "snat",
        "vnic": 0,
        "originalAddress": "10.0.0.0/24",
        "translatedAddress": "192.168.1.10"
    }));
    let id = add_nat_rule(&session, "edge-1", &rule).await.unwrap();
    assert_eq!(id.to_string(), "edge-1|196609");
    assert!(session.writes().is_empty());

    let dnat = props(json!({"action": "dnat", "vnic": 0, "originalAddress": "192.168.1.10"}));
    let id = add_nat_rule(&session, "edge-1", &dnat).await.unwrap();
    assert_eq!(id.to_string(), "edge-1|natrules-1");

    let writes = session.writes_to("natRules");
    assert_eq!(
        writes[0].body,
        Some(json!({"natRules": {"natRule": [
            {"action": "dnat", "vnic": 0, "originalAddress": "192.168.1.10"}
        ]}}))
    );

    delete_nat_rule(&session, "edge-1|196609").await.unwrap();
    let deleted = session.writes_to("natRule");
    assert_eq!(deleted[0].kind, CallKind::Delete);
    assert_eq!(deleted[0].uri_parameters.get("ruleID"), Some("196609"));
}

#[tokio::test]
async fn test_nat_rule_not_shared_with_vnic_bound_rule() {
    let session = MockSession::new().with_document(
        "nat",
        &edge(),
        json!({"nat": {"natRules": {"natRule": [{
            "ruleId": "196609",
            "ruleTag": "196609",
            "ruleType": "user",
            "action": "snat",
            "vnic": "1",
            "description": "uplink only",
            "originalAddress": "10.0.0.0/24",
            "translatedAddress": "192.168.1.10"
        }]}}}),
    );

    let any_vnic = props(json!({
        "action": "snat",
        "originalAddress": "10.0.0.0/24",
        "translatedAddress": "192.168.1.10",
        "description": null
    }));
    let id = add_nat_rule(&session, "edge-1", &any_vnic).await.unwrap();
    assert_eq!(id.to_string(), "edge-1|natrules-1");
    assert_eq!(session.writes_to("natRules").len(), 1);

    let bound = props(json!({
        "action": "snat",
        "vnic": 1,
        "description": "uplink only",
        "originalAddress": "10.0.0.0/24",
        "translatedAddress": "192.168.1.10"
    }));
    let id = add_nat_rule(&session, "edge-1", &bound).await.unwrap();
    assert_eq!(id.to_string(), "edge-1|196609");
    assert_eq!(session.writes_to("natRules").len(), 1);
}

#[tokio::test]
async fn test_esg_interface_configured_in_place() {
    let uri = UriParameters::edge("edge-1").with("index", "1");
    let session = MockSession::new().with_document(
        "vnic",
        &uri,
        json!({"vnic": {"index": "1", "name": "vnic1", "isConnected": "false"}}),
    );

    let properties = props(json!({
        "name": "uplink",
        "isConnected": true,
        "addressGroups": {"addressGroup": {"primaryAddress": "192.168.1.1", "subnetMask": "255.255.255.0"}}
    }));
    let id = esg_cfg_interface(&session, "edge-1", "1", &properties).await.unwrap();
    assert_eq!(id.to_string(), "edge-1|1");

    let stored = session.document("vnic", &uri).unwrap();
    assert_eq!(stored["vnic"]["name"], json!("uplink"));
    assert_eq!(
        stored["vnic"]["addressGroups"]["addressGroup"]["primaryAddress"],
        json!("192.168.1.1")
    );

    esg_cfg_interface(&session, "edge-1", "1", &properties).await.unwrap();
    assert_eq!(session.writes().len(), 1);

    esg_clear_interface(&session, "edge-1|1").await.unwrap();
    assert!(session.document("vnic", &uri).is_none());
}

#[tokio::test]
async fn test_dlr_interface_index_from_reread() {
    let session = MockSession::new().with_document(
        "interfaces",
        &edge(),
        json!({"interfaces": {"interface": [{"index": 2, "name": "transit"}]}}),
    );

    let id = dlr_add_interface(&session, "edge-1", &props(json!({"name": "transit"})))
        .await
        .unwrap();
    assert_eq!(id.to_string(), "edge-1|2");
    assert!(session.writes().is_empty());

    let id = dlr_add_interface(&session, "edge-1", &props(json!({"name": "web", "type": "internal"})))
        .await
        .unwrap();
    // the in-memory manager answers creates with a generated object id
    assert_eq!(id.to_string(), "edge-1|interfaces-1");

    let create = &session.writes_to("interfaces")[0];
    assert_eq!(create.uri_parameters.get("action"), Some("patch"));
}

#[tokio::test]
async fn test_dlr_interface_index_from_response_body() {
    let mut session = MockApi::new();
    session.expect_read().returning(|_, _| {
        Ok(SessionResponse::ok(json!({"interfaces": {"interface": []}})))
    });
    session.expect_create().times(1).returning(|_, _, _| {
        Ok(SessionResponse::ok(json!({"interfaces": {"interface": {"index": 10, "name": "web"}}})))
    });

    let id = dlr_add_interface(&session, "edge-5", &props(json!({"name": "web"})))
        .await
        .unwrap();
    assert_eq!(id.to_string(), "edge-5|10");
}
