//! Lifecycle tests against the in-memory NSX manager

use std::time::Duration;

use serde_json::{json, Value};

use nsx_config::{NodeContext, RESOURCE_ID, USE_EXTERNAL_RESOURCE};
use nsx_core::{NsxError, Properties, RetryPolicy, UriParameters, ValidationError};
use nsx_test::{CallKind, MockSession};

use crate::OperationRegistry;

fn props(value: Value) -> Properties {
    match value {
        Value::Object(map) => map,
        _ => panic!("test properties must be an object"),
    }
}

fn node(node_type: &str, properties: Value) -> NodeContext {
    NodeContext::new("node_1", node_type, props(properties))
}

fn registry() -> OperationRegistry {
    OperationRegistry::new().with_retry_policy(RetryPolicy::new(3, Duration::ZERO))
}

#[test]
fn test_registry_lists_node_types() {
    let registry = registry();
    let types = registry.node_types();
    assert_eq!(types.len(), 24);
    assert!(types.contains(&"nsx.BGPNeighbour"));
    assert!(types.contains(&"nsx.SecurityTagVM"));
    let err = registry.get("nsx.Unknown").err().unwrap();
    assert!(matches!(err, NsxError::UnknownNodeType(ref name) if name == "nsx.Unknown"));
    assert_eq!(err.to_string(), "Unknown node type: nsx.Unknown");
}

#[tokio::test]
async fn test_bgp_create_is_idempotent_and_delete_disables() {
    let session = MockSession::new().with_document(
        "routingBGP",
        &UriParameters::edge("edge-1"),
        json!({"bgp": {"enabled": "false", "localAS": "65001"}}),
    );
    let registry = registry();
    let mut ctx = node("nsx.BGP", json!({"bgp": {"edgeId": "edge-1", "localAS": 65001}}));

    registry
        .create(&session, &mut ctx, &Properties::new())
        .await
        .unwrap();
    assert_eq!(ctx.resource_id(), Some("edge-1"));
    assert_eq!(ctx.runtime_properties["bgp"]["enabled"], json!(true));
    assert_eq!(session.writes().len(), 1);

    // resource_id already persisted
    registry
        .create(&session, &mut ctx, &Properties::new())
        .await
        .unwrap();
    assert_eq!(session.writes().len(), 1);

    registry
        .delete(&session, &mut ctx, &Properties::new())
        .await
        .unwrap();
    let stored = session
        .document("routingBGP", &UriParameters::edge("edge-1"))
        .unwrap();
    assert_eq!(stored["bgp"]["enabled"], json!(false));
    assert!(ctx.runtime_properties.is_empty());
}

#[tokio::test]
async fn test_kwargs_override_node_properties() {
    let session = MockSession::new().with_document(
        "routingBGP",
        &UriParameters::edge("edge-1"),
        json!({"bgp": {"enabled": "true"}}),
    );
    let registry = registry();
    let mut ctx = node("nsx.BGP", json!({"bgp": {"edgeId": "edge-1", "localAS": 65001}}));
    let kwargs = props(json!({"bgp": {"localAS": "65002"}}));

    registry.create(&session, &mut ctx, &kwargs).await.unwrap();
    let stored = session
        .document("routingBGP", &UriParameters::edge("edge-1"))
        .unwrap();
    assert_eq!(stored["bgp"]["localAS"], json!(65002));
}

#[tokio::test]
async fn test_validation_error_stops_before_nsx() {
    let session = MockSession::new();
    let registry = registry();
    let mut ctx = node("nsx.BGP", json!({"bgp": {"edgeId": "edge-1"}}));

    let result = registry.create(&session, &mut ctx, &Properties::new()).await;
    assert!(matches!(
        result,
        Err(NsxError::Validation(ValidationError::MissingField { ref path })) if path == "localAS"
    ));
    assert!(session.calls().is_empty());
    assert!(ctx.resource_id().is_none());
}

#[tokio::test]
async fn test_external_resource_with_explicit_id() {
    let session = MockSession::new();
    let registry = registry();
    let mut ctx = node(
        "nsx.LogicalSwitch",
        json!({
            "use_external_resource": true,
            "resource_id": "virtualwire-9",
            "switch": {"name": "web"}
        }),
    );

    registry
        .create(&session, &mut ctx, &Properties::new())
        .await
        .unwrap();
    assert_eq!(ctx.resource_id(), Some("virtualwire-9"));
    assert_eq!(ctx.runtime_properties[USE_EXTERNAL_RESOURCE], json!(true));

    registry
        .delete(&session, &mut ctx, &Properties::new())
        .await
        .unwrap();
    assert!(session.calls().is_empty());
    assert!(!ctx.runtime_properties.contains_key(RESOURCE_ID));
}

#[tokio::test]
async fn test_external_resource_found_by_name() {
    let session = MockSession::new().with_document(
        "securityTag",
        &UriParameters::new(),
        json!({"securityTags": {"securityTag": [
            {"objectId": "securitytag-3", "name": "web"},
            {"objectId": "securitytag-4", "name": "db"}
        ]}}),
    );
    let registry = registry();
    let mut ctx = node(
        "nsx.SecurityTag",
        json!({"use_external_resource": "yes", "tag": {"name": "db"}}),
    );

    registry
        .create(&session, &mut ctx, &Properties::new())
        .await
        .unwrap();
    assert_eq!(ctx.resource_id(), Some("securitytag-4"));
    assert!(session.writes().is_empty());
}

#[tokio::test]
async fn test_external_resource_not_found() {
    let session = MockSession::new().with_document(
        "securityTag",
        &UriParameters::new(),
        json!({"securityTags": ""}),
    );
    let registry = registry();
    let mut ctx = node(
        "nsx.SecurityTag",
        json!({"use_external_resource": true, "tag": {"name": "db"}}),
    );

    let result = registry.create(&session, &mut ctx, &Properties::new()).await;
    assert!(matches!(
        result,
        Err(NsxError::Validation(ValidationError::MissingField { ref path })) if path == "resource_id"
    ));
}

#[tokio::test]
async fn test_busy_edge_is_retried() {
    let session = MockSession::new().with_document(
        "nat",
        &UriParameters::edge("edge-1"),
        json!({"nat": {"natRules": ""}}),
    );
    session.fail_next("natRules", 409, "Edge edge-1 is busy");

    let registry = registry();
    let mut ctx = node(
        "nsx.ESGNat",
        json!({"rule": {
            "edgeId": "edge-1",
            "action": "SNAT",
            "vnic": "0",
            "originalAddress": "10.0.0.0/24",
            "translatedAddress": "192.168.1.10"
        }}),
    );

    registry
        .create(&session, &mut ctx, &Properties::new())
        .await
        .unwrap();
    assert_eq!(ctx.resource_id(), Some("edge-1|natrules-1"));
    assert_eq!(session.writes_to("natRules").len(), 2);

    let body = session.writes_to("natRules")[1].body.clone().unwrap();
    let rule = &body["natRules"]["natRule"][0];
    assert_eq!(rule["action"], json!("snat"));
    assert_eq!(rule["vnic"], json!(0));
    assert!(rule.get("edgeId").is_none());
}

#[tokio::test]
async fn test_api_error_is_not_retried() {
    let session = MockSession::new().with_document(
        "nat",
        &UriParameters::edge("edge-1"),
        json!({"nat": {"natRules": ""}}),
    );
    session.fail_next("natRules", 400, "translatedAddress is invalid");

    let registry = registry();
    let mut ctx = node(
        "nsx.ESGNat",
        json!({"rule": {
            "edgeId": "edge-1",
            "action": "dnat",
            "originalAddress": "192.168.1.10",
            "translatedAddress": "10.0.0.5"
        }}),
    );

    let result = registry.create(&session, &mut ctx, &Properties::new()).await;
    assert!(matches!(result, Err(NsxError::Api { status: 400, .. })));
    assert_eq!(session.writes_to("natRules").len(), 1);
    assert!(ctx.resource_id().is_none());
}

#[tokio::test]
async fn test_esg_interface_address_groups() {
    let uri = UriParameters::edge("edge-1").with("index", "2");
    let session = MockSession::new().with_document(
        "vnic",
        &uri,
        json!({"vnic": {"index": "2", "name": "vnic2", "isConnected": "false"}}),
    );
    let registry = registry();
    let mut ctx = node(
        "nsx.ESGInterface",
        json!({"interface": {
            "edgeId": "edge-1",
            "index": 2,
            "portgroupId": "dvportgroup-10",
            "type": "Uplink",
            "primaryAddress": "192.168.2.1",
            "subnetMask": "255.255.255.0"
        }}),
    );

    registry
        .create(&session, &mut ctx, &Properties::new())
        .await
        .unwrap();
    assert_eq!(ctx.resource_id(), Some("edge-1|2"));

    let stored = session.document("vnic", &uri).unwrap();
    assert_eq!(stored["vnic"]["type"], json!("uplink"));
    assert_eq!(stored["vnic"]["isConnected"], json!(true));
    assert_eq!(
        stored["vnic"]["addressGroups"],
        json!({"addressGroup": {"primaryAddress": "192.168.2.1", "subnetMask": "255.255.255.0"}})
    );
    assert!(stored["vnic"].get("primaryAddress").is_none());
}

#[tokio::test]
async fn test_routing_rule_protocol_spelling() {
    let session = MockSession::new().with_document(
        "routingOSPF",
        &UriParameters::edge("edge-1"),
        json!({"ospf": {"enabled": "true"}}),
    );
    let registry = registry();
    let mut ctx = node(
        "nsx.RoutingRule",
        json!({"rule": {"edgeId": "edge-1", "protocol": "OSPF", "from": {"static": true}}}),
    );

    registry
        .create(&session, &mut ctx, &Properties::new())
        .await
        .unwrap();
    assert_eq!(ctx.resource_id(), Some("edge-1|ospf|1"));

    let stored = session
        .document("routingOSPF", &UriParameters::edge("edge-1"))
        .unwrap();
    let rule = &stored["ospf"]["redistribution"]["rules"]["rule"][0];
    assert_eq!(rule["action"], json!("permit"));
    assert_eq!(rule["from"]["connected"], json!(false));
    assert!(rule.get("protocol").is_none());
}

#[tokio::test]
async fn test_security_group_link_and_unlink() {
    let group = UriParameters::new().with("objectId", "securitygroup-1");
    let session = MockSession::new().with_document(
        "secGroupObject",
        &group,
        json!({"securitygroup": {"objectId": "securitygroup-1", "name": "web"}}),
    );
    let registry = registry();

    let mut ctx = node("nsx.SecurityGroup", json!({"group": {"name": "web"}}));
    ctx.set_resource_id("securitygroup-1");
    let mut target = node("nsx.VM", json!({}));
    target.set_resource_id("vm-1");

    registry.link(&session, &mut ctx, &target).await.unwrap();
    let put = &session.writes_to("secGroupMember")[0];
    assert_eq!(put.kind, CallKind::Create);
    assert_eq!(put.uri_parameters.get("memberMoref"), Some("vm-1"));

    registry.unlink(&session, &mut ctx, &target).await.unwrap();
    let removed = &session.writes_to("secGroupMember")[1];
    assert_eq!(removed.kind, CallKind::Delete);
}

#[tokio::test]
async fn test_link_unsupported() {
    let session = MockSession::new();
    let registry = registry();
    let mut ctx = node("nsx.BGP", json!({}));
    let target = node("nsx.Edge", json!({}));

    let result = registry.link(&session, &mut ctx, &target).await;
    assert!(matches!(result, Err(NsxError::Unsupported(_))));
}

#[tokio::test]
async fn test_delete_without_resource_id_is_noop() {
    let session = MockSession::new();
    let registry = registry();
    let mut ctx = node("nsx.StaticRoute", json!({"route": {"edgeId": "edge-1"}}));

    registry
        .delete(&session, &mut ctx, &Properties::new())
        .await
        .unwrap();
    assert!(session.calls().is_empty());
}

#[test]
fn test_validate_fills_defaults() {
    let registry = registry();
    let ctx = node(
        "nsx.LogicalSwitch",
        json!({"switch": {"name": "app", "scopeId": "vdnscope-1", "controlPlaneMode": "hybrid_mode"}}),
    );

    let validated = registry.validate(&ctx, &Properties::new()).unwrap();
    assert_eq!(validated["controlPlaneMode"], json!("HYBRID_MODE"));
    assert_eq!(validated["tenantId"], json!("virtual wire tenant"));
}
