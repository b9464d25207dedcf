use serde_json::json;

use nsx_core::{NsxError, SessionResponse, UriParameters};
use nsx_test::MockSession;

use super::*;
use crate::test_support::{props, MockApi};

fn edge() -> UriParameters {
    UriParameters::edge("edge-1")
}

#[tokio::test]
async fn test_update_routing_global_writes_only_on_change() {
    let session = MockSession::new().with_document(
        "routingGlobalConfig",
        &edge(),
        json!({"routingGlobalConfig": {"routerId": "10.0.0.1", "ecmp": "false"}}),
    );

    let same = props(json!({"routerId": "10.0.0.1", "ecmp": false}));
    assert!(!update_routing_global(&session, "edge-1", &same).await.unwrap());
    assert!(session.writes().is_empty());

    let changed = props(json!({"ecmp": true, "logging": {"enable": true, "logLevel": "info"}}));
    assert!(update_routing_global(&session, "edge-1", &changed).await.unwrap());

    let stored = session.document("routingGlobalConfig", &edge()).unwrap();
    assert_eq!(stored["routingGlobalConfig"]["ecmp"], json!(true));
    assert_eq!(stored["routingGlobalConfig"]["logging"]["logLevel"], json!("info"));
}

#[tokio::test]
async fn test_routing_prefix_lifecycle() {
    let session = MockSession::new().with_document(
        "routingGlobalConfig",
        &edge(),
        json!({"routingGlobalConfig": {"routerId": "10.0.0.1", "ipPrefixes": ""}}),
    );

    let id = add_routing_prefix(&session, "edge-1", "lan", "192.168.0.0/24")
        .await
        .unwrap();
    assert_eq!(id.to_string(), "edge-1|lan");

    // second add finds the prefix already there
    add_routing_prefix(&session, "edge-1", "lan", "192.168.0.0/24")
        .await
        .unwrap();
    assert_eq!(session.writes().len(), 1);

    del_routing_prefix(&session, "edge-1|lan").await.unwrap();
    let stored = session.document("routingGlobalConfig", &edge()).unwrap();
    assert_eq!(
        stored["routingGlobalConfig"]["ipPrefixes"]["ipPrefix"],
        json!([])
    );

    // absent prefix is not an error
    del_routing_prefix(&session, "edge-1|lan").await.unwrap();
    assert_eq!(session.writes().len(), 2);
}

#[tokio::test]
async fn test_bgp_neighbour_singleton_is_reused() {
    let session = MockSession::new().with_document(
        "routingBGP",
        &edge(),
        json!({"bgp": {
            "enabled": "true",
            "localAS": "65001",
            "bgpNeighbours": {"bgpNeighbour": {
                "ipAddress": "10.0.0.2", "remoteAS": "65002", "weight": "60"
            }}
        }}),
    );

    let neighbour = props(json!({"ipAddress": "10.0.0.2", "remoteAS": 65002, "weight": 60}));
    let id = add_bgp_neighbour(&session, "edge-1", &neighbour).await.unwrap();
    assert_eq!(id.to_string(), "edge-1|10.0.0.2|65002||");
    assert!(session.writes().is_empty());

    let heavier = props(json!({"ipAddress": "10.0.0.2", "remoteAS": 65002, "weight": 10}));
    add_bgp_neighbour(&session, "edge-1", &heavier).await.unwrap();
    let stored = session.document("routingBGP", &edge()).unwrap();
    assert_eq!(
        stored["bgp"]["bgpNeighbours"]["bgpNeighbour"],
        json!([{"ipAddress": "10.0.0.2", "remoteAS": 65002, "weight": 10}])
    );

    del_bgp_neighbour(&session, &id.to_string()).await.unwrap();
    let stored = session.document("routingBGP", &edge()).unwrap();
    assert_eq!(stored["bgp"]["bgpNeighbours"]["bgpNeighbour"], json!([]));
}

#[tokio::test]
async fn test_update_bgp_no_write_when_unchanged() {
    let mut session = MockApi::new();
    session.expect_read().times(1).returning(|_, _| {
        Ok(SessionResponse::ok(json!({"bgp": {"enabled": "true", "localAS": "65001"}})))
    });
    session.expect_update().times(0);

    let same = props(json!({"enabled": true, "localAS": 65001}));
    assert!(!update_bgp(&session, "edge-1", &same).await.unwrap());
}

#[tokio::test]
async fn test_update_bgp_propagates_api_error() {
    let mut session = MockApi::new();
    session
        .expect_read()
        .returning(|_, _| Ok(SessionResponse::ok(json!({"bgp": {"enabled": "false"}}))));
    session.expect_update().times(1).returning(|_, _, _| {
        Ok(SessionResponse::new(
            400,
            json!({"details": "localAS is required"}),
        ))
    });

    let result = update_bgp(&session, "edge-1", &props(json!({"enabled": true}))).await;
    assert!(matches!(
        result,
        Err(NsxError::Api { status: 400, ref message }) if message == "localAS is required"
    ));
}

#[tokio::test]
async fn test_ospf_area_and_interface() {
    let session = MockSession::new().with_document(
        "routingOSPF",
        &edge(),
        json!({"ospf": {"enabled": "false", "ospfAreas": {"ospfArea": [
            {"areaId": "0", "type": "normal"}
        ]}}}),
    );

    assert!(update_ospf(&session, "edge-1", &props(json!({"enabled": true})))
        .await
        .unwrap());

    let area = props(json!({"areaId": 10, "type": "nssa"}));
    let id = add_ospf_area(&session, "edge-1", &area).await.unwrap();
    assert_eq!(id.to_string(), "edge-1|10");

    let interface = props(json!({"vnic": 1, "areaId": 10, "helloInterval": 10}));
    let id = add_ospf_interface(&session, "edge-1", &interface).await.unwrap();
    assert_eq!(id.to_string(), "edge-1|1|10");

    let stored = session.document("routingOSPF", &edge()).unwrap();
    assert_eq!(stored["ospf"]["ospfAreas"]["ospfArea"].as_array().unwrap().len(), 2);
    assert_eq!(
        stored["ospf"]["ospfInterfaces"]["ospfInterface"],
        json!([{"vnic": 1, "areaId": 10, "helloInterval": 10}])
    );

    del_ospf_interface(&session, "edge-1|1|10").await.unwrap();
    del_ospf_area(&session, "edge-1|10").await.unwrap();
    let stored = session.document("routingOSPF", &edge()).unwrap();
    assert_eq!(
        stored["ospf"]["ospfAreas"]["ospfArea"],
        json!([{"areaId": "0", "type": "normal"}])
    );
    assert_eq!(stored["ospf"]["ospfInterfaces"]["ospfInterface"], json!([]));
}

#[tokio::test]
async fn test_routing_rule_reuse_and_next_id() {
    let session = MockSession::new().with_document(
        "routingBGP",
        &edge(),
        json!({"bgp": {"redistribution": {"enabled": "true", "rules": {"rule": {
            "id": "3", "action": "permit", "from": {"connected": "true", "static": "false"}
        }}}}}),
    );

    let same = props(json!({"action": "permit", "from": {"connected": true, "static": false}}));
    let id = add_routing_rule(&session, "edge-1", RoutingProtocol::Bgp, &same)
        .await
        .unwrap();
    assert_eq!(id.to_string(), "edge-1|bgp|3");
    assert!(session.writes().is_empty());

    let other = props(json!({"action": "deny", "prefixName": "lan", "from": {"ospf": true}}));
    let id = add_routing_rule(&session, "edge-1", RoutingProtocol::Bgp, &other)
        .await
        .unwrap();
    assert_eq!(id.to_string(), "edge-1|bgp|4");

    del_routing_rule(&session, "edge-1|bgp|3").await.unwrap();
    let stored = session.document("routingBGP", &edge()).unwrap();
    let rules = stored["bgp"]["redistribution"]["rules"]["rule"].as_array().unwrap();
    assert_eq!(rules.len(), 1);
    assert_eq!(rules[0]["id"], json!(4));
}

#[tokio::test]
async fn test_routing_rule_not_shared_with_narrower_rule() {
    let session = MockSession::new().with_document(
        "routingBGP",
        &edge(),
        json!({"bgp": {"redistribution": {"enabled": "true", "rules": {"rule": {
            "id": "3", "action": "permit", "prefixName": "lan",
            "from": {"connected": "true", "static": "false"}
        }}}}}),
    );

    let unrestricted = props(json!({"action": "permit", "from": {"connected": true, "static": false}}));
    let id = add_routing_rule(&session, "edge-1", RoutingProtocol::Bgp, &unrestricted)
        .await
        .unwrap();
    assert_eq!(id.to_string(), "edge-1|bgp|4");
    assert_eq!(session.writes().len(), 1);

    del_routing_rule(&session, &id.to_string()).await.unwrap();
    let stored = session.document("routingBGP", &edge()).unwrap();
    let rules = stored["bgp"]["redistribution"]["rules"]["rule"].as_array().unwrap();
    assert_eq!(rules.len(), 1);
    assert_eq!(rules[0]["prefixName"], json!("lan"));
}

#[tokio::test]
async fn test_routing_rule_enables_redistribution() {
    let session = MockSession::new().with_document("routingOSPF", &edge(), json!({"ospf": {}}));

    let rule = props(json!({"action": "permit", "from": {"static": true}}));
    let id = add_routing_rule(&session, "edge-1", RoutingProtocol::Ospf, &rule)
        .await
        .unwrap();
    assert_eq!(id.to_string(), "edge-1|ospf|1");

    let stored = session.document("routingOSPF", &edge()).unwrap();
    assert_eq!(stored["ospf"]["redistribution"]["enabled"], json!(true));
}

#[test]
fn test_routing_protocol_parse() {
    assert_eq!("BGP".parse::<RoutingProtocol>().unwrap(), RoutingProtocol::Bgp);
    assert_eq!(RoutingProtocol::Ospf.to_string(), "ospf");
    assert!("rip".parse::<RoutingProtocol>().is_err());
}

#[tokio::test]
async fn test_static_route_and_default_gateway() {
    let session = MockSession::new().with_document(
        "routingConfigStatic",
        &edge(),
        json!({"staticRouting": {"staticRoutes": null}}),
    );

    let route = props(json!({"network": "10.1.0.0/16", "nextHop": "192.168.0.1", "mtu": 1500}));
    let id = add_static_route(&session, "edge-1", &route).await.unwrap();
    assert_eq!(id.to_string(), "edge-1|10.1.0.0/16|192.168.0.1");
    add_static_route(&session, "edge-1", &route).await.unwrap();
    assert_eq!(session.writes().len(), 1);

    let gateway = props(json!({"vnic": 0, "gatewayAddress": "192.168.0.254"}));
    let gw = set_default_gateway(&session, "edge-1", &gateway).await.unwrap();
    assert_eq!(gw.to_string(), "edge-1");

    del_static_route(&session, &id.to_string()).await.unwrap();
    clear_default_gateway(&session, "edge-1").await.unwrap();

    let stored = session.document("routingConfigStatic", &edge()).unwrap();
    assert_eq!(stored["staticRouting"]["staticRoutes"]["route"], json!([]));
    assert!(stored["staticRouting"].get("defaultRoute").is_none());
    assert_eq!(session.writes().len(), 4);
}

#[tokio::test]
async fn test_bad_resource_id_is_rejected() {
    let session = MockSession::new();
    let result = del_static_route(&session, "edge-1").await;
    assert!(matches!(result, Err(NsxError::InvalidResourceId(_))));
    assert!(session.calls().is_empty());
}
