//! Network lifecycle: create, read, connector and route reconciliation, delete

use crate::common::{block, nested, registry, string_at, value};
use mockito::{Matcher, Server, ServerGuard};
use tfplug::{AttributePath, Dynamic, DynamicValue, Host};

const NETWORK: &str = "openvpncloud_network";

const NETWORK_JSON: &str = r#"{
    "id": "net-1",
    "name": "net-A",
    "description": "",
    "egress": true,
    "internetAccess": "LOCAL",
    "systemSubnets": ["100.96.0.0/11"],
    "connectors": [{
        "id": "c-1",
        "name": "conn-A",
        "networkItemId": "net-1",
        "networkItemType": "NETWORK",
        "vpnRegionId": "us-east-1",
        "ipV4Address": "100.96.1.2"
    }]
}"#;

const ROUTES_JSON: &str = r#"[{"id": "r-1", "type": "IP_V4", "subnet": "10.0.0.0/8"}]"#;

fn connector_json(id: &str, name: &str) -> String {
    format!(
        r#"{{"id": "{}", "name": "{}", "networkItemId": "net-1", "networkItemType": "NETWORK", "vpnRegionId": "us-east-1"}}"#,
        id, name
    )
}

fn network_scope() -> Matcher {
    Matcher::AllOf(vec![
        Matcher::UrlEncoded("networkItemId".into(), "net-1".into()),
        Matcher::UrlEncoded("networkItemType".into(), "NETWORK".into()),
    ])
}

fn config(connector_name: &str, route_value: &str) -> DynamicValue {
    value(vec![
        ("name", Dynamic::from("net-A")),
        ("egress", Dynamic::from(true)),
        ("internet_access", Dynamic::from("LOCAL")),
        (
            "default_route",
            block(vec![
                ("type", Dynamic::from("IP_V4")),
                ("value", Dynamic::from(route_value)),
            ]),
        ),
        (
            "default_connector",
            block(vec![
                ("name", Dynamic::from(connector_name)),
                ("vpn_region_id", Dynamic::from("us-east-1")),
            ]),
        ),
    ])
}

/// State as a previous create would have left it
fn prior_state() -> DynamicValue {
    value(vec![
        ("id", Dynamic::from("net-1")),
        ("name", Dynamic::from("net-A")),
        ("description", Dynamic::from("")),
        ("egress", Dynamic::from(true)),
        ("internet_access", Dynamic::from("LOCAL")),
        ("system_subnets", Dynamic::string_list(["100.96.0.0/11"])),
        (
            "default_route",
            block(vec![
                ("id", Dynamic::from("r-1")),
                ("type", Dynamic::from("IP_V4")),
                ("value", Dynamic::from("10.0.0.0/8")),
            ]),
        ),
        (
            "default_connector",
            block(vec![
                ("id", Dynamic::from("c-1")),
                ("name", Dynamic::from("conn-A")),
                ("vpn_region_id", Dynamic::from("us-east-1")),
                ("network_item_id", Dynamic::from("net-1")),
                ("network_item_type", Dynamic::from("NETWORK")),
                ("ip_v4_address", Dynamic::from("100.96.1.2")),
                ("ip_v6_address", Dynamic::Null),
            ]),
        ),
    ])
}

/// Mocks the three listings a refresh reads
async fn mock_refresh(server: &mut ServerGuard, connectors: &str, routes: &str) {
    server
        .mock("GET", "/api/beta/networks")
        .with_status(200)
        .with_body(format!("[{}]", NETWORK_JSON))
        .create_async()
        .await;
    server
        .mock("GET", "/api/beta/connectors")
        .with_status(200)
        .with_body(connectors)
        .create_async()
        .await;
    server
        .mock("GET", "/api/beta/networks/net-1/routes")
        .with_status(200)
        .with_body(routes)
        .create_async()
        .await;
}

#[tokio::test(flavor = "multi_thread")]
async fn create_then_read_round_trips() {
    let mut server = Server::new_async().await;
    let create = server
        .mock("POST", "/api/beta/networks")
        .match_body(Matcher::PartialJsonString(
            r#"{"name": "net-A", "egress": true, "internetAccess": "LOCAL"}"#.to_string(),
        ))
        .with_status(201)
        .with_body(NETWORK_JSON)
        .create_async()
        .await;
    let route = server
        .mock("POST", "/api/beta/networks/net-1/routes")
        .match_body(Matcher::PartialJsonString(
            r#"{"type": "IP_V4", "value": "10.0.0.0/8"}"#.to_string(),
        ))
        .with_status(201)
        .with_body(r#"{"id": "r-1", "type": "IP_V4", "subnet": "10.0.0.0/8"}"#)
        .create_async()
        .await;

    let registry = registry(&server.url());
    let host = Host::new(&registry);
    let created = host
        .create(NETWORK, config("conn-A", "10.0.0.0/8"))
        .await
        .unwrap();

    create.assert_async().await;
    route.assert_async().await;
    assert!(created.diagnostics.is_empty(), "{:?}", created.diagnostics);
    let state = created.new_state;
    assert_eq!(string_at(&state, &AttributePath::new("id")), "net-1");
    assert_eq!(string_at(&state, &nested("default_connector", "id")), "c-1");
    assert_eq!(string_at(&state, &nested("default_route", "id")), "r-1");

    mock_refresh(
        &mut server,
        &format!("[{}]", connector_json("c-1", "conn-A")),
        ROUTES_JSON,
    )
    .await;
    let read = host.read(NETWORK, state).await.unwrap();

    assert!(read.diagnostics.is_empty(), "{:?}", read.diagnostics);
    let state = read.new_state.unwrap();
    assert_eq!(string_at(&state, &AttributePath::new("name")), "net-A");
    assert_eq!(
        string_at(&state, &nested("default_connector", "name")),
        "conn-A"
    );
    assert_eq!(
        string_at(&state, &nested("default_connector", "vpn_region_id")),
        "us-east-1"
    );
    assert_eq!(string_at(&state, &nested("default_route", "type")), "IP_V4");
    assert_eq!(
        string_at(&state, &nested("default_route", "value")),
        "10.0.0.0/8"
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn read_drops_network_missing_remotely() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/api/beta/networks")
        .with_status(200)
        .with_body("[]")
        .create_async()
        .await;

    let registry = registry(&server.url());
    let read = Host::new(&registry)
        .read(NETWORK, prior_state())
        .await
        .unwrap();

    assert!(read.new_state.is_none());
    assert!(read.diagnostics.is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn renamed_connector_is_added_before_old_is_removed() {
    let mut server = Server::new_async().await;
    let add = server
        .mock("POST", "/api/beta/connectors")
        .match_query(network_scope())
        .match_body(Matcher::PartialJsonString(
            r#"{"name": "conn-B", "vpnRegionId": "us-east-1"}"#.to_string(),
        ))
        .with_status(201)
        .with_body(connector_json("c-2", "conn-B"))
        .expect(1)
        .create_async()
        .await;
    let remove = server
        .mock("DELETE", "/api/beta/connectors/c-1")
        .match_query(network_scope())
        .with_status(204)
        .expect(1)
        .create_async()
        .await;
    let put_network = server
        .mock("PUT", "/api/beta/networks/net-1")
        .expect(0)
        .create_async()
        .await;
    mock_refresh(
        &mut server,
        &format!("[{}]", connector_json("c-2", "conn-B")),
        ROUTES_JSON,
    )
    .await;

    let registry = registry(&server.url());
    let updated = Host::new(&registry)
        .update(NETWORK, prior_state(), config("conn-B", "10.0.0.0/8"))
        .await
        .unwrap();

    add.assert_async().await;
    remove.assert_async().await;
    put_network.assert_async().await;
    assert!(updated.diagnostics.is_empty(), "{:?}", updated.diagnostics);
    assert_eq!(
        string_at(&updated.new_state, &nested("default_connector", "id")),
        "c-2"
    );
    assert_eq!(
        string_at(&updated.new_state, &nested("default_route", "id")),
        "r-1"
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn unchanged_configuration_makes_no_writes() {
    let mut server = Server::new_async().await;
    let add = server
        .mock("POST", "/api/beta/connectors")
        .match_query(Matcher::Any)
        .expect(0)
        .create_async()
        .await;
    let remove = server
        .mock("DELETE", Matcher::Any)
        .expect(0)
        .create_async()
        .await;
    let route_write = server
        .mock("PUT", Matcher::Any)
        .expect(0)
        .create_async()
        .await;
    mock_refresh(
        &mut server,
        &format!("[{}]", connector_json("c-1", "conn-A")),
        ROUTES_JSON,
    )
    .await;

    let registry = registry(&server.url());
    let updated = Host::new(&registry)
        .update(NETWORK, prior_state(), config("conn-A", "10.0.0.0/8"))
        .await
        .unwrap();

    add.assert_async().await;
    remove.assert_async().await;
    route_write.assert_async().await;
    assert!(updated.diagnostics.is_empty(), "{:?}", updated.diagnostics);
}

#[tokio::test(flavor = "multi_thread")]
async fn route_value_change_updates_route_in_place() {
    let mut server = Server::new_async().await;
    let update = server
        .mock("PUT", "/api/beta/networks/net-1/routes/r-1")
        .match_body(Matcher::PartialJsonString(
            r#"{"type": "IP_V4", "value": "10.1.0.0/16"}"#.to_string(),
        ))
        .with_status(200)
        .expect(1)
        .create_async()
        .await;
    let create = server
        .mock("POST", "/api/beta/networks/net-1/routes")
        .expect(0)
        .create_async()
        .await;
    mock_refresh(
        &mut server,
        &format!("[{}]", connector_json("c-1", "conn-A")),
        r#"[{"id": "r-1", "type": "IP_V4", "subnet": "10.1.0.0/16"}]"#,
    )
    .await;

    let registry = registry(&server.url());
    let updated = Host::new(&registry)
        .update(NETWORK, prior_state(), config("conn-A", "10.1.0.0/16"))
        .await
        .unwrap();

    update.assert_async().await;
    create.assert_async().await;
    assert!(updated.diagnostics.is_empty(), "{:?}", updated.diagnostics);
    assert_eq!(
        string_at(&updated.new_state, &nested("default_route", "value")),
        "10.1.0.0/16"
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn failed_connector_add_keeps_prior_state() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/api/beta/connectors")
        .match_query(network_scope())
        .with_status(400)
        .with_body(r#"{"message": "region unavailable"}"#)
        .create_async()
        .await;
    let remove = server
        .mock("DELETE", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let registry = registry(&server.url());
    let updated = Host::new(&registry)
        .update(NETWORK, prior_state(), config("conn-B", "10.0.0.0/8"))
        .await
        .unwrap();

    remove.assert_async().await;
    assert_eq!(updated.diagnostics.len(), 1);
    assert_eq!(updated.diagnostics[0].summary, "Failed to add connector");
    assert_eq!(updated.new_state, prior_state());
}

#[tokio::test(flavor = "multi_thread")]
async fn delete_only_warns() {
    let mut server = Server::new_async().await;
    let any_call = server
        .mock("DELETE", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let registry = registry(&server.url());
    let deleted = Host::new(&registry)
        .delete(NETWORK, prior_state())
        .await
        .unwrap();

    any_call.assert_async().await;
    assert_eq!(deleted.diagnostics.len(), 1);
    assert!(!deleted.diagnostics[0].is_error());
    assert_eq!(
        deleted.diagnostics[0].summary,
        "Deleting an openvpncloud_network resource is not supported"
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn invalid_internet_access_never_reaches_the_api() {
    let mut server = Server::new_async().await;
    let create = server
        .mock("POST", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let mut config = config("conn-A", "10.0.0.0/8");
    config
        .set_string(&AttributePath::new("internet_access"), "EVERYWHERE".to_string())
        .unwrap();

    let registry = registry(&server.url());
    let created = Host::new(&registry).create(NETWORK, config).await.unwrap();

    create.assert_async().await;
    assert!(created.diagnostics.iter().any(|d| d.is_error()));
}

#[tokio::test(flavor = "multi_thread")]
async fn unreadable_prior_route_is_reported_not_recreated() {
    let mut server = Server::new_async().await;
    let writes = server
        .mock("POST", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let mut prior = prior_state();
    prior
        .set_string(&nested("default_route", "type"), "IP_V5".to_string())
        .unwrap();

    let registry = registry(&server.url());
    let updated = Host::new(&registry)
        .update(NETWORK, prior.clone(), config("conn-A", "10.0.0.0/8"))
        .await
        .unwrap();

    writes.assert_async().await;
    assert_eq!(updated.diagnostics.len(), 1);
    assert_eq!(updated.diagnostics[0].summary, "Invalid default_route.type");
    assert_eq!(updated.new_state, prior);
}
