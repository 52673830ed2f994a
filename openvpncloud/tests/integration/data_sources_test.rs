//! Data source lookups

use crate::common::{registry, string_at, value};
use mockito::Server;
use tfplug::{AttributePath, Dynamic, Host};

#[tokio::test(flavor = "multi_thread")]
async fn network_lookup_by_name() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/api/beta/networks")
        .with_status(200)
        .with_body(
            r#"[{"id": "net-1", "name": "net-A", "egress": false, "internetAccess": "BLOCKED",
                 "routes": [{"id": "r-1", "type": "DOMAIN", "domain": "corp.example"}],
                 "connectors": []}]"#,
        )
        .create_async()
        .await;

    let registry = registry(&server.url());
    let read = Host::new(&registry)
        .read_data_source(
            "openvpncloud_network",
            value(vec![("name", Dynamic::from("net-A"))]),
        )
        .await
        .unwrap();

    assert!(read.diagnostics.is_empty(), "{:?}", read.diagnostics);
    assert_eq!(
        string_at(&read.state, &AttributePath::new("network_id")),
        "net-1"
    );
    assert_eq!(
        string_at(
            &read.state,
            &AttributePath::new("routes").index(0).attribute("value")
        ),
        "corp.example"
    );
    assert!(!string_at(&read.state, &AttributePath::new("id")).is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn unknown_network_is_an_error() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/api/beta/networks")
        .with_status(200)
        .with_body("[]")
        .create_async()
        .await;

    let registry = registry(&server.url());
    let read = Host::new(&registry)
        .read_data_source(
            "openvpncloud_network",
            value(vec![("name", Dynamic::from("missing"))]),
        )
        .await
        .unwrap();

    assert_eq!(read.diagnostics.len(), 1);
    assert!(read.diagnostics[0].is_error());
    assert_eq!(read.diagnostics[0].summary, "Network not found");
}

#[tokio::test(flavor = "multi_thread")]
async fn empty_route_list_is_not_an_error() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/api/beta/networks/net-1/routes")
        .with_status(200)
        .with_body("[]")
        .create_async()
        .await;

    let registry = registry(&server.url());
    let read = Host::new(&registry)
        .read_data_source(
            "openvpncloud_network_routes",
            value(vec![("network_item_id", Dynamic::from("net-1"))]),
        )
        .await
        .unwrap();

    assert!(read.diagnostics.is_empty());
    assert_eq!(
        read.state.get_list(&AttributePath::new("routes")).unwrap(),
        vec![]
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn user_lookup_requires_matching_role() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/api/beta/users")
        .with_status(200)
        .with_body(
            r#"[{"id": "u-1", "username": "ada", "role": "MEMBER", "email": "ada@example.com",
                 "authType": "LOCAL", "firstName": "Ada", "lastName": "Lovelace",
                 "groupId": "g-1", "status": "ACTIVE", "devices": []}]"#,
        )
        .expect(2)
        .create_async()
        .await;

    let registry = registry(&server.url());
    let host = Host::new(&registry);
    let member = host
        .read_data_source(
            "openvpncloud_user",
            value(vec![
                ("username", Dynamic::from("ada")),
                ("role", Dynamic::from("MEMBER")),
            ]),
        )
        .await
        .unwrap();
    let admin = host
        .read_data_source(
            "openvpncloud_user",
            value(vec![
                ("username", Dynamic::from("ada")),
                ("role", Dynamic::from("ADMIN")),
            ]),
        )
        .await
        .unwrap();

    assert!(member.diagnostics.is_empty());
    assert_eq!(string_at(&member.state, &AttributePath::new("user_id")), "u-1");
    assert_eq!(string_at(&member.state, &AttributePath::new("status")), "ACTIVE");
    assert_eq!(admin.diagnostics[0].summary, "User not found");
}

#[tokio::test(flavor = "multi_thread")]
async fn user_group_and_region_lookups() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/api/beta/user-groups")
        .with_status(200)
        .with_body(
            r#"[{"id": "g-1", "name": "Admins", "vpnRegionIds": ["us-east-1"],
                 "internetAccess": "GLOBAL_INTERNET", "maxDevice": 5, "systemSubnets": []}]"#,
        )
        .create_async()
        .await;
    server
        .mock("GET", "/api/beta/regions")
        .with_status(200)
        .with_body(
            r#"[{"id": "us-east-1", "continent": "North America", "country": "United States",
                 "countryISO": "US", "regionName": "Virginia"}]"#,
        )
        .create_async()
        .await;

    let registry = registry(&server.url());
    let host = Host::new(&registry);
    let group = host
        .read_data_source(
            "openvpncloud_user_group",
            value(vec![("name", Dynamic::from("Admins"))]),
        )
        .await
        .unwrap();
    let region = host
        .read_data_source(
            "openvpncloud_vpn_region",
            value(vec![("region_id", Dynamic::from("us-east-1"))]),
        )
        .await
        .unwrap();

    assert!(group.diagnostics.is_empty(), "{:?}", group.diagnostics);
    assert_eq!(
        group.state.get(&AttributePath::new("max_device")),
        Some(&Dynamic::Number(5.0))
    );
    assert!(region.diagnostics.is_empty(), "{:?}", region.diagnostics);
    assert_eq!(
        string_at(&region.state, &AttributePath::new("country_iso")),
        "US"
    );
}
