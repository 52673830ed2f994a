//! Host, connector, route and user resources driven through the host

use crate::common::{block, nested, registry, string_at, value};
use mockito::{Matcher, Server};
use tfplug::{AttributePath, DiagnosticSeverity, Dynamic, Host};

#[tokio::test(flavor = "multi_thread")]
async fn user_role_is_always_member_with_one_warning() {
    let mut server = Server::new_async().await;
    let create = server
        .mock("POST", "/api/beta/users")
        .match_body(Matcher::PartialJsonString(
            r#"{"username": "ada", "role": "MEMBER"}"#.to_string(),
        ))
        .with_status(201)
        .with_body(
            r#"{"id": "u-1", "username": "ada", "role": "MEMBER", "email": "ada@example.com",
                "firstName": "Ada", "lastName": "Lovelace", "devices": []}"#,
        )
        .create_async()
        .await;

    let config = value(vec![
        ("username", Dynamic::from("ada")),
        ("email", Dynamic::from("ada@example.com")),
        ("first_name", Dynamic::from("Ada")),
        ("last_name", Dynamic::from("Lovelace")),
        ("role", Dynamic::from("ADMIN")),
    ]);

    let registry = registry(&server.url());
    let created = Host::new(&registry)
        .create("openvpncloud_user", config)
        .await
        .unwrap();

    create.assert_async().await;
    assert_eq!(created.diagnostics.len(), 1);
    assert_eq!(created.diagnostics[0].severity, DiagnosticSeverity::Warning);
    assert_eq!(
        created.diagnostics[0].summary,
        "The user's role cannot be changed using the code"
    );
    assert_eq!(string_at(&created.new_state, &AttributePath::new("id")), "u-1");
    assert_eq!(
        string_at(&created.new_state, &AttributePath::new("role")),
        "MEMBER"
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn host_create_warns_about_manual_connector_setup() {
    let mut server = Server::new_async().await;
    let create = server
        .mock("POST", "/api/beta/hosts")
        .match_body(Matcher::PartialJsonString(
            r#"{"name": "web", "description": "Managed by Terraform", "internetAccess": "LOCAL"}"#
                .to_string(),
        ))
        .with_status(201)
        .with_body(
            r#"{"id": "h-1", "name": "web", "description": "Managed by Terraform",
                "internetAccess": "LOCAL", "systemSubnets": ["100.96.0.0/11"],
                "connectors": [{"id": "c-9", "name": "web-conn", "networkItemId": "h-1",
                                "networkItemType": "HOST", "vpnRegionId": "eu-west-1"}]}"#,
        )
        .create_async()
        .await;

    let config = value(vec![
        ("name", Dynamic::from("web")),
        (
            "connector",
            block(vec![
                ("name", Dynamic::from("web-conn")),
                ("vpn_region_id", Dynamic::from("eu-west-1")),
            ]),
        ),
    ]);

    let registry = registry(&server.url());
    let created = Host::new(&registry)
        .create("openvpncloud_host", config)
        .await
        .unwrap();

    create.assert_async().await;
    assert_eq!(created.diagnostics.len(), 1);
    assert!(!created.diagnostics[0].is_error());
    assert_eq!(
        created.diagnostics[0].summary,
        "The connector for this host needs to be set up manually"
    );
    assert_eq!(string_at(&created.new_state, &nested("connector", "id")), "c-9");
    assert_eq!(
        string_at(&created.new_state, &nested("connector", "network_item_type")),
        "HOST"
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn host_import_then_read() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/api/beta/hosts")
        .with_status(200)
        .with_body(
            r#"[{"id": "h-1", "name": "web", "description": "frontend",
                 "internetAccess": "GLOBAL_INTERNET", "connectors": []}]"#,
        )
        .create_async()
        .await;

    let registry = registry(&server.url());
    let imported = Host::new(&registry)
        .import("openvpncloud_host", "h-1")
        .await
        .unwrap();

    assert!(imported.diagnostics.is_empty(), "{:?}", imported.diagnostics);
    let state = imported.new_state.unwrap();
    assert_eq!(string_at(&state, &AttributePath::new("name")), "web");
    assert_eq!(
        string_at(&state, &AttributePath::new("internet_access")),
        "GLOBAL_INTERNET"
    );
    assert!(state.get(&AttributePath::new("connector")).is_none());
}

#[tokio::test(flavor = "multi_thread")]
async fn host_delete_calls_api() {
    let mut server = Server::new_async().await;
    let delete = server
        .mock("DELETE", "/api/beta/hosts/h-1")
        .with_status(204)
        .expect(1)
        .create_async()
        .await;

    let registry = registry(&server.url());
    let deleted = Host::new(&registry)
        .delete("openvpncloud_host", value(vec![("id", Dynamic::from("h-1"))]))
        .await
        .unwrap();

    delete.assert_async().await;
    assert!(deleted.diagnostics.is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn standalone_connector_lifecycle() {
    let mut server = Server::new_async().await;
    let scope = Matcher::AllOf(vec![
        Matcher::UrlEncoded("networkItemId".into(), "h-1".into()),
        Matcher::UrlEncoded("networkItemType".into(), "HOST".into()),
    ]);
    let create = server
        .mock("POST", "/api/beta/connectors")
        .match_query(scope.clone())
        .with_status(201)
        .with_body(
            r#"{"id": "c-5", "name": "edge", "networkItemId": "h-1", "networkItemType": "HOST",
                "vpnRegionId": "us-west-1", "ipV4Address": "100.96.2.1"}"#,
        )
        .create_async()
        .await;
    let delete = server
        .mock("DELETE", "/api/beta/connectors/c-5")
        .match_query(scope)
        .with_status(204)
        .expect(1)
        .create_async()
        .await;

    let config = value(vec![
        ("name", Dynamic::from("edge")),
        ("vpn_region_id", Dynamic::from("us-west-1")),
        ("network_item_type", Dynamic::from("HOST")),
        ("network_item_id", Dynamic::from("h-1")),
    ]);

    let registry = registry(&server.url());
    let host = Host::new(&registry);
    let created = host.create("openvpncloud_connector", config).await.unwrap();

    create.assert_async().await;
    assert_eq!(created.diagnostics.len(), 1);
    assert_eq!(
        created.diagnostics[0].summary,
        "Connector needs to be set up manually"
    );
    assert_eq!(
        string_at(&created.new_state, &AttributePath::new("ip_v4_address")),
        "100.96.2.1"
    );

    let deleted = host
        .delete("openvpncloud_connector", created.new_state)
        .await
        .unwrap();
    delete.assert_async().await;
    assert!(deleted.diagnostics.is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn missing_connector_is_dropped_with_warning() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/api/beta/connectors")
        .with_status(200)
        .with_body("[]")
        .create_async()
        .await;

    let state = value(vec![
        ("id", Dynamic::from("c-5")),
        ("name", Dynamic::from("edge")),
    ]);

    let registry = registry(&server.url());
    let read = Host::new(&registry)
        .read("openvpncloud_connector", state)
        .await
        .unwrap();

    assert!(read.new_state.is_none());
    assert_eq!(read.diagnostics.len(), 1);
    assert_eq!(
        read.diagnostics[0].summary,
        "Connector with name edge not found"
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn route_update_uses_prior_id() {
    let mut server = Server::new_async().await;
    let update = server
        .mock("PUT", "/api/beta/networks/net-1/routes/r-7")
        .match_body(Matcher::PartialJsonString(
            r#"{"type": "DOMAIN", "value": "new.example"}"#.to_string(),
        ))
        .with_status(200)
        .expect(1)
        .create_async()
        .await;
    server
        .mock("GET", "/api/beta/networks/net-1/routes")
        .with_status(200)
        .with_body(r#"[{"id": "r-7", "type": "DOMAIN", "domain": "new.example"}]"#)
        .create_async()
        .await;

    let prior = value(vec![
        ("id", Dynamic::from("r-7")),
        ("type", Dynamic::from("DOMAIN")),
        ("value", Dynamic::from("old.example")),
        ("network_item_id", Dynamic::from("net-1")),
    ]);
    let config = value(vec![
        ("type", Dynamic::from("DOMAIN")),
        ("value", Dynamic::from("new.example")),
        ("network_item_id", Dynamic::from("net-1")),
    ]);

    let registry = registry(&server.url());
    let updated = Host::new(&registry)
        .update("openvpncloud_route", prior, config)
        .await
        .unwrap();

    update.assert_async().await;
    assert!(updated.diagnostics.is_empty(), "{:?}", updated.diagnostics);
    assert_eq!(string_at(&updated.new_state, &AttributePath::new("id")), "r-7");
    assert_eq!(
        string_at(&updated.new_state, &AttributePath::new("value")),
        "new.example"
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn route_import_takes_network_and_route_id() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/api/beta/networks/net-1/routes")
        .with_status(200)
        .with_body(r#"[{"id": "r-7", "type": "IP_V6", "subnet": "fd00::/8"}]"#)
        .create_async()
        .await;

    let registry = registry(&server.url());
    let imported = Host::new(&registry)
        .import("openvpncloud_route", "net-1/r-7")
        .await
        .unwrap();

    assert!(imported.diagnostics.is_empty(), "{:?}", imported.diagnostics);
    let state = imported.new_state.unwrap();
    assert_eq!(string_at(&state, &AttributePath::new("type")), "IP_V6");
    assert_eq!(string_at(&state, &AttributePath::new("value")), "fd00::/8");
    assert_eq!(
        string_at(&state, &AttributePath::new("network_item_id")),
        "net-1"
    );
}

fn user_state(email: &str, devices: Dynamic) -> tfplug::DynamicValue {
    value(vec![
        ("id", Dynamic::from("u-1")),
        ("username", Dynamic::from("ada")),
        ("email", Dynamic::from(email)),
        ("first_name", Dynamic::from("Ada")),
        ("last_name", Dynamic::from("Lovelace")),
        ("role", Dynamic::from("MEMBER")),
        ("devices", devices),
    ])
}

#[tokio::test(flavor = "multi_thread")]
async fn user_identity_change_requires_replacement() {
    let mut server = Server::new_async().await;
    let mut writes = vec![];
    for method in ["POST", "PUT", "DELETE"] {
        writes.push(
            server
                .mock(method, Matcher::Any)
                .expect(0)
                .create_async()
                .await,
        );
    }

    let prior = user_state("old@example.com", Dynamic::List(vec![]));
    let config = value(vec![
        ("username", Dynamic::from("ada")),
        ("email", Dynamic::from("new@example.com")),
        ("first_name", Dynamic::from("Ada")),
        ("last_name", Dynamic::from("Lovelace")),
        (
            "devices",
            block(vec![
                ("name", Dynamic::from("laptop")),
                ("description", Dynamic::from("work")),
            ]),
        ),
    ]);

    let registry = registry(&server.url());
    let updated = Host::new(&registry)
        .update("openvpncloud_user", prior.clone(), config)
        .await
        .unwrap();

    for mock in writes {
        mock.assert_async().await;
    }
    assert_eq!(updated.diagnostics.len(), 2);
    assert!(updated.diagnostics.iter().all(|d| d.is_error()));
    assert_eq!(
        updated
            .diagnostics
            .iter()
            .map(|d| d.attribute.clone())
            .collect::<Vec<_>>(),
        vec![
            Some(AttributePath::new("email")),
            Some(AttributePath::new("devices"))
        ]
    );
    assert_eq!(updated.new_state, prior);
}

#[tokio::test(flavor = "multi_thread")]
async fn user_role_change_only_warns() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/api/beta/users")
        .with_status(200)
        .with_body(
            r#"[{"id": "u-1", "username": "ada", "role": "MEMBER", "email": "ada@example.com",
                 "firstName": "Ada", "lastName": "Lovelace", "devices": []}]"#,
        )
        .create_async()
        .await;
    let put = server
        .mock("PUT", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let config = value(vec![
        ("username", Dynamic::from("ada")),
        ("email", Dynamic::from("ada@example.com")),
        ("first_name", Dynamic::from("Ada")),
        ("last_name", Dynamic::from("Lovelace")),
        ("role", Dynamic::from("ADMIN")),
    ]);

    let registry = registry(&server.url());
    let updated = Host::new(&registry)
        .update(
            "openvpncloud_user",
            user_state("ada@example.com", Dynamic::List(vec![])),
            config,
        )
        .await
        .unwrap();

    put.assert_async().await;
    assert_eq!(updated.diagnostics.len(), 1);
    assert_eq!(updated.diagnostics[0].severity, DiagnosticSeverity::Warning);
    assert_eq!(
        string_at(&updated.new_state, &AttributePath::new("role")),
        "MEMBER"
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn connector_rename_requires_replacement() {
    let mut server = Server::new_async().await;
    let post = server
        .mock("POST", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let prior = value(vec![
        ("id", Dynamic::from("c-5")),
        ("name", Dynamic::from("edge")),
        ("vpn_region_id", Dynamic::from("us-west-1")),
        ("network_item_type", Dynamic::from("HOST")),
        ("network_item_id", Dynamic::from("h-1")),
    ]);
    let config = value(vec![
        ("name", Dynamic::from("edge-2")),
        ("vpn_region_id", Dynamic::from("us-west-1")),
        ("network_item_type", Dynamic::from("HOST")),
        ("network_item_id", Dynamic::from("h-1")),
    ]);

    let registry = registry(&server.url());
    let updated = Host::new(&registry)
        .update("openvpncloud_connector", prior.clone(), config)
        .await
        .unwrap();

    post.assert_async().await;
    assert_eq!(updated.diagnostics.len(), 1);
    assert_eq!(
        updated.diagnostics[0].summary,
        "Attribute requires replacement"
    );
    assert_eq!(updated.new_state, prior);
}

fn host_scope() -> Matcher {
    Matcher::AllOf(vec![
        Matcher::UrlEncoded("networkItemId".into(), "h-1".into()),
        Matcher::UrlEncoded("networkItemType".into(), "HOST".into()),
    ])
}

fn host_config(name: &str, connector_name: &str) -> tfplug::DynamicValue {
    value(vec![
        ("name", Dynamic::from(name)),
        (
            "connector",
            block(vec![
                ("name", Dynamic::from(connector_name)),
                ("vpn_region_id", Dynamic::from("us-east-1")),
            ]),
        ),
    ])
}

fn host_prior(connector: Option<Dynamic>) -> tfplug::DynamicValue {
    let mut fields = vec![
        ("id", Dynamic::from("h-1")),
        ("name", Dynamic::from("web")),
        ("description", Dynamic::from("Managed by Terraform")),
        ("internet_access", Dynamic::from("LOCAL")),
    ];
    if let Some(connector) = connector {
        fields.push(("connector", connector));
    }
    value(fields)
}

async fn mock_host_listing(server: &mut mockito::ServerGuard, name: &str, connector: &str) {
    server
        .mock("GET", "/api/beta/hosts")
        .with_status(200)
        .with_body(format!(
            r#"[{{"id": "h-1", "name": "{}", "description": "Managed by Terraform",
                 "internetAccess": "LOCAL",
                 "connectors": [{{"id": "c-2", "name": "{}", "networkItemId": "h-1",
                                  "networkItemType": "HOST", "vpnRegionId": "us-east-1"}}]}}]"#,
            name, connector
        ))
        .create_async()
        .await;
}

#[tokio::test(flavor = "multi_thread")]
async fn host_rename_adds_connector_before_removing_old() {
    let mut server = Server::new_async().await;
    let add = server
        .mock("POST", "/api/beta/connectors")
        .match_query(host_scope())
        .match_body(Matcher::PartialJsonString(
            r#"{"name": "web-conn-2", "vpnRegionId": "us-east-1"}"#.to_string(),
        ))
        .with_status(201)
        .with_body(
            r#"{"id": "c-2", "name": "web-conn-2", "networkItemId": "h-1",
                "networkItemType": "HOST", "vpnRegionId": "us-east-1"}"#,
        )
        .expect(1)
        .create_async()
        .await;
    let remove = server
        .mock("DELETE", "/api/beta/connectors/c-1")
        .match_query(host_scope())
        .with_status(204)
        .expect(1)
        .create_async()
        .await;
    let put = server
        .mock("PUT", "/api/beta/hosts/h-1")
        .match_body(Matcher::Json(serde_json::json!({
            "id": "h-1",
            "name": "web2",
            "description": "Managed by Terraform",
            "internetAccess": "LOCAL"
        })))
        .with_status(200)
        .expect(1)
        .create_async()
        .await;
    mock_host_listing(&mut server, "web2", "web-conn-2").await;

    let prior = host_prior(Some(block(vec![
        ("id", Dynamic::from("c-1")),
        ("name", Dynamic::from("web-conn")),
        ("vpn_region_id", Dynamic::from("us-east-1")),
        ("network_item_id", Dynamic::from("h-1")),
        ("network_item_type", Dynamic::from("HOST")),
    ])));

    let registry = registry(&server.url());
    let updated = Host::new(&registry)
        .update("openvpncloud_host", prior, host_config("web2", "web-conn-2"))
        .await
        .unwrap();

    add.assert_async().await;
    remove.assert_async().await;
    put.assert_async().await;
    assert!(updated.diagnostics.is_empty(), "{:?}", updated.diagnostics);
    assert_eq!(string_at(&updated.new_state, &nested("connector", "id")), "c-2");
}

#[tokio::test(flavor = "multi_thread")]
async fn imported_host_only_gains_connector() {
    let mut server = Server::new_async().await;
    let add = server
        .mock("POST", "/api/beta/connectors")
        .match_query(host_scope())
        .with_status(201)
        .with_body(r#"{"id": "c-2", "name": "web-conn", "vpnRegionId": "us-east-1"}"#)
        .expect(1)
        .create_async()
        .await;
    let remove = server
        .mock("DELETE", Matcher::Any)
        .expect(0)
        .create_async()
        .await;
    let put = server
        .mock("PUT", Matcher::Any)
        .expect(0)
        .create_async()
        .await;
    mock_host_listing(&mut server, "web", "web-conn").await;

    let registry = registry(&server.url());
    let updated = Host::new(&registry)
        .update("openvpncloud_host", host_prior(None), host_config("web", "web-conn"))
        .await
        .unwrap();

    add.assert_async().await;
    remove.assert_async().await;
    put.assert_async().await;
    assert!(updated.diagnostics.is_empty(), "{:?}", updated.diagnostics);
    assert_eq!(string_at(&updated.new_state, &nested("connector", "id")), "c-2");
}

#[tokio::test(flavor = "multi_thread")]
async fn prior_connector_without_id_is_not_deleted() {
    let mut server = Server::new_async().await;
    let add = server
        .mock("POST", "/api/beta/connectors")
        .match_query(host_scope())
        .with_status(201)
        .with_body(r#"{"id": "c-2", "name": "web-conn-2", "vpnRegionId": "us-east-1"}"#)
        .expect(1)
        .create_async()
        .await;
    let remove = server
        .mock("DELETE", Matcher::Any)
        .expect(0)
        .create_async()
        .await;
    mock_host_listing(&mut server, "web", "web-conn-2").await;

    let prior = host_prior(Some(block(vec![
        ("name", Dynamic::from("web-conn")),
        ("vpn_region_id", Dynamic::from("us-east-1")),
    ])));

    let registry = registry(&server.url());
    let updated = Host::new(&registry)
        .update("openvpncloud_host", prior, host_config("web", "web-conn-2"))
        .await
        .unwrap();

    add.assert_async().await;
    remove.assert_async().await;
    assert!(updated.diagnostics.is_empty(), "{:?}", updated.diagnostics);
}
