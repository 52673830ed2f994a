//! Routes of one network

use super::network::route_dynamic;
use super::{computed, failed, found, id_attribute, object_list};
use crate::api::Client;
use async_trait::async_trait;
use tfplug::data_source::{DataSource, ReadDataSourceRequest, ReadDataSourceResponse};
use tfplug::{AttributeBuilder, AttributePath, AttributeType, Context, Schema, SchemaBuilder};

pub struct NetworkRoutesDataSource {
    client: Client,
}

impl NetworkRoutesDataSource {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DataSource for NetworkRoutesDataSource {
    fn type_name(&self) -> &str {
        "openvpncloud_network_routes"
    }

    fn schema(&self) -> Schema {
        SchemaBuilder::new()
            .version(0)
            .description("Lists the routes of a network")
            .attribute(id_attribute().build())
            .attribute(
                AttributeBuilder::new("network_item_id", AttributeType::String)
                    .description("The network whose routes are listed")
                    .required()
                    .build(),
            )
            .attribute(computed("routes", object_list()).build())
            .build()
    }

    async fn read(&self, _ctx: Context, request: ReadDataSourceRequest) -> ReadDataSourceResponse {
        let state = request.config;
        let network_id = state
            .get_optional_string(&AttributePath::new("network_item_id"))
            .unwrap_or_default();

        // An empty list is a valid answer here
        match self.client.routes().list(&network_id).await {
            Ok(routes) => found(state, |s| {
                s.set_list(
                    &AttributePath::new("routes"),
                    routes.iter().map(route_dynamic).collect(),
                )
            }),
            Err(e) => failed(state, "routes", &e),
        }
    }
}
