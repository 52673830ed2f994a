//! Network data source

use super::{
    computed, connectors_dynamic, failed, found, id_attribute, not_found, object_list, string_set,
};
use crate::api::{Client, Network, Route};
use async_trait::async_trait;
use tfplug::data_source::{DataSource, ReadDataSourceRequest, ReadDataSourceResponse};
use tfplug::{
    AttributeBuilder, AttributePath, AttributeType, Context, Dynamic, DynamicValue, Schema,
    SchemaBuilder,
};

pub struct NetworkDataSource {
    client: Client,
}

impl NetworkDataSource {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

/// Route record with its type-dependent value
pub(crate) fn route_dynamic(route: &Route) -> Dynamic {
    Dynamic::object([
        ("id", Dynamic::from(route.id.as_str())),
        ("type", Dynamic::from(route.route_type.as_str())),
        ("value", Dynamic::from(route.display_value())),
        ("description", route.description.clone().into()),
    ])
}

fn apply_network(state: &mut DynamicValue, network: &Network) -> tfplug::Result<()> {
    state.set_string(&AttributePath::new("network_id"), network.id.clone())?;
    state.set_string(&AttributePath::new("name"), network.name.clone())?;
    state.set_string(&AttributePath::new("description"), network.description.clone())?;
    state.set_bool(&AttributePath::new("egress"), network.egress)?;
    state.set_value(
        &AttributePath::new("internet_access"),
        network.internet_access.map(|a| a.as_str()).into(),
    )?;
    state.set_value(
        &AttributePath::new("system_subnets"),
        Dynamic::string_list(&network.system_subnets),
    )?;
    state.set_list(
        &AttributePath::new("routes"),
        network.routes.iter().map(route_dynamic).collect(),
    )?;
    state.set_value(
        &AttributePath::new("connectors"),
        connectors_dynamic(&network.connectors),
    )
}

#[async_trait]
impl DataSource for NetworkDataSource {
    fn type_name(&self) -> &str {
        "openvpncloud_network"
    }

    fn schema(&self) -> Schema {
        SchemaBuilder::new()
            .version(0)
            .description("Looks up a network by name")
            .attribute(id_attribute().build())
            .attribute(
                AttributeBuilder::new("name", AttributeType::String)
                    .description("The network name")
                    .required()
                    .build(),
            )
            .attribute(computed("network_id", AttributeType::String).build())
            .attribute(computed("description", AttributeType::String).build())
            .attribute(computed("egress", AttributeType::Bool).build())
            .attribute(computed("internet_access", AttributeType::String).build())
            .attribute(computed("system_subnets", string_set()).build())
            .attribute(
                computed("routes", object_list())
                    .description("Routes with id, type, value and description")
                    .build(),
            )
            .attribute(computed("connectors", object_list()).build())
            .build()
    }

    async fn read(&self, _ctx: Context, request: ReadDataSourceRequest) -> ReadDataSourceResponse {
        let state = request.config;
        let name = state
            .get_optional_string(&AttributePath::new("name"))
            .unwrap_or_default();

        match self.client.networks().get_by_name(&name).await {
            Ok(Some(network)) => found(state, |s| apply_network(s, &network)),
            Ok(None) => not_found(state, "Network", &name),
            Err(e) => failed(state, "network", &e),
        }
    }
}
