//! Host data source

use super::{
    computed, connectors_dynamic, failed, found, id_attribute, not_found, object_list, string_set,
};
use crate::api::{Client, Host};
use async_trait::async_trait;
use tfplug::data_source::{DataSource, ReadDataSourceRequest, ReadDataSourceResponse};
use tfplug::{
    AttributeBuilder, AttributePath, AttributeType, Context, Dynamic, DynamicValue, Schema,
    SchemaBuilder,
};

pub struct HostDataSource {
    client: Client,
}

impl HostDataSource {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

fn apply_host(state: &mut DynamicValue, host: &Host) -> tfplug::Result<()> {
    state.set_string(&AttributePath::new("host_id"), host.id.clone())?;
    state.set_string(&AttributePath::new("name"), host.name.clone())?;
    state.set_string(&AttributePath::new("description"), host.description.clone())?;
    state.set_value(
        &AttributePath::new("internet_access"),
        host.internet_access.map(|a| a.as_str()).into(),
    )?;
    state.set_value(
        &AttributePath::new("system_subnets"),
        Dynamic::string_list(&host.system_subnets),
    )?;
    state.set_value(
        &AttributePath::new("connectors"),
        connectors_dynamic(&host.connectors),
    )
}

#[async_trait]
impl DataSource for HostDataSource {
    fn type_name(&self) -> &str {
        "openvpncloud_host"
    }

    fn schema(&self) -> Schema {
        SchemaBuilder::new()
            .version(0)
            .description("Looks up a host by name")
            .attribute(id_attribute().build())
            .attribute(
                AttributeBuilder::new("name", AttributeType::String)
                    .required()
                    .build(),
            )
            .attribute(computed("host_id", AttributeType::String).build())
            .attribute(computed("description", AttributeType::String).build())
            .attribute(computed("internet_access", AttributeType::String).build())
            .attribute(computed("system_subnets", string_set()).build())
            .attribute(computed("connectors", object_list()).build())
            .build()
    }

    async fn read(&self, _ctx: Context, request: ReadDataSourceRequest) -> ReadDataSourceResponse {
        let state = request.config;
        let name = state
            .get_optional_string(&AttributePath::new("name"))
            .unwrap_or_default();

        match self.client.hosts().get_by_name(&name).await {
            Ok(Some(host)) => found(state, |s| apply_host(s, &host)),
            Ok(None) => not_found(state, "Host", &name),
            Err(e) => failed(state, "host", &e),
        }
    }
}
