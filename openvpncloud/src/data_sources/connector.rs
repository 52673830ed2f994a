//! Connector data source

use super::{computed, failed, found, id_attribute, not_found};
use crate::api::{Client, Connector};
use crate::reconcile::{fields, ConnectorBlock};
use async_trait::async_trait;
use tfplug::data_source::{DataSource, ReadDataSourceRequest, ReadDataSourceResponse};
use tfplug::{
    AttributeBuilder, AttributePath, AttributeType, Context, Dynamic, DynamicValue, Schema,
    SchemaBuilder,
};

pub struct ConnectorDataSource {
    client: Client,
}

impl ConnectorDataSource {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

fn apply_connector(state: &mut DynamicValue, connector: &Connector) -> tfplug::Result<()> {
    let block = ConnectorBlock::from_connector(connector).to_dynamic();
    let Dynamic::Map(values) = block else {
        return Ok(());
    };
    for (key, value) in values {
        // `id` is the read timestamp; the connector id is exposed separately
        let key = if key == fields::ID { "connector_id".to_string() } else { key };
        state.set_value(&AttributePath::new(&key), value)?;
    }
    Ok(())
}

#[async_trait]
impl DataSource for ConnectorDataSource {
    fn type_name(&self) -> &str {
        "openvpncloud_connector"
    }

    fn schema(&self) -> Schema {
        SchemaBuilder::new()
            .version(0)
            .description("Looks up a connector by name")
            .attribute(id_attribute().build())
            .attribute(
                AttributeBuilder::new(fields::NAME, AttributeType::String)
                    .required()
                    .build(),
            )
            .attribute(computed("connector_id", AttributeType::String).build())
            .attribute(computed(fields::NETWORK_ITEM_ID, AttributeType::String).build())
            .attribute(computed(fields::NETWORK_ITEM_TYPE, AttributeType::String).build())
            .attribute(computed(fields::VPN_REGION_ID, AttributeType::String).build())
            .attribute(computed(fields::IP_V4_ADDRESS, AttributeType::String).build())
            .attribute(computed(fields::IP_V6_ADDRESS, AttributeType::String).build())
            .build()
    }

    async fn read(&self, _ctx: Context, request: ReadDataSourceRequest) -> ReadDataSourceResponse {
        let state = request.config;
        let name = state
            .get_optional_string(&AttributePath::new(fields::NAME))
            .unwrap_or_default();

        match self.client.connectors().get_by_name(&name).await {
            Ok(Some(connector)) => found(state, |s| apply_connector(s, &connector)),
            Ok(None) => not_found(state, "Connector", &name),
            Err(e) => failed(state, "connector", &e),
        }
    }
}
