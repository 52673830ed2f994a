//! VPN region data source

use super::{computed, failed, found, id_attribute, not_found};
use crate::api::{Client, VpnRegion};
use async_trait::async_trait;
use tfplug::data_source::{DataSource, ReadDataSourceRequest, ReadDataSourceResponse};
use tfplug::{
    AttributeBuilder, AttributePath, AttributeType, Context, DynamicValue, Schema, SchemaBuilder,
};

pub struct VpnRegionDataSource {
    client: Client,
}

impl VpnRegionDataSource {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

fn apply_region(state: &mut DynamicValue, region: &VpnRegion) -> tfplug::Result<()> {
    for (key, value) in [
        ("region_id", &region.id),
        ("continent", &region.continent),
        ("country", &region.country),
        ("country_iso", &region.country_iso),
        ("region_name", &region.region_name),
    ] {
        state.set_string(&AttributePath::new(key), value.clone())?;
    }
    Ok(())
}

#[async_trait]
impl DataSource for VpnRegionDataSource {
    fn type_name(&self) -> &str {
        "openvpncloud_vpn_region"
    }

    fn schema(&self) -> Schema {
        SchemaBuilder::new()
            .version(0)
            .description("Looks up a VPN region by its ID")
            .attribute(id_attribute().build())
            .attribute(
                AttributeBuilder::new("region_id", AttributeType::String)
                    .description("Region identifier such as us-east-1")
                    .required()
                    .build(),
            )
            .attribute(computed("continent", AttributeType::String).build())
            .attribute(computed("country", AttributeType::String).build())
            .attribute(computed("country_iso", AttributeType::String).build())
            .attribute(computed("region_name", AttributeType::String).build())
            .build()
    }

    async fn read(&self, _ctx: Context, request: ReadDataSourceRequest) -> ReadDataSourceResponse {
        let state = request.config;
        let region_id = state
            .get_optional_string(&AttributePath::new("region_id"))
            .unwrap_or_default();

        match self.client.vpn_regions().get(&region_id).await {
            Ok(Some(region)) => found(state, |s| apply_region(s, &region)),
            Ok(None) => not_found(state, "VPN region", &region_id),
            Err(e) => failed(state, "VPN regions", &e),
        }
    }
}
