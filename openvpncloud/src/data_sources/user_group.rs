//! User group data source

use super::{computed, failed, found, id_attribute, not_found, string_set};
use crate::api::{Client, UserGroup};
use async_trait::async_trait;
use tfplug::data_source::{DataSource, ReadDataSourceRequest, ReadDataSourceResponse};
use tfplug::{
    AttributeBuilder, AttributePath, AttributeType, Context, Dynamic, DynamicValue, Schema,
    SchemaBuilder,
};

pub struct UserGroupDataSource {
    client: Client,
}

impl UserGroupDataSource {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

fn apply_group(state: &mut DynamicValue, group: &UserGroup) -> tfplug::Result<()> {
    state.set_string(&AttributePath::new("user_group_id"), group.id.clone())?;
    state.set_string(&AttributePath::new("name"), group.name.clone())?;
    state.set_value(
        &AttributePath::new("vpn_region_ids"),
        Dynamic::string_list(&group.vpn_region_ids),
    )?;
    state.set_value(
        &AttributePath::new("internet_access"),
        group.internet_access.map(|a| a.as_str()).into(),
    )?;
    state.set_number(&AttributePath::new("max_device"), group.max_device as f64)?;
    state.set_value(
        &AttributePath::new("system_subnets"),
        Dynamic::string_list(&group.system_subnets),
    )
}

#[async_trait]
impl DataSource for UserGroupDataSource {
    fn type_name(&self) -> &str {
        "openvpncloud_user_group"
    }

    fn schema(&self) -> Schema {
        SchemaBuilder::new()
            .version(0)
            .description("Looks up a user group by name")
            .attribute(id_attribute().build())
            .attribute(
                AttributeBuilder::new("name", AttributeType::String)
                    .required()
                    .build(),
            )
            .attribute(computed("user_group_id", AttributeType::String).build())
            .attribute(
                computed(
                    "vpn_region_ids",
                    AttributeType::List(Box::new(AttributeType::String)),
                )
                .build(),
            )
            .attribute(computed("internet_access", AttributeType::String).build())
            .attribute(computed("max_device", AttributeType::Number).build())
            .attribute(computed("system_subnets", string_set()).build())
            .build()
    }

    async fn read(&self, _ctx: Context, request: ReadDataSourceRequest) -> ReadDataSourceResponse {
        let state = request.config;
        let name = state
            .get_optional_string(&AttributePath::new("name"))
            .unwrap_or_default();

        match self.client.user_groups().get_by_name(&name).await {
            Ok(Some(group)) => found(state, |s| apply_group(s, &group)),
            Ok(None) => not_found(state, "User group", &name),
            Err(e) => failed(state, "user groups", &e),
        }
    }
}
