//! User data source

use super::{computed, failed, found, id_attribute, not_found, object_list};
use crate::api::{Client, Device, User};
use async_trait::async_trait;
use tfplug::data_source::{DataSource, ReadDataSourceRequest, ReadDataSourceResponse};
use tfplug::{
    AttributeBuilder, AttributePath, AttributeType, Context, Dynamic, DynamicValue, Schema,
    SchemaBuilder,
};

pub struct UserDataSource {
    client: Client,
}

impl UserDataSource {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

fn device_dynamic(device: &Device) -> Dynamic {
    Dynamic::object([
        ("id", Dynamic::from(device.id.as_str())),
        ("name", Dynamic::from(device.name.as_str())),
        ("description", Dynamic::from(device.description.as_str())),
        ("ip_v4_address", device.ip_v4_address.clone().into()),
        ("ip_v6_address", device.ip_v6_address.clone().into()),
    ])
}

fn apply_user(state: &mut DynamicValue, user: &User) -> tfplug::Result<()> {
    for (key, value) in [
        ("user_id", &user.id),
        ("username", &user.username),
        ("role", &user.role),
        ("email", &user.email),
        ("auth_type", &user.auth_type),
        ("first_name", &user.first_name),
        ("last_name", &user.last_name),
        ("group_id", &user.group_id),
        ("status", &user.status),
    ] {
        state.set_string(&AttributePath::new(key), value.clone())?;
    }
    state.set_list(
        &AttributePath::new("devices"),
        user.devices.iter().map(device_dynamic).collect(),
    )
}

#[async_trait]
impl DataSource for UserDataSource {
    fn type_name(&self) -> &str {
        "openvpncloud_user"
    }

    fn schema(&self) -> Schema {
        let mut builder = SchemaBuilder::new()
            .version(0)
            .description("Looks up a user by username and role")
            .attribute(id_attribute().build())
            .attribute(
                AttributeBuilder::new("username", AttributeType::String)
                    .required()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("role", AttributeType::String)
                    .description("Role the user must have, e.g. MEMBER")
                    .required()
                    .build(),
            );
        for name in [
            "user_id",
            "email",
            "auth_type",
            "first_name",
            "last_name",
            "group_id",
            "status",
        ] {
            builder = builder.attribute(computed(name, AttributeType::String).build());
        }
        builder
            .attribute(computed("devices", object_list()).build())
            .build()
    }

    async fn read(&self, _ctx: Context, request: ReadDataSourceRequest) -> ReadDataSourceResponse {
        let state = request.config;
        let username = state
            .get_optional_string(&AttributePath::new("username"))
            .unwrap_or_default();
        let role = state
            .get_optional_string(&AttributePath::new("role"))
            .unwrap_or_default();

        match self.client.users().get(&username, &role).await {
            Ok(Some(user)) => found(state, |s| apply_user(s, &user)),
            Ok(None) => not_found(state, "User", &format!("{} ({})", username, role)),
            Err(e) => failed(state, "user", &e),
        }
    }
}
