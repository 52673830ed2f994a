//! User resource implementation
//!
//! The API ignores the requested role on creation and always creates
//! members; the resource reports that with a warning instead of failing.

use super::{api_error, state_error, string_attr};
use crate::api::users::MEMBER_ROLE;
use crate::api::{Client, Device, User};
use async_trait::async_trait;
use tfplug::resource::{
    CreateResourceRequest, CreateResourceResponse, DeleteResourceRequest, DeleteResourceResponse,
    ImportResourceStateRequest, ImportResourceStateResponse, ReadResourceRequest,
    ReadResourceResponse, Resource, UpdateResourceRequest, UpdateResourceResponse,
};
use tfplug::validator::StringLengthValidator;
use tfplug::{
    import_state_passthrough_id, AttributeBuilder, AttributePath, AttributeType, BlockBuilder,
    Context, Diagnostic, Dynamic, DynamicValue, NestedBlock, Schema, SchemaBuilder,
};

const DEVICES: &str = "devices";

pub struct UserResource {
    client: Client,
}

fn role_warning() -> Diagnostic {
    Diagnostic::warning(
        "The user's role cannot be changed using the code",
        "The OpenVPN Cloud API does not allow setting the user's role during creation. \
         All users are created as members by default.",
    )
}

fn device_from_map(device: &Dynamic) -> Device {
    let field = |key: &str| {
        device
            .as_map()
            .and_then(|m| m.get(key))
            .and_then(Dynamic::as_str)
            .map(str::to_string)
    };
    Device {
        name: field("name").unwrap_or_default(),
        description: field("description").unwrap_or_default(),
        ip_v4_address: field("ipv4_address"),
        ip_v6_address: field("ipv6_address"),
        ..Default::default()
    }
}

fn device_to_dynamic(device: &Device) -> Dynamic {
    Dynamic::object([
        ("name", Dynamic::from(device.name.as_str())),
        ("description", Dynamic::from(device.description.as_str())),
        ("ipv4_address", device.ip_v4_address.clone().into()),
        ("ipv6_address", device.ip_v6_address.clone().into()),
    ])
}

impl UserResource {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Creation body; the role is always MEMBER
    fn extract_user(config: &DynamicValue) -> User {
        let devices = config
            .get_list(&AttributePath::new(DEVICES))
            .unwrap_or_default()
            .iter()
            .map(device_from_map)
            .collect();

        User {
            username: string_attr(config, "username"),
            role: MEMBER_ROLE.to_string(),
            email: string_attr(config, "email"),
            first_name: string_attr(config, "first_name"),
            last_name: string_attr(config, "last_name"),
            group_id: string_attr(config, "group_id"),
            devices,
            ..Default::default()
        }
    }

    fn apply_user(state: &mut DynamicValue, user: &User) -> tfplug::Result<()> {
        state.set_string(&AttributePath::new("id"), user.id.clone())?;
        state.set_string(&AttributePath::new("username"), user.username.clone())?;
        state.set_string(&AttributePath::new("email"), user.email.clone())?;
        state.set_string(&AttributePath::new("first_name"), user.first_name.clone())?;
        state.set_string(&AttributePath::new("last_name"), user.last_name.clone())?;
        let role = if user.role.is_empty() {
            MEMBER_ROLE
        } else {
            user.role.as_str()
        };
        state.set_string(&AttributePath::new("role"), role.to_string())?;
        if !user.group_id.is_empty() {
            state.set_string(&AttributePath::new("group_id"), user.group_id.clone())?;
        }
        state.set_list(
            &AttributePath::new(DEVICES),
            user.devices.iter().map(device_to_dynamic).collect(),
        )
    }

    async fn refresh(&self, mut state: DynamicValue) -> ReadResourceResponse {
        let id = string_attr(&state, "id");
        match self.client.users().get_by_id(&id).await {
            Ok(Some(user)) => {
                let diagnostics = match Self::apply_user(&mut state, &user) {
                    Ok(()) => vec![],
                    Err(e) => vec![state_error(e)],
                };
                ReadResourceResponse {
                    new_state: Some(state),
                    diagnostics,
                }
            }
            Ok(None) => {
                tracing::warn!(user_id = %id, "User no longer exists, removing from state");
                ReadResourceResponse {
                    new_state: None,
                    diagnostics: vec![],
                }
            }
            Err(e) => ReadResourceResponse {
                new_state: Some(state),
                diagnostics: vec![api_error("Failed to read user", &e)],
            },
        }
    }
}

#[async_trait]
impl Resource for UserResource {
    fn type_name(&self) -> &str {
        "openvpncloud_user"
    }

    fn schema(&self) -> Schema {
        let identity = |name: &str, max: usize| {
            AttributeBuilder::new(name, AttributeType::String)
                .required()
                .force_new()
                .validator(StringLengthValidator::between(1, max))
                .build()
        };

        let device = BlockBuilder::new()
            .attribute(
                AttributeBuilder::new("name", AttributeType::String)
                    .required()
                    .validator(StringLengthValidator::between(1, 32))
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("description", AttributeType::String)
                    .required()
                    .validator(StringLengthValidator::between(1, 120))
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("ipv4_address", AttributeType::String)
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("ipv6_address", AttributeType::String)
                    .optional()
                    .build(),
            )
            .build();

        SchemaBuilder::new()
            .version(0)
            .description("Manages an OpenVPN Cloud user")
            .attribute(
                AttributeBuilder::new("id", AttributeType::String)
                    .computed()
                    .build(),
            )
            .attribute(identity("username", 120))
            .attribute(identity("email", 120))
            .attribute(identity("first_name", 20))
            .attribute(identity("last_name", 20))
            .attribute(
                AttributeBuilder::new("group_id", AttributeType::String)
                    .optional()
                    .force_new()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("role", AttributeType::String)
                    .description("Always MEMBER after creation")
                    .optional()
                    .computed()
                    .build(),
            )
            .block(NestedBlock::list(DEVICES, device).max_items(1).force_new())
            .build()
    }

    async fn create(&self, _ctx: Context, request: CreateResourceRequest) -> CreateResourceResponse {
        let mut state = request.planned_state;
        let user = Self::extract_user(&request.config);
        if let Some(requested) = request
            .config
            .get_optional_string(&AttributePath::new("role"))
            .filter(|r| r != MEMBER_ROLE)
        {
            tracing::warn!(requested = %requested, "Requested role is ignored on creation");
        }

        tracing::info!(username = %user.username, "Creating user");
        let diagnostics = match self.client.users().create(&user).await {
            Ok(created) => {
                let mut diagnostics = vec![];
                if let Err(e) = Self::apply_user(&mut state, &created) {
                    diagnostics.push(state_error(e));
                }
                diagnostics.push(role_warning());
                diagnostics
            }
            Err(e) => vec![api_error("Failed to create user", &e)],
        };

        CreateResourceResponse {
            new_state: state,
            diagnostics,
        }
    }

    async fn read(&self, _ctx: Context, request: ReadResourceRequest) -> ReadResourceResponse {
        self.refresh(request.current_state).await
    }

    /// Only `role` can reach an update, and it cannot be changed remotely
    async fn update(&self, _ctx: Context, request: UpdateResourceRequest) -> UpdateResourceResponse {
        let refreshed = self.refresh(request.prior_state.clone()).await;
        let mut diagnostics = refreshed.diagnostics;
        diagnostics.push(role_warning());
        UpdateResourceResponse {
            new_state: refreshed.new_state.unwrap_or(request.prior_state),
            diagnostics,
        }
    }

    async fn delete(&self, _ctx: Context, request: DeleteResourceRequest) -> DeleteResourceResponse {
        let id = string_attr(&request.prior_state, "id");
        tracing::info!(user_id = %id, "Deleting user");

        let diagnostics = match self.client.users().delete(&id).await {
            Ok(()) => vec![],
            Err(e) => vec![api_error("Failed to delete user", &e)],
        };
        DeleteResourceResponse { diagnostics }
    }

    async fn import_state(
        &self,
        _ctx: Context,
        request: ImportResourceStateRequest,
    ) -> ImportResourceStateResponse {
        import_state_passthrough_id(AttributePath::new("id"), &request)
    }
}
