//! Route resource implementation

use super::{api_error, enum_error, state_error, string_attr};
use crate::api::{Client, Route, RouteType};
use crate::reconcile::fields;
use async_trait::async_trait;
use tfplug::resource::{
    CreateResourceRequest, CreateResourceResponse, DeleteResourceRequest, DeleteResourceResponse,
    ImportResourceStateRequest, ImportResourceStateResponse, ReadResourceRequest,
    ReadResourceResponse, Resource, UpdateResourceRequest, UpdateResourceResponse,
};
use tfplug::validator::OneOfValidator;
use tfplug::{
    import_state_composite_id, AttributeBuilder, AttributePath, AttributeType, Context,
    Diagnostic, DynamicValue, Schema, SchemaBuilder,
};

pub struct RouteResource {
    client: Client,
}

impl RouteResource {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn extract_route(config: &DynamicValue) -> Result<Route, Diagnostic> {
        let route_type: RouteType = string_attr(config, fields::TYPE)
            .parse()
            .map_err(|e| enum_error(fields::TYPE, e))?;
        Ok(Route::new(route_type, string_attr(config, fields::VALUE))
            .with_description(config.get_optional_string(&AttributePath::new("description"))))
    }

    fn apply_route(state: &mut DynamicValue, route: &Route) -> tfplug::Result<()> {
        state.set_string(&AttributePath::new(fields::ID), route.id.clone())?;
        state.set_string(
            &AttributePath::new(fields::TYPE),
            route.route_type.to_string(),
        )?;
        state.set_string(
            &AttributePath::new(fields::VALUE),
            route.display_value().to_string(),
        )?;
        state.set_value(
            &AttributePath::new("description"),
            route.description.clone().into(),
        )?;
        if !route.network_item_id.is_empty() {
            state.set_string(
                &AttributePath::new(fields::NETWORK_ITEM_ID),
                route.network_item_id.clone(),
            )?;
        }
        Ok(())
    }

    async fn refresh(&self, mut state: DynamicValue) -> ReadResourceResponse {
        let id = string_attr(&state, fields::ID);
        let network_id = string_attr(&state, fields::NETWORK_ITEM_ID);
        tracing::debug!(route_id = %id, network_id = %network_id, "Reading route");

        match self.client.routes().find(&network_id, &id).await {
            Ok(Some(route)) => {
                let diagnostics = match Self::apply_route(&mut state, &route) {
                    Ok(()) => vec![],
                    Err(e) => vec![state_error(e)],
                };
                ReadResourceResponse {
                    new_state: Some(state),
                    diagnostics,
                }
            }
            Ok(None) => ReadResourceResponse {
                new_state: None,
                diagnostics: vec![],
            },
            Err(e) => ReadResourceResponse {
                new_state: Some(state),
                diagnostics: vec![api_error("Failed to read route", &e)],
            },
        }
    }
}

#[async_trait]
impl Resource for RouteResource {
    fn type_name(&self) -> &str {
        "openvpncloud_route"
    }

    fn schema(&self) -> Schema {
        SchemaBuilder::new()
            .version(0)
            .description("Manages a route of an OpenVPN Cloud network")
            .attribute(
                AttributeBuilder::new(fields::ID, AttributeType::String)
                    .description("The route ID")
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new(fields::TYPE, AttributeType::String)
                    .description("IP_V4, IP_V6 or DOMAIN")
                    .required()
                    .force_new()
                    .validator(OneOfValidator::new(RouteType::names()))
                    .build(),
            )
            .attribute(
                AttributeBuilder::new(fields::VALUE, AttributeType::String)
                    .description("Subnet for IP routes, domain name for DOMAIN routes")
                    .required()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new(fields::NETWORK_ITEM_ID, AttributeType::String)
                    .description("The network the route belongs to")
                    .required()
                    .force_new()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("description", AttributeType::String)
                    .optional()
                    .build(),
            )
            .build()
    }

    async fn create(&self, _ctx: Context, request: CreateResourceRequest) -> CreateResourceResponse {
        let mut state = request.planned_state;
        let route = match Self::extract_route(&request.config) {
            Ok(route) => route,
            Err(diag) => {
                return CreateResourceResponse {
                    new_state: state,
                    diagnostics: vec![diag],
                }
            }
        };
        let network_id = string_attr(&request.config, fields::NETWORK_ITEM_ID);

        tracing::info!(network_id = %network_id, route_type = %route.route_type, "Creating route");
        let diagnostics = match self.client.routes().create(&network_id, &route).await {
            Ok(created) => {
                tracing::debug!(route_id = %created.id, "Created route");
                // Keep the configured value when the response omits subnet/domain
                let written = if created.display_value().is_empty() {
                    state.set_string(&AttributePath::new(fields::ID), created.id)
                } else {
                    Self::apply_route(&mut state, &created)
                };
                written.err().map(state_error).into_iter().collect()
            }
            Err(e) => vec![api_error("Failed to create route", &e)],
        };

        CreateResourceResponse {
            new_state: state,
            diagnostics,
        }
    }

    async fn read(&self, _ctx: Context, request: ReadResourceRequest) -> ReadResourceResponse {
        self.refresh(request.current_state).await
    }

    async fn update(&self, _ctx: Context, request: UpdateResourceRequest) -> UpdateResourceResponse {
        let prior = request.prior_state;
        let mut route = match Self::extract_route(&request.config) {
            Ok(route) => route,
            Err(diag) => {
                return UpdateResourceResponse {
                    new_state: prior,
                    diagnostics: vec![diag],
                }
            }
        };
        route.id = string_attr(&prior, fields::ID);
        let network_id = string_attr(&prior, fields::NETWORK_ITEM_ID);

        tracing::debug!(route_id = %route.id, "Updating route");
        if let Err(e) = self.client.routes().update(&network_id, &route).await {
            return UpdateResourceResponse {
                new_state: prior,
                diagnostics: vec![api_error("Failed to update route", &e)],
            };
        }

        let mut state = request.config;
        if let Err(e) = state.set_string(&AttributePath::new(fields::ID), route.id) {
            return UpdateResourceResponse {
                new_state: prior,
                diagnostics: vec![state_error(e)],
            };
        }
        let refreshed = self.refresh(state.clone()).await;
        UpdateResourceResponse {
            new_state: refreshed.new_state.unwrap_or(state),
            diagnostics: refreshed.diagnostics,
        }
    }

    async fn delete(&self, _ctx: Context, request: DeleteResourceRequest) -> DeleteResourceResponse {
        let id = string_attr(&request.prior_state, fields::ID);
        let network_id = string_attr(&request.prior_state, fields::NETWORK_ITEM_ID);

        tracing::info!(route_id = %id, network_id = %network_id, "Deleting route");
        let diagnostics = match self.client.routes().delete(&network_id, &id).await {
            Ok(()) => vec![],
            Err(e) => vec![api_error("Failed to delete route", &e)],
        };
        DeleteResourceResponse { diagnostics }
    }

    /// Accepts `<network_item_id>/<route_id>`
    async fn import_state(
        &self,
        _ctx: Context,
        request: ImportResourceStateRequest,
    ) -> ImportResourceStateResponse {
        import_state_composite_id(&[fields::NETWORK_ITEM_ID, fields::ID], &request)
    }
}
