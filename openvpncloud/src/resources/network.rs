//! Network resource implementation
//!
//! A network is created together with one default connector and one
//! default route. The service cannot delete networks, so delete only drops
//! the resource from state.

use super::{
    api_error, apply_connector_actions, connector_block, connector_state, enum_error,
    internet_access_attr, internet_access_attribute, state_error, string_attr,
    system_subnets_attribute,
};
use crate::api::{Client, Network, NetworkItemType, RouteType};
use crate::reconcile::{
    fields, plan_connector_change, plan_route_change, ConnectorBlock, RouteAction, RouteBlock,
};
use async_trait::async_trait;
use tfplug::resource::{
    CreateResourceRequest, CreateResourceResponse, DeleteResourceRequest, DeleteResourceResponse,
    ReadResourceRequest, ReadResourceResponse, Resource, UpdateResourceRequest,
    UpdateResourceResponse,
};
use tfplug::validator::OneOfValidator;
use tfplug::{
    AttributeBuilder, AttributePath, AttributeType, BlockBuilder, Context, Diagnostic, Dynamic,
    DynamicValue, NestedBlock, Schema, SchemaBuilder,
};

const DEFAULT_ROUTE: &str = "default_route";
const DEFAULT_CONNECTOR: &str = "default_connector";

pub struct NetworkResource {
    client: Client,
}

impl NetworkResource {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Scalar fields of the network; connectors and routes are handled separately
    fn extract_network(config: &DynamicValue) -> Result<Network, Diagnostic> {
        Ok(Network {
            name: string_attr(config, "name"),
            description: string_attr(config, "description"),
            egress: config.get_bool(&AttributePath::new("egress")).unwrap_or(false),
            internet_access: internet_access_attr(config)?,
            ..Default::default()
        })
    }

    fn extract_route(config: &DynamicValue) -> Result<RouteBlock, Diagnostic> {
        match RouteBlock::from_value(config, DEFAULT_ROUTE) {
            Ok(Some(route)) => Ok(route),
            Ok(None) => Err(Diagnostic::error(
                "Missing default_route block",
                "A network needs exactly one default_route block",
            )),
            Err(e) => Err(enum_error("default_route.type", e)),
        }
    }

    fn extract_connector(config: &DynamicValue) -> Result<ConnectorBlock, Diagnostic> {
        ConnectorBlock::from_value(config, DEFAULT_CONNECTOR).ok_or_else(|| {
            Diagnostic::error(
                "Missing default_connector block",
                "A network needs exactly one default_connector block",
            )
        })
    }

    /// Writes the scalar attributes of a remote network into state
    fn apply_network(state: &mut DynamicValue, network: &Network) -> tfplug::Result<()> {
        state.set_string(&AttributePath::new("id"), network.id.clone())?;
        state.set_string(&AttributePath::new("name"), network.name.clone())?;
        state.set_string(
            &AttributePath::new("description"),
            network.description.clone(),
        )?;
        state.set_bool(&AttributePath::new("egress"), network.egress)?;
        state.set_value(
            &AttributePath::new("internet_access"),
            network.internet_access.map(|a| a.as_str()).into(),
        )?;
        state.set_value(
            &AttributePath::new("system_subnets"),
            Dynamic::string_list(&network.system_subnets),
        )
    }

    /// Re-reads connector and route of `network` into `state`
    async fn refresh(
        &self,
        state: &mut DynamicValue,
        network: &Network,
        diagnostics: &mut Vec<Diagnostic>,
    ) {
        if let Err(e) = Self::apply_network(state, network) {
            diagnostics.push(state_error(e));
            return;
        }

        let connector_name = ConnectorBlock::from_value(state, DEFAULT_CONNECTOR)
            .map(|c| c.name)
            .unwrap_or_default();
        match self
            .client
            .connectors()
            .list_for_network_item(&network.id)
            .await
        {
            Ok(connectors) => {
                let block = connector_state(&connectors, &connector_name);
                if let Err(e) = state.set_list(&AttributePath::new(DEFAULT_CONNECTOR), vec![block]) {
                    diagnostics.push(state_error(e));
                }
            }
            Err(e) => diagnostics.push(api_error("Failed to read network connectors", &e)),
        }

        let route_id = match RouteBlock::from_value(state, DEFAULT_ROUTE) {
            Ok(Some(route)) if !route.id.is_empty() => route.id,
            Ok(_) => return,
            Err(e) => {
                diagnostics.push(enum_error("default_route.type", e));
                return;
            }
        };
        match self.client.routes().get(&network.id, &route_id).await {
            Ok(route) => {
                let block = RouteBlock::from_route(&route).to_dynamic();
                if let Err(e) = state.set_list(&AttributePath::new(DEFAULT_ROUTE), vec![block]) {
                    diagnostics.push(state_error(e));
                }
            }
            Err(e) => diagnostics.push(api_error("Failed to read default route", &e)),
        }
    }

    /// Returns the id the default route has after the actions ran
    async fn apply_route_actions(
        &self,
        network_id: &str,
        actions: Vec<RouteAction>,
    ) -> Result<Option<String>, Diagnostic> {
        let mut route_id = None;
        for action in actions {
            match action {
                RouteAction::Create(block) => {
                    let created = self
                        .client
                        .routes()
                        .create(network_id, &block.to_request())
                        .await
                        .map_err(|e| api_error("Failed to create default route", &e))?;
                    route_id = Some(created.id);
                }
                RouteAction::Update(block) => {
                    tracing::debug!(network_id, route_id = %block.id, "Updating default route");
                    self.client
                        .routes()
                        .update(network_id, &block.to_request())
                        .await
                        .map_err(|e| api_error("Failed to update default route", &e))?;
                    route_id = Some(block.id);
                }
            }
        }
        Ok(route_id)
    }
}

#[async_trait]
impl Resource for NetworkResource {
    fn type_name(&self) -> &str {
        "openvpncloud_network"
    }

    fn schema(&self) -> Schema {
        let route_block = BlockBuilder::new()
            .description("Route created together with the network")
            .attribute(
                AttributeBuilder::new(fields::ID, AttributeType::String)
                    .description("The route ID")
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new(fields::TYPE, AttributeType::String)
                    .description("IP_V4, IP_V6 or DOMAIN")
                    .optional()
                    .default_value(RouteType::IpV4.as_str())
                    .validator(OneOfValidator::new(RouteType::names()))
                    .build(),
            )
            .attribute(
                AttributeBuilder::new(fields::VALUE, AttributeType::String)
                    .description("Subnet for IP routes, domain name for DOMAIN routes")
                    .required()
                    .build(),
            )
            .build();

        SchemaBuilder::new()
            .version(0)
            .description("Manages an OpenVPN Cloud network")
            .attribute(
                AttributeBuilder::new("id", AttributeType::String)
                    .description("The network ID")
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("name", AttributeType::String)
                    .description("The network name")
                    .required()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("description", AttributeType::String)
                    .description("The network description")
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("egress", AttributeType::Bool)
                    .description("Route internet traffic through this network")
                    .optional()
                    .default_value(false)
                    .build(),
            )
            .attribute(internet_access_attribute().build())
            .attribute(system_subnets_attribute().build())
            .block(
                NestedBlock::list(DEFAULT_ROUTE, route_block)
                    .min_items(1)
                    .max_items(1),
            )
            .block(
                NestedBlock::set(DEFAULT_CONNECTOR, connector_block())
                    .min_items(1)
                    .max_items(1),
            )
            .build()
    }

    async fn create(&self, _ctx: Context, request: CreateResourceRequest) -> CreateResourceResponse {
        let mut diagnostics = vec![];
        let mut state = request.planned_state;

        let extracted = Self::extract_network(&request.config).and_then(|network| {
            Ok((
                network,
                Self::extract_connector(&request.config)?,
                Self::extract_route(&request.config)?,
            ))
        });
        let (mut network, connector, route) = match extracted {
            Ok(parts) => parts,
            Err(diag) => {
                diagnostics.push(diag);
                return CreateResourceResponse {
                    new_state: state,
                    diagnostics,
                };
            }
        };
        network.connectors = vec![connector.create_request()];

        tracing::info!(name = %network.name, "Creating network");
        let created = match self.client.networks().create(&network).await {
            Ok(created) => created,
            Err(e) => {
                diagnostics.push(api_error("Failed to create network", &e));
                return CreateResourceResponse {
                    new_state: state,
                    diagnostics,
                };
            }
        };

        if let Err(e) = Self::apply_network(&mut state, &created) {
            diagnostics.push(state_error(e));
        }
        let connector_state = created
            .connectors
            .iter()
            .find(|c| c.name == connector.name)
            .map(ConnectorBlock::from_connector)
            .unwrap_or(connector);
        if let Err(e) = state.set_list(
            &AttributePath::new(DEFAULT_CONNECTOR),
            vec![connector_state.to_dynamic()],
        ) {
            diagnostics.push(state_error(e));
        }

        match self
            .client
            .routes()
            .create(&created.id, &route.to_request())
            .await
        {
            Ok(default_route) => {
                let block = RouteBlock {
                    id: default_route.id,
                    ..route
                };
                if let Err(e) =
                    state.set_list(&AttributePath::new(DEFAULT_ROUTE), vec![block.to_dynamic()])
                {
                    diagnostics.push(state_error(e));
                }
            }
            Err(e) => diagnostics.push(api_error("Failed to create default route", &e)),
        }

        CreateResourceResponse {
            new_state: state,
            diagnostics,
        }
    }

    async fn read(&self, _ctx: Context, request: ReadResourceRequest) -> ReadResourceResponse {
        let mut diagnostics = vec![];
        let mut state = request.current_state;
        let name = string_attr(&state, "name");

        let network = match self.client.networks().get_by_name(&name).await {
            Ok(Some(network)) => network,
            Ok(None) => {
                tracing::warn!(name = %name, "Network no longer exists, removing from state");
                return ReadResourceResponse {
                    new_state: None,
                    diagnostics,
                };
            }
            Err(e) => {
                diagnostics.push(api_error("Failed to read network", &e));
                return ReadResourceResponse {
                    new_state: Some(state),
                    diagnostics,
                };
            }
        };

        self.refresh(&mut state, &network, &mut diagnostics).await;
        ReadResourceResponse {
            new_state: Some(state),
            diagnostics,
        }
    }

    async fn update(&self, _ctx: Context, request: UpdateResourceRequest) -> UpdateResourceResponse {
        let prior = request.prior_state;
        let config = request.config;
        let network_id = string_attr(&prior, "id");

        let old_route = match RouteBlock::from_value(&prior, DEFAULT_ROUTE) {
            Ok(route) => route,
            Err(e) => {
                return UpdateResourceResponse {
                    new_state: prior,
                    diagnostics: vec![enum_error("default_route.type", e)],
                }
            }
        };
        let prepared = Self::extract_network(&config).and_then(|desired| {
            Ok((
                desired,
                Self::extract_network(&prior)?,
                Self::extract_route(&config)?,
            ))
        });
        let (mut desired, current, new_route) = match prepared {
            Ok(parts) => parts,
            Err(diag) => {
                return UpdateResourceResponse {
                    new_state: prior,
                    diagnostics: vec![diag],
                }
            }
        };

        let connector_actions = plan_connector_change(
            ConnectorBlock::from_value(&prior, DEFAULT_CONNECTOR).as_ref(),
            ConnectorBlock::from_value(&config, DEFAULT_CONNECTOR).as_ref(),
        );
        if let Err(diag) = apply_connector_actions(
            &self.client,
            &network_id,
            NetworkItemType::Network,
            connector_actions,
        )
        .await
        {
            return UpdateResourceResponse {
                new_state: prior,
                diagnostics: vec![diag],
            };
        }

        let route_actions = plan_route_change(old_route.as_ref(), Some(&new_route));
        let route_id = match self.apply_route_actions(&network_id, route_actions).await {
            Ok(Some(id)) => id,
            Ok(None) => old_route.map(|r| r.id).unwrap_or_default(),
            Err(diag) => {
                return UpdateResourceResponse {
                    new_state: prior,
                    diagnostics: vec![diag],
                }
            }
        };

        desired.id = network_id.clone();
        let current = Network {
            id: network_id.clone(),
            ..current
        };
        if desired != current {
            tracing::info!(network_id = %network_id, "Updating network");
            if let Err(e) = self.client.networks().update(&desired).await {
                return UpdateResourceResponse {
                    new_state: prior,
                    diagnostics: vec![api_error("Failed to update network", &e)],
                };
            }
        }

        let mut state = config;
        let mut diagnostics = vec![];
        let route_state = RouteBlock {
            id: route_id,
            ..new_route
        };
        let written = state
            .set_string(&AttributePath::new("id"), network_id)
            .and_then(|_| {
                state.set_list(
                    &AttributePath::new(DEFAULT_ROUTE),
                    vec![route_state.to_dynamic()],
                )
            });
        if let Err(e) = written {
            diagnostics.push(state_error(e));
        }

        match self.client.networks().get_by_name(&desired.name).await {
            Ok(Some(network)) => self.refresh(&mut state, &network, &mut diagnostics).await,
            Ok(None) => diagnostics.push(Diagnostic::error(
                "Network not found after update",
                format!("No network named {:?} exists", desired.name),
            )),
            Err(e) => diagnostics.push(api_error("Failed to read network", &e)),
        }

        UpdateResourceResponse {
            new_state: state,
            diagnostics,
        }
    }

    async fn delete(&self, _ctx: Context, request: DeleteResourceRequest) -> DeleteResourceResponse {
        tracing::warn!(
            network_id = %string_attr(&request.prior_state, "id"),
            "Network removed from state only"
        );
        DeleteResourceResponse {
            diagnostics: vec![Diagnostic::warning(
                "Deleting an openvpncloud_network resource is not supported",
                "Deleting a network is not supported by the OpenVPN Cloud API yet. This \
                 operation only removed it from the Terraform state, but you'll need to \
                 delete it manually from the web console.",
            )],
        }
    }
}
