//! Host resource implementation

use super::{
    api_error, apply_connector_actions, connector_block, connector_state, internet_access_attr,
    internet_access_attribute, manual_setup_warning, state_error, string_attr,
    system_subnets_attribute,
};
use crate::api::{Client, Host, InternetAccess, NetworkItemType};
use crate::reconcile::{plan_connector_change, ConnectorBlock};
use async_trait::async_trait;
use tfplug::resource::{
    CreateResourceRequest, CreateResourceResponse, DeleteResourceRequest, DeleteResourceResponse,
    ImportResourceStateRequest, ImportResourceStateResponse, ReadResourceRequest,
    ReadResourceResponse, Resource, UpdateResourceRequest, UpdateResourceResponse,
};
use tfplug::validator::StringLengthValidator;
use tfplug::{
    import_state_passthrough_id, AttributeBuilder, AttributePath, AttributeType, Context,
    Diagnostic, Dynamic, DynamicValue, NestedBlock, Schema, SchemaBuilder,
};

const CONNECTOR: &str = "connector";
const DEFAULT_DESCRIPTION: &str = "Managed by Terraform";

pub struct HostResource {
    client: Client,
}

impl HostResource {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn extract_host(config: &DynamicValue) -> Result<Host, Diagnostic> {
        Ok(Host {
            name: string_attr(config, "name"),
            description: string_attr(config, "description"),
            internet_access: internet_access_attr(config)?,
            ..Default::default()
        })
    }

    fn apply_host(state: &mut DynamicValue, host: &Host) -> tfplug::Result<()> {
        state.set_string(&AttributePath::new("id"), host.id.clone())?;
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

        // The connector block is only tracked when it is configured
        if let Some(configured) = ConnectorBlock::from_value(state, CONNECTOR) {
            let block = connector_state(&host.connectors, &configured.name);
            state.set_list(&AttributePath::new(CONNECTOR), vec![block])?;
        }
        Ok(())
    }

    async fn refresh(&self, mut state: DynamicValue) -> ReadResourceResponse {
        let mut diagnostics = vec![];
        let id = string_attr(&state, "id");

        match self.client.hosts().get_by_id(&id).await {
            Ok(Some(host)) => {
                if let Err(e) = Self::apply_host(&mut state, &host) {
                    diagnostics.push(state_error(e));
                }
                ReadResourceResponse {
                    new_state: Some(state),
                    diagnostics,
                }
            }
            Ok(None) => {
                tracing::warn!(host_id = %id, "Host no longer exists, removing from state");
                ReadResourceResponse {
                    new_state: None,
                    diagnostics,
                }
            }
            Err(e) => {
                diagnostics.push(api_error("Failed to read host", &e));
                ReadResourceResponse {
                    new_state: Some(state),
                    diagnostics,
                }
            }
        }
    }
}

#[async_trait]
impl Resource for HostResource {
    fn type_name(&self) -> &str {
        "openvpncloud_host"
    }

    fn schema(&self) -> Schema {
        SchemaBuilder::new()
            .version(0)
            .description("Manages an OpenVPN Cloud host")
            .attribute(
                AttributeBuilder::new("id", AttributeType::String)
                    .description("The host ID")
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("name", AttributeType::String)
                    .description("The host name")
                    .required()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("description", AttributeType::String)
                    .description("The host description")
                    .optional()
                    .default_value(DEFAULT_DESCRIPTION)
                    .validator(StringLengthValidator::between(1, 120))
                    .build(),
            )
            .attribute(
                internet_access_attribute()
                    .default_value(InternetAccess::Local.as_str())
                    .build(),
            )
            .attribute(system_subnets_attribute().build())
            .block(NestedBlock::list(CONNECTOR, connector_block()).max_items(1))
            .build()
    }

    async fn create(&self, _ctx: Context, request: CreateResourceRequest) -> CreateResourceResponse {
        let mut diagnostics = vec![];
        let mut state = request.planned_state;

        let mut host = match Self::extract_host(&request.config) {
            Ok(host) => host,
            Err(diag) => {
                diagnostics.push(diag);
                return CreateResourceResponse {
                    new_state: state,
                    diagnostics,
                };
            }
        };
        host.connectors = ConnectorBlock::from_value(&request.config, CONNECTOR)
            .map(|block| block.create_request())
            .into_iter()
            .collect();

        tracing::info!(name = %host.name, "Creating host");
        match self.client.hosts().create(&host).await {
            Ok(created) => {
                if let Err(e) = Self::apply_host(&mut state, &created) {
                    diagnostics.push(state_error(e));
                }
                diagnostics.push(manual_setup_warning(
                    "The connector for this host needs to be set up manually",
                ));
            }
            Err(e) => diagnostics.push(api_error("Failed to create host", &e)),
        }

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
        let config = request.config;
        let host_id = string_attr(&prior, "id");

        let (desired, current) =
            match Self::extract_host(&config).and_then(|d| Ok((d, Self::extract_host(&prior)?))) {
                Ok(pair) => pair,
                Err(diag) => {
                    return UpdateResourceResponse {
                        new_state: prior,
                        diagnostics: vec![diag],
                    }
                }
            };

        let actions = plan_connector_change(
            ConnectorBlock::from_value(&prior, CONNECTOR).as_ref(),
            ConnectorBlock::from_value(&config, CONNECTOR).as_ref(),
        );
        if let Err(diag) =
            apply_connector_actions(&self.client, &host_id, NetworkItemType::Host, actions).await
        {
            return UpdateResourceResponse {
                new_state: prior,
                diagnostics: vec![diag],
            };
        }

        if desired != current {
            let update = Host {
                id: host_id.clone(),
                ..desired
            };
            tracing::info!(host_id = %host_id, "Updating host");
            if let Err(e) = self.client.hosts().update(&update).await {
                return UpdateResourceResponse {
                    new_state: prior,
                    diagnostics: vec![api_error("Failed to update host", &e)],
                };
            }
        }

        let mut state = config;
        if let Err(e) = state.set_string(&AttributePath::new("id"), host_id) {
            return UpdateResourceResponse {
                new_state: prior,
                diagnostics: vec![state_error(e)],
            };
        }

        let refreshed = self.refresh(state.clone()).await;
        let mut diagnostics = refreshed.diagnostics;
        let new_state = match refreshed.new_state {
            Some(new_state) => new_state,
            None => {
                diagnostics.push(Diagnostic::error(
                    "Host not found after update",
                    "The host disappeared while it was being updated",
                ));
                state
            }
        };
        UpdateResourceResponse {
            new_state,
            diagnostics,
        }
    }

    async fn delete(&self, _ctx: Context, request: DeleteResourceRequest) -> DeleteResourceResponse {
        let id = string_attr(&request.prior_state, "id");
        tracing::info!(host_id = %id, "Deleting host");

        let diagnostics = match self.client.hosts().delete(&id).await {
            Ok(()) => vec![],
            Err(e) => vec![api_error("Failed to delete host", &e)],
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
