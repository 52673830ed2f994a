//! Connector resource implementation
//!
//! Connectors cannot be modified in place; every configurable attribute
//! forces replacement.

use super::{api_error, enum_error, manual_setup_warning, state_error, string_attr};
use crate::api::{Client, Connector, NetworkItemType};
use crate::reconcile::fields;
use async_trait::async_trait;
use tfplug::resource::{
    CreateResourceRequest, CreateResourceResponse, DeleteResourceRequest, DeleteResourceResponse,
    ReadResourceRequest, ReadResourceResponse, Resource, UpdateResourceRequest,
    UpdateResourceResponse,
};
use tfplug::validator::OneOfValidator;
use tfplug::{
    AttributeBuilder, AttributePath, AttributeType, Context, Diagnostic, DynamicValue, Schema,
    SchemaBuilder,
};

pub struct ConnectorResource {
    client: Client,
}

impl ConnectorResource {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn network_item_type(value: &DynamicValue) -> Result<NetworkItemType, Diagnostic> {
        string_attr(value, fields::NETWORK_ITEM_TYPE)
            .parse()
            .map_err(|e| enum_error(fields::NETWORK_ITEM_TYPE, e))
    }

    fn apply_connector(state: &mut DynamicValue, connector: &Connector) -> tfplug::Result<()> {
        state.set_string(&AttributePath::new(fields::ID), connector.id.clone())?;
        state.set_string(&AttributePath::new(fields::NAME), connector.name.clone())?;
        state.set_string(
            &AttributePath::new(fields::VPN_REGION_ID),
            connector.vpn_region_id.clone(),
        )?;
        if let Some(item_type) = connector.network_item_type {
            state.set_string(
                &AttributePath::new(fields::NETWORK_ITEM_TYPE),
                item_type.to_string(),
            )?;
        }
        if !connector.network_item_id.is_empty() {
            state.set_string(
                &AttributePath::new(fields::NETWORK_ITEM_ID),
                connector.network_item_id.clone(),
            )?;
        }
        state.set_value(
            &AttributePath::new(fields::IP_V4_ADDRESS),
            connector.ip_v4_address.clone().into(),
        )?;
        state.set_value(
            &AttributePath::new(fields::IP_V6_ADDRESS),
            connector.ip_v6_address.clone().into(),
        )
    }

    async fn refresh(&self, mut state: DynamicValue) -> ReadResourceResponse {
        let name = string_attr(&state, fields::NAME);
        match self.client.connectors().get_by_name(&name).await {
            Ok(Some(connector)) => {
                let diagnostics = match Self::apply_connector(&mut state, &connector) {
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
                diagnostics: vec![Diagnostic::warning(
                    format!("Connector with name {} not found", name),
                    "The connector was removed outside of Terraform and has been dropped from state",
                )],
            },
            Err(e) => ReadResourceResponse {
                new_state: Some(state),
                diagnostics: vec![api_error("Failed to read connector", &e)],
            },
        }
    }
}

#[async_trait]
impl Resource for ConnectorResource {
    fn type_name(&self) -> &str {
        "openvpncloud_connector"
    }

    fn schema(&self) -> Schema {
        let replaced = |name: &str, description: &str| {
            AttributeBuilder::new(name, AttributeType::String)
                .description(description)
                .required()
                .force_new()
        };

        SchemaBuilder::new()
            .version(0)
            .description("Manages a connector attached to a network or host")
            .attribute(
                AttributeBuilder::new(fields::ID, AttributeType::String)
                    .computed()
                    .build(),
            )
            .attribute(replaced(fields::NAME, "The connector name").build())
            .attribute(replaced(fields::VPN_REGION_ID, "The VPN region to attach to").build())
            .attribute(
                replaced(fields::NETWORK_ITEM_TYPE, "Parent kind: HOST or NETWORK")
                    .validator(OneOfValidator::new(NetworkItemType::names()))
                    .build(),
            )
            .attribute(replaced(fields::NETWORK_ITEM_ID, "ID of the parent host or network").build())
            .attribute(
                AttributeBuilder::new(fields::IP_V4_ADDRESS, AttributeType::String)
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new(fields::IP_V6_ADDRESS, AttributeType::String)
                    .computed()
                    .build(),
            )
            .build()
    }

    async fn create(&self, _ctx: Context, request: CreateResourceRequest) -> CreateResourceResponse {
        let mut state = request.planned_state;
        let item_type = match Self::network_item_type(&request.config) {
            Ok(item_type) => item_type,
            Err(diag) => {
                return CreateResourceResponse {
                    new_state: state,
                    diagnostics: vec![diag],
                }
            }
        };
        let item_id = string_attr(&request.config, fields::NETWORK_ITEM_ID);
        let connector = Connector {
            network_item_id: item_id.clone(),
            network_item_type: Some(item_type),
            ..Connector::new(
                string_attr(&request.config, fields::NAME),
                string_attr(&request.config, fields::VPN_REGION_ID),
            )
        };

        tracing::info!(name = %connector.name, network_item_id = %item_id, "Creating connector");
        let mut diagnostics = vec![];
        match self
            .client
            .connectors()
            .create(&connector, &item_id, item_type)
            .await
        {
            Ok(created) => {
                if let Err(e) = Self::apply_connector(&mut state, &created) {
                    diagnostics.push(state_error(e));
                }
                diagnostics.push(manual_setup_warning("Connector needs to be set up manually"));
            }
            Err(e) => diagnostics.push(api_error("Failed to create connector", &e)),
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
        // Only computed attributes can differ here
        let refreshed = self.refresh(request.prior_state.clone()).await;
        UpdateResourceResponse {
            new_state: refreshed.new_state.unwrap_or(request.prior_state),
            diagnostics: refreshed.diagnostics,
        }
    }

    async fn delete(&self, _ctx: Context, request: DeleteResourceRequest) -> DeleteResourceResponse {
        let state = &request.prior_state;
        let item_type = match Self::network_item_type(state) {
            Ok(item_type) => item_type,
            Err(diag) => {
                return DeleteResourceResponse {
                    diagnostics: vec![diag],
                }
            }
        };
        let id = string_attr(state, fields::ID);
        let item_id = string_attr(state, fields::NETWORK_ITEM_ID);

        tracing::info!(connector_id = %id, network_item_id = %item_id, "Deleting connector");
        let diagnostics = match self.client.connectors().delete(&id, &item_id, item_type).await {
            Ok(()) => vec![],
            Err(e) => vec![api_error("Failed to delete connector", &e)],
        };
        DeleteResourceResponse { diagnostics }
    }
}
