//! Resource implementations

pub mod connector;
pub mod host;
pub mod network;
pub mod route;
pub mod user;

pub use connector::ConnectorResource;
pub use host::HostResource;
pub use network::NetworkResource;
pub use route::RouteResource;
pub use user::UserResource;

use crate::api::common::ParseEnumError;
use crate::api::{ApiError, Client, Connector, InternetAccess, NetworkItemType};
use crate::reconcile::{fields, ConnectorAction, ConnectorBlock};
use tfplug::schema::Block;
use tfplug::validator::OneOfValidator;
use tfplug::{
    AttributeBuilder, AttributePath, AttributeType, BlockBuilder, Diagnostic, Dynamic,
    DynamicValue, TfplugError,
};

const MANUAL_SETUP_DETAIL: &str = "Terraform only creates the OpenVPN Cloud connector object, \
    but additional manual steps are required to associate a host in your infrastructure with \
    this connector. Go to https://openvpn.net/cloud-docs/connector/ for more information.";

pub(crate) fn api_error(summary: &str, err: &ApiError) -> Diagnostic {
    Diagnostic::error(summary, format!("API error: {}", err))
}

pub(crate) fn state_error(err: TfplugError) -> Diagnostic {
    Diagnostic::error("Failed to write state", err.to_string())
}

pub(crate) fn enum_error(attribute: &str, err: ParseEnumError) -> Diagnostic {
    Diagnostic::error(format!("Invalid {}", attribute), err.to_string())
        .with_attribute(AttributePath::new(attribute))
}

pub(crate) fn manual_setup_warning(summary: &str) -> Diagnostic {
    Diagnostic::warning(summary, MANUAL_SETUP_DETAIL)
}

/// String attribute, empty when unset
pub(crate) fn string_attr(value: &DynamicValue, name: &str) -> String {
    value
        .get_optional_string(&AttributePath::new(name))
        .unwrap_or_default()
}

pub(crate) fn internet_access_attr(
    value: &DynamicValue,
) -> Result<Option<InternetAccess>, Diagnostic> {
    value
        .get_optional_string(&AttributePath::new("internet_access"))
        .map(|s| s.parse())
        .transpose()
        .map_err(|e| enum_error("internet_access", e))
}

pub(crate) fn internet_access_attribute() -> AttributeBuilder {
    AttributeBuilder::new("internet_access", AttributeType::String)
        .description("Internet access mode: BLOCKED, GLOBAL_INTERNET or LOCAL")
        .optional()
        .validator(OneOfValidator::new(InternetAccess::names()))
}

pub(crate) fn system_subnets_attribute() -> AttributeBuilder {
    AttributeBuilder::new(
        "system_subnets",
        AttributeType::Set(Box::new(AttributeType::String)),
    )
    .description("Subnets assigned by OpenVPN Cloud")
    .computed()
}

/// Connector block matching `name` among the parent's connectors, or an
/// all-unset block when none matches
pub(crate) fn connector_state(connectors: &[Connector], name: &str) -> Dynamic {
    connectors
        .iter()
        .find(|c| c.name == name)
        .map(|c| ConnectorBlock::from_connector(c).to_dynamic())
        .unwrap_or_else(ConnectorBlock::unset)
}

/// Runs connector actions in order, stopping at the first failure
///
/// Nothing is rolled back: when the delete fails after a successful create,
/// both connectors remain.
pub(crate) async fn apply_connector_actions(
    client: &Client,
    network_item_id: &str,
    network_item_type: NetworkItemType,
    actions: Vec<ConnectorAction>,
) -> Result<(), Diagnostic> {
    let connectors = client.connectors();
    for action in actions {
        match action {
            ConnectorAction::Create(block) => {
                tracing::info!(
                    network_item_id,
                    connector = %block.name,
                    "Adding {} connector",
                    network_item_type
                );
                connectors
                    .create(&block.create_request(), network_item_id, network_item_type)
                    .await
                    .map_err(|e| api_error("Failed to add connector", &e))?;
            }
            ConnectorAction::Delete { id } => {
                tracing::info!(network_item_id, connector_id = %id, "Removing connector");
                connectors
                    .delete(&id, network_item_id, network_item_type)
                    .await
                    .map_err(|e| api_error("Failed to remove connector", &e))?;
            }
        }
    }
    Ok(())
}

/// Nested block shape shared by the managed connectors of networks and hosts
pub(crate) fn connector_block() -> Block {
    let computed = |name: &str, description: &str| {
        AttributeBuilder::new(name, AttributeType::String)
            .description(description)
            .computed()
            .build()
    };

    BlockBuilder::new()
        .description("Connector managed together with its parent")
        .attribute(computed(fields::ID, "The connector ID"))
        .attribute(
            AttributeBuilder::new(fields::NAME, AttributeType::String)
                .description("The connector name")
                .required()
                .build(),
        )
        .attribute(
            AttributeBuilder::new(fields::VPN_REGION_ID, AttributeType::String)
                .description("The VPN region the connector attaches to")
                .required()
                .build(),
        )
        .attribute(computed(fields::NETWORK_ITEM_TYPE, "HOST or NETWORK"))
        .attribute(computed(fields::NETWORK_ITEM_ID, "ID of the parent host or network"))
        .attribute(computed(fields::IP_V4_ADDRESS, "Assigned IPv4 address"))
        .attribute(computed(fields::IP_V6_ADDRESS, "Assigned IPv6 address"))
        .build()
}
