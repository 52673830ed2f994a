//! Data source implementations
//!
//! Every lookup that finds nothing is an error. The `id` of a data source
//! is the Unix timestamp of the read.

pub mod connector;
pub mod host;
pub mod network;
pub mod network_routes;
pub mod user;
pub mod user_group;
pub mod vpn_region;

pub use connector::ConnectorDataSource;
pub use host::HostDataSource;
pub use network::NetworkDataSource;
pub use network_routes::NetworkRoutesDataSource;
pub use user::UserDataSource;
pub use user_group::UserGroupDataSource;
pub use vpn_region::VpnRegionDataSource;

use crate::api::{ApiError, Connector};
use crate::reconcile::ConnectorBlock;
use tfplug::data_source::ReadDataSourceResponse;
use tfplug::{AttributeBuilder, AttributePath, AttributeType, Diagnostic, Dynamic, DynamicValue};

pub(crate) fn timestamp_id() -> String {
    chrono::Utc::now().timestamp().to_string()
}

/// Successful read: writes the looked-up fields plus the timestamp id
pub(crate) fn found(
    mut state: DynamicValue,
    write: impl FnOnce(&mut DynamicValue) -> tfplug::Result<()>,
) -> ReadDataSourceResponse {
    let written = write(&mut state)
        .and_then(|_| state.set_string(&AttributePath::new("id"), timestamp_id()));
    let diagnostics = match written {
        Ok(()) => vec![],
        Err(e) => vec![Diagnostic::error("Failed to write state", e.to_string())],
    };
    ReadDataSourceResponse { state, diagnostics }
}

pub(crate) fn not_found(state: DynamicValue, kind: &str, key: &str) -> ReadDataSourceResponse {
    tracing::debug!("{} {:?} not found", kind, key);
    ReadDataSourceResponse {
        state,
        diagnostics: vec![Diagnostic::error(
            format!("{} not found", kind),
            format!("No {} matches {:?}", kind.to_lowercase(), key),
        )],
    }
}

pub(crate) fn failed(state: DynamicValue, kind: &str, err: &ApiError) -> ReadDataSourceResponse {
    ReadDataSourceResponse {
        state,
        diagnostics: vec![Diagnostic::error(
            format!("Error requesting {}", kind),
            format!("API error: {}", err),
        )],
    }
}

pub(crate) fn id_attribute() -> AttributeBuilder {
    AttributeBuilder::new("id", AttributeType::String)
        .description("Timestamp of the read")
        .computed()
}

pub(crate) fn computed(name: &str, r#type: AttributeType) -> AttributeBuilder {
    AttributeBuilder::new(name, r#type).computed()
}

/// `list(map(string))`, used for nested records
pub(crate) fn object_list() -> AttributeType {
    AttributeType::List(Box::new(AttributeType::Map(Box::new(AttributeType::String))))
}

pub(crate) fn string_set() -> AttributeType {
    AttributeType::Set(Box::new(AttributeType::String))
}

pub(crate) fn connectors_dynamic(connectors: &[Connector]) -> Dynamic {
    Dynamic::List(
        connectors
            .iter()
            .map(|c| ConnectorBlock::from_connector(c).to_dynamic())
            .collect(),
    )
}
