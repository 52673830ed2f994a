//! OpenVPN Cloud REST API client and models

pub mod client;
pub mod common;
pub mod connectors;
pub mod error;
pub mod hosts;
pub mod networks;
pub mod routes;
pub mod user_groups;
pub mod users;
pub mod vpn_regions;

#[cfg(test)]
pub mod test_helpers;

pub use client::{Client, RetryConfig, API_PREFIX};
pub use common::{InternetAccess, NetworkItemType, RouteType};
pub use connectors::Connector;
pub use error::ApiError;
pub use hosts::Host;
pub use networks::Network;
pub use routes::Route;
pub use user_groups::UserGroup;
pub use users::{Device, User};
pub use vpn_regions::VpnRegion;
