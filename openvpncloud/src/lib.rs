//! Terraform provider for OpenVPN Cloud
//!
//! Configuration exchanges the client credentials for an access token and
//! hands every resource and data source a clone of the authenticated client.

pub mod api;
pub mod config;
pub mod data_sources;
pub mod reconcile;
pub mod resources;

use api::{Client, RetryConfig};
use async_trait::async_trait;
use config::ProviderConfig;
use tfplug::provider::{ConfigureProviderRequest, ConfigureProviderResponse};
use tfplug::{Context, Diagnostic, Provider, Registry, Schema};

pub struct OpenVpnCloudProvider {
    retry_config: RetryConfig,
}

impl Default for OpenVpnCloudProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl OpenVpnCloudProvider {
    pub fn new() -> Self {
        Self {
            retry_config: RetryConfig::default(),
        }
    }

    pub fn with_retry_config(retry_config: RetryConfig) -> Self {
        Self { retry_config }
    }
}

/// All resources and data sources, bound to one client
pub fn registry(client: Client) -> Registry {
    Registry::builder()
        .resource(resources::NetworkResource::new(client.clone()))
        .resource(resources::HostResource::new(client.clone()))
        .resource(resources::ConnectorResource::new(client.clone()))
        .resource(resources::RouteResource::new(client.clone()))
        .resource(resources::UserResource::new(client.clone()))
        .data_source(data_sources::NetworkDataSource::new(client.clone()))
        .data_source(data_sources::NetworkRoutesDataSource::new(client.clone()))
        .data_source(data_sources::HostDataSource::new(client.clone()))
        .data_source(data_sources::ConnectorDataSource::new(client.clone()))
        .data_source(data_sources::UserDataSource::new(client.clone()))
        .data_source(data_sources::UserGroupDataSource::new(client.clone()))
        .data_source(data_sources::VpnRegionDataSource::new(client))
        .build()
}

/// Log to stderr; stdout belongs to the plugin handshake
///
/// The filter comes from `TF_LOG` and defaults to `info`. Calling this more
/// than once is harmless.
pub fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_env("TF_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[async_trait]
impl Provider for OpenVpnCloudProvider {
    fn type_name(&self) -> &str {
        "openvpncloud"
    }

    fn schema(&self) -> Schema {
        ProviderConfig::schema()
    }

    async fn configure(
        &self,
        _ctx: Context,
        request: ConfigureProviderRequest,
    ) -> ConfigureProviderResponse {
        let config = match ProviderConfig::resolve(&request.config) {
            Ok(config) => config,
            Err(diagnostics) => {
                return ConfigureProviderResponse {
                    registry: None,
                    diagnostics,
                }
            }
        };

        tracing::info!(base_url = %config.base_url, "Configuring OpenVPN Cloud provider");
        match Client::authenticate_with_config(
            &config.base_url,
            &config.client_id,
            &config.client_secret,
            self.retry_config.clone(),
        )
        .await
        {
            Ok(client) => ConfigureProviderResponse {
                registry: Some(registry(client)),
                diagnostics: vec![],
            },
            Err(e) => ConfigureProviderResponse {
                registry: None,
                diagnostics: vec![Diagnostic::error(
                    "Failed to authenticate with OpenVPN Cloud",
                    e.to_string(),
                )],
            },
        }
    }
}
