//! Network API implementation
//!
//! The service has no endpoint for deleting networks.

use super::client::Client;
use super::common::InternetAccess;
use super::connectors::Connector;
use super::error::ApiError;
use super::routes::Route;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Network {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub egress: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub internet_access: Option<InternetAccess>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub system_subnets: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub routes: Vec<Route>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub connectors: Vec<Connector>,
}

pub struct NetworksApi<'a> {
    client: &'a Client,
}

impl<'a> NetworksApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// GET /networks
    pub async fn list(&self) -> Result<Vec<Network>, ApiError> {
        self.client.get("/networks").await
    }

    pub async fn get_by_name(&self, name: &str) -> Result<Option<Network>, ApiError> {
        Ok(self.list().await?.into_iter().find(|n| n.name == name))
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Option<Network>, ApiError> {
        Ok(self.list().await?.into_iter().find(|n| n.id == id))
    }

    /// POST /networks
    pub async fn create(&self, network: &Network) -> Result<Network, ApiError> {
        self.client.post("/networks", network).await
    }

    /// PUT /networks/{id}
    pub async fn update(&self, network: &Network) -> Result<(), ApiError> {
        self.client
            .put(&format!("/networks/{}", network.id), network)
            .await
    }
}
