//! Host API implementation

use super::client::Client;
use super::common::InternetAccess;
use super::connectors::Connector;
use super::error::ApiError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Host {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub internet_access: Option<InternetAccess>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub system_subnets: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub connectors: Vec<Connector>,
}

pub struct HostsApi<'a> {
    client: &'a Client,
}

impl<'a> HostsApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// GET /hosts
    pub async fn list(&self) -> Result<Vec<Host>, ApiError> {
        self.client.get("/hosts").await
    }

    pub async fn get_by_name(&self, name: &str) -> Result<Option<Host>, ApiError> {
        Ok(self.list().await?.into_iter().find(|h| h.name == name))
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Option<Host>, ApiError> {
        Ok(self.list().await?.into_iter().find(|h| h.id == id))
    }

    /// POST /hosts
    pub async fn create(&self, host: &Host) -> Result<Host, ApiError> {
        self.client.post("/hosts", host).await
    }

    /// PUT /hosts/{id}
    pub async fn update(&self, host: &Host) -> Result<(), ApiError> {
        self.client.put(&format!("/hosts/{}", host.id), host).await
    }

    /// DELETE /hosts/{id}
    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        self.client.delete(&format!("/hosts/{}", id)).await
    }
}
