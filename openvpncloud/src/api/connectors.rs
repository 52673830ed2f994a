//! Connector API implementation
//!
//! Connectors always belong to a network or a host; creation and deletion
//! are scoped with `networkItemId`/`networkItemType` query parameters.

use super::client::Client;
use super::common::{network_item_scope, NetworkItemType};
use super::error::ApiError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connector {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub network_item_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_item_type: Option<NetworkItemType>,
    #[serde(default)]
    pub vpn_region_id: String,
    /// Assigned by the service
    #[serde(rename = "ipV4Address", default, skip_serializing_if = "Option::is_none")]
    pub ip_v4_address: Option<String>,
    #[serde(rename = "ipV6Address", default, skip_serializing_if = "Option::is_none")]
    pub ip_v6_address: Option<String>,
}

impl Connector {
    /// Create request body: only the fields a client may choose
    pub fn new(name: impl Into<String>, vpn_region_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            vpn_region_id: vpn_region_id.into(),
            ..Default::default()
        }
    }
}

pub struct ConnectorsApi<'a> {
    client: &'a Client,
}

impl<'a> ConnectorsApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// GET /connectors
    pub async fn list(&self) -> Result<Vec<Connector>, ApiError> {
        self.client.get("/connectors").await
    }

    /// First connector with the given name
    pub async fn get_by_name(&self, name: &str) -> Result<Option<Connector>, ApiError> {
        Ok(self.list().await?.into_iter().find(|c| c.name == name))
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Option<Connector>, ApiError> {
        Ok(self.list().await?.into_iter().find(|c| c.id == id))
    }

    /// Connectors attached to one network or host
    pub async fn list_for_network_item(
        &self,
        network_item_id: &str,
    ) -> Result<Vec<Connector>, ApiError> {
        Ok(self
            .list()
            .await?
            .into_iter()
            .filter(|c| c.network_item_id == network_item_id)
            .collect())
    }

    /// POST /connectors?networkItemId={id}&networkItemType={type}
    pub async fn create(
        &self,
        connector: &Connector,
        network_item_id: &str,
        network_item_type: NetworkItemType,
    ) -> Result<Connector, ApiError> {
        let query = network_item_scope(network_item_id, network_item_type).to_query_string();
        self.client
            .post(&format!("/connectors{}", query), connector)
            .await
    }

    /// DELETE /connectors/{id}?networkItemId={id}&networkItemType={type}
    pub async fn delete(
        &self,
        connector_id: &str,
        network_item_id: &str,
        network_item_type: NetworkItemType,
    ) -> Result<(), ApiError> {
        let query = network_item_scope(network_item_id, network_item_type).to_query_string();
        self.client
            .delete(&format!("/connectors/{}{}", connector_id, query))
            .await
    }
}
