//! VPN region API implementation (read-only)

use super::client::Client;
use super::error::ApiError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VpnRegion {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub continent: String,
    #[serde(default)]
    pub country: String,
    #[serde(rename = "countryISO", default)]
    pub country_iso: String,
    #[serde(default)]
    pub region_name: String,
}

pub struct VpnRegionsApi<'a> {
    client: &'a Client,
}

impl<'a> VpnRegionsApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// GET /regions
    pub async fn list(&self) -> Result<Vec<VpnRegion>, ApiError> {
        self.client.get("/regions").await
    }

    pub async fn get(&self, region_id: &str) -> Result<Option<VpnRegion>, ApiError> {
        Ok(self.list().await?.into_iter().find(|r| r.id == region_id))
    }
}
