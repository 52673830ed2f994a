//! User group API implementation (read-only)

use super::client::Client;
use super::common::InternetAccess;
use super::error::ApiError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserGroup {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub vpn_region_ids: Vec<String>,
    #[serde(default)]
    pub internet_access: Option<InternetAccess>,
    #[serde(default)]
    pub max_device: i64,
    #[serde(default)]
    pub system_subnets: Vec<String>,
}

pub struct UserGroupsApi<'a> {
    client: &'a Client,
}

impl<'a> UserGroupsApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// GET /user-groups
    pub async fn list(&self) -> Result<Vec<UserGroup>, ApiError> {
        self.client.get("/user-groups").await
    }

    pub async fn get_by_name(&self, name: &str) -> Result<Option<UserGroup>, ApiError> {
        Ok(self.list().await?.into_iter().find(|g| g.name == name))
    }
}
