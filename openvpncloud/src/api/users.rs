//! User API implementation

use super::client::Client;
use super::error::ApiError;
use serde::{Deserialize, Serialize};

/// The only role users can be created with
pub const MEMBER_ROLE: &str = "MEMBER";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub auth_type: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub group_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub status: String,
    #[serde(default)]
    pub devices: Vec<Device>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "ipV4Address", default, skip_serializing_if = "Option::is_none")]
    pub ip_v4_address: Option<String>,
    #[serde(rename = "ipV6Address", default, skip_serializing_if = "Option::is_none")]
    pub ip_v6_address: Option<String>,
}

pub struct UsersApi<'a> {
    client: &'a Client,
}

impl<'a> UsersApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// GET /users
    pub async fn list(&self) -> Result<Vec<User>, ApiError> {
        self.client.get("/users").await
    }

    /// First user matching both username and role
    pub async fn get(&self, username: &str, role: &str) -> Result<Option<User>, ApiError> {
        Ok(self
            .list()
            .await?
            .into_iter()
            .find(|u| u.username == username && u.role == role))
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Option<User>, ApiError> {
        Ok(self.list().await?.into_iter().find(|u| u.id == id))
    }

    /// POST /users
    pub async fn create(&self, user: &User) -> Result<User, ApiError> {
        self.client.post("/users", user).await
    }

    /// DELETE /users/{id}
    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        self.client.delete(&format!("/users/{}", id)).await
    }
}
