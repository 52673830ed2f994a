//! Route API implementation
//!
//! Routes are scoped to a network: every endpoint lives below
//! `/networks/{network_id}/routes`.

use super::client::Client;
use super::common::RouteType;
use super::error::ApiError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(rename = "type")]
    pub route_type: RouteType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subnet: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub network_item_id: String,
}

impl Route {
    /// Request body for create or in-place update
    pub fn new(route_type: RouteType, value: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            route_type,
            subnet: None,
            domain: None,
            value: Some(value.into()),
            description: None,
            network_item_id: String::new(),
        }
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    /// The user-facing value: `subnet` for IP routes, `domain` for DOMAIN routes
    pub fn display_value(&self) -> &str {
        let field = match self.route_type {
            RouteType::IpV4 | RouteType::IpV6 => &self.subnet,
            RouteType::Domain => &self.domain,
        };
        field.as_deref().unwrap_or_default()
    }
}

pub struct RoutesApi<'a> {
    client: &'a Client,
}

impl<'a> RoutesApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// GET /networks/{network_id}/routes
    pub async fn list(&self, network_id: &str) -> Result<Vec<Route>, ApiError> {
        self.client
            .get(&format!("/networks/{}/routes", network_id))
            .await
    }

    /// Route by id; a missing route is an error
    pub async fn get(&self, network_id: &str, route_id: &str) -> Result<Route, ApiError> {
        self.find(network_id, route_id)
            .await?
            .ok_or_else(|| ApiError::NotFound {
                kind: "route",
                id: route_id.to_string(),
            })
    }

    /// Route by id, `None` when it is gone
    pub async fn find(&self, network_id: &str, route_id: &str) -> Result<Option<Route>, ApiError> {
        Ok(self
            .list(network_id)
            .await?
            .into_iter()
            .find(|r| r.id == route_id))
    }

    /// POST /networks/{network_id}/routes
    pub async fn create(&self, network_id: &str, route: &Route) -> Result<Route, ApiError> {
        self.client
            .post(&format!("/networks/{}/routes", network_id), route)
            .await
    }

    /// PUT /networks/{network_id}/routes/{route.id}
    pub async fn update(&self, network_id: &str, route: &Route) -> Result<(), ApiError> {
        self.client
            .put(
                &format!("/networks/{}/routes/{}", network_id, route.id),
                route,
            )
            .await
    }

    /// DELETE /networks/{network_id}/routes/{route_id}
    pub async fn delete(&self, network_id: &str, route_id: &str) -> Result<(), ApiError> {
        self.client
            .delete(&format!("/networks/{}/routes/{}", network_id, route_id))
            .await
    }
}
