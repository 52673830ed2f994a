use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::common::ApiQueryParams;
use super::error::ApiError;

/// Every endpoint lives below this prefix
pub const API_PREFIX: &str = "/api/beta";

/// OpenVPN Cloud API client
///
/// Cheap to clone; clones share one connection pool and token.
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http_client: reqwest::Client,
    base_url: String,
    auth_header: String,
    retry_config: RetryConfig,
}

#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
    pub timeout_seconds: u64,
}

impl RetryConfig {
    /// Exponential delay before retry `attempt` (1-based), capped at `max_backoff_ms`
    pub fn backoff_ms(&self, attempt: u32) -> u64 {
        2_u64
            .checked_pow(attempt.saturating_sub(1))
            .and_then(|factor| self.initial_backoff_ms.checked_mul(factor))
            .map_or(self.max_backoff_ms, |ms| ms.min(self.max_backoff_ms))
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff_ms: 100,
            max_backoff_ms: 10000,
            timeout_seconds: 30,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

impl Client {
    /// Create a client around an already issued access token
    pub fn new(base_url: &str, access_token: &str) -> Result<Self, ApiError> {
        Self::with_config(base_url, access_token, RetryConfig::default())
    }

    pub fn with_config(
        base_url: &str,
        access_token: &str,
        retry_config: RetryConfig,
    ) -> Result<Self, ApiError> {
        let base_url = normalize_base_url(base_url)?;
        let http_client = build_http_client(&retry_config)?;
        Ok(Self::from_parts(
            http_client,
            base_url,
            access_token,
            retry_config,
        ))
    }

    /// Exchange client credentials for an access token
    pub async fn authenticate(
        base_url: &str,
        client_id: &str,
        client_secret: &str,
    ) -> Result<Self, ApiError> {
        Self::authenticate_with_config(base_url, client_id, client_secret, RetryConfig::default())
            .await
    }

    pub async fn authenticate_with_config(
        base_url: &str,
        client_id: &str,
        client_secret: &str,
        retry_config: RetryConfig,
    ) -> Result<Self, ApiError> {
        let base_url = normalize_base_url(base_url)?;
        let http_client = build_http_client(&retry_config)?;

        let token_url = format!("{}{}/oauth/token", base_url, API_PREFIX);
        let query = ApiQueryParams::new()
            .add("client_id", client_id)
            .add("client_secret", client_secret)
            .add("grant_type", "client_credentials");

        tracing::debug!("Requesting access token from: {}", token_url);

        let response = http_client
            .post(format!("{}{}", token_url, query.to_query_string()))
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(ApiError::AuthError);
        }
        if !status.is_success() {
            return Err(error_from_response(response).await);
        }

        let body = response.bytes().await?;
        let token: TokenResponse = parse_body(&body)?;
        tracing::info!("Obtained OpenVPN Cloud access token");

        Ok(Self::from_parts(
            http_client,
            base_url,
            &token.access_token,
            retry_config,
        ))
    }

    fn from_parts(
        http_client: reqwest::Client,
        base_url: String,
        access_token: &str,
        retry_config: RetryConfig,
    ) -> Self {
        Self {
            inner: Arc::new(ClientInner {
                http_client,
                base_url,
                auth_header: format!("Bearer {}", access_token),
                retry_config,
            }),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// Send one request below the API prefix and return the raw response body
    ///
    /// Idempotent methods are retried on rate limiting, server errors and
    /// connection failures. POST is sent exactly once.
    pub async fn do_request(
        &self,
        method: Method,
        path: &str,
        body: Option<Vec<u8>>,
    ) -> Result<Vec<u8>, ApiError> {
        let url = format!("{}{}{}", self.inner.base_url, API_PREFIX, path);
        let config = &self.inner.retry_config;
        let max_retries = if method == Method::POST {
            0
        } else {
            config.max_retries
        };

        let mut attempt = 0;
        let mut last_error = None;

        while attempt <= max_retries {
            if attempt > 0 {
                let backoff = config.backoff_ms(attempt);
                tracing::debug!(
                    "Retrying {} {} after {}ms (attempt {})",
                    method,
                    path,
                    backoff,
                    attempt
                );
                tokio::time::sleep(tokio::time::Duration::from_millis(backoff)).await;
            }

            tracing::debug!("{} request to: {}", method, url);

            let mut request = self
                .inner
                .http_client
                .request(method.clone(), &url)
                .header(AUTHORIZATION, &self.inner.auth_header)
                .header(CONTENT_TYPE, "application/json");
            if let Some(body) = &body {
                request = request.body(body.clone());
            }

            match request.send().await {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        let bytes = response.bytes().await?;
                        tracing::debug!("API response body: {}", String::from_utf8_lossy(&bytes));
                        return Ok(bytes.to_vec());
                    }

                    if status == reqwest::StatusCode::UNAUTHORIZED {
                        return Err(ApiError::AuthError);
                    }

                    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                        last_error = Some(ApiError::RateLimited);
                    } else if status.is_server_error() {
                        last_error = Some(error_from_response(response).await);
                    } else {
                        return Err(error_from_response(response).await);
                    }
                }
                Err(e) => {
                    if e.is_timeout() {
                        last_error = Some(ApiError::Timeout(config.timeout_seconds));
                    } else if e.is_connect() {
                        last_error = Some(ApiError::ServiceUnavailable);
                    } else {
                        return Err(ApiError::RequestError(e));
                    }
                }
            }

            attempt += 1;
        }

        Err(last_error.unwrap_or(ApiError::ServiceUnavailable))
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let body = self.do_request(Method::GET, path, None).await?;
        parse_body(&body)
    }

    pub async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let payload = serde_json::to_vec(body)?;
        let body = self.do_request(Method::POST, path, Some(payload)).await?;
        parse_body(&body)
    }

    /// PUT discards the response body
    pub async fn put<B: Serialize>(&self, path: &str, body: &B) -> Result<(), ApiError> {
        let payload = serde_json::to_vec(body)?;
        self.do_request(Method::PUT, path, Some(payload)).await?;
        Ok(())
    }

    /// DELETE discards the response body
    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.do_request(Method::DELETE, path, None).await?;
        Ok(())
    }

    pub fn networks(&self) -> crate::api::networks::NetworksApi<'_> {
        crate::api::networks::NetworksApi::new(self)
    }

    pub fn hosts(&self) -> crate::api::hosts::HostsApi<'_> {
        crate::api::hosts::HostsApi::new(self)
    }

    pub fn connectors(&self) -> crate::api::connectors::ConnectorsApi<'_> {
        crate::api::connectors::ConnectorsApi::new(self)
    }

    pub fn routes(&self) -> crate::api::routes::RoutesApi<'_> {
        crate::api::routes::RoutesApi::new(self)
    }

    pub fn users(&self) -> crate::api::users::UsersApi<'_> {
        crate::api::users::UsersApi::new(self)
    }

    pub fn user_groups(&self) -> crate::api::user_groups::UserGroupsApi<'_> {
        crate::api::user_groups::UserGroupsApi::new(self)
    }

    pub fn vpn_regions(&self) -> crate::api::vpn_regions::VpnRegionsApi<'_> {
        crate::api::vpn_regions::VpnRegionsApi::new(self)
    }
}

fn normalize_base_url(base_url: &str) -> Result<String, ApiError> {
    let parsed =
        url::Url::parse(base_url).map_err(|e| ApiError::InvalidUrl(format!("{}: {}", base_url, e)))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ApiError::InvalidUrl(format!(
            "{}: scheme must be http or https",
            base_url
        )));
    }
    Ok(base_url.trim_end_matches('/').to_string())
}

fn build_http_client(retry_config: &RetryConfig) -> Result<reqwest::Client, ApiError> {
    Ok(reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(retry_config.timeout_seconds))
        .build()?)
}

fn parse_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|e| {
        let text = String::from_utf8_lossy(body);
        tracing::error!("Failed to deserialize response: {}, body: {}", e, text);
        ApiError::ParseError(e.to_string())
    })
}

async fn error_from_response(response: reqwest::Response) -> ApiError {
    let status = response.status().as_u16();
    let message = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    tracing::error!("API error response ({}): {}", status, message);
    ApiError::ApiError { status, message }
}
