//! Test helpers for the OpenVPN Cloud API

use super::{Client, RetryConfig};

pub const TEST_TOKEN: &str = "test-token";

/// Client against a mock server, without retries so failures surface immediately
#[allow(clippy::disallowed_methods)]
pub fn create_test_client(url: &str) -> Client {
    Client::with_config(
        url,
        TEST_TOKEN,
        RetryConfig {
            max_retries: 0,
            ..Default::default()
        },
    )
    .unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_config() {
        let config = RetryConfig::default();
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.initial_backoff_ms, 100);
        assert_eq!(config.max_backoff_ms, 10000);
        assert_eq!(config.timeout_seconds, 30);
    }

    #[test]
    fn test_client_targets_given_url() {
        let client = create_test_client("http://127.0.0.1:1234/");
        assert_eq!(client.base_url(), "http://127.0.0.1:1234");
    }
}
