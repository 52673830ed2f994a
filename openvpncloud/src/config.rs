//! Provider configuration
//!
//! Every setting comes from the provider block first and falls back to its
//! environment variable.

use tfplug::validator::StringLengthValidator;
use tfplug::{
    AttributeBuilder, AttributePath, AttributeType, Diagnostic, DynamicValue, Schema,
    SchemaBuilder,
};

pub const BASE_URL_ENV: &str = "OPENVPN_CLOUD_BASE_URL";
pub const CLIENT_ID_ENV: &str = "OPENVPN_CLOUD_CLIENT_ID";
pub const CLIENT_SECRET_ENV: &str = "OPENVPN_CLOUD_CLIENT_SECRET";

#[derive(Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    pub base_url: String,
    pub client_id: String,
    pub client_secret: String,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("base_url", &self.base_url)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

impl ProviderConfig {
    pub fn schema() -> Schema {
        SchemaBuilder::new()
            .version(0)
            .description("OpenVPN Cloud provider")
            .attribute(
                AttributeBuilder::new("base_url", AttributeType::String)
                    .description(&format!(
                        "Base URL such as https://myorg.api.openvpn.com (env: {})",
                        BASE_URL_ENV
                    ))
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("client_id", AttributeType::String)
                    .description(&format!("API client ID (env: {})", CLIENT_ID_ENV))
                    .optional()
                    .validator(StringLengthValidator::between(1, 256))
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("client_secret", AttributeType::String)
                    .description(&format!("API client secret (env: {})", CLIENT_SECRET_ENV))
                    .optional()
                    .sensitive()
                    .build(),
            )
            .build()
    }

    /// Resolves all settings, reporting every missing one
    pub fn resolve(config: &DynamicValue) -> Result<Self, Vec<Diagnostic>> {
        let mut diagnostics = vec![];
        let mut setting = |name: &str, env: &str| {
            let value = config
                .get_optional_string(&AttributePath::new(name))
                .filter(|v| !v.is_empty())
                .or_else(|| std::env::var(env).ok().filter(|v| !v.is_empty()));
            if value.is_none() {
                diagnostics.push(
                    Diagnostic::error(
                        format!("{} is required", name),
                        format!(
                            "Set {} in the provider block or the {} environment variable",
                            name, env
                        ),
                    )
                    .with_attribute(AttributePath::new(name)),
                );
            }
            value.unwrap_or_default()
        };

        let base_url = setting("base_url", BASE_URL_ENV);
        let client_id = setting("client_id", CLIENT_ID_ENV);
        let client_secret = setting("client_secret", CLIENT_SECRET_ENV);

        if !diagnostics.is_empty() {
            return Err(diagnostics);
        }
        if let Err(e) = url::Url::parse(&base_url) {
            return Err(vec![Diagnostic::error(
                "Invalid base_url",
                format!("{:?} is not a valid URL: {}", base_url, e),
            )
            .with_attribute(AttributePath::new("base_url"))]);
        }

        Ok(Self {
            base_url,
            client_id,
            client_secret,
        })
    }
}
