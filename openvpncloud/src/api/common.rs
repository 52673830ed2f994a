//! Common types and utilities for the OpenVPN Cloud API

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Value outside of an API enumeration
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {kind} {value:?}, expected one of: {expected}")]
pub struct ParseEnumError {
    kind: &'static str,
    value: String,
    expected: String,
}

macro_rules! api_enum {
    ($(#[$meta:meta])* $name:ident, $kind:literal { $($variant:ident => $wire:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $wire)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $wire,)+
                }
            }

            /// Wire names, for schema validators
            pub fn names() -> Vec<&'static str> {
                Self::ALL.iter().map(|v| v.as_str()).collect()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ParseEnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($wire => Ok($name::$variant),)+
                    other => Err(ParseEnumError {
                        kind: $kind,
                        value: other.to_string(),
                        expected: Self::names().join(", "),
                    }),
                }
            }
        }
    };
}

api_enum!(
    /// Kind of object a connector or route is attached to
    NetworkItemType, "network item type" {
        Host => "HOST",
        Network => "NETWORK",
    }
);

api_enum!(
    /// Internet access mode of a network, host or user group
    InternetAccess, "internet access" {
        Blocked => "BLOCKED",
        GlobalInternet => "GLOBAL_INTERNET",
        Local => "LOCAL",
    }
);

api_enum!(
    RouteType, "route type" {
        IpV4 => "IP_V4",
        IpV6 => "IP_V6",
        Domain => "DOMAIN",
    }
);

#[derive(Debug, Clone, Default)]
pub struct ApiQueryParams {
    params: Vec<(String, String)>,
}

impl ApiQueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<K: Into<String>, V: ToString>(mut self, key: K, value: V) -> Self {
        self.params.push((key.into(), value.to_string()));
        self
    }

    pub fn to_query_string(&self) -> String {
        if self.params.is_empty() {
            String::new()
        } else {
            format!(
                "?{}",
                self.params
                    .iter()
                    .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
                    .collect::<Vec<_>>()
                    .join("&")
            )
        }
    }
}

/// Query scoping a child object to its parent network or host
pub fn network_item_scope(network_item_id: &str, network_item_type: NetworkItemType) -> ApiQueryParams {
    ApiQueryParams::new()
        .add("networkItemId", network_item_id)
        .add("networkItemType", network_item_type)
}
