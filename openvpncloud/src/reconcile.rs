//! Typed nested blocks and change planning
//!
//! Networks and hosts each manage one connector block, networks also one
//! default route block. The blocks arrive as single-element lists of maps;
//! here they become `ConnectorBlock`/`RouteBlock` records, and the update
//! path is reduced to a pure `(old, new) -> actions` function that the
//! resources then execute in order.

use crate::api::common::ParseEnumError;
use crate::api::{Connector, Route, RouteType};
use std::collections::HashMap;
use tfplug::{AttributePath, Dynamic, DynamicValue};

pub mod fields {
    pub const ID: &str = "id";
    pub const NAME: &str = "name";
    pub const VPN_REGION_ID: &str = "vpn_region_id";
    pub const NETWORK_ITEM_ID: &str = "network_item_id";
    pub const NETWORK_ITEM_TYPE: &str = "network_item_type";
    pub const IP_V4_ADDRESS: &str = "ip_v4_address";
    pub const IP_V6_ADDRESS: &str = "ip_v6_address";
    pub const TYPE: &str = "type";
    pub const VALUE: &str = "value";
}

const CONNECTOR_FIELDS: [&str; 7] = [
    fields::ID,
    fields::NAME,
    fields::VPN_REGION_ID,
    fields::NETWORK_ITEM_ID,
    fields::NETWORK_ITEM_TYPE,
    fields::IP_V4_ADDRESS,
    fields::IP_V6_ADDRESS,
];

/// First element of a nested block list, if it is an object
pub fn first_block<'a>(
    value: &'a DynamicValue,
    block_name: &str,
) -> Option<&'a HashMap<String, Dynamic>> {
    value
        .get(&AttributePath::new(block_name).index(0))
        .and_then(Dynamic::as_map)
}

/// Known string field or the empty string
fn string_field(fields: &HashMap<String, Dynamic>, key: &str) -> String {
    fields
        .get(key)
        .and_then(Dynamic::as_str)
        .unwrap_or_default()
        .to_string()
}

fn optional(value: &str) -> Dynamic {
    if value.is_empty() {
        Dynamic::Null
    } else {
        Dynamic::from(value)
    }
}

/// The managed connector of a network or host
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectorBlock {
    pub id: String,
    pub name: String,
    pub vpn_region_id: String,
    pub network_item_id: String,
    pub network_item_type: String,
    pub ip_v4_address: String,
    pub ip_v6_address: String,
}

impl ConnectorBlock {
    pub fn from_map(block: &HashMap<String, Dynamic>) -> Self {
        Self {
            id: string_field(block, fields::ID),
            name: string_field(block, fields::NAME),
            vpn_region_id: string_field(block, fields::VPN_REGION_ID),
            network_item_id: string_field(block, fields::NETWORK_ITEM_ID),
            network_item_type: string_field(block, fields::NETWORK_ITEM_TYPE),
            ip_v4_address: string_field(block, fields::IP_V4_ADDRESS),
            ip_v6_address: string_field(block, fields::IP_V6_ADDRESS),
        }
    }

    /// Block named `block_name` in a configuration or state value
    pub fn from_value(value: &DynamicValue, block_name: &str) -> Option<Self> {
        first_block(value, block_name).map(Self::from_map)
    }

    pub fn from_connector(connector: &Connector) -> Self {
        Self {
            id: connector.id.clone(),
            name: connector.name.clone(),
            vpn_region_id: connector.vpn_region_id.clone(),
            network_item_id: connector.network_item_id.clone(),
            network_item_type: connector
                .network_item_type
                .map(|t| t.to_string())
                .unwrap_or_default(),
            ip_v4_address: connector.ip_v4_address.clone().unwrap_or_default(),
            ip_v6_address: connector.ip_v6_address.clone().unwrap_or_default(),
        }
    }

    pub fn to_dynamic(&self) -> Dynamic {
        Dynamic::object([
            (fields::ID, optional(&self.id)),
            (fields::NAME, Dynamic::from(self.name.as_str())),
            (fields::VPN_REGION_ID, Dynamic::from(self.vpn_region_id.as_str())),
            (fields::NETWORK_ITEM_ID, optional(&self.network_item_id)),
            (fields::NETWORK_ITEM_TYPE, optional(&self.network_item_type)),
            (fields::IP_V4_ADDRESS, optional(&self.ip_v4_address)),
            (fields::IP_V6_ADDRESS, optional(&self.ip_v6_address)),
        ])
    }

    /// Block with every field unset, written when the remote connector is missing
    pub fn unset() -> Dynamic {
        Dynamic::object(CONNECTOR_FIELDS.map(|f| (f, Dynamic::Null)))
    }

    /// Create request body; the service assigns everything else
    pub fn create_request(&self) -> Connector {
        Connector::new(self.name.clone(), self.vpn_region_id.clone())
    }

    fn identity_differs(&self, other: &ConnectorBlock) -> bool {
        self.name != other.name || self.vpn_region_id != other.vpn_region_id
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectorAction {
    /// Create the connector described by the new block
    Create(ConnectorBlock),
    /// Delete the previous connector
    Delete { id: String },
}

/// Connectors are never modified in place: a changed name or region
/// creates the replacement first, then deletes the old connector.
pub fn plan_connector_change(
    old: Option<&ConnectorBlock>,
    new: Option<&ConnectorBlock>,
) -> Vec<ConnectorAction> {
    match (old, new) {
        (None, Some(new)) => vec![ConnectorAction::Create(new.clone())],
        (Some(old), Some(new)) if old.identity_differs(new) => {
            let mut actions = vec![ConnectorAction::Create(new.clone())];
            if !old.id.is_empty() {
                actions.push(ConnectorAction::Delete { id: old.id.clone() });
            }
            actions
        }
        _ => vec![],
    }
}

/// The managed default route of a network
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteBlock {
    pub id: String,
    pub route_type: RouteType,
    pub value: String,
}

impl RouteBlock {
    /// A missing `type` means IP_V4
    pub fn from_map(block: &HashMap<String, Dynamic>) -> Result<Self, ParseEnumError> {
        let route_type = match block.get(fields::TYPE).and_then(Dynamic::as_str) {
            Some(s) => s.parse()?,
            None => RouteType::IpV4,
        };
        Ok(Self {
            id: string_field(block, fields::ID),
            route_type,
            value: string_field(block, fields::VALUE),
        })
    }

    pub fn from_value(
        value: &DynamicValue,
        block_name: &str,
    ) -> Result<Option<Self>, ParseEnumError> {
        first_block(value, block_name)
            .map(Self::from_map)
            .transpose()
    }

    /// Projects the remote route onto the block, using the displayed value
    pub fn from_route(route: &Route) -> Self {
        Self {
            id: route.id.clone(),
            route_type: route.route_type,
            value: route.display_value().to_string(),
        }
    }

    pub fn to_dynamic(&self) -> Dynamic {
        Dynamic::object([
            (fields::ID, optional(&self.id)),
            (fields::TYPE, Dynamic::from(self.route_type.as_str())),
            (fields::VALUE, Dynamic::from(self.value.as_str())),
        ])
    }

    /// Request body for create (empty id) or in-place update
    pub fn to_request(&self) -> Route {
        let mut route = Route::new(self.route_type, self.value.clone());
        route.id = self.id.clone();
        route
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteAction {
    Create(RouteBlock),
    /// Carries the existing route id with the new type and value
    Update(RouteBlock),
}

/// Routes are updated in place under their existing id
pub fn plan_route_change(old: Option<&RouteBlock>, new: Option<&RouteBlock>) -> Vec<RouteAction> {
    match (old, new) {
        (None, Some(new)) => vec![RouteAction::Create(RouteBlock {
            id: String::new(),
            ..new.clone()
        })],
        (Some(old), Some(new)) if old.route_type != new.route_type || old.value != new.value => {
            if old.id.is_empty() {
                vec![RouteAction::Create(RouteBlock {
                    id: String::new(),
                    ..new.clone()
                })]
            } else {
                vec![RouteAction::Update(RouteBlock {
                    id: old.id.clone(),
                    ..new.clone()
                })]
            }
        }
        _ => vec![],
    }
}
