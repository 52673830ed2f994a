use openvpncloud::api::{Client, RetryConfig};
use tfplug::{AttributePath, Dynamic, DynamicValue, Registry};

/// Registry whose client talks to `url` without retries
pub fn registry(url: &str) -> Registry {
    let client = Client::with_config(
        url,
        "test-token",
        RetryConfig {
            max_retries: 0,
            ..Default::default()
        },
    )
    .unwrap();
    openvpncloud::registry(client)
}

pub fn value(pairs: Vec<(&str, Dynamic)>) -> DynamicValue {
    DynamicValue::new(Dynamic::object(pairs))
}

pub fn block(pairs: Vec<(&str, Dynamic)>) -> Dynamic {
    Dynamic::List(vec![Dynamic::object(pairs)])
}

pub fn string_at(state: &DynamicValue, path: &AttributePath) -> String {
    state
        .get(path)
        .and_then(Dynamic::as_str)
        .unwrap_or_default()
        .to_string()
}

pub fn nested(block: &str, attribute: &str) -> AttributePath {
    AttributePath::new(block).index(0).attribute(attribute)
}
