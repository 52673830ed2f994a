//! Import helpers for simplifying resource import implementations

use crate::resource::{ImportResourceStateRequest, ImportResourceStateResponse};
use crate::types::{AttributePath, Diagnostic, DynamicValue};

/// Sets the import ID to a single attribute in state
///
/// Example: ID "host-123" -> state.id = "host-123"
pub fn import_state_passthrough_id(
    attr_path: AttributePath,
    request: &ImportResourceStateRequest,
) -> ImportResourceStateResponse {
    let mut state = DynamicValue::object();

    match state.set_string(&attr_path, request.id.clone()) {
        Ok(()) => ImportResourceStateResponse {
            state: Some(state),
            diagnostics: vec![],
        },
        Err(e) => ImportResourceStateResponse {
            state: None,
            diagnostics: vec![Diagnostic::error(
                format!("Failed to set import ID: {}", e),
                format!("Could not set attribute '{}' to '{}'", attr_path, request.id),
            )
            .with_attribute(attr_path)],
        },
    }
}

/// Splits a composite import ID such as "parent/child" into its parts
///
/// Every part must be non-empty and the number of parts must match `names`.
pub fn import_state_composite_id(
    names: &[&str],
    request: &ImportResourceStateRequest,
) -> ImportResourceStateResponse {
    let parts: Vec<&str> = request.id.split('/').collect();
    if parts.len() != names.len() || parts.iter().any(|p| p.is_empty()) {
        return ImportResourceStateResponse {
            state: None,
            diagnostics: vec![Diagnostic::error(
                "Unexpected import identifier",
                format!(
                    "Expected an ID of the form {}, got {:?}",
                    names.join("/"),
                    request.id
                ),
            )],
        };
    }

    let mut state = DynamicValue::object();
    for (name, part) in names.iter().zip(parts) {
        if let Err(e) = state.set_string(&AttributePath::new(name), part.to_string()) {
            return ImportResourceStateResponse {
                state: None,
                diagnostics: vec![Diagnostic::error("Failed to set import ID", e.to_string())],
            };
        }
    }

    ImportResourceStateResponse {
        state: Some(state),
        diagnostics: vec![],
    }
}
