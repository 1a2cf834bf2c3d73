use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::config::AdapterConfig;
use crate::types::RequestId;

/// A request that passed validation and can be handed to a handler
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JsonRpcRequest {
    #[serde(rename = "jsonrpc", skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RequestId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl JsonRpcRequest {
    pub fn new(id: Option<RequestId>, method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            version: Some(crate::JSONRPC_VERSION.to_string()),
            method: method.into(),
            id,
            params,
        }
    }

    /// A request without an `id` never gets a response
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }

    /// Get a parameter by name (if params are an object)
    pub fn get_param(&self, name: &str) -> Option<&Value> {
        self.params.as_ref()?.as_object()?.get(name)
    }

    /// Get a parameter by index (if params are an array)
    pub fn get_param_index(&self, index: usize) -> Option<&Value> {
        self.params.as_ref()?.as_array()?.get(index)
    }
}

/// Why an item was rejected before reaching the handler
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidReason {
    #[error("request is not an object")]
    NotAnObject,
    #[error("id must be a string, number or null")]
    InvalidId,
    #[error("unsupported jsonrpc version: {0}")]
    UnsupportedVersion(Value),
    #[error("jsonrpc version not specified")]
    MissingVersion,
    #[error("method not specified")]
    MissingMethod,
    #[error("method must be a non-empty string")]
    InvalidMethod,
}

/// Result of checking one request item
#[derive(Debug, Clone, PartialEq)]
pub enum Validation {
    Valid(JsonRpcRequest),
    Invalid {
        id: Option<RequestId>,
        reason: InvalidReason,
    },
}

/// Notification detection by key presence.
///
/// `None` means the item has no `id` member. A present id of a type an id may
/// not have is answered as `null`.
pub fn request_id(item: &Value) -> Option<RequestId> {
    let id = item.as_object()?.get("id")?;
    Some(RequestId::from_value(id).unwrap_or(RequestId::Null))
}

/// Check the minimal request shape.
pub fn validate(item: &Value, config: &AdapterConfig) -> Validation {
    let Some(object) = item.as_object() else {
        return Validation::Invalid {
            id: None,
            reason: InvalidReason::NotAnObject,
        };
    };

    let id = request_id(item);
    let invalid = |reason| Validation::Invalid {
        id: id.clone(),
        reason,
    };

    if let Some(raw) = object.get("id") {
        if RequestId::from_value(raw).is_none() {
            return invalid(InvalidReason::InvalidId);
        }
    }

    let version = match object.get("jsonrpc") {
        Some(Value::String(v)) if v == crate::JSONRPC_VERSION => Some(v.clone()),
        Some(other) => return invalid(InvalidReason::UnsupportedVersion(other.clone())),
        None if config.require_version => return invalid(InvalidReason::MissingVersion),
        None => None,
    };

    let method = match object.get("method") {
        None => return invalid(InvalidReason::MissingMethod),
        Some(Value::String(m)) if !m.is_empty() => m.clone(),
        Some(_) => return invalid(InvalidReason::InvalidMethod),
    };

    Validation::Valid(JsonRpcRequest {
        version,
        method,
        id,
        params: object.get("params").cloned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn check(item: Value) -> Validation {
        validate(&item, &AdapterConfig::default())
    }

    #[test]
    fn test_request_id_key_presence() {
        assert_eq!(request_id(&json!({"method": "a"})), None);
        assert_eq!(request_id(&json!({"method": "a", "id": null})), Some(RequestId::Null));
        assert_eq!(request_id(&json!({"method": "a", "id": ""})), Some(RequestId::from("")));
        assert_eq!(request_id(&json!({"method": "a", "id": 3})), Some(RequestId::from(3)));
        assert_eq!(request_id(&json!({"method": "a", "id": [1]})), Some(RequestId::Null));
        assert_eq!(request_id(&json!("not an object")), None);
    }

    #[test]
    fn test_valid_request() {
        let validation =
            check(json!({"jsonrpc": "2.0", "method": "add", "id": 1, "params": [1, 2]}));
        let Validation::Valid(request) = validation else {
            panic!("expected a valid request, got {:?}", validation);
        };
        assert_eq!(request.method, "add");
        assert_eq!(request.id, Some(RequestId::from(1)));
        assert_eq!(request.get_param_index(1), Some(&json!(2)));
        assert!(!request.is_notification());
    }

    #[test]
    fn test_version_is_optional_by_default() {
        let validation = check(json!({"method": "success", "id": "success"}));
        assert!(matches!(validation, Validation::Valid(ref r) if r.version.is_none()));
    }

    #[test]
    fn test_version_required_when_configured() {
        let config = AdapterConfig::default().require_version(true);
        let validation = validate(&json!({"method": "error", "id": "error"}), &config);
        assert_eq!(
            validation,
            Validation::Invalid {
                id: Some(RequestId::from("error")),
                reason: InvalidReason::MissingVersion,
            }
        );
    }

    #[test]
    fn test_wrong_version_rejected() {
        let validation = check(json!({"jsonrpc": "1.0", "method": "a", "id": 1}));
        assert!(matches!(
            validation,
            Validation::Invalid { reason: InvalidReason::UnsupportedVersion(_), .. }
        ));

        let validation = check(json!({"jsonrpc": 2.0, "method": "a", "id": 1}));
        assert!(matches!(
            validation,
            Validation::Invalid { reason: InvalidReason::UnsupportedVersion(_), .. }
        ));
    }

    #[test]
    fn test_missing_method_keeps_id() {
        let validation = check(json!({"jsonrpc": "2.0", "id": "x"}));
        assert_eq!(
            validation,
            Validation::Invalid {
                id: Some(RequestId::from("x")),
                reason: InvalidReason::MissingMethod,
            }
        );
    }

    #[test]
    fn test_bad_method_types() {
        for method in [json!(""), json!(42), json!(null)] {
            let validation = check(json!({"method": method, "id": 1}));
            assert!(matches!(
                validation,
                Validation::Invalid { reason: InvalidReason::InvalidMethod, .. }
            ));
        }
    }

    #[test]
    fn test_bad_id_type() {
        let validation = check(json!({"method": "a", "id": {"nested": true}}));
        assert_eq!(
            validation,
            Validation::Invalid {
                id: Some(RequestId::Null),
                reason: InvalidReason::InvalidId,
            }
        );
    }

    #[test]
    fn test_non_object_item() {
        assert_eq!(
            check(json!(5)),
            Validation::Invalid {
                id: None,
                reason: InvalidReason::NotAnObject,
            }
        );
    }

    #[test]
    fn test_named_params() {
        let validation = check(json!({"method": "a", "params": {"name": "x"}}));
        let Validation::Valid(request) = validation else {
            panic!("expected a valid request");
        };
        assert!(request.is_notification());
        assert_eq!(request.get_param("name"), Some(&json!("x")));
        assert_eq!(request.get_param_index(0), None);
    }
}
