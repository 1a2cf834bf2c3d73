use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use tracing::warn;

use crate::types::{JsonRpcVersion, RequestId};

/// JSON-RPC error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonRpcErrorCode {
    ParseError,
    InvalidRequest,
    MethodNotFound,
    InvalidParams,
    InternalError,
    ServerError(i64), // -32099 to -32000
}

impl JsonRpcErrorCode {
    pub fn code(&self) -> i64 {
        match self {
            JsonRpcErrorCode::ParseError => crate::error_codes::PARSE_ERROR,
            JsonRpcErrorCode::InvalidRequest => crate::error_codes::INVALID_REQUEST,
            JsonRpcErrorCode::MethodNotFound => crate::error_codes::METHOD_NOT_FOUND,
            JsonRpcErrorCode::InvalidParams => crate::error_codes::INVALID_PARAMS,
            JsonRpcErrorCode::InternalError => crate::error_codes::INTERNAL_ERROR,
            JsonRpcErrorCode::ServerError(code) => *code,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            JsonRpcErrorCode::ParseError => "Parse error",
            JsonRpcErrorCode::InvalidRequest => "Invalid request",
            JsonRpcErrorCode::MethodNotFound => "Method not found",
            JsonRpcErrorCode::InvalidParams => "Invalid params",
            JsonRpcErrorCode::InternalError => "Internal error",
            JsonRpcErrorCode::ServerError(_) => "Server error",
        }
    }
}

impl fmt::Display for JsonRpcErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code(), self.message())
    }
}

/// JSON-RPC error object
///
/// Besides `code` and `message`, any number of extra members (`data` being the
/// usual one) can ride along; they are flattened into the object on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcErrorObject {
    pub code: i64,
    pub message: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl JsonRpcErrorObject {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            extra: Map::new(),
        }
    }

    /// Error object with the canonical message for a standard code
    pub fn standard(code: JsonRpcErrorCode) -> Self {
        Self::new(code.code(), code.message())
    }

    /// Attach an extra member, replacing any previous value under that key.
    /// `code` and `message` are owned by the object and are ignored here.
    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        insert_extra(&mut self.extra, key.into(), value);
        self
    }

    pub fn parse_error() -> Self {
        Self::standard(JsonRpcErrorCode::ParseError)
    }

    pub fn invalid_request() -> Self {
        Self::standard(JsonRpcErrorCode::InvalidRequest)
    }

    pub fn internal_error() -> Self {
        Self::standard(JsonRpcErrorCode::InternalError)
    }
}

impl fmt::Display for JsonRpcErrorObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for JsonRpcErrorObject {}

/// Members of an error object that extra fields may not shadow
const RESERVED_FIELDS: &[&str] = &["code", "message"];

fn is_reserved(key: &str) -> bool {
    RESERVED_FIELDS.contains(&key)
}

fn insert_extra(extra: &mut Map<String, Value>, key: String, value: Value) {
    if is_reserved(&key) {
        warn!("Ignoring extra error field '{}': reserved member", key);
        return;
    }
    extra.insert(key, value);
}

/// Messages that are rewritten onto a standard code, compared lower-cased.
const CLASSIFIED_MESSAGES: &[(&str, JsonRpcErrorCode)] = &[
    ("not found", JsonRpcErrorCode::MethodNotFound),
    ("bad request", JsonRpcErrorCode::InvalidParams),
    ("internal server error", JsonRpcErrorCode::InternalError),
];

/// Map a handler error onto a standard JSON-RPC code when its message is one
/// of the recognised HTTP-style phrases.
///
/// The match is exact apart from letter case: `"Bad Request"` is rewritten to
/// `-32602 Invalid params`, `"Bad Request: missing field"` is left alone.
/// Extra members are kept either way, except ones that would shadow `code` or
/// `message`. Unmatched errors otherwise pass through untouched.
pub fn classify(mut error: JsonRpcErrorObject) -> JsonRpcErrorObject {
    error.extra.retain(|key, _| !is_reserved(key));
    let lowered = error.message.to_lowercase();
    if let Some((_, code)) = CLASSIFIED_MESSAGES
        .iter()
        .find(|(message, _)| *message == lowered)
    {
        error.code = code.code();
        error.message = code.message().to_string();
    }
    error
}

/// Conversion from a handler's error type into a JSON-RPC error object
pub trait ToJsonRpcError: Send + Sync + 'static {
    fn to_error_object(&self) -> JsonRpcErrorObject;
}

impl ToJsonRpcError for JsonRpcErrorObject {
    fn to_error_object(&self) -> JsonRpcErrorObject {
        self.clone()
    }
}

/// General purpose handler error: a message, an optional numeric code and any
/// extra members that should reach the client.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MethodError {
    pub message: String,
    pub code: Option<i64>,
    pub extra: Map<String, Value>,
}

impl MethodError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Default::default()
        }
    }

    pub fn with_code(mut self, code: i64) -> Self {
        self.code = Some(code);
        self
    }

    /// Attach an extra member; `code` and `message` are ignored
    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        insert_extra(&mut self.extra, key.into(), value);
        self
    }

    /// Lookup failure, classified as `-32601 Method not found`
    pub fn not_found() -> Self {
        Self::new("Not Found")
    }

    /// Parameter failure, classified as `-32602 Invalid params`
    pub fn bad_request() -> Self {
        Self::new("Bad Request")
    }

    /// Unexpected failure, classified as `-32603 Internal error`
    pub fn internal_server_error() -> Self {
        Self::new("Internal Server Error")
    }
}

impl fmt::Display for MethodError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "{} ({})", self.message, code),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for MethodError {}

impl ToJsonRpcError for MethodError {
    fn to_error_object(&self) -> JsonRpcErrorObject {
        JsonRpcErrorObject {
            code: self.code.unwrap_or(crate::error_codes::INTERNAL_ERROR),
            message: self.message.clone(),
            extra: self
                .extra
                .iter()
                .filter(|(key, _)| !is_reserved(key))
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
        }
    }
}

/// JSON-RPC error response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcError {
    #[serde(rename = "jsonrpc")]
    pub version: JsonRpcVersion,
    pub id: RequestId,
    pub error: JsonRpcErrorObject,
}

impl JsonRpcError {
    pub fn new(id: RequestId, error: JsonRpcErrorObject) -> Self {
        Self {
            version: JsonRpcVersion::V2_0,
            id,
            error,
        }
    }

    /// Response to a body that could not be decoded at all
    pub fn parse_error() -> Self {
        Self::new(RequestId::Null, JsonRpcErrorObject::parse_error())
    }
}

impl fmt::Display for JsonRpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "JSON-RPC Error {}: {}",
            self.error.code, self.error.message
        )
    }
}

impl std::error::Error for JsonRpcError {}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_error_codes() {
        assert_eq!(JsonRpcErrorCode::ParseError.code(), -32700);
        assert_eq!(JsonRpcErrorCode::InvalidRequest.code(), -32600);
        assert_eq!(JsonRpcErrorCode::MethodNotFound.code(), -32601);
        assert_eq!(JsonRpcErrorCode::ServerError(-32001).code(), -32001);
        assert_eq!(JsonRpcErrorCode::InvalidRequest.message(), "Invalid request");
    }

    #[test]
    fn test_classify_table() {
        let cases = [
            ("not found", -32601, "Method not found"),
            ("Not Found", -32601, "Method not found"),
            ("Bad Request", -32602, "Invalid params"),
            ("BAD REQUEST", -32602, "Invalid params"),
            ("Internal Server Error", -32603, "Internal error"),
        ];
        for (message, code, expected) in cases {
            let classified = classify(JsonRpcErrorObject::new(400, message));
            assert_eq!(classified.code, code, "message {:?}", message);
            assert_eq!(classified.message, expected);
        }
    }

    #[test]
    fn test_classify_is_exact() {
        let original = JsonRpcErrorObject::new(400, "Bad Request: missing field");
        assert_eq!(classify(original.clone()), original);

        let original = JsonRpcErrorObject::new(500, "TEST_EXCEPTION");
        assert_eq!(classify(original.clone()), original);

        let original = JsonRpcErrorObject::new(404, " not found");
        assert_eq!(classify(original.clone()), original);
    }

    #[test]
    fn test_classify_keeps_extra_fields() {
        let error =
            JsonRpcErrorObject::new(400, "bad request").with_field("data", json!({"field": "a"}));
        let classified = classify(error);
        assert_eq!(classified.code, -32602);
        assert_eq!(classified.extra.get("data"), Some(&json!({"field": "a"})));
    }

    #[test]
    fn test_error_object_flattens_extra() {
        let error = JsonRpcErrorObject::new(500, "TEST_EXCEPTION")
            .with_field("data", json!([1, 2]))
            .with_field("retryable", json!(false));
        let value = serde_json::to_value(&error).unwrap();
        assert_eq!(
            value,
            json!({"code": 500, "message": "TEST_EXCEPTION", "data": [1, 2], "retryable": false})
        );

        let parsed: JsonRpcErrorObject = serde_json::from_value(value).unwrap();
        assert_eq!(parsed, error);
    }

    #[test]
    fn test_method_error_conversion() {
        let error = MethodError::new("TEST_EXCEPTION").with_code(500);
        let object = error.to_error_object();
        assert_eq!(object.code, 500);
        assert_eq!(object.message, "TEST_EXCEPTION");
        assert_eq!(error.to_string(), "TEST_EXCEPTION (500)");

        let uncoded = MethodError::new("boom").to_error_object();
        assert_eq!(uncoded.code, -32603);
        assert_eq!(uncoded.message, "boom");
    }

    #[test]
    fn test_method_error_presets_classify() {
        assert_eq!(classify(MethodError::not_found().to_error_object()).code, -32601);
        assert_eq!(classify(MethodError::bad_request().to_error_object()).code, -32602);
        assert_eq!(
            classify(MethodError::internal_server_error().to_error_object()).code,
            -32603
        );
    }

    #[test]
    fn test_reserved_fields_cannot_shadow_code_or_message() {
        let object = MethodError::new("Bad Request")
            .with_code(400)
            .with_field("code", json!("E_FIELD"))
            .with_field("message", json!("shadow"))
            .with_field("data", json!(1))
            .to_error_object();
        assert_eq!(object.code, 400);
        assert_eq!(object.extra.len(), 1);

        let classified = classify(object);
        assert_eq!(
            serde_json::to_string(&classified).unwrap(),
            r#"{"code":-32602,"message":"Invalid params","data":1}"#
        );
    }

    #[test]
    fn test_reserved_fields_set_directly_are_dropped_on_classify() {
        let mut error = JsonRpcErrorObject::new(500, "TEST_EXCEPTION");
        error.extra.insert("code".to_string(), json!("E_FIELD"));
        let error = error.with_field("code", json!("ignored"));
        assert_eq!(error.extra.get("code"), Some(&json!("E_FIELD")));

        let classified = classify(error);
        assert!(classified.extra.is_empty());
        assert_eq!(
            serde_json::to_value(&classified).unwrap(),
            json!({"code": 500, "message": "TEST_EXCEPTION"})
        );
    }

    #[test]
    fn test_error_serialization() {
        let error = JsonRpcError::new(RequestId::from(1), JsonRpcErrorObject::invalid_request());
        let json = serde_json::to_value(&error).unwrap();
        assert_eq!(
            json,
            json!({
                "jsonrpc": "2.0",
                "id": 1,
                "error": {"code": -32600, "message": "Invalid request"}
            })
        );
        assert_eq!(error.to_string(), "JSON-RPC Error -32600: Invalid request");
    }
}
