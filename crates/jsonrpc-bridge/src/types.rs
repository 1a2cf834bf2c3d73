use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

use crate::error::JsonRpcErrorObject;

/// What one request item produced: the handler's value or its error
pub type Outcome = Result<Value, JsonRpcErrorObject>;

/// Identifier echoed back in a response envelope.
///
/// A request that carries an `id` member always gets a response, even when the
/// id is `null` or an empty string; only the absence of the member makes the
/// request a notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestId {
    String(String),
    Number(Number),
    Null,
}

impl RequestId {
    /// Read an id from a JSON value, rejecting types an id may not carry
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(RequestId::String(s.clone())),
            Value::Number(n) => Some(RequestId::Number(n.clone())),
            Value::Null => Some(RequestId::Null),
            Value::Bool(_) | Value::Array(_) | Value::Object(_) => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            RequestId::Number(n) => n.as_i64(),
            _ => None,
        }
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestId::String(s) => write!(f, "{}", s),
            RequestId::Number(n) => write!(f, "{}", n),
            RequestId::Null => write!(f, "null"),
        }
    }
}

impl From<i64> for RequestId {
    fn from(n: i64) -> Self {
        RequestId::Number(n.into())
    }
}

impl From<&str> for RequestId {
    fn from(s: &str) -> Self {
        RequestId::String(s.to_string())
    }
}

impl From<String> for RequestId {
    fn from(s: String) -> Self {
        RequestId::String(s)
    }
}

/// JSON-RPC version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonRpcVersion {
    #[default]
    V2_0,
}

impl JsonRpcVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            JsonRpcVersion::V2_0 => crate::JSONRPC_VERSION,
        }
    }
}

impl fmt::Display for JsonRpcVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for JsonRpcVersion {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for JsonRpcVersion {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        match s.as_str() {
            crate::JSONRPC_VERSION => Ok(JsonRpcVersion::V2_0),
            _ => Err(serde::de::Error::custom(format!(
                "Invalid JSON-RPC version: {}",
                s
            ))),
        }
    }
}

/// A request body or a set of per-item results, single or batched.
///
/// The batch flag travels with the value so that whatever goes in as a
/// single object comes back out as a single object.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RpcBody<T> {
    Single(T),
    Batch(Vec<T>),
}

impl<T> RpcBody<T> {
    pub fn is_batch(&self) -> bool {
        matches!(self, RpcBody::Batch(_))
    }

    pub fn len(&self) -> usize {
        match self {
            RpcBody::Single(_) => 1,
            RpcBody::Batch(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// View the items uniformly; a single value is a one-element slice
    pub fn as_slice(&self) -> &[T] {
        match self {
            RpcBody::Single(item) => std::slice::from_ref(item),
            RpcBody::Batch(items) => items,
        }
    }

    pub fn into_vec(self) -> Vec<T> {
        match self {
            RpcBody::Single(item) => vec![item],
            RpcBody::Batch(items) => items,
        }
    }

    pub fn map<U, F>(self, mut f: F) -> RpcBody<U>
    where
        F: FnMut(T) -> U,
    {
        match self {
            RpcBody::Single(item) => RpcBody::Single(f(item)),
            RpcBody::Batch(items) => RpcBody::Batch(items.into_iter().map(f).collect()),
        }
    }
}

impl From<Value> for RpcBody<Value> {
    fn from(value: Value) -> Self {
        match value {
            Value::Array(items) => RpcBody::Batch(items),
            other => RpcBody::Single(other),
        }
    }
}
