//! # JSON-RPC 2.0 Bridge
//!
//! Adapts a request body taken off an HTTP pipeline to a method handler and
//! shapes the handler outcomes into JSON-RPC 2.0 responses.
//!
//! ## Features
//! - Single and batch requests, with batch items dispatched concurrently
//! - Notification suppression by `id` key presence (`"id": null` is answered)
//! - Per-item validation producing `-32600 Invalid request`
//! - Classification of HTTP-style error messages onto standard error codes
//! - Call lifecycle hook for external observers
//!
//! ```rust
//! use jsonrpc_bridge::{RpcBody, JsonRpcErrorObject, convert, to_json};
//! use serde_json::json;
//!
//! let requests = RpcBody::from(json!({"jsonrpc": "2.0", "method": "lookup", "id": 7}));
//! let outcomes = RpcBody::Single(Err(JsonRpcErrorObject::new(404, "Not Found")));
//!
//! let response = convert(&requests, &outcomes).unwrap();
//! assert_eq!(
//!     to_json(&response).unwrap(),
//!     json!({"jsonrpc": "2.0", "id": 7, "error": {"code": -32601, "message": "Method not found"}})
//! );
//! ```

pub mod config;
pub mod convert;
pub mod dispatch;
pub mod error;
pub mod events;
pub mod prelude;
pub mod request;
pub mod response;
pub mod types;

// Re-export main types
pub use config::AdapterConfig;
pub use convert::{ConversionError, ConvertedResponse, convert, to_json};
pub use dispatch::{DispatchAdapter, FunctionHandler, JsonRpcHandler};
pub use error::{
    JsonRpcError, JsonRpcErrorCode, JsonRpcErrorObject, MethodError, ToJsonRpcError, classify,
};
pub use events::{CallEvent, CallObserver, TracingObserver};
pub use request::{InvalidReason, JsonRpcRequest, Validation, request_id, validate};
pub use response::{JsonRpcMessage, JsonRpcResponse};
pub use types::{JsonRpcVersion, Outcome, RequestId, RpcBody};

/// JSON-RPC 2.0 version constant
pub const JSONRPC_VERSION: &str = "2.0";

/// Standard JSON-RPC 2.0 error codes
pub mod error_codes {
    pub const PARSE_ERROR: i64 = -32700;
    pub const INVALID_REQUEST: i64 = -32600;
    pub const METHOD_NOT_FOUND: i64 = -32601;
    pub const INVALID_PARAMS: i64 = -32602;
    pub const INTERNAL_ERROR: i64 = -32603;
}
