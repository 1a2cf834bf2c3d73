//! # JSON-RPC Bridge over HTTP
//!
//! The step of an HTTP pipeline that turns a decoded request body into the
//! JSON-RPC reply and the status code to send with it.
//!
//! - `200 OK` with the envelope (or envelope array) as body
//! - `204 No Content` with an empty body when every request was a notification
//! - nothing at all when an earlier step already produced a body

pub mod config;
pub mod middleware;
pub mod reply;

pub use config::MiddlewareConfig;
pub use middleware::JsonRpcMiddleware;
pub use reply::{HttpReply, ReplyBody};

/// Result type for the HTTP bridge
pub type Result<T> = std::result::Result<T, BridgeError>;

/// Failures that escape the middleware.
///
/// Handler and validation failures never show up here; they are answered as
/// JSON-RPC error envelopes.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("Response conversion error: {0}")]
    Conversion(#[from] jsonrpc_bridge::ConversionError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
