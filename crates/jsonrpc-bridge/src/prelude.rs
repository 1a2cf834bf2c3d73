//! # JSON-RPC Bridge Prelude
//!
//! ```rust
//! use jsonrpc_bridge::prelude::*;
//! ```

pub use crate::config::AdapterConfig;
pub use crate::convert::{ConversionError, ConvertedResponse, convert, to_json};
pub use crate::dispatch::{DispatchAdapter, FunctionHandler, JsonRpcHandler};
pub use crate::error::{JsonRpcErrorCode, JsonRpcErrorObject, MethodError, ToJsonRpcError};
pub use crate::events::{CallEvent, CallObserver, TracingObserver};
pub use crate::request::JsonRpcRequest;
pub use crate::response::JsonRpcMessage;
pub use crate::types::{Outcome, RequestId, RpcBody};

// Standard error codes
pub use crate::error_codes::*;
