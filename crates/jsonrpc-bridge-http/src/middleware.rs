//! JSON-RPC step of an HTTP pipeline

use http::StatusCode;
use serde_json::Value;
use tracing::{debug, warn};

use jsonrpc_bridge::{DispatchAdapter, JsonRpcError, JsonRpcHandler, RpcBody};

use crate::{HttpReply, MiddlewareConfig, ReplyBody, Result};

/// Answers JSON-RPC request bodies on behalf of an HTTP server.
///
/// The middleware only decides the status and body; writing them to the wire
/// stays with the server (see [`HttpReply::into_response`]).
pub struct JsonRpcMiddleware<H> {
    adapter: DispatchAdapter<H>,
    config: MiddlewareConfig,
}

impl<H> Clone for JsonRpcMiddleware<H> {
    fn clone(&self) -> Self {
        Self {
            adapter: self.adapter.clone(),
            config: self.config.clone(),
        }
    }
}

impl<H> JsonRpcMiddleware<H> {
    pub fn new(adapter: DispatchAdapter<H>) -> Self {
        Self {
            adapter,
            config: MiddlewareConfig::default(),
        }
    }

    pub fn with_config(mut self, config: MiddlewareConfig) -> Self {
        self.config = config;
        self
    }

    pub fn adapter(&self) -> &DispatchAdapter<H> {
        &self.adapter
    }

    pub fn config(&self) -> &MiddlewareConfig {
        &self.config
    }

    /// Answer a decoded request body.
    ///
    /// Leaves `reply` untouched when it already carries a body. Otherwise sets
    /// `204` with an empty body when there is nothing to answer, or `200` with
    /// the JSON-RPC reply.
    pub async fn handle<C>(&self, context: &C, body: Value, reply: &mut HttpReply) -> Result<()>
    where
        H: JsonRpcHandler<C>,
        C: Send + Sync,
    {
        if reply.is_handled() {
            debug!("Response already produced, skipping JSON-RPC handling");
            return Ok(());
        }

        match self.adapter.process(context, RpcBody::from(body)).await? {
            None => {
                debug!("No JSON-RPC response required");
                reply.status = StatusCode::NO_CONTENT;
                reply.body = Some(ReplyBody::Empty);
            }
            Some(response) => {
                reply.status = StatusCode::OK;
                reply.body = Some(ReplyBody::Json(serde_json::to_value(&response)?));
            }
        }
        Ok(())
    }

    /// Decode a raw request body and answer it.
    ///
    /// Oversized bodies get `413`; bodies that are not JSON get `400` with a
    /// `-32700 Parse error` envelope.
    pub async fn handle_bytes<C>(&self, context: &C, bytes: &[u8]) -> Result<HttpReply>
    where
        H: JsonRpcHandler<C>,
        C: Send + Sync,
    {
        if bytes.len() > self.config.max_body_size {
            warn!("Request body too large: {} bytes", bytes.len());
            return Ok(HttpReply::text(
                StatusCode::PAYLOAD_TOO_LARGE,
                "Request body too large",
            ));
        }

        let body: Value = match serde_json::from_slice(bytes) {
            Ok(body) => body,
            Err(err) => {
                warn!("JSON-RPC parse error: {}", err);
                let envelope = serde_json::to_value(JsonRpcError::parse_error())?;
                return Ok(HttpReply::json(StatusCode::BAD_REQUEST, envelope));
            }
        };

        let mut reply = HttpReply::new();
        self.handle(context, body, &mut reply).await?;
        Ok(reply)
    }
}
