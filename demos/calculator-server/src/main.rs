//! # Calculator Server
//!
//! Serves a small arithmetic API over JSON-RPC, using `jsonrpc-bridge-http`
//! as the request step of a hyper server.
//!
//! ```text
//! curl -s localhost:8650/rpc -d '{"jsonrpc":"2.0","method":"add","params":[2,3],"id":1}'
//! ```

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use clap::Parser;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use serde_json::{Value, json};
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use jsonrpc_bridge::prelude::*;
use jsonrpc_bridge_http::{HttpReply, JsonRpcMiddleware, MiddlewareConfig};

#[derive(Parser, Debug)]
#[command(name = "calculator-server", about = "JSON-RPC calculator over HTTP")]
struct Args {
    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1:8650")]
    bind: SocketAddr,

    /// Path that accepts JSON-RPC POSTs
    #[arg(long, default_value = "/rpc")]
    path: String,

    /// Reject requests that omit `"jsonrpc": "2.0"`
    #[arg(long)]
    strict: bool,

    /// Largest accepted request body, in bytes
    #[arg(long, default_value_t = 1024 * 1024)]
    max_body_size: usize,
}

/// Who is calling, as seen by the transport
#[derive(Debug, Clone)]
struct Caller {
    peer: SocketAddr,
}

#[derive(Debug, Error)]
enum CalcError {
    #[error("Not Found")]
    UnknownMethod,
    #[error("Bad Request")]
    BadOperands,
    #[error("Division by zero")]
    DivisionByZero,
}

impl ToJsonRpcError for CalcError {
    fn to_error_object(&self) -> JsonRpcErrorObject {
        match self {
            // Plain HTTP-style errors, left for the classifier to map
            CalcError::UnknownMethod => MethodError::not_found().to_error_object(),
            CalcError::BadOperands => MethodError::bad_request().to_error_object(),
            CalcError::DivisionByZero => JsonRpcErrorObject::new(-32000, self.to_string())
                .with_field("data", json!({"operand": "divisor"})),
        }
    }
}

struct Calculator;

impl Calculator {
    fn operands(request: &JsonRpcRequest) -> Result<(f64, f64), CalcError> {
        let (a, b) = match &request.params {
            Some(Value::Array(_)) => (request.get_param_index(0), request.get_param_index(1)),
            Some(Value::Object(_)) => (request.get_param("a"), request.get_param("b")),
            _ => (None, None),
        };
        match (a.and_then(Value::as_f64), b.and_then(Value::as_f64)) {
            (Some(a), Some(b)) => Ok((a, b)),
            _ => Err(CalcError::BadOperands),
        }
    }
}

#[async_trait]
impl JsonRpcHandler<Caller> for Calculator {
    type Error = CalcError;

    async fn handle(&self, caller: &Caller, request: &JsonRpcRequest) -> Result<Value, CalcError> {
        debug!("{} from {}", request.method, caller.peer);
        if request.method == "whoami" {
            return Ok(json!(caller.peer.to_string()));
        }

        let (a, b) = match request.method.as_str() {
            "add" | "subtract" | "multiply" | "divide" => Self::operands(request)?,
            _ => return Err(CalcError::UnknownMethod),
        };
        let value = match request.method.as_str() {
            "add" => a + b,
            "subtract" => a - b,
            "multiply" => a * b,
            _ if b == 0.0 => return Err(CalcError::DivisionByZero),
            _ => a / b,
        };
        Ok(json!(value))
    }

    fn supported_methods(&self) -> Vec<String> {
        ["add", "subtract", "multiply", "divide", "whoami"]
            .iter()
            .map(|m| m.to_string())
            .collect()
    }
}

async fn handle_request(
    req: Request<Incoming>,
    middleware: Arc<JsonRpcMiddleware<Calculator>>,
    path: Arc<str>,
    caller: Caller,
) -> Result<Response<Full<Bytes>>, Infallible> {
    if req.uri().path() != &*path {
        return Ok(HttpReply::text(StatusCode::NOT_FOUND, "Not Found").into_response());
    }
    if req.method() != Method::POST {
        return Ok(
            HttpReply::text(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed").into_response(),
        );
    }

    let body = match req.into_body().collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(err) => {
            error!("Failed to read request body: {}", err);
            return Ok(HttpReply::text(StatusCode::BAD_REQUEST, "Bad Request").into_response());
        }
    };

    match middleware.handle_bytes(&caller, &body).await {
        Ok(reply) => Ok(reply.into_response()),
        Err(err) => {
            error!("JSON-RPC handling failed: {}", err);
            let reply = HttpReply::text(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error");
            Ok(reply.into_response())
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let adapter = DispatchAdapter::new(Calculator)
        .with_config(AdapterConfig::default().require_version(args.strict))
        .with_observer(TracingObserver);
    let middleware = Arc::new(
        JsonRpcMiddleware::new(adapter)
            .with_config(MiddlewareConfig::default().max_body_size(args.max_body_size)),
    );
    let path: Arc<str> = Arc::from(args.path.as_str());

    let listener = TcpListener::bind(args.bind).await?;
    info!(
        "Calculator server listening on http://{}{} (methods: {:?})",
        args.bind,
        path,
        middleware.adapter().handler().supported_methods()
    );

    loop {
        let (stream, peer) = listener.accept().await?;
        debug!("New connection from {}", peer);

        let middleware = Arc::clone(&middleware);
        let path = Arc::clone(&path);
        tokio::spawn(async move {
            let io = TokioIo::new(stream);
            let service = service_fn(move |req| {
                handle_request(req, Arc::clone(&middleware), Arc::clone(&path), Caller { peer })
            });

            if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                debug!("Connection from {} closed: {}", peer, err);
            }
        });
    }
}
