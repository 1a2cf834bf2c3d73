use std::any::Any;
use std::marker::PhantomData;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;
use futures::future::{BoxFuture, join_all};
use serde_json::Value;
use tracing::{debug, error, warn};

use crate::config::AdapterConfig;
use crate::convert::{ConversionError, ConvertedResponse, convert};
use crate::error::{JsonRpcErrorObject, ToJsonRpcError};
use crate::events::{CallEvent, CallObserver};
use crate::request::{JsonRpcRequest, Validation, validate};
use crate::types::{Outcome, RpcBody};

/// The external method executor.
///
/// `C` is the per-call context supplied by the transport; it is handed to the
/// handler untouched. Method lookup failures should be reported with a
/// `"not found"` message (see [`crate::MethodError::not_found`]) so they are
/// answered as `-32601 Method not found`.
#[async_trait]
pub trait JsonRpcHandler<C>: Send + Sync
where
    C: Send + Sync,
{
    /// The error type returned by this handler
    type Error: ToJsonRpcError;

    /// Execute one validated request, notifications included
    async fn handle(&self, context: &C, request: &JsonRpcRequest) -> Result<Value, Self::Error>;

    /// List supported methods (optional - used for introspection)
    fn supported_methods(&self) -> Vec<String> {
        vec![]
    }
}

/// A simple function-based handler
pub struct FunctionHandler<F, E> {
    handler_fn: F,
    methods: Vec<String>,
    _error: PhantomData<fn() -> E>,
}

impl<F, E> FunctionHandler<F, E> {
    pub fn new<C>(handler_fn: F) -> Self
    where
        F: Fn(&C, JsonRpcRequest) -> BoxFuture<'static, Result<Value, E>>,
    {
        Self {
            handler_fn,
            methods: vec![],
            _error: PhantomData,
        }
    }

    pub fn with_methods(mut self, methods: Vec<String>) -> Self {
        self.methods = methods;
        self
    }
}

#[async_trait]
impl<C, F, E> JsonRpcHandler<C> for FunctionHandler<F, E>
where
    C: Send + Sync,
    E: ToJsonRpcError,
    F: Fn(&C, JsonRpcRequest) -> BoxFuture<'static, Result<Value, E>> + Send + Sync,
{
    type Error = E;

    async fn handle(&self, context: &C, request: &JsonRpcRequest) -> Result<Value, Self::Error> {
        (self.handler_fn)(context, request.clone()).await
    }

    fn supported_methods(&self) -> Vec<String> {
        self.methods.clone()
    }
}

/// Runs every item of a request body through the handler.
///
/// Items are validated first; malformed ones get an `Invalid request` outcome
/// without touching the handler. All remaining items of a batch are invoked
/// concurrently and the adapter waits for every one of them, so a failing
/// item never affects its siblings. Outcomes come back in request order and
/// in the same single/batch shape as the input.
pub struct DispatchAdapter<H> {
    handler: Arc<H>,
    config: AdapterConfig,
    observer: Option<Arc<dyn CallObserver>>,
}

impl<H> Clone for DispatchAdapter<H> {
    fn clone(&self) -> Self {
        Self {
            handler: Arc::clone(&self.handler),
            config: self.config.clone(),
            observer: self.observer.clone(),
        }
    }
}

impl<H> DispatchAdapter<H> {
    pub fn new(handler: H) -> Self {
        Self::from_arc(Arc::new(handler))
    }

    pub fn from_arc(handler: Arc<H>) -> Self {
        Self {
            handler,
            config: AdapterConfig::default(),
            observer: None,
        }
    }

    pub fn with_config(mut self, config: AdapterConfig) -> Self {
        self.config = config;
        self
    }

    /// Attach a call-event observer
    pub fn with_observer<O>(mut self, observer: O) -> Self
    where
        O: CallObserver + 'static,
    {
        self.observer = Some(Arc::new(observer));
        self
    }

    pub fn with_shared_observer(mut self, observer: Arc<dyn CallObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn config(&self) -> &AdapterConfig {
        &self.config
    }

    pub fn handler(&self) -> &Arc<H> {
        &self.handler
    }

    fn emit(&self, event: CallEvent<'_>) {
        if let Some(observer) = &self.observer {
            observer.on_event(&event);
        }
    }

    /// Dispatch every item and collect the outcomes
    pub async fn call<C>(&self, context: &C, body: &RpcBody<Value>) -> RpcBody<Outcome>
    where
        H: JsonRpcHandler<C>,
        C: Send + Sync,
    {
        self.emit(CallEvent::Started { body });
        debug!(
            batch = body.is_batch(),
            items = body.len(),
            "Dispatching JSON-RPC call"
        );

        let outcomes = match body {
            RpcBody::Single(item) => RpcBody::Single(self.invoke(context, item).await),
            RpcBody::Batch(items) => RpcBody::Batch(
                join_all(items.iter().map(|item| self.invoke(context, item))).await,
            ),
        };

        self.emit(CallEvent::Finished {
            body,
            outcomes: &outcomes,
        });
        outcomes
    }

    /// Dispatch and shape the reply in one step
    pub async fn process<C>(
        &self,
        context: &C,
        body: RpcBody<Value>,
    ) -> Result<ConvertedResponse, ConversionError>
    where
        H: JsonRpcHandler<C>,
        C: Send + Sync,
    {
        let outcomes = self.call(context, &body).await;
        convert(&body, &outcomes)
    }

    async fn invoke<C>(&self, context: &C, item: &Value) -> Outcome
    where
        H: JsonRpcHandler<C>,
        C: Send + Sync,
    {
        let request = match validate(item, &self.config) {
            Validation::Valid(request) => request,
            Validation::Invalid { id, reason } => {
                warn!(id = ?id, %reason, "Rejecting invalid JSON-RPC request");
                return Err(JsonRpcErrorObject::invalid_request());
            }
        };

        debug!(
            method = %request.method,
            notification = request.is_notification(),
            "Invoking handler"
        );

        let call = self.handler.handle(context, &request);
        let result = if self.config.catch_panics {
            match AssertUnwindSafe(call).catch_unwind().await {
                Ok(result) => result,
                Err(panic) => {
                    error!(
                        method = %request.method,
                        panic = panic_message(panic.as_ref()),
                        "Handler panicked"
                    );
                    return Err(JsonRpcErrorObject::internal_error());
                }
            }
        } else {
            call.await
        };

        result.map_err(|err| {
            let object = err.to_error_object();
            debug!(
                method = %request.method,
                code = object.code,
                message = %object.message,
                "Handler failed"
            );
            object
        })
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&'static str>() {
        *message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.as_str()
    } else {
        "unknown panic"
    }
}
