//! Call lifecycle hook
//!
//! The adapter reports two points of every call: before any item is
//! dispatched and after every item has settled. Observers are notified
//! synchronously and cannot influence the call.

use serde_json::Value;
use tracing::debug;

use crate::types::{Outcome, RpcBody};

/// Name of the event raised before dispatch
pub const CALL_STARTED: &str = "api.call";
/// Name of the event raised after all outcomes settled
pub const CALL_FINISHED: &str = "api.done";

#[derive(Debug, Clone, Copy)]
pub enum CallEvent<'a> {
    /// The request body is about to be dispatched
    Started { body: &'a RpcBody<Value> },
    /// Every item in the body has an outcome
    Finished {
        body: &'a RpcBody<Value>,
        outcomes: &'a RpcBody<Outcome>,
    },
}

impl CallEvent<'_> {
    pub fn name(&self) -> &'static str {
        match self {
            CallEvent::Started { .. } => CALL_STARTED,
            CallEvent::Finished { .. } => CALL_FINISHED,
        }
    }

    pub fn body(&self) -> &RpcBody<Value> {
        match self {
            CallEvent::Started { body } | CallEvent::Finished { body, .. } => body,
        }
    }
}

pub trait CallObserver: Send + Sync {
    fn on_event(&self, event: &CallEvent<'_>);
}

impl<F> CallObserver for F
where
    F: Fn(&CallEvent<'_>) + Send + Sync,
{
    fn on_event(&self, event: &CallEvent<'_>) {
        self(event)
    }
}

/// Observer that writes every event to the `tracing` log
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl CallObserver for TracingObserver {
    fn on_event(&self, event: &CallEvent<'_>) {
        match event {
            CallEvent::Started { body } => {
                debug!(event = CALL_STARTED, items = body.len(), batch = body.is_batch());
            }
            CallEvent::Finished { outcomes, .. } => {
                let failed = outcomes.as_slice().iter().filter(|o| o.is_err()).count();
                debug!(event = CALL_FINISHED, items = outcomes.len(), failed);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_event_names() {
        let body = RpcBody::Single(json!({"method": "a"}));
        let outcomes = RpcBody::Single(Ok(json!(1)));

        assert_eq!(CallEvent::Started { body: &body }.name(), "api.call");
        let finished = CallEvent::Finished {
            body: &body,
            outcomes: &outcomes,
        };
        assert_eq!(finished.name(), "api.done");
        assert_eq!(finished.body(), &body);
    }

    #[test]
    fn test_closure_observer() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let observer = move |event: &CallEvent<'_>| {
            sink.lock().unwrap().push(event.name().to_string());
        };

        let body = RpcBody::Batch(vec![]);
        observer.on_event(&CallEvent::Started { body: &body });
        assert_eq!(*seen.lock().unwrap(), vec!["api.call".to_string()]);
    }
}
