//! Response shaping: pairs request items with their outcomes and builds the
//! JSON-RPC reply, dropping notifications.

use serde_json::Value;
use thiserror::Error;

use crate::error::classify;
use crate::request::request_id;
use crate::response::JsonRpcMessage;
use crate::types::{Outcome, RpcBody};

/// Converted reply; `None` means there is nothing to send back
pub type ConvertedResponse = Option<RpcBody<JsonRpcMessage>>;

/// Requests and outcomes that cannot be paired. Only a caller bug produces these.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    #[error("request is {request} but outcome is {outcome}")]
    ShapeMismatch {
        request: &'static str,
        outcome: &'static str,
    },
    #[error("{requests} requests paired with {outcomes} outcomes")]
    LengthMismatch { requests: usize, outcomes: usize },
}

fn shape<T>(body: &RpcBody<T>) -> &'static str {
    if body.is_batch() { "a batch" } else { "single" }
}

/// Build the JSON-RPC reply for `requests` from the positionally matching
/// `outcomes`.
///
/// Items without an `id` member produce nothing. A single request yields a
/// single envelope, a batch yields an array in request order, and when no
/// envelope is left at all the result is `None`. Error outcomes are run
/// through [`classify`].
pub fn convert(
    requests: &RpcBody<Value>,
    outcomes: &RpcBody<Outcome>,
) -> Result<ConvertedResponse, ConversionError> {
    if requests.is_batch() != outcomes.is_batch() {
        return Err(ConversionError::ShapeMismatch {
            request: shape(requests),
            outcome: shape(outcomes),
        });
    }
    if requests.len() != outcomes.len() {
        return Err(ConversionError::LengthMismatch {
            requests: requests.len(),
            outcomes: outcomes.len(),
        });
    }

    let mut envelopes: Vec<JsonRpcMessage> = requests
        .as_slice()
        .iter()
        .zip(outcomes.as_slice())
        .filter_map(|(request, outcome)| {
            let id = request_id(request)?;
            Some(match outcome {
                Ok(result) => JsonRpcMessage::success(id, result.clone()),
                Err(error) => JsonRpcMessage::error(id, classify(error.clone())),
            })
        })
        .collect();

    if envelopes.is_empty() {
        return Ok(None);
    }

    Ok(Some(if requests.is_batch() {
        RpcBody::Batch(envelopes)
    } else {
        RpcBody::Single(envelopes.remove(0))
    }))
}

/// JSON value written as the body; `null` when there is no response
pub fn to_json(response: &ConvertedResponse) -> Result<Value, serde_json::Error> {
    match response {
        Some(body) => serde_json::to_value(body),
        None => Ok(Value::Null),
    }
}
