//! Status and body written back to the HTTP layer

use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::{Response, StatusCode};
use http_body_util::Full;
use serde_json::Value;
use tracing::error;

/// Body produced by a pipeline step
#[derive(Debug, Clone, PartialEq)]
pub enum ReplyBody {
    /// Deliberately empty, as for `204 No Content`
    Empty,
    Json(Value),
    Text(String),
}

/// Status code and body for the current HTTP exchange.
///
/// A reply with `body == None` has not been produced yet; any step that sets a
/// body marks the exchange as handled.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpReply {
    pub status: StatusCode,
    pub body: Option<ReplyBody>,
}

impl Default for HttpReply {
    fn default() -> Self {
        Self {
            status: StatusCode::OK,
            body: None,
        }
    }
}

impl HttpReply {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn json(status: StatusCode, body: Value) -> Self {
        Self {
            status,
            body: Some(ReplyBody::Json(body)),
        }
    }

    pub fn text(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: Some(ReplyBody::Text(body.into())),
        }
    }

    pub fn no_content() -> Self {
        Self {
            status: StatusCode::NO_CONTENT,
            body: Some(ReplyBody::Empty),
        }
    }

    /// Whether an earlier step already produced the response
    pub fn is_handled(&self) -> bool {
        self.body.is_some()
    }

    pub fn json_body(&self) -> Option<&Value> {
        match &self.body {
            Some(ReplyBody::Json(value)) => Some(value),
            _ => None,
        }
    }

    /// Serialize into a hyper-compatible response
    pub fn into_response(self) -> Response<Full<Bytes>> {
        let builder = Response::builder().status(self.status);
        let built = match self.body {
            None | Some(ReplyBody::Empty) => builder.body(Full::new(Bytes::new())),
            Some(ReplyBody::Text(text)) => builder
                .header(CONTENT_TYPE, "text/plain; charset=utf-8")
                .body(Full::new(Bytes::from(text))),
            Some(ReplyBody::Json(value)) => match serde_json::to_vec(&value) {
                Ok(bytes) => builder
                    .header(CONTENT_TYPE, "application/json")
                    .body(Full::new(Bytes::from(bytes))),
                Err(err) => {
                    error!("Failed to serialize JSON-RPC reply: {}", err);
                    return internal_error_response();
                }
            },
        };

        built.unwrap_or_else(|err| {
            error!("Failed to build HTTP response: {}", err);
            internal_error_response()
        })
    }
}

fn internal_error_response() -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::new()));
    *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use serde_json::json;

    async fn body_bytes(response: Response<Full<Bytes>>) -> Bytes {
        response.into_body().collect().await.unwrap().to_bytes()
    }

    #[test]
    fn test_default_reply_is_unhandled() {
        let reply = HttpReply::new();
        assert!(!reply.is_handled());
        assert_eq!(reply.status, StatusCode::OK);
        assert!(HttpReply::no_content().is_handled());
    }

    #[tokio::test]
    async fn test_json_response() {
        let reply = HttpReply::json(
            StatusCode::OK,
            json!({"jsonrpc": "2.0", "id": 1, "result": true}),
        );
        assert_eq!(reply.json_body().unwrap()["id"], json!(1));

        let response = reply.into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_TYPE], "application/json");
        assert_eq!(
            body_bytes(response).await,
            Bytes::from_static(br#"{"jsonrpc":"2.0","id":1,"result":true}"#)
        );
    }

    #[tokio::test]
    async fn test_no_content_response() {
        let response = HttpReply::no_content().into_response();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert!(response.headers().get(CONTENT_TYPE).is_none());
        assert!(body_bytes(response).await.is_empty());
    }

    #[tokio::test]
    async fn test_text_response() {
        let reply = HttpReply::text(StatusCode::PAYLOAD_TOO_LARGE, "Request body too large");
        let response = reply.into_response();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body_bytes(response).await, Bytes::from_static(b"Request body too large"));
    }
}
