//! Bridge client: the four-endpoint runtime-interface protocol
//!
//! All worker I/O goes through this client:
//! - `poll_next` — GET `/runtime/invocation/next`, blocking until the
//!   bridge has an event. The invocation metadata arrives in response
//!   headers, the raw event payload in the body.
//! - `report_success` / `report_error` — POST the cycle's outcome. Both
//!   retry indefinitely with a fixed delay until the bridge acknowledges,
//!   so an unavailable bridge back-pressures the loop (at-least-once
//!   delivery).
//! - `report_init_error` — single-shot terminal announcement before the
//!   process exits with a startup failure.
//!
//! Every operation returns an explicit result; the invocation loop
//! branches on variants rather than catching unwinds.

use std::time::Duration;

use reqwest::header::{HeaderMap, CONTENT_TYPE};
use serde_json::Value;
use thiserror::Error;
use url::Url;

use bridge_worker_sdk::error::ErrorBody;

const HEADER_FUNCTION_ARN: &str = "lambda-runtime-invoked-function-arn";
const HEADER_REQUEST_ID: &str = "lambda-runtime-aws-request-id";
const HEADER_DEADLINE_MS: &str = "lambda-runtime-deadline-ms";
const HEADER_COGNITO_IDENTITY: &str = "lambda-runtime-cognito-identity";
const HEADER_CLIENT_CONTEXT: &str = "lambda-runtime-client-context";
const HEADER_LOG_GROUP: &str = "lambda-runtime-log-group-name";
const HEADER_LOG_STREAM: &str = "lambda-runtime-log-stream-name";

/// Errors from a single bridge operation attempt
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("poll response missing required header `{0}`")]
    MissingHeader(&'static str),

    #[error("poll response header `{0}` is malformed")]
    MalformedHeader(&'static str),

    #[error("event payload is not valid JSON: {0}")]
    MalformedEvent(#[from] serde_json::Error),
}

/// One invocation as handed over by the bridge
///
/// Created per poll, consumed by the context builder and the handler,
/// discarded when the cycle ends.
#[derive(Debug, Clone)]
pub struct InvocationRequest {
    pub request_id: String,
    pub invoked_function_arn: String,

    /// Absolute deadline, epoch milliseconds
    pub deadline_ms: u64,

    /// Raw identity token as it appeared on the wire
    pub identity: Option<String>,

    /// Raw client-context token as it appeared on the wire
    pub client_context: Option<String>,

    pub log_group_name: String,
    pub log_stream_name: String,

    /// Opaque event payload
    pub event: Value,
}

impl InvocationRequest {
    /// Parse a poll response: metadata from headers, event from the body
    pub fn from_poll(headers: &HeaderMap, body: &[u8]) -> Result<Self, BridgeError> {
        let deadline_raw = required_header(headers, HEADER_DEADLINE_MS)?;
        let deadline_ms = deadline_raw
            .parse()
            .map_err(|_| BridgeError::MalformedHeader(HEADER_DEADLINE_MS))?;

        Ok(Self {
            request_id: required_header(headers, HEADER_REQUEST_ID)?,
            invoked_function_arn: required_header(headers, HEADER_FUNCTION_ARN)?,
            deadline_ms,
            identity: optional_header(headers, HEADER_COGNITO_IDENTITY)?,
            client_context: optional_header(headers, HEADER_CLIENT_CONTEXT)?,
            log_group_name: required_header(headers, HEADER_LOG_GROUP)?,
            log_stream_name: required_header(headers, HEADER_LOG_STREAM)?,
            event: serde_json::from_slice(body)?,
        })
    }
}

fn required_header(headers: &HeaderMap, name: &'static str) -> Result<String, BridgeError> {
    headers
        .get(name)
        .ok_or(BridgeError::MissingHeader(name))?
        .to_str()
        .map(str::to_owned)
        .map_err(|_| BridgeError::MalformedHeader(name))
}

fn optional_header(headers: &HeaderMap, name: &'static str) -> Result<Option<String>, BridgeError> {
    match headers.get(name) {
        None => Ok(None),
        Some(value) => value
            .to_str()
            .map(|s| Some(s.to_owned()))
            .map_err(|_| BridgeError::MalformedHeader(name)),
    }
}

/// HTTP client for the local bridge
pub struct BridgeClient {
    http: reqwest::Client,
    base: String,
    report_retry_delay: Duration,
}

impl BridgeClient {
    pub fn new(bridge_url: &Url, report_retry_delay: Duration) -> Self {
        Self {
            http: reqwest::Client::new(),
            base: bridge_url.as_str().trim_end_matches('/').to_string(),
            report_retry_delay,
        }
    }

    /// Block until the bridge hands over the next invocation
    pub async fn poll_next(&self) -> Result<InvocationRequest, BridgeError> {
        let response = self
            .http
            .get(format!("{}/runtime/invocation/next", self.base))
            .send()
            .await?;

        let headers = response.headers().clone();
        let body = response.bytes().await?;
        InvocationRequest::from_poll(&headers, &body)
    }

    /// Report the handler's result, retrying until the bridge accepts it
    pub async fn report_success(&self, request_id: &str, body: Vec<u8>) {
        let url = format!("{}/runtime/invocation/{}/response", self.base, request_id);
        self.deliver(&url, body).await;
    }

    /// Report an invocation error, retrying until the bridge accepts it
    pub async fn report_error(&self, request_id: &str, error: &ErrorBody) {
        let url = format!("{}/runtime/invocation/{}/error", self.base, request_id);
        self.deliver(&url, encode_error(error)).await;
    }

    /// Announce a fatal startup failure. Single attempt: the process is
    /// about to exit and there is nothing left to retry for.
    pub async fn report_init_error(&self, error: &ErrorBody) -> Result<(), BridgeError> {
        self.http
            .post(format!("{}/runtime/init/error", self.base))
            .header(CONTENT_TYPE, "application/json")
            .body(encode_error(error))
            .send()
            .await?;
        Ok(())
    }

    /// Fixed-delay, unbounded delivery loop. Returns only once the bridge
    /// has acknowledged with a success status; a bridge that answers with
    /// an error status is treated the same as one that is unreachable.
    async fn deliver(&self, url: &str, body: Vec<u8>) {
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            match self
                .http
                .post(url)
                .header(CONTENT_TYPE, "application/json")
                .body(body.clone())
                .send()
                .await
            {
                Ok(response) if response.status().is_success() => return,
                Ok(response) => {
                    tracing::warn!(
                        status = %response.status(),
                        url,
                        attempt,
                        "Bridge rejected report, retrying"
                    );
                }
                Err(err) => {
                    tracing::warn!(error = %err, url, attempt, "Report delivery failed, retrying");
                }
            }
            tokio::time::sleep(self.report_retry_delay).await;
        }
    }
}

fn encode_error(error: &ErrorBody) -> Vec<u8> {
    // ErrorBody is plain strings; encoding cannot realistically fail
    serde_json::to_vec(error).unwrap_or_else(|_| {
        br#"{"errorType":"Error","errorMessage":"failed to encode error report","trace":[]}"#
            .to_vec()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    fn poll_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            HEADER_FUNCTION_ARN,
            HeaderValue::from_static("arn:aws:lambda:local:0:function:test"),
        );
        headers.insert(HEADER_REQUEST_ID, HeaderValue::from_static("req-42"));
        headers.insert(HEADER_DEADLINE_MS, HeaderValue::from_static("1700000000000"));
        headers.insert(HEADER_LOG_GROUP, HeaderValue::from_static("/aws/lambda/test"));
        headers.insert(HEADER_LOG_STREAM, HeaderValue::from_static("stream-1"));
        headers
    }

    #[test]
    fn test_from_poll_parses_metadata_and_event() {
        let mut headers = poll_headers();
        headers.insert(HEADER_COGNITO_IDENTITY, HeaderValue::from_static("null"));

        let request =
            InvocationRequest::from_poll(&headers, br#"{"key":"value"}"#).unwrap();

        assert_eq!(request.request_id, "req-42");
        assert_eq!(request.deadline_ms, 1_700_000_000_000);
        assert_eq!(request.identity.as_deref(), Some("null"));
        assert_eq!(request.client_context, None);
        assert_eq!(request.event, serde_json::json!({"key": "value"}));
    }

    #[test]
    fn test_from_poll_missing_request_id() {
        let mut headers = poll_headers();
        headers.remove(HEADER_REQUEST_ID);

        let err = InvocationRequest::from_poll(&headers, b"{}").unwrap_err();
        assert!(matches!(
            err,
            BridgeError::MissingHeader(HEADER_REQUEST_ID)
        ));
    }

    #[test]
    fn test_from_poll_rejects_bad_deadline() {
        let mut headers = poll_headers();
        headers.insert(HEADER_DEADLINE_MS, HeaderValue::from_static("soon"));

        let err = InvocationRequest::from_poll(&headers, b"{}").unwrap_err();
        assert!(matches!(
            err,
            BridgeError::MalformedHeader(HEADER_DEADLINE_MS)
        ));
    }

    #[test]
    fn test_from_poll_rejects_non_json_event() {
        let err = InvocationRequest::from_poll(&poll_headers(), b"not json").unwrap_err();
        assert!(matches!(err, BridgeError::MalformedEvent(_)));
    }

    #[test]
    fn test_base_url_trailing_slash_is_normalized() {
        let url = Url::parse("http://localhost:9000/").unwrap();
        let client = BridgeClient::new(&url, Duration::from_millis(1));
        assert_eq!(client.base, "http://localhost:9000");
    }
}
