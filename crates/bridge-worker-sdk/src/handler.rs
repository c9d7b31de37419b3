//! Handler trait and adapters
//!
//! A handler takes the raw event payload and an [`ExecutionContext`] and
//! returns a serializable result or a [`HandlerError`]. The handler
//! reference is resolved once at worker startup and shared across all
//! invocations, so module-level state held by the handler persists for the
//! process lifetime (emulating container reuse).

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde_json::Value;

use crate::context::ExecutionContext;
use crate::error::HandlerError;

/// Boxed future returned by handler invocations
pub type HandlerFuture = Pin<Box<dyn Future<Output = Result<Value, HandlerError>> + Send>>;

/// A callable handler entry point
pub trait Handler: Send + Sync {
    /// Execute the handler against one event
    fn call(&self, event: Value, ctx: ExecutionContext) -> HandlerFuture;
}

/// Shared handler reference, cloned per invocation
pub type SharedHandler = Arc<dyn Handler>;

struct HandlerFn<F> {
    f: F,
}

impl<F, Fut> Handler for HandlerFn<F>
where
    F: Fn(Value, ExecutionContext) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Value, HandlerError>> + Send + 'static,
{
    fn call(&self, event: Value, ctx: ExecutionContext) -> HandlerFuture {
        Box::pin((self.f)(event, ctx))
    }
}

/// Wrap an async function as a [`SharedHandler`]
///
/// # Example
///
/// ```
/// use bridge_worker_sdk::prelude::*;
///
/// async fn handle(event: JsonValue, _ctx: ExecutionContext) -> Result<JsonValue, HandlerError> {
///     Ok(json!({ "echo": event }))
/// }
///
/// let handler = handler_fn(handle);
/// ```
pub fn handler_fn<F, Fut>(f: F) -> SharedHandler
where
    F: Fn(Value, ExecutionContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value, HandlerError>> + Send + 'static,
{
    Arc::new(HandlerFn { f })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::FUNCTION_VERSION;
    use serde_json::json;

    fn test_context() -> ExecutionContext {
        ExecutionContext {
            request_id: "req-1".to_string(),
            invoked_function_arn: "arn:aws:lambda:local:0:function:test".to_string(),
            deadline_ms: 0,
            identity: None,
            client_context: None,
            function_name: "test".to_string(),
            function_version: FUNCTION_VERSION.to_string(),
            memory_limit_in_mb: "128".to_string(),
            log_group_name: "/aws/lambda/test".to_string(),
            log_stream_name: "stream".to_string(),
        }
    }

    #[tokio::test]
    async fn test_handler_fn_passes_event_and_context() {
        let handler = handler_fn(|event, ctx: ExecutionContext| async move {
            Ok(json!({ "event": event, "request_id": ctx.request_id }))
        });

        let result = handler.call(json!({"n": 1}), test_context()).await.unwrap();
        assert_eq!(result, json!({"event": {"n": 1}, "request_id": "req-1"}));
    }

    #[tokio::test]
    async fn test_handler_fn_propagates_errors() {
        let handler =
            handler_fn(|_event, _ctx| async move { Err(HandlerError::error("boom")) });

        let err = handler.call(json!(null), test_context()).await.unwrap_err();
        assert_eq!(err.message, "boom");
    }
}
