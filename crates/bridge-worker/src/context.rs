//! Execution-context construction
//!
//! Pure per-cycle step: one [`InvocationRequest`] plus the process-level
//! [`FunctionMetadata`] produce the [`ExecutionContext`] the handler sees.

use serde_json::Value;

use bridge_worker_sdk::context::ExecutionContext;

use crate::bridge::InvocationRequest;
use crate::config::FunctionMetadata;

/// Build the context for one invocation
pub fn build_context(
    request: &InvocationRequest,
    metadata: &FunctionMetadata,
) -> ExecutionContext {
    ExecutionContext {
        request_id: request.request_id.clone(),
        invoked_function_arn: request.invoked_function_arn.clone(),
        deadline_ms: request.deadline_ms,
        identity: decode_token("identity", request.identity.as_deref()),
        client_context: decode_token("client_context", request.client_context.as_deref()),
        function_name: metadata.function_name.clone(),
        function_version: metadata.function_version.clone(),
        memory_limit_in_mb: metadata.memory_limit_in_mb.clone(),
        log_group_name: request.log_group_name.clone(),
        log_stream_name: request.log_stream_name.clone(),
    }
}

/// Decode an identity/client-context token from its wire form.
///
/// The bridge encodes "no value" as the literal `null`, which must become
/// an absent field rather than an empty structure, matching the emulated
/// runtime. A token that fails to decode is dropped from the context, with
/// a warning so the drop stays observable.
fn decode_token(field: &'static str, token: Option<&str>) -> Option<Value> {
    let token = token?;
    match serde_json::from_str::<Value>(token) {
        Ok(Value::Null) => None,
        Ok(value) => Some(value),
        Err(err) => {
            tracing::warn!(field, error = %err, "Dropping undecodable context token");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request() -> InvocationRequest {
        InvocationRequest {
            request_id: "req-7".to_string(),
            invoked_function_arn: "arn:aws:lambda:local:0:function:test".to_string(),
            deadline_ms: 1_700_000_000_000,
            identity: None,
            client_context: None,
            log_group_name: "/aws/lambda/test".to_string(),
            log_stream_name: "stream-7".to_string(),
            event: json!({}),
        }
    }

    fn metadata() -> FunctionMetadata {
        FunctionMetadata {
            function_name: "my-fn".to_string(),
            memory_limit_in_mb: "256".to_string(),
            function_version: "$LATEST".to_string(),
        }
    }

    #[test]
    fn test_context_carries_request_and_metadata() {
        let ctx = build_context(&request(), &metadata());

        assert_eq!(ctx.request_id, "req-7");
        assert_eq!(ctx.function_name, "my-fn");
        assert_eq!(ctx.function_version, "$LATEST");
        assert_eq!(ctx.memory_limit_in_mb, "256");
        assert_eq!(ctx.log_stream_name, "stream-7");
        assert_eq!(ctx.deadline_ms, 1_700_000_000_000);
    }

    #[test]
    fn test_null_token_decodes_to_absent() {
        let mut req = request();
        req.identity = Some("null".to_string());
        req.client_context = Some("null".to_string());

        let ctx = build_context(&req, &metadata());
        assert_eq!(ctx.identity, None);
        assert_eq!(ctx.client_context, None);
    }

    #[test]
    fn test_present_tokens_decode_to_values() {
        let mut req = request();
        req.identity = Some(r#"{"identityId":"id-1"}"#.to_string());
        req.client_context = Some(r#"{"client":{"app_title":"demo"}}"#.to_string());

        let ctx = build_context(&req, &metadata());
        assert_eq!(ctx.identity, Some(json!({"identityId": "id-1"})));
        assert_eq!(
            ctx.client_context,
            Some(json!({"client": {"app_title": "demo"}}))
        );
    }

    #[test]
    fn test_undecodable_token_is_dropped() {
        let mut req = request();
        req.identity = Some("not json".to_string());

        let ctx = build_context(&req, &metadata());
        assert_eq!(ctx.identity, None);
    }

    #[test]
    fn test_absent_header_stays_absent() {
        let ctx = build_context(&request(), &metadata());
        assert_eq!(ctx.identity, None);
        assert_eq!(ctx.client_context, None);
    }
}
