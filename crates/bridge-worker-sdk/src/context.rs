//! Execution context passed to every handler invocation
//!
//! Emulates the cloud runtime's context contract: static function metadata,
//! per-invocation request identifiers, and a live remaining-time clock.
//!
//! The legacy completion callbacks (`done`, `fail`, `succeed`) and the
//! `callbackWaitsForEmptyEventLoop` flag exist for structural compatibility
//! only. This emulation is value-returning, not callback-based, so invoking
//! them yields [`UnsupportedOperation`] rather than silently doing nothing.

use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::Value;

use crate::error::UnsupportedOperation;

/// Version marker reported for every locally-bridged function
pub const FUNCTION_VERSION: &str = "$LATEST";

/// Context for a single invocation
///
/// Built by the worker from the bridge's poll response plus process-level
/// function metadata, handed to the handler together with the event, and
/// discarded when the invocation cycle ends.
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    /// Request id assigned by the bridge for this invocation
    pub request_id: String,

    /// Identifier of the invoked function (ARN-equivalent)
    pub invoked_function_arn: String,

    /// Absolute deadline for this invocation, epoch milliseconds
    pub deadline_ms: u64,

    /// Caller identity, absent when the event carried none
    pub identity: Option<Value>,

    /// Client context, absent when the event carried none
    pub client_context: Option<Value>,

    /// Function name from process-level metadata
    pub function_name: String,

    /// Version marker, fixed to [`FUNCTION_VERSION`]
    pub function_version: String,

    /// Configured memory limit in MB, as the wire encodes it
    pub memory_limit_in_mb: String,

    /// Log group identifier for this invocation
    pub log_group_name: String,

    /// Log stream identifier for this invocation
    pub log_stream_name: String,
}

impl ExecutionContext {
    /// Milliseconds until this invocation's deadline, floored at zero.
    ///
    /// Recomputed on every call, so repeated reads during one invocation
    /// reflect elapsed time and are monotonically non-increasing.
    pub fn remaining_time_in_millis(&self) -> u64 {
        self.deadline_ms.saturating_sub(now_millis())
    }

    /// Read-only compatibility flag, fixed to `true`
    pub fn callback_waits_for_empty_event_loop(&self) -> bool {
        true
    }

    /// Writing the compatibility flag is not supported
    pub fn set_callback_waits_for_empty_event_loop(
        &mut self,
        _value: bool,
    ) -> Result<(), UnsupportedOperation> {
        Err(UnsupportedOperation::new("callbackWaitsForEmptyEventLoop"))
    }

    /// Legacy completion callback, present for structural compatibility only
    pub fn done(&self) -> Result<(), UnsupportedOperation> {
        Err(UnsupportedOperation::new("done"))
    }

    /// Legacy failure callback, present for structural compatibility only
    pub fn fail(&self) -> Result<(), UnsupportedOperation> {
        Err(UnsupportedOperation::new("fail"))
    }

    /// Legacy success callback, present for structural compatibility only
    pub fn succeed(&self) -> Result<(), UnsupportedOperation> {
        Err(UnsupportedOperation::new("succeed"))
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context_with_deadline(deadline_ms: u64) -> ExecutionContext {
        ExecutionContext {
            request_id: "req-1".to_string(),
            invoked_function_arn: "arn:aws:lambda:local:0:function:test".to_string(),
            deadline_ms,
            identity: None,
            client_context: None,
            function_name: "test".to_string(),
            function_version: FUNCTION_VERSION.to_string(),
            memory_limit_in_mb: "128".to_string(),
            log_group_name: "/aws/lambda/test".to_string(),
            log_stream_name: "stream".to_string(),
        }
    }

    #[test]
    fn test_remaining_time_floors_at_zero_past_deadline() {
        // Deadline long gone
        let ctx = context_with_deadline(1_000);
        assert_eq!(ctx.remaining_time_in_millis(), 0);
    }

    #[test]
    fn test_remaining_time_is_non_increasing() {
        let ctx = context_with_deadline(now_millis() + 60_000);

        let first = ctx.remaining_time_in_millis();
        std::thread::sleep(std::time::Duration::from_millis(5));
        let second = ctx.remaining_time_in_millis();

        assert!(first > 0);
        assert!(second <= first);
    }

    #[test]
    fn test_legacy_callbacks_are_unsupported() {
        let ctx = context_with_deadline(0);

        assert_eq!(ctx.done().unwrap_err().member, "done");
        assert_eq!(ctx.fail().unwrap_err().member, "fail");
        assert_eq!(ctx.succeed().unwrap_err().member, "succeed");
    }

    #[test]
    fn test_callback_flag_is_read_only() {
        let mut ctx = context_with_deadline(0);

        assert!(ctx.callback_waits_for_empty_event_loop());
        let err = ctx
            .set_callback_waits_for_empty_event_loop(false)
            .unwrap_err();
        assert_eq!(err.member, "callbackWaitsForEmptyEventLoop");
    }
}
