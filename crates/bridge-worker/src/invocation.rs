//! Invocation loop
//!
//! The worker's single cooperative task:
//! `Starting → AwaitNext → Executing → Reporting → AwaitNext …`, with two
//! terminal states mapped to process exit codes. Exactly one invocation is
//! in flight at any time; every I/O operation is a suspension point.
//!
//! The idle watchdog is armed over each full iteration. If a complete
//! poll-execute-report cycle does not finish within the window, the worker
//! exits cleanly: a safety net against an orphaned process whose bridge
//! has gone silent.

use tracing::Instrument;

use bridge_worker_sdk::context::ExecutionContext;
use bridge_worker_sdk::error::{ErrorBody, HandlerError};
use bridge_worker_sdk::manifest::HandlerManifest;
use serde_json::Value;

use crate::bridge::BridgeClient;
use crate::config::WorkerConfig;
use crate::context::build_context;
use crate::loader::{self, LoadedHandler};

/// How the worker exited
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    /// The idle watchdog fired; normal shutdown
    IdleTimeout,

    /// The handler failed to load at startup
    InitFailure,
}

impl ExitStatus {
    /// Process exit code for this status
    pub fn code(&self) -> i32 {
        match self {
            ExitStatus::IdleTimeout => 0,
            ExitStatus::InitFailure => 1,
        }
    }
}

/// Run the worker until it reaches a terminal state.
///
/// Loads the handler once, then polls the bridge one invocation at a time.
/// A startup failure is announced through the init-error endpoint and ends
/// the process without a single poll; handler failures are reported per
/// invocation and never terminate the loop.
pub async fn run(config: WorkerConfig, mut manifest: HandlerManifest) -> ExitStatus {
    let bridge = BridgeClient::new(&config.input.bridge_url, config.report_retry_delay);

    tracing::info!(
        handler = %config.input.handler,
        bridge_url = %config.input.bridge_url,
        "Starting bridge worker"
    );

    // Starting
    let handler = match loader::load(&config.input.out_dir, &config.input.handler, &mut manifest)
    {
        Ok(handler) => handler,
        Err(err) => {
            tracing::error!(error = %err, "Handler failed to load");
            if let Err(report_err) = bridge.report_init_error(&err.to_error_body()).await {
                tracing::error!(error = %report_err, "Could not announce init failure to bridge");
            }
            return ExitStatus::InitFailure;
        }
    };

    tracing::info!(
        module = %handler.specifier.module,
        export = %handler.specifier.export,
        path = %handler.path.display(),
        "Handler loaded"
    );

    loop {
        match tokio::time::timeout(config.idle_window, run_cycle(&bridge, &config, &handler)).await
        {
            Ok(()) => {}
            Err(_) => {
                tracing::info!(
                    window_secs = config.idle_window.as_secs(),
                    "No completed cycle within the idle window, shutting down"
                );
                return ExitStatus::IdleTimeout;
            }
        }
    }
}

/// One full AwaitNext → Executing → Reporting iteration.
///
/// A poll failure returns early so the loop re-polls immediately, with no
/// delay. This reproduces the observed at-least-once polling stance of the
/// original runtime; it busy-loops against an unreachable bridge.
async fn run_cycle(bridge: &BridgeClient, config: &WorkerConfig, handler: &LoadedHandler) {
    // AwaitNext
    let request = match bridge.poll_next().await {
        Ok(request) => request,
        Err(err) => {
            tracing::debug!(error = %err, "Poll failed, retrying");
            return;
        }
    };

    let span = tracing::info_span!("invocation", request_id = %request.request_id);
    async {
        // Executing
        let ctx = build_context(&request, &config.metadata);
        let request_id = request.request_id.clone();
        let result = execute(handler, request.event, ctx).await;

        // Reporting
        match result {
            Ok(value) => match serde_json::to_vec(&value) {
                Ok(body) => bridge.report_success(&request_id, body).await,
                Err(err) => {
                    let err = HandlerError::from(err);
                    tracing::warn!(message = %err.message, "Handler result failed to serialize");
                    bridge.report_error(&request_id, &ErrorBody::from(&err)).await;
                }
            },
            Err(err) => {
                tracing::warn!(kind = %err.kind, message = %err.message, "Handler returned an error");
                bridge.report_error(&request_id, &ErrorBody::from(&err)).await;
            }
        }
    }
    .instrument(span)
    .await
}

/// Invoke the handler on its own task so a panic surfaces as a reportable
/// error instead of tearing down the worker.
async fn execute(
    handler: &LoadedHandler,
    event: Value,
    ctx: ExecutionContext,
) -> Result<Value, HandlerError> {
    let callable = handler.handler.clone();
    match tokio::spawn(async move { callable.call(event, ctx).await }).await {
        Ok(result) => result,
        Err(join_err) => Err(HandlerError::new(
            "Runtime.HandlerPanic",
            format!("handler panicked: {join_err}"),
        )),
    }
}
