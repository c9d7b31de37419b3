//! Local invocation-runtime bridge worker
//!
//! Emulates a cloud function execution host on the developer's machine:
//! developer handler code runs locally while real invocation events and
//! results flow through a local relay (the bridge) speaking the
//! four-endpoint runtime-interface protocol.
//!
//! The worker is strictly sequential: it loads the handler once, then
//! repeats poll → execute → report with exactly one invocation in flight.
//! An idle watchdog force-exits the process when the bridge goes silent.
//!
//! The build pipeline generates a thin entry point that registers the
//! bundle's handlers in a [`HandlerManifest`] and hands control to
//! [`run`]:
//!
//! ```ignore
//! use bridge_worker::{run, WorkerConfig};
//! use bridge_worker_sdk::prelude::*;
//!
//! async fn handler(event: JsonValue, _ctx: ExecutionContext) -> Result<JsonValue, HandlerError> {
//!     Ok(json!({ "statusCode": 200, "body": "ok" }))
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     tracing_subscriber::fmt().init();
//!
//!     let manifest = HandlerManifest::new().module(
//!         "src/index",
//!         ModuleDefinition::new().export("handler", handler_fn(handler)),
//!     );
//!     let config = match WorkerConfig::from_env() {
//!         Ok(config) => config,
//!         Err(err) => {
//!             eprintln!("{err}");
//!             std::process::exit(1);
//!         }
//!     };
//!
//!     std::process::exit(run(config, manifest).await.code());
//! }
//! ```

pub mod bridge;
pub mod config;
pub mod context;
pub mod invocation;
pub mod loader;

pub use bridge_worker_sdk as sdk;

pub use config::{ConfigError, FunctionMetadata, WorkerConfig, WorkerInput};
pub use invocation::{run, ExitStatus};
pub use loader::{HandlerSpecifier, LoadError};

pub use bridge_worker_sdk::manifest::HandlerManifest;
