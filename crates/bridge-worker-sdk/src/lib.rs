//! Bridge Worker SDK - types handler bundles compile against
//!
//! This crate provides the contract between developer handlers and the local
//! invocation-runtime bridge worker:
//! - the [`ExecutionContext`] a handler receives alongside each event
//! - the [`HandlerError`] shape the worker reports back to the bridge
//! - the [`Handler`] trait and [`handler_fn`] adapter
//! - the [`HandlerManifest`] the build pipeline emits so the worker can
//!   resolve a handler specifier to a concrete callable

pub mod context;
pub mod error;
pub mod handler;
pub mod manifest;

pub mod prelude {
    //! Common imports for bridge handlers
    pub use crate::context::ExecutionContext;
    pub use crate::error::{HandlerError, UnsupportedOperation};
    pub use crate::handler::{handler_fn, Handler, HandlerFuture};
    pub use crate::manifest::{HandlerManifest, ModuleDefinition};
    pub use serde::{Deserialize, Serialize};
    pub use serde_json::{json, Value as JsonValue};
}

// Re-export key types at crate root
pub use context::ExecutionContext;
pub use error::{ErrorBody, HandlerError, UnsupportedOperation};
pub use handler::{handler_fn, Handler, HandlerFuture, SharedHandler};
pub use manifest::{HandlerManifest, ModuleDefinition};
