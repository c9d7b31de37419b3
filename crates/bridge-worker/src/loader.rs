//! Handler loading
//!
//! Resolves a handler specifier (`dir/name.export`) in two steps:
//! 1. Find the bundled module file under the output directory. Candidates
//!    are tried in a fixed extension priority order and the first existing
//!    file wins; no further candidates are checked once one exists.
//! 2. Look the module key up in the build-time [`HandlerManifest`] and take
//!    the named export from it.
//!
//! Any failure here is fatal to the worker: it is reported once through the
//! bridge's init-error endpoint and the process exits before ever polling.

use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

use bridge_worker_sdk::error::ErrorBody;
use bridge_worker_sdk::handler::SharedHandler;
use bridge_worker_sdk::manifest::HandlerManifest;

/// Candidate extensions for a bundled module, in priority order
pub const EXTENSION_PRIORITY: [&str; 4] = [".js", ".jsx", ".mjs", ".cjs"];

/// Errors resolving the handler specifier at startup
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("invalid handler specifier `{0}`: expected `dir/name.export`")]
    InvalidSpecifier(String),

    #[error("no module file found for \"{specifier}\" (searched {})", format_searched(.searched))]
    ModuleNotFound {
        specifier: String,
        searched: Vec<PathBuf>,
    },

    #[error("module \"{module}\" is not present in the handler manifest")]
    ModuleNotRegistered { module: String },

    #[error("function \"{export}\" not found in \"{specifier}\". Found {}", .found.join(", "))]
    ExportNotFound {
        export: String,
        specifier: String,
        found: Vec<String>,
    },
}

fn format_searched(searched: &[PathBuf]) -> String {
    searched
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl LoadError {
    /// Error classification used in the init-error report
    pub fn kind(&self) -> &'static str {
        match self {
            LoadError::InvalidSpecifier(_)
            | LoadError::ModuleNotFound { .. }
            | LoadError::ModuleNotRegistered { .. } => "ModuleLoadError",
            LoadError::ExportNotFound { .. } => "ExportNotFound",
        }
    }

    /// Wire form for the bridge's init-error endpoint
    pub fn to_error_body(&self) -> ErrorBody {
        ErrorBody {
            error_type: self.kind().to_string(),
            error_message: self.to_string(),
            trace: Vec::new(),
        }
    }
}

/// A parsed handler specifier: module key plus export name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerSpecifier {
    /// Bundle-relative module key without extension, e.g. `src/index`
    pub module: String,

    /// Name of the export to invoke, e.g. `handler`
    pub export: String,
}

impl HandlerSpecifier {
    /// Split `dir/name.export` at the last dot
    pub fn parse(raw: &str) -> Result<Self, LoadError> {
        let (module, export) = raw
            .rsplit_once('.')
            .ok_or_else(|| LoadError::InvalidSpecifier(raw.to_string()))?;
        if module.is_empty() || export.is_empty() {
            return Err(LoadError::InvalidSpecifier(raw.to_string()));
        }
        Ok(Self {
            module: module.to_string(),
            export: export.to_string(),
        })
    }
}

impl fmt::Display for HandlerSpecifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.module, self.export)
    }
}

/// The resolved handler, shared by the invocation loop for the process
/// lifetime
pub struct LoadedHandler {
    pub specifier: HandlerSpecifier,

    /// Module file the specifier resolved to
    pub path: PathBuf,

    pub handler: SharedHandler,
}

impl fmt::Debug for LoadedHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadedHandler")
            .field("specifier", &self.specifier)
            .field("path", &self.path)
            .finish()
    }
}

/// Find the module file for a specifier under the output directory.
/// First existing candidate in [`EXTENSION_PRIORITY`] order wins.
pub fn resolve_module_file(
    out_dir: &Path,
    specifier: &HandlerSpecifier,
) -> Result<PathBuf, LoadError> {
    let searched: Vec<PathBuf> = EXTENSION_PRIORITY
        .iter()
        .map(|ext| out_dir.join(format!("{}{}", specifier.module, ext)))
        .collect();

    searched
        .iter()
        .find(|candidate| candidate.exists())
        .cloned()
        .ok_or(LoadError::ModuleNotFound {
            specifier: specifier.to_string(),
            searched,
        })
}

/// Resolve the handler once, at startup.
///
/// Runs the module's init hook (if any) exactly once before the export
/// lookup, matching module-level initialization order in the bundled
/// source: the module loads, then the export is checked.
pub fn load(
    out_dir: &Path,
    raw_specifier: &str,
    manifest: &mut HandlerManifest,
) -> Result<LoadedHandler, LoadError> {
    let specifier = HandlerSpecifier::parse(raw_specifier)?;
    let path = resolve_module_file(out_dir, &specifier)?;

    let module = manifest
        .module_mut(&specifier.module)
        .ok_or_else(|| LoadError::ModuleNotRegistered {
            module: specifier.module.clone(),
        })?;

    if let Some(init) = module.take_init() {
        init();
    }

    let handler = module
        .get(&specifier.export)
        .ok_or_else(|| LoadError::ExportNotFound {
            export: specifier.export.clone(),
            specifier: raw_specifier.to_string(),
            found: module.export_names(),
        })?;

    Ok(LoadedHandler {
        specifier,
        path,
        handler,
    })
}
