//! Build-time handler manifest
//!
//! The build pipeline emits a manifest mapping each bundled module key
//! (e.g. `src/index`) to its named handler exports. At startup the worker
//! resolves the handler specifier against this manifest by lookup; there is
//! no runtime introspection of loaded code.
//!
//! A module may carry an init hook, mirroring module-level initialization
//! in the bundled source: the worker runs it exactly once, at load time,
//! before any invocation is processed.

use std::collections::HashMap;

use crate::handler::SharedHandler;

type InitHook = Box<dyn FnOnce() + Send>;

/// One bundled module: an optional init hook plus its named exports
#[derive(Default)]
pub struct ModuleDefinition {
    init: Option<InitHook>,
    exports: HashMap<String, SharedHandler>,
}

impl ModuleDefinition {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach module-level initialization, run once at load time
    pub fn on_init(mut self, f: impl FnOnce() + Send + 'static) -> Self {
        self.init = Some(Box::new(f));
        self
    }

    /// Register a named export
    pub fn export(mut self, name: impl Into<String>, handler: SharedHandler) -> Self {
        self.exports.insert(name.into(), handler);
        self
    }

    /// Take the init hook, leaving the module without one.
    /// Returns `None` on every call after the first.
    pub fn take_init(&mut self) -> Option<InitHook> {
        self.init.take()
    }

    /// Look up an export by name
    pub fn get(&self, name: &str) -> Option<SharedHandler> {
        self.exports.get(name).cloned()
    }

    /// Names of all registered exports, sorted for stable diagnostics
    pub fn export_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.exports.keys().cloned().collect();
        names.sort();
        names
    }
}

impl std::fmt::Debug for ModuleDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleDefinition")
            .field("has_init", &self.init.is_some())
            .field("exports", &self.export_names())
            .finish()
    }
}

/// The full manifest for a handler bundle
#[derive(Default)]
pub struct HandlerManifest {
    modules: HashMap<String, ModuleDefinition>,
}

impl HandlerManifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a module under its bundle-relative key (no extension)
    pub fn module(mut self, key: impl Into<String>, def: ModuleDefinition) -> Self {
        self.modules.insert(key.into(), def);
        self
    }

    /// Mutable access to a registered module
    pub fn module_mut(&mut self, key: &str) -> Option<&mut ModuleDefinition> {
        self.modules.get_mut(key)
    }

    /// Whether a module key is registered
    pub fn contains(&self, key: &str) -> bool {
        self.modules.contains_key(key)
    }
}

impl std::fmt::Debug for HandlerManifest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut keys: Vec<&String> = self.modules.keys().collect();
        keys.sort();
        f.debug_struct("HandlerManifest").field("modules", &keys).finish()
    }
}
