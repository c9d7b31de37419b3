//! Worker configuration
//!
//! The worker receives three inputs from its external launcher: the
//! bundler's output directory, the handler specifier, and the bridge base
//! URL. Function metadata comes from the same environment variables the
//! emulated runtime uses. Everything else is a tunable with a default.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

use bridge_worker_sdk::context::FUNCTION_VERSION;

/// Bundler output directory root
pub const ENV_OUT_DIR: &str = "BRIDGE_WORKER_OUT_DIR";
/// Handler specifier, `dir/name.export`
pub const ENV_HANDLER: &str = "BRIDGE_WORKER_HANDLER";
/// Bridge base URL
pub const ENV_URL: &str = "BRIDGE_WORKER_URL";
/// Idle watchdog window override, seconds
pub const ENV_IDLE_TIMEOUT_SECS: &str = "BRIDGE_WORKER_IDLE_TIMEOUT_SECS";
/// Report retry delay override, milliseconds
pub const ENV_REPORT_RETRY_MS: &str = "BRIDGE_WORKER_REPORT_RETRY_MS";

/// A full poll-execute-report cycle must complete within this window
pub const DEFAULT_IDLE_WINDOW: Duration = Duration::from_secs(15 * 60);
/// Fixed delay between result-delivery attempts
pub const DEFAULT_REPORT_RETRY_DELAY: Duration = Duration::from_millis(500);

/// Errors loading configuration from the environment
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    MissingVar(&'static str),

    #[error("invalid bridge URL in {var}: {source}")]
    InvalidUrl {
        var: &'static str,
        #[source]
        source: url::ParseError,
    },
}

/// Immutable process input, supplied once at startup
#[derive(Debug, Clone)]
pub struct WorkerInput {
    /// Root of the bundler's output directory
    pub out_dir: PathBuf,

    /// Handler specifier: relative path plus exported-symbol suffix
    pub handler: String,

    /// Base URL of the local bridge
    pub bridge_url: Url,
}

/// Static function metadata baked into every execution context
#[derive(Debug, Clone)]
pub struct FunctionMetadata {
    pub function_name: String,
    pub memory_limit_in_mb: String,
    pub function_version: String,
}

impl FunctionMetadata {
    /// Read metadata from the emulated runtime's environment variables
    pub fn from_env() -> Self {
        Self {
            function_name: env::var("AWS_LAMBDA_FUNCTION_NAME")
                .unwrap_or_else(|_| "local".to_string()),
            memory_limit_in_mb: env::var("AWS_LAMBDA_FUNCTION_MEMORY_SIZE")
                .unwrap_or_else(|_| "128".to_string()),
            function_version: FUNCTION_VERSION.to_string(),
        }
    }
}

/// Complete worker configuration
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub input: WorkerInput,
    pub metadata: FunctionMetadata,

    /// Idle watchdog window
    pub idle_window: Duration,

    /// Fixed delay between report delivery attempts
    pub report_retry_delay: Duration,
}

impl WorkerConfig {
    /// Build a configuration with default tunables
    pub fn new(input: WorkerInput, metadata: FunctionMetadata) -> Self {
        Self {
            input,
            metadata,
            idle_window: DEFAULT_IDLE_WINDOW,
            report_retry_delay: DEFAULT_REPORT_RETRY_DELAY,
        }
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let out_dir = env::var(ENV_OUT_DIR)
            .map(PathBuf::from)
            .map_err(|_| ConfigError::MissingVar(ENV_OUT_DIR))?;
        let handler = env::var(ENV_HANDLER).map_err(|_| ConfigError::MissingVar(ENV_HANDLER))?;
        let raw_url = env::var(ENV_URL).map_err(|_| ConfigError::MissingVar(ENV_URL))?;
        let bridge_url = Url::parse(&raw_url).map_err(|source| ConfigError::InvalidUrl {
            var: ENV_URL,
            source,
        })?;

        let mut config = Self::new(
            WorkerInput {
                out_dir,
                handler,
                bridge_url,
            },
            FunctionMetadata::from_env(),
        );

        if let Some(secs) = env::var(ENV_IDLE_TIMEOUT_SECS)
            .ok()
            .and_then(|s| s.parse().ok())
        {
            config.idle_window = Duration::from_secs(secs);
        }
        if let Some(ms) = env::var(ENV_REPORT_RETRY_MS)
            .ok()
            .and_then(|s| s.parse().ok())
        {
            config.report_retry_delay = Duration::from_millis(ms);
        }

        Ok(config)
    }

    /// Override the idle watchdog window
    pub fn with_idle_window(mut self, window: Duration) -> Self {
        self.idle_window = window;
        self
    }

    /// Override the report retry delay
    pub fn with_report_retry_delay(mut self, delay: Duration) -> Self {
        self.report_retry_delay = delay;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Single test so the environment mutations don't race across threads
    #[test]
    fn test_from_env() {
        env::remove_var(ENV_OUT_DIR);
        env::remove_var(ENV_HANDLER);
        env::remove_var(ENV_URL);

        match WorkerConfig::from_env() {
            Err(ConfigError::MissingVar(var)) => assert_eq!(var, ENV_OUT_DIR),
            other => panic!("expected MissingVar, got {other:?}"),
        }

        env::set_var(ENV_OUT_DIR, "/build");
        env::set_var(ENV_HANDLER, "src/index.handler");
        env::set_var(ENV_URL, "http://localhost:9000");
        env::set_var(ENV_IDLE_TIMEOUT_SECS, "60");
        env::set_var(ENV_REPORT_RETRY_MS, "250");

        let config = WorkerConfig::from_env().unwrap();
        assert_eq!(config.input.out_dir, PathBuf::from("/build"));
        assert_eq!(config.input.handler, "src/index.handler");
        assert_eq!(config.input.bridge_url.as_str(), "http://localhost:9000/");
        assert_eq!(config.idle_window, Duration::from_secs(60));
        assert_eq!(config.report_retry_delay, Duration::from_millis(250));

        env::remove_var(ENV_OUT_DIR);
        env::remove_var(ENV_HANDLER);
        env::remove_var(ENV_URL);
        env::remove_var(ENV_IDLE_TIMEOUT_SECS);
        env::remove_var(ENV_REPORT_RETRY_MS);
    }
}
