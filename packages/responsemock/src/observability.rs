// packages/responsemock/src/observability.rs
//! Tracing setup
//!
//! Log level comes from `RUST_LOG` (default `info`). Logs go to stderr so
//! stdout stays free for command output.

use crate::utils::errors::{MockError, Result};
use tracing_subscriber::EnvFilter;

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Initialize tracing with human-readable output
pub fn init_tracing() -> Result<()> {
    init_tracing_with(LogFormat::Text)
}

/// Initialize tracing with the given output format
pub fn init_tracing_with(format: LogFormat) -> Result<()> {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .with_target(false);

    let result = match format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };

    result.map_err(|e| MockError::ConfigError(format!("Failed to initialize tracing: {}", e)))
}

/// Route logs through the test harness; safe to call from every test
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_test_writer()
        .try_init();
}
