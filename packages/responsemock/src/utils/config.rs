// packages/responsemock/src/utils/config.rs
//! Session configuration
//!
//! Defaults can be overridden from a config file and from `RESPONSEMOCK_*`
//! environment variables, e.g. `RESPONSEMOCK_BYPASS=true` or
//! `RESPONSEMOCK_ENGINE__STRICT_ORDER=true`.

use crate::utils::errors::Result;
use serde::{Deserialize, Serialize};
use std::net::{Ipv4Addr, SocketAddr};
use std::path::Path;
use tracing::debug;

/// Environment variable prefix
pub const ENV_PREFIX: &str = "RESPONSEMOCK";

/// Options forwarded to the interception engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineOptions {
    /// Fail teardown when a registered directive was never served
    pub assert_all_requests_are_fired: bool,

    /// Serve directives strictly in registration order
    pub strict_order: bool,

    /// Fail teardown when a request matched no directive
    pub fail_on_unmatched: bool,

    /// Export the proxy URL through `HTTP_PROXY`/`HTTPS_PROXY` for the scope
    pub export_proxy_env: bool,

    /// Proxy listen address
    pub listen_addr: SocketAddr,

    /// Log intercepted requests
    pub log_requests: bool,

    /// Log served responses
    pub log_responses: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            assert_all_requests_are_fired: true,
            strict_order: false,
            fail_on_unmatched: true,
            export_proxy_env: false,
            listen_addr: SocketAddr::from((Ipv4Addr::LOCALHOST, 0)),
            log_requests: true,
            log_responses: true,
        }
    }
}

/// Configuration of one mocking scope
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Disable interception entirely
    pub bypass: bool,

    /// Engine options
    pub engine: EngineOptions,
}

impl SessionConfig {
    /// Configuration that disables mocking
    pub fn bypassed() -> Self {
        Self {
            bypass: true,
            ..Self::default()
        }
    }

    /// Load configuration from the environment
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration from an optional file, then the environment
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            debug!("Loading session config from {:?}", path);
            builder = builder.add_source(config::File::from(path));
        }

        let settings = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    pub fn with_bypass(mut self, bypass: bool) -> Self {
        self.bypass = bypass;
        self
    }

    pub fn strict_order(mut self, strict: bool) -> Self {
        self.engine.strict_order = strict;
        self
    }

    pub fn assert_all_requests_are_fired(mut self, assert: bool) -> Self {
        self.engine.assert_all_requests_are_fired = assert;
        self
    }

    pub fn fail_on_unmatched(mut self, fail: bool) -> Self {
        self.engine.fail_on_unmatched = fail;
        self
    }

    pub fn export_proxy_env(mut self, export: bool) -> Self {
        self.engine.export_proxy_env = export;
        self
    }

    pub fn listen_addr(mut self, addr: SocketAddr) -> Self {
        self.engine.listen_addr = addr;
        self
    }
}
