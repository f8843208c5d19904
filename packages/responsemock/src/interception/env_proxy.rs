// packages/responsemock/src/interception/env_proxy.rs
//! Process-wide proxy environment export
//!
//! Clients that honour `HTTP_PROXY`/`HTTPS_PROXY` (reqwest, curl and most
//! others) pick up the session proxy while the guard is alive. Previous
//! values are restored on drop.

use std::env;
use std::ffi::OsString;
use tracing::debug;

/// Variables pointed at the session proxy
const PROXY_VARS: &[&str] = &["HTTP_PROXY", "http_proxy", "HTTPS_PROXY", "https_proxy"];

/// Variables cleared so no host escapes interception
const NO_PROXY_VARS: &[&str] = &["NO_PROXY", "no_proxy"];

/// Restores the proxy environment on drop
#[derive(Debug)]
pub struct EnvProxyGuard {
    saved: Vec<(&'static str, Option<OsString>)>,
}

impl EnvProxyGuard {
    /// Export `proxy_url` as the process proxy
    pub fn install(proxy_url: &str) -> Self {
        let saved = PROXY_VARS
            .iter()
            .chain(NO_PROXY_VARS)
            .map(|name| (*name, env::var_os(name)))
            .collect();

        for name in PROXY_VARS {
            env::set_var(name, proxy_url);
        }
        for name in NO_PROXY_VARS {
            env::remove_var(name);
        }

        debug!("Exported proxy environment: {}", proxy_url);
        Self { saved }
    }
}

impl Drop for EnvProxyGuard {
    fn drop(&mut self) {
        for (name, value) in self.saved.drain(..) {
            match value {
                Some(value) => env::set_var(name, value),
                None => env::remove_var(name),
            }
        }
        debug!("Restored proxy environment");
    }
}
