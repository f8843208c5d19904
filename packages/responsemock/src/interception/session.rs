// packages/responsemock/src/interception/session.rs
//! Interception session
//!
//! A session owns a small tokio runtime driving the [`HttpInterceptor`],
//! the routing table and the call log. Dropping the session stops the
//! proxy, unregisters every directive and evaluates the configured
//! assertions.

use crate::interception::env_proxy::EnvProxyGuard;
use crate::interception::http_interceptor::{
    dispatch, Call, CallLog, Dispatch, HttpInterceptor,
};
use crate::interception::routing_table::{Route, RoutingTable};
use crate::rules::{Directive, Rule};
use crate::utils::config::EngineOptions;
use crate::utils::errors::{MockError, Result};
use parking_lot::Mutex;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::runtime::Runtime;
use tokio::sync::oneshot;
use tracing::{debug, error, info};

/// Live interception session
pub struct MockSession {
    options: EngineOptions,
    routing_table: Arc<Mutex<RoutingTable>>,
    calls: CallLog,
    local_addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    runtime: Option<Runtime>,
    env_proxy: Option<EnvProxyGuard>,
}

impl MockSession {
    /// Bind the proxy and start serving
    pub fn start(options: EngineOptions) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("responsemock")
            .enable_all()
            .build()?;

        let listener = std::net::TcpListener::bind(options.listen_addr)?;
        listener.set_nonblocking(true)?;
        let local_addr = listener.local_addr()?;

        let routing_table = Arc::new(Mutex::new(RoutingTable::new(options.strict_order)));
        let calls: CallLog = Arc::new(Mutex::new(Vec::new()));

        let interceptor = {
            let _context = runtime.enter();
            Arc::new(HttpInterceptor::new(
                options.clone(),
                Arc::clone(&routing_table),
                Arc::clone(&calls),
            ))
        };

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        runtime.spawn(async move {
            match TcpListener::from_std(listener) {
                Ok(listener) => interceptor.serve(listener, shutdown_rx).await,
                Err(e) => error!("Failed to register proxy listener: {}", e),
            }
        });

        let env_proxy = options
            .export_proxy_env
            .then(|| EnvProxyGuard::install(&format!("http://{}", local_addr)));

        info!("Mock session started on {}", local_addr);

        Ok(Self {
            options,
            routing_table,
            calls,
            local_addr,
            shutdown: Some(shutdown_tx),
            runtime: Some(runtime),
            env_proxy,
        })
    }

    /// Register a directive
    pub fn register(&self, directive: Directive) {
        metrics::counter!("responsemock_directives_registered_total").increment(1);
        self.routing_table.lock().add_route(directive);
    }

    /// Parse and register a rule; returns `false` for an empty rule
    pub fn add(&self, rule: impl Into<Rule>) -> Result<bool> {
        match rule.into().parse()? {
            Some(directive) => {
                self.register(directive);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Let URLs starting with `prefix` reach the real network
    pub fn add_passthrough(&self, prefix: impl Into<String>) {
        self.routing_table.lock().add_passthrough(prefix);
    }

    /// Address the proxy listens on
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// URL to configure as the client's HTTP proxy
    pub fn proxy_url(&self) -> String {
        format!("http://{}", self.local_addr)
    }

    /// URL of `path` on the proxy itself, for clients that talk to it directly
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.local_addr, path)
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Call history so far
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    /// Requests that matched nothing
    pub fn unmatched(&self) -> Vec<Call> {
        self.calls
            .lock()
            .iter()
            .filter(|call| call.is_unmatched())
            .cloned()
            .collect()
    }

    /// Snapshot of the registered routes
    pub fn routes(&self) -> Vec<Route> {
        self.routing_table.lock().routes().to_vec()
    }

    /// Answer a request in-process, without a socket.
    /// `Ok(None)` means the URL is passthrough and should hit the network.
    pub fn respond(&self, method: &str, url: &str) -> Result<Option<Directive>> {
        match dispatch(&self.routing_table, &self.calls, method, url) {
            Dispatch::Stub(directive) => Ok(Some(directive)),
            Dispatch::Passthrough => Ok(None),
            Dispatch::Unmatched => Err(MockError::Unmatched {
                method: method.to_string(),
                url: url.to_string(),
            }),
        }
    }

    /// Tear down and report assertion failures
    pub fn close(mut self) -> Result<()> {
        self.teardown(true)
    }

    /// Tear down without evaluating assertions
    pub fn abort(mut self) {
        // Assertions are skipped, so teardown cannot fail
        let _ = self.teardown(false);
    }

    fn teardown(&mut self, verify: bool) -> Result<()> {
        let Some(runtime) = self.runtime.take() else {
            return Ok(());
        };

        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        runtime.shutdown_background();
        self.env_proxy = None;

        let outcome = if verify { self.verify() } else { Ok(()) };

        let routes = {
            let mut table = self.routing_table.lock();
            let count = table.len();
            table.clear();
            count
        };
        info!(
            "Mock session on {} closed: {} routes, {} calls",
            self.local_addr,
            routes,
            self.calls.lock().len()
        );

        outcome
    }

    fn verify(&self) -> Result<()> {
        if self.options.fail_on_unmatched {
            let requests: Vec<String> = self
                .unmatched()
                .iter()
                .map(|call| format!("{} {}", call.method, call.url))
                .collect();
            if !requests.is_empty() {
                return Err(MockError::UnmatchedRequests { requests });
            }
        }

        if self.options.assert_all_requests_are_fired {
            let routes: Vec<String> = self
                .routing_table
                .lock()
                .unfired()
                .iter()
                .map(|route| format!("{} {}", route.directive.method, route.match_url))
                .collect();
            if !routes.is_empty() {
                return Err(MockError::UnfiredDirectives { routes });
            }
        }

        debug!("Mock session assertions passed");
        Ok(())
    }
}

impl Drop for MockSession {
    fn drop(&mut self) {
        let verify = !std::thread::panicking();
        if let Err(e) = self.teardown(verify) {
            panic!("{}", e);
        }
    }
}
