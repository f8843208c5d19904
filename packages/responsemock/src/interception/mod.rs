// packages/responsemock/src/interception/mod.rs
//! Request interception layer
//!
//! This module provides the engine that serves directives:
//!
//! - **Routing Table**: ordered directive registry and passthrough prefixes
//! - **HTTP Interceptor**: loopback proxy answering from the routing table
//! - **Session**: runtime, proxy and call log for one mocking scope
//! - **Env Proxy**: process-wide `HTTP_PROXY` export
//!
//! # Architecture
//!
//! ```text
//! Code Under Test (Unmodified)
//!     │
//!     └─ HTTP Request → HTTP Interceptor ─┬─ Directive match → Stubbed response
//!                                         ├─ Passthrough     → Real destination
//!                                         └─ No match        → 501 + recorded
//! ```

pub mod env_proxy;
pub mod http_interceptor;
pub mod routing_table;
pub mod session;

// Re-export commonly used types
pub use env_proxy::EnvProxyGuard;
pub use http_interceptor::{Call, CallOutcome, HttpInterceptor};
pub use routing_table::{Route, RoutingTable};
pub use session::MockSession;
