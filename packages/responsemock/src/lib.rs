// packages/responsemock/src/lib.rs
//! responsemock
//!
//! Declarative rules for stubbing HTTP responses in tests. A rule such as
//! `GET http://a.b -> 200 :Nice` is parsed into a [`Directive`] and served by
//! a loopback proxy for the duration of a scope.
//!
//! # Architecture
//!
//! The library is structured into several key modules:
//!
//! - **rules**: rule grammar, parser and directives
//! - **controller**: scoped mocking sessions built from rule sets
//! - **interception**: proxy, routing table and session teardown
//! - **observability**: tracing setup
//! - **utils**: configuration and error types

// Public module exports
pub mod controller;
pub mod interception;
pub mod observability;
pub mod rules;
pub mod utils;

// Re-export commonly used types
pub use controller::{response_mock, with_response_mock, MockGuard};
pub use interception::{Call, CallOutcome, MockSession};
pub use rules::{parse_rule, Body, Directive, Headers, Rule, RuleSet};
pub use utils::config::{EngineOptions, SessionConfig};
pub use utils::errors::{MockError, Result};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
