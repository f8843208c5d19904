// packages/responsemock/src/utils/mod.rs
//! Common utilities: configuration and error types

pub mod config;
pub mod errors;

pub use config::{EngineOptions, SessionConfig};
pub use errors::{MockError, Result};
