// packages/responsemock/src/utils/errors.rs
//! Error types for rule parsing and mock sessions

use std::num::ParseIntError;
use thiserror::Error;

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, MockError>;

/// Errors raised while parsing rules or running a mock session
#[derive(Debug, Error)]
pub enum MockError {
    /// Rule text has no `->` separating the request from the response
    #[error("Rule has no `->` response marker: {rule:?}")]
    MissingArrow { rule: String },

    /// Request line did not split into exactly method and URL
    #[error("Unsupported directives: {tokens:?}. Expected: HTTP_METHOD URL")]
    MalformedDirectiveLine { tokens: Vec<String> },

    /// Status segment is not an integer
    #[error("Invalid status {text:?}: {source}")]
    MalformedStatus {
        text: String,
        #[source]
        source: ParseIntError,
    },

    /// Status is an integer but not a usable HTTP status code
    #[error("Status code out of range: {0}")]
    InvalidStatus(u16),

    /// A request matched neither a directive nor a passthrough prefix
    #[error("Connection refused by responsemock: {method} {url}")]
    Unmatched { method: String, url: String },

    /// Teardown found directives that were never served
    #[error("Not all requests have been executed: {routes:?}")]
    UnfiredDirectives { routes: Vec<String> },

    /// Teardown found requests that matched nothing
    #[error("Requests did not match any rule: {requests:?}")]
    UnmatchedRequests { requests: Vec<String> },

    #[error("Interception failed: {0}")]
    InterceptionFailed(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl MockError {
    /// Whether this error comes from malformed rule text
    pub fn is_rule_error(&self) -> bool {
        matches!(
            self,
            MockError::MissingArrow { .. }
                | MockError::MalformedDirectiveLine { .. }
                | MockError::MalformedStatus { .. }
                | MockError::InvalidStatus(_)
        )
    }
}

impl From<config::ConfigError> for MockError {
    fn from(e: config::ConfigError) -> Self {
        MockError::ConfigError(e.to_string())
    }
}
