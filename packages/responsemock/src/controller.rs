// packages/responsemock/src/controller.rs
//! Mock session controller
//!
//! Turns a rule set into a live [`MockSession`] for the duration of a scope:
//!
//! ```no_run
//! use responsemock::{with_response_mock, SessionConfig};
//!
//! let outcome = with_response_mock(
//!     [
//!         "GET http://a.b -> 200 :Nice",
//!         r#"POST http://some.domain -> 400 :{"key":"value"}"#,
//!         "
//!         GET http://some.domain
//!
//!         Allow: GET, HEAD
//!         Content-Language: ru
//!
//!         -> 200 :OK
//!         ",
//!     ],
//!     SessionConfig::default(),
//!     |mock| {
//!         if let Some(mock) = mock {
//!             mock.add_passthrough("http://c.d");
//!         }
//!         // code under test makes its requests here
//!     },
//! );
//! # let _ = outcome;
//! ```

use crate::interception::MockSession;
use crate::rules::RuleSet;
use crate::utils::config::SessionConfig;
use crate::utils::errors::Result;
use tracing::{debug, info};

/// Scope guard for one mocking scope
pub enum MockGuard {
    /// Interception is active
    Active(MockSession),

    /// Mocking disabled; traffic is untouched
    Bypassed,
}

impl MockGuard {
    /// Live session, `None` when bypassed
    pub fn session(&self) -> Option<&MockSession> {
        match self {
            MockGuard::Active(session) => Some(session),
            MockGuard::Bypassed => None,
        }
    }

    pub fn is_bypassed(&self) -> bool {
        matches!(self, MockGuard::Bypassed)
    }

    /// Let URLs starting with `prefix` reach the network; no-op when bypassed
    pub fn add_passthrough(&self, prefix: impl Into<String>) {
        if let MockGuard::Active(session) = self {
            session.add_passthrough(prefix);
        }
    }

    /// Proxy URL of the live session
    pub fn proxy_url(&self) -> Option<String> {
        self.session().map(MockSession::proxy_url)
    }

    /// Tear down and report assertion failures
    pub fn close(self) -> Result<()> {
        match self {
            MockGuard::Active(session) => session.close(),
            MockGuard::Bypassed => Ok(()),
        }
    }
}

/// Open a mocking scope for `rules`.
///
/// Each non-empty rule is parsed and registered in order. A malformed rule
/// aborts the session and returns the parse error; rules before it were
/// already registered and go away with the session.
pub fn response_mock(rules: impl Into<RuleSet>, config: SessionConfig) -> Result<MockGuard> {
    if config.bypass {
        info!("Response mocking bypassed");
        return Ok(MockGuard::Bypassed);
    }

    let rules = rules.into();
    let session = MockSession::start(config.engine)?;

    for rule in &rules {
        match rule.parse() {
            Ok(Some(directive)) => session.register(directive),
            Ok(None) => debug!("Skipping empty rule"),
            Err(e) => {
                session.abort();
                return Err(e);
            }
        }
    }

    debug!("Registered {} rules", rules.len());
    Ok(MockGuard::Active(session))
}

/// Run `body` inside a mocking scope and tear it down afterwards.
///
/// `body` receives the live session, or `None` when bypassed. Teardown
/// assertion failures are returned as `Err`; if `body` panics the session is
/// still torn down, without assertions.
pub fn with_response_mock<T>(
    rules: impl Into<RuleSet>,
    config: SessionConfig,
    body: impl FnOnce(Option<&MockSession>) -> T,
) -> Result<T> {
    let guard = response_mock(rules, config)?;
    let value = body(guard.session());
    guard.close()?;
    Ok(value)
}
