// packages/responsemock/src/interception/routing_table.rs
//! Routing table for mapping requests to registered directives
//!
//! Matching is exact on method and on the normalised URL. Several
//! directives for the same request are served in registration order and the
//! last one keeps answering once the others are used up.

use crate::rules::Directive;
use tracing::{debug, info};
use url::Url;

/// Registered directive with its call count
#[derive(Debug, Clone)]
pub struct Route {
    /// Directive served by this route
    pub directive: Directive,

    /// Normalised URL used for matching
    pub match_url: String,

    /// Times this route has been served
    pub calls: usize,
}

impl Route {
    pub fn new(directive: Directive) -> Self {
        let match_url = normalize_url(&directive.url);
        Self {
            directive,
            match_url,
            calls: 0,
        }
    }

    /// Whether this route answers `method` + `url`
    pub fn matches(&self, method: &str, url: &str) -> bool {
        self.directive.method == method && self.match_url == normalize_url(url)
    }

    pub fn is_fired(&self) -> bool {
        self.calls > 0
    }
}

/// Canonical form of a URL; unparsable URLs are compared verbatim
pub fn normalize_url(url: &str) -> String {
    Url::parse(url)
        .map(|parsed| parsed.to_string())
        .unwrap_or_else(|_| url.to_string())
}

/// Routing table
#[derive(Debug, Default)]
pub struct RoutingTable {
    /// Routes in registration order
    routes: Vec<Route>,

    /// URL prefixes excluded from mocking
    passthrough: Vec<String>,

    /// Only the next unserved route may match
    strict_order: bool,

    /// Next route in strict mode
    cursor: usize,
}

impl RoutingTable {
    /// Create a new routing table
    pub fn new(strict_order: bool) -> Self {
        Self {
            strict_order,
            ..Self::default()
        }
    }

    /// Add a route
    pub fn add_route(&mut self, directive: Directive) {
        debug!("Adding route: {}", directive);
        self.routes.push(Route::new(directive));
    }

    /// Exclude URLs starting with `prefix` from mocking
    pub fn add_passthrough(&mut self, prefix: impl Into<String>) {
        let prefix = prefix.into();
        info!("Adding passthrough prefix: {}", prefix);
        self.passthrough.push(prefix);
    }

    pub fn is_passthrough(&self, url: &str) -> bool {
        self.passthrough.iter().any(|prefix| url.starts_with(prefix.as_str()))
    }

    /// Whether a tunnel to `host:port` is covered by a passthrough prefix
    pub fn is_passthrough_authority(&self, host: &str, port: u16) -> bool {
        self.passthrough.iter().any(|prefix| {
            Url::parse(prefix)
                .map(|parsed| {
                    parsed.host_str() == Some(host) && parsed.port_or_known_default() == Some(port)
                })
                .unwrap_or(false)
        })
    }

    /// Find the directive answering a request and count the call
    pub fn lookup(&mut self, method: &str, url: &str) -> Option<Directive> {
        let index = if self.strict_order {
            let next = self.cursor;
            let route = self.routes.get(next)?;
            if !route.matches(method, url) {
                debug!("Strict order: {} {} is not the next expected request", method, url);
                return None;
            }
            self.cursor += 1;
            next
        } else {
            let candidates: Vec<usize> = self
                .routes
                .iter()
                .enumerate()
                .filter(|(_, route)| route.matches(method, url))
                .map(|(index, _)| index)
                .collect();

            let unfired = candidates
                .iter()
                .copied()
                .find(|&index| !self.routes[index].is_fired());
            unfired.or_else(|| candidates.last().copied())?
        };

        let route = &mut self.routes[index];
        route.calls += 1;
        debug!("Matched route #{} for {} {}", index, method, url);
        Some(route.directive.clone())
    }

    /// All routes in registration order
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Routes that were never served
    pub fn unfired(&self) -> Vec<&Route> {
        self.routes.iter().filter(|route| !route.is_fired()).collect()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Clear all routes and passthrough prefixes
    pub fn clear(&mut self) {
        self.routes.clear();
        self.passthrough.clear();
        self.cursor = 0;
        debug!("Cleared all routes");
    }
}
