// packages/responsemock/src/rules/directive.rs
//! Structured request-match / response-stub directives

use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;

/// Response headers in order of appearance
pub type Headers = IndexMap<String, String>;

/// Content type the engine applies when a directive has none
pub const DEFAULT_CONTENT_TYPE: &str = "text/plain";

/// Response body, same kind as the rule it came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Body {
    Text(String),
    Binary(Vec<u8>),
}

impl Body {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Body::Text(text) => text.as_bytes(),
            Body::Binary(bytes) => bytes,
        }
    }

    /// Text view of the body, `None` for binary bodies
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Body::Text(text) => Some(text),
            Body::Binary(_) => None,
        }
    }

    pub fn is_binary(&self) -> bool {
        matches!(self, Body::Binary(_))
    }

    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<&str> for Body {
    fn from(text: &str) -> Self {
        Body::Text(text.to_string())
    }
}

impl From<Vec<u8>> for Body {
    fn from(bytes: Vec<u8>) -> Self {
        Body::Binary(bytes)
    }
}

/// When a request matches `method` + `url`, respond with `status`, `body`
/// and `headers`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Directive {
    /// HTTP method as written in the rule
    pub method: String,

    /// Exact match target
    pub url: String,

    /// Response status code
    pub status: u16,

    /// Response body
    pub body: Body,

    /// Extra response headers; `None` rather than an empty map
    pub headers: Option<Headers>,

    /// Explicit `Content-Type`, kept apart from `headers`
    pub content_type: Option<String>,
}

impl Directive {
    pub fn new(
        method: impl Into<String>,
        url: impl Into<String>,
        status: u16,
        body: impl Into<Body>,
    ) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
            status,
            body: body.into(),
            headers: None,
            content_type: None,
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .get_or_insert_with(Headers::new)
            .insert(name.into(), value.into());
        self
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Look up a declared header by exact name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .as_ref()
            .and_then(|headers| headers.get(name))
            .map(String::as_str)
    }

    /// Content type the response is served with
    pub fn effective_content_type(&self) -> &str {
        self.content_type.as_deref().unwrap_or(DEFAULT_CONTENT_TYPE)
    }
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} -> {}", self.method, self.url, self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let directive = Directive::new("GET", "http://a.b", 200, "Nice")
            .with_header("Allow", "GET")
            .with_content_type("application/json");

        assert_eq!(directive.header("Allow"), Some("GET"));
        assert_eq!(directive.header("allow"), None);
        assert_eq!(directive.effective_content_type(), "application/json");
        assert_eq!(directive.to_string(), "GET http://a.b -> 200");
    }

    #[test]
    fn test_default_content_type() {
        let directive = Directive::new("GET", "http://a.b", 204, "");
        assert_eq!(directive.effective_content_type(), DEFAULT_CONTENT_TYPE);
        assert!(directive.headers.is_none());
        assert!(directive.body.is_empty());
    }

    #[test]
    fn test_body_kinds() {
        let text = Body::from("тест");
        let binary = Body::from("тест".as_bytes().to_vec());
        assert_eq!(text.as_bytes(), binary.as_bytes());
        assert_eq!(text.as_text(), Some("тест"));
        assert!(binary.as_text().is_none());
        assert!(binary.is_binary());
    }

    #[test]
    fn test_serializes_headers_in_order() {
        let directive = Directive::new("GET", "http://x", 200, "OK")
            .with_header("Allow", "GET, HEAD")
            .with_header("Content-Language", "ru");
        let json = serde_json::to_string(&directive).unwrap();
        assert!(json.contains(r#""headers":{"Allow":"GET, HEAD","Content-Language":"ru"}"#));
        assert!(json.contains(r#""body":"OK""#));
    }
}
