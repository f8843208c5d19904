// packages/responsemock/src/rules/mod.rs
//! Rule language
//!
//! Rules describe an expected outbound call and its canned response:
//!
//! ```text
//! GET http://a.b -> 200 :Nice
//!
//! GET https://some.domain
//! Allow: GET, HEAD
//! Content-Language: ru
//!
//! -> 200 :OK
//! ```
//!
//! - **Rule / RuleSet**: text or binary rule inputs
//! - **Parser**: rule text to [`Directive`]
//! - **Directive**: method, URL, status, body, headers, content type
//! - **File**: `---` separated rule files

pub mod directive;
pub mod file;
pub mod parser;
pub mod rule;

// Re-export commonly used types
pub use directive::{Body, Directive, Headers, DEFAULT_CONTENT_TYPE};
pub use file::{load_rule_files, load_rules, split_rules};
pub use parser::{parse_bytes, parse_rule, parse_text};
pub use rule::{Rule, RuleSet};
