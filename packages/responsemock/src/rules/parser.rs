// packages/responsemock/src/rules/parser.rs
//! Rule grammar
//!
//! ```text
//! rule           := "" | directive_line ("\n" header_line)* "\n\n" "->" ws status ":" body
//! directive_line := method ws url
//! header_line    := name ":" ws value
//! status         := integer
//! body           := any_remaining_text
//! ```
//!
//! The same algorithm runs over text and over raw bytes through the
//! [`RuleSource`] trait. Text rules are dedented first so they can be written
//! as indented block literals inside test code.

use crate::rules::directive::{Body, Directive, Headers};
use crate::rules::rule::Rule;
use crate::utils::errors::{MockError, Result};
use hyper::StatusCode;
use tracing::trace;

const ARROW: &str = "->";
const COLON: &str = ":";
const CONTENT_TYPE: &str = "Content-Type";

/// Representation a rule can be written in
pub trait RuleSource {
    /// Empty value of this representation
    fn empty() -> &'static Self;

    /// Strip surrounding whitespace
    fn trim_ws(&self) -> &Self;

    /// Split around the first occurrence of `delimiter`
    fn split_at_first(&self, delimiter: &str) -> Option<(&Self, &Self)>;

    fn has_line_break(&self) -> bool;

    /// Lines without their terminators
    fn line_list(&self) -> Vec<&Self>;

    /// Split on single spaces, trim each piece, drop empty pieces
    fn words(&self) -> Vec<&Self>;

    fn is_blank(&self) -> bool;

    /// Decode to text
    fn to_text(&self) -> String;

    /// Body of the same kind as the source
    fn to_body(&self) -> Body;
}

impl RuleSource for str {
    fn empty() -> &'static Self {
        ""
    }

    fn trim_ws(&self) -> &Self {
        self.trim()
    }

    fn split_at_first(&self, delimiter: &str) -> Option<(&Self, &Self)> {
        self.split_once(delimiter)
    }

    fn has_line_break(&self) -> bool {
        self.contains('\n')
    }

    fn line_list(&self) -> Vec<&Self> {
        self.lines().collect()
    }

    fn words(&self) -> Vec<&Self> {
        self.split(' ')
            .map(str::trim)
            .filter(|word| !word.is_empty())
            .collect()
    }

    fn is_blank(&self) -> bool {
        self.is_empty()
    }

    fn to_text(&self) -> String {
        self.to_string()
    }

    fn to_body(&self) -> Body {
        Body::Text(self.to_string())
    }
}

impl RuleSource for [u8] {
    fn empty() -> &'static Self {
        &[]
    }

    fn trim_ws(&self) -> &Self {
        self.trim_ascii()
    }

    fn split_at_first(&self, delimiter: &str) -> Option<(&Self, &Self)> {
        let needle = delimiter.as_bytes();
        self.windows(needle.len())
            .position(|window| window == needle)
            .map(|at| (&self[..at], &self[at + needle.len()..]))
    }

    fn has_line_break(&self) -> bool {
        self.contains(&b'\n')
    }

    fn line_list(&self) -> Vec<&Self> {
        let mut lines: Vec<&[u8]> = self
            .split(|byte| *byte == b'\n')
            .map(|line| line.strip_suffix(b"\r").unwrap_or(line))
            .collect();
        // A trailing terminator does not open another line
        if self.ends_with(b"\n") {
            lines.pop();
        }
        lines
    }

    fn words(&self) -> Vec<&Self> {
        self.split(|byte| *byte == b' ')
            .map(<[u8]>::trim_ascii)
            .filter(|word| !word.is_empty())
            .collect()
    }

    fn is_blank(&self) -> bool {
        self.is_empty()
    }

    fn to_text(&self) -> String {
        String::from_utf8_lossy(self).into_owned()
    }

    fn to_body(&self) -> Body {
        Body::Binary(self.to_vec())
    }
}

/// Parse a rule; empty rules yield `None`
pub fn parse_rule(rule: &Rule) -> Result<Option<Directive>> {
    match rule {
        Rule::Text(text) => parse_text(text),
        Rule::Binary(bytes) => parse_bytes(bytes),
    }
}

/// Parse a text rule
pub fn parse_text(rule: &str) -> Result<Option<Directive>> {
    if rule.is_empty() {
        return Ok(None);
    }
    let dedented = dedent(rule);
    parse_source(dedented.as_str()).map(Some)
}

/// Parse a binary rule; the body keeps its raw bytes
pub fn parse_bytes(rule: &[u8]) -> Result<Option<Directive>> {
    if rule.is_empty() {
        return Ok(None);
    }
    parse_source(rule).map(Some)
}

/// Grammar shared by text and binary rules
pub fn parse_source<S: RuleSource + ?Sized + 'static>(rule: &S) -> Result<Directive> {
    let rule = rule.trim_ws();

    let (directives, response) = rule
        .split_at_first(ARROW)
        .ok_or_else(|| MockError::MissingArrow {
            rule: rule.to_text(),
        })?;

    let mut request_line = directives;
    let mut headers = Headers::new();
    let mut content_type = None;

    if directives.has_line_break() {
        let mut lines = directives.line_list().into_iter();
        if let Some(first) = lines.next() {
            request_line = first;
        }

        for line in lines {
            let line = line.trim_ws();
            if line.is_blank() {
                continue;
            }

            let (name, value) = line.split_at_first(COLON).unwrap_or((line, S::empty()));
            let value = value.trim_ws();
            if value.is_blank() {
                trace!("Dropping header line without value: {:?}", line.to_text());
                continue;
            }

            let name = name.trim_ws().to_text();
            if name == CONTENT_TYPE {
                content_type = Some(value.to_text());
            } else {
                headers.insert(name, value.to_text());
            }
        }
    }

    let (method, url) = match request_line.words().as_slice() {
        [method, url] => (method.to_text(), url.to_text()),
        tokens => {
            return Err(MockError::MalformedDirectiveLine {
                tokens: tokens.iter().map(|token| token.to_text()).collect(),
            })
        }
    };

    let (status_text, body) = response
        .split_at_first(COLON)
        .unwrap_or((response, S::empty()));
    let status_text = status_text.to_text();
    let status = status_text
        .trim()
        .parse::<u16>()
        .map_err(|source| MockError::MalformedStatus {
            text: status_text.clone(),
            source,
        })?;
    // 1xx codes are interim and cannot end an exchange
    match StatusCode::from_u16(status) {
        Ok(code) if !code.is_informational() => {}
        _ => return Err(MockError::InvalidStatus(status)),
    }

    Ok(Directive {
        method,
        url,
        status,
        body: body.to_body(),
        headers: (!headers.is_empty()).then_some(headers),
        content_type,
    })
}

/// Remove the indentation common to every non-blank line; lines made only
/// of spaces and tabs are emptied
pub fn dedent(text: &str) -> String {
    const INDENT: &[char] = &[' ', '\t'];

    let mut margin: Option<&str> = None;
    for line in text.split('\n') {
        if line.trim_matches(INDENT).is_empty() {
            continue;
        }
        let indent = &line[..line.len() - line.trim_start_matches(INDENT).len()];
        margin = Some(match margin {
            None => indent,
            Some(current) => common_prefix(current, indent),
        });
    }
    let margin = margin.unwrap_or("");

    text.split('\n')
        .map(|line| {
            if line.trim_matches(INDENT).is_empty() {
                ""
            } else {
                line.strip_prefix(margin).unwrap_or(line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn common_prefix<'a>(a: &'a str, b: &str) -> &'a str {
    let len = a
        .bytes()
        .zip(b.bytes())
        .take_while(|(x, y)| x == y)
        .count();
    &a[..len]
}
