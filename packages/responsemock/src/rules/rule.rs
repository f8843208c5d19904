// packages/responsemock/src/rules/rule.rs
//! Rule inputs and ordered rule sets

use crate::rules::directive::Directive;
use crate::rules::parser;
use crate::utils::errors::Result;

/// One stubbing rule, written either as text or as raw bytes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    /// Text rule; body stays text
    Text(String),

    /// Binary rule; body stays raw bytes
    Binary(Vec<u8>),
}

impl Rule {
    /// Empty rules are placeholders and produce no directive
    pub fn is_empty(&self) -> bool {
        match self {
            Rule::Text(text) => text.is_empty(),
            Rule::Binary(bytes) => bytes.is_empty(),
        }
    }

    /// Parse this rule into a directive
    pub fn parse(&self) -> Result<Option<Directive>> {
        parser::parse_rule(self)
    }
}

impl From<&str> for Rule {
    fn from(text: &str) -> Self {
        Rule::Text(text.to_string())
    }
}

impl From<String> for Rule {
    fn from(text: String) -> Self {
        Rule::Text(text)
    }
}

impl From<&String> for Rule {
    fn from(text: &String) -> Self {
        Rule::Text(text.clone())
    }
}

impl From<&[u8]> for Rule {
    fn from(bytes: &[u8]) -> Self {
        Rule::Binary(bytes.to_vec())
    }
}

impl<const N: usize> From<&[u8; N]> for Rule {
    fn from(bytes: &[u8; N]) -> Self {
        Rule::Binary(bytes.to_vec())
    }
}

impl From<Vec<u8>> for Rule {
    fn from(bytes: Vec<u8>) -> Self {
        Rule::Binary(bytes)
    }
}

/// Ordered sequence of rules; registration follows this order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, rule: impl Into<Rule>) {
        self.rules.push(rule.into());
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Rule> {
        self.rules.iter()
    }

    /// Parse every rule, skipping empty ones
    pub fn directives(&self) -> Result<Vec<Directive>> {
        let mut directives = Vec::with_capacity(self.rules.len());
        for rule in &self.rules {
            if let Some(directive) = rule.parse()? {
                directives.push(directive);
            }
        }
        Ok(directives)
    }
}

impl From<Rule> for RuleSet {
    fn from(rule: Rule) -> Self {
        Self { rules: vec![rule] }
    }
}

impl From<&str> for RuleSet {
    fn from(text: &str) -> Self {
        Rule::from(text).into()
    }
}

impl From<String> for RuleSet {
    fn from(text: String) -> Self {
        Rule::from(text).into()
    }
}

impl From<&[u8]> for RuleSet {
    fn from(bytes: &[u8]) -> Self {
        Rule::from(bytes).into()
    }
}

impl<const N: usize> From<&[u8; N]> for RuleSet {
    fn from(bytes: &[u8; N]) -> Self {
        Rule::from(bytes).into()
    }
}

impl<R: Into<Rule>> From<Vec<R>> for RuleSet {
    fn from(rules: Vec<R>) -> Self {
        rules.into_iter().collect()
    }
}

impl<R: Into<Rule>, const N: usize> From<[R; N]> for RuleSet {
    fn from(rules: [R; N]) -> Self {
        rules.into_iter().collect()
    }
}

impl<R: Into<Rule>> FromIterator<R> for RuleSet {
    fn from_iter<I: IntoIterator<Item = R>>(iter: I) -> Self {
        Self {
            rules: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl IntoIterator for RuleSet {
    type Item = Rule;
    type IntoIter = std::vec::IntoIter<Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.into_iter()
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a Rule;
    type IntoIter = std::slice::Iter<'a, Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_rule_is_wrapped() {
        let set = RuleSet::from("GET http://a.b -> 200 :Nice");
        assert_eq!(set.len(), 1);
        assert_eq!(
            set.iter().next(),
            Some(&Rule::Text("GET http://a.b -> 200 :Nice".to_string()))
        );
    }

    #[test]
    fn test_binary_literal_is_binary_rule() {
        let set = RuleSet::from(b"GET http://a.b -> 200 :ok");
        assert!(matches!(set.iter().next(), Some(Rule::Binary(_))));
    }

    #[test]
    fn test_sequence_keeps_order() {
        let set = RuleSet::from(vec!["GET http://a -> 200 :1", "", "GET http://b -> 200 :2"]);
        let rules: Vec<_> = set.into_iter().collect();
        assert_eq!(rules.len(), 3);
        assert!(rules[1].is_empty());
        assert_eq!(rules[2], Rule::from("GET http://b -> 200 :2"));
    }

    #[test]
    fn test_mixed_rules_from_iterator() {
        let set: RuleSet = [
            Rule::from("GET http://a -> 200 :text"),
            Rule::from(b"GET http://b -> 200 :bytes"),
        ]
        .into_iter()
        .collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_directives_skip_empty_rules() {
        let set = RuleSet::from(["GET http://a.b -> 200 :Nice", ""]);
        let directives = set.directives().unwrap();
        assert_eq!(directives.len(), 1);
        assert_eq!(directives[0].url, "http://a.b");
    }
}
