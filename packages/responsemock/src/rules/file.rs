// packages/responsemock/src/rules/file.rs
//! Rule files
//!
//! A rule file holds several text rules separated by lines consisting
//! solely of `---`.

use crate::rules::rule::{Rule, RuleSet};
use crate::utils::errors::Result;
use std::path::Path;
use tracing::debug;

/// Line separating rules in a rule file
pub const RULE_SEPARATOR: &str = "---";

/// Split rule file contents into rules; blank chunks are skipped
pub fn split_rules(contents: &str) -> RuleSet {
    let mut rules = RuleSet::new();
    let mut current = String::new();

    for line in contents.lines() {
        if line.trim() == RULE_SEPARATOR {
            push_chunk(&mut rules, &mut current);
        } else {
            current.push_str(line);
            current.push('\n');
        }
    }
    push_chunk(&mut rules, &mut current);

    rules
}

fn push_chunk(rules: &mut RuleSet, chunk: &mut String) {
    let text = std::mem::take(chunk);
    if !text.trim().is_empty() {
        rules.push(Rule::Text(text));
    }
}

/// Read rules from a file
pub fn load_rules(path: &Path) -> Result<RuleSet> {
    let contents = std::fs::read_to_string(path)?;
    let rules = split_rules(&contents);
    debug!("Loaded {} rules from {:?}", rules.len(), path);
    Ok(rules)
}

/// Read several rule files into one set, in order
pub fn load_rule_files<P: AsRef<Path>>(paths: &[P]) -> Result<RuleSet> {
    let mut rules = RuleSet::new();
    for path in paths {
        for rule in load_rules(path.as_ref())? {
            rules.push(rule);
        }
    }
    Ok(rules)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_split_rules() {
        let rules = split_rules(
            "GET http://a.b -> 200 :Nice\n\
             ---\n\
             \n\
             ---\n\
             GET http://x\n\
             Allow: GET\n\
             \n\
             -> 200 :OK\n",
        );
        assert_eq!(rules.len(), 2);

        let directives = rules.directives().unwrap();
        assert_eq!(directives[0].url, "http://a.b");
        assert_eq!(directives[1].header("Allow"), Some("GET"));
    }

    #[test]
    fn test_load_rules() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "POST http://d -> 400 :{{\"key\":\"value\"}}").unwrap();

        let rules = load_rules(file.path()).unwrap();
        let directives = rules.directives().unwrap();
        assert_eq!(directives.len(), 1);
        assert_eq!(directives[0].body.as_text(), Some(r#"{"key":"value"}"#));
    }

    #[test]
    fn test_load_rule_files_keeps_order() {
        let mut first = tempfile::NamedTempFile::new().unwrap();
        writeln!(first, "GET http://a.b/1 -> 200 :one\n---\nGET http://a.b/2 -> 200 :two").unwrap();
        let mut second = tempfile::NamedTempFile::new().unwrap();
        writeln!(second, "GET http://a.b/3 -> 201 :three").unwrap();

        let rules = load_rule_files(&[first.path(), second.path()]).unwrap();
        let urls: Vec<String> = rules
            .directives()
            .unwrap()
            .into_iter()
            .map(|directive| directive.url)
            .collect();
        assert_eq!(urls, ["http://a.b/1", "http://a.b/2", "http://a.b/3"]);
    }

    #[test]
    fn test_missing_file() {
        let err = load_rules(Path::new("/nonexistent/rules.txt")).unwrap_err();
        assert!(matches!(err, crate::MockError::Io(_)));
    }
}
