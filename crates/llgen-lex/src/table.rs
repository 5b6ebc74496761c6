// Ordered (name, pattern) rules. Scanning tries them in order at each position and takes
// the first rule that matches there, so keywords have to be declared before the generic
// patterns that would otherwise shadow them.

use regex::Regex;
use thiserror::Error;

use crate::stream::TokenStream;

pub const WHITESPACE: &str = "whitespace";
pub const WHITESPACE_PATTERN: &str = r"\s+";

#[derive(Debug, Error)]
pub enum LexError {
    #[error("invalid pattern `{pattern}` for token `{name}`")]
    InvalidPattern {
        name: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

impl PartialEq for LexError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (
                LexError::InvalidPattern { name, pattern, .. },
                LexError::InvalidPattern {
                    name: other_name,
                    pattern: other_pattern,
                    ..
                },
            ) => name == other_name && pattern == other_pattern,
        }
    }
}

impl Eq for LexError {}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LexRule {
    pub name: String,
    pub pattern: String,
}

#[derive(Debug)]
pub struct LexTable {
    rules: Vec<LexRule>,
    // one anchored regex per rule, same order as `rules`
    matchers: Vec<Regex>,
}

impl LexTable {
    /// Builds the table from terminals in declaration order, preceded by the implicit
    /// whitespace rule.
    pub fn new<I, N, P>(terminals: I) -> Result<LexTable, LexError>
    where
        I: IntoIterator<Item = (N, P)>,
        N: Into<String>,
        P: Into<String>,
    {
        let mut rules = vec![LexRule {
            name: WHITESPACE.to_string(),
            pattern: WHITESPACE_PATTERN.to_string(),
        }];
        rules.extend(terminals.into_iter().map(|(name, pattern)| LexRule {
            name: name.into(),
            pattern: pattern.into(),
        }));

        let mut matchers = Vec::with_capacity(rules.len());
        for rule in &rules {
            let anchored = format!(r"\A(?:{})", rule.pattern);
            let matcher = Regex::new(&anchored).map_err(|source| LexError::InvalidPattern {
                name: rule.name.clone(),
                pattern: rule.pattern.clone(),
                source,
            })?;
            matchers.push(matcher);
        }

        log::debug!("built lexical table with {} rules", rules.len());
        Ok(LexTable { rules, matchers })
    }

    pub fn rules(&self) -> &[LexRule] {
        &self.rules
    }

    /// The declared terminals, without the whitespace rule. Index `i` here is terminal `i`.
    pub fn terminal_rules(&self) -> &[LexRule] {
        &self.rules[1..]
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// First rule (by table position) with a non-empty match at the start of `input`,
    /// together with the matched text.
    pub fn match_prefix<'a>(&self, input: &'a str) -> Option<(usize, &'a str)> {
        self.matchers.iter().enumerate().find_map(|(rule, matcher)| {
            matcher
                .find(input)
                .filter(|m| m.end() > 0)
                .map(|m| (rule, &input[..m.end()]))
        })
    }

    pub fn tokenize<'a>(&'a self, input: &'a str) -> TokenStream<'a> {
        TokenStream::new(self, input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_rule_comes_first() {
        let table = LexTable::new([("num", "[0-9]+"), ("plus", r"\+")]).expect("valid table");
        let names: Vec<&str> = table.rules().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec![WHITESPACE, "num", "plus"]);
        assert_eq!(table.terminal_rules().len(), 2);
    }

    #[test]
    fn first_matching_rule_wins() {
        let rule_name = |table: &LexTable, input: &str| {
            table
                .match_prefix(input)
                .map(|(rule, text)| (table.rules()[rule].name.clone(), text.to_string()))
        };

        let shadowed = LexTable::new([("name", r"\w+"), ("if", "if")]).expect("valid table");
        assert_eq!(
            rule_name(&shadowed, "if x"),
            Some(("name".to_string(), "if".to_string()))
        );

        let ordered = LexTable::new([("if", "if"), ("name", r"\w+")]).expect("valid table");
        assert_eq!(
            rule_name(&ordered, "if x"),
            Some(("if".to_string(), "if".to_string()))
        );
        // not the longest match either: `if` wins over `ifx` as a `name`
        assert_eq!(
            rule_name(&ordered, "ifx"),
            Some(("if".to_string(), "if".to_string()))
        );
    }

    #[test]
    fn empty_matches_are_ignored() {
        let table = LexTable::new([("as", "a*"), ("b", "b")]).expect("valid table");
        assert_eq!(table.match_prefix("b"), Some((2, "b")));
        assert_eq!(table.match_prefix("c"), None);
    }

    #[test]
    fn bad_pattern_names_the_token() {
        let err = LexTable::new([("broken", "(")]).expect_err("pattern should not compile");
        let LexError::InvalidPattern { name, .. } = err;
        assert_eq!(name, "broken");
    }
}
