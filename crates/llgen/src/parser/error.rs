use std::fmt;

use llgen_lex::ScanError;
use thiserror::Error;

/// Coarse classification shared with generated parsers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FailureKind {
    Scan,
    Parse,
    TrailingInput,
}

/// Expected tokens of every alternative, printed as `[a, b | c]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Alternatives(pub Vec<Vec<String>>);

impl fmt::Display for Alternatives {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let alternatives: Vec<String> = self.0.iter().map(|alt| alt.join(", ")).collect();
        write!(f, "[{}]", alternatives.join(" | "))
    }
}

/// Token name used for the end of input in messages.
pub const EOF: &str = "EOF";

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error(transparent)]
    Scan(#[from] ScanError),
    #[error("Parse Error, line {line}: Expected token {expected}, but found token {found}:{text}")]
    UnexpectedToken {
        line: usize,
        expected: String,
        found: String,
        text: String,
    },
    #[error("Parse Error, line {line}: while parsing {nonterminal} expected one of {expected}, but found token {found}:{text}")]
    NoAlternative {
        line: usize,
        nonterminal: String,
        expected: Alternatives,
        found: String,
        text: String,
    },
    #[error("Parse Error, line {line}: Couldn't parse all of input. Next token: {found}:{text}")]
    TrailingInput {
        line: usize,
        found: String,
        text: String,
    },
}

impl ParseError {
    pub fn kind(&self) -> FailureKind {
        match self {
            ParseError::Scan(_) => FailureKind::Scan,
            ParseError::UnexpectedToken { .. } | ParseError::NoAlternative { .. } => {
                FailureKind::Parse
            }
            ParseError::TrailingInput { .. } => FailureKind::TrailingInput,
        }
    }

    pub fn line(&self) -> usize {
        match self {
            ParseError::Scan(err) => err.line,
            ParseError::UnexpectedToken { line, .. }
            | ParseError::NoAlternative { line, .. }
            | ParseError::TrailingInput { line, .. } => *line,
        }
    }

    /// Every token name that would have been accepted at the failure point.
    pub fn expected_tokens(&self) -> Vec<&str> {
        match self {
            ParseError::UnexpectedToken { expected, .. } => vec![expected.as_str()],
            ParseError::NoAlternative { expected, .. } => {
                let mut names: Vec<&str> = Vec::new();
                for name in expected.0.iter().flatten() {
                    if !names.contains(&name.as_str()) {
                        names.push(name.as_str());
                    }
                }
                names
            }
            _ => Vec::new(),
        }
    }
}
