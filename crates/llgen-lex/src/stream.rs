use thiserror::Error;

use crate::{table::LexTable, PREVIEW_LEN};

#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("Lexer Error, line {line}: No matching token found. Remaining input: {preview} ....")]
pub struct ScanError {
    pub line: usize,
    pub preview: String,
}

/// A scanned, non-whitespace token. `terminal` indexes `LexTable::terminal_rules`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Token<'a> {
    pub terminal: usize,
    pub name: &'a str,
    pub text: &'a str,
    pub line: usize,
}

// Scans on demand: the input is only matched against the table when the consumer asks for
// the next token, so a failure past the point where parsing stops is never reported.
pub struct TokenStream<'a> {
    table: &'a LexTable,
    input: &'a str,
    cursor: usize,
    line: usize,
    lookahead: Option<Token<'a>>,
    failed: bool,
}

impl<'a> TokenStream<'a> {
    pub fn new(table: &'a LexTable, input: &'a str) -> Self {
        Self {
            table,
            input,
            cursor: 0,
            line: 1,
            lookahead: None,
            failed: false,
        }
    }

    fn fill(&mut self) -> Result<(), ScanError> {
        let (table, input) = (self.table, self.input);
        while self.lookahead.is_none() && self.cursor < input.len() {
            let rest = &input[self.cursor..];
            let Some((rule, text)) = table.match_prefix(rest) else {
                return Err(ScanError {
                    line: self.line,
                    preview: rest.chars().take(PREVIEW_LEN).collect(),
                });
            };
            self.cursor += text.len();
            if rule == 0 {
                self.line += text.matches('\n').count();
                continue;
            }
            self.lookahead = Some(Token {
                terminal: rule - 1,
                name: table.rules()[rule].name.as_str(),
                text,
                line: self.line,
            });
        }
        Ok(())
    }

    /// The next token without consuming it; `None` at end of input.
    pub fn peek(&mut self) -> Result<Option<Token<'a>>, ScanError> {
        self.fill()?;
        Ok(self.lookahead)
    }

    pub fn next_token(&mut self) -> Result<Option<Token<'a>>, ScanError> {
        let token = self.peek()?;
        self.lookahead = None;
        Ok(token)
    }

    /// Line of the lookahead once `peek` has run. Newlines are only counted in skipped
    /// whitespace.
    pub fn line(&self) -> usize {
        self.line
    }

    /// Input not yet scanned, excluding a peeked token.
    pub fn remaining(&self) -> &'a str {
        let input = self.input;
        &input[self.cursor..]
    }
}

impl<'a> Iterator for TokenStream<'a> {
    type Item = Result<Token<'a>, ScanError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.next_token() {
            Ok(token) => token.map(Ok),
            Err(err) => {
                self.failed = true;
                Some(Err(err))
            }
        }
    }
}
