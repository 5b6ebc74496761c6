// Recursive descent over the prediction table: one call per nonterminal, one token of
// lookahead, tokens scanned only when the parse asks for them.

use llgen_lex::{Token, TokenStream};

use super::{
    error::{Alternatives, ParseError, EOF},
    ll1::Selection,
    tree::Value,
};
use crate::{
    grammar::{NontermIdx, ProdIdx, Symbol, TermIdx},
    CompiledGrammar,
};

/// Hooks for tracing a parse. Both default to doing nothing.
pub trait ParseObserver {
    fn enter(&self, _nonterminal: &str, _line: usize) {}

    fn consume(&self, _token: &str, _text: &str) {}
}

/// Forwards parse events to the `log` facade at trace level.
pub struct LogObserver;

impl ParseObserver for LogObserver {
    fn enter(&self, nonterminal: &str, line: usize) {
        log::trace!("{} (line {})", nonterminal, line);
    }

    fn consume(&self, token: &str, text: &str) {
        log::trace!("consumed {}:{}", token, text);
    }
}

static LOG_OBSERVER: LogObserver = LogObserver;

pub struct Parser<'g> {
    compiled: &'g CompiledGrammar,
    observer: &'g dyn ParseObserver,
}

fn found(token: Option<Token<'_>>) -> (String, String) {
    match token {
        Some(token) => (token.name.to_string(), token.text.to_string()),
        None => (EOF.to_string(), String::new()),
    }
}

impl<'g> Parser<'g> {
    pub fn new(compiled: &'g CompiledGrammar) -> Parser<'g> {
        Parser {
            compiled,
            observer: &LOG_OBSERVER,
        }
    }

    pub fn with_observer(mut self, observer: &'g dyn ParseObserver) -> Parser<'g> {
        self.observer = observer;
        self
    }

    /// Parses all of `input` from the start symbol.
    pub fn parse(&self, input: &str) -> Result<Value, ParseError> {
        let grammar = self.compiled.grammar();
        let mut tokens = grammar.lex_table().tokenize(input);
        let value = self.nonterminal(grammar.start(), &mut tokens)?;
        match tokens.peek()? {
            None => Ok(value),
            next => {
                let (found, text) = found(next);
                Err(ParseError::TrailingInput {
                    line: tokens.line(),
                    found,
                    text,
                })
            }
        }
    }

    fn nonterminal(
        &self,
        nt: NontermIdx,
        tokens: &mut TokenStream<'_>,
    ) -> Result<Value, ParseError> {
        let grammar = self.compiled.grammar();
        let next = tokens.peek()?;
        self.observer.enter(&grammar[nt].name, tokens.line());

        let entry = self.compiled.table().entry(nt);
        match entry.select(next.map(|token| TermIdx::from_usize(token.terminal))) {
            Selection::Alternative(p) | Selection::Epsilon(p) => self.production(p, tokens),
            Selection::NoMatch => {
                let (found, text) = found(next);
                Err(ParseError::NoAlternative {
                    line: tokens.line(),
                    nonterminal: grammar[nt].name.clone(),
                    expected: Alternatives(entry.expected(grammar)),
                    found,
                    text,
                })
            }
        }
    }

    fn production(&self, p: ProdIdx, tokens: &mut TokenStream<'_>) -> Result<Value, ParseError> {
        let body = &self.compiled.grammar()[p].body;
        let mut values = Vec::with_capacity(body.len());
        for &symbol in body {
            let value = match symbol {
                Symbol::Terminal(t) => self.terminal(t, tokens)?,
                Symbol::Nonterminal(nt) => self.nonterminal(nt, tokens)?,
            };
            values.push(value);
        }
        Ok(self.compiled.shapes().build(p, values))
    }

    fn terminal(&self, t: TermIdx, tokens: &mut TokenStream<'_>) -> Result<Value, ParseError> {
        let expected = &self.compiled.grammar()[t].name;
        match tokens.peek()? {
            Some(token) if token.terminal == t.index() => {
                tokens.next_token()?;
                self.observer.consume(token.name, token.text);
                Ok(Value::Token(token.text.to_string()))
            }
            next => {
                let (found, text) = found(next);
                Err(ParseError::UnexpectedToken {
                    line: tokens.line(),
                    expected: expected.clone(),
                    found,
                    text,
                })
            }
        }
    }
}
