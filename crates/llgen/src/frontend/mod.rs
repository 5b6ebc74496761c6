// Grammar files are read with the library's own parser: the metagrammar is an ordinary
// grammar, and its parse tree is lowered into a `GrammarBuilder`.

mod lower;
mod metagrammar;

use thiserror::Error;

use crate::{
    grammar::{Grammar, GrammarError},
    parser::ParseError,
    CompiledGrammar,
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LoadError {
    #[error(transparent)]
    Syntax(#[from] ParseError),
    #[error(transparent)]
    Grammar(#[from] GrammarError),
    #[error("malformed grammar tree: expected {0}")]
    Malformed(&'static str),
}

pub struct GrammarLoader {
    metagrammar: CompiledGrammar,
}

impl GrammarLoader {
    pub fn new() -> Result<GrammarLoader, GrammarError> {
        Ok(GrammarLoader {
            metagrammar: CompiledGrammar::new(metagrammar::metagrammar()?)?,
        })
    }

    pub fn metagrammar(&self) -> &CompiledGrammar {
        &self.metagrammar
    }

    pub fn load(&self, source: &str) -> Result<Grammar, LoadError> {
        let tree = self.metagrammar.parse(source)?;
        let builder = lower::lower(&tree)?;
        Ok(builder.build()?)
    }
}

pub fn load_grammar(source: &str) -> Result<Grammar, LoadError> {
    GrammarLoader::new()?.load(source)
}
