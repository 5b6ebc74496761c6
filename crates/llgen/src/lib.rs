mod compiled;
pub mod emit;
pub mod frontend;
pub mod grammar;
pub mod graph;
pub mod parser;

pub use compiled::CompiledGrammar;
pub use frontend::{load_grammar, LoadError};
