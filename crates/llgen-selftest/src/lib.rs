//! Parsers generated at build time from `data/grammars`, one module per grammar file.

include!(concat!(env!("OUT_DIR"), "/parsers.rs"));

/// Grammar sources the modules above were generated from.
pub const ARITH_SOURCE: &str = include_str!("../../../data/grammars/arith.llg");
pub const STATEMENTS_SOURCE: &str = include_str!("../../../data/grammars/statements.llg");
