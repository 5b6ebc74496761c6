use crate::{
    emit::{self, EmitOptions},
    grammar::{Analysis, Grammar, GrammarError},
    parser::{Ll1Table, ParseError, Parser, Shapes, Value},
};

/// A grammar with everything the parser and the emitter need: FIRST/FOLLOW sets, the
/// prediction table and the compiled bindings.
#[derive(Debug)]
pub struct CompiledGrammar {
    grammar: Grammar,
    analysis: Analysis,
    table: Ll1Table,
    shapes: Shapes,
}

impl CompiledGrammar {
    pub fn new(grammar: Grammar) -> Result<CompiledGrammar, GrammarError> {
        let analysis = Analysis::new(&grammar)?;
        let table = Ll1Table::new(&grammar, &analysis);
        let shapes = Shapes::new(&grammar);
        log::debug!(
            "compiled grammar for `{}`: {} reachable nonterminals, {} conflicts",
            grammar[grammar.start()].name,
            analysis.reachable().len(),
            table.conflicts().len()
        );
        Ok(CompiledGrammar {
            grammar,
            analysis,
            table,
            shapes,
        })
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    pub fn analysis(&self) -> &Analysis {
        &self.analysis
    }

    pub fn table(&self) -> &Ll1Table {
        &self.table
    }

    pub fn shapes(&self) -> &Shapes {
        &self.shapes
    }

    pub fn parser(&self) -> Parser<'_> {
        Parser::new(self)
    }

    pub fn parse(&self, input: &str) -> Result<Value, ParseError> {
        self.parser().parse(input)
    }

    /// Source text of a standalone parser module for this grammar.
    pub fn emit(&self, options: &EmitOptions) -> String {
        emit::emit(self, options)
    }
}
