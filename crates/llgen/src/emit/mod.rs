// Lowers a compiled grammar into a `ParserModule` and hands it to a back end. The generated
// parser makes the same choices as the interpreter in `crate::parser`: same alternative
// order, same fallback, same messages.

mod ast;
mod names;
mod rust;

pub use ast::{Body, Branch, Fallback, NodeDecl, ParserModule, ResultShape, Routine, Step};
pub use rust::RustBackend;

use crate::{
    grammar::{NontermIdx, ProdIdx, Symbol},
    parser::Shape,
    CompiledGrammar,
};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EmitOptions {
    /// Also emit a `main` that parses the file named by the first argument.
    pub with_main: bool,
    /// Comment lines put at the top of the output.
    pub header: Option<String>,
}

pub trait Backend {
    fn render(&self, module: &ParserModule) -> String;
}

pub fn emit(compiled: &CompiledGrammar, options: &EmitOptions) -> String {
    let module = Emitter::new(compiled).module(options);
    RustBackend.render(&module)
}

pub struct Emitter<'c> {
    compiled: &'c CompiledGrammar,
}

impl<'c> Emitter<'c> {
    pub fn new(compiled: &'c CompiledGrammar) -> Emitter<'c> {
        Emitter { compiled }
    }

    pub fn module(&self, options: &EmitOptions) -> ParserModule {
        let grammar = self.compiled.grammar();
        let node_types = self
            .compiled
            .shapes()
            .node_types()
            .iter()
            .map(|t| NodeDecl {
                name: t.name.clone(),
                fields: t.fields.clone(),
            })
            .collect();
        let routines = self
            .compiled
            .analysis()
            .reachable()
            .iter()
            .map(|&nt| self.routine(nt))
            .collect();

        ParserModule {
            header: options.header.clone(),
            start: grammar[grammar.start()].name.clone(),
            node_types,
            lex_rules: grammar.lex_table().rules().to_vec(),
            routines,
            with_main: options.with_main,
        }
    }

    fn routine(&self, nt: NontermIdx) -> Routine {
        let grammar = self.compiled.grammar();
        let entry = self.compiled.table().entry(nt);

        let branches = entry
            .rules
            .iter()
            .filter(|rule| !rule.lookahead.is_empty())
            .map(|rule| Branch {
                lookahead: rule
                    .lookahead
                    .terminal_names(grammar)
                    .into_iter()
                    .map(str::to_string)
                    .collect(),
                body: self.body(rule.production),
            })
            .collect();
        let fallback = match entry.epsilon {
            Some(p) => Fallback::Epsilon(self.body(p)),
            None => Fallback::Fail {
                expected: entry.expected(grammar),
            },
        };

        Routine {
            nonterminal: grammar[nt].name.clone(),
            branches,
            fallback,
        }
    }

    fn body(&self, p: ProdIdx) -> Body {
        let grammar = self.compiled.grammar();
        let steps = grammar[p]
            .body
            .iter()
            .map(|&symbol| match symbol {
                Symbol::Terminal(t) => Step::Consume(grammar[t].name.clone()),
                Symbol::Nonterminal(nt) => Step::Call(grammar[nt].name.clone()),
            })
            .collect();
        let shapes = self.compiled.shapes();
        let result = match shapes.shape(p) {
            Shape::Tuple => ResultShape::Tuple,
            Shape::Suppressed => ResultShape::Suppressed,
            Shape::Node { node_type, slots } => ResultShape::Node {
                node_type: shapes.node_type(*node_type).name.clone(),
                keys: slots.clone(),
            },
        };
        Body { steps, result }
    }
}
