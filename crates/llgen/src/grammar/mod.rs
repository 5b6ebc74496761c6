// Grammar IR: terminals, nonterminals and productions live in arenas addressed by index
// newtypes. Everything downstream (analysis, tables, the emitter) works on indices and only
// goes back to names for messages and output.

use std::{collections::HashMap, fmt};

use llgen_lex::{LexError, LexTable};
use llgen_util::make_type_idx;
use thiserror::Error;

mod analysis;
mod builder;
mod ebnf;
mod first;
mod follow;
mod set;

pub use analysis::{Analysis, AnalysisReport};
pub use builder::{GrammarBuilder, Item};
pub use set::{SetDisplay, TerminalSet};

/// Field name that drops the matching sub-tree, and the binding that drops the whole value.
pub const DISCARD: &str = "_";

/// Prefix of the nonterminals introduced by desugaring `[ .. ]` and `< .. >`.
pub const FRESH_PREFIX: &str = "_anon_";

make_type_idx!(TermIdx, Terminal);
make_type_idx!(NontermIdx, Nonterminal);
make_type_idx!(ProdIdx, Production);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Symbol {
    Terminal(TermIdx),
    Nonterminal(NontermIdx),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Terminal {
    pub name: String,
    pub pattern: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Nonterminal {
    pub name: String,
    /// Alternatives in declaration order.
    pub productions: Vec<ProdIdx>,
    pub is_start: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Field {
    Named(String),
    Discard,
}

impl Field {
    pub fn name(&self) -> &str {
        match self {
            Field::Named(name) => name,
            Field::Discard => DISCARD,
        }
    }
}

/// How a production's sub-values become a tree value. A production without a binding
/// yields the plain tuple of its sub-values.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Binding {
    Node { node_type: String, fields: Vec<Field> },
    Suppressed,
}

impl Binding {
    /// `_` in `fields` discards that position.
    pub fn node<S: AsRef<str>>(node_type: &str, fields: &[S]) -> Binding {
        Binding::Node {
            node_type: node_type.to_string(),
            fields: fields
                .iter()
                .map(|f| match f.as_ref() {
                    DISCARD => Field::Discard,
                    name => Field::Named(name.to_string()),
                })
                .collect(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Production {
    pub head: NontermIdx,
    /// Empty for an epsilon production.
    pub body: Vec<Symbol>,
    pub binding: Option<Binding>,
}

impl Production {
    pub fn is_epsilon(&self) -> bool {
        self.body.is_empty()
    }

    pub fn display<'a>(&'a self, grammar: &'a Grammar) -> ProductionDisplay<'a> {
        ProductionDisplay {
            production: self,
            grammar,
        }
    }
}

pub struct ProductionDisplay<'a> {
    production: &'a Production,
    grammar: &'a Grammar,
}

impl fmt::Display for ProductionDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} :=", self.grammar[self.production.head].name)?;
        if self.production.body.is_empty() {
            write!(f, " $")?;
        }
        for &symbol in &self.production.body {
            write!(f, " {}", self.grammar.symbol_name(symbol))?;
        }
        match &self.production.binding {
            Some(Binding::Node { node_type, fields }) => {
                write!(f, " # {}", node_type)?;
                for field in fields {
                    write!(f, " {}", field.name())?;
                }
                Ok(())
            }
            Some(Binding::Suppressed) => write!(f, " # {}", DISCARD),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GrammarError {
    #[error("left recursion through {}", .cycle.join(" -> "))]
    LeftRecursion { nonterminal: String, cycle: Vec<String> },
    #[error("production of `{head}` refers to undeclared symbol `{name}`")]
    UndeclaredSymbol { head: String, name: String },
    #[error("symbol `{0}` is declared more than once")]
    DuplicateSymbol(String),
    #[error("start symbol `{0}` has no productions")]
    UnknownStart(String),
    #[error("binding `{node_type}` on a production of `{head}` names {fields} fields for {symbols} symbols")]
    BindingArity {
        head: String,
        node_type: String,
        fields: usize,
        symbols: usize,
    },
    #[error("binding `{node_type}` on a production of `{head}` names field `{field}` twice")]
    DuplicateField {
        head: String,
        node_type: String,
        field: String,
    },
    #[error("nonterminal `{0}` uses the prefix reserved for desugared operators")]
    ReservedName(String),
    #[error("binding `_` on a non-empty production of `{head}`")]
    SuppressedNonEpsilon { head: String },
    #[error("unsupported grammar operator: {0}")]
    UnsupportedOperator(&'static str),
    #[error(transparent)]
    InvalidPattern(#[from] LexError),
}

/// A validated grammar. Built with [`GrammarBuilder`] or loaded by the front end.
#[derive(Debug)]
pub struct Grammar {
    terminals: Vec<Terminal>,
    nonterminals: Vec<Nonterminal>,
    productions: Vec<Production>,
    start: NontermIdx,
    lex_table: LexTable,
    terminal_names: HashMap<String, TermIdx>,
    nonterminal_names: HashMap<String, NontermIdx>,
}

impl Grammar {
    pub fn terminals(&self) -> &[Terminal] {
        &self.terminals
    }

    pub fn nonterminals(&self) -> &[Nonterminal] {
        &self.nonterminals
    }

    pub fn productions(&self) -> &[Production] {
        &self.productions
    }

    pub fn start(&self) -> NontermIdx {
        self.start
    }

    /// Whitespace rule first, then the terminals in declaration order.
    pub fn lex_table(&self) -> &LexTable {
        &self.lex_table
    }

    pub fn terminal(&self, name: &str) -> Option<TermIdx> {
        self.terminal_names.get(name).copied()
    }

    pub fn nonterminal(&self, name: &str) -> Option<NontermIdx> {
        self.nonterminal_names.get(name).copied()
    }

    pub fn symbol_name(&self, symbol: Symbol) -> &str {
        match symbol {
            Symbol::Terminal(t) => &self.terminals[t].name,
            Symbol::Nonterminal(nt) => &self.nonterminals[nt].name,
        }
    }

    /// Dense numbering of all symbols: terminals first, then nonterminals.
    pub fn symbol_id(&self, symbol: Symbol) -> usize {
        match symbol {
            Symbol::Terminal(t) => t.index(),
            Symbol::Nonterminal(nt) => self.terminals.len() + nt.index(),
        }
    }

    pub fn symbol_from_id(&self, id: usize) -> Symbol {
        if id < self.terminals.len() {
            Symbol::Terminal(TermIdx::from_usize(id))
        } else {
            Symbol::Nonterminal(NontermIdx::from_usize(id - self.terminals.len()))
        }
    }

    pub fn n_symbols(&self) -> usize {
        self.terminals.len() + self.nonterminals.len()
    }

    pub fn empty_set(&self) -> TerminalSet {
        TerminalSet::new(self.terminals.len())
    }
}

impl std::ops::Index<TermIdx> for Grammar {
    type Output = Terminal;

    fn index(&self, index: TermIdx) -> &Terminal {
        &self.terminals[index]
    }
}

impl std::ops::Index<NontermIdx> for Grammar {
    type Output = Nonterminal;

    fn index(&self, index: NontermIdx) -> &Nonterminal {
        &self.nonterminals[index]
    }
}

impl std::ops::Index<ProdIdx> for Grammar {
    type Output = Production;

    fn index(&self, index: ProdIdx) -> &Production {
        &self.productions[index]
    }
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for production in &self.productions {
            writeln!(f, "{}", production.display(self))?;
        }
        Ok(())
    }
}
