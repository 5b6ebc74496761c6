// What a generated parser consists of, independent of the target language. All names here
// are grammar names; back ends mangle them.

use llgen_lex::LexRule;

use crate::parser::FieldKey;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParserModule {
    pub header: Option<String>,
    pub start: String,
    pub node_types: Vec<NodeDecl>,
    /// Whitespace rule first.
    pub lex_rules: Vec<LexRule>,
    /// Reachable nonterminals, start symbol first.
    pub routines: Vec<Routine>,
    pub with_main: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodeDecl {
    pub name: String,
    pub fields: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Routine {
    pub nonterminal: String,
    /// Tried in order.
    pub branches: Vec<Branch>,
    pub fallback: Fallback,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Branch {
    pub lookahead: Vec<String>,
    pub body: Body,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Body {
    /// Step `i` produces sub-value `i`.
    pub steps: Vec<Step>,
    pub result: ResultShape,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Step {
    Consume(String),
    Call(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResultShape {
    Tuple,
    Suppressed,
    Node { node_type: String, keys: Vec<FieldKey> },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Fallback {
    Epsilon(Body),
    Fail { expected: Vec<Vec<String>> },
}
