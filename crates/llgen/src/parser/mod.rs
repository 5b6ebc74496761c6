mod driver;
mod error;
mod ll1;
mod shape;
mod tree;

pub use driver::{LogObserver, ParseObserver, Parser};
pub use error::{Alternatives, FailureKind, ParseError, EOF};
pub use ll1::{Conflict, Ll1Table, Lookahead, NonterminalTable, Rule, Selection};
pub use shape::{NodeType, NodeTypeIdx, Shape, Shapes};
pub use tree::{FieldKey, Node, Value};
