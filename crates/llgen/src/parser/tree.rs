use std::fmt;

/// A parse result. `Empty` is what epsilon productions without a node binding produce, and
/// what a `_` binding turns a production into.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Value {
    Empty,
    Token(String),
    Tuple(Vec<Value>),
    Node(Node),
}

impl Value {
    pub fn is_empty(&self) -> bool {
        matches!(self, Value::Empty)
    }

    pub fn as_token(&self) -> Option<&str> {
        match self {
            Value::Token(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_tuple(&self) -> Option<&[Value]> {
        match self {
            Value::Tuple(values) => Some(values),
            _ => None,
        }
    }

    pub fn as_node(&self) -> Option<&Node> {
        match self {
            Value::Node(node) => Some(node),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum FieldKey {
    Named(String),
    /// A `_` field; the number is the body position.
    Anon(usize),
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKey::Named(name) => write!(f, "{}", name),
            FieldKey::Anon(_) => write!(f, "_"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Node {
    kind: String,
    attrs: Vec<(FieldKey, Value)>,
}

impl Node {
    pub fn new(kind: String, attrs: Vec<(FieldKey, Value)>) -> Node {
        Node { kind, attrs }
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// All fields in body order, discarded ones included.
    pub fn attrs(&self) -> &[(FieldKey, Value)] {
        &self.attrs
    }

    /// A named field. Missing fields and fields holding `Empty` both read as `None`.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.attrs
            .iter()
            .find(|(key, _)| matches!(key, FieldKey::Named(n) if n == name))
            .map(|(_, value)| value)
            .filter(|value| !value.is_empty())
    }

    pub fn anon(&self, position: usize) -> Option<&Value> {
        self.attrs
            .iter()
            .find(|(key, _)| *key == FieldKey::Anon(position))
            .map(|(_, value)| value)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Empty => write!(f, "None"),
            Value::Token(text) => write!(f, "{:?}", text),
            Value::Tuple(values) => {
                write!(f, "(")?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", value)?;
                }
                write!(f, ")")
            }
            Value::Node(node) => write!(f, "{}", node),
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[", self.kind)?;
        for (i, (key, value)) in self.attrs.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", key, value)?;
        }
        write!(f, "]")
    }
}
