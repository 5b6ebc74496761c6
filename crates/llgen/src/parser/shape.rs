// Bindings compiled once per production into the shape of the value it builds, with the
// node types collected in order of first appearance.

use llgen_util::make_type_idx;

use super::tree::{FieldKey, Node, Value};
use crate::grammar::{Binding, Field, Grammar, ProdIdx};

make_type_idx!(NodeTypeIdx, NodeType);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodeType {
    pub name: String,
    /// Union of the named fields of every binding with this type.
    pub fields: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Shape {
    Tuple,
    Suppressed,
    Node {
        node_type: NodeTypeIdx,
        slots: Vec<FieldKey>,
    },
}

#[derive(Debug)]
pub struct Shapes {
    node_types: Vec<NodeType>,
    shapes: Vec<Shape>,
}

impl Shapes {
    pub fn new(grammar: &Grammar) -> Shapes {
        let mut node_types: Vec<NodeType> = Vec::new();
        let shapes = grammar
            .productions()
            .iter()
            .map(|production| match &production.binding {
                None => Shape::Tuple,
                Some(Binding::Suppressed) => Shape::Suppressed,
                Some(Binding::Node { node_type, fields }) => {
                    let idx = match node_types.iter().position(|t| &t.name == node_type) {
                        Some(i) => NodeTypeIdx::from_usize(i),
                        None => NodeTypeIdx::from_push(
                            &mut node_types,
                            NodeType {
                                name: node_type.clone(),
                                fields: Vec::new(),
                            },
                        ),
                    };
                    let slots = fields
                        .iter()
                        .enumerate()
                        .map(|(i, field)| match field {
                            Field::Named(name) => {
                                if !node_types[idx].fields.contains(name) {
                                    node_types[idx].fields.push(name.clone());
                                }
                                FieldKey::Named(name.clone())
                            }
                            Field::Discard => FieldKey::Anon(i),
                        })
                        .collect();
                    Shape::Node {
                        node_type: idx,
                        slots,
                    }
                }
            })
            .collect();
        Shapes { node_types, shapes }
    }

    pub fn node_types(&self) -> &[NodeType] {
        &self.node_types
    }

    pub fn node_type(&self, idx: NodeTypeIdx) -> &NodeType {
        &self.node_types[idx]
    }

    pub fn shape(&self, p: ProdIdx) -> &Shape {
        &self.shapes[p.index()]
    }

    /// `values` holds one sub-value per body symbol.
    pub fn build(&self, p: ProdIdx, values: Vec<Value>) -> Value {
        match self.shape(p) {
            Shape::Tuple if values.is_empty() => Value::Empty,
            Shape::Tuple => Value::Tuple(values),
            Shape::Suppressed => Value::Empty,
            Shape::Node { node_type, slots } => Value::Node(Node::new(
                self.node_types[*node_type].name.clone(),
                slots.iter().cloned().zip(values).collect(),
            )),
        }
    }
}
