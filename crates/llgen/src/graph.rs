// The relations FOLLOW is computed from, as a petgraph graph: `x -> y` labelled `follows`
// when y can come right after x, and `x -> h` labelled `ends` when an expansion of h can end
// with x. Only symbols that take part in some edge, plus the start symbol, become nodes.

use std::{collections::HashMap, fmt};

use petgraph::graph::{DiGraph, NodeIndex};

use crate::{
    grammar::{Grammar, Symbol},
    CompiledGrammar,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Relation {
    Follows,
    Ends,
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Relation::Follows => write!(f, "follows"),
            Relation::Ends => write!(f, "ends"),
        }
    }
}

pub type SymbolGraph = DiGraph<String, Relation>;

pub fn symbol_graph(compiled: &CompiledGrammar) -> SymbolGraph {
    let (grammar, analysis) = (compiled.grammar(), compiled.analysis());
    let mut graph = SymbolGraph::new();
    let mut indices: HashMap<Symbol, NodeIndex> = HashMap::new();

    let mut node = |graph: &mut SymbolGraph, grammar: &Grammar, symbol: Symbol| {
        *indices
            .entry(symbol)
            .or_insert_with(|| graph.add_node(grammar.symbol_name(symbol).to_string()))
    };

    node(&mut graph, grammar, Symbol::Nonterminal(grammar.start()));
    for id in 0..grammar.n_symbols() {
        let symbol = grammar.symbol_from_id(id);
        for &follower in analysis.followers(grammar, symbol) {
            let (from, to) = (
                node(&mut graph, grammar, symbol),
                node(&mut graph, grammar, follower),
            );
            graph.add_edge(from, to, Relation::Follows);
        }
        for &head in analysis.ends_of(grammar, symbol) {
            let (from, to) = (
                node(&mut graph, grammar, symbol),
                node(&mut graph, grammar, Symbol::Nonterminal(head)),
            );
            graph.add_edge(from, to, Relation::Ends);
        }
    }

    graph
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::GrammarBuilder;

    #[test]
    fn edges_mirror_the_follow_relations() {
        let mut builder = GrammarBuilder::new("S");
        builder
            .terminal("a", "a")
            .terminal("b", "b")
            .production("S", &["a", "T"], None)
            .production("T", &["b"], None);
        let compiled = CompiledGrammar::new(builder.build().unwrap()).unwrap();
        let graph = symbol_graph(&compiled);

        let mut edges: Vec<(String, String, Relation)> = graph
            .edge_indices()
            .filter_map(|e| {
                let (from, to) = graph.edge_endpoints(e)?;
                Some((graph[from].clone(), graph[to].clone(), graph[e]))
            })
            .collect();
        edges.sort_by(|x, y| (&x.0, &x.1).cmp(&(&y.0, &y.1)));
        assert_eq!(
            edges,
            vec![
                ("T".to_string(), "S".to_string(), Relation::Ends),
                ("a".to_string(), "T".to_string(), Relation::Follows),
                ("b".to_string(), "T".to_string(), Relation::Ends),
            ]
        );
    }
}
