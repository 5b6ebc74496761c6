use std::{collections::VecDeque, fmt};

use super::{
    first,
    follow::{self, Adjacency},
    Grammar, GrammarError, NontermIdx, ProdIdx, Symbol, TerminalSet,
};

/// FIRST and FOLLOW sets plus the set of nonterminals reachable from the start symbol.
#[derive(Debug)]
pub struct Analysis {
    reachable: Vec<NontermIdx>,
    // indexed by symbol id
    first: Vec<TerminalSet>,
    follow: Vec<TerminalSet>,
    production_first: Vec<TerminalSet>,
    last_propagating: Vec<Option<usize>>,
    followers: Vec<Vec<Symbol>>,
    ends_of: Vec<Vec<NontermIdx>>,
}

impl Analysis {
    pub fn new(grammar: &Grammar) -> Result<Analysis, GrammarError> {
        let first_sets = first::compute(grammar)?;

        let first: Vec<TerminalSet> = (0..grammar.n_symbols())
            .map(|id| match grammar.symbol_from_id(id) {
                Symbol::Terminal(t) => {
                    let mut set = grammar.empty_set();
                    set.insert_terminal(t);
                    set
                }
                Symbol::Nonterminal(nt) => first_sets.nonterminals[nt.index()].clone(),
            })
            .collect();

        let reachable = walk(grammar);

        let mut adjacency = Adjacency::new(grammar);
        for &nt in &reachable {
            for &p in &grammar[nt].productions {
                adjacency.register(grammar, p);
            }
        }
        let mut last_propagating = vec![None; grammar.productions().len()];
        let nullable = |symbol: Symbol| first[grammar.symbol_id(symbol)].contains_epsilon();
        for &nt in &reachable {
            for &p in &grammar[nt].productions {
                last_propagating[p.index()] = adjacency.update_ends(grammar, p, nullable);
            }
        }

        let follow = follow::follow_sets(grammar, &adjacency, &first);

        let followers = adjacency
            .followers
            .iter()
            .map(|set| set.iter().map(|id| grammar.symbol_from_id(id)).collect())
            .collect();
        let ends_of = adjacency
            .ends_of
            .iter()
            .map(|set| set.iter().map(NontermIdx::from_usize).collect())
            .collect();

        Ok(Analysis {
            reachable,
            first,
            follow,
            production_first: first_sets.productions,
            last_propagating,
            followers,
            ends_of,
        })
    }

    /// Nonterminals reachable from the start symbol, in breadth-first discovery order.
    pub fn reachable(&self) -> &[NontermIdx] {
        &self.reachable
    }

    pub fn is_reachable(&self, nt: NontermIdx) -> bool {
        self.reachable.contains(&nt)
    }

    pub fn first(&self, grammar: &Grammar, symbol: Symbol) -> &TerminalSet {
        &self.first[grammar.symbol_id(symbol)]
    }

    pub fn follow(&self, grammar: &Grammar, symbol: Symbol) -> &TerminalSet {
        &self.follow[grammar.symbol_id(symbol)]
    }

    pub fn is_nullable(&self, grammar: &Grammar, symbol: Symbol) -> bool {
        self.first(grammar, symbol).contains_epsilon()
    }

    pub fn production_first(&self, p: ProdIdx) -> &TerminalSet {
        &self.production_first[p.index()]
    }

    /// Leftmost body index reachable from the right end through nullable symbols. `None` for
    /// epsilon productions and productions outside the reachable set.
    pub fn last_propagating_index(&self, p: ProdIdx) -> Option<usize> {
        self.last_propagating[p.index()]
    }

    /// FOLLOW of the symbol at the last propagating index.
    pub fn production_follow(&self, grammar: &Grammar, p: ProdIdx) -> Option<&TerminalSet> {
        let k = self.last_propagating_index(p)?;
        Some(self.follow(grammar, grammar[p].body[k]))
    }

    pub fn followers(&self, grammar: &Grammar, symbol: Symbol) -> &[Symbol] {
        &self.followers[grammar.symbol_id(symbol)]
    }

    pub fn ends_of(&self, grammar: &Grammar, symbol: Symbol) -> &[NontermIdx] {
        &self.ends_of[grammar.symbol_id(symbol)]
    }

    pub fn report<'a>(&'a self, grammar: &'a Grammar) -> AnalysisReport<'a> {
        AnalysisReport {
            analysis: self,
            grammar,
        }
    }
}

// breadth first from the start symbol; each nonterminal is expanded once
fn walk(grammar: &Grammar) -> Vec<NontermIdx> {
    let mut seen = vec![false; grammar.nonterminals().len()];
    let mut order = Vec::new();
    let mut queue = VecDeque::new();

    seen[grammar.start().index()] = true;
    queue.push_back(grammar.start());
    while let Some(nt) = queue.pop_front() {
        order.push(nt);
        for &p in &grammar[nt].productions {
            for &symbol in &grammar[p].body {
                if let Symbol::Nonterminal(next) = symbol {
                    if !seen[next.index()] {
                        seen[next.index()] = true;
                        queue.push_back(next);
                    }
                }
            }
        }
    }

    for (i, nonterminal) in grammar.nonterminals().iter().enumerate() {
        if !seen[i] {
            log::warn!(
                "nonterminal `{}` is not reachable from `{}`",
                nonterminal.name,
                grammar[grammar.start()].name
            );
        }
    }

    order
}

/// Human readable FIRST/FOLLOW listing for the reachable part of the grammar.
pub struct AnalysisReport<'a> {
    analysis: &'a Analysis,
    grammar: &'a Grammar,
}

impl fmt::Display for AnalysisReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (analysis, grammar) = (self.analysis, self.grammar);
        for &nt in analysis.reachable() {
            let symbol = Symbol::Nonterminal(nt);
            writeln!(f, "{}", grammar[nt].name)?;
            writeln!(
                f,
                "  FIRST  {}",
                analysis.first(grammar, symbol).display(grammar)
            )?;
            writeln!(
                f,
                "  FOLLOW {}",
                analysis.follow(grammar, symbol).display(grammar)
            )?;
            for &p in &grammar[nt].productions {
                writeln!(
                    f,
                    "  {}    {}",
                    grammar[p].display(grammar),
                    analysis.production_first(p).display(grammar)
                )?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::{GrammarBuilder, TermIdx};

    fn arith() -> Grammar {
        let mut builder = GrammarBuilder::new("E");
        builder
            .terminal("+", r"\+")
            .terminal("*", r"\*")
            .terminal("(", r"\(")
            .terminal(")", r"\)")
            .terminal("NUM", "[0-9]+")
            .production("E", &["T", "Ep"], None)
            .production("Ep", &["+", "T", "Ep"], None)
            .epsilon("Ep", None)
            .production("T", &["F", "Tp"], None)
            .production("Tp", &["*", "F", "Tp"], None)
            .epsilon("Tp", None)
            .production("F", &["(", "E", ")"], None)
            .production("F", &["NUM"], None);
        builder.build().unwrap()
    }

    fn nt(grammar: &Grammar, name: &str) -> Symbol {
        Symbol::Nonterminal(grammar.nonterminal(name).unwrap())
    }

    fn names(grammar: &Grammar, set: &TerminalSet) -> Vec<String> {
        set.terminal_names(grammar)
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn first_sets() {
        let grammar = arith();
        let analysis = Analysis::new(&grammar).unwrap();
        for name in ["E", "T", "F"] {
            let first = analysis.first(&grammar, nt(&grammar, name));
            assert_eq!(names(&grammar, first), vec!["(", "NUM"]);
            assert!(!first.contains_epsilon());
        }
        let ep = analysis.first(&grammar, nt(&grammar, "Ep"));
        assert_eq!(names(&grammar, ep), vec!["+"]);
        assert!(ep.contains_epsilon());
    }

    #[test]
    fn follow_sets() {
        let grammar = arith();
        let analysis = Analysis::new(&grammar).unwrap();

        let e = analysis.follow(&grammar, nt(&grammar, "E"));
        assert_eq!(names(&grammar, e), vec![")"]);
        assert!(e.contains_eof());

        let t = analysis.follow(&grammar, nt(&grammar, "T"));
        assert_eq!(names(&grammar, t), vec!["+", ")"]);
        assert!(t.contains_eof());

        let f = analysis.follow(&grammar, nt(&grammar, "F"));
        assert_eq!(names(&grammar, f), vec!["+", "*", ")"]);
        assert!(f.contains_eof());

        let tp = analysis.follow(&grammar, nt(&grammar, "Tp"));
        assert_eq!(tp, t);
    }

    #[test]
    fn walk_is_breadth_first() {
        let grammar = arith();
        let analysis = Analysis::new(&grammar).unwrap();
        let order: Vec<&str> = analysis
            .reachable()
            .iter()
            .map(|&nt| grammar[nt].name.as_str())
            .collect();
        assert_eq!(order, vec!["E", "T", "Ep", "F", "Tp"]);
    }

    #[test]
    fn last_propagating_index_skips_nullable_tail() {
        let grammar = arith();
        let analysis = Analysis::new(&grammar).unwrap();
        let e = grammar.nonterminal("E").unwrap();
        let p = grammar[e].productions[0];
        // E := T Ep, Ep is nullable
        assert_eq!(analysis.last_propagating_index(p), Some(0));
        let f = grammar.nonterminal("F").unwrap();
        assert_eq!(
            analysis.last_propagating_index(grammar[f].productions[0]),
            Some(2)
        );
        let ep = grammar.nonterminal("Ep").unwrap();
        assert_eq!(analysis.last_propagating_index(grammar[ep].productions[1]), None);
        assert_eq!(
            analysis.production_follow(&grammar, p),
            Some(analysis.follow(&grammar, nt(&grammar, "T")))
        );
    }

    #[test]
    fn left_recursion_is_reported() {
        let mut builder = GrammarBuilder::new("E");
        builder
            .terminal("+", r"\+")
            .terminal("NUM", "[0-9]+")
            .production("E", &["E", "+", "NUM"], None)
            .production("E", &["NUM"], None);
        let grammar = builder.build().unwrap();
        match Analysis::new(&grammar).unwrap_err() {
            GrammarError::LeftRecursion { nonterminal, cycle } => {
                assert_eq!(nonterminal, "E");
                assert_eq!(cycle, vec!["E", "E"]);
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn indirect_left_recursion_through_nullable_prefix() {
        let mut builder = GrammarBuilder::new("A");
        builder
            .terminal("a", "a")
            .production("A", &["N", "B"], None)
            .production("B", &["A", "a"], None)
            .epsilon("N", None);
        let grammar = builder.build().unwrap();
        match Analysis::new(&grammar).unwrap_err() {
            GrammarError::LeftRecursion { cycle, .. } => {
                assert_eq!(cycle, vec!["A", "B", "A"]);
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn unreachable_nonterminals_are_left_out() {
        let mut builder = GrammarBuilder::new("S");
        builder
            .terminal("a", "a")
            .terminal("b", "b")
            .production("S", &["a"], None)
            .production("Dead", &["S", "b"], None);
        let grammar = builder.build().unwrap();
        let analysis = Analysis::new(&grammar).unwrap();
        let dead = grammar.nonterminal("Dead").unwrap();
        assert!(!analysis.is_reachable(dead));
        // `b` only follows S inside the unreachable production
        let follow = analysis.follow(&grammar, nt(&grammar, "S"));
        assert!(follow.contains_eof());
        assert!(!follow.contains_terminal(TermIdx::from_usize(1)));
    }
}
