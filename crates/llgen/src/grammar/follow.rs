// FOLLOW sets from two relations over dense symbol ids:
//
//   followers[x]  symbols that can appear right after x
//   ends_of[x]    nonterminals whose expansions can end with x
//
// follow(x) is EOF for the start symbol, plus FIRST of every follower, plus follow(h) for
// every h in ends_of[x]. The last part is solved as a fixpoint so cycles through ends_of
// terminate.

use bit_set::BitSet;

use super::{Grammar, NontermIdx, ProdIdx, Symbol, TerminalSet};

pub(super) struct Adjacency {
    pub followers: Vec<BitSet>,
    pub ends_of: Vec<BitSet>,
}

impl Adjacency {
    pub fn new(grammar: &Grammar) -> Adjacency {
        let n_symbols = grammar.n_symbols();
        let n_nonterminals = grammar.nonterminals().len();
        Adjacency {
            followers: vec![BitSet::with_capacity(n_symbols); n_symbols],
            ends_of: vec![BitSet::with_capacity(n_nonterminals); n_symbols],
        }
    }

    /// Direct adjacency: every `body[i]` is followed by `body[i + 1]`.
    pub fn register(&mut self, grammar: &Grammar, p: ProdIdx) {
        for pair in grammar[p].body.windows(2) {
            let (x, y) = (grammar.symbol_id(pair[0]), grammar.symbol_id(pair[1]));
            self.followers[x].insert(y);
        }
    }

    /// Records which symbols can end the production, walking right to left through nullable
    /// symbols. Returns the index of the leftmost symbol reached without crossing a
    /// non-nullable one, or `None` for an epsilon production.
    pub fn update_ends(
        &mut self,
        grammar: &Grammar,
        p: ProdIdx,
        nullable: impl Fn(Symbol) -> bool,
    ) -> Option<usize> {
        let production = &grammar[p];
        let body = &production.body;
        let last = body.len().checked_sub(1)?;

        self.ends_of[grammar.symbol_id(body[last])].insert(production.head.index());

        let mut propagating = last;
        let mut unbroken = true;
        for i in (1..body.len()).rev() {
            if !nullable(body[i]) {
                unbroken = false;
                continue;
            }
            let (from, to) = (grammar.symbol_id(body[i]), grammar.symbol_id(body[i - 1]));
            let followers = self.followers[from].clone();
            self.followers[to].union_with(&followers);
            // past a non-nullable symbol the predecessor can no longer end the production
            if unbroken {
                let ends = self.ends_of[from].clone();
                self.ends_of[to].union_with(&ends);
                propagating = i - 1;
            }
        }
        Some(propagating)
    }
}

/// `first` is indexed by symbol id; a terminal's set is just itself.
pub(super) fn follow_sets(
    grammar: &Grammar,
    adjacency: &Adjacency,
    first: &[TerminalSet],
) -> Vec<TerminalSet> {
    let n_symbols = grammar.n_symbols();
    let mut follow = vec![grammar.empty_set(); n_symbols];

    for (x, set) in follow.iter_mut().enumerate() {
        if let Symbol::Nonterminal(nt) = grammar.symbol_from_id(x) {
            if grammar[nt].is_start {
                set.insert_eof();
            }
        }
        for f in adjacency.followers[x].iter() {
            set.union_with(&first[f].without_epsilon());
        }
    }

    let mut rounds = 0;
    loop {
        let mut changed = false;
        for x in 0..n_symbols {
            for h in adjacency.ends_of[x].iter() {
                let head = grammar.symbol_id(Symbol::Nonterminal(NontermIdx::from_usize(h)));
                if head == x {
                    continue;
                }
                let inherited = follow[head].clone();
                changed |= follow[x].union_with(&inherited);
            }
        }
        rounds += 1;
        if !changed {
            break;
        }
    }
    log::trace!("FOLLOW sets settled after {} rounds", rounds);

    follow
}
