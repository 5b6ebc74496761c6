use std::fmt;

use bit_set::BitSet;

use super::{Grammar, TermIdx};

/// A set of terminals plus the two pseudo-terminals: end of input and the empty string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TerminalSet {
    // |T| + 2 entries, one for EOF and one for epsilon
    data: BitSet,
    n_terminals: usize,
}

impl TerminalSet {
    pub fn new(n_terminals: usize) -> TerminalSet {
        TerminalSet {
            data: BitSet::with_capacity(n_terminals + 2),
            n_terminals,
        }
    }

    pub fn contains_terminal(&self, terminal: TermIdx) -> bool {
        self.data.contains(terminal.index())
    }

    pub fn contains_eof(&self) -> bool {
        self.data.contains(self.n_terminals)
    }

    pub fn contains_epsilon(&self) -> bool {
        self.data.contains(self.n_terminals + 1)
    }

    pub fn insert_terminal(&mut self, terminal: TermIdx) -> bool {
        self.data.insert(terminal.index())
    }

    pub fn insert_eof(&mut self) -> bool {
        self.data.insert(self.n_terminals)
    }

    pub fn insert_epsilon(&mut self) -> bool {
        self.data.insert(self.n_terminals + 1)
    }

    pub fn remove_epsilon(&mut self) -> bool {
        self.data.remove(self.n_terminals + 1)
    }

    pub fn without_epsilon(&self) -> TerminalSet {
        let mut set = self.clone();
        set.remove_epsilon();
        set
    }

    /// Returns whether anything was added.
    pub fn union_with(&mut self, other: &TerminalSet) -> bool {
        let before = self.data.len();
        self.data.union_with(&other.data);
        self.data.len() != before
    }

    pub fn intersection(&self, other: &TerminalSet) -> TerminalSet {
        let mut set = self.clone();
        set.data.intersect_with(&other.data);
        set
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Real terminals only, in declaration order.
    pub fn terminals(&self) -> impl Iterator<Item = TermIdx> + '_ {
        let n_terminals = self.n_terminals;
        self.data
            .iter()
            .take_while(move |&i| i < n_terminals)
            .map(TermIdx::from_usize)
    }

    pub fn terminal_names<'g>(&self, grammar: &'g Grammar) -> Vec<&'g str> {
        self.terminals()
            .map(|t| grammar[t].name.as_str())
            .collect()
    }

    pub fn display<'a>(&'a self, grammar: &'a Grammar) -> SetDisplay<'a> {
        SetDisplay { set: self, grammar }
    }
}

pub struct SetDisplay<'a> {
    set: &'a TerminalSet,
    grammar: &'a Grammar,
}

impl fmt::Display for SetDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names = self.set.terminal_names(self.grammar);
        if self.set.contains_eof() {
            names.push("EOF");
        }
        if self.set.contains_epsilon() {
            names.push("$");
        }
        write!(f, "{{{}}}", names.join(", "))
    }
}
