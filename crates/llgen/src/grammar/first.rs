// FIRST sets, memoized per nonterminal and per production. A nonterminal is marked while its
// alternatives are being expanded; meeting the mark again means the grammar can derive the
// nonterminal from itself without consuming input.

use std::iter;

use super::{Grammar, GrammarError, NontermIdx, ProdIdx, Symbol, TerminalSet};

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    InProgress,
    Done,
}

pub(super) struct FirstSets {
    pub nonterminals: Vec<TerminalSet>,
    pub productions: Vec<TerminalSet>,
}

struct Computation<'g> {
    grammar: &'g Grammar,
    marks: Vec<Mark>,
    nonterminals: Vec<TerminalSet>,
    productions: Vec<Option<TerminalSet>>,
    stack: Vec<NontermIdx>,
}

pub(super) fn compute(grammar: &Grammar) -> Result<FirstSets, GrammarError> {
    let n_nonterminals = grammar.nonterminals().len();
    let mut computation = Computation {
        grammar,
        marks: vec![Mark::Unvisited; n_nonterminals],
        nonterminals: vec![grammar.empty_set(); n_nonterminals],
        productions: vec![None; grammar.productions().len()],
        stack: Vec::new(),
    };

    for nt in 0..n_nonterminals {
        computation.nonterminal(NontermIdx::from_usize(nt))?;
    }

    Ok(FirstSets {
        nonterminals: computation.nonterminals,
        productions: computation
            .productions
            .into_iter()
            .map(|set| set.unwrap_or_else(|| grammar.empty_set()))
            .collect(),
    })
}

impl Computation<'_> {
    fn nonterminal(&mut self, nt: NontermIdx) -> Result<TerminalSet, GrammarError> {
        match self.marks[nt.index()] {
            Mark::Done => return Ok(self.nonterminals[nt.index()].clone()),
            Mark::InProgress => return Err(self.left_recursion(nt)),
            Mark::Unvisited => {}
        }

        self.marks[nt.index()] = Mark::InProgress;
        self.stack.push(nt);

        let grammar = self.grammar;
        let mut first = grammar.empty_set();
        for &p in &grammar[nt].productions {
            let production_first = self.production(p)?;
            first.union_with(&production_first);
        }

        self.stack.pop();
        self.marks[nt.index()] = Mark::Done;
        log::trace!(
            "FIRST({}) = {}",
            grammar[nt].name,
            first.display(grammar)
        );
        self.nonterminals[nt.index()] = first.clone();
        Ok(first)
    }

    fn production(&mut self, p: ProdIdx) -> Result<TerminalSet, GrammarError> {
        if let Some(first) = &self.productions[p.index()] {
            return Ok(first.clone());
        }

        let grammar = self.grammar;
        let mut first = grammar.empty_set();
        let mut nullable = true;
        for &symbol in &grammar[p].body {
            let symbol_first = match symbol {
                Symbol::Terminal(t) => {
                    let mut set = grammar.empty_set();
                    set.insert_terminal(t);
                    set
                }
                Symbol::Nonterminal(nt) => self.nonterminal(nt)?,
            };
            first.union_with(&symbol_first.without_epsilon());
            if !symbol_first.contains_epsilon() {
                nullable = false;
                break;
            }
        }
        if nullable {
            first.insert_epsilon();
        }

        self.productions[p.index()] = Some(first.clone());
        Ok(first)
    }

    fn left_recursion(&self, nt: NontermIdx) -> GrammarError {
        let start = self.stack.iter().position(|&x| x == nt).unwrap_or(0);
        let cycle = self.stack[start..]
            .iter()
            .chain(iter::once(&nt))
            .map(|&x| self.grammar[x].name.clone())
            .collect();
        GrammarError::LeftRecursion {
            nonterminal: self.grammar[nt].name.clone(),
            cycle,
        }
    }
}
