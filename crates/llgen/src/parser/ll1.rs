// Prediction table. Alternatives are tried in declaration order and the first whose FIRST
// set holds the lookahead wins; when none does, the first nullable alternative is taken.
// Overlaps between alternatives are resolved by that order and only reported.

use crate::grammar::{Analysis, Grammar, NontermIdx, ProdIdx, TermIdx, TerminalSet};

#[derive(Clone, Debug)]
pub struct Rule {
    pub production: ProdIdx,
    /// FIRST of the production without epsilon.
    pub lookahead: TerminalSet,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Selection {
    Alternative(ProdIdx),
    Epsilon(ProdIdx),
    NoMatch,
}

#[derive(Clone, Debug)]
pub struct NonterminalTable {
    pub rules: Vec<Rule>,
    /// First nullable alternative.
    pub epsilon: Option<ProdIdx>,
}

impl NonterminalTable {
    /// `None` is end of input.
    pub fn select(&self, lookahead: Option<TermIdx>) -> Selection {
        if let Some(t) = lookahead {
            if let Some(rule) = self.rules.iter().find(|r| r.lookahead.contains_terminal(t)) {
                return Selection::Alternative(rule.production);
            }
        }
        match self.epsilon {
            Some(p) => Selection::Epsilon(p),
            None => Selection::NoMatch,
        }
    }

    /// Expected token names, one list per alternative.
    pub fn expected(&self, grammar: &Grammar) -> Vec<Vec<String>> {
        self.rules
            .iter()
            .map(|rule| {
                rule.lookahead
                    .terminal_names(grammar)
                    .into_iter()
                    .map(str::to_string)
                    .collect()
            })
            .collect()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lookahead {
    Terminal(TermIdx),
    Epsilon,
}

/// Two alternatives of one nonterminal that both accept `lookahead`; `chosen` comes first.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Conflict {
    pub nonterminal: NontermIdx,
    pub lookahead: Lookahead,
    pub chosen: ProdIdx,
    pub shadowed: ProdIdx,
}

impl Conflict {
    pub fn describe(&self, grammar: &Grammar) -> String {
        let lookahead = match self.lookahead {
            Lookahead::Terminal(t) => grammar[t].name.as_str(),
            Lookahead::Epsilon => "$",
        };
        format!(
            "`{}` on {}: `{}` shadows `{}`",
            grammar[self.nonterminal].name,
            lookahead,
            grammar[self.chosen].display(grammar),
            grammar[self.shadowed].display(grammar)
        )
    }
}

#[derive(Debug)]
pub struct Ll1Table {
    entries: Vec<NonterminalTable>,
    conflicts: Vec<Conflict>,
}

impl Ll1Table {
    pub fn new(grammar: &Grammar, analysis: &Analysis) -> Ll1Table {
        let entries: Vec<NonterminalTable> = grammar
            .nonterminals()
            .iter()
            .map(|nonterminal| {
                let rules = nonterminal
                    .productions
                    .iter()
                    .map(|&p| Rule {
                        production: p,
                        lookahead: analysis.production_first(p).without_epsilon(),
                    })
                    .collect();
                let epsilon = nonterminal
                    .productions
                    .iter()
                    .copied()
                    .find(|&p| analysis.production_first(p).contains_epsilon());
                NonterminalTable { rules, epsilon }
            })
            .collect();

        let mut conflicts = Vec::new();
        for &nt in analysis.reachable() {
            let productions = &grammar[nt].productions;
            for (i, &chosen) in productions.iter().enumerate() {
                for &shadowed in &productions[i + 1..] {
                    let (a, b) = (
                        analysis.production_first(chosen),
                        analysis.production_first(shadowed),
                    );
                    let common = a.intersection(b);
                    conflicts.extend(common.terminals().map(|t| Conflict {
                        nonterminal: nt,
                        lookahead: Lookahead::Terminal(t),
                        chosen,
                        shadowed,
                    }));
                    if common.contains_epsilon() {
                        conflicts.push(Conflict {
                            nonterminal: nt,
                            lookahead: Lookahead::Epsilon,
                            chosen,
                            shadowed,
                        });
                    }
                }
            }
        }
        for conflict in &conflicts {
            log::warn!("LL(1) conflict: {}", conflict.describe(grammar));
        }

        Ll1Table { entries, conflicts }
    }

    pub fn entry(&self, nt: NontermIdx) -> &NonterminalTable {
        &self.entries[nt.index()]
    }

    pub fn conflicts(&self) -> &[Conflict] {
        &self.conflicts
    }
}
