use std::collections::{hash_map::Entry, HashMap};

use llgen_lex::LexTable;
use llgen_util::RangeUInt;

use super::{
    ebnf, Binding, Field, Grammar, GrammarError, NontermIdx, Nonterminal, ProdIdx, Production, Symbol,
    TermIdx, Terminal,
};

/// One element of a production body before desugaring.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Item {
    Symbol(String),
    Repeat(Vec<Item>, RangeUInt, RangeUInt),
    Set(Vec<Item>),
}

impl Item {
    pub fn symbol(name: &str) -> Item {
        Item::Symbol(name.to_string())
    }

    /// `[ items ]`: zero or more.
    pub fn repeat(items: Vec<Item>) -> Item {
        Item::Repeat(items, RangeUInt::Finite(0), RangeUInt::Infinite)
    }

    /// `< items >`: zero or one.
    pub fn optional(items: Vec<Item>) -> Item {
        Item::Repeat(items, RangeUInt::Finite(0), RangeUInt::Finite(1))
    }
}

#[derive(Clone, Debug)]
pub(super) struct RuleDef {
    pub head: String,
    pub items: Vec<Item>,
    pub binding: Option<Binding>,
}

/// Collects declarations in order; nothing is resolved until [`GrammarBuilder::build`].
#[derive(Clone, Debug)]
pub struct GrammarBuilder {
    start: String,
    terminals: Vec<(String, String)>,
    rules: Vec<RuleDef>,
}

impl GrammarBuilder {
    pub fn new(start: &str) -> GrammarBuilder {
        GrammarBuilder {
            start: start.to_string(),
            terminals: Vec::new(),
            rules: Vec::new(),
        }
    }

    /// Declaration order is lexical priority.
    pub fn terminal(&mut self, name: &str, pattern: &str) -> &mut Self {
        self.terminals.push((name.to_string(), pattern.to_string()));
        self
    }

    pub fn has_terminal(&self, name: &str) -> bool {
        self.terminals.iter().any(|(n, _)| n == name)
    }

    pub fn production<S: AsRef<str>>(
        &mut self,
        head: &str,
        body: &[S],
        binding: Option<Binding>,
    ) -> &mut Self {
        let items = body.iter().map(|s| Item::symbol(s.as_ref())).collect();
        self.rule(head, items, binding)
    }

    pub fn epsilon(&mut self, head: &str, binding: Option<Binding>) -> &mut Self {
        self.rule(head, Vec::new(), binding)
    }

    pub fn rule(&mut self, head: &str, items: Vec<Item>, binding: Option<Binding>) -> &mut Self {
        self.rules.push(RuleDef {
            head: head.to_string(),
            items,
            binding,
        });
        self
    }

    pub fn build(&self) -> Result<Grammar, GrammarError> {
        let flat = ebnf::desugar(&self.rules)?;

        let mut terminals: Vec<Terminal> = Vec::new();
        let mut terminal_names: HashMap<String, TermIdx> = HashMap::new();
        for (name, pattern) in &self.terminals {
            match terminal_names.entry(name.clone()) {
                Entry::Occupied(_) => return Err(GrammarError::DuplicateSymbol(name.clone())),
                Entry::Vacant(slot) => {
                    slot.insert(TermIdx::from_push(
                        &mut terminals,
                        Terminal {
                            name: name.clone(),
                            pattern: pattern.clone(),
                        },
                    ));
                }
            }
        }

        // pass 1: nonterminals in order of first declaration
        let mut nonterminals: Vec<Nonterminal> = Vec::new();
        let mut nonterminal_names: HashMap<String, NontermIdx> = HashMap::new();
        for production in &flat {
            if nonterminal_names.contains_key(&production.head) {
                continue;
            }
            if terminal_names.contains_key(&production.head) {
                return Err(GrammarError::DuplicateSymbol(production.head.clone()));
            }
            let nt = NontermIdx::from_push(
                &mut nonterminals,
                Nonterminal {
                    name: production.head.clone(),
                    productions: Vec::new(),
                    is_start: production.head == self.start,
                },
            );
            nonterminal_names.insert(production.head.clone(), nt);
        }

        let start = *nonterminal_names
            .get(&self.start)
            .ok_or_else(|| GrammarError::UnknownStart(self.start.clone()))?;

        // pass 2: resolve bodies
        let mut productions: Vec<Production> = Vec::new();
        for production in flat {
            let head = nonterminal_names[&production.head];
            let mut body = Vec::with_capacity(production.body.len());
            for name in &production.body {
                let symbol = if let Some(&t) = terminal_names.get(name) {
                    Symbol::Terminal(t)
                } else if let Some(&nt) = nonterminal_names.get(name) {
                    Symbol::Nonterminal(nt)
                } else {
                    return Err(GrammarError::UndeclaredSymbol {
                        head: production.head.clone(),
                        name: name.clone(),
                    });
                };
                body.push(symbol);
            }

            match &production.binding {
                Some(Binding::Node { node_type, fields }) if fields.len() != body.len() => {
                    return Err(GrammarError::BindingArity {
                        head: production.head.clone(),
                        node_type: node_type.clone(),
                        fields: fields.len(),
                        symbols: body.len(),
                    })
                }
                Some(Binding::Node { node_type, fields }) => {
                    let mut seen: Vec<&str> = Vec::with_capacity(fields.len());
                    for field in fields {
                        let Field::Named(name) = field else {
                            continue;
                        };
                        if seen.contains(&name.as_str()) {
                            return Err(GrammarError::DuplicateField {
                                head: production.head.clone(),
                                node_type: node_type.clone(),
                                field: name.clone(),
                            });
                        }
                        seen.push(name.as_str());
                    }
                }
                Some(Binding::Suppressed) if !body.is_empty() => {
                    return Err(GrammarError::SuppressedNonEpsilon {
                        head: production.head.clone(),
                    })
                }
                _ => {}
            }

            let p = ProdIdx::from_push(
                &mut productions,
                Production {
                    head,
                    body,
                    binding: production.binding,
                },
            );
            nonterminals[head].productions.push(p);
        }

        let lex_table = LexTable::new(
            terminals
                .iter()
                .map(|t| (t.name.as_str(), t.pattern.as_str())),
        )?;

        log::debug!(
            "built grammar: {} terminals, {} nonterminals, {} productions",
            terminals.len(),
            nonterminals.len(),
            productions.len()
        );

        Ok(Grammar {
            terminals,
            nonterminals,
            productions,
            start,
            lex_table,
            terminal_names,
            nonterminal_names,
        })
    }
}
