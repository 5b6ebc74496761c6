// Rewrites repetition operators into plain productions over fresh nonterminals:
//
//   [ x.. ]  =>  _anon_RepeatN   := x.. _anon_RepeatN | $
//   < x.. >  =>  _anon_OptionalN := x.. | $
//   x.. +    =>  _anon_RepeatN   := x.. _anon_RepeatM ; _anon_RepeatM := x.. _anon_RepeatM | $
//
// The recursion is on the right so the result stays LL(1) friendly. Fresh productions are
// unbound, so they yield tuples, and come after all declared productions.

use llgen_util::RangeUInt;

use super::{builder::RuleDef, Binding, GrammarError, Item, FRESH_PREFIX};

#[derive(Clone, Debug, PartialEq, Eq)]
pub(super) struct FlatProduction {
    pub head: String,
    pub body: Vec<String>,
    pub binding: Option<Binding>,
}

#[derive(Default)]
struct Desugarer {
    fresh: Vec<FlatProduction>,
    counter: usize,
}

pub(super) fn desugar(rules: &[RuleDef]) -> Result<Vec<FlatProduction>, GrammarError> {
    let mut desugarer = Desugarer::default();
    let mut productions = Vec::with_capacity(rules.len());
    for rule in rules {
        if rule.head.starts_with(FRESH_PREFIX) {
            return Err(GrammarError::ReservedName(rule.head.clone()));
        }
        let body = desugarer.items(&rule.items)?;
        productions.push(FlatProduction {
            head: rule.head.clone(),
            body,
            binding: rule.binding.clone(),
        });
    }
    productions.append(&mut desugarer.fresh);
    Ok(productions)
}

impl Desugarer {
    fn fresh_name(&mut self, kind: &str) -> String {
        let name = format!("{}{}{}", FRESH_PREFIX, kind, self.counter);
        self.counter += 1;
        name
    }

    fn items(&mut self, items: &[Item]) -> Result<Vec<String>, GrammarError> {
        items.iter().map(|item| self.item(item)).collect()
    }

    fn unbound(&mut self, head: &str, body: Vec<String>) {
        self.fresh.push(FlatProduction {
            head: head.to_string(),
            body,
            binding: None,
        });
    }

    fn item(&mut self, item: &Item) -> Result<String, GrammarError> {
        match item {
            Item::Symbol(name) => Ok(name.clone()),
            Item::Set(_) => Err(GrammarError::UnsupportedOperator("set")),
            Item::Repeat(inner, _, _) if inner.is_empty() => {
                Err(GrammarError::UnsupportedOperator("empty repetition"))
            }
            Item::Repeat(inner, low, high) => match (*low, *high) {
                (RangeUInt::Finite(0), RangeUInt::Infinite) => {
                    let name = self.fresh_name("Repeat");
                    let mut body = self.items(inner)?;
                    body.push(name.clone());
                    self.unbound(&name, body);
                    self.unbound(&name, Vec::new());
                    Ok(name)
                }
                (RangeUInt::Finite(0), RangeUInt::Finite(1)) => {
                    let name = self.fresh_name("Optional");
                    let body = self.items(inner)?;
                    self.unbound(&name, body);
                    self.unbound(&name, Vec::new());
                    Ok(name)
                }
                (RangeUInt::Finite(1), RangeUInt::Infinite) => {
                    let name = self.fresh_name("Repeat");
                    let star = self.item(&Item::repeat(inner.clone()))?;
                    let mut body = self.items(inner)?;
                    body.push(star);
                    self.unbound(&name, body);
                    Ok(name)
                }
                _ => Err(GrammarError::UnsupportedOperator(
                    "repetition bounds other than *, + and ?",
                )),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(head: &str, items: Vec<Item>) -> RuleDef {
        RuleDef {
            head: head.to_string(),
            items,
            binding: None,
        }
    }

    fn flat(head: &str, body: &[&str]) -> FlatProduction {
        FlatProduction {
            head: head.to_string(),
            body: body.iter().map(|s| s.to_string()).collect(),
            binding: None,
        }
    }

    #[test]
    fn repeat_becomes_right_recursion() {
        let rules = vec![rule(
            "List",
            vec![Item::symbol("x"), Item::repeat(vec![Item::symbol(","), Item::symbol("x")])],
        )];
        assert_eq!(
            desugar(&rules).unwrap(),
            vec![
                flat("List", &["x", "_anon_Repeat0"]),
                flat("_anon_Repeat0", &[",", "x", "_anon_Repeat0"]),
                flat("_anon_Repeat0", &[]),
            ]
        );
    }

    #[test]
    fn optional_and_nesting_share_the_counter() {
        let rules = vec![rule(
            "S",
            vec![Item::optional(vec![
                Item::symbol("a"),
                Item::repeat(vec![Item::symbol("b")]),
            ])],
        )];
        assert_eq!(
            desugar(&rules).unwrap(),
            vec![
                flat("S", &["_anon_Optional0"]),
                flat("_anon_Repeat1", &["b", "_anon_Repeat1"]),
                flat("_anon_Repeat1", &[]),
                flat("_anon_Optional0", &["a", "_anon_Repeat1"]),
                flat("_anon_Optional0", &[]),
            ]
        );
    }

    #[test]
    fn one_or_more() {
        let rules = vec![rule(
            "S",
            vec![Item::Repeat(
                vec![Item::symbol("a")],
                RangeUInt::Finite(1),
                RangeUInt::Infinite,
            )],
        )];
        assert_eq!(
            desugar(&rules).unwrap(),
            vec![
                flat("S", &["_anon_Repeat0"]),
                flat("_anon_Repeat1", &["a", "_anon_Repeat1"]),
                flat("_anon_Repeat1", &[]),
                flat("_anon_Repeat0", &["a", "_anon_Repeat1"]),
            ]
        );
    }

    #[test]
    fn declared_heads_cannot_take_fresh_names() {
        let rules = vec![rule("_anon_Optional3", vec![Item::symbol("a")])];
        assert_eq!(
            desugar(&rules).unwrap_err(),
            GrammarError::ReservedName("_anon_Optional3".to_string())
        );
    }

    #[test]
    fn sets_are_rejected() {
        let rules = vec![rule("S", vec![Item::Set(vec![Item::symbol("a")])])];
        assert_eq!(
            desugar(&rules).unwrap_err(),
            GrammarError::UnsupportedOperator("set")
        );
    }
}
