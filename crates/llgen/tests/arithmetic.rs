use std::cell::RefCell;

use llgen::{
    grammar::{Analysis, Binding, GrammarBuilder, ProdIdx},
    parser::{FailureKind, ParseError, ParseObserver, Value},
    CompiledGrammar,
};

fn arith() -> CompiledGrammar {
    let node = Binding::node;
    let mut builder = GrammarBuilder::new("E");
    builder
        .terminal("+", r"\+")
        .terminal("*", r"\*")
        .terminal("(", r"\(")
        .terminal(")", r"\)")
        .terminal("NUM", "[0-9]+")
        .production("E", &["T", "Ep"], Some(node("Expr", &["term", "rest"])))
        .production("Ep", &["+", "T", "Ep"], Some(node("Plus", &["_", "term", "rest"])))
        .epsilon("Ep", Some(Binding::Suppressed))
        .production("T", &["F", "Tp"], Some(node("Term", &["factor", "rest"])))
        .production("Tp", &["*", "F", "Tp"], Some(node("Mult", &["_", "factor", "rest"])))
        .epsilon("Tp", Some(Binding::Suppressed))
        .production("F", &["(", "E", ")"], Some(node("Paren", &["_", "expr", "_"])))
        .production("F", &["NUM"], Some(node("Num", &["val"])));
    CompiledGrammar::new(builder.build().unwrap()).unwrap()
}

fn term(num: &str, rest: &str) -> String {
    format!("Term[factor: Num[val: \"{}\"], rest: {}]", num, rest)
}

#[test]
fn test_expression_parse() {
    let compiled = arith();
    let tree = compiled.parse("3+4*(9+2)").unwrap();

    let inner = format!(
        "Expr[term: {}, rest: Plus[_: \"+\", term: {}, rest: None]]",
        term("9", "None"),
        term("2", "None")
    );
    let mult = format!(
        "Mult[_: \"*\", factor: Paren[_: \"(\", expr: {}, _: \")\"], rest: None]",
        inner
    );
    let expected = format!(
        "Expr[term: {}, rest: Plus[_: \"+\", term: {}, rest: None]]",
        term("3", "None"),
        term("4", &mult)
    );
    assert_eq!(tree.to_string(), expected);

    let expr = tree.as_node().unwrap();
    assert_eq!(expr.kind(), "Expr");
    let plus = expr.field("rest").and_then(Value::as_node).unwrap();
    assert_eq!(plus.kind(), "Plus");
    assert_eq!(plus.field("rest"), None);
}

#[test]
fn test_incomplete_input() {
    let err = arith().parse("3+").unwrap_err();
    assert_eq!(err.kind(), FailureKind::Parse);
    assert_eq!(err.line(), 1);
    let expected = err.expected_tokens();
    assert!(expected.contains(&"NUM"));
    assert!(expected.contains(&"("));
    assert_eq!(
        err.to_string(),
        "Parse Error, line 1: while parsing T expected one of [(, NUM], but found token EOF:"
    );
}

#[test]
fn test_missing_token() {
    let err = arith().parse("3\n+\n(4").unwrap_err();
    assert_eq!(
        err,
        ParseError::UnexpectedToken {
            line: 3,
            expected: ")".to_string(),
            found: "EOF".to_string(),
            text: String::new(),
        }
    );
    assert_eq!(
        err.to_string(),
        "Parse Error, line 3: Expected token ), but found token EOF:"
    );
}

#[test]
fn test_trailing_input() {
    let err = arith().parse("3)").unwrap_err();
    assert_eq!(err.kind(), FailureKind::TrailingInput);
    assert_eq!(
        err.to_string(),
        "Parse Error, line 1: Couldn't parse all of input. Next token: ):)"
    );
}

#[test]
fn test_scan_error() {
    let err = arith().parse("3 ? 4").unwrap_err();
    assert_eq!(err.kind(), FailureKind::Scan);
    assert_eq!(
        err.to_string(),
        "Lexer Error, line 1: No matching token found. Remaining input: ? 4 ...."
    );
}

#[test]
fn test_empty_input() {
    let err = arith().parse("  \n ").unwrap_err();
    assert_eq!(err.line(), 2);
    assert!(matches!(err, ParseError::NoAlternative { ref nonterminal, .. } if nonterminal == "E"));
}

#[derive(Default)]
struct Recorder {
    events: RefCell<Vec<String>>,
}

impl ParseObserver for Recorder {
    fn enter(&self, nonterminal: &str, line: usize) {
        self.events
            .borrow_mut()
            .push(format!("{}@{}", nonterminal, line));
    }

    fn consume(&self, token: &str, text: &str) {
        self.events.borrow_mut().push(format!("{}={}", token, text));
    }
}

#[test]
fn test_observer_sees_calls_and_tokens() {
    let compiled = arith();
    let recorder = Recorder::default();
    compiled
        .parser()
        .with_observer(&recorder)
        .parse("1\n*2")
        .unwrap();
    assert_eq!(
        recorder.events.into_inner(),
        vec!["E@1", "T@1", "F@1", "NUM=1", "Tp@2", "*=*", "F@2", "NUM=2", "Tp@2", "Ep@2"]
    );
}

#[test]
fn test_compilation_is_deterministic() {
    let (a, b) = (arith(), arith());
    let grammar = a.grammar();
    for id in 0..grammar.n_symbols() {
        let symbol = grammar.symbol_from_id(id);
        assert_eq!(
            a.analysis().first(grammar, symbol),
            b.analysis().first(b.grammar(), symbol)
        );
        assert_eq!(
            a.analysis().follow(grammar, symbol),
            b.analysis().follow(b.grammar(), symbol)
        );
    }
    let options = Default::default();
    assert_eq!(a.emit(&options), b.emit(&options));
}

#[test]
fn test_reanalysis_matches_cached_sets() {
    let compiled = arith();
    let grammar = compiled.grammar();
    let again = Analysis::new(grammar).unwrap();
    let cached = compiled.analysis();

    assert_eq!(again.reachable(), cached.reachable());
    for id in 0..grammar.n_symbols() {
        let symbol = grammar.symbol_from_id(id);
        assert_eq!(again.first(grammar, symbol), cached.first(grammar, symbol));
        assert_eq!(again.follow(grammar, symbol), cached.follow(grammar, symbol));
    }
    for i in 0..grammar.productions().len() {
        let p = ProdIdx::from_usize(i);
        assert_eq!(again.production_first(p), cached.production_first(p));
        assert_eq!(again.last_propagating_index(p), cached.last_propagating_index(p));
    }
}
