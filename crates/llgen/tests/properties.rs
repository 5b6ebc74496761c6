use llgen::{
    grammar::{Analysis, Binding, Grammar, GrammarBuilder, GrammarError, Symbol},
    load_grammar, CompiledGrammar,
};

fn grammars() -> Vec<Grammar> {
    let sources = [
        r"%root E
          %tokens NUM '[0-9]+'
          %grammar
            E := T Ep ;
            Ep := '+' T Ep | $ ;
            T := F Tp ;
            Tp := '*' F Tp | $ ;
            F := '(' E ')' | NUM ;",
        r"%root S
          %tokens a 'a' b 'b' c 'c'
          %grammar
            S := A B C # Triple x y z ;
            A := a | $ ;
            B := b | $ ;
            C := c A | $ ;",
        r"%root Block
          %tokens name '\w+'
          %grammar
            Block := '{' [ Stmt ] '}' # Block _ stmts _ ;
            Stmt := name < '=' name > ';' # Stmt target value _ | Block # Nested block ;",
    ];
    sources
        .iter()
        .map(|source| load_grammar(source).unwrap())
        .collect()
}

#[test]
fn test_follow_contains_first_of_successor() {
    for grammar in grammars() {
        let analysis = Analysis::new(&grammar).unwrap();
        for &nt in analysis.reachable() {
            for &p in &grammar[nt].productions {
                for pair in grammar[p].body.windows(2) {
                    let successor = analysis.first(&grammar, pair[1]);
                    let follow = analysis.follow(&grammar, pair[0]);
                    for t in successor.terminals() {
                        assert!(
                            follow.contains_terminal(t),
                            "FOLLOW({}) is missing {}",
                            grammar.symbol_name(pair[0]),
                            grammar[t].name
                        );
                    }
                }
            }
        }
    }
}

#[test]
fn test_start_is_followed_by_eof() {
    for grammar in grammars() {
        let analysis = Analysis::new(&grammar).unwrap();
        assert!(analysis
            .follow(&grammar, Symbol::Nonterminal(grammar.start()))
            .contains_eof());
    }
}

#[test]
fn test_first_covers_alternatives() {
    for grammar in grammars() {
        let analysis = Analysis::new(&grammar).unwrap();
        for (i, nonterminal) in grammar.nonterminals().iter().enumerate() {
            let symbol = grammar.symbol_from_id(grammar.terminals().len() + i);
            let first = analysis.first(&grammar, symbol);
            let mut nullable = false;
            for &p in &nonterminal.productions {
                let production_first = analysis.production_first(p);
                for t in production_first.terminals() {
                    assert!(first.contains_terminal(t));
                }
                nullable |= production_first.contains_epsilon();
            }
            assert_eq!(first.contains_epsilon(), nullable, "{}", nonterminal.name);
        }
    }
}

#[test]
fn test_nullable_tail_propagates_follow() {
    let grammar = &grammars()[1];
    let analysis = Analysis::new(grammar).unwrap();
    // S := A B C with B and C nullable: A can end S, and so can see EOF
    let a = Symbol::Nonterminal(grammar.nonterminal("A").unwrap());
    let follow = analysis.follow(grammar, a);
    assert!(follow.contains_eof());
    let names = follow.terminal_names(grammar);
    assert_eq!(names, vec!["b", "c"]);
}

#[test]
fn test_keyword_order_decides_scanning() {
    let build = |keyword_first: bool| {
        let mut builder = GrammarBuilder::new("S");
        if keyword_first {
            builder.terminal("if", "if").terminal("name", r"\w+");
        } else {
            builder.terminal("name", r"\w+").terminal("if", "if");
        }
        builder
            .production("S", &["if", "name"], Some(Binding::node("If", &["_", "cond"])))
            .production("S", &["name"], Some(Binding::node("Name", &["id"])));
        CompiledGrammar::new(builder.build().unwrap()).unwrap()
    };

    let ordered = build(true);
    assert_eq!(
        ordered.parse("if x").unwrap().to_string(),
        r#"If[_: "if", cond: "x"]"#
    );

    let shadowed = build(false);
    assert_eq!(
        shadowed.parse("if").unwrap().to_string(),
        r#"Name[id: "if"]"#
    );
    assert!(shadowed.parse("if x").is_err());
}

#[test]
fn test_suppressed_epsilon_reads_as_absent() {
    let mut builder = GrammarBuilder::new("L");
    builder
        .terminal("x", "x")
        .production("L", &["x", "L"], Some(Binding::node("Cons", &["head", "tail"])))
        .epsilon("L", Some(Binding::Suppressed));
    let compiled = CompiledGrammar::new(builder.build().unwrap()).unwrap();

    let tree = compiled.parse("x x").unwrap();
    assert_eq!(
        tree.to_string(),
        r#"Cons[head: "x", tail: Cons[head: "x", tail: None]]"#
    );
    let inner = tree
        .as_node()
        .and_then(|node| node.field("tail"))
        .and_then(|tail| tail.as_node())
        .unwrap();
    assert_eq!(inner.field("tail"), None);
    assert!(compiled.parse("").unwrap().is_empty());
}

#[test]
fn test_unbound_productions_yield_tuples() {
    let compiled = CompiledGrammar::new(grammars().remove(2)).unwrap();
    assert!(compiled.grammar().nonterminal("_anon_Repeat0").is_some());

    let tree = compiled.parse("{ a = b; { c; } }").unwrap();
    assert_eq!(
        tree.to_string(),
        concat!(
            r#"Block[_: "{", stmts: (Stmt[target: "a", value: ("=", "b"), _: ";"], "#,
            r#"(Nested[block: Block[_: "{", stmts: (Stmt[target: "c", value: None, _: ";"], None), _: "}"]], "#,
            r#"None)), _: "}"]"#
        )
    );
}

#[test]
fn test_left_recursion_is_a_grammar_error() {
    let grammar = load_grammar(
        r"%root E
          %tokens NUM '[0-9]+'
          %grammar
            E := E '+' NUM | NUM ;",
    )
    .unwrap();
    assert!(matches!(
        CompiledGrammar::new(grammar),
        Err(GrammarError::LeftRecursion { .. })
    ));
}
