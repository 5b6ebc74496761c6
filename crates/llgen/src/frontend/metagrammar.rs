// The grammar of grammar files, built by hand and parsed with the interpreter:
//
//   %root E
//   %tokens NUM '[0-9]+' PLUS '\+'
//   %grammar
//     E := T [ PLUS T ] # Sum first rest ;
//     T := NUM # Num val | '(' E ')' # Paren _ inner _ ;
//
// `[ .. ]` repeats, `< .. >` is optional, `$` is the empty body and `# _` drops the value of
// an empty body. Quoted names in bodies declare literal tokens on the fly; inside them `\n`,
// `\t`, `\r` and `\0` are control characters and any other `\x` stands for `x`.

use crate::grammar::{Binding, Grammar, GrammarBuilder, GrammarError};

pub(super) const STRING_PATTERN: &str = r#"'(?:[^'\\]|\\.)*'|"(?:[^"\\]|\\.)*""#;

pub(super) fn metagrammar() -> Result<Grammar, GrammarError> {
    let node = Binding::node;
    let mut builder = GrammarBuilder::new("Spec");
    builder
        .terminal("pound", "#")
        .terminal("bar", r"\|")
        .terminal("epsilon", r"\$")
        .terminal("lrepeat", r"\[")
        .terminal("rrepeat", r"\]")
        .terminal("lset", r"\{")
        .terminal("rset", r"\}")
        .terminal("lopt", "<")
        .terminal("ropt", ">")
        .terminal("string", STRING_PATTERN)
        .terminal("name", r"\w+")
        .terminal("root", "%root")
        .terminal("tokens", "%tokens")
        .terminal("grammar", "%grammar")
        .terminal("define", ":=")
        .terminal("semi", ";");

    builder
        .production(
            "Spec",
            &["root", "name", "tokens", "TokenPairs", "grammar", "Decls"],
            Some(node("Spec", &["_", "root", "_", "tokens", "_", "decls"])),
        )
        .production(
            "TokenPairs",
            &["name", "string", "TokenPairs"],
            Some(node("TokenPair", &["name", "pattern", "rest"])),
        )
        .epsilon("TokenPairs", None)
        .production("Decls", &["Decl", "Decls"], Some(node("Decls", &["decl", "rest"])))
        .epsilon("Decls", None)
        .production(
            "Decl",
            &["name", "define", "Alt", "Alts", "semi"],
            Some(node("Decl", &["name", "_", "alt", "alts", "_"])),
        )
        .production(
            "Alts",
            &["bar", "Alt", "Alts"],
            Some(node("Alts", &["_", "alt", "rest"])),
        )
        .epsilon("Alts", None)
        .production(
            "Alt",
            &["Exp", "Exps", "Binding"],
            Some(node("Alt", &["exp", "exps", "binding"])),
        )
        .production(
            "Alt",
            &["epsilon", "Binding"],
            Some(node("Epsilon", &["_", "binding"])),
        )
        .production("Exps", &["Exp", "Exps"], Some(node("Exps", &["exp", "rest"])))
        .epsilon("Exps", None);

    for (open, close, kind) in [
        ("lrepeat", "rrepeat", "Repeat"),
        ("lset", "rset", "Set"),
        ("lopt", "ropt", "Optional"),
    ] {
        builder.production(
            "Exp",
            &[open, "Exp", "Exps", close],
            Some(node(kind, &["_", "exp", "exps", "_"])),
        );
    }

    builder
        .production("Exp", &["name"], Some(node("Name", &["val"])))
        .production("Exp", &["string"], Some(node("Literal", &["val"])))
        .production(
            "Binding",
            &["pound", "name", "Names"],
            Some(node("Binding", &["_", "name", "names"])),
        )
        .epsilon("Binding", None)
        .production("Names", &["name", "Names"], Some(node("Names", &["name", "rest"])))
        .epsilon("Names", None);

    builder.build()
}
