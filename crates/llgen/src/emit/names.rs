use std::collections::HashSet;

use convert_case::{Case, Casing};

const KEYWORDS: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "crate",
    "do", "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "gen", "if", "impl",
    "in", "let", "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub",
    "ref", "return", "self", "Self", "static", "struct", "super", "trait", "true", "try",
    "type", "typeof", "union", "unsafe", "unsized", "use", "virtual", "where", "while", "yield",
];

/// Hands out unique Rust identifiers for grammar names within one namespace.
pub(super) struct Namer {
    used: HashSet<String>,
}

impl Namer {
    pub fn new(reserved: &[&str]) -> Namer {
        Namer {
            used: reserved.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// `fallback` replaces a name with no usable characters and prefixes one that would
    /// start with a digit.
    pub fn name(&mut self, raw: &str, case: Case, fallback: &str) -> String {
        let cased = raw.to_case(case);
        let mut ident: String = cased
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
            .collect();
        if ident.trim_matches('_').is_empty() {
            ident = fallback.to_string();
        } else if ident.starts_with(|c: char| c.is_ascii_digit()) {
            ident.insert_str(0, fallback);
        }
        if KEYWORDS.contains(&ident.as_str()) {
            ident.push('_');
        }

        let mut candidate = ident.clone();
        let mut n = 1;
        while !self.used.insert(candidate.clone()) {
            candidate = format!("{}_{}", ident, n);
            n += 1;
        }
        candidate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_valid_and_unique() {
        let mut namer = Namer::new(&["attrs"]);
        assert_eq!(namer.name("truebranch", Case::Snake, "field"), "truebranch");
        assert_eq!(namer.name("type", Case::Snake, "field"), "type_");
        assert_eq!(namer.name("attrs", Case::Snake, "field"), "attrs_1");
        assert_eq!(namer.name("+", Case::Snake, "field"), "field");
        assert_eq!(namer.name("*", Case::Snake, "field"), "field_1");
        assert_eq!(namer.name("2", Case::Snake, "field"), "field2");
    }

    #[test]
    fn pascal_case_types() {
        let mut namer = Namer::new(&[]);
        assert_eq!(namer.name("expr", Case::Pascal, "Node"), "Expr");
        assert_eq!(namer.name("self", Case::Pascal, "Node"), "Self_");
    }
}
