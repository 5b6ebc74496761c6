use crate::{
    grammar::{Binding, GrammarBuilder, Item, DISCARD},
    parser::{Node, Value},
};

use super::LoadError;

fn expect_node<'v>(value: Option<&'v Value>, kind: &'static str) -> Result<&'v Node, LoadError> {
    match value.and_then(Value::as_node) {
        Some(node) if node.kind() == kind => Ok(node),
        _ => Err(LoadError::Malformed(kind)),
    }
}

fn token<'v>(node: &'v Node, field: &'static str) -> Result<&'v str, LoadError> {
    node.field(field)
        .and_then(Value::as_token)
        .ok_or(LoadError::Malformed(field))
}

fn strip_quotes(quoted: &str) -> Result<&str, LoadError> {
    if quoted.len() < 2 {
        return Err(LoadError::Malformed("string"));
    }
    Ok(&quoted[1..quoted.len() - 1])
}

// `\n`, `\t`, `\r` and `\0` are control characters, any other `\x` is `x`
fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(escaped) = chars.next() {
                out.push(match escaped {
                    'n' => '\n',
                    't' => '\t',
                    'r' => '\r',
                    '0' => '\0',
                    other => other,
                });
                continue;
            }
        }
        out.push(c);
    }
    out
}

/// Turns the tree of a grammar file into a builder. Terminals come first in declaration
/// order, then literal tokens in order of first use.
pub(super) fn lower(tree: &Value) -> Result<GrammarBuilder, LoadError> {
    let spec = expect_node(Some(tree), "Spec")?;
    let mut builder = GrammarBuilder::new(token(spec, "root")?);

    let mut pairs = spec.field("tokens");
    while pairs.is_some() {
        let pair = expect_node(pairs, "TokenPair")?;
        let pattern = strip_quotes(token(pair, "pattern")?)?;
        builder.terminal(token(pair, "name")?, pattern);
        pairs = pair.field("rest");
    }

    let mut decls = spec.field("decls");
    while decls.is_some() {
        let link = expect_node(decls, "Decls")?;
        let decl = expect_node(link.field("decl"), "Decl")?;
        let head = token(decl, "name")?;

        lower_alternative(&mut builder, head, decl.field("alt"))?;
        let mut alts = decl.field("alts");
        while alts.is_some() {
            let link = expect_node(alts, "Alts")?;
            lower_alternative(&mut builder, head, link.field("alt"))?;
            alts = link.field("rest");
        }

        decls = link.field("rest");
    }

    Ok(builder)
}

fn lower_alternative(
    builder: &mut GrammarBuilder,
    head: &str,
    alt: Option<&Value>,
) -> Result<(), LoadError> {
    let node = alt
        .and_then(Value::as_node)
        .ok_or(LoadError::Malformed("Alt"))?;
    let items = match node.kind() {
        "Alt" => lower_sequence(builder, node.field("exp"), node.field("exps"))?,
        "Epsilon" => Vec::new(),
        _ => return Err(LoadError::Malformed("Alt")),
    };
    let binding = lower_binding(node.field("binding"))?;
    builder.rule(head, items, binding);
    Ok(())
}

fn lower_sequence(
    builder: &mut GrammarBuilder,
    first: Option<&Value>,
    mut rest: Option<&Value>,
) -> Result<Vec<Item>, LoadError> {
    let mut items = vec![lower_exp(builder, first)?];
    while rest.is_some() {
        let link = expect_node(rest, "Exps")?;
        items.push(lower_exp(builder, link.field("exp"))?);
        rest = link.field("rest");
    }
    Ok(items)
}

fn lower_exp(builder: &mut GrammarBuilder, exp: Option<&Value>) -> Result<Item, LoadError> {
    let node = exp
        .and_then(Value::as_node)
        .ok_or(LoadError::Malformed("Exp"))?;
    let item = match node.kind() {
        "Name" => Item::symbol(token(node, "val")?),
        "Literal" => {
            let text = unescape(strip_quotes(token(node, "val")?)?);
            if !builder.has_terminal(&text) {
                builder.terminal(&text, &regex::escape(&text));
            }
            Item::Symbol(text)
        }
        "Repeat" => Item::repeat(lower_sequence(builder, node.field("exp"), node.field("exps"))?),
        "Optional" => {
            Item::optional(lower_sequence(builder, node.field("exp"), node.field("exps"))?)
        }
        "Set" => Item::Set(lower_sequence(builder, node.field("exp"), node.field("exps"))?),
        _ => return Err(LoadError::Malformed("Exp")),
    };
    Ok(item)
}

fn lower_binding(binding: Option<&Value>) -> Result<Option<Binding>, LoadError> {
    if binding.is_none() {
        return Ok(None);
    }
    let node = expect_node(binding, "Binding")?;
    let name = token(node, "name")?;

    let mut fields = Vec::new();
    let mut names = node.field("names");
    while names.is_some() {
        let link = expect_node(names, "Names")?;
        fields.push(token(link, "name")?);
        names = link.field("rest");
    }

    if name == DISCARD && fields.is_empty() {
        Ok(Some(Binding::Suppressed))
    } else {
        Ok(Some(Binding::node(name, &fields)))
    }
}
