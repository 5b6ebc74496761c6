// Renders a `ParserModule` as one Rust source file. The output has no inner attributes, so
// it can be pulled into a module with `include!`. It needs the `regex` crate.

use std::collections::HashMap;

use codegen::{Block, Enum, Function, Impl, Module, Scope, Struct};
use convert_case::Case;

use super::{
    ast::{Body, Fallback, NodeDecl, ParserModule, ResultShape, Routine, Step},
    names::Namer,
    Backend,
};
use crate::parser::FieldKey;

const PRELUDE: &str = include_str!("prelude.rs.in");

const VALUE: &str = "super::Value";

pub struct RustBackend;

struct Names {
    routines: HashMap<String, String>,
    node_types: HashMap<String, String>,
    // per node type: grammar field name to struct field name
    fields: HashMap<String, Vec<(String, String)>>,
}

impl Names {
    fn new(module: &ParserModule) -> Names {
        // `parse_root` is the fixed entry point
        let mut routine_namer = Namer::new(&["root"]);
        let routines = module
            .routines
            .iter()
            .map(|r| {
                let name = routine_namer.name(&r.nonterminal, Case::Snake, "nonterminal");
                (r.nonterminal.clone(), format!("parse_{}", name))
            })
            .collect();

        let mut type_namer = Namer::new(&[]);
        let mut node_types = HashMap::new();
        let mut fields = HashMap::new();
        for decl in &module.node_types {
            node_types.insert(
                decl.name.clone(),
                type_namer.name(&decl.name, Case::Pascal, "Node"),
            );
            let mut field_namer = Namer::new(&["attrs"]);
            let mangled = decl
                .fields
                .iter()
                .map(|f| (f.clone(), field_namer.name(f, Case::Snake, "field")))
                .collect();
            fields.insert(decl.name.clone(), mangled);
        }

        Names {
            routines,
            node_types,
            fields,
        }
    }

    fn routine(&self, nonterminal: &str) -> &str {
        self.routines
            .get(nonterminal)
            .map(String::as_str)
            .unwrap_or("parse_root")
    }

    fn node_type<'a>(&'a self, name: &'a str) -> &'a str {
        self.node_types.get(name).map(String::as_str).unwrap_or(name)
    }
}

fn string_list(names: &[String]) -> String {
    let quoted: Vec<String> = names.iter().map(|n| format!("{:?}", n)).collect();
    format!("&[{}]", quoted.join(", "))
}

impl RustBackend {
    fn header(&self, module: &ParserModule, scope: &mut Scope) {
        let mut header = format!(
            "// Parser for `{}` generated by llgen. Do not edit.\n",
            module.start
        );
        if let Some(extra) = &module.header {
            for line in extra.lines() {
                header.push_str(&format!("// {}\n", line));
            }
        }
        scope.raw(&header);
    }

    fn node_struct(&self, decl: &NodeDecl, names: &Names) -> (Struct, Impl) {
        let type_name = names.node_type(&decl.name);
        let fields = names
            .fields
            .get(&decl.name)
            .map(Vec::as_slice)
            .unwrap_or(&[]);

        let mut node = Struct::new(type_name);
        node.vis("pub")
            .derive("Clone")
            .derive("Debug")
            .derive("PartialEq")
            .derive("Eq");
        for (_, field) in fields {
            node.field(format!("pub {}", field).as_str(), VALUE);
        }
        node.field("pub attrs", format!("Vec<(&'static str, {})>", VALUE).as_str());

        let mut node_impl = Impl::new(type_name);
        let new = node_impl.new_fn("new");
        new.vis("pub")
            .arg("attrs", format!("Vec<(&'static str, {})>", VALUE).as_str())
            .ret("Self");
        if fields.is_empty() {
            new.line("Self { attrs }");
        } else {
            let mut init = Block::new(&format!("let mut node = {}", type_name));
            for (_, field) in fields {
                init.line(format!("{}: {}::Empty,", field, VALUE));
            }
            init.line("attrs: Vec::new(),");
            init.after(";");
            new.push_block(init);

            let mut assign = Block::new("for (key, value) in &attrs");
            let mut by_key = Block::new("match *key");
            for (key, field) in fields {
                by_key.line(format!("{:?} => node.{} = value.clone(),", key, field));
            }
            by_key.line("_ => {}");
            assign.push_block(by_key);
            new.push_block(assign);
            new.line("node.attrs = attrs;");
            new.line("node");
        }

        (node, node_impl)
    }

    fn node_enum(&self, module: &ParserModule, names: &Names, scope: &mut Scope) {
        let mut node = Enum::new("Node");
        node.vis("pub")
            .derive("Clone")
            .derive("Debug")
            .derive("PartialEq")
            .derive("Eq");
        for decl in &module.node_types {
            let type_name = names.node_type(&decl.name);
            node.new_variant(type_name)
                .tuple(&format!("nodes::{}", type_name));
        }

        let mut node_impl = Impl::new("Node");
        let mut kind = Function::new("kind");
        kind.vis("pub").arg_ref_self().ret("&'static str");
        let mut attrs = Function::new("attrs");
        attrs
            .vis("pub")
            .arg_ref_self()
            .ret("&[(&'static str, Value)]");
        if module.node_types.is_empty() {
            kind.line("match *self {}");
            attrs.line("match *self {}");
        } else {
            let mut kind_match = Block::new("match self");
            let mut attrs_match = Block::new("match self");
            for decl in &module.node_types {
                let type_name = names.node_type(&decl.name);
                kind_match.line(format!("Node::{}(_) => {:?},", type_name, decl.name));
                attrs_match.line(format!("Node::{}(node) => &node.attrs,", type_name));
            }
            kind.push_block(kind_match);
            attrs.push_block(attrs_match);
        }
        node_impl.push_fn(kind);
        node_impl.push_fn(attrs);

        scope.push_enum(node);
        scope.push_impl(node_impl);
    }

    fn lex_rules(&self, module: &ParserModule, scope: &mut Scope) {
        let mut rules = String::from("const LEX_RULES: &[(&str, &str)] = &[\n");
        for rule in &module.lex_rules {
            rules.push_str(&format!("    ({:?}, {:?}),\n", rule.name, rule.pattern));
        }
        rules.push_str("];");
        scope.raw(&rules);
    }

    fn result(&self, result: &ResultShape, arity: usize, names: &Names) -> String {
        let values: Vec<String> = (0..arity).map(|i| format!("v{}", i)).collect();
        match result {
            ResultShape::Tuple if arity == 0 => "Value::Empty".to_string(),
            ResultShape::Tuple => format!("Value::Tuple(vec![{}])", values.join(", ")),
            ResultShape::Suppressed => "Value::Empty".to_string(),
            ResultShape::Node { node_type, keys } => {
                let type_name = names.node_type(node_type);
                let attrs: Vec<String> = keys
                    .iter()
                    .zip(&values)
                    .map(|(key, value)| {
                        let key = match key {
                            FieldKey::Named(name) => name.as_str(),
                            FieldKey::Anon(_) => "_",
                        };
                        format!("({:?}, {})", key, value)
                    })
                    .collect();
                let attrs = if attrs.is_empty() {
                    "Vec::new()".to_string()
                } else {
                    format!("vec![{}]", attrs.join(", "))
                };
                format!(
                    "Value::Node(Box::new(Node::{}(nodes::{}::new({}))))",
                    type_name, type_name, attrs
                )
            }
        }
    }

    fn body_lines(&self, body: &Body, names: &Names) -> Vec<String> {
        let mut lines: Vec<String> = body
            .steps
            .iter()
            .enumerate()
            .map(|(i, step)| match step {
                Step::Consume(token) => format!("let v{} = self.consume({:?})?;", i, token),
                Step::Call(nonterminal) => {
                    format!("let v{} = self.{}()?;", i, names.routine(nonterminal))
                }
            })
            .collect();
        lines.push(format!(
            "return Ok({});",
            self.result(&body.result, body.steps.len(), names)
        ));
        lines
    }

    fn routine(&self, routine: &Routine, names: &Names) -> Function {
        let mut function = Function::new(names.routine(&routine.nonterminal));
        function
            .arg_mut_self()
            .ret("Result<Value, ParseFailure>");

        if routine.branches.is_empty() {
            function.line(format!("self.enter({:?})?;", routine.nonterminal));
        } else {
            function.line(format!("let next = self.enter({:?})?;", routine.nonterminal));
        }

        for branch in &routine.branches {
            let mut block = Block::new(&format!(
                "if starts(next, {})",
                string_list(&branch.lookahead)
            ));
            for line in self.body_lines(&branch.body, names) {
                block.line(line);
            }
            function.push_block(block);
        }

        match &routine.fallback {
            Fallback::Epsilon(body) => {
                let mut lines = self.body_lines(body, names);
                // last statement becomes the tail expression
                if let Some(last) = lines.pop() {
                    let tail = last
                        .trim_start_matches("return ")
                        .trim_end_matches(';')
                        .to_string();
                    lines.push(tail);
                }
                for line in lines {
                    function.line(line);
                }
            }
            Fallback::Fail { expected } => {
                let alternatives: Vec<String> = expected
                    .iter()
                    .map(|alt| format!("{}[..]", string_list(alt)))
                    .collect();
                function.line(format!(
                    "Err(self.no_alternative({:?}, &[{}]))",
                    routine.nonterminal,
                    alternatives.join(", ")
                ));
            }
        }

        function
    }

    fn parser_impl(&self, module: &ParserModule, names: &Names, scope: &mut Scope) {
        let mut parser_impl = Impl::new("Parser<'l, 'i>");
        parser_impl.generic("'l").generic("'i");

        let mut root = Function::new("parse_root");
        root.arg_mut_self().ret("Result<Value, ParseFailure>");
        root.line(format!("self.{}()", names.routine(&module.start)));
        parser_impl.push_fn(root);

        for routine in &module.routines {
            parser_impl.push_fn(self.routine(routine, names));
        }
        scope.push_impl(parser_impl);
    }

    fn main(&self, scope: &mut Scope) {
        scope.raw(MAIN);
    }
}

const MAIN: &str = r#"struct TraceObserver;

impl Observer for TraceObserver {
    fn enter(&self, nonterminal: &str, line: usize) {
        eprintln!("{} (line {})", nonterminal, line);
    }

    fn consume(&self, token: &str, text: &str) {
        eprintln!("consumed {}:{}", token, text);
    }
}

fn main() {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        eprintln!("usage: {} <input> [-v]", args[0]);
        std::process::exit(2);
    }
    let source = match std::fs::read_to_string(&args[1]) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("cannot read {}: {}", args[1], err);
            std::process::exit(2);
        }
    };
    let lexer = match Lexer::new() {
        Ok(lexer) => lexer,
        Err(err) => {
            eprintln!("{}", err);
            std::process::exit(2);
        }
    };
    let tracer = TraceObserver;
    let mut parser = lexer.parser(&source);
    if args.iter().skip(2).any(|arg| arg == "-v") {
        parser = parser.with_observer(&tracer);
    }
    match parser.run() {
        Ok(value) => println!("{}", value),
        Err(err) => {
            eprintln!("{}", err);
            std::process::exit(1);
        }
    }
}"#;

impl Backend for RustBackend {
    fn render(&self, module: &ParserModule) -> String {
        let names = Names::new(module);
        let mut scope = Scope::new();

        self.header(module, &mut scope);
        scope.raw(PRELUDE);

        let mut nodes = Module::new("nodes");
        nodes.vis("pub");
        for decl in &module.node_types {
            let (node, node_impl) = self.node_struct(decl, &names);
            nodes.scope().push_struct(node);
            nodes.scope().push_impl(node_impl);
        }
        scope.push_module(nodes);

        self.node_enum(module, &names, &mut scope);
        self.lex_rules(module, &mut scope);
        self.parser_impl(module, &names, &mut scope);
        if module.with_main {
            self.main(&mut scope);
        }

        let mut source = scope.to_string();
        source.push('\n');
        source
    }
}
