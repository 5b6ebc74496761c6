use std::{
    fs,
    path::{Path, PathBuf},
    process::ExitCode,
};

use anyhow::Context;
use clap::{Parser, Subcommand};
use llgen::{
    emit::EmitOptions, frontend::GrammarLoader, graph::symbol_graph, CompiledGrammar,
};
use log::LevelFilter;
use petgraph::dot::Dot;

/// LL(1) parser generator.
#[derive(Parser)]
#[command(name = "llgen", version)]
struct Cli {
    /// More output: -v for debug, -vv for a trace of every parse step
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a Rust parser module for a grammar file
    Emit {
        grammar: PathBuf,
        /// Write here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Add a `main` that parses the file named by its first argument
        #[arg(long)]
        main: bool,
    },
    /// Parse an input file with a grammar and print the tree
    Parse { grammar: PathBuf, input: PathBuf },
    /// Print FIRST and FOLLOW sets and LL(1) conflicts
    Analyze { grammar: PathBuf },
    /// Print the follow relations as a Graphviz graph
    Graph { grammar: PathBuf },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    let mut builder = pretty_env_logger::formatted_builder();
    builder.filter_level(level);
    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }
    builder.init();
}

fn compile(path: &Path) -> Result<CompiledGrammar, anyhow::Error> {
    let source = fs::read_to_string(path)
        .with_context(|| format!("unable to read {}", path.display()))?;
    let grammar = GrammarLoader::new()?
        .load(&source)
        .with_context(|| format!("invalid grammar {}", path.display()))?;
    Ok(CompiledGrammar::new(grammar)?)
}

fn run(cli: Cli) -> Result<ExitCode, anyhow::Error> {
    match cli.command {
        Command::Emit {
            grammar,
            output,
            main,
        } => {
            let compiled = compile(&grammar)?;
            let options = EmitOptions {
                with_main: main,
                header: Some(format!("from {}", grammar.display())),
            };
            let source = compiled.emit(&options);
            match output {
                Some(path) => fs::write(&path, source)
                    .with_context(|| format!("unable to write {}", path.display()))?,
                None => print!("{}", source),
            }
        }
        Command::Parse { grammar, input } => {
            let compiled = compile(&grammar)?;
            let text = fs::read_to_string(&input)
                .with_context(|| format!("unable to read {}", input.display()))?;
            match compiled.parse(&text) {
                Ok(tree) => println!("{}", tree),
                Err(err) => {
                    eprintln!("{}", err);
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
        Command::Analyze { grammar } => {
            let compiled = compile(&grammar)?;
            let grammar = compiled.grammar();
            print!("{}", compiled.analysis().report(grammar));
            let conflicts = compiled.table().conflicts();
            if conflicts.is_empty() {
                println!("no LL(1) conflicts");
            }
            for conflict in conflicts {
                println!("conflict: {}", conflict.describe(grammar));
            }
        }
        Command::Graph { grammar } => {
            let compiled = compile(&grammar)?;
            let graph = symbol_graph(&compiled);
            println!("{}", Dot::new(&graph));
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn main() -> Result<ExitCode, anyhow::Error> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    run(cli)
}
