use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use codegen::Scope;
use glob::glob;
use lazy_static::lazy_static;
use llgen::{emit::EmitOptions, frontend::GrammarLoader, CompiledGrammar};

// relative to root of workspace
const GRAMMAR_DIR: &str = "data/grammars";

lazy_static! {
    static ref PACKAGE_ROOT: String =
        std::env::var("CARGO_MANIFEST_DIR").expect("must use cargo as build system");
    static ref OUT_DIR: PathBuf =
        PathBuf::from(std::env::var("OUT_DIR").expect("must use cargo as build system"));
    static ref WORKSPACE_ROOT: PathBuf = Path::new(PACKAGE_ROOT.as_str())
        .parent()
        .and_then(Path::parent)
        .expect("corrupted folder structure")
        .to_path_buf();
    static ref GRAMMAR_DIR_ABS: PathBuf = WORKSPACE_ROOT.join(GRAMMAR_DIR);
    static ref GRAMMAR_DIR_STR: String = GRAMMAR_DIR_ABS
        .to_str()
        .expect("path to package contains non-UTF8 characters, which cargo does not like")
        .to_string();
}

pub struct GrammarFile {
    pub name: String,
    pub compiled: CompiledGrammar,
}

pub fn load_grammar_files() -> Result<Vec<GrammarFile>, anyhow::Error> {
    println!("cargo:rerun-if-changed={}", *GRAMMAR_DIR_STR);

    let loader = GrammarLoader::new()?;
    let mut grammars = Vec::new();
    for entry in glob(&format!("{}/*.llg", *GRAMMAR_DIR_STR))? {
        let entry = entry?;
        let name = entry
            .file_stem()
            .with_context(|| "should not be ..")?
            .to_str()
            .with_context(|| "strange filename")?
            .to_string();

        let source = fs::read_to_string(&entry).with_context(|| "unable to read grammar")?;
        let grammar = loader
            .load(&source)
            .with_context(|| format!("invalid grammar file {}", entry.display()))?;
        let compiled = CompiledGrammar::new(grammar)?;
        grammars.push(GrammarFile { name, compiled });
    }

    Ok(grammars)
}

pub fn write_parsers(grammars: &[GrammarFile]) -> Result<(), anyhow::Error> {
    let mut mod_rs = Scope::new();

    for grammar in grammars {
        let options = EmitOptions {
            with_main: false,
            header: Some(format!("from {}/{}.llg", GRAMMAR_DIR, grammar.name)),
        };
        let rs_path = OUT_DIR.join(format!("{}.rs", grammar.name));
        fs::write(&rs_path, grammar.compiled.emit(&options))?;

        mod_rs.raw(
            format!(
                "pub mod {} {{ include!(concat!(env!(\"OUT_DIR\"), \"/{}.rs\")); }}",
                grammar.name, grammar.name
            )
            .as_str(),
        );
    }

    fs::write(OUT_DIR.join("parsers.rs"), mod_rs.to_string())?;
    Ok(())
}
