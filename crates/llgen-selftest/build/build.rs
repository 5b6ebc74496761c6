mod emit_grammars;

fn main() -> Result<(), anyhow::Error> {
    let grammars = emit_grammars::load_grammar_files()?;
    emit_grammars::write_parsers(&grammars)?;
    Ok(())
}
