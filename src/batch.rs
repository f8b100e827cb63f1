use std::error::Error;
use std::fs;
use std::path::Path;

use kaleidrs_front::{
    driver::{drive, DriveSummary},
    frontend::{lexer::Lex, parser::Parser},
};
use tracing::info;

use crate::{cli::Cli, printer::AstPrinter};

/// Parses every construct in `path`, printing each one as it is recognized.
pub fn parse_file(path: &Path, cli: &Cli) -> Result<DriveSummary, Box<dyn Error>> {
    let src_code = fs::read_to_string(path)
        .map_err(|e| format!("failed to read {}: {e}", path.display()))?;

    let mut parser = Parser::new(src_code.lex(), cli.precedence_table()?).with_max_depth(cli.max_depth);
    let mut printer = AstPrinter {
        inspect_tree: cli.inspect_tree,
    };

    let summary = drive(&mut parser, &mut printer);

    info!(
        file = %path.display(),
        definitions = summary.definitions,
        externs = summary.externs,
        expressions = summary.expressions,
        errors = summary.errors,
        "finished parsing"
    );

    Ok(summary)
}
