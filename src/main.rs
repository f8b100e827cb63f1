mod batch;
mod cli;
mod printer;
mod repl;

use std::process::ExitCode;

use clap::Parser;
use tracing::error;
use tracing_subscriber::{filter::LevelFilter, EnvFilter};

use crate::cli::Cli;

fn init_tracing(cli: &Cli) {
    let level: LevelFilter = cli.log_level.into();

    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli);

    // No file given, parse whatever is typed in
    let Some(file) = &cli.file else {
        return match cli.precedence_table() {
            Ok(precedence) => {
                repl::ast_parser_driver(precedence, cli.max_depth, cli.inspect_tree);
                ExitCode::SUCCESS
            }
            Err(e) => {
                error!("{e}");
                ExitCode::FAILURE
            }
        };
    };

    match batch::parse_file(file, &cli) {
        Ok(summary) if summary.errors == 0 => ExitCode::SUCCESS,
        Ok(_) => ExitCode::from(2),
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
