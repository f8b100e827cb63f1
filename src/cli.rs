use std::path::PathBuf;

use clap::{
    builder::{OsStr, PossibleValue},
    Parser, ValueEnum,
};
use kaleidrs_front::frontend::{
    parser::DEFAULT_MAX_DEPTH,
    precedence::{PrecedenceError, PrecedenceTable},
};
use tracing_subscriber::filter::LevelFilter;

#[derive(Parser)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// A positional file containing Kaleidoscope code to parse, if not given, starts the interactive parser instead
    pub file: Option<PathBuf>,

    /// Adds or overrides a binary operator, given as OP=PRECEDENCE (e.g. --binop '/=40'), may be repeated
    #[arg(long = "binop", value_name = "OP=PREC", value_parser = parse_binop, allow_hyphen_values = true)]
    pub binops: Vec<Binop>,

    /// Start from an empty operator table instead of the default '<' '+' '-' '*'
    #[arg(long)]
    pub no_default_ops: bool,

    /// How deeply expressions may nest before parsing gives up
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
    pub max_depth: usize,

    /// Prints out the full AST debug representation for every parsed construct
    #[arg(long)]
    pub inspect_tree: bool,

    /// Verbosity of diagnostics written to stderr, RUST_LOG takes priority when set
    #[arg(long, value_enum, default_value = LogLevel::Info)]
    pub log_level: LogLevel,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Binop {
    pub op: char,
    pub precedence: i32,
}

fn parse_binop(arg: &str) -> Result<Binop, String> {
    let mut chars = arg.chars();

    let Some(op) = chars.next() else {
        return Err("expected OP=PRECEDENCE, got nothing".to_string());
    };

    let precedence = chars
        .as_str()
        .strip_prefix('=')
        .ok_or_else(|| format!("expected a single character operator followed by '=', got '{arg}'"))?;

    let precedence = precedence
        .trim()
        .parse::<i32>()
        .map_err(|e| format!("invalid precedence '{precedence}': {e}"))?;

    // Run it by a scratch table so bad characters are rejected up front
    PrecedenceTable::empty()
        .insert(op, precedence)
        .map_err(|e| e.to_string())?;

    Ok(Binop { op, precedence })
}

impl Cli {
    /// Operator table for the session, defaults first then every --binop in order.
    pub fn precedence_table(&self) -> Result<PrecedenceTable, PrecedenceError> {
        let mut table = if self.no_default_ops {
            PrecedenceTable::empty()
        } else {
            PrecedenceTable::with_defaults()
        };

        for binop in &self.binops {
            table.insert(binop.op, binop.precedence)?;
        }

        Ok(table)
    }
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl ValueEnum for LogLevel {
    fn value_variants<'a>() -> &'a [Self] {
        &[
            LogLevel::Off,
            LogLevel::Error,
            LogLevel::Warn,
            LogLevel::Info,
            LogLevel::Debug,
            LogLevel::Trace,
        ]
    }

    fn to_possible_value(&self) -> Option<PossibleValue> {
        Some(match self {
            LogLevel::Off => PossibleValue::new("off").help("No diagnostics at all"),
            LogLevel::Error => PossibleValue::new("error").help("Syntax errors only"),
            LogLevel::Warn => PossibleValue::new("warn").help("Errors and input problems"),
            LogLevel::Info => PossibleValue::new("info").help("Default verbosity"),
            LogLevel::Debug => PossibleValue::new("debug").help("Error recovery details"),
            LogLevel::Trace => PossibleValue::new("trace").help("Every token the parser sees"),
        })
    }
}

impl Into<OsStr> for LogLevel {
    fn into(self) -> OsStr {
        match self {
            LogLevel::Off => "off".into(),
            LogLevel::Error => "error".into(),
            LogLevel::Warn => "warn".into(),
            LogLevel::Info => "info".into(),
            LogLevel::Debug => "debug".into(),
            LogLevel::Trace => "trace".into(),
        }
    }
}

// Convert to a tracing filter, used when RUST_LOG is not set
impl Into<LevelFilter> for LogLevel {
    fn into(self) -> LevelFilter {
        match self {
            LogLevel::Off => LevelFilter::OFF,
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parsing_binops() {
        assert_eq!(parse_binop("/=40"), Ok(Binop { op: '/', precedence: 40 }));
        assert_eq!(parse_binop("==5"), Ok(Binop { op: '=', precedence: 5 }));
        assert_eq!(parse_binop("-=30"), Ok(Binop { op: '-', precedence: 30 }));
        assert!(parse_binop("").is_err());
        assert!(parse_binop("/").is_err());
        assert!(parse_binop("//=40").is_err());
        assert!(parse_binop("/=high").is_err());
        assert!(parse_binop("a=10").is_err());
        assert!(parse_binop("(=10").is_err());
    }

    #[test]
    fn building_the_precedence_table() {
        let cli = Cli::parse_from(["kaleidrs-front", "--binop", "/=40", "--binop", "+=25"]);
        let table = cli.precedence_table().unwrap();

        assert_eq!(table.precedence('/'), 40);
        assert_eq!(table.precedence('+'), 25);
        assert_eq!(table.precedence('*'), 40);

        let cli = Cli::parse_from(["kaleidrs-front", "--no-default-ops", "--binop", "^=50"]);
        let table = cli.precedence_table().unwrap();

        assert_eq!(table.precedence('^'), 50);
        assert_eq!(table.precedence('+'), -1);
    }

    #[test]
    fn unchecked_binops_are_reported() {
        let cli = Cli {
            file: None,
            binops: vec![Binop { op: 'x', precedence: 10 }],
            no_default_ops: false,
            max_depth: DEFAULT_MAX_DEPTH,
            inspect_tree: false,
            log_level: LogLevel::Info,
        };

        assert_eq!(cli.precedence_table(), Err(PrecedenceError::NotASymbol('x')));
    }

    #[test]
    fn cli_is_well_formed() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
