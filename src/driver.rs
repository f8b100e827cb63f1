//! The top-level loop: decides which kind of construct starts at the current
//! token, parses it and hands the result to a [`TopLevelHandler`].
//!
//! A construct that fails to parse is reported once through `tracing`, the
//! handler is told about it, and exactly one token is skipped before trying
//! again, so a single bad statement never ends the session.

use tracing::{debug, error};

use crate::frontend::{
    ast::{Function, Prototype, TopLevel},
    lexer::{Lex, Token},
    parser::{Parser, ParserError},
    precedence::PrecedenceTable,
};

/// Whatever consumes parsed constructs: a printer, a code generator, an
/// evaluator...
pub trait TopLevelHandler {
    fn handle_definition(&mut self, function: Function);

    fn handle_extern(&mut self, proto: Prototype);

    fn handle_top_level_expr(&mut self, function: Function);

    fn handle_error(&mut self, _err: &ParserError) {}
}

/// Collects every outcome in source order.
impl TopLevelHandler for Vec<Result<TopLevel, ParserError>> {
    fn handle_definition(&mut self, function: Function) {
        self.push(Ok(TopLevel::Definition(function)));
    }

    fn handle_extern(&mut self, proto: Prototype) {
        self.push(Ok(TopLevel::Extern(proto)));
    }

    fn handle_top_level_expr(&mut self, function: Function) {
        self.push(Ok(TopLevel::Expression(function)));
    }

    fn handle_error(&mut self, err: &ParserError) {
        self.push(Err(err.clone()));
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DriveSummary {
    pub definitions: usize,
    pub externs: usize,
    pub expressions: usize,
    pub errors: usize,
}

/// Runs until the parser reaches end of input.
pub fn drive<I, H>(parser: &mut Parser<I>, handler: &mut H) -> DriveSummary
where
    I: Iterator<Item = char>,
    H: TopLevelHandler + ?Sized,
{
    let mut summary = DriveSummary::default();

    loop {
        let outcome = match parser.current() {
            Token::EndOfInput => return summary,

            // Eat semicolons and move on
            Token::Symbol(';') => {
                parser.advance();
                continue;
            }

            Token::Def => parser.parse_definition().map(|func| {
                summary.definitions += 1;
                handler.handle_definition(*func);
            }),

            Token::Extern => parser.parse_extern().map(|proto| {
                summary.externs += 1;
                handler.handle_extern(*proto);
            }),

            _ => parser.parse_top_level_expr().map(|func| {
                summary.expressions += 1;
                handler.handle_top_level_expr(*func);
            }),
        };

        if let Err(err) = outcome {
            summary.errors += 1;
            error!(position = %err.position(), "{err}");
            handler.handle_error(&err);

            let skipped = parser.advance();
            debug!(token = ?skipped, "skipped token to recover from syntax error");
        }
    }
}

/// Parses a whole program held in memory.
pub fn parse_program(src: &str, precedence: PrecedenceTable) -> Vec<Result<TopLevel, ParserError>> {
    let mut parser = Parser::new(src.lex(), precedence);
    let mut outcomes = vec![];

    drive(&mut parser, &mut outcomes);
    outcomes
}
