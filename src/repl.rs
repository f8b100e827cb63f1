use std::collections::VecDeque;
use std::io::Write;

use kaleidrs_front::{
    driver::drive,
    frontend::{lexer::Lexer, parser::Parser, precedence::PrecedenceTable},
};
use tracing::{info, warn};

use crate::printer::AstPrinter;

const PROMPT: &str = "Ready >> ";

// Characters from stdin, read a line at a time and only when the lexer
// actually asks for more. Prompts before every read.
pub struct PromptedStdin {
    line: VecDeque<char>,
    exhausted: bool,
}

impl PromptedStdin {
    pub fn new() -> Self {
        Self {
            line: VecDeque::new(),
            exhausted: false,
        }
    }
}

impl Iterator for PromptedStdin {
    type Item = char;

    fn next(&mut self) -> Option<Self::Item> {
        while self.line.is_empty() {
            if self.exhausted {
                return None;
            }

            print!("{PROMPT}");
            if let Err(err) = std::io::stdout().flush() {
                warn!(%err, "failed to flush prompt");
            }

            let mut input_buf = String::new();
            match std::io::stdin().read_line(&mut input_buf) {
                Ok(0) => {
                    println!();
                    self.exhausted = true;
                }
                Ok(_) => self.line.extend(input_buf.chars()),
                Err(err) => {
                    warn!(%err, "failed to read from stdin, treating as end of input");
                    self.exhausted = true;
                }
            }
        }

        self.line.pop_front()
    }
}

// Read-Parse-Print-Loop: runs the frontend over stdin and prints what it
// recognized until stdin is closed.
pub fn ast_parser_driver(precedence: PrecedenceTable, max_depth: usize, inspect_tree: bool) {
    let lexer = Lexer::new(PromptedStdin::new());
    let mut parser = Parser::new(lexer, precedence).with_max_depth(max_depth);
    let mut printer = AstPrinter { inspect_tree };

    let summary = drive(&mut parser, &mut printer);
    info!(?summary, "end of input");
}
