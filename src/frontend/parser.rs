use thiserror::Error;
use tracing::trace;

use crate::frontend::{
    ast::*,
    lexer::{Lexer, Position, Token},
    precedence::PrecedenceTable,
};

/// How many expressions may nest inside each other (through parentheses or
/// call arguments), and how tall a parsed tree may grow, before parsing
/// gives up.
pub const DEFAULT_MAX_DEPTH: usize = 256;

// Errors describing what went wrong during the parsing process. Each one
// keeps the token we tripped over and where it starts.
#[derive(Error, PartialEq, Debug, Clone)]
pub enum ParserError {
    #[error("{position}: unknown token when expecting an expression, found {found}")]
    ExpectedExpression { found: Token, position: Position },

    #[error("{position}: expected ')', found {found}")]
    ExpectedClosingParen { found: Token, position: Position },

    #[error("{position}: expected ')' or ',' in argument list, found {found}")]
    ExpectedArgumentSeparator { found: Token, position: Position },

    #[error("{position}: expected function name in prototype, found {found}")]
    ExpectedFunctionName { found: Token, position: Position },

    #[error("{position}: expected '(' in prototype, found {found}")]
    ExpectedPrototypeOpenParen { found: Token, position: Position },

    #[error("{position}: expected ')' in prototype, found {found}")]
    ExpectedPrototypeCloseParen { found: Token, position: Position },

    #[error("{position}: expressions nested deeper than {limit} levels")]
    NestingTooDeep { limit: usize, position: Position },
}

impl ParserError {
    pub fn position(&self) -> Position {
        match self {
            ParserError::ExpectedExpression { position, .. }
            | ParserError::ExpectedClosingParen { position, .. }
            | ParserError::ExpectedArgumentSeparator { position, .. }
            | ParserError::ExpectedFunctionName { position, .. }
            | ParserError::ExpectedPrototypeOpenParen { position, .. }
            | ParserError::ExpectedPrototypeCloseParen { position, .. }
            | ParserError::NestingTooDeep { position, .. } => *position,
        }
    }
}

// An expression together with the height of its tree
type Measured = (Box<ASTExpr>, usize);

// Small alias for fallible returns of parsing expressions
type ExprParseResult = Result<Measured, ParserError>;

/// Recursive descent parser with single token lookahead. `current` always
/// holds the first token not yet consumed by a successful parse.
#[derive(Debug)]
pub struct Parser<I: Iterator<Item = char>> {
    lexer: Lexer<I>,
    current: Token,
    position: Position,
    precedence: PrecedenceTable,
    depth: usize,
    max_depth: usize,
}

impl<I: Iterator<Item = char>> Parser<I> {
    /// Builds a parser and primes the current token.
    pub fn new(lexer: Lexer<I>, precedence: PrecedenceTable) -> Self {
        let mut parser = Self {
            lexer,
            current: Token::EndOfInput,
            position: Position::default(),
            precedence,
            depth: 0,
            max_depth: DEFAULT_MAX_DEPTH,
        };
        parser.advance();
        parser
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn current(&self) -> &Token {
        &self.current
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn precedence(&self) -> &PrecedenceTable {
        &self.precedence
    }

    pub fn precedence_mut(&mut self) -> &mut PrecedenceTable {
        &mut self.precedence
    }

    /// Replaces the current token with the next one from the lexer and
    /// returns the token that was replaced. Tutorial calls this getNextToken.
    pub fn advance(&mut self) -> Token {
        let next = self.lexer.next_token();
        self.position = self.lexer.token_position();
        trace!(token = ?next, position = %self.position, "advance");
        std::mem::replace(&mut self.current, next)
    }

    fn is_symbol(&self, c: char) -> bool {
        self.current == Token::Symbol(c)
    }

    /// external ::= 'extern' prototype
    pub fn parse_extern(&mut self) -> Result<Box<Prototype>, ParserError> {
        // Swallow the 'extern' keyword, parse as prototype
        let _keyword = self.advance();
        self.parse_prototype()
    }

    /// prototype
    ///   ::= id '(' id* ')'
    pub fn parse_prototype(&mut self) -> Result<Box<Prototype>, ParserError> {
        let name = match &self.current {
            Token::Identifier(name) => name.clone(),
            found => {
                return Err(ParserError::ExpectedFunctionName {
                    found: found.clone(),
                    position: self.position,
                })
            }
        };
        self.advance();

        if !self.is_symbol('(') {
            return Err(ParserError::ExpectedPrototypeOpenParen {
                found: self.current.clone(),
                position: self.position,
            });
        }
        self.advance();

        let mut args = vec![];

        while let Token::Identifier(arg) = &self.current {
            args.push(arg.clone());
            self.advance();
        }

        if !self.is_symbol(')') {
            return Err(ParserError::ExpectedPrototypeCloseParen {
                found: self.current.clone(),
                position: self.position,
            });
        }
        self.advance();

        Ok(Box::new(Prototype { name, args }))
    }

    /// definition ::= 'def' prototype expression
    pub fn parse_definition(&mut self) -> Result<Box<Function>, ParserError> {
        // swallow the def keyword
        let _def = self.advance();

        let proto = self.parse_prototype()?;
        let body = self.parse_expression()?;

        Ok(Box::new(Function { proto, body }))
    }

    /// toplevelexpr ::= expression
    pub fn parse_top_level_expr(&mut self) -> Result<Box<Function>, ParserError> {
        let body = self.parse_expression()?;

        let proto = Box::new(Prototype {
            name: ANONYMOUS_FN_NAME.to_string(),
            args: vec![],
        });

        Ok(Box::new(Function { proto, body }))
    }

    /// expression
    ///   ::= primary binoprhs
    pub fn parse_expression(&mut self) -> Result<Box<ASTExpr>, ParserError> {
        self.parse_measured_expression().map(|(expr, _height)| expr)
    }

    fn parse_measured_expression(&mut self) -> ExprParseResult {
        if self.depth >= self.max_depth {
            return Err(self.too_deep());
        }

        self.depth += 1;
        let result = self
            .parse_primary()
            .and_then(|lhs| self.parse_binop_rhs(0, lhs));
        self.depth -= 1;

        result
    }

    fn too_deep(&self) -> ParserError {
        ParserError::NestingTooDeep {
            limit: self.max_depth,
            position: self.position,
        }
    }

    // Height of a new node over children of the given height. Trees taller
    // than max_depth are refused so nothing walking them recursively can
    // run out of stack.
    fn node_height(&self, tallest_child: usize) -> Result<usize, ParserError> {
        let height = tallest_child + 1;

        if height > self.max_depth {
            return Err(self.too_deep());
        }

        Ok(height)
    }

    /// primary
    ///   ::= identifierexpr
    ///   ::= numberexpr
    ///   ::= parenexpr
    fn parse_primary(&mut self) -> ExprParseResult {
        match &self.current {
            Token::Identifier(_) => self.parse_identifier_expr(),

            Token::Number(_) => self.parse_number_expr(),

            Token::Symbol('(') => self.parse_paren_expr(),

            unexpected => Err(ParserError::ExpectedExpression {
                found: unexpected.clone(),
                position: self.position,
            }),
        }
    }

    /// numberexpr ::= number
    fn parse_number_expr(&mut self) -> ExprParseResult {
        match self.advance() {
            Token::Number(num) => Ok((Box::new(ASTExpr::NumberExpr(num)), 1)),
            found => Err(ParserError::ExpectedExpression {
                found,
                position: self.position,
            }),
        }
    }

    /// parenexpr ::= '(' expression ')'
    fn parse_paren_expr(&mut self) -> ExprParseResult {
        // Swallow the open parenthesis
        let _paren = self.advance();

        let expr = self.parse_measured_expression()?;

        // Should be a closed parenthesis following it.
        if !self.is_symbol(')') {
            return Err(ParserError::ExpectedClosingParen {
                found: self.current.clone(),
                position: self.position,
            });
        }
        self.advance();

        Ok(expr)
    }

    /// identifierexpr
    ///   ::= identifier
    ///   ::= identifier '(' (expression (',' expression)*)? ')'
    fn parse_identifier_expr(&mut self) -> ExprParseResult {
        let name = match self.advance() {
            Token::Identifier(name) => name,
            found => {
                return Err(ParserError::ExpectedExpression {
                    found,
                    position: self.position,
                })
            }
        };

        // Variable Expression
        if !self.is_symbol('(') {
            return Ok((Box::new(ASTExpr::VariableExpr(name)), 1));
        }

        // Call Expression
        let _open_paren = self.advance();
        let mut args = vec![];
        let mut tallest_arg = 0;

        if !self.is_symbol(')') {
            loop {
                let (arg, height) = self.parse_measured_expression()?;
                args.push(*arg);
                tallest_arg = tallest_arg.max(height);

                if self.is_symbol(')') {
                    break;
                }

                if !self.is_symbol(',') {
                    return Err(ParserError::ExpectedArgumentSeparator {
                        found: self.current.clone(),
                        position: self.position,
                    });
                }
                self.advance();
            }
        }

        let _closed_paren = self.advance();
        let height = self.node_height(tallest_arg)?;

        Ok((Box::new(ASTExpr::CallExpr { callee: name, args }), height))
    }

    // Precedence of the current token, -1 if it is not a binary operator.
    // Tutorial names this GetTokPrecedence
    fn current_precedence(&self) -> i32 {
        match self.current {
            Token::Symbol(op) => self.precedence.precedence(op),
            _ => -1,
        }
    }

    /// binoprhs
    ///   ::= (binop primary)*
    fn parse_binop_rhs(&mut self, expr_prec: i32, lhs: Measured) -> ExprParseResult {
        let (mut lhs, mut lhs_height) = lhs;

        loop {
            let tok_prec = self.current_precedence();

            // Either not an operator, or one that binds looser than what
            // the caller is collecting, hand lhs back as is
            if tok_prec < expr_prec {
                return Ok((lhs, lhs_height));
            }

            let op = match self.advance() {
                Token::Symbol(op) => op,
                _ => return Ok((lhs, lhs_height)),
            };

            let mut rhs = self.parse_primary()?;

            // If the following operator binds tighter, let it take rhs as
            // its lhs first. Strictly greater keeps equal precedence left
            // associative.
            let next_prec = self.current_precedence();
            if tok_prec < next_prec {
                rhs = self.parse_binop_rhs(tok_prec + 1, rhs)?;
            }

            let (rhs, rhs_height) = rhs;
            lhs_height = self.node_height(lhs_height.max(rhs_height))?;

            lhs = Box::new(ASTExpr::BinaryExpr {
                op,
                left: lhs,
                right: rhs,
            });
        }
    }
}
