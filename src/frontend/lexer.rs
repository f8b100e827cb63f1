use std::fmt;
use std::iter::Fuse;
use std::str::Chars;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    EndOfInput,
    Def,
    Extern,
    Identifier(String),
    Number(f64),
    // Any other single character: operators, parens, commas, semicolons...
    Symbol(char),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::EndOfInput => write!(f, "end of input"),
            Token::Def => write!(f, "'def'"),
            Token::Extern => write!(f, "'extern'"),
            Token::Identifier(name) => write!(f, "identifier '{name}'"),
            Token::Number(num) => write!(f, "number {num}"),
            Token::Symbol(c) => write!(f, "'{c}'"),
        }
    }
}

/// 1-based line and column of a character in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Pulls characters one at a time out of `chars` and hands out tokens on
/// demand. Never fails: once the characters run out every call yields
/// `Token::EndOfInput`.
#[derive(Debug)]
pub struct Lexer<I: Iterator<Item = char>> {
    chars: Fuse<I>,
    // Character read but not consumed yet, `None` once input is exhausted
    last_char: Option<char>,
    last_char_pos: Position,
    token_start: Position,
    scratch: String,
}

impl<I: Iterator<Item = char>> Lexer<I> {
    pub fn new(chars: I) -> Self {
        Self {
            chars: chars.fuse(),
            // Same trick as the tutorial, pretend we just read a space
            last_char: Some(' '),
            last_char_pos: Position { line: 1, column: 0 },
            token_start: Position { line: 1, column: 0 },
            scratch: String::new(),
        }
    }

    /// Where the most recently returned token starts.
    pub fn token_position(&self) -> Position {
        self.token_start
    }

    fn bump(&mut self) {
        let previous = self.last_char;
        self.last_char = self.chars.next();

        // \n, \r\n and a lone \r each end exactly one line
        let ends_line = match previous {
            Some('\n') => true,
            Some('\r') => self.last_char != Some('\n'),
            _ => false,
        };

        if ends_line {
            self.last_char_pos.line += 1;
            self.last_char_pos.column = 0;
        }

        if self.last_char.is_some() {
            self.last_char_pos.column += 1;
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.last_char {
            if !c.is_whitespace() {
                break;
            }
            self.bump();
        }
    }

    // Swallow everything up to but excluding the line terminator
    fn skip_comment(&mut self) {
        while let Some(c) = self.last_char {
            if c == '\n' || c == '\r' {
                break;
            }
            self.bump();
        }
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) {
        self.scratch.clear();

        while let Some(c) = self.last_char.filter(|&c| pred(c)) {
            self.scratch.push(c);
            self.bump();
        }
    }

    pub fn next_token(&mut self) -> Token {
        loop {
            self.skip_whitespace();
            self.token_start = self.last_char_pos;

            let Some(c) = self.last_char else {
                return Token::EndOfInput;
            };

            // identifier: [a-zA-Z][a-zA-Z0-9]*
            if c.is_ascii_alphabetic() {
                self.take_while(|c| c.is_ascii_alphanumeric());

                return match self.scratch.as_str() {
                    "def" => Token::Def,
                    "extern" => Token::Extern,
                    ident => Token::Identifier(ident.to_owned()),
                };
            }

            // number: [0-9.]+
            if c.is_ascii_digit() || c == '.' {
                self.take_while(|c| c.is_ascii_digit() || c == '.');
                return Token::Number(parse_number_prefix(&self.scratch));
            }

            if c == '#' {
                self.skip_comment();
                continue;
            }

            self.bump();
            return Token::Symbol(c);
        }
    }
}

impl<I: Iterator<Item = char>> Iterator for Lexer<I> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_token() {
            Token::EndOfInput => None,
            token => Some(token),
        }
    }
}

/// Numeric text is only ever digits and dots. Mirrors C's `strtod`: the
/// value is the longest valid prefix, so "1.2.3" is 1.2 and "." is 0.
fn parse_number_prefix(text: &str) -> f64 {
    let end = text
        .char_indices()
        .filter(|&(_, c)| c == '.')
        .nth(1)
        .map_or(text.len(), |(i, _)| i);

    text[..end].parse::<f64>().unwrap_or(0.0)
}

pub trait Lex {
    fn lex(&self) -> Lexer<Chars<'_>>;
}

impl Lex for str {
    fn lex(&self) -> Lexer<Chars<'_>> {
        Lexer::new(self.chars())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Token::*;

    fn ident(name: &str) -> Token {
        Identifier(name.to_string())
    }

    #[test]
    fn lexing_nums() {
        let input = " 2.3  4.654345   700   0.23423  ";

        assert_eq!(
            input.lex().collect::<Vec<Token>>(),
            vec![
                Number(2.3),
                Number(4.654345),
                Number(700.0),
                Number(0.23423),
            ]
        );
    }

    #[test]
    fn lexing_malformed_nums() {
        let input = "1.2.3 . 5. .5 ..5";

        assert_eq!(
            input.lex().collect::<Vec<Token>>(),
            vec![Number(1.2), Number(0.0), Number(5.0), Number(0.5), Number(0.0)]
        );
    }

    #[test]
    fn lexing_identifiers() {
        let input = " var1   xyz   GLBAL   someCount ";

        assert_eq!(
            input.lex().collect::<Vec<Token>>(),
            vec![ident("var1"), ident("xyz"), ident("GLBAL"), ident("someCount")]
        );
    }

    #[test]
    fn identifiers_never_start_with_digit() {
        assert_eq!(
            "1abc x_y".lex().collect::<Vec<Token>>(),
            vec![Number(1.0), ident("abc"), ident("x"), Symbol('_'), ident("y")]
        );
    }

    #[test]
    fn lexing_keywords() {
        assert_eq!("def".lex().collect::<Vec<Token>>(), vec![Def]);
        assert_eq!("extern".lex().collect::<Vec<Token>>(), vec![Extern]);
        assert_eq!("define".lex().collect::<Vec<Token>>(), vec![ident("define")]);
        assert_eq!("Def externs".lex().collect::<Vec<Token>>(), vec![ident("Def"), ident("externs")]);
    }

    #[test]
    fn lexing_symbols() {
        let input = " + - * / < ( ) , ; ! ";

        assert_eq!(
            input.lex().collect::<Vec<Token>>(),
            vec![
                Symbol('+'),
                Symbol('-'),
                Symbol('*'),
                Symbol('/'),
                Symbol('<'),
                Symbol('('),
                Symbol(')'),
                Symbol(','),
                Symbol(';'),
                Symbol('!'),
            ]
        );
    }

    #[test]
    fn lexing_calls() {
        assert_eq!(
            "func1(2, 5, 10)".lex().collect::<Vec<Token>>(),
            vec![
                ident("func1"),
                Symbol('('),
                Number(2.0),
                Symbol(','),
                Number(5.0),
                Symbol(','),
                Number(10.0),
                Symbol(')'),
            ]
        );

        assert_eq!(
            "func3 (x+2)".lex().collect::<Vec<Token>>(),
            vec![
                ident("func3"),
                Symbol('('),
                ident("x"),
                Symbol('+'),
                Number(2.0),
                Symbol(')'),
            ]
        );
    }

    #[test]
    fn lexing_function_defs() {
        assert_eq!(
            " def myCalculation(arg1 arg2) ".lex().collect::<Vec<Token>>(),
            vec![
                Def,
                ident("myCalculation"),
                Symbol('('),
                ident("arg1"),
                ident("arg2"),
                Symbol(')'),
            ]
        );
    }

    #[test]
    fn comments_are_transparent() {
        assert_eq!(
            "# comment\n42".lex().collect::<Vec<Token>>(),
            "42".lex().collect::<Vec<Token>>()
        );

        assert_eq!(
            "1 # trailing\r\n# another\n+ 2 # at the end".lex().collect::<Vec<Token>>(),
            vec![Number(1.0), Symbol('+'), Number(2.0)]
        );
    }

    #[test]
    fn end_of_input_is_sticky() {
        let mut lexer = "x".lex();

        assert_eq!(lexer.next_token(), ident("x"));
        assert_eq!(lexer.next_token(), EndOfInput);
        assert_eq!(lexer.next_token(), EndOfInput);
        assert_eq!(lexer.next_token(), EndOfInput);

        let mut empty = "   # only a comment".lex();
        assert_eq!(empty.next_token(), EndOfInput);
        assert_eq!(empty.next_token(), EndOfInput);
    }

    #[test]
    fn every_line_ending_style_advances_lines() {
        for src in ["a\nb\nc", "a\r\nb\r\nc", "a\rb\rc", "a\r\nb\rc"] {
            let mut lexer = src.lex();
            let mut positions = vec![];

            while lexer.next_token() != EndOfInput {
                positions.push(lexer.token_position());
            }

            assert_eq!(
                positions,
                vec![
                    Position { line: 1, column: 1 },
                    Position { line: 2, column: 1 },
                    Position { line: 3, column: 1 },
                ],
                "line endings in {src:?}"
            );
        }

        let mut lexer = "# comment\r  x".lex();
        assert_eq!(lexer.next_token(), ident("x"));
        assert_eq!(lexer.token_position(), Position { line: 2, column: 3 });
    }

    #[test]
    fn tracks_token_positions() {
        let mut lexer = "def foo\n  (x)".lex();

        assert_eq!(lexer.next_token(), Def);
        assert_eq!(lexer.token_position(), Position { line: 1, column: 1 });

        assert_eq!(lexer.next_token(), ident("foo"));
        assert_eq!(lexer.token_position(), Position { line: 1, column: 5 });

        assert_eq!(lexer.next_token(), Symbol('('));
        assert_eq!(lexer.token_position(), Position { line: 2, column: 3 });

        assert_eq!(lexer.next_token(), ident("x"));
        assert_eq!(lexer.token_position(), Position { line: 2, column: 4 });
    }
}
