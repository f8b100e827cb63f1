use std::collections::HashMap;

use thiserror::Error;

// Operators every session starts out with unless told otherwise. In the
// C++ tutorial this table is the global "BinopPrecedence", here it is only
// the seed that each parser copies into its own table.
lazy_static! {
    static ref DEFAULT_PRECEDENCE: HashMap<char, i32> = {
        let mut map = HashMap::new();
        map.insert('<', 10);
        map.insert('+', 20);
        map.insert('-', 30);
        map.insert('*', 40);
        map
    };
}

#[derive(Error, PartialEq, Debug)]
pub enum PrecedenceError {
    #[error("'{0}' can never be lexed as an operator symbol")]
    NotASymbol(char),

    #[error("'{0}' is reserved punctuation and cannot be a binary operator")]
    Reserved(char),
}

/// Maps single character operators to their binding power, higher binds
/// tighter. Anything missing, or mapped to a value <= 0, is not a binary
/// operator as far as the parser is concerned.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PrecedenceTable {
    table: HashMap<char, i32>,
}

impl PrecedenceTable {
    /// A table with no operators at all.
    pub fn empty() -> Self {
        Self::default()
    }

    /// `<`, `+`, `-` and `*`.
    pub fn with_defaults() -> Self {
        Self {
            table: DEFAULT_PRECEDENCE.clone(),
        }
    }

    /// Registers or overrides `op`, returning its previous precedence.
    pub fn insert(&mut self, op: char, precedence: i32) -> Result<Option<i32>, PrecedenceError> {
        if op.is_ascii_alphanumeric() || op.is_whitespace() || op == '.' || op == '#' {
            return Err(PrecedenceError::NotASymbol(op));
        }

        if matches!(op, '(' | ')' | ',' | ';') {
            return Err(PrecedenceError::Reserved(op));
        }

        Ok(self.table.insert(op, precedence))
    }

    pub fn remove(&mut self, op: char) -> Option<i32> {
        self.table.remove(&op)
    }

    /// Precedence of `op`, or -1 when it is not a binary operator.
    pub fn precedence(&self, op: char) -> i32 {
        match self.table.get(&op) {
            Some(&prec) if prec > 0 => prec,
            _ => -1,
        }
    }

    pub fn is_binary_op(&self, op: char) -> bool {
        self.precedence(op) > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_operators() {
        let table = PrecedenceTable::with_defaults();

        assert_eq!(table.precedence('<'), 10);
        assert_eq!(table.precedence('+'), 20);
        assert_eq!(table.precedence('-'), 30);
        assert_eq!(table.precedence('*'), 40);
        assert_eq!(table.precedence('/'), -1);
    }

    #[test]
    fn missing_and_non_positive_are_not_operators() {
        let mut table = PrecedenceTable::empty();
        assert_eq!(table.precedence('+'), -1);

        table.insert('+', 0).unwrap();
        table.insert('%', -5).unwrap();

        assert!(!table.is_binary_op('+'));
        assert_eq!(table.precedence('%'), -1);
    }

    #[test]
    fn extending_and_overriding() {
        let mut table = PrecedenceTable::with_defaults();

        assert_eq!(table.insert('/', 40), Ok(None));
        assert_eq!(table.insert('+', 25), Ok(Some(20)));
        assert_eq!(table.precedence('/'), 40);
        assert_eq!(table.precedence('+'), 25);

        assert_eq!(table.remove('<'), Some(10));
        assert!(!table.is_binary_op('<'));
    }

    #[test]
    fn rejects_characters_the_lexer_never_yields_as_symbols() {
        let mut table = PrecedenceTable::empty();

        assert_eq!(table.insert('a', 10), Err(PrecedenceError::NotASymbol('a')));
        assert_eq!(table.insert('7', 10), Err(PrecedenceError::NotASymbol('7')));
        assert_eq!(table.insert('.', 10), Err(PrecedenceError::NotASymbol('.')));
        assert_eq!(table.insert('#', 10), Err(PrecedenceError::NotASymbol('#')));
        assert_eq!(table.insert(' ', 10), Err(PrecedenceError::NotASymbol(' ')));
        assert_eq!(table.insert('(', 10), Err(PrecedenceError::Reserved('(')));
        assert_eq!(table.insert(',', 10), Err(PrecedenceError::Reserved(',')));
    }
}
