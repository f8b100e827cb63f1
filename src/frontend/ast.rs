use std::fmt;
use std::mem;

use itertools::Itertools;

/// Name given to the implicit prototype wrapping a bare top-level expression.
pub const ANONYMOUS_FN_NAME: &str = "__anonymous_expr";

// Enum dispatch, no trait objects needed. Every child is owned by its
// parent so a tree can never share or cycle back into itself.
#[derive(Debug, Clone, PartialEq)]
pub enum ASTExpr {
    NumberExpr(f64),
    VariableExpr(String),
    BinaryExpr {
        op: char,
        left: Box<ASTExpr>,
        right: Box<ASTExpr>,
    },
    CallExpr {
        callee: String,
        args: Vec<ASTExpr>,
    },
}

impl ASTExpr {
    fn has_children(&self) -> bool {
        matches!(self, ASTExpr::BinaryExpr { .. } | ASTExpr::CallExpr { .. })
    }

    // Moves every child that has children of its own onto `pending`,
    // leaving leaves behind.
    fn detach_children(&mut self, pending: &mut Vec<ASTExpr>) {
        match self {
            ASTExpr::BinaryExpr { left, right, .. } => {
                for child in [left, right] {
                    if child.has_children() {
                        pending.push(mem::replace(&mut **child, ASTExpr::NumberExpr(0.0)));
                    }
                }
            }
            ASTExpr::CallExpr { args, .. } => {
                pending.extend(args.drain(..).filter(ASTExpr::has_children));
            }
            _ => {}
        }
    }
}

// Dropping a tall tree one Box at a time would recurse once per level, so
// unlink it onto a work list first.
impl Drop for ASTExpr {
    fn drop(&mut self) {
        if !self.has_children() {
            return;
        }

        let mut pending = vec![];
        self.detach_children(&mut pending);

        while let Some(mut expr) = pending.pop() {
            expr.detach_children(&mut pending);
        }
    }
}

// Prototype, parameter names are not checked for duplicates
#[derive(Debug, Clone, PartialEq)]
pub struct Prototype {
    pub name: String,
    pub args: Vec<String>,
}

// Function
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub proto: Box<Prototype>,
    pub body: Box<ASTExpr>,
}

impl Function {
    pub fn is_anonymous(&self) -> bool {
        self.proto.name == ANONYMOUS_FN_NAME
    }
}

/// One construct recognized at the outermost level of a program.
#[derive(Debug, Clone, PartialEq)]
pub enum TopLevel {
    Definition(Function),
    Extern(Prototype),
    Expression(Function),
}

impl fmt::Display for ASTExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ASTExpr::NumberExpr(num) => write!(f, "{num}"),
            ASTExpr::VariableExpr(name) => write!(f, "{name}"),
            ASTExpr::BinaryExpr { op, left, right } => write!(f, "({left} {op} {right})"),
            ASTExpr::CallExpr { callee, args } => write!(f, "{callee}({})", args.iter().join(", ")),
        }
    }
}

impl fmt::Display for Prototype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name, self.args.iter().join(" "))
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_anonymous() {
            write!(f, "{}", self.body)
        } else {
            write!(f, "def {} {}", self.proto, self.body)
        }
    }
}

impl fmt::Display for TopLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TopLevel::Definition(func) | TopLevel::Expression(func) => write!(f, "{func}"),
            TopLevel::Extern(proto) => write!(f, "extern {proto}"),
        }
    }
}
