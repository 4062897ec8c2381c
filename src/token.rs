use std::fmt;

use crate::diagnostic::Span;

/// Classification of a scanned token. The parser resolves `Name` and
/// `Operator` spellings against the grammar; `Number` and `String` always
/// become fresh literals.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Name(String),
    Number(f64),
    String(String),
    Operator(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    pub line: usize,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span, line: usize) -> Self {
        Self { kind, span, line }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Name(_) => write!(f, "name"),
            TokenKind::Number(_) => write!(f, "number"),
            TokenKind::String(_) => write!(f, "string"),
            TokenKind::Operator(_) => write!(f, "operator"),
        }
    }
}
