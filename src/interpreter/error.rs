use thiserror::Error;

use crate::diagnostic::Diagnostic;
use crate::interpreter::parser::ParseError;
use crate::lexer::LexError;
use crate::value::Value;

/// A parse tree the evaluator has no interpreter for.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message} (line {line})")]
pub struct BuildError {
    pub message: String,
    pub line: usize,
}

impl BuildError {
    pub fn new(message: impl Into<String>, line: usize) -> Self {
        Self {
            message: message.into(),
            line,
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::error(self.message.clone())
            .with_code("E0151")
            .with_line(self.line)
    }
}

/// A transfer that escaped the top level of a run.
#[derive(Debug, Clone, Error)]
pub enum RuntimeError {
    #[error("Uncaught {0}")]
    Uncaught(Value),
    #[error("'{0}' outside of a loop")]
    MisplacedJump(&'static str),
}

impl RuntimeError {
    /// The line of an uncaught error value, when it carries one.
    pub fn line(&self) -> Option<usize> {
        match self {
            RuntimeError::Uncaught(value) => value.as_error().map(|error| error.line),
            RuntimeError::MisplacedJump(_) => None,
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        let diagnostic = match self {
            RuntimeError::Uncaught(Value::Error(error)) => {
                Diagnostic::error(format!("uncaught error: {}", error.message)).with_code("E0201")
            }
            RuntimeError::Uncaught(value) => Diagnostic::error(format!("uncaught exception: {}", value))
                .with_code("E0201")
                .with_note(format!("the thrown value is of kind {}", value.kind())),
            RuntimeError::MisplacedJump(statement) => Diagnostic::error(format!("`{}` outside of a loop", statement))
                .with_code("E0202")
                .with_help("`break` and `continue` may only appear inside a `while` body"),
        };
        match self.line() {
            Some(line) => diagnostic.with_line(line),
            None => diagnostic,
        }
    }
}

/// Any failure of a lex, parse, build and run pipeline.
#[derive(Debug, Clone, Error)]
pub enum Error {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Build(#[from] BuildError),
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

impl Error {
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            Error::Lex(error) => error.to_diagnostic(),
            Error::Parse(error) => error.to_diagnostic(),
            Error::Build(error) => error.to_diagnostic(),
            Error::Runtime(error) => error.to_diagnostic(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uncaught_error_diagnostic() {
        let error = RuntimeError::Uncaught(Value::error("Variable 'x' does not exist", 3));
        let diagnostic = error.to_diagnostic();
        assert_eq!(diagnostic.code.as_deref(), Some("E0201"));
        assert_eq!(diagnostic.line, Some(3));
        assert_eq!(error.to_string(), "Uncaught Error: Variable 'x' does not exist");
    }

    #[test]
    fn test_uncaught_plain_value() {
        let error = RuntimeError::Uncaught(Value::string("oops"));
        assert_eq!(error.line(), None);
        assert_eq!(error.to_diagnostic().message, "uncaught exception: oops");
    }

    #[test]
    fn test_misplaced_jump() {
        let error = Error::from(RuntimeError::MisplacedJump("break"));
        assert_eq!(error.to_string(), "'break' outside of a loop");
        assert_eq!(error.to_diagnostic().code.as_deref(), Some("E0202"));
    }
}
