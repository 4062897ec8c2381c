use crate::value::Value;

/// Result of interpreting a node. Anything other than `Normal` is an
/// in-flight transfer that each statement sequence either consumes or
/// hands back to its caller untouched.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Normal(Value),
    Break,
    Continue,
    Return(Value),
    Throw(Value),
}

impl Outcome {
    /// A guest-level fault, raised through the same channel as `throw`.
    pub fn fault(message: impl Into<String>, line: usize) -> Outcome {
        Outcome::Throw(Value::error(message, line))
    }

    pub fn is_normal(&self) -> bool {
        matches!(self, Outcome::Normal(_))
    }
}

/// Unwrap a `Normal` outcome or return any other outcome from the
/// enclosing function.
macro_rules! normal {
    ($outcome:expr) => {
        match $outcome {
            $crate::interpreter::control_flow::Outcome::Normal(value) => value,
            other => return other,
        }
    };
}

pub(crate) use normal;
