pub mod builtins;
pub mod control_flow;
pub mod environment;
pub mod error;
pub mod evaluator;
pub mod host;
pub mod parser;
pub mod symbols;
pub mod value_utils;

pub use control_flow::Outcome;
pub use environment::Scope;
pub use error::{BuildError, Error, RuntimeError};
pub use evaluator::{build, NodeInterpreter};
pub use host::{parse_and_run, parse_source, Interpreter};
pub use parser::{parse, parse_expression, ParseError};
