use std::rc::Rc;
use tracing::debug;

use super::builtins::OutputSink;
use super::control_flow::Outcome;
use super::environment::Scope;
use super::error::{Error, RuntimeError};
use super::evaluator::{build_all, run_sequence};
use super::parser::parse;
use crate::ast::Node;
use crate::lexer::tokenize;
use crate::value::{NativeFunction, Value};

/// Owns the root scope and runs programs against it.
pub struct Interpreter {
    root: Rc<Scope>,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    pub fn new() -> Self {
        let root = Scope::root();
        root.bind(&Rc::from("Infinity"), Value::Number(f64::INFINITY));
        Self { root }
    }

    /// Read a binding of the root scope.
    pub fn global(&self, name: &str) -> Option<Value> {
        self.root.get(name)
    }

    /// Build every top-level node, then interpret them in order against the
    /// root scope. A top-level `return` ends the run with its value.
    pub fn run(&self, program: &[Node]) -> Result<Value, Error> {
        let statements = build_all(program)?;
        debug!(statements = statements.len(), "running program");

        for statement in &statements {
            match statement.interpret(&self.root) {
                Outcome::Normal(_) => {}
                Outcome::Return(value) => {
                    debug!(line = statement.line(), "top-level return");
                    return Ok(value);
                }
                Outcome::Break => return Err(RuntimeError::MisplacedJump("break").into()),
                Outcome::Continue => return Err(RuntimeError::MisplacedJump("continue").into()),
                Outcome::Throw(value) => {
                    debug!(line = statement.line(), "uncaught throw");
                    return Err(RuntimeError::Uncaught(value).into());
                }
            }
        }
        Ok(Value::Undefined)
    }

    /// Run the body of a top-level `main` function in a frame holding the
    /// natives and `native = false`. Returns `None` when there is no `main`.
    ///
    /// `native` tells a self-hosted `main` that it is already running inside
    /// this interpreter, so it must not start a nested run of its own.
    pub fn run_main(&self, natives: Vec<NativeFunction>) -> Result<Option<Value>, Error> {
        let Some(Value::Function(main)) = self.root.get("main") else {
            debug!("no main function");
            return Ok(None);
        };

        let frame = Scope::with_parent(&self.root);
        for native in natives {
            let name = Rc::clone(&native.name);
            frame.bind(&name, Value::native(native));
        }
        frame.bind(&Rc::from("native"), Value::Boolean(false));

        debug!(statements = main.body.len(), "running main");
        match run_sequence(&main.body, &frame) {
            Outcome::Return(value) | Outcome::Normal(value) => Ok(Some(value)),
            Outcome::Break | Outcome::Continue => Ok(Some(Value::Undefined)),
            Outcome::Throw(value) => Err(RuntimeError::Uncaught(value).into()),
        }
    }
}

pub fn parse_source(source: &str) -> Result<Vec<Node>, Error> {
    let tokens = tokenize(source)?;
    Ok(parse(&tokens)?)
}

/// Run a whole program: top-level statements, then `main` with the standard
/// natives writing to `sink`. Yields `main`'s result when there is one.
pub fn parse_and_run(source: &str, sink: OutputSink) -> Result<Value, Error> {
    let program = parse_source(source)?;
    let interpreter = Interpreter::new();
    let value = interpreter.run(&program)?;
    let natives = super::builtins::standard_natives(sink);
    Ok(interpreter.run_main(natives)?.unwrap_or(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn program(source: &str) -> Vec<Node> {
        parse_source(source).unwrap()
    }

    #[test]
    fn test_infinity_is_predeclared() {
        let interpreter = Interpreter::new();
        assert_eq!(interpreter.global("Infinity"), Some(Value::Number(f64::INFINITY)));
    }

    #[test]
    fn test_run_binds_globals() {
        let interpreter = Interpreter::new();
        interpreter.run(&program("let x = 2 + 3;")).unwrap();
        assert_eq!(interpreter.global("x"), Some(Value::Number(5.0)));
    }

    #[test]
    fn test_top_level_return_stops_the_run() {
        let interpreter = Interpreter::new();
        let value = interpreter.run(&program("let a = 1; return a; a = 2;")).unwrap();
        assert_eq!(value, Value::Number(1.0));
        assert_eq!(interpreter.global("a"), Some(Value::Number(1.0)));
    }

    #[test]
    fn test_top_level_break_is_an_error() {
        let interpreter = Interpreter::new();
        let error = interpreter.run(&program("break;")).unwrap_err();
        assert!(matches!(error, Error::Runtime(RuntimeError::MisplacedJump("break"))));
    }

    #[test]
    fn test_main_sees_natives() {
        let interpreter = Interpreter::new();
        interpreter
            .run(&program("function main() { return native ? 'nested' : typeof log; }"))
            .unwrap();
        let natives = vec![NativeFunction::new("log", "value", |_| Value::Undefined)];
        assert_eq!(interpreter.run_main(natives).unwrap(), Some(Value::string("function")));
    }

    #[test]
    fn test_self_hosted_main_signature() {
        let interpreter = Interpreter::new();
        let source = r#"
            let main = function (rFS, log, native) {
                if (native) {
                    return "nested";
                }
                return [typeof rFS("/no/such/file", "utf-8"), typeof log];
            };
        "#;
        interpreter.run(&program(source)).unwrap();
        let natives = crate::interpreter::builtins::standard_natives(Rc::new(|_: &str| {}));
        assert_eq!(
            interpreter.run_main(natives).unwrap(),
            Some(Value::array(vec![Value::string("object"), Value::string("function")]))
        );
    }

    #[test]
    fn test_missing_main() {
        let interpreter = Interpreter::new();
        interpreter.run(&program("let main = 3;")).unwrap();
        assert_eq!(interpreter.run_main(Vec::new()).unwrap(), None);
    }
}
