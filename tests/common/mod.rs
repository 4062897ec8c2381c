#![allow(dead_code)]

use brace::interpreter::builtins::OutputSink;
use brace::interpreter::{parse_and_run, Error, RuntimeError};
use brace::Value;
use std::cell::RefCell;
use std::rc::Rc;

/// Run a program with `log` output collected into a vector.
pub fn run_capture(source: &str) -> (Result<Value, Error>, Vec<String>) {
    let lines = Rc::new(RefCell::new(Vec::new()));
    let captured = Rc::clone(&lines);
    let sink: OutputSink = Rc::new(move |line: &str| captured.borrow_mut().push(line.to_string()));
    let result = parse_and_run(source, sink);
    let lines = lines.borrow().clone();
    (result, lines)
}

pub fn run(source: &str) -> Result<Value, Error> {
    run_capture(source).0
}

/// Lines logged by a program that must succeed.
pub fn output(source: &str) -> Vec<String> {
    let (result, lines) = run_capture(source);
    if let Err(error) = result {
        panic!("program failed: {}", error);
    }
    lines
}

/// Value of a single expression.
pub fn eval(expression: &str) -> Value {
    match run(&format!("return {};", expression)) {
        Ok(value) => value,
        Err(error) => panic!("`{}` failed: {}", expression, error),
    }
}

/// Message of the uncaught guest error raised by a program.
pub fn runtime_error(source: &str) -> String {
    match run(source) {
        Err(Error::Runtime(RuntimeError::Uncaught(Value::Error(error)))) => error.message.clone(),
        Err(other) => panic!("expected an uncaught guest error, got {}", other),
        Ok(value) => panic!("expected an error, got {}", value),
    }
}

pub fn number(n: f64) -> Value {
    Value::Number(n)
}

pub fn string(s: &str) -> Value {
    Value::string(s)
}
