//! Compiles parse trees into closures. Each node is built once into a
//! `NodeInterpreter`; interpreting it against a scope yields an `Outcome`.

use indexmap::IndexMap;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use super::control_flow::{normal, Outcome};
use super::environment::{Scope, ScopeError};
use super::error::BuildError;
use super::value_utils::{binary_op, expect_bool, get_index, set_index, unary_op};
use crate::ast::{BinaryNode, FunctionNode, Literal, Node, NodeList, StatementNode, TernaryNode, UnaryNode};
use crate::value::{Function, Value};

type Interpret = dyn Fn(&Rc<Scope>) -> Outcome;

/// A built node. Cloning shares the underlying closure.
#[derive(Clone)]
pub struct NodeInterpreter {
    op: &'static str,
    line: usize,
    run: Rc<Interpret>,
}

impl NodeInterpreter {
    fn new(node: &Node, run: impl Fn(&Rc<Scope>) -> Outcome + 'static) -> Self {
        Self {
            op: node.op(),
            line: node.line(),
            run: Rc::new(run),
        }
    }

    pub fn interpret(&self, scope: &Rc<Scope>) -> Outcome {
        (self.run)(scope)
    }

    pub fn line(&self) -> usize {
        self.line
    }
}

impl fmt::Debug for NodeInterpreter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeInterpreter({} @ line {})", self.op, self.line)
    }
}

const BINARY_OPERATORS: [&str; 11] = ["+", "-", "*", "/", "**", "===", "!==", "<", "<=", ">", ">="];

fn settle(result: Result<Value, String>, line: usize) -> Outcome {
    match result {
        Ok(value) => Outcome::Normal(value),
        Err(message) => Outcome::fault(message, line),
    }
}

/// Run statements in order, stopping at the first non-normal outcome.
pub fn run_sequence(statements: &[NodeInterpreter], scope: &Rc<Scope>) -> Outcome {
    for statement in statements {
        match statement.interpret(scope) {
            Outcome::Normal(_) => {}
            other => return other,
        }
    }
    Outcome::Normal(Value::Undefined)
}

/// Invoke a callable with already evaluated arguments. Guest functions get a
/// fresh frame whose parent is `scope`, the scope of the call site.
pub fn call_value(callee: &Value, arguments: Vec<Value>, scope: &Rc<Scope>, line: usize) -> Outcome {
    match callee {
        Value::Function(function) => {
            if arguments.len() < function.parameters.len() {
                return Outcome::fault(
                    format!(
                        "Function '{}' expects {} argument(s), got {}",
                        function.name.as_deref().unwrap_or("anonymous"),
                        function.parameters.len(),
                        arguments.len()
                    ),
                    line,
                );
            }

            let frame = Scope::with_parent(scope);
            for (parameter, argument) in function.parameters.iter().zip(arguments) {
                frame.bind(parameter, argument);
            }

            match run_sequence(&function.body, &frame) {
                Outcome::Return(value) => Outcome::Normal(value),
                Outcome::Throw(value) => Outcome::Throw(value),
                Outcome::Normal(_) | Outcome::Break | Outcome::Continue => Outcome::Normal(Value::Undefined),
            }
        }
        Value::NativeFunction(native) => {
            let mut arguments = arguments.into_iter();
            match arguments.next() {
                Some(argument) => Outcome::Normal(native.call(argument)),
                None if native.parameter_names.is_empty() => Outcome::Normal(native.call(Value::Undefined)),
                None => Outcome::fault(
                    format!("Function '{}' expects {} argument(s), got 0", native.name, native.parameter_names.len()),
                    line,
                ),
            }
        }
        other => Outcome::fault(format!("Cannot call {}", other.kind()), line),
    }
}

fn evaluate_all(nodes: &[NodeInterpreter], scope: &Rc<Scope>) -> Result<Vec<Value>, Outcome> {
    let mut values = Vec::with_capacity(nodes.len());
    for node in nodes {
        match node.interpret(scope) {
            Outcome::Normal(value) => values.push(value),
            other => return Err(other),
        }
    }
    Ok(values)
}

pub fn build_all(nodes: &[Node]) -> Result<Vec<NodeInterpreter>, BuildError> {
    nodes.iter().map(build).collect()
}

/// Statements of a `{ }` block node.
fn block_statements(node: &Node) -> Result<Vec<NodeInterpreter>, BuildError> {
    match node {
        Node::Statement(StatementNode { op: "{", value, .. }) => match value.as_ref() {
            Node::List(list) => build_all(&list.children),
            other => Err(BuildError::new("Malformed block", other.line())),
        },
        other => Err(BuildError::new(format!("Expected a block, got '{}'", other.op()), other.line())),
    }
}

fn list_children(node: &Node) -> Result<&[Node], BuildError> {
    match node {
        Node::List(NodeList { children, .. }) => Ok(children),
        other => Err(BuildError::new(format!("Expected a list, got '{}'", other.op()), other.line())),
    }
}

fn literal_value(literal: &Literal) -> Value {
    match literal {
        Literal::String(s) => Value::String(Rc::clone(s)),
        Literal::Number(n) => Value::Number(*n),
        Literal::Boolean(b) => Value::Boolean(*b),
        Literal::Null => Value::Null,
        Literal::Undefined => Value::Undefined,
    }
}

/// Build a node into its interpreter. Building is pure: the same node may be
/// built any number of times and the results share no mutable state.
pub fn build(node: &Node) -> Result<NodeInterpreter, BuildError> {
    match node {
        Node::Literal(literal) => {
            let value = literal_value(&literal.value);
            Ok(NodeInterpreter::new(node, move |_| Outcome::Normal(value.clone())))
        }
        Node::Name(name) => {
            let identifier = Rc::clone(&name.identifier);
            let line = name.line;
            Ok(NodeInterpreter::new(node, move |scope| match scope.get(&identifier) {
                Some(value) => Outcome::Normal(value),
                None => Outcome::fault(format!("Variable '{}' does not exist", identifier), line),
            }))
        }
        Node::Binary(binary) => build_binary(node, binary),
        Node::Unary(unary) => build_unary(node, unary),
        Node::Ternary(ternary) => build_ternary(node, ternary),
        Node::Function(function) => build_function(node, function),
        Node::Statement(statement) => build_statement(node, statement),
        Node::List(list) => Err(BuildError::new(format!("Unexpected '{}' list", list.op), list.line)),
    }
}

fn build_binary(node: &Node, binary: &BinaryNode) -> Result<NodeInterpreter, BuildError> {
    let line = binary.line;
    match binary.op {
        "let" => {
            let Node::Name(name) = binary.left.as_ref() else {
                return Err(BuildError::new("Expected a variable name after 'let'", line));
            };
            let identifier = Rc::clone(&name.identifier);
            let value = build(&binary.right)?;
            Ok(NodeInterpreter::new(node, move |scope| {
                let value = normal!(value.interpret(scope));
                match scope.declare(&identifier, value) {
                    Ok(()) => Outcome::Normal(Value::Undefined),
                    Err(_) => Outcome::fault(format!("Variable '{}' is already declared", identifier), line),
                }
            }))
        }
        "=" => build_assignment(node, binary),
        "&&" | "||" => {
            let short_circuit_on = binary.op == "||";
            let what = if short_circuit_on { "Operand of '||'" } else { "Operand of '&&'" };
            let left = build(&binary.left)?;
            let right = build(&binary.right)?;
            Ok(NodeInterpreter::new(node, move |scope| {
                let left = normal!(left.interpret(scope));
                match expect_bool(what, &left) {
                    Ok(value) if value == short_circuit_on => return Outcome::Normal(Value::Boolean(value)),
                    Ok(_) => {}
                    Err(message) => return Outcome::fault(message, line),
                }
                let right = normal!(right.interpret(scope));
                settle(expect_bool(what, &right).map(Value::Boolean), line)
            }))
        }
        "." => {
            let target = build(&binary.left)?;
            let Node::Name(key) = binary.right.as_ref() else {
                return Err(BuildError::new("Expected a property name", line));
            };
            let key = Value::String(Rc::clone(&key.identifier));
            Ok(NodeInterpreter::new(node, move |scope| {
                let target = normal!(target.interpret(scope));
                settle(get_index(&target, &key), line)
            }))
        }
        "[" => {
            let target = build(&binary.left)?;
            let key = build(&binary.right)?;
            Ok(NodeInterpreter::new(node, move |scope| {
                let target = normal!(target.interpret(scope));
                let key = normal!(key.interpret(scope));
                settle(get_index(&target, &key), line)
            }))
        }
        "(" => {
            let callee = build(&binary.left)?;
            let arguments = build_all(list_children(&binary.right)?)?;
            Ok(NodeInterpreter::new(node, move |scope| {
                let callee = normal!(callee.interpret(scope));
                let arguments = match evaluate_all(&arguments, scope) {
                    Ok(values) => values,
                    Err(outcome) => return outcome,
                };
                call_value(&callee, arguments, scope, line)
            }))
        }
        op if BINARY_OPERATORS.contains(&op) => {
            let left = build(&binary.left)?;
            let right = build(&binary.right)?;
            Ok(NodeInterpreter::new(node, move |scope| {
                let left = normal!(left.interpret(scope));
                let right = normal!(right.interpret(scope));
                settle(binary_op(op, &left, &right), line)
            }))
        }
        op => Err(BuildError::new(format!("Unexpected '{}' expression", op), line)),
    }
}

fn build_assignment(node: &Node, binary: &BinaryNode) -> Result<NodeInterpreter, BuildError> {
    let line = binary.line;
    let value = build(&binary.right)?;

    match binary.left.as_ref() {
        Node::Name(name) => {
            let identifier = Rc::clone(&name.identifier);
            Ok(NodeInterpreter::new(node, move |scope| {
                let value = normal!(value.interpret(scope));
                match scope.assign(&identifier, value.clone()) {
                    Ok(()) => Outcome::Normal(value),
                    Err(ScopeError::Undeclared(_) | ScopeError::Redeclared(_)) => {
                        Outcome::fault(format!("Assignment to undeclared variable '{}'", identifier), line)
                    }
                }
            }))
        }
        Node::Binary(BinaryNode { op: op @ ("." | "["), left, right, .. }) => {
            let target = build(left)?;
            let key = match (*op, right.as_ref()) {
                (".", Node::Name(key)) => {
                    let key = Value::String(Rc::clone(&key.identifier));
                    NodeInterpreter::new(right, move |_| Outcome::Normal(key.clone()))
                }
                (".", _) => return Err(BuildError::new("Expected a property name", line)),
                _ => build(right)?,
            };
            Ok(NodeInterpreter::new(node, move |scope| {
                let value = normal!(value.interpret(scope));
                let target = normal!(target.interpret(scope));
                let key = normal!(key.interpret(scope));
                match set_index(&target, &key, value.clone()) {
                    Ok(()) => Outcome::Normal(value),
                    Err(message) => Outcome::fault(message, line),
                }
            }))
        }
        other => Err(BuildError::new(format!("Cannot assign to '{}'", other.op()), line)),
    }
}

enum Element {
    Single(NodeInterpreter),
    Spread(NodeInterpreter),
}

enum Entry {
    Field(Rc<str>, NodeInterpreter),
    Spread(NodeInterpreter),
}

fn build_unary(node: &Node, unary: &UnaryNode) -> Result<NodeInterpreter, BuildError> {
    let line = unary.line;
    match unary.op {
        "[" => {
            let elements = list_children(&unary.value)?
                .iter()
                .map(|child| match child {
                    Node::Unary(UnaryNode { op: "...", value, .. }) => build(value).map(Element::Spread),
                    other => build(other).map(Element::Single),
                })
                .collect::<Result<Vec<_>, _>>()?;

            Ok(NodeInterpreter::new(node, move |scope| {
                let mut items = Vec::with_capacity(elements.len());
                for element in &elements {
                    match element {
                        Element::Single(value) => items.push(normal!(value.interpret(scope))),
                        Element::Spread(value) => match normal!(value.interpret(scope)) {
                            Value::Array(source) => items.extend(source.borrow().iter().cloned()),
                            other => return Outcome::fault(format!("Cannot spread {} into an array", other.kind()), line),
                        },
                    }
                }
                Outcome::Normal(Value::array(items))
            }))
        }
        "{" => {
            let entries = list_children(&unary.value)?
                .iter()
                .map(|child| match child {
                    Node::Unary(UnaryNode { op: "...", value, .. }) => build(value).map(Entry::Spread),
                    Node::Binary(BinaryNode { op: ":", left, right, .. }) => {
                        let key: Rc<str> = match left.as_ref() {
                            Node::Name(name) => Rc::clone(&name.identifier),
                            Node::Literal(literal) => match &literal.value {
                                Literal::String(s) => Rc::clone(s),
                                other => return Err(BuildError::new(format!("Bad property name {}", other), literal.line)),
                            },
                            other => return Err(BuildError::new("Bad property name", other.line())),
                        };
                        build(right).map(|value| Entry::Field(key, value))
                    }
                    other => Err(BuildError::new(format!("Unexpected '{}' in a record", other.op()), other.line())),
                })
                .collect::<Result<Vec<_>, _>>()?;

            Ok(NodeInterpreter::new(node, move |scope| {
                let mut fields: IndexMap<Rc<str>, Value> = IndexMap::with_capacity(entries.len());
                for entry in &entries {
                    match entry {
                        Entry::Field(key, value) => {
                            let value = normal!(value.interpret(scope));
                            fields.insert(Rc::clone(key), value);
                        }
                        Entry::Spread(value) => match normal!(value.interpret(scope)) {
                            Value::Record(source) => {
                                for (key, value) in source.borrow().iter() {
                                    fields.insert(Rc::clone(key), value.clone());
                                }
                            }
                            other => return Outcome::fault(format!("Cannot spread {} into a record", other.kind()), line),
                        },
                    }
                }
                Outcome::Normal(Value::Record(Rc::new(RefCell::new(fields))))
            }))
        }
        "..." => Err(BuildError::new(
            "Spread is only allowed inside an array or record literal",
            line,
        )),
        op @ ("-" | "typeof") => {
            let operand = build(&unary.value)?;
            Ok(NodeInterpreter::new(node, move |scope| {
                let value = normal!(operand.interpret(scope));
                settle(unary_op(op, &value), line)
            }))
        }
        op => Err(BuildError::new(format!("Unexpected prefix '{}'", op), line)),
    }
}

fn build_ternary(node: &Node, ternary: &TernaryNode) -> Result<NodeInterpreter, BuildError> {
    let line = ternary.line;
    match ternary.op {
        "?" => {
            let condition = build(&ternary.first)?;
            let then = build(&ternary.second)?;
            let otherwise = build(&ternary.third)?;
            Ok(NodeInterpreter::new(node, move |scope| {
                let condition = normal!(condition.interpret(scope));
                match expect_bool("Condition of '?'", &condition) {
                    Ok(true) => then.interpret(scope),
                    Ok(false) => otherwise.interpret(scope),
                    Err(message) => Outcome::fault(message, line),
                }
            }))
        }
        "if" => {
            let condition = build(&ternary.first)?;
            let then = build(&ternary.second)?;
            let otherwise = build(&ternary.third)?;
            Ok(NodeInterpreter::new(node, move |scope| {
                let condition = normal!(condition.interpret(scope));
                match expect_bool("Condition of 'if'", &condition) {
                    Ok(true) => then.interpret(scope),
                    Ok(false) => otherwise.interpret(scope),
                    Err(message) => Outcome::fault(message, line),
                }
            }))
        }
        "try" => {
            let body = build(&ternary.first)?;
            let Node::Name(binding) = ternary.second.as_ref() else {
                return Err(BuildError::new("Expected a catch binding name", line));
            };
            let binding = Rc::clone(&binding.identifier);
            let handler = block_statements(&ternary.third)?;
            Ok(NodeInterpreter::new(node, move |scope| match body.interpret(scope) {
                Outcome::Throw(value) => {
                    let frame = Scope::with_parent(scope);
                    frame.bind(&binding, value);
                    run_sequence(&handler, &frame)
                }
                other => other,
            }))
        }
        "(" => {
            let target = build(&ternary.first)?;
            let key = match ternary.second.as_ref() {
                Node::Name(name) => {
                    let key = Value::String(Rc::clone(&name.identifier));
                    NodeInterpreter::new(&ternary.second, move |_| Outcome::Normal(key.clone()))
                }
                other => build(other)?,
            };
            let arguments = build_all(list_children(&ternary.third)?)?;
            Ok(NodeInterpreter::new(node, move |scope| {
                let target = normal!(target.interpret(scope));
                if !matches!(target, Value::Record(_)) {
                    return Outcome::fault(
                        format!("Method calls are only allowed on records, got {}", target.kind()),
                        line,
                    );
                }
                let key = normal!(key.interpret(scope));
                let callee = match get_index(&target, &key) {
                    Ok(callee) => callee,
                    Err(message) => return Outcome::fault(message, line),
                };
                let arguments = match evaluate_all(&arguments, scope) {
                    Ok(values) => values,
                    Err(outcome) => return outcome,
                };
                call_value(&callee, arguments, scope, line)
            }))
        }
        op => Err(BuildError::new(format!("Unexpected '{}' expression", op), line)),
    }
}

fn build_function(node: &Node, function: &FunctionNode) -> Result<NodeInterpreter, BuildError> {
    let parameters = function
        .parameters
        .children
        .iter()
        .map(|parameter| match parameter {
            Node::Name(name) => Ok(Rc::clone(&name.identifier)),
            other => Err(BuildError::new("Expected a parameter name", other.line())),
        })
        .collect::<Result<Vec<_>, _>>()?;
    let body: Rc<[NodeInterpreter]> = build_all(&function.body.children)?.into();
    let name = function.name.clone();

    Ok(NodeInterpreter::new(node, move |_| {
        Outcome::Normal(Value::Function(Rc::new(Function {
            name: name.clone(),
            parameters: parameters.clone(),
            body: Rc::clone(&body),
        })))
    }))
}

fn build_statement(node: &Node, statement: &StatementNode) -> Result<NodeInterpreter, BuildError> {
    let line = statement.line;
    match statement.op {
        "{" => {
            let statements = block_statements(node)?;
            Ok(NodeInterpreter::new(node, move |scope| {
                let frame = Scope::with_parent(scope);
                run_sequence(&statements, &frame)
            }))
        }
        "return" => {
            let value = build(&statement.value)?;
            Ok(NodeInterpreter::new(node, move |scope| {
                Outcome::Return(normal!(value.interpret(scope)))
            }))
        }
        "throw" => {
            let value = build(&statement.value)?;
            Ok(NodeInterpreter::new(node, move |scope| {
                Outcome::Throw(normal!(value.interpret(scope)))
            }))
        }
        "break" => Ok(NodeInterpreter::new(node, |_| Outcome::Break)),
        "continue" => Ok(NodeInterpreter::new(node, |_| Outcome::Continue)),
        "while" => {
            let Node::Binary(BinaryNode { op: "while", left, right, .. }) = statement.value.as_ref() else {
                return Err(BuildError::new("Malformed while loop", line));
            };
            let condition = build(left)?;
            let body = build(right)?;
            Ok(NodeInterpreter::new(node, move |scope| {
                loop {
                    let condition = normal!(condition.interpret(scope));
                    match expect_bool("Loop condition", &condition) {
                        Ok(true) => {}
                        Ok(false) => break,
                        Err(message) => return Outcome::fault(message, line),
                    }
                    match body.interpret(scope) {
                        Outcome::Normal(_) | Outcome::Continue => {}
                        Outcome::Break => break,
                        other => return other,
                    }
                }
                Outcome::Normal(Value::Undefined)
            }))
        }
        op => Err(BuildError::new(format!("Unexpected '{}' statement", op), line)),
    }
}
