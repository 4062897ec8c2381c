use indexmap::IndexMap;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::interpreter::evaluator::NodeInterpreter;

pub type Array = Rc<RefCell<Vec<Value>>>;
pub type Record = Rc<RefCell<IndexMap<Rc<str>, Value>>>;

#[derive(Debug, Clone)]
pub enum Value {
    String(Rc<str>),
    Number(f64),
    Boolean(bool),
    Null,
    Undefined,
    Array(Array),
    Record(Record),
    Function(Rc<Function>),
    NativeFunction(Rc<NativeFunction>),
    Error(Rc<ErrorValue>),
}

/// A guest function. It carries no reference to the scope it was defined
/// in; calls resolve free names through the caller's scope.
pub struct Function {
    pub name: Option<Rc<str>>,
    pub parameters: Vec<Rc<str>>,
    pub body: Rc<[NodeInterpreter]>,
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("name", &self.name)
            .field("parameters", &self.parameters)
            .field("body", &format_args!("[{} statements]", self.body.len()))
            .finish()
    }
}

pub type HostBody = dyn Fn(Value) -> Value;

/// A host-provided unary callable.
pub struct NativeFunction {
    pub name: Rc<str>,
    pub parameter_names: Vec<Rc<str>>,
    pub body: Box<HostBody>,
}

impl NativeFunction {
    pub fn new(name: &str, parameter: &str, body: impl Fn(Value) -> Value + 'static) -> Self {
        Self {
            name: Rc::from(name),
            parameter_names: vec![Rc::from(parameter)],
            body: Box::new(body),
        }
    }

    pub fn call(&self, argument: Value) -> Value {
        (self.body)(argument)
    }
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeFunction")
            .field("name", &self.name)
            .field("parameter_names", &self.parameter_names)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ErrorValue {
    pub message: String,
    pub line: usize,
}

impl Value {
    pub fn string(s: &str) -> Value {
        Value::String(Rc::from(s))
    }

    pub fn array(values: Vec<Value>) -> Value {
        Value::Array(Rc::new(RefCell::new(values)))
    }

    pub fn record<K: Into<Rc<str>>>(entries: impl IntoIterator<Item = (K, Value)>) -> Value {
        let map: IndexMap<Rc<str>, Value> = entries.into_iter().map(|(key, value)| (key.into(), value)).collect();
        Value::Record(Rc::new(RefCell::new(map)))
    }

    pub fn error(message: impl Into<String>, line: usize) -> Value {
        Value::Error(Rc::new(ErrorValue {
            message: message.into(),
            line,
        }))
    }

    pub fn native(function: NativeFunction) -> Value {
        Value::NativeFunction(Rc::new(function))
    }

    pub fn as_bool(&self) -> Option<bool> {
        if let Value::Boolean(b) = self {
            Some(*b)
        } else {
            None
        }
    }

    pub fn as_error(&self) -> Option<&ErrorValue> {
        if let Value::Error(error) = self {
            Some(error)
        } else {
            None
        }
    }

    /// The tag reported by `typeof`.
    pub fn type_of(&self) -> &'static str {
        match self {
            Value::String(_) => "string",
            Value::Number(_) => "number",
            Value::Boolean(_) => "boolean",
            Value::Undefined => "undefined",
            Value::Function(_) | Value::NativeFunction(_) => "function",
            Value::Null | Value::Array(_) | Value::Record(_) | Value::Error(_) => "object",
        }
    }

    /// A precise kind name for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::String(_) => "string",
            Value::Number(_) => "number",
            Value::Boolean(_) => "boolean",
            Value::Null => "null",
            Value::Undefined => "undefined",
            Value::Array(_) => "array",
            Value::Record(_) => "record",
            Value::Function(_) | Value::NativeFunction(_) => "function",
            Value::Error(_) => "error",
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        structurally_equal(self, other, &mut Vec::new())
    }
}

type Pair = (*const (), *const ());

/// Containers already under comparison count as equal, so self-referencing
/// values compare without unbounded recursion.
fn structurally_equal(left: &Value, right: &Value, pending: &mut Vec<Pair>) -> bool {
    match (left, right) {
        (Value::String(left), Value::String(right)) => left == right,
        (Value::Number(left), Value::Number(right)) => left == right,
        (Value::Boolean(left), Value::Boolean(right)) => left == right,
        (Value::Null, Value::Null) | (Value::Undefined, Value::Undefined) => true,
        (Value::Array(left), Value::Array(right)) => {
            let pair = (Rc::as_ptr(left) as *const (), Rc::as_ptr(right) as *const ());
            if Rc::ptr_eq(left, right) || pending.contains(&pair) {
                return true;
            }
            pending.push(pair);
            let (left, right) = (left.borrow(), right.borrow());
            let equal = left.len() == right.len()
                && left.iter().zip(right.iter()).all(|(l, r)| structurally_equal(l, r, pending));
            pending.pop();
            equal
        }
        (Value::Record(left), Value::Record(right)) => {
            let pair = (Rc::as_ptr(left) as *const (), Rc::as_ptr(right) as *const ());
            if Rc::ptr_eq(left, right) || pending.contains(&pair) {
                return true;
            }
            pending.push(pair);
            let (left, right) = (left.borrow(), right.borrow());
            let equal = left.len() == right.len()
                && left
                    .iter()
                    .zip(right.iter())
                    .all(|((lk, lv), (rk, rv))| lk == rk && structurally_equal(lv, rv, pending));
            pending.pop();
            equal
        }
        (Value::Function(left), Value::Function(right)) => Rc::ptr_eq(left, right),
        (Value::NativeFunction(left), Value::NativeFunction(right)) => Rc::ptr_eq(left, right),
        (Value::Error(left), Value::Error(right)) => left.message == right.message,
        _ => false,
    }
}

fn format_number(number: f64) -> String {
    if number.is_nan() {
        "NaN".to_string()
    } else if number.is_infinite() {
        if number > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if number.fract() == 0.0 && number.abs() < 1e15 {
        format!("{:.0}", number)
    } else {
        number.to_string()
    }
}

/// Render a value. Strings are quoted inside containers, and a container
/// that contains itself prints as `[...]` or `{...}` at the point of reentry.
fn render(value: &Value, nested: bool, open: &mut Vec<*const ()>) -> String {
    match value {
        Value::String(s) if nested => format!("\"{}\"", s),
        Value::Array(array) => {
            let id = Rc::as_ptr(array) as *const ();
            if open.contains(&id) {
                return "[...]".to_string();
            }
            open.push(id);
            let items: Vec<String> = array.borrow().iter().map(|item| render(item, true, open)).collect();
            open.pop();
            format!("[{}]", items.join(", "))
        }
        Value::Record(record) => {
            let id = Rc::as_ptr(record) as *const ();
            if open.contains(&id) {
                return "{...}".to_string();
            }
            open.push(id);
            let fields: Vec<String> = record
                .borrow()
                .iter()
                .map(|(key, value)| format!("{}: {}", key, render(value, true, open)))
                .collect();
            open.pop();
            format!("{{{}}}", fields.join(", "))
        }
        other => other.to_string(),
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "{}", s),
            Value::Number(number) => write!(f, "{}", format_number(*number)),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Null => write!(f, "null"),
            Value::Undefined => write!(f, "undefined"),
            Value::Array(_) | Value::Record(_) => write!(f, "{}", render(self, false, &mut Vec::new())),
            Value::Function(function) => match &function.name {
                Some(name) => write!(f, "<function {}>", name),
                None => write!(f, "<function>"),
            },
            Value::NativeFunction(native) => write!(f, "<native {}>", native.name),
            Value::Error(error) => write!(f, "Error: {}", error.message),
        }
    }
}
