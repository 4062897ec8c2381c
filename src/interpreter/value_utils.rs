//! Operator and member-access semantics on plain values. Failures are
//! returned as messages; the evaluator attaches the line and raises them
//! as guest errors.

use std::rc::Rc;

use crate::value::Value;

fn operand_error(op: &str, left: &Value, right: &Value) -> String {
    format!("Cannot apply '{}' to {} and {}", op, left.kind(), right.kind())
}

pub fn binary_op(op: &str, left: &Value, right: &Value) -> Result<Value, String> {
    match op {
        "===" => return Ok(Value::Boolean(left == right)),
        "!==" => return Ok(Value::Boolean(left != right)),
        "+" => {
            if let (Value::String(a), Value::String(b)) = (left, right) {
                let mut combined = String::with_capacity(a.len() + b.len());
                combined.push_str(a);
                combined.push_str(b);
                return Ok(Value::String(Rc::from(combined)));
            }
        }
        _ => {}
    }

    let (Value::Number(a), Value::Number(b)) = (left, right) else {
        return Err(operand_error(op, left, right));
    };
    let (a, b) = (*a, *b);

    let result = match op {
        "+" => Value::Number(a + b),
        "-" => Value::Number(a - b),
        "*" => Value::Number(a * b),
        "/" => Value::Number(a / b),
        "**" => Value::Number(a.powf(b)),
        "<" => Value::Boolean(a < b),
        "<=" => Value::Boolean(a <= b),
        ">" => Value::Boolean(a > b),
        ">=" => Value::Boolean(a >= b),
        _ => return Err(format!("Unknown operator '{}'", op)),
    };
    Ok(result)
}

pub fn unary_op(op: &str, value: &Value) -> Result<Value, String> {
    match (op, value) {
        ("typeof", value) => Ok(Value::string(value.type_of())),
        ("-", Value::Number(n)) => Ok(Value::Number(-n)),
        ("-", other) => Err(format!("Cannot negate {}", other.kind())),
        _ => Err(format!("Unknown operator '{}'", op)),
    }
}

/// Operands of `&&`, `||` and conditions must be booleans.
pub fn expect_bool(what: &str, value: &Value) -> Result<bool, String> {
    value
        .as_bool()
        .ok_or_else(|| format!("{} must be a boolean, got {}", what, value.kind()))
}

fn array_slot(index: f64, len: usize) -> Option<usize> {
    if index.fract() == 0.0 && index >= 0.0 && (index as usize) < len {
        Some(index as usize)
    } else {
        None
    }
}

/// Read `target[key]` (and `target.key`, which arrives with a string key).
pub fn get_index(target: &Value, key: &Value) -> Result<Value, String> {
    match (target, key) {
        (Value::Array(items), Value::Number(n)) => {
            let items = items.borrow();
            Ok(array_slot(*n, items.len())
                .map(|i| items[i].clone())
                .unwrap_or(Value::Undefined))
        }
        (Value::Array(_), other) => Err(format!("Array index must be a number, got {}", other.kind())),
        (Value::Record(fields), Value::String(name)) => fields
            .borrow()
            .get(name.as_ref())
            .cloned()
            .ok_or_else(|| format!("Property '{}' does not exist", name)),
        (Value::Record(_), other) => Err(format!("Property name must be a string, got {}", other.kind())),
        (Value::String(text), Value::Number(n)) => {
            let character = if n.fract() == 0.0 && *n >= 0.0 {
                text.chars().nth(*n as usize)
            } else {
                None
            };
            Ok(character
                .map(|c| Value::String(Rc::from(c.to_string())))
                .unwrap_or(Value::Undefined))
        }
        (Value::Error(error), Value::String(name)) => match name.as_ref() {
            "message" => Ok(Value::string(&error.message)),
            "line" => Ok(Value::Number(error.line as f64)),
            _ => Err(format!("Property '{}' does not exist", name)),
        },
        (Value::Function(_) | Value::NativeFunction(_), _) => Err("Cannot index a function".to_string()),
        (other, key) => Err(format!("Cannot index {} with {}", other.kind(), key.kind())),
    }
}

/// Overwrite an existing array slot or record property.
pub fn set_index(target: &Value, key: &Value, value: Value) -> Result<(), String> {
    match (target, key) {
        (Value::Array(items), Value::Number(n)) => {
            let mut items = items.borrow_mut();
            match array_slot(*n, items.len()) {
                Some(i) => {
                    items[i] = value;
                    Ok(())
                }
                None => Err(format!("Array index {} is out of bounds", Value::Number(*n))),
            }
        }
        (Value::Record(fields), Value::String(name)) => match fields.borrow_mut().get_mut(name.as_ref()) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(format!("Property '{}' does not exist", name)),
        },
        (Value::Array(_) | Value::Record(_), key) => Err(format!("Cannot assign through a {} key", key.kind())),
        (other, _) => Err(format!("Cannot assign a member of {}", other.kind())),
    }
}
