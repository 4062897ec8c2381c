mod common;

use brace::Value;
use common::{eval, number, run, runtime_error, string};

#[test]
fn test_arithmetic() {
    assert_eq!(eval("2 + 3"), number(5.0));
    assert_eq!(eval("2 + 3 * 4"), number(14.0));
    assert_eq!(eval("(2 + 3) * 4"), number(20.0));
    assert_eq!(eval("10 - 4 - 3"), number(3.0));
    assert_eq!(eval("7 / 2"), number(3.5));
    assert_eq!(eval("2 ** 8"), number(256.0));
    assert_eq!(eval("-3 * -2"), number(6.0));
}

#[test]
fn test_division_by_zero() {
    assert_eq!(eval("1 / 0"), number(f64::INFINITY));
    assert_eq!(eval("1 / 0 === Infinity"), Value::Boolean(true));
}

#[test]
fn test_string_concatenation() {
    assert_eq!(eval("\"a\" + \"b\""), string("ab"));
    assert_eq!(eval("'x' + 'y' + 'z'"), string("xyz"));
}

#[test]
fn test_mixed_addition_is_a_type_error() {
    assert_eq!(
        runtime_error("let x = 2 + \"b\";"),
        "Cannot apply '+' to number and string"
    );
}

#[test]
fn test_comparisons() {
    assert_eq!(eval("1 < 2"), Value::Boolean(true));
    assert_eq!(eval("2 <= 2"), Value::Boolean(true));
    assert_eq!(eval("3 > 4"), Value::Boolean(false));
    assert_eq!(eval("4 >= 5"), Value::Boolean(false));
    assert_eq!(runtime_error("let x = 'a' < 'b';"), "Cannot apply '<' to string and string");
}

#[test]
fn test_comparison_chain_groups_from_the_right() {
    // `1 < (2 === true)` compares a number with a boolean.
    assert_eq!(
        runtime_error("let x = 1 < 2 === true;"),
        "Cannot apply '<' to number and boolean"
    );
    assert_eq!(eval("(1 < 2) === true"), Value::Boolean(true));
}

#[test]
fn test_strict_equality_is_structural() {
    assert_eq!(eval("[1, 2] === [1, 2]"), Value::Boolean(true));
    assert_eq!(eval("{a: 1, b: [2]} === {a: 1, b: [2]}"), Value::Boolean(true));
    assert_eq!(eval("{a: 1, b: 2} === {b: 2, a: 1}"), Value::Boolean(false));
    assert_eq!(eval("null === undefined"), Value::Boolean(false));
    assert_eq!(eval("1 !== '1'"), Value::Boolean(true));
}

#[test]
fn test_function_equality_is_identity() {
    let source = r#"
        let f = function () { };
        let g = function () { };
        return [f === f, f === g];
    "#;
    assert_eq!(
        run(source).unwrap(),
        Value::array(vec![Value::Boolean(true), Value::Boolean(false)])
    );
}

#[test]
fn test_logical_operators() {
    assert_eq!(eval("true && false"), Value::Boolean(false));
    assert_eq!(eval("false || true"), Value::Boolean(true));
    assert_eq!(eval("false && undefinedName"), Value::Boolean(false));
    assert_eq!(eval("true || undefinedName"), Value::Boolean(true));
    assert_eq!(
        runtime_error("let x = 1 && true;"),
        "Operand of '&&' must be a boolean, got number"
    );
}

#[test]
fn test_conditional_operator() {
    assert_eq!(eval("true ? 1 : 2"), number(1.0));
    assert_eq!(eval("1 > 2 ? 'yes' : 'no'"), string("no"));
    assert_eq!(
        runtime_error("let x = 0 ? 1 : 2;"),
        "Condition of '?' must be a boolean, got number"
    );
}

#[test]
fn test_typeof() {
    assert_eq!(eval("typeof 1"), string("number"));
    assert_eq!(eval("typeof 'a'"), string("string"));
    assert_eq!(eval("typeof true"), string("boolean"));
    assert_eq!(eval("typeof undefined"), string("undefined"));
    assert_eq!(eval("typeof null"), string("object"));
    assert_eq!(eval("typeof [1]"), string("object"));
    assert_eq!(eval("typeof {a: 1}"), string("object"));
    assert_eq!(eval("typeof function () { }"), string("function"));
}

#[test]
fn test_unary_minus_needs_a_number() {
    assert_eq!(runtime_error("let x = -'a';"), "Cannot negate string");
}
