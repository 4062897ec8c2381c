mod common;

use brace::Value;
use common::{eval, number, output, run, runtime_error, string};

#[test]
fn test_let_binds_value() {
    assert_eq!(run("let x = [1, 'a', null]; return x;").unwrap(), eval("[1, 'a', null]"));
    assert_eq!(run("let x; return x;").unwrap(), Value::Undefined);
}

#[test]
fn test_array_indexing() {
    assert_eq!(eval("[10, 20, 30][1]"), number(20.0));
    assert_eq!(eval("[10, 20, 30][3]"), Value::Undefined);
    assert_eq!(eval("[10, 20, 30][-1]"), Value::Undefined);
    assert_eq!(eval("[10, 20, 30][0.5]"), Value::Undefined);
    assert_eq!(
        runtime_error("let x = [1][\"0\"];"),
        "Array index must be a number, got string"
    );
}

#[test]
fn test_record_access() {
    let source = r#"
        let point = {x: 1, "y": 2};
        return [point.x, point["y"]];
    "#;
    assert_eq!(run(source).unwrap(), Value::array(vec![number(1.0), number(2.0)]));
}

#[test]
fn test_missing_record_key_is_an_error() {
    assert_eq!(
        runtime_error("let p = {x: 1}; let y = p.y;"),
        "Property 'y' does not exist"
    );
}

#[test]
fn test_string_indexing() {
    assert_eq!(eval("'abc'[1]"), string("b"));
    assert_eq!(eval("'abc'[5]"), Value::Undefined);
}

#[test]
fn test_indexing_a_function_is_an_error() {
    assert_eq!(
        runtime_error("let f = function () { }; let x = f.name;"),
        "Cannot index a function"
    );
}

#[test]
fn test_nested_access() {
    let source = r#"
        let data = {users: [{name: "ada"}, {name: "bob"}]};
        return data.users[1].name;
    "#;
    assert_eq!(run(source).unwrap(), string("bob"));
}

#[test]
fn test_array_spread() {
    let source = r#"
        let a = [1, 2];
        let b = [0, ...a, 3];
        return b;
    "#;
    assert_eq!(
        run(source).unwrap(),
        Value::array(vec![number(0.0), number(1.0), number(2.0), number(3.0)])
    );
}

#[test]
fn test_spread_copies_elements() {
    let source = r#"
        let a = [1];
        let b = [...a];
        b[0] = 9;
        return a[0];
    "#;
    assert_eq!(run(source).unwrap(), number(1.0));
}

#[test]
fn test_record_spread() {
    let source = r#"
        let base = {a: 1, b: 2};
        let more = {...base, b: 3, c: 4};
        return [more.a, more.b, more.c];
    "#;
    assert_eq!(
        run(source).unwrap(),
        Value::array(vec![number(1.0), number(3.0), number(4.0)])
    );
}

#[test]
fn test_spreading_the_wrong_kind() {
    assert_eq!(
        runtime_error("let r = {a: 1}; let xs = [...r];"),
        "Cannot spread record into an array"
    );
    assert_eq!(
        runtime_error("let xs = [1]; let r = {...xs};"),
        "Cannot spread array into a record"
    );
}

#[test]
fn test_member_assignment() {
    let source = r#"
        let p = {x: 1};
        let xs = [1, 2];
        p.x = 5;
        p["x"] = p.x + 1;
        xs[1] = 7;
        return [p.x, xs];
    "#;
    assert_eq!(
        run(source).unwrap(),
        Value::array(vec![number(6.0), Value::array(vec![number(1.0), number(7.0)])])
    );
}

#[test]
fn test_member_assignment_evaluates_value_first() {
    let source = r#"
        let record = {a: 0};
        function main() {
            let target = function () { log("target"); return record; };
            let key = function () { log("key"); return "a"; };
            let value = function () { log("value"); return 5; };
            target()[key()] = value();
            log(record.a);
        }
    "#;
    assert_eq!(output(source), vec!["value", "target", "key", "5"]);
}

#[test]
fn test_self_referencing_array() {
    let source = r#"
        let a = [0, 1];
        let b = [0, 1];
        a[0] = a;
        b[0] = b;
        function main() {
            log(a);
            log(a === b);
        }
    "#;
    assert_eq!(output(source), vec!["[[...], 1]", "true"]);
}

#[test]
fn test_member_assignment_requires_existing_slot() {
    assert_eq!(
        runtime_error("let p = {x: 1}; p.y = 2;"),
        "Property 'y' does not exist"
    );
    assert_eq!(
        runtime_error("let xs = [1]; xs[4] = 2;"),
        "Array index 4 is out of bounds"
    );
}

#[test]
fn test_arrays_are_shared_by_reference() {
    let source = r#"
        let a = [1, 2];
        let b = a;
        b[0] = 100;
        return a[0];
    "#;
    assert_eq!(run(source).unwrap(), number(100.0));
}

#[test]
fn test_constants() {
    assert_eq!(eval("true"), Value::Boolean(true));
    assert_eq!(eval("null"), Value::Null);
    assert_eq!(eval("undefined"), Value::Undefined);
    assert_eq!(eval("Infinity"), number(f64::INFINITY));
}
