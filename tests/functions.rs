mod common;

use brace::Value;
use common::{number, output, run, runtime_error, string};

#[test]
fn test_call_with_arguments() {
    let source = r#"
        function add(a, b) { return a + b; }
        return add(1, 2);
    "#;
    assert_eq!(run(source).unwrap(), number(3.0));
}

#[test]
fn test_too_few_arguments() {
    let source = r#"
        function add(a, b) { return a + b; }
        let x = add(1);
    "#;
    assert_eq!(runtime_error(source), "Function 'add' expects 2 argument(s), got 1");
}

#[test]
fn test_extra_arguments_are_ignored() {
    let source = r#"
        let first = function (a) { return a; };
        return first(1, 2, 3);
    "#;
    assert_eq!(run(source).unwrap(), number(1.0));
}

#[test]
fn test_arguments_evaluate_left_to_right() {
    let source = r#"
        function ignore(a, b, c) { }
        function main() {
            ignore(log("one"), log("two"), log("three"));
        }
    "#;
    assert_eq!(output(source), vec!["one", "two", "three"]);
}

#[test]
fn test_falling_off_the_end_returns_undefined() {
    let source = r#"
        function nothing() { let x = 1; }
        return nothing();
    "#;
    assert_eq!(run(source).unwrap(), Value::Undefined);
}

#[test]
fn test_recursion() {
    let source = r#"
        function fact(n) {
            if (n <= 1) {
                return 1;
            }
            return n * fact(n - 1);
        }
        return fact(10);
    "#;
    assert_eq!(run(source).unwrap(), number(3628800.0));
}

#[test]
fn test_free_names_resolve_at_the_call_site() {
    // A function sees the bindings of its caller, not of the scope it was
    // written in.
    let source = r#"
        function show() { return label; }
        function caller() {
            let label = "from caller";
            return show();
        }
        return caller();
    "#;
    assert_eq!(run(source).unwrap(), string("from caller"));
}

#[test]
fn test_returned_function_does_not_capture_its_definition_scope() {
    let source = r#"
        function make() {
            let hidden = 42;
            return function () { return hidden; };
        }
        let f = make();
        let g = f();
    "#;
    assert_eq!(runtime_error(source), "Variable 'hidden' does not exist");
}

#[test]
fn test_function_writes_reach_the_caller_frame() {
    let source = r#"
        let counter = 0;
        function bump() { counter = counter + 1; }
        bump();
        bump();
        return counter;
    "#;
    assert_eq!(run(source).unwrap(), number(2.0));
}

#[test]
fn test_functions_are_values() {
    let source = r#"
        let apply = function (f, x) { return f(x); };
        let double = function (x) { return x * 2; };
        return apply(double, 21);
    "#;
    assert_eq!(run(source).unwrap(), number(42.0));
}

#[test]
fn test_immediately_called_function_literal() {
    let source = r#"
        let x = function (n) { return n + 1; }(4);
        return x;
    "#;
    assert_eq!(run(source).unwrap(), number(5.0));
}

#[test]
fn test_call_result_can_be_called() {
    let source = r#"
        function adder(a) {
            return function (b) { return b + 10; };
        }
        return adder(1)(2);
    "#;
    assert_eq!(run(source).unwrap(), number(12.0));
}

#[test]
fn test_method_call_on_record() {
    let source = r#"
        let greeter = {
            greet: function (name) { return "hi " + name; },
        };
        return [greeter.greet("ada"), greeter["greet"]("bob")];
    "#;
    assert_eq!(
        run(source).unwrap(),
        Value::array(vec![string("hi ada"), string("hi bob")])
    );
}

#[test]
fn test_method_call_requires_a_record() {
    let source = r#"
        let fs = [function (x) { return x + 1; }];
        return fs[0](5);
    "#;
    assert_eq!(runtime_error(source), "Method calls are only allowed on records, got array");
    assert_eq!(
        runtime_error(r#"let s = "abc"; let c = s[0](1);"#),
        "Method calls are only allowed on records, got string"
    );
}

#[test]
fn test_calling_a_non_function() {
    let source = r#"
        let x = 3;
        let y = x(1);
    "#;
    assert_eq!(runtime_error(source), "Cannot call number");
}

#[test]
fn test_break_escaping_a_function_yields_undefined() {
    let source = r#"
        function escape() {
            break;
        }
        let x = 0;
        while (x < 3) {
            x = x + 1;
            let r = escape();
        }
        return x;
    "#;
    assert_eq!(run(source).unwrap(), number(3.0));
}

#[test]
fn test_main_runs_after_top_level() {
    let source = r#"
        let greeting = "hello";
        function main() {
            log(greeting);
            log(native);
            return 7;
        }
    "#;
    let (result, lines) = common::run_capture(source);
    assert_eq!(result.unwrap(), number(7.0));
    assert_eq!(lines, vec!["hello", "false"]);
}

#[test]
fn test_main_does_not_start_a_nested_run() {
    let source = r#"
        function main() {
            if (native) {
                log("nested");
            }
            log("outer");
        }
    "#;
    assert_eq!(output(source), vec!["outer"]);
}

#[test]
fn test_native_receives_only_the_first_argument() {
    let source = r#"
        function main() {
            log("a", "b");
            let result = log("c");
            log(typeof result);
        }
    "#;
    assert_eq!(output(source), vec!["a", "c", "undefined"]);
}

#[test]
fn test_native_called_without_arguments() {
    let source = r#"
        function main() {
            log();
        }
    "#;
    assert_eq!(runtime_error(source), "Function 'log' expects 1 argument(s), got 0");
}

#[test]
fn test_log_prints_display_forms() {
    let source = r#"
        function main() {
            log([1, "two", {three: 3}]);
            log(null);
            log(0.5);
        }
    "#;
    assert_eq!(output(source), vec!["[1, \"two\", {three: 3}]", "null", "0.5"]);
}
