use livevars::{Script, ScriptError, ScriptLimits, SyntaxError, Value};
use serde_json::json;

fn run(code: &str, args: Vec<Value>) -> Result<Value, ScriptError> {
    Script::compile(code)?.call(args, ScriptLimits::default())
}

fn json_value(value: serde_json::Value) -> Value {
    Value::from(value)
}

#[test]
fn test_arrow_expression_body() {
    assert_eq!(
        run("(a, b) => a + b", vec![Value::Integer(2), Value::Integer(3)]).unwrap(),
        Value::Integer(5)
    );
    assert_eq!(run("x => x * 2", vec![Value::Float(1.5)]).unwrap(), Value::Integer(3));
}

#[test]
fn test_decimal_arithmetic() {
    assert_eq!(
        run("(a, b) => a + b", vec![Value::Float(0.1), Value::Float(0.2)]).unwrap(),
        Value::Float(0.3)
    );
    assert_eq!(
        run("(a, b) => a / b", vec![Value::Integer(7), Value::Integer(2)]).unwrap(),
        Value::Float(3.5)
    );
}

#[test]
fn test_block_body_with_bindings() {
    let code = "(net) => { const rate = 0.25; let gross = net * (1 + rate); return gross; }";
    assert_eq!(run(code, vec![Value::Integer(100)]).unwrap(), Value::Integer(125));
}

#[test]
fn test_function_expression() {
    let code = "function (a, b) { return a > b ? a : b; }";
    assert_eq!(
        run(code, vec![Value::Integer(4), Value::Integer(9)]).unwrap(),
        Value::Integer(9)
    );
}

#[test]
fn test_block_without_return_is_null() {
    assert_eq!(run("() => { const a = 1; }", vec![]).unwrap(), Value::Null);
}

#[test]
fn test_string_concatenation() {
    assert_eq!(
        run("(name, n) => name + ': ' + n", vec![Value::from("total"), Value::Integer(4)]).unwrap(),
        Value::from("total: 4")
    );
    assert_eq!(
        run("(a, b) => a + b", vec![Value::from("1"), Value::Integer(2)]).unwrap(),
        Value::from("12")
    );
}

#[test]
fn test_loose_and_strict_equality() {
    assert_eq!(
        run("(a) => a == 1", vec![Value::from("1")]).unwrap(),
        Value::Boolean(true)
    );
    assert_eq!(
        run("(a) => a === 1", vec![Value::from("1")]).unwrap(),
        Value::Boolean(false)
    );
}

#[test]
fn test_logical_operators_return_operands() {
    assert_eq!(
        run("(a) => a || 'fallback'", vec![Value::from("")]).unwrap(),
        Value::from("fallback")
    );
    assert_eq!(
        run("(a) => a ?? 'none'", vec![Value::Integer(0)]).unwrap(),
        Value::Integer(0)
    );
    assert_eq!(
        run("(a) => a && a.length", vec![Value::from("abc")]).unwrap(),
        Value::Integer(3)
    );
}

#[test]
fn test_string_methods() {
    let s = vec![Value::from("  Hello World ")];
    assert_eq!(run("s => s.trim().toUpperCase()", s.clone()).unwrap(), Value::from("HELLO WORLD"));
    assert_eq!(run("s => s.trim().split(' ')", s.clone()).unwrap(), json_value(json!(["Hello", "World"])));
    assert_eq!(run("s => s.includes('World')", s.clone()).unwrap(), Value::Boolean(true));
    assert_eq!(run("s => s.trim().slice(-5)", s.clone()).unwrap(), Value::from("World"));
    assert_eq!(run("s => s.indexOf('o')", s.clone()).unwrap(), Value::Integer(6));
    assert_eq!(run("s => s.trim().replaceAll('o', '0')", s).unwrap(), Value::from("Hell0 W0rld"));
    assert_eq!(run("s => s.padStart(4, '0')", vec![Value::from("7")]).unwrap(), Value::from("0007"));
}

#[test]
fn test_array_callbacks() {
    let items = vec![json_value(json!([
        {"name": "rent", "cost": 900, "paid": true},
        {"name": "food", "cost": 350, "paid": false},
        {"name": "gym", "cost": 40, "paid": true}
    ]))];

    assert_eq!(
        run("items => items.filter(i => i.paid).map(i => i.name).join(', ')", items.clone()).unwrap(),
        Value::from("rent, gym")
    );
    assert_eq!(
        run("items => items.reduce((acc, i) => acc + i.cost, 0)", items.clone()).unwrap(),
        Value::Integer(1290)
    );
    assert_eq!(
        run("items => items.find(i => i.cost < 100).name", items.clone()).unwrap(),
        Value::from("gym")
    );
    assert_eq!(
        run("items => items.some(i => !i.paid)", items.clone()).unwrap(),
        Value::Boolean(true)
    );
    assert_eq!(
        run("items => items.every(i => i.cost > 10)", items.clone()).unwrap(),
        Value::Boolean(true)
    );
    assert_eq!(
        run("items => items.map((i, idx) => idx)", items).unwrap(),
        json_value(json!([0, 1, 2]))
    );
}

#[test]
fn test_callbacks_see_outer_parameters() {
    assert_eq!(
        run(
            "(xs, min) => xs.filter(x => x >= min).length",
            vec![json_value(json!([1, 5, 10])), Value::Integer(5)]
        )
        .unwrap(),
        Value::Integer(2)
    );
}

#[test]
fn test_globals() {
    assert_eq!(run("x => Math.round(x)", vec![Value::Float(2.5)]).unwrap(), Value::Integer(3));
    assert_eq!(run("x => Math.max(x, 10, 3)", vec![Value::Integer(7)]).unwrap(), Value::Integer(10));
    assert_eq!(run("x => Math.abs(x)", vec![Value::Integer(-4)]).unwrap(), Value::Integer(4));
    assert_eq!(run("x => parseInt(x)", vec![Value::from("42px")]).unwrap(), Value::Integer(42));
    assert_eq!(run("x => parseFloat(x)", vec![Value::from("2.5kg")]).unwrap(), Value::Float(2.5));
    assert_eq!(run("x => String(x)", vec![Value::Integer(5)]).unwrap(), Value::from("5"));
    assert_eq!(run("x => Number(x)", vec![Value::from("12")]).unwrap(), Value::Integer(12));
    assert_eq!(
        run("o => Object.keys(o)", vec![json_value(json!({"b": 1, "a": 2}))]).unwrap(),
        json_value(json!(["b", "a"]))
    );
    assert_eq!(
        run("o => JSON.stringify(o)", vec![json_value(json!({"a": [1, 2]}))]).unwrap(),
        Value::from(r#"{"a":[1,2]}"#)
    );
}

#[test]
fn test_number_methods() {
    assert_eq!(run("x => x.toFixed(2)", vec![Value::Float(3.14159)]).unwrap(), Value::from("3.14"));
    assert_eq!(run("x => (x * 2).toString()", vec![Value::Integer(21)]).unwrap(), Value::from("42"));
}

#[test]
fn test_object_and_array_literals() {
    assert_eq!(
        run("(a, b) => ({total: a + b, parts: [a, b]})", vec![Value::Integer(1), Value::Integer(2)])
            .unwrap(),
        json_value(json!({"total": 3, "parts": [1, 2]}))
    );
}

#[test]
fn test_arity_must_match() {
    let script = Script::compile("(a, b) => a + b").unwrap();
    assert_eq!(script.arity(), 2);
    assert_eq!(
        script.call(vec![Value::Integer(1)], ScriptLimits::default()),
        Err(ScriptError::Arity { expected: 2, got: 1 })
    );
}

#[test]
fn test_not_a_function() {
    assert_eq!(
        Script::compile("1 + 2"),
        Err(ScriptError::Syntax(SyntaxError::NotAFunction))
    );
}

#[test]
fn test_syntax_errors() {
    assert!(matches!(Script::compile("(a) => a +"), Err(ScriptError::Syntax(_))));
    assert!(matches!(Script::compile("(a) => 'open"), Err(ScriptError::Syntax(SyntaxError::Lex(_)))));
}

#[test]
fn test_runtime_errors() {
    assert_eq!(
        run("a => b", vec![Value::Integer(1)]),
        Err(ScriptError::UndefinedVariable("b".to_string()))
    );
    assert!(matches!(
        run("a => a.name", vec![Value::Null]),
        Err(ScriptError::TypeError(_))
    ));
    assert!(matches!(
        run("a => a.frobnicate()", vec![Value::from("x")]),
        Err(ScriptError::UnknownMethod { .. })
    ));
    assert_eq!(
        run("a => a(1)", vec![Value::Integer(1)]),
        Err(ScriptError::NotCallable("a".to_string()))
    );
}

#[test]
fn test_no_access_outside_arguments() {
    for code in ["() => window", "() => require('fs')", "() => process.env"] {
        assert!(matches!(run(code, vec![]), Err(ScriptError::UndefinedVariable(_))), "{}", code);
    }
}

#[test]
fn test_step_limit() {
    let limits = ScriptLimits { max_steps: 50 };
    let script = Script::compile("xs => xs.map(x => x * 2)").unwrap();
    let many = Value::Array((0..100).map(Value::Integer).collect());
    assert_eq!(
        script.call(vec![many], limits),
        Err(ScriptError::StepLimitExceeded(50))
    );

    let huge = Script::compile("s => s.repeat(1000000)").unwrap();
    assert_eq!(
        huge.call(vec![Value::from("abc")], ScriptLimits::default()),
        Err(ScriptError::StepLimitExceeded(100_000))
    );
}

#[test]
fn test_division_by_zero_follows_floats() {
    assert!(matches!(
        run("a => a / 0", vec![Value::Integer(1)]).unwrap(),
        Value::Float(n) if n.is_infinite()
    ));
}

#[test]
fn test_growing_strings_are_charged() {
    let items = vec!["0"; 40].join(", ");
    let doubling = format!("s => [{items}].reduce((acc) => acc + acc, s)");
    assert_eq!(
        run(&doubling, vec![Value::from("ab")]),
        Err(ScriptError::StepLimitExceeded(100_000))
    );

    let quoting = format!("s => [{items}].reduce((acc) => JSON.stringify([acc, acc]), s)");
    assert_eq!(
        run(&quoting, vec![Value::from("ab")]),
        Err(ScriptError::StepLimitExceeded(100_000))
    );

    let joining = format!("s => [{items}].reduce((acc) => [acc, acc, acc].join(''), s)");
    assert_eq!(
        run(&joining, vec![Value::from("ab")]),
        Err(ScriptError::StepLimitExceeded(100_000))
    );
}

#[test]
fn test_growing_arrays_are_charged() {
    let items = vec!["0"; 40].join(", ");
    let concat = format!("xs => [{items}].reduce((acc) => acc.concat(acc), xs)");
    assert_eq!(
        run(&concat, vec![json_value(json!([1, 2]))]),
        Err(ScriptError::StepLimitExceeded(100_000))
    );

    let nested = format!("x => [{items}].reduce((acc) => [acc, acc], x)");
    assert_eq!(
        run(&nested, vec![Value::Integer(1)]),
        Err(ScriptError::StepLimitExceeded(100_000))
    );

    // Ordinary copies stay well inside the budget
    assert_eq!(
        run("xs => xs.concat(xs).join('-')", vec![json_value(json!(["a", "b"]))]).unwrap(),
        Value::from("a-b-a-b")
    );
}

#[test]
fn test_value_nesting_limit() {
    let limits = ScriptLimits { max_steps: 10_000_000 };
    let script = Script::compile("xs => xs.reduce((acc) => [acc], 0)").unwrap();
    let many = Value::Array((0..300).map(Value::Integer).collect());
    assert_eq!(
        script.call(vec![many], limits),
        Err(ScriptError::NestingTooDeep(256))
    );

    let few = Value::Array((0..3).map(Value::Integer).collect());
    assert_eq!(
        script.call(vec![few], limits).unwrap(),
        json_value(json!([[[0]]]))
    );
}

#[test]
fn test_nesting_depth_limit() {
    let deep = [
        format!("() => {}1{}", "(".repeat(2000), ")".repeat(2000)),
        format!("() => {}1{}", "[".repeat(2000), "]".repeat(2000)),
        format!("() => {}true", "!".repeat(2000)),
        format!("() => 1{}", " + 1".repeat(2000)),
        format!("x => x{}", ".a".repeat(2000)),
        format!("() => {}1", "() => ".repeat(2000)),
    ];
    for code in &deep {
        assert!(
            matches!(
                Script::compile(code),
                Err(ScriptError::Syntax(SyntaxError::TooDeep { .. }))
            ),
            "{}",
            &code[..20]
        );
    }

    let shallow = format!("() => {}1{}", "(".repeat(50), ")".repeat(50));
    assert_eq!(run(&shallow, vec![]).unwrap(), Value::Integer(1));
    let chain = format!("() => 1{}", " + 1".repeat(60));
    assert_eq!(run(&chain, vec![]).unwrap(), Value::Integer(61));
}
