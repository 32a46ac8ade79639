use livevars::{FunctionKind, ParseError, QueryParser, VarQuery, parse_args, parse_query, try_parse_query};

fn query(function: FunctionKind, arguments: &[&str]) -> VarQuery {
    VarQuery::new(function, arguments.iter().map(|a| a.to_string()).collect())
}

#[test]
fn test_get_single_reference() {
    assert_eq!(parse_query("get(total)").unwrap(), query(FunctionKind::Get, &["total"]));
}

#[test]
fn test_surrounding_whitespace() {
    assert_eq!(
        parse_query("  sum( a ,  b )  ").unwrap(),
        query(FunctionKind::Sum, &["a", "b"])
    );
}

#[test]
fn test_global_reference_keeps_slashes() {
    assert_eq!(
        parse_query("sum(a, notes/b.md/c.d[0])").unwrap(),
        query(FunctionKind::Sum, &["a", "notes/b.md/c.d[0]"])
    );
}

#[test]
fn test_empty_argument_list() {
    assert_eq!(parse_query("sum()").unwrap(), query(FunctionKind::Sum, &[]));
    assert_eq!(parse_query("sum(   )").unwrap(), query(FunctionKind::Sum, &[]));
}

#[test]
fn test_js_func_arguments() {
    assert_eq!(
        parse_args(&FunctionKind::JsFunc, "x, y, func = (a,b) => a+b").unwrap(),
        vec!["(a,b) => a+b", "x", "y"]
    );
}

#[test]
fn test_js_func_without_references() {
    assert_eq!(
        parse_args(&FunctionKind::JsFunc, "func = () => 42").unwrap(),
        vec!["() => 42"]
    );
}

#[test]
fn test_js_func_code_with_parens_and_newlines() {
    let parsed = parse_query("jsFunc(a, func = (x) => {\n  return Math.max(x, 1);\n})").unwrap();
    assert_eq!(parsed.function(), &FunctionKind::JsFunc);
    assert_eq!(parsed.arguments()[0], "(x) => {\n  return Math.max(x, 1);\n}");
    assert_eq!(parsed.arguments()[1], "a");
}

#[test]
fn test_js_func_last_func_marker_wins() {
    assert_eq!(
        parse_args(&FunctionKind::JsFunc, "a, func = 1, func = (b) => b").unwrap(),
        vec!["(b) => b", "a", "func = 1"]
    );
}

#[test]
fn test_js_func_requires_func() {
    assert!(matches!(
        parse_query("jsFunc(a, b)"),
        Err(ParseError::ArgumentParsing {
            function: FunctionKind::JsFunc,
            ..
        })
    ));
}

#[test]
fn test_code_block_arguments() {
    assert_eq!(
        parse_args(&FunctionKind::CodeBlock, "v, code = print({{v}}), lang = python").unwrap(),
        vec!["print({{v}})", "python", "v"]
    );
}

#[test]
fn test_code_block_code_may_contain_commas() {
    assert_eq!(
        parse_args(&FunctionKind::CodeBlock, "a, b, code = f({{a}}, {{b}}), lang = js").unwrap(),
        vec!["f({{a}}, {{b}})", "js", "a", "b"]
    );
}

#[test]
fn test_code_block_requires_lang() {
    assert!(matches!(
        parse_query("codeBlock(v, code = x)"),
        Err(ParseError::ArgumentParsing { .. })
    ));
}

#[test]
fn test_malformed_call() {
    assert!(matches!(parse_query("get total"), Err(ParseError::MalformedCall(_))));
    assert!(matches!(parse_query(""), Err(ParseError::MalformedCall(_))));
    assert_eq!(try_parse_query("(a)"), None);
}

#[test]
fn test_unknown_function() {
    assert_eq!(
        parse_query("avg(a, b)"),
        Err(ParseError::UnknownFunction("avg".to_string()))
    );
}

#[test]
fn test_concat_parses() {
    assert_eq!(
        parse_query("concat(a, b)").unwrap(),
        query(FunctionKind::Concat, &["a", "b"])
    );
}

#[test]
fn test_custom_function_names() {
    let parser = QueryParser::new().with_custom_functions(["double", "get"]);
    assert_eq!(
        parser.parse("double(price)").unwrap(),
        query(FunctionKind::Custom("double".to_string()), &["price"])
    );
    // Built-in names are never shadowed
    assert_eq!(parser.parse("get(a)").unwrap().function(), &FunctionKind::Get);
    assert!(parse_query("double(price)").is_err());
}

#[test]
fn test_round_trip() {
    let queries = [
        "get(total)",
        "sum(a, notes/b.md/c)",
        "sum()",
        "jsFunc(x, y, func = (a, b) => a + b)",
        "jsFunc(func = () => 1)",
        "codeBlock(v, w, code = print({{v}}, {{w}}), lang = python)",
        "codeBlock(code = plain, lang = )",
        "concat(a, b)",
    ];
    for text in queries {
        let parsed = parse_query(text).unwrap();
        assert_eq!(parse_query(&parsed.to_string()).unwrap(), parsed, "{}", text);
    }
}

#[test]
fn test_round_trip_with_unfilled_slots() {
    let queries = [
        query(FunctionKind::Get, &[""]),
        query(FunctionKind::Sum, &["a", ""]),
        query(FunctionKind::Sum, &["", ""]),
        query(FunctionKind::JsFunc, &["(a) => a", ""]),
        query(FunctionKind::JsFunc, &["(a, b) => a", "", "x"]),
        query(FunctionKind::CodeBlock, &["{{v}}", "txt", ""]),
        query(FunctionKind::Get, &[" total "]),
    ];
    for query in queries {
        let text = query.to_string();
        assert_eq!(parse_query(&text).unwrap(), query, "{}", text);
    }
}

#[test]
fn test_unfilled_slot_text() {
    assert_eq!(query(FunctionKind::Get, &[""]).to_string(), "get()");
    assert_eq!(
        query(FunctionKind::JsFunc, &["(a) => a", ""]).to_string(),
        "jsFunc(, func = (a) => a)"
    );
    assert_eq!(
        parse_args(&FunctionKind::JsFunc, " , func = (a) => a").unwrap(),
        vec!["(a) => a", ""]
    );
}

#[test]
fn test_deserialize_normalises() {
    let parsed: VarQuery =
        serde_json::from_value(serde_json::json!({"function": "get", "arguments": [" "]})).unwrap();
    assert_eq!(parsed, query(FunctionKind::Get, &[]));
}

#[test]
fn test_display_format() {
    let parsed = parse_query("jsFunc(x,y,func=(a,b)=>a*b)").unwrap();
    assert_eq!(parsed.to_string(), "jsFunc(x, y, func = (a,b)=>a*b)");
    assert_eq!(parsed.references(), ["x", "y"]);
}

#[test]
fn test_serialize_query() {
    let parsed = parse_query("get(a.b)").unwrap();
    assert_eq!(
        serde_json::to_value(&parsed).unwrap(),
        serde_json::json!({"function": "get", "arguments": ["a.b"]})
    );
}

#[test]
fn test_builtin_names() {
    for kind in FunctionKind::BUILTINS {
        assert_eq!(FunctionKind::builtin(kind.name()), Some(kind.clone()));
        assert_eq!(FunctionKind::from(kind.to_string()), kind);
    }
    assert_eq!(FunctionKind::builtin("Get"), None);
}
