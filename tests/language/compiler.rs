//! Tests for compiling JsonLogic documents

use formlogic_foundation::ErrorKind;
use formlogic_language::{Expr, compile, compile_str};
use serde_json::json;

#[test]
fn renders_compiled_tree() {
    let expr = compile(&json!({"and": [
        {"<": [{"var": "age"}, 18]},
        {"!": {"var": "married"}}
    ]}))
    .unwrap();
    assert_eq!(expr.to_string(), "(and (< age 18) (not married))");

    let expr = compile(&json!({"in": [{"var": "country"}, ["NL", "BE"]]})).unwrap();
    assert_eq!(expr.to_string(), r#"(in country (array "NL" "BE"))"#);
}

#[test]
fn three_operand_less_than_is_a_range() {
    let expr = compile(&json!({"<=": [0, {"var": "x"}, 10]})).unwrap();
    assert_eq!(expr.to_string(), "(and (<= 0 x) (<= x 10))");
}

#[test]
fn if_chains_pair_conditions_with_results() {
    let expr = compile(&json!({"if": [
        {"<": [{"var": "age"}, 13]}, "child",
        {"<": [{"var": "age"}, 18]}, "teen",
        "adult"
    ]}))
    .unwrap();
    let Expr::If {
        branches,
        otherwise,
    } = expr
    else {
        panic!("expected if");
    };
    assert_eq!(branches.len(), 2);
    assert_eq!(otherwise.as_deref(), Some(&Expr::literal("adult")));
}

#[test]
fn collects_referenced_variables() {
    let expr = compile(&json!({"or": [
        {"==": [{"var": "a"}, {"var": ["b.c", {"var": "d"}]}]},
        {"+": [{"var": "a"}, 1]}
    ]}))
    .unwrap();
    let vars: Vec<String> = expr.variables().into_iter().collect();
    assert_eq!(vars, vec!["a", "b.c", "d"]);
}

#[test]
fn objects_with_several_keys_are_data() {
    let expr = compile(&json!({"a": 1, "b": 2})).unwrap();
    assert!(matches!(expr, Expr::Literal(_)));
}

#[test]
fn rejects_bad_documents() {
    let cases = [
        json!({"regex": ["a", "b"]}),
        json!({"==": [1]}),
        json!({"/": [1, 2, 3]}),
        json!({"-": [1, 2, 3]}),
        json!({"and": []}),
        json!({"!": [true, false]}),
        json!({"var": {"nested": true}}),
    ];
    for case in cases {
        let err = compile(&case).unwrap_err();
        assert!(
            matches!(err.kind, ErrorKind::InvalidExpression(_)),
            "{case}"
        );
    }
}

#[test]
fn compile_str_reports_malformed_json() {
    let err = compile_str("{\"var\": ").unwrap_err();
    assert!(matches!(err.kind, ErrorKind::Serialization(_)));
    assert!(compile_str(r#"{"var": "age"}"#).is_ok());
}
