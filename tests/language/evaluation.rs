//! Tests for fail-open evaluation semantics

use std::collections::BTreeMap;

use formlogic_foundation::Value;
use formlogic_language::{compile, evaluate};
use proptest::prelude::*;
use serde_json::json;

fn vars() -> BTreeMap<String, Value> {
    BTreeMap::from([
        ("age".to_string(), Value::from(16)),
        ("name".to_string(), Value::from("Ada")),
        ("empty".to_string(), Value::from("")),
        ("married".to_string(), Value::Bool(false)),
        (
            "born".to_string(),
            Value::from(chrono::NaiveDate::from_ymd_opt(2008, 4, 1).unwrap()),
        ),
        (
            "address".to_string(),
            Value::from(&json!({"city": "Utrecht", "lines": ["Oudegracht 1"]})),
        ),
    ])
}

fn eval(source: serde_json::Value) -> Value {
    evaluate(&compile(&source).unwrap(), &vars())
}

#[test]
fn missing_variables_are_null() {
    assert_eq!(eval(json!({"var": "nope"})), Value::Null);
    assert_eq!(eval(json!({"var": "address.zip"})), Value::Null);
    assert_eq!(eval(json!({"var": ["nope", 7]})), Value::Number(7.0));
}

#[test]
fn dotted_paths_descend_into_values() {
    assert_eq!(eval(json!({"var": "address.city"})), Value::from("Utrecht"));
    assert_eq!(
        eval(json!({"var": "address.lines.0"})),
        Value::from("Oudegracht 1")
    );
}

#[test]
fn null_equality_means_empty() {
    assert_eq!(eval(json!({"==": [{"var": "nope"}, null]})), Value::Bool(true));
    assert_eq!(eval(json!({"==": [{"var": "nope"}, "x"]})), Value::Bool(false));
    assert_eq!(eval(json!({"!=": [{"var": "name"}, null]})), Value::Bool(true));
    assert_eq!(eval(json!({"==": [{"var": "empty"}, null]})), Value::Bool(true));
    assert_eq!(eval(json!({"!=": [{"var": "empty"}, null]})), Value::Bool(false));
    assert_eq!(eval(json!({"<": [{"var": "nope"}, 18]})), Value::Bool(false));
    assert_eq!(eval(json!({">=": [{"var": "nope"}, 18]})), Value::Bool(false));
}

#[test]
fn mismatched_types_never_compare() {
    assert_eq!(eval(json!({"==": [{"var": "age"}, "16"]})), Value::Bool(false));
    assert_eq!(eval(json!({"!=": [{"var": "age"}, "16"]})), Value::Bool(false));
    assert_eq!(eval(json!({"<": [{"var": "name"}, 3]})), Value::Bool(false));
}

#[test]
fn dates_compare_with_iso_strings() {
    assert_eq!(
        eval(json!({"<": [{"var": "born"}, "2010-01-01"]})),
        Value::Bool(true)
    );
    assert_eq!(
        eval(json!({"==": [{"var": "born"}, "2008-04-01"]})),
        Value::Bool(true)
    );
    assert_eq!(
        eval(json!({"<": ["2008-01-01", "2010-01-01"]})),
        Value::Bool(true)
    );
    assert_eq!(
        eval(json!({">": [{"date": "2024-02-29"}, {"var": "born"}]})),
        Value::Bool(true)
    );
    assert_eq!(eval(json!({"date": "not a date"})), Value::Null);
}

#[test]
fn arithmetic_fails_to_null() {
    assert_eq!(eval(json!({"+": [{"var": "age"}, 2]})), Value::Number(18.0));
    assert_eq!(eval(json!({"-": [{"var": "age"}]})), Value::Number(-16.0));
    assert_eq!(eval(json!({"%": [{"var": "age"}, 5]})), Value::Number(1.0));
    assert_eq!(eval(json!({"+": [{"var": "name"}, 2]})), Value::Null);
    assert_eq!(eval(json!({"*": [{"var": "nope"}, 2]})), Value::Null);
    assert_eq!(eval(json!({"/": [1, 0]})), Value::Null);
}

#[test]
fn only_true_holds() {
    assert_eq!(eval(json!({"and": [true, 1]})), Value::Bool(false));
    assert_eq!(eval(json!({"or": ["yes", {"var": "nope"}]})), Value::Bool(false));
    assert_eq!(eval(json!({"!": {"var": "married"}})), Value::Bool(true));
    assert_eq!(eval(json!({"!": {"var": "nope"}})), Value::Bool(false));
    assert_eq!(eval(json!({"if": [{"var": "name"}, 1, 2]})), Value::Number(2.0));
    assert_eq!(eval(json!({"if": [false, 1]})), Value::Null);
}

#[test]
fn membership() {
    assert_eq!(eval(json!({"in": ["Ad", {"var": "name"}]})), Value::Bool(true));
    assert_eq!(eval(json!({"in": [16, [15, 16, 17]]})), Value::Bool(true));
    assert_eq!(eval(json!({"in": ["16", [15, 16, 17]]})), Value::Bool(false));
    assert_eq!(eval(json!({"in": [1, {"var": "nope"}]})), Value::Bool(false));
}

fn scalar() -> impl Strategy<Value = serde_json::Value> {
    prop_oneof![
        Just(serde_json::Value::Null),
        any::<bool>().prop_map(serde_json::Value::from),
        (-1000i32..1000).prop_map(serde_json::Value::from),
        "[a-z]{0,4}".prop_map(serde_json::Value::from),
    ]
}

proptest! {
    #[test]
    fn evaluation_never_panics_and_is_pure(
        op in prop::sample::select(vec!["==", "!=", "<", "<=", ">", ">=", "+", "-", "*", "/", "%", "and", "or", "in"]),
        lhs in scalar(),
        rhs in scalar(),
    ) {
        let expr = compile(&json!({op: [lhs, rhs]})).unwrap();
        let first = evaluate(&expr, &vars());
        let second = evaluate(&expr, &vars());
        prop_assert_eq!(first, second);
    }

    #[test]
    fn comparisons_always_yield_booleans(
        op in prop::sample::select(vec!["==", "!=", "<", "<=", ">", ">="]),
        lhs in scalar(),
        rhs in scalar(),
    ) {
        let expr = compile(&json!({op: [lhs, rhs]})).unwrap();
        prop_assert!(matches!(evaluate(&expr, &vars()), Value::Bool(_)));
    }
}
