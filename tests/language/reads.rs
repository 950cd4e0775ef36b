//! Tests for read tracking during evaluation

use std::collections::BTreeMap;

use formlogic_foundation::Value;
use formlogic_language::{Evaluator, compile};
use serde_json::json;

fn vars() -> BTreeMap<String, Value> {
    BTreeMap::from([
        ("a".to_string(), Value::from(1)),
        ("b".to_string(), Value::from(2)),
        ("person".to_string(), Value::from(&json!({"age": 40}))),
    ])
}

fn reads(source: serde_json::Value) -> Vec<(String, Value)> {
    let vars = vars();
    let mut evaluator = Evaluator::new(&vars);
    evaluator.eval(&compile(&source).unwrap());
    evaluator
        .into_reads()
        .into_iter()
        .map(|r| (r.key, r.value))
        .collect()
}

#[test]
fn each_variable_is_recorded_once() {
    let seen = reads(json!({"+": [{"var": "a"}, {"var": "a"}, {"var": "b"}]}));
    assert_eq!(
        seen,
        vec![
            ("a".to_string(), Value::Number(1.0)),
            ("b".to_string(), Value::Number(2.0)),
        ]
    );
}

#[test]
fn dotted_reads_record_the_root_value() {
    let seen = reads(json!({"var": "person.age"}));
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].0, "person");
    assert_eq!(seen[0].1, Value::from(&json!({"age": 40})));
}

#[test]
fn undeclared_reads_record_null() {
    assert_eq!(reads(json!({"var": "ghost"})), vec![("ghost".to_string(), Value::Null)]);
}

#[test]
fn short_circuit_skips_reads() {
    let seen = reads(json!({"and": [false, {"var": "a"}]}));
    assert!(seen.is_empty());

    let seen = reads(json!({"or": [{"==": [{"var": "a"}, 1]}, {"var": "b"}]}));
    assert_eq!(seen.len(), 1);

    let seen = reads(json!({"if": [true, {"var": "a"}, {"var": "b"}]}));
    assert_eq!(seen, vec![("a".to_string(), Value::Number(1.0))]);
}

#[test]
fn condition_requires_boolean_true() {
    let vars = vars();
    let mut evaluator = Evaluator::new(&vars);
    assert!(evaluator.condition(&compile(&json!({"==": [{"var": "a"}, 1]})).unwrap()));
    assert!(!evaluator.condition(&compile(&json!({"var": "a"})).unwrap()));
    assert_eq!(evaluator.reads().len(), 1);
}
