//! Tests for VariableStore writes, snapshots, and change detection

use std::collections::BTreeMap;

use formlogic_foundation::{Value, VarType};
use formlogic_storage::{VariableDefinition, VariableStore};

fn store() -> VariableStore {
    VariableStore::new([
        VariableDefinition::user_defined("age", VarType::Number),
        VariableDefinition::user_defined("name", VarType::String),
        VariableDefinition::user_defined("agreed", VarType::Boolean).with_initial_value(false),
    ])
    .unwrap()
}

#[test]
fn starts_with_defaults() {
    let store = store();
    assert_eq!(store.len(), 3);
    assert_eq!(store.get("age").unwrap(), &Value::Null);
    assert_eq!(store.get("name").unwrap(), &Value::from(""));
    assert_eq!(store.get("agreed").unwrap(), &Value::Bool(false));
    assert!(store.get("missing").unwrap_err().is_unknown_variable());
}

#[test]
fn set_coerces_and_reports_change() {
    let mut store = store();
    assert!(store.set("age", Value::from("16")).unwrap());
    assert_eq!(store.lookup("age"), Some(&Value::Number(16.0)));
    assert!(!store.set("age", Value::from(16)).unwrap());

    let err = store.set("age", Value::from("sixteen")).unwrap_err();
    assert!(err.is_type_mismatch());
    assert_eq!(store.lookup("age"), Some(&Value::Number(16.0)));
}

#[test]
fn negative_zero_is_not_a_change() {
    let mut store = store();
    store.set("age", Value::from(0)).unwrap();
    let before = store.snapshot();

    assert!(!store.set("age", Value::Number(-0.0)).unwrap());
    assert!(store.changes_since(&before).is_empty());
}

#[test]
fn merge_is_all_or_nothing() {
    let mut store = store();
    let err = store
        .merge([("age", Value::from(30)), ("agreed", Value::from("maybe"))])
        .unwrap_err();
    assert!(err.is_type_mismatch());
    assert_eq!(store.lookup("age"), Some(&Value::Null));

    store
        .merge([("age", Value::from(30)), ("agreed", Value::from("true"))])
        .unwrap();
    assert_eq!(store.lookup("agreed"), Some(&Value::Bool(true)));
}

#[test]
fn seed_keeps_going_past_bad_entries() {
    let mut store = store();
    let data = BTreeMap::from([
        ("age".to_string(), Value::from("old")),
        ("name".to_string(), Value::from("Ada")),
        ("shoe_size".to_string(), Value::from(42)),
    ]);
    let errors = store.seed(&data);
    assert_eq!(errors.len(), 2);
    assert_eq!(store.lookup("name"), Some(&Value::from("Ada")));
    assert_eq!(store.lookup("age"), Some(&Value::Null));
}

#[test]
fn snapshots_are_isolated() {
    let mut store = store();
    let before = store.snapshot();
    store.set("name", Value::from("Ada")).unwrap();
    store.set("age", Value::from(36)).unwrap();

    assert_eq!(before.lookup("name"), Some(&Value::from("")));
    let changes = store.changes_since(&before);
    let keys: Vec<&str> = changes.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["age", "name"]);

    let restored = before.to_store();
    assert!(restored.changes_since(&before).is_empty());
}

#[test]
fn reset_restores_declared_default() {
    let mut store = store();
    store.set("agreed", Value::Bool(true)).unwrap();
    assert!(store.reset("agreed").unwrap());
    assert_eq!(store.lookup("agreed"), Some(&Value::Bool(false)));
    assert!(store.reset("nope").is_err());
}

#[test]
fn duplicate_keys_are_rejected() {
    let err = VariableStore::new([
        VariableDefinition::user_defined("x", VarType::Number),
        VariableDefinition::user_defined("x", VarType::String),
    ])
    .unwrap_err();
    assert!(matches!(
        err.kind,
        formlogic_foundation::ErrorKind::DuplicateVariable(_)
    ));
}
