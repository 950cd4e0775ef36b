//! Tests for Value JSON mapping and accessors

use formlogic_foundation::{SharedVec, Value};
use serde_json::json;

#[test]
fn json_round_trip_keeps_structure() {
    let source = json!({
        "name": "Ada",
        "age": 36,
        "ratio": 0.5,
        "married": false,
        "children": [{"name": "Byron"}],
        "nickname": null
    });

    let value = Value::from(&source);
    assert_eq!(value.child("name"), Some(&Value::from("Ada")));
    assert_eq!(value.child("age"), Some(&Value::Number(36.0)));
    assert_eq!(value.child("nickname"), Some(&Value::Null));
    assert_eq!(value.to_json(), source);
}

#[test]
fn integral_numbers_serialize_without_fraction() {
    let json = serde_json::to_string(&Value::Number(18.0)).unwrap();
    assert_eq!(json, "18");
    let json = serde_json::to_string(&Value::Number(1.5)).unwrap();
    assert_eq!(json, "1.5");
}

#[test]
fn dates_serialize_as_iso_strings() {
    let date = chrono::NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
    let json = serde_json::to_value(Value::from(date)).unwrap();
    assert_eq!(json, json!("2024-02-29"));
}

#[test]
fn child_indexes_arrays() {
    let list: SharedVec<Value> = ["a", "b"].into_iter().map(Value::from).collect();
    let value = Value::Array(list);
    assert_eq!(value.child("1"), Some(&Value::from("b")));
    assert_eq!(value.child("2"), None);
    assert_eq!(value.child("x"), None);
    assert_eq!(Value::from(3).child("0"), None);
}

#[test]
fn emptiness() {
    assert!(Value::Null.is_empty());
    assert!(Value::from("").is_empty());
    assert!(Value::Array(SharedVec::new()).is_empty());
    assert!(!Value::Bool(false).is_empty());
    assert!(!Value::from(0).is_empty());
    assert!(!Value::from(" ").is_empty());
}
