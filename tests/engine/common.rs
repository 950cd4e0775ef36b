//! Shared fixtures

use std::collections::BTreeMap;

use formlogic_engine::{EngineConfig, FormEngine};
use formlogic_foundation::Value;
use formlogic_storage::{FormDefinition, VariableStore};

/// Compiles a form from JSON with the default configuration.
pub fn engine(source: &str) -> FormEngine {
    FormEngine::new(
        FormDefinition::from_json(source).unwrap(),
        EngineConfig::default(),
    )
}

/// A store for `engine` seeded from a JSON object.
pub fn store(engine: &FormEngine, data: &serde_json::Value) -> VariableStore {
    let mut store = engine.new_store().unwrap();
    let data: BTreeMap<String, Value> = data
        .as_object()
        .unwrap()
        .iter()
        .map(|(k, v)| (k.clone(), Value::from(v)))
        .collect();
    assert!(store.seed(&data).is_empty());
    store
}

/// Income declaration used by several tests.
pub const INCOME_FORM: &str = r#"{
    "id": "income",
    "steps": [
        {"key": "personal", "components": [
            {"key": "age", "type": "number", "required": true},
            {"key": "guardian_email", "type": "email", "hidden": true},
            {"key": "married", "type": "checkbox"}
        ]},
        {"key": "income", "components": [
            {"key": "salary", "type": "number"},
            {"key": "partner_salary", "type": "number", "hidden": true}
        ]},
        {"key": "summary", "components": [
            {"key": "confirm", "type": "checkbox", "required": true}
        ]}
    ],
    "variables": [
        {"key": "total_income", "type": "number", "initial_value": 0},
        {"key": "bracket", "type": "string"}
    ],
    "rules": [
        {"id": "minor", "trigger": {"<": [{"var": "age"}, 18]}, "actions": [
            {"action": "show", "component": "guardian_email"},
            {"action": "set-required", "component": "guardian_email"}
        ]},
        {"id": "partner", "trigger": {"==": [{"var": "married"}, true]}, "actions": [
            {"action": "show", "component": "partner_salary"}
        ]},
        {"id": "total", "trigger": true, "actions": [
            {"action": "set-value", "variable": "total_income",
             "value": {"+": [{"var": ["salary", 0]}, {"var": ["partner_salary", 0]}]}}
        ]},
        {"id": "high", "trigger": {">": [{"var": "total_income"}, 50000]}, "actions": [
            {"action": "set-value", "variable": "bracket", "value": "high"},
            {"action": "disable-next"}
        ]},
        {"id": "low", "trigger": {"<=": [{"var": "total_income"}, 50000]}, "actions": [
            {"action": "set-value", "variable": "bracket", "value": "low"}
        ]}
    ]
}"#;
