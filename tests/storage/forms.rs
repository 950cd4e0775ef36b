//! Tests for form definition parsing and validation

use formlogic_foundation::{ErrorKind, Value, VarType};
use formlogic_storage::{ActionDefinition, FormDefinition, VariableSource};

const FORM: &str = r#"{
    "id": "permit",
    "steps": [
        {"key": "applicant", "name": "Applicant", "components": [
            {"key": "age", "type": "number", "required": true},
            {"key": "guardian", "type": "fieldset", "components": [
                {"key": "guardian_email", "type": "email", "hidden": true}
            ]},
            {"key": "terms", "type": "checkbox", "clear_on_hide": false}
        ]},
        {"key": "payment", "components": [
            {"key": "amount", "type": "currency", "default_value": 25}
        ]}
    ],
    "variables": [
        {"key": "fee", "type": "number", "initial_value": 0},
        {"key": "postcode_lookup", "type": "object", "source": {"kind": "computed", "plugin": "bag"}}
    ],
    "rules": [
        {
            "id": "minor",
            "description": "Ask for a guardian",
            "trigger": {"<": [{"var": "age"}, 18]},
            "actions": [
                {"action": "show", "component": "guardian_email"},
                {"action": "set-required", "component": "guardian_email"}
            ]
        },
        {
            "id": "fee",
            "trigger": true,
            "trigger_from_step": "payment",
            "actions": [
                {"action": "set-value", "variable": "fee", "value": {"*": [{"var": "amount"}, 2]}},
                {"action": "step-not-applicable", "step": "payment"},
                {"action": "disable", "target": "applicant"}
            ]
        }
    ]
}"#;

#[test]
fn parses_full_definition() {
    let form = FormDefinition::from_json(FORM).unwrap();
    assert_eq!(form.id, "permit");
    assert_eq!(form.steps.len(), 2);
    assert_eq!(form.steps[0].name, "Applicant");
    assert_eq!(form.rules[1].trigger_from_step.as_deref(), Some("payment"));
    assert_eq!(
        form.rules[1].actions[1],
        ActionDefinition::StepNotApplicable {
            step: "payment".into()
        }
    );
    assert!(form.validate().is_ok());
}

#[test]
fn declares_component_and_form_variables() {
    let form = FormDefinition::from_json(FORM).unwrap();
    let defs = form.variable_definitions();
    let keys: Vec<&str> = defs.iter().map(|d| d.key.as_str()).collect();
    assert_eq!(
        keys,
        vec!["age", "guardian_email", "terms", "amount", "fee", "postcode_lookup"]
    );

    let amount = &defs[3];
    assert_eq!(amount.data_type, VarType::Number);
    assert_eq!(amount.default_value(), Value::Number(25.0));
    assert_eq!(
        amount.source,
        VariableSource::Component {
            step: "payment".into()
        }
    );
    assert!(matches!(defs[5].source, VariableSource::Computed { .. }));
}

#[test]
fn serializes_back_to_equivalent_json() {
    let form = FormDefinition::from_json(FORM).unwrap();
    let json = serde_json::to_string(&form).unwrap();
    assert_eq!(FormDefinition::from_json(&json).unwrap(), form);
}

#[test]
fn rejects_unknown_action() {
    let source = r#"{"rules": [{"id": "r", "trigger": true,
        "actions": [{"action": "explode"}]}]}"#;
    let err = FormDefinition::from_json(source).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::Serialization(_)));
}

#[test]
fn rejects_duplicate_steps() {
    let source = r#"{"steps": [{"key": "a"}, {"key": "a"}]}"#;
    let form = FormDefinition::from_json(source).unwrap();
    let err = form.validate().unwrap_err();
    assert!(err.to_string().contains("duplicate step key: a"));
}
