//! A host driving a submission step by step

use std::collections::BTreeMap;

use formlogic_engine::{EngineConfig, FormEngine};
use formlogic_foundation::Value;
use formlogic_storage::{FormDefinition, Submission};

const PERMIT_FORM: &str = r#"{
    "id": "permit",
    "steps": [
        {"key": "applicant", "components": [
            {"key": "age", "type": "number", "required": true},
            {"key": "guardian_email", "type": "email", "hidden": true}
        ]},
        {"key": "event", "components": [
            {"key": "visitors", "type": "number", "required": true},
            {"key": "security_plan", "type": "file", "hidden": true}
        ]},
        {"key": "payment", "components": [
            {"key": "accept_fee", "type": "checkbox", "required": true}
        ]}
    ],
    "variables": [{"key": "fee", "type": "number", "initial_value": 50}],
    "rules": [
        {"id": "minor", "trigger": {"<": [{"var": "age"}, 18]}, "actions": [
            {"action": "show", "component": "guardian_email"},
            {"action": "set-required", "component": "guardian_email"}
        ]},
        {"id": "large-event", "trigger": {">": [{"var": "visitors"}, 1000]},
         "trigger_from_step": "event", "actions": [
            {"action": "show", "component": "security_plan"},
            {"action": "set-value", "variable": "fee", "value": 250}
        ]},
        {"id": "free-for-small", "trigger": {"<": [{"var": "visitors"}, 50]}, "actions": [
            {"action": "step-not-applicable", "step": "payment"},
            {"action": "set-value", "variable": "fee", "value": 0}
        ]}
    ]
}"#;

fn save(
    engine: &FormEngine,
    submission: &mut Submission,
    step: &str,
    data: &[(&str, Value)],
) -> formlogic_engine::ResolvedView {
    let data: BTreeMap<String, Value> = data
        .iter()
        .map(|(k, v)| ((*k).to_string(), v.clone()))
        .collect();
    submission.save_step(step, &data).unwrap();
    submission.set_current_step(step);

    let view = engine.evaluate_at(submission.variables(), step);
    submission.commit(&view.changed).unwrap();
    view
}

#[test]
fn adult_with_large_event() {
    let form = FormDefinition::from_json(PERMIT_FORM).unwrap();
    form.validate().unwrap();
    let engine = FormEngine::new(form.clone(), EngineConfig::default());
    let mut submission = Submission::new(&form).unwrap();
    assert_eq!(submission.current_step(), Some("applicant"));

    let view = save(&engine, &mut submission, "applicant", &[("age", Value::from(34))]);
    assert!(view.step("applicant").unwrap().can_advance);
    assert_eq!(view.computed["fee"], Value::Number(50.0));

    let view = save(&engine, &mut submission, "event", &[("visitors", Value::from(5000))]);
    assert!(!view.is_hidden("security_plan"));
    assert_eq!(view.computed["fee"], Value::Number(250.0));
    assert_eq!(
        submission.variables().lookup("fee"),
        Some(&Value::Number(250.0))
    );

    let view = save(&engine, &mut submission, "payment", &[("accept_fee", Value::Bool(true))]);
    assert!(view.steps.iter().all(|s| s.can_advance));
    assert!(view.changed.is_empty());
    assert!(submission.is_completed("payment"));
}

#[test]
fn minor_with_small_event_skips_payment() {
    let form = FormDefinition::from_json(PERMIT_FORM).unwrap();
    let engine = FormEngine::new(form.clone(), EngineConfig::default());
    let mut submission = Submission::new(&form).unwrap();

    let view = save(&engine, &mut submission, "applicant", &[("age", Value::from(15))]);
    let applicant = view.step("applicant").unwrap();
    assert!(!applicant.can_advance);
    assert_eq!(applicant.missing_required, vec!["guardian_email"]);

    let view = save(
        &engine,
        &mut submission,
        "applicant",
        &[("guardian_email", Value::from("parent@example.org"))],
    );
    assert!(view.step("applicant").unwrap().can_advance);

    let view = save(&engine, &mut submission, "event", &[("visitors", Value::from(20))]);
    let payment = view.step("payment").unwrap();
    assert!(!payment.applicable);
    assert!(payment.missing_required.is_empty());
    assert_eq!(view.computed["fee"], Value::Number(0.0));
    assert!(view.is_hidden("security_plan"));
}

#[test]
fn re_evaluating_committed_state_is_stable() {
    let form = FormDefinition::from_json(PERMIT_FORM).unwrap();
    let engine = FormEngine::new(form.clone(), EngineConfig::default());
    let mut submission = Submission::new(&form).unwrap();
    save(&engine, &mut submission, "event", &[("visitors", Value::from(1500))]);

    let first = engine.evaluate_at(submission.variables(), "event");
    let second = engine.evaluate_at(submission.variables(), "event");
    assert!(first.changed.is_empty());
    assert_eq!(first, second);
    assert_eq!(
        first.to_json(true).unwrap(),
        second.to_json(true).unwrap()
    );
}
