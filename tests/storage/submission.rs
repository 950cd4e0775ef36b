//! Tests for submission progress and commits

use std::collections::BTreeMap;

use formlogic_foundation::Value;
use formlogic_storage::{Component, FormDefinition, Step, Submission};

fn form() -> FormDefinition {
    FormDefinition::new("f")
        .with_step(Step::new("one").with_component(Component::new("age", "number")))
        .with_step(Step::new("two").with_component(Component::new("email", "email")))
}

#[test]
fn save_step_marks_completion() {
    let mut submission = Submission::new(&form()).unwrap();
    let data = BTreeMap::from([("age".to_string(), Value::from(40))]);
    submission.save_step("one", &data).unwrap();
    submission.set_current_step("two");

    assert!(submission.is_completed("one"));
    assert_eq!(submission.current_step(), Some("two"));
    assert_eq!(
        submission.variables().lookup("age"),
        Some(&Value::Number(40.0))
    );
}

#[test]
fn failed_save_leaves_state_untouched() {
    let mut submission = Submission::new(&form()).unwrap();
    let data = BTreeMap::from([
        ("age".to_string(), Value::from(40)),
        ("unknown".to_string(), Value::from(1)),
    ]);
    assert!(submission.save_step("one", &data).is_err());
    assert!(!submission.is_completed("one"));
    assert_eq!(submission.variables().lookup("age"), Some(&Value::Null));
}

#[test]
fn commit_writes_changed_values() {
    let mut submission = Submission::new(&form()).unwrap();
    let changed = BTreeMap::from([("email".to_string(), Value::from("a@b.nl"))]);
    submission.commit(&changed).unwrap();
    assert_eq!(
        submission.variables().lookup("email"),
        Some(&Value::from("a@b.nl"))
    );
    submission.commit(&BTreeMap::new()).unwrap();
}
