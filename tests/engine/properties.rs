//! Property tests: determinism and idempotence of evaluation

use std::collections::BTreeMap;

use formlogic_foundation::Value;
use proptest::prelude::*;

use crate::common::{INCOME_FORM, engine};

fn data() -> impl Strategy<Value = BTreeMap<String, Value>> {
    (
        prop::option::of(0i32..100),
        any::<bool>(),
        0i32..100_000,
        prop::option::of(0i32..100_000),
        "[a-z]{0,6}",
        any::<bool>(),
    )
        .prop_map(|(age, married, salary, partner, email, confirm)| {
            let mut data = BTreeMap::from([
                ("married".to_string(), Value::Bool(married)),
                ("salary".to_string(), Value::from(salary)),
                ("guardian_email".to_string(), Value::from(email)),
                ("confirm".to_string(), Value::Bool(confirm)),
            ]);
            if let Some(age) = age {
                data.insert("age".to_string(), Value::from(age));
            }
            if let Some(partner) = partner {
                data.insert("partner_salary".to_string(), Value::from(partner));
            }
            data
        })
}

proptest! {
    #[test]
    fn output_is_byte_identical(data in data()) {
        let first = engine(INCOME_FORM).evaluate_data(&data, None).unwrap();
        let second = engine(INCOME_FORM).evaluate_data(&data, None).unwrap();
        prop_assert_eq!(first.to_json(false).unwrap(), second.to_json(false).unwrap());
    }

    #[test]
    fn committing_the_result_is_a_fixed_point(data in data()) {
        let engine = engine(INCOME_FORM);
        let view = engine.evaluate_data(&data, None).unwrap();
        prop_assert!(view.converged);
        prop_assert!(view.diagnostics.is_empty());

        let mut store = engine.new_store().unwrap();
        prop_assert!(store.seed(&data).is_empty());
        store.merge(view.changed.iter().map(|(k, v)| (k.as_str(), v.clone()))).unwrap();

        let again = engine.evaluate(&store);
        prop_assert!(again.changed.is_empty());
        prop_assert_eq!(again.components, view.components);
        prop_assert_eq!(again.computed, view.computed);
        prop_assert_eq!(again.next_disabled, view.next_disabled);
    }

    #[test]
    fn passes_never_exceed_the_cap(data in data()) {
        let view = engine(INCOME_FORM).evaluate_data(&data, None).unwrap();
        prop_assert!(view.passes >= 1);
        prop_assert!(view.passes <= formlogic_engine::DEFAULT_MAX_PASSES);
    }
}
