//! Indexed view of a form's component trees.
//!
//! Built once per engine. Components are stored in document order, so a
//! parent always precedes its children.

use std::collections::BTreeMap;

use formlogic_storage::FormDefinition;

/// One component with its static attributes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Node {
    /// Component key.
    pub key: String,
    /// Component type tag.
    pub kind: String,
    /// Index of the owning step.
    pub step: usize,
    /// Index of the parent component.
    pub parent: Option<usize>,
    /// True if the component is backed by a variable of the same key.
    pub has_variable: bool,
    /// Static hidden flag.
    pub hidden: bool,
    /// Static required flag.
    pub required: bool,
    /// Static disabled flag.
    pub disabled: bool,
    /// Reset the value when hidden.
    pub clear_on_hide: bool,
}

/// Components and steps of a form, indexed by key.
#[derive(Clone, Debug, Default)]
pub struct FormLayout {
    nodes: Vec<Node>,
    components: BTreeMap<String, usize>,
    steps: Vec<String>,
    step_index: BTreeMap<String, usize>,
}

impl FormLayout {
    /// Indexes a form. If a key repeats, the first occurrence wins.
    #[must_use]
    pub fn new(form: &FormDefinition) -> Self {
        let mut layout = Self::default();

        for (index, step) in form.steps.iter().enumerate() {
            layout.steps.push(step.key.clone());
            layout.step_index.entry(step.key.clone()).or_insert(index);
        }

        for (index, flat) in form.flatten().into_iter().enumerate() {
            let c = flat.component;
            layout.components.entry(c.key.clone()).or_insert(index);
            layout.nodes.push(Node {
                key: c.key.clone(),
                kind: c.kind.clone(),
                step: flat.step,
                parent: flat.parent,
                has_variable: !flat.in_repeating_group && c.var_type().is_some(),
                hidden: c.hidden,
                required: c.required,
                disabled: c.disabled,
                clear_on_hide: c.clear_on_hide,
            });
        }

        layout
    }

    /// All components in document order.
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Index of the component with `key`.
    #[must_use]
    pub fn component(&self, key: &str) -> Option<usize> {
        self.components.get(key).copied()
    }

    /// Step keys in order.
    #[must_use]
    pub fn steps(&self) -> &[String] {
        &self.steps
    }

    /// Index of the step with `key`.
    #[must_use]
    pub fn step(&self, key: &str) -> Option<usize> {
        self.step_index.get(key).copied()
    }
}
