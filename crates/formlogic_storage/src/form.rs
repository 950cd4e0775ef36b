//! Declarative form definitions.
//!
//! A form is an ordered list of steps, each holding a tree of components,
//! plus user-defined variables and logic rules. Rule triggers and action
//! values are kept as JsonLogic source here; the engine compiles them.

use std::collections::BTreeSet;

use formlogic_foundation::{Error, ErrorContext, Result, Value, VarType};
use serde::{Deserialize, Serialize};

use crate::variable::VariableDefinition;

// =============================================================================
// Components
// =============================================================================

/// Component kinds that only group or decorate other components.
const LAYOUT_KINDS: &[&str] = &["fieldset", "columns", "column", "content", "panel"];

/// Repeating groups: one array variable, children live inside its items.
const REPEATING_KINDS: &[&str] = &["editgrid"];

fn default_true() -> bool {
    true
}

/// Node in a step's component tree.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Component {
    /// Key, unique within the form. Input components store their value
    /// in the variable with this key.
    pub key: String,
    /// Type tag (`textfield`, `number`, `fieldset`, ...).
    #[serde(rename = "type")]
    pub kind: String,
    /// Display label.
    #[serde(default)]
    pub label: String,
    /// Hidden unless a rule shows it.
    #[serde(default)]
    pub hidden: bool,
    /// Required unless a rule clears it.
    #[serde(default)]
    pub required: bool,
    /// Read-only unless a rule enables it.
    #[serde(default)]
    pub disabled: bool,
    /// Reset the value to its default while the component is hidden.
    #[serde(default = "default_true")]
    pub clear_on_hide: bool,
    /// Value before user input.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
    /// Nested components for containers and repeating groups.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<Component>,
}

impl Component {
    /// Creates a component with default static attributes.
    #[must_use]
    pub fn new(key: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            kind: kind.into(),
            label: String::new(),
            hidden: false,
            required: false,
            disabled: false,
            clear_on_hide: true,
            default_value: None,
            components: Vec::new(),
        }
    }

    /// Sets the hidden-by-default flag.
    #[must_use]
    pub fn hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    /// Sets the required-by-default flag.
    #[must_use]
    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Sets the disabled-by-default flag.
    #[must_use]
    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Sets the clear-on-hide flag.
    #[must_use]
    pub fn clear_on_hide(mut self, clear: bool) -> Self {
        self.clear_on_hide = clear;
        self
    }

    /// Sets the default value.
    #[must_use]
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    /// Adds a child component.
    #[must_use]
    pub fn with_child(mut self, child: Component) -> Self {
        self.components.push(child);
        self
    }

    /// Returns true for components that never hold a value.
    #[must_use]
    pub fn is_layout(&self) -> bool {
        LAYOUT_KINDS.contains(&self.kind.as_str())
    }

    /// Returns true for repeating groups.
    #[must_use]
    pub fn is_repeating(&self) -> bool {
        REPEATING_KINDS.contains(&self.kind.as_str())
    }

    /// Type of the variable this component declares, if any.
    #[must_use]
    pub fn var_type(&self) -> Option<VarType> {
        if self.is_layout() {
            return None;
        }
        let ty = match self.kind.as_str() {
            "number" | "currency" => VarType::Number,
            "checkbox" => VarType::Boolean,
            "date" => VarType::Date,
            "selectboxes" | "address" => VarType::Object,
            "editgrid" | "file" => VarType::Array,
            _ => VarType::String,
        };
        Some(ty)
    }
}

/// A component together with its position in the form.
#[derive(Clone, Copy, Debug)]
pub struct FlatComponent<'a> {
    /// Index of the step holding the component.
    pub step: usize,
    /// Index of the parent in the flattened list.
    pub parent: Option<usize>,
    /// True if an ancestor is a repeating group.
    pub in_repeating_group: bool,
    /// The component itself.
    pub component: &'a Component,
}

// =============================================================================
// Steps and rules
// =============================================================================

/// One page of a multi-step form.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Step {
    /// Key, unique within the form.
    pub key: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Top-level components of the step.
    #[serde(default)]
    pub components: Vec<Component>,
}

impl Step {
    /// Creates an empty step.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            name: String::new(),
            components: Vec::new(),
        }
    }

    /// Adds a top-level component.
    #[must_use]
    pub fn with_component(mut self, component: Component) -> Self {
        self.components.push(component);
        self
    }
}

/// An action as written in the form definition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum ActionDefinition {
    /// Make a component visible.
    Show {
        /// Target component key.
        component: String,
    },
    /// Hide a component.
    Hide {
        /// Target component key.
        component: String,
    },
    /// Make a component required.
    SetRequired {
        /// Target component key.
        component: String,
    },
    /// Make a component optional.
    ClearRequired {
        /// Target component key.
        component: String,
    },
    /// Assign the result of an expression to a variable.
    SetValue {
        /// Target variable key.
        variable: String,
        /// JsonLogic expression source.
        value: serde_json::Value,
    },
    /// Disable a component or a whole step.
    Disable {
        /// Component key or step key.
        target: String,
    },
    /// Enable a component or step that is disabled by default.
    Enable {
        /// Component key or step key.
        target: String,
    },
    /// Mark a step as not applicable.
    StepNotApplicable {
        /// Target step key.
        step: String,
    },
    /// Block progression to the next step.
    DisableNext,
}

/// A logic rule as written in the form definition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RuleDefinition {
    /// Identifier used in diagnostics.
    pub id: String,
    /// Human readable summary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// JsonLogic trigger expression source.
    pub trigger: serde_json::Value,
    /// Actions applied in order when the trigger holds.
    #[serde(default)]
    pub actions: Vec<ActionDefinition>,
    /// Only consider the rule once the submission reached this step.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger_from_step: Option<String>,
}

impl RuleDefinition {
    /// Creates a rule with the given trigger and no actions.
    #[must_use]
    pub fn new(id: impl Into<String>, trigger: serde_json::Value) -> Self {
        Self {
            id: id.into(),
            description: None,
            trigger,
            actions: Vec::new(),
            trigger_from_step: None,
        }
    }

    /// Appends an action.
    #[must_use]
    pub fn with_action(mut self, action: ActionDefinition) -> Self {
        self.actions.push(action);
        self
    }

    /// Gates the rule on a step.
    #[must_use]
    pub fn from_step(mut self, step: impl Into<String>) -> Self {
        self.trigger_from_step = Some(step.into());
        self
    }
}

// =============================================================================
// Form Definition
// =============================================================================

/// Declarative description of a submittable form.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FormDefinition {
    /// Identifier used in logs.
    #[serde(default)]
    pub id: String,
    /// Ordered steps.
    #[serde(default)]
    pub steps: Vec<Step>,
    /// User-defined and computed variables.
    #[serde(default)]
    pub variables: Vec<VariableDefinition>,
    /// Logic rules in evaluation order.
    #[serde(default)]
    pub rules: Vec<RuleDefinition>,
}

impl FormDefinition {
    /// Creates an empty form.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Parses a form definition from JSON.
    ///
    /// # Errors
    /// Returns an error if the JSON does not describe a form.
    pub fn from_json(source: &str) -> Result<Self> {
        Ok(serde_json::from_str(source)?)
    }

    /// Adds a step.
    #[must_use]
    pub fn with_step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    /// Adds a user-defined or computed variable.
    #[must_use]
    pub fn with_variable(mut self, variable: VariableDefinition) -> Self {
        self.variables.push(variable);
        self
    }

    /// Adds a rule.
    #[must_use]
    pub fn with_rule(mut self, rule: RuleDefinition) -> Self {
        self.rules.push(rule);
        self
    }

    /// Returns the position of a step.
    #[must_use]
    pub fn step_index(&self, key: &str) -> Option<usize> {
        self.steps.iter().position(|s| s.key == key)
    }

    /// Flattens all component trees in document order.
    #[must_use]
    pub fn flatten(&self) -> Vec<FlatComponent<'_>> {
        let mut out = Vec::new();
        for (step, s) in self.steps.iter().enumerate() {
            for component in &s.components {
                flatten_into(&mut out, step, None, false, component);
            }
        }
        out
    }

    /// Finds a component by key anywhere in the form.
    #[must_use]
    pub fn find_component(&self, key: &str) -> Option<&Component> {
        self.flatten()
            .into_iter()
            .find(|c| c.component.key == key)
            .map(|c| c.component)
    }

    /// All variables of the form: component-backed ones in document order,
    /// then the explicitly declared ones.
    #[must_use]
    pub fn variable_definitions(&self) -> Vec<VariableDefinition> {
        let mut defs: Vec<VariableDefinition> = self
            .flatten()
            .into_iter()
            .filter(|c| !c.in_repeating_group)
            .filter_map(|c| {
                let ty = c.component.var_type()?;
                let mut def =
                    VariableDefinition::component(&c.component.key, ty, &self.steps[c.step].key);
                def.initial_value.clone_from(&c.component.default_value);
                Some(def)
            })
            .collect();
        defs.extend(self.variables.iter().cloned());
        defs
    }

    /// Checks structural invariants: unique step, component, and variable keys,
    /// and rule step gates that name existing steps.
    ///
    /// # Errors
    /// Returns the first violation found.
    pub fn validate(&self) -> Result<()> {
        let context = || ErrorContext::new().with_source(self.id.clone());

        let mut seen = BTreeSet::new();
        for step in &self.steps {
            if !seen.insert(step.key.as_str()) {
                return Err(
                    Error::invalid_definition(format!("duplicate step key: {}", step.key))
                        .with_context(context()),
                );
            }
        }

        let mut seen = BTreeSet::new();
        for flat in self.flatten() {
            if !seen.insert(flat.component.key.as_str()) {
                return Err(Error::invalid_definition(format!(
                    "duplicate component key: {}",
                    flat.component.key
                ))
                .with_context(context().with_frame(format!("step {}", self.steps[flat.step].key))));
            }
        }

        let mut seen = BTreeSet::new();
        for def in self.variable_definitions() {
            if !seen.insert(def.key.clone()) {
                return Err(Error::duplicate_variable(def.key).with_context(context()));
            }
        }

        let unknown_gate = self.rules.iter().find_map(|rule| {
            rule.trigger_from_step
                .as_deref()
                .filter(|step| self.step_index(step).is_none())
                .map(|step| (rule, step))
        });
        if let Some((rule, step)) = unknown_gate {
            return Err(Error::invalid_definition(format!(
                "rule {} is gated on unknown step {step}",
                rule.id
            ))
            .with_context(context()));
        }

        Ok(())
    }
}

fn flatten_into<'a>(
    out: &mut Vec<FlatComponent<'a>>,
    step: usize,
    parent: Option<usize>,
    in_repeating_group: bool,
    component: &'a Component,
) {
    let index = out.len();
    out.push(FlatComponent {
        step,
        parent,
        in_repeating_group,
        component,
    });
    let nested = in_repeating_group || component.is_repeating();
    for child in &component.components {
        flatten_into(out, step, Some(index), nested, child);
    }
}
