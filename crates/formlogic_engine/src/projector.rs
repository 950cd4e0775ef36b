//! Result projection.
//!
//! Folds the static form, the final working store, and the last pass's
//! overlay into the [`ResolvedView`] handed to the host. Only the final
//! state is projected; intermediate passes are never visible.

use std::collections::BTreeMap;

use formlogic_foundation::Value;
use formlogic_storage::{VariableSnapshot, VariableStore};
use serde::Serialize;

use crate::context::{Flags, Overlay};
use crate::diagnostic::Diagnostic;
use crate::layout::FormLayout;
use crate::resolver::Resolution;

// =============================================================================
// Resolved View
// =============================================================================

/// Effective state of one component.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ComponentState {
    /// Key of the owning step.
    pub step: String,
    /// Hidden after inheritance.
    pub hidden: bool,
    /// Required.
    pub required: bool,
    /// Disabled after inheritance.
    pub disabled: bool,
}

/// Effective state of one step.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StepState {
    /// Step key.
    pub key: String,
    /// False if a rule marked the step as not applicable.
    pub applicable: bool,
    /// Disabled by a rule.
    pub disabled: bool,
    /// Visible, required inputs that hold no value, in document order.
    pub missing_required: Vec<String>,
    /// The user may move past this step: it is applicable, enabled, complete,
    /// and not blocked by `disable-next`, which only blocks the current step
    /// when one is known. A non-applicable step is skipped by the host, never
    /// advanced past.
    pub can_advance: bool,
}

/// Final outcome of evaluating a form against a variable snapshot.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ResolvedView {
    /// Id of the evaluated form.
    pub form_id: String,
    /// Per-component state, keyed by component key.
    pub components: BTreeMap<String, ComponentState>,
    /// Per-step state in step order.
    pub steps: Vec<StepState>,
    /// Variables whose final value differs from the input.
    pub changed: BTreeMap<String, Value>,
    /// Final values of variables not backed by a component.
    pub computed: BTreeMap<String, Value>,
    /// Progression is blocked by a `disable-next` action.
    pub next_disabled: bool,
    /// Passes run.
    pub passes: usize,
    /// False if the pass cap was hit with values still changing.
    pub converged: bool,
    /// Faults isolated during evaluation, in first-reported order.
    pub diagnostics: Vec<Diagnostic>,
}

impl ResolvedView {
    /// State of the component with `key`.
    #[must_use]
    pub fn component(&self, key: &str) -> Option<&ComponentState> {
        self.components.get(key)
    }

    /// Returns true if the component with `key` exists and is hidden.
    #[must_use]
    pub fn is_hidden(&self, key: &str) -> bool {
        self.component(key).is_some_and(|c| c.hidden)
    }

    /// State of the step with `key`.
    #[must_use]
    pub fn step(&self, key: &str) -> Option<&StepState> {
        self.steps.iter().find(|s| s.key == key)
    }

    /// Diagnostics with the given code.
    pub fn diagnostics_with_code<'a>(
        &'a self,
        code: &'a str,
    ) -> impl Iterator<Item = &'a Diagnostic> + 'a {
        self.diagnostics.iter().filter(move |d| d.code() == code)
    }

    /// Serializes the view as JSON.
    ///
    /// # Errors
    /// Returns `Serialization` if a value cannot be represented.
    pub fn to_json(&self, pretty: bool) -> formlogic_foundation::Result<String> {
        let json = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(json)
    }
}

// =============================================================================
// Projector
// =============================================================================

/// Inputs of a projection.
pub struct Projection<'a> {
    /// Id of the form.
    pub form_id: &'a str,
    /// Form layout.
    pub layout: &'a FormLayout,
    /// Variables as handed in by the host.
    pub input: &'a VariableSnapshot,
    /// Final working store.
    pub store: &'a VariableStore,
    /// Overlay of the last pass.
    pub overlay: &'a Overlay,
    /// Step the submission is on. Without one, `disable-next` blocks every
    /// step.
    pub current_step: Option<usize>,
    /// Outcome of the pass loop.
    pub resolution: &'a Resolution,
    /// All diagnostics, including the convergence one.
    pub diagnostics: Vec<Diagnostic>,
}

impl Projection<'_> {
    /// Builds the resolved view.
    #[must_use]
    pub fn project(self) -> ResolvedView {
        let layout = self.layout;
        let effective = self.overlay.effective(layout);

        let components = layout
            .nodes()
            .iter()
            .zip(&effective)
            .map(|(node, flags)| {
                let state = ComponentState {
                    step: layout.steps().get(node.step).cloned().unwrap_or_default(),
                    hidden: flags.hidden,
                    required: flags.required,
                    disabled: flags.disabled,
                };
                (node.key.clone(), state)
            })
            .collect();

        let steps = layout
            .steps()
            .iter()
            .enumerate()
            .map(|(index, key)| {
                let flags = self.overlay.steps.get(index).copied().unwrap_or_default();
                let missing_required = missing_required(layout, &effective, self.store, index);
                let blocked = self.overlay.next_disabled
                    && self.current_step.is_none_or(|current| current == index);
                let can_advance = flags.applicable
                    && !flags.disabled
                    && !blocked
                    && missing_required.is_empty();
                StepState {
                    key: key.clone(),
                    applicable: flags.applicable,
                    disabled: flags.disabled,
                    missing_required,
                    can_advance,
                }
            })
            .collect();

        let computed = self
            .store
            .definitions()
            .iter()
            .filter(|def| !def.is_component())
            .filter_map(|def| {
                self.store
                    .lookup(&def.key)
                    .map(|value| (def.key.clone(), value.clone()))
            })
            .collect();

        ResolvedView {
            form_id: self.form_id.to_string(),
            components,
            steps,
            changed: self.store.changes_since(self.input),
            computed,
            next_disabled: self.overlay.next_disabled,
            passes: self.resolution.passes,
            converged: self.resolution.converged,
            diagnostics: self.diagnostics,
        }
    }
}

/// Visible, required, variable-backed components of `step` without a value.
/// A checkbox only counts as filled when ticked.
fn missing_required(
    layout: &FormLayout,
    effective: &[Flags],
    store: &VariableStore,
    step: usize,
) -> Vec<String> {
    layout
        .nodes()
        .iter()
        .zip(effective)
        .filter(|(node, flags)| {
            node.step == step && node.has_variable && flags.required && !flags.hidden
        })
        .filter(|(node, _)| {
            let value = store.lookup(&node.key).unwrap_or(&Value::Null);
            if node.kind == "checkbox" {
                value != &Value::Bool(true)
            } else {
                value.is_empty()
            }
        })
        .map(|(node, _)| node.key.clone())
        .collect()
}
