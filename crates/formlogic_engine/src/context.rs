//! Per-evaluation working state.
//!
//! An [`EvaluationContext`] is owned by one evaluation and never escapes it.
//! The working store survives across passes; the overlay and the pass trace
//! are rebuilt at the start of every pass.

use std::collections::BTreeSet;

use formlogic_foundation::{Error, Value};
use formlogic_language::{Read, VariableLookup};
use formlogic_storage::VariableStore;
use tracing::trace;

use crate::diagnostic::{Diagnostic, Diagnostics};
use crate::layout::FormLayout;
use crate::rule::RuleState;

// =============================================================================
// Overlay
// =============================================================================

/// Visibility, requiredness, and disabled flags of one component.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Flags {
    /// Hidden.
    pub hidden: bool,
    /// Required.
    pub required: bool,
    /// Disabled.
    pub disabled: bool,
}

/// Applicability and disabled state of one step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StepFlags {
    /// False once a `step-not-applicable` action fired.
    pub applicable: bool,
    /// Disabled.
    pub disabled: bool,
}

impl Default for StepFlags {
    fn default() -> Self {
        Self {
            applicable: true,
            disabled: false,
        }
    }
}

/// Flags produced by the actions fired in one pass, on top of the static
/// attributes of the form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Overlay {
    /// Own flags per component, indexed like [`FormLayout::nodes`].
    pub components: Vec<Flags>,
    /// Flags per step, indexed like [`FormLayout::steps`].
    pub steps: Vec<StepFlags>,
    /// Progression past the current step is blocked.
    pub next_disabled: bool,
}

impl Overlay {
    /// Starts from the static attributes.
    #[must_use]
    pub fn new(layout: &FormLayout) -> Self {
        Self {
            components: layout
                .nodes()
                .iter()
                .map(|n| Flags {
                    hidden: n.hidden,
                    required: n.required,
                    disabled: n.disabled,
                })
                .collect(),
            steps: vec![StepFlags::default(); layout.steps().len()],
            next_disabled: false,
        }
    }

    /// Flags after inheritance: a component is hidden or disabled if an
    /// ancestor is, and hidden if its step is not applicable, disabled if its
    /// step is disabled.
    #[must_use]
    pub fn effective(&self, layout: &FormLayout) -> Vec<Flags> {
        let mut out: Vec<Flags> = Vec::with_capacity(self.components.len());
        for (node, own) in layout.nodes().iter().zip(&self.components) {
            let step = self.steps.get(node.step).copied().unwrap_or_default();
            let parent = node.parent.and_then(|p| out.get(p)).copied().unwrap_or_default();
            out.push(Flags {
                hidden: own.hidden || parent.hidden || !step.applicable,
                required: own.required,
                disabled: own.disabled || parent.disabled || step.disabled,
            });
        }
        out
    }
}

// =============================================================================
// Pass Trace
// =============================================================================

/// What happened during one pass.
#[derive(Clone, Debug, Default)]
pub struct PassTrace {
    /// Every variable read by triggers and values, with the value seen.
    pub reads: Vec<Read>,
    /// Variables whose stored value changed during the pass.
    pub writes: BTreeSet<String>,
    /// Final state of each rule, in declaration order.
    pub states: Vec<RuleState>,
}

// =============================================================================
// Evaluation Context
// =============================================================================

/// Mutable state of one evaluation.
pub struct EvaluationContext<'a> {
    layout: &'a FormLayout,
    store: VariableStore,
    overlay: Overlay,
    trace: PassTrace,
    diagnostics: Diagnostics,
    pass: usize,
}

impl<'a> EvaluationContext<'a> {
    /// Starts an evaluation on a private copy of `store`.
    #[must_use]
    pub fn new(layout: &'a FormLayout, store: &VariableStore) -> Self {
        Self {
            layout,
            store: store.clone(),
            overlay: Overlay::new(layout),
            trace: PassTrace::default(),
            diagnostics: Diagnostics::new(),
            pass: 0,
        }
    }

    /// Resets the overlay and the trace for the next pass.
    pub fn begin_pass(&mut self, rule_count: usize) {
        self.pass += 1;
        self.overlay = Overlay::new(self.layout);
        self.trace = PassTrace {
            states: vec![RuleState::Pending; rule_count],
            ..PassTrace::default()
        };
    }

    /// Number of the current pass, starting at 1.
    #[must_use]
    pub fn pass(&self) -> usize {
        self.pass
    }

    /// The form layout.
    #[must_use]
    pub fn layout(&self) -> &'a FormLayout {
        self.layout
    }

    /// The working store.
    #[must_use]
    pub fn store(&self) -> &VariableStore {
        &self.store
    }

    /// The overlay of the current pass.
    #[must_use]
    pub fn overlay(&self) -> &Overlay {
        &self.overlay
    }

    /// Mutable overlay of the current pass.
    pub fn overlay_mut(&mut self) -> &mut Overlay {
        &mut self.overlay
    }

    /// The trace of the current pass.
    #[must_use]
    pub fn trace(&self) -> &PassTrace {
        &self.trace
    }

    /// Records the state a rule reached.
    pub fn set_state(&mut self, rule: usize, state: RuleState) {
        if let Some(slot) = self.trace.states.get_mut(rule) {
            *slot = state;
        }
    }

    /// Adds reads made by an evaluator.
    pub fn record_reads(&mut self, reads: Vec<Read>) {
        self.trace.reads.extend(reads);
    }

    /// Writes a variable on behalf of a rule. Faults become diagnostics and
    /// leave the previous value in place.
    pub fn write(&mut self, rule_id: &str, key: &str, value: Value) {
        match self.store.set(key, value) {
            Ok(changed) => self.note_write(key, changed),
            Err(err) => self.report(write_fault(rule_id, key, &err)),
        }
    }

    /// Resets a variable to its default.
    pub fn reset(&mut self, key: &str) {
        if let Ok(changed) = self.store.reset(key) {
            self.note_write(key, changed);
        }
    }

    /// Adds a diagnostic.
    pub fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// The diagnostics so far.
    #[must_use]
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Ends the evaluation.
    #[must_use]
    pub fn finish(self) -> (VariableStore, Overlay, Diagnostics) {
        (self.store, self.overlay, self.diagnostics)
    }

    fn note_write(&mut self, key: &str, changed: bool) {
        if changed {
            trace!(pass = self.pass, key, "working store updated");
            self.trace.writes.insert(key.to_string());
        }
    }
}

impl VariableLookup for EvaluationContext<'_> {
    fn lookup(&self, key: &str) -> Option<&Value> {
        self.store.lookup(key)
    }
}

fn write_fault(rule_id: &str, key: &str, err: &Error) -> Diagnostic {
    if err.is_type_mismatch() {
        Diagnostic::TypeMismatch {
            rule_id: rule_id.to_string(),
            variable: key.to_string(),
        }
    } else {
        Diagnostic::BrokenRuleReference {
            rule_id: rule_id.to_string(),
            target: key.to_string(),
        }
    }
}
