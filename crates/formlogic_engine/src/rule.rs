//! Compiled rules and the per-pass rule runner.
//!
//! Each pass visits every rule in declaration order against the current
//! working store, so later rules see the writes of earlier ones and the
//! last writer wins.

use std::collections::BTreeSet;

use formlogic_foundation::{Error, ErrorContext, Result};
use formlogic_language::{Evaluator, Expr, compile};
use formlogic_storage::{FormDefinition, RuleDefinition};
use tracing::trace;

use crate::action::Action;
use crate::context::EvaluationContext;
use crate::diagnostic::Diagnostic;
use crate::layout::FormLayout;

// =============================================================================
// Rule State
// =============================================================================

/// Where a rule is within the current pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RuleState {
    /// Not yet visited this pass.
    Pending,
    /// Trigger computed, actions not yet decided.
    Evaluated,
    /// Trigger held and the actions were applied.
    Fired,
    /// Trigger did not hold.
    Skipped,
    /// Gated on a step the submission has not reached.
    Inapplicable,
}

// =============================================================================
// Compiled Rule
// =============================================================================

/// A rule ready to run.
#[derive(Clone, Debug, PartialEq)]
pub struct CompiledRule {
    /// Rule id from the form definition.
    pub id: String,
    /// Compiled trigger.
    pub trigger: Expr,
    /// Actions in declaration order.
    pub actions: Vec<Action>,
    /// Index of the step from which the rule applies.
    pub from_step: Option<usize>,
}

impl CompiledRule {
    /// Returns true if the rule applies at `current_step`. Without a known
    /// current step every rule applies.
    #[must_use]
    pub fn applies_at(&self, current_step: Option<usize>) -> bool {
        match (self.from_step, current_step) {
            (Some(gate), Some(current)) => current >= gate,
            _ => true,
        }
    }

    /// Runs the rule once as rule number `index` of the pass: evaluates the
    /// trigger and, if it holds, applies the actions in order. Every state
    /// transition is recorded in the pass trace; the final state is returned.
    pub fn run(
        &self,
        index: usize,
        ctx: &mut EvaluationContext<'_>,
        current_step: Option<usize>,
    ) -> RuleState {
        if !self.applies_at(current_step) {
            return transition(ctx, index, &self.id, RuleState::Inapplicable);
        }

        let mut evaluator = Evaluator::new(&*ctx);
        let holds = evaluator.condition(&self.trigger);
        let reads = evaluator.into_reads();
        ctx.record_reads(reads);
        transition(ctx, index, &self.id, RuleState::Evaluated);

        if !holds {
            return transition(ctx, index, &self.id, RuleState::Skipped);
        }
        for action in &self.actions {
            action.apply(&self.id, ctx);
        }
        transition(ctx, index, &self.id, RuleState::Fired)
    }
}

fn transition(
    ctx: &mut EvaluationContext<'_>,
    index: usize,
    rule: &str,
    state: RuleState,
) -> RuleState {
    trace!(pass = ctx.pass(), rule, ?state, "rule transition");
    ctx.set_state(index, state);
    state
}

// =============================================================================
// Rule Compiler
// =============================================================================

/// Compiles the rules of one form.
pub struct RuleCompiler<'a> {
    layout: &'a FormLayout,
    variables: BTreeSet<String>,
}

impl<'a> RuleCompiler<'a> {
    /// Creates a compiler for `form`, whose components are indexed in
    /// `layout`.
    #[must_use]
    pub fn new(form: &FormDefinition, layout: &'a FormLayout) -> Self {
        Self {
            layout,
            variables: form
                .variable_definitions()
                .into_iter()
                .map(|def| def.key)
                .collect(),
        }
    }

    /// Compiles one rule.
    ///
    /// # Errors
    /// Returns `InvalidExpression` if the trigger or a `set-value` expression
    /// does not compile, or `InvalidDefinition` if the rule is gated on an
    /// unknown step. The error context names the rule.
    pub fn compile(&self, def: &RuleDefinition) -> Result<CompiledRule> {
        let context = || ErrorContext::new().with_source(format!("rule {}", def.id));

        let trigger = compile(&def.trigger)
            .map_err(|e| e.with_context(context().with_frame("trigger")))?;

        let actions = def
            .actions
            .iter()
            .enumerate()
            .map(|(i, action)| {
                Action::compile(action, self.layout, |key| self.variables.contains(key))
                    .map_err(|e| e.with_context(context().with_frame(format!("action {i}"))))
            })
            .collect::<Result<Vec<_>>>()?;

        let from_step = match &def.trigger_from_step {
            Some(step) => Some(self.layout.step(step).ok_or_else(|| {
                Error::invalid_definition(format!("unknown step {step}")).with_context(context())
            })?),
            None => None,
        };

        Ok(CompiledRule {
            id: def.id.clone(),
            trigger,
            actions,
            from_step,
        })
    }

    /// Compiles every rule, turning failures into `InvalidRule` diagnostics.
    #[must_use]
    pub fn compile_all(&self, defs: &[RuleDefinition]) -> (Vec<CompiledRule>, Vec<Diagnostic>) {
        let mut rules = Vec::with_capacity(defs.len());
        let mut diagnostics = Vec::new();
        for def in defs {
            match self.compile(def) {
                Ok(rule) => rules.push(rule),
                Err(err) => diagnostics.push(Diagnostic::InvalidRule {
                    rule_id: def.id.clone(),
                    message: err.kind.to_string(),
                }),
            }
        }
        (rules, diagnostics)
    }
}
