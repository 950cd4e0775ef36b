//! Compiled rule actions.

use formlogic_foundation::Result;
use formlogic_language::{Evaluator, Expr, compile};
use formlogic_storage::ActionDefinition;

use crate::context::{EvaluationContext, Flags};
use crate::diagnostic::Diagnostic;
use crate::layout::FormLayout;

/// An action with its target resolved against the form.
///
/// Component and step targets are indices into the [`FormLayout`]. Targets
/// that do not exist compile to [`Action::Broken`], which reports a
/// diagnostic when the rule fires and does nothing else.
#[derive(Clone, Debug, PartialEq)]
pub enum Action {
    /// Clear the hidden flag of a component.
    Show(usize),
    /// Set the hidden flag of a component.
    Hide(usize),
    /// Set the required flag of a component.
    SetRequired(usize),
    /// Clear the required flag of a component.
    ClearRequired(usize),
    /// Write the value of an expression to a variable.
    SetValue {
        /// Variable key.
        variable: String,
        /// Compiled value expression.
        value: Expr,
    },
    /// Set the disabled flag of a component.
    DisableComponent(usize),
    /// Clear the disabled flag of a component.
    EnableComponent(usize),
    /// Disable a step.
    DisableStep(usize),
    /// Enable a step.
    EnableStep(usize),
    /// Mark a step as not applicable.
    StepNotApplicable(usize),
    /// Block progression.
    DisableNext,
    /// Target does not exist.
    Broken {
        /// The missing key.
        target: String,
    },
}

impl Action {
    /// Resolves an action definition against a form.
    ///
    /// `is_variable` answers whether a variable key is declared.
    ///
    /// # Errors
    /// Returns `InvalidExpression` if a `set-value` expression does not
    /// compile.
    pub fn compile(
        def: &ActionDefinition,
        layout: &FormLayout,
        is_variable: impl Fn(&str) -> bool,
    ) -> Result<Self> {
        let component = |key: &String, make: fn(usize) -> Self| {
            layout.component(key).map_or_else(|| broken(key), make)
        };
        let step_or_component =
            |key: &String, on_step: fn(usize) -> Self, on_component: fn(usize) -> Self| {
                layout
                    .step(key)
                    .map(on_step)
                    .or_else(|| layout.component(key).map(on_component))
                    .unwrap_or_else(|| broken(key))
            };

        Ok(match def {
            ActionDefinition::Show { component: key } => component(key, Self::Show),
            ActionDefinition::Hide { component: key } => component(key, Self::Hide),
            ActionDefinition::SetRequired { component: key } => component(key, Self::SetRequired),
            ActionDefinition::ClearRequired { component: key } => {
                component(key, Self::ClearRequired)
            }
            ActionDefinition::SetValue { variable, value } => {
                let value = compile(value)?;
                if is_variable(variable) {
                    Self::SetValue {
                        variable: variable.clone(),
                        value,
                    }
                } else {
                    broken(variable)
                }
            }
            ActionDefinition::Disable { target } => {
                step_or_component(target, Self::DisableStep, Self::DisableComponent)
            }
            ActionDefinition::Enable { target } => {
                step_or_component(target, Self::EnableStep, Self::EnableComponent)
            }
            ActionDefinition::StepNotApplicable { step } => {
                layout.step(step).map_or_else(|| broken(step), Self::StepNotApplicable)
            }
            ActionDefinition::DisableNext => Self::DisableNext,
        })
    }

    /// Returns the missing target of a broken action.
    #[must_use]
    pub fn broken_target(&self) -> Option<&str> {
        match self {
            Self::Broken { target } => Some(target),
            _ => None,
        }
    }

    /// Applies the action to the working state.
    pub fn apply(&self, rule_id: &str, ctx: &mut EvaluationContext<'_>) {
        match self {
            Self::Show(i) => set(ctx, *i, |f| f.hidden = false),
            Self::Hide(i) => set(ctx, *i, |f| f.hidden = true),
            Self::SetRequired(i) => set(ctx, *i, |f| f.required = true),
            Self::ClearRequired(i) => set(ctx, *i, |f| f.required = false),
            Self::DisableComponent(i) => set(ctx, *i, |f| f.disabled = true),
            Self::EnableComponent(i) => set(ctx, *i, |f| f.disabled = false),
            Self::DisableStep(i) => {
                if let Some(step) = ctx.overlay_mut().steps.get_mut(*i) {
                    step.disabled = true;
                }
            }
            Self::EnableStep(i) => {
                if let Some(step) = ctx.overlay_mut().steps.get_mut(*i) {
                    step.disabled = false;
                }
            }
            Self::StepNotApplicable(i) => {
                if let Some(step) = ctx.overlay_mut().steps.get_mut(*i) {
                    step.applicable = false;
                }
            }
            Self::DisableNext => ctx.overlay_mut().next_disabled = true,
            Self::SetValue { variable, value } => {
                let mut evaluator = Evaluator::new(&*ctx);
                let result = evaluator.eval(value);
                let reads = evaluator.into_reads();
                ctx.record_reads(reads);
                ctx.write(rule_id, variable, result);
            }
            Self::Broken { target } => ctx.report(Diagnostic::BrokenRuleReference {
                rule_id: rule_id.to_string(),
                target: target.clone(),
            }),
        }
    }
}

fn broken(key: &str) -> Action {
    Action::Broken {
        target: key.to_string(),
    }
}

fn set(ctx: &mut EvaluationContext<'_>, index: usize, f: impl FnOnce(&mut Flags)) {
    if let Some(flags) = ctx.overlay_mut().components.get_mut(index) {
        f(flags);
    }
}
