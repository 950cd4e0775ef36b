//! Form engine entry points.
//!
//! A [`FormEngine`] owns one form's compiled rules and configuration and
//! is immutable after construction; evaluations never share mutable state
//! and the engine may be shared across threads.

use std::collections::BTreeMap;

use formlogic_foundation::{Error, ErrorKind, Result, Value};
use formlogic_storage::{FormDefinition, VariableStore};
use tracing::{debug, debug_span, warn};

use crate::config::EngineConfig;
use crate::context::EvaluationContext;
use crate::diagnostic::{Diagnostic, Diagnostics};
use crate::layout::FormLayout;
use crate::projector::{Projection, ResolvedView};
use crate::resolver::resolve;
use crate::rule::{CompiledRule, RuleCompiler, RuleState};

// =============================================================================
// Form Engine
// =============================================================================

/// Compiled rules and configuration for one form.
#[derive(Clone, Debug)]
pub struct FormEngine {
    form: FormDefinition,
    layout: FormLayout,
    rules: Vec<CompiledRule>,
    compile_diagnostics: Vec<Diagnostic>,
    config: EngineConfig,
}

impl FormEngine {
    /// Compiles the rules of `form`. Rules that fail to compile are left out
    /// and reported as `InvalidRule` in every evaluation.
    #[must_use]
    pub fn new(form: FormDefinition, config: EngineConfig) -> Self {
        let layout = FormLayout::new(&form);
        let (rules, compile_diagnostics) =
            RuleCompiler::new(&form, &layout).compile_all(&form.rules);
        debug!(
            form = %form.id,
            rules = rules.len(),
            invalid = compile_diagnostics.len(),
            "form compiled"
        );
        Self {
            form,
            layout,
            rules,
            compile_diagnostics,
            config,
        }
    }

    /// The form definition.
    #[must_use]
    pub fn form(&self) -> &FormDefinition {
        &self.form
    }

    /// The configuration.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Successfully compiled rules, in declaration order.
    #[must_use]
    pub fn rules(&self) -> &[CompiledRule] {
        &self.rules
    }

    /// Problems visible without data: rules that failed to compile and
    /// actions whose target does not exist.
    #[must_use]
    pub fn check(&self) -> Vec<Diagnostic> {
        let mut diagnostics = Diagnostics::new();
        diagnostics.extend(self.compile_diagnostics.iter().cloned());
        for rule in &self.rules {
            for target in rule.actions.iter().filter_map(|a| a.broken_target()) {
                diagnostics.push(Diagnostic::BrokenRuleReference {
                    rule_id: rule.id.clone(),
                    target: target.to_string(),
                });
            }
        }
        diagnostics.into_vec()
    }

    /// Creates a store holding the defaults of every variable of the form.
    ///
    /// # Errors
    /// Returns `DuplicateVariable` if the form declares a key twice.
    pub fn new_store(&self) -> Result<VariableStore> {
        VariableStore::for_form(&self.form)
    }

    /// Evaluates the form against `store` with every rule applicable.
    #[must_use]
    pub fn evaluate(&self, store: &VariableStore) -> ResolvedView {
        self.run(store, None, Vec::new())
    }

    /// Evaluates the form for a submission positioned on `current_step`.
    /// Rules gated on a later step are inapplicable. An unknown step key
    /// behaves like [`FormEngine::evaluate`].
    #[must_use]
    pub fn evaluate_at(&self, store: &VariableStore, current_step: &str) -> ResolvedView {
        let index = self.layout.step(current_step);
        if index.is_none() {
            debug!(step = current_step, "unknown current step; all rules applicable");
        }
        self.run(store, index, Vec::new())
    }

    /// Evaluates the form against raw host data. Values that do not fit
    /// their variable are reported as `RejectedInput` and the default is
    /// used.
    ///
    /// # Errors
    /// Returns `DuplicateVariable` if the form declares a key twice.
    pub fn evaluate_data(
        &self,
        data: &BTreeMap<String, Value>,
        current_step: Option<&str>,
    ) -> Result<ResolvedView> {
        let mut store = self.new_store()?;
        let rejected = store.seed(data).iter().map(rejected_input).collect();
        let index = current_step.and_then(|s| self.layout.step(s));
        Ok(self.run(&store, index, rejected))
    }

    fn run(
        &self,
        store: &VariableStore,
        current_step: Option<usize>,
        input_diagnostics: Vec<Diagnostic>,
    ) -> ResolvedView {
        let span = debug_span!("evaluate", form = %self.form.id);
        let _guard = span.enter();

        let input = store.snapshot();
        let mut ctx = EvaluationContext::new(&self.layout, store);
        let clear_on_hide = self.config.clear_on_hide;

        let resolution = resolve(
            &mut ctx,
            self.rules.len(),
            self.config.pass_cap(),
            |ctx| {
                for (index, rule) in self.rules.iter().enumerate() {
                    rule.run(index, ctx, current_step);
                }
                if clear_on_hide {
                    clear_hidden(ctx);
                }
                let fired = ctx
                    .trace()
                    .states
                    .iter()
                    .filter(|s| **s == RuleState::Fired)
                    .count();
                debug!(pass = ctx.pass(), fired, "rules applied");
            },
        );

        let (final_store, overlay, pass_diagnostics) = ctx.finish();

        let mut diagnostics = Diagnostics::new();
        diagnostics.extend(input_diagnostics);
        diagnostics.extend(self.compile_diagnostics.iter().cloned());
        diagnostics.extend(pass_diagnostics.into_vec());
        diagnostics.extend(resolution.diagnostic());

        if self.config.log_diagnostics {
            for diagnostic in diagnostics.iter() {
                warn!(code = diagnostic.code(), "{diagnostic}");
            }
        }

        Projection {
            form_id: &self.form.id,
            layout: &self.layout,
            input: &input,
            store: &final_store,
            overlay: &overlay,
            current_step,
            resolution: &resolution,
            diagnostics: diagnostics.into_vec(),
        }
        .project()
    }
}

fn rejected_input(err: &Error) -> Diagnostic {
    let variable = match &err.kind {
        ErrorKind::UnknownVariable(key) | ErrorKind::TypeMismatch { key, .. } => key.clone(),
        _ => String::new(),
    };
    Diagnostic::RejectedInput {
        variable,
        message: err.kind.to_string(),
    }
}

/// Resets effectively hidden inputs that clear on hide.
fn clear_hidden(ctx: &mut EvaluationContext<'_>) {
    let layout = ctx.layout();
    let effective = ctx.overlay().effective(layout);
    let targets: Vec<&str> = layout
        .nodes()
        .iter()
        .zip(&effective)
        .filter(|(node, flags)| node.has_variable && node.clear_on_hide && flags.hidden)
        .map(|(node, _)| node.key.as_str())
        .collect();
    for key in targets {
        ctx.reset(key);
    }
}

/// Evaluates `form` against `store` once.
///
/// Compiles the rules on every call; hosts evaluating the same form
/// repeatedly should keep a [`FormEngine`].
#[must_use]
pub fn evaluate(form: &FormDefinition, store: &VariableStore, config: &EngineConfig) -> ResolvedView {
    FormEngine::new(form.clone(), config.clone()).evaluate(store)
}
