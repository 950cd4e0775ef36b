//! Pass scheduling and convergence.
//!
//! After every pass the resolver decides whether another one is needed. A
//! pass that wrote nothing has converged. A pass that wrote something needs
//! a successor only if one of its reads observed a value that is no longer
//! current: those rules decided on stale input. Rules are always re-run in
//! full and in the same order; there is no incremental scheduling.

use std::collections::BTreeSet;

use formlogic_foundation::Value;
use tracing::debug;

use crate::context::{EvaluationContext, PassTrace};
use crate::diagnostic::Diagnostic;

/// Outcome of the pass loop.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Resolution {
    /// Passes run.
    pub passes: usize,
    /// True if the last pass left no stale reads.
    pub converged: bool,
    /// Variables read stale in the last pass, sorted. Empty when converged.
    pub unstable: Vec<String>,
}

impl Resolution {
    /// The `NonConvergent` diagnostic for this outcome, if any.
    #[must_use]
    pub fn diagnostic(&self) -> Option<Diagnostic> {
        (!self.converged).then(|| Diagnostic::NonConvergent {
            passes: self.passes,
            variables: self.unstable.clone(),
        })
    }
}

/// Variables some read of `trace` saw with a value other than the current
/// one in `ctx`.
#[must_use]
pub fn stale_reads(trace: &PassTrace, ctx: &EvaluationContext<'_>) -> BTreeSet<String> {
    if trace.writes.is_empty() {
        return BTreeSet::new();
    }
    trace
        .reads
        .iter()
        .filter(|read| ctx.store().lookup(&read.key).unwrap_or(&Value::Null) != &read.value)
        .map(|read| read.key.clone())
        .collect()
}

/// Runs `pass` until the state is stable or `max_passes` passes have run.
///
/// `pass` receives the context after [`EvaluationContext::begin_pass`] and
/// must run one full pass.
pub fn resolve<F>(
    ctx: &mut EvaluationContext<'_>,
    rule_count: usize,
    max_passes: usize,
    mut pass: F,
) -> Resolution
where
    F: FnMut(&mut EvaluationContext<'_>),
{
    let cap = max_passes.max(1);
    let mut unstable = BTreeSet::new();

    for number in 1..=cap {
        ctx.begin_pass(rule_count);
        pass(ctx);

        unstable = stale_reads(ctx.trace(), ctx);
        debug!(
            pass = number,
            writes = ?ctx.trace().writes,
            stale = ?unstable,
            "pass complete"
        );
        if unstable.is_empty() {
            return Resolution {
                passes: number,
                converged: true,
                unstable: Vec::new(),
            };
        }
    }

    Resolution {
        passes: cap,
        converged: false,
        unstable: unstable.into_iter().collect(),
    }
}
