//! Persisted submission state.
//!
//! A submission owns the variable store of one end user's form run together
//! with step progress. The engine never mutates it; the host commits the
//! changed values of an evaluation through [`Submission::commit`].

use std::collections::{BTreeMap, BTreeSet};

use formlogic_foundation::{ErrorContext, Result, Value};
use tracing::debug;

use crate::form::FormDefinition;
use crate::store::VariableStore;

/// Variables and step progress of one form run.
#[derive(Clone, Debug)]
pub struct Submission {
    variables: VariableStore,
    current_step: Option<String>,
    completed_steps: BTreeSet<String>,
}

impl Submission {
    /// Starts a submission of `form` with default values, positioned on the
    /// first step.
    ///
    /// # Errors
    /// Returns an error if the form declares a variable key twice.
    pub fn new(form: &FormDefinition) -> Result<Self> {
        Ok(Self {
            variables: VariableStore::for_form(form)?,
            current_step: form.steps.first().map(|s| s.key.clone()),
            completed_steps: BTreeSet::new(),
        })
    }

    /// Returns the persisted variable store.
    #[must_use]
    pub fn variables(&self) -> &VariableStore {
        &self.variables
    }

    /// Returns the step the user is on.
    #[must_use]
    pub fn current_step(&self) -> Option<&str> {
        self.current_step.as_deref()
    }

    /// Moves the user to `step`.
    pub fn set_current_step(&mut self, step: impl Into<String>) {
        self.current_step = Some(step.into());
    }

    /// Records that `step` was saved.
    pub fn complete_step(&mut self, step: impl Into<String>) {
        self.completed_steps.insert(step.into());
    }

    /// Returns true if `step` was saved.
    #[must_use]
    pub fn is_completed(&self, step: &str) -> bool {
        self.completed_steps.contains(step)
    }

    /// Writes user input for one step. Either all values are stored or none.
    ///
    /// # Errors
    /// Returns `UnknownVariable` or `TypeMismatch`.
    pub fn save_step(&mut self, step: &str, data: &BTreeMap<String, Value>) -> Result<()> {
        self.variables
            .merge(data.iter().map(|(k, v)| (k.as_str(), v.clone())))?;
        self.complete_step(step);
        Ok(())
    }

    /// Commits the values changed by an evaluation.
    ///
    /// # Errors
    /// Returns an error if any value does not fit the store, in which case
    /// nothing is written.
    pub fn commit(&mut self, changed: &BTreeMap<String, Value>) -> Result<()> {
        if changed.is_empty() {
            return Ok(());
        }
        self.variables
            .merge(changed.iter().map(|(k, v)| (k.as_str(), v.clone())))
            .map_err(|e| e.with_context(ErrorContext::new().with_source("submission commit")))?;
        debug!(count = changed.len(), "committed evaluated variables");
        Ok(())
    }
}
