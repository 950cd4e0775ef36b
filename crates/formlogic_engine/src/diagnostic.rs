//! Structured evaluation diagnostics.
//!
//! Faults found while evaluating a form never abort the evaluation. They are
//! collected here and handed back next to the resolved view.

use std::fmt;

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

/// How serious a diagnostic is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// The form still behaves sensibly; an editor should look at it.
    Warning,
    /// Part of the form logic did not take effect.
    Error,
}

/// A fault isolated during evaluation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Diagnostic {
    /// The pass cap was reached while reads were still stale.
    NonConvergent {
        /// Passes run.
        passes: usize,
        /// Variables still changing, sorted.
        variables: Vec<String>,
    },
    /// An action targets a component, step, or variable that does not exist.
    BrokenRuleReference {
        /// Rule holding the action.
        rule_id: String,
        /// The missing target key.
        target: String,
    },
    /// A `set-value` result does not fit the variable's declared type.
    TypeMismatch {
        /// Rule holding the action.
        rule_id: String,
        /// Variable written to.
        variable: String,
    },
    /// A rule failed to compile and never runs.
    InvalidRule {
        /// The rule.
        rule_id: String,
        /// Compiler message.
        message: String,
    },
    /// A host-supplied value was rejected; the default was used instead.
    RejectedInput {
        /// Variable the value was meant for.
        variable: String,
        /// Why it was rejected.
        message: String,
    },
}

impl Diagnostic {
    /// Stable machine-readable code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::NonConvergent { .. } => "non_convergent",
            Self::BrokenRuleReference { .. } => "broken_rule_reference",
            Self::TypeMismatch { .. } => "type_mismatch",
            Self::InvalidRule { .. } => "invalid_rule",
            Self::RejectedInput { .. } => "rejected_input",
        }
    }

    /// Severity of this diagnostic.
    #[must_use]
    pub const fn severity(&self) -> Severity {
        match self {
            Self::NonConvergent { .. } | Self::InvalidRule { .. } => Severity::Error,
            Self::BrokenRuleReference { .. }
            | Self::TypeMismatch { .. }
            | Self::RejectedInput { .. } => Severity::Warning,
        }
    }

    /// The rule this diagnostic is about, if any.
    #[must_use]
    pub fn rule_id(&self) -> Option<&str> {
        match self {
            Self::BrokenRuleReference { rule_id, .. }
            | Self::TypeMismatch { rule_id, .. }
            | Self::InvalidRule { rule_id, .. } => Some(rule_id),
            Self::NonConvergent { .. } | Self::RejectedInput { .. } => None,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonConvergent { passes, variables } => write!(
                f,
                "rules did not converge after {passes} passes; still changing: {}",
                variables.join(", ")
            ),
            Self::BrokenRuleReference { rule_id, target } => {
                write!(f, "rule {rule_id} targets unknown key {target}")
            }
            Self::TypeMismatch { rule_id, variable } => write!(
                f,
                "rule {rule_id} computed a value that does not fit variable {variable}"
            ),
            Self::InvalidRule { rule_id, message } => {
                write!(f, "rule {rule_id} is invalid: {message}")
            }
            Self::RejectedInput { variable, message } => {
                write!(f, "input for {variable} was rejected: {message}")
            }
        }
    }
}

// Flat JSON object: code, severity, message, then the variant's fields.
impl Serialize for Diagnostic {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("code", self.code())?;
        map.serialize_entry("severity", &self.severity())?;
        map.serialize_entry("message", &self.to_string())?;
        match self {
            Self::NonConvergent { passes, variables } => {
                map.serialize_entry("passes", passes)?;
                map.serialize_entry("variables", variables)?;
            }
            Self::BrokenRuleReference { rule_id, target } => {
                map.serialize_entry("rule_id", rule_id)?;
                map.serialize_entry("target", target)?;
            }
            Self::TypeMismatch { rule_id, variable } => {
                map.serialize_entry("rule_id", rule_id)?;
                map.serialize_entry("variable", variable)?;
            }
            Self::InvalidRule { rule_id, .. } => {
                map.serialize_entry("rule_id", rule_id)?;
            }
            Self::RejectedInput { variable, .. } => {
                map.serialize_entry("variable", variable)?;
            }
        }
        map.end()
    }
}

// =============================================================================
// Collector
// =============================================================================

/// Ordered, de-duplicated diagnostic list.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Creates an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a diagnostic unless an identical one is already present.
    /// Returns true if it was added.
    pub fn push(&mut self, diagnostic: Diagnostic) -> bool {
        if self.items.contains(&diagnostic) {
            return false;
        }
        self.items.push(diagnostic);
        true
    }

    /// Number of distinct diagnostics.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if nothing was reported.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterates in first-reported order.
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    /// Returns the diagnostics in first-reported order.
    #[must_use]
    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.items
    }
}

impl Extend<Diagnostic> for Diagnostics {
    fn extend<I: IntoIterator<Item = Diagnostic>>(&mut self, iter: I) {
        for diagnostic in iter {
            self.push(diagnostic);
        }
    }
}
