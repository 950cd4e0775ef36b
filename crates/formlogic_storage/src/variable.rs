//! Variable declarations.
//!
//! Every piece of submission data lives in a declared variable. Input
//! components declare one implicitly; forms add user-defined and
//! plugin-computed variables explicitly.

use formlogic_foundation::{Value, VarType};
use serde::{Deserialize, Serialize};

/// Where a variable's value comes from.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VariableSource {
    /// Backed by an input component on the given step.
    Component {
        /// Step holding the component.
        step: String,
    },
    /// Declared by the form author, typically written by logic rules.
    #[default]
    UserDefined,
    /// Filled by a plugin (prefill, external service) before evaluation.
    Computed {
        /// Plugin identifier.
        plugin: String,
    },
}

/// Declaration of a single variable.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VariableDefinition {
    /// Key, unique within the form.
    pub key: String,
    /// Declared type.
    #[serde(rename = "type")]
    pub data_type: VarType,
    /// Where the value comes from.
    #[serde(default)]
    pub source: VariableSource,
    /// Value before any user input. Falls back to the type's empty value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_value: Option<Value>,
}

impl VariableDefinition {
    /// Creates a user-defined variable.
    #[must_use]
    pub fn user_defined(key: impl Into<String>, data_type: VarType) -> Self {
        Self {
            key: key.into(),
            data_type,
            source: VariableSource::UserDefined,
            initial_value: None,
        }
    }

    /// Creates a component-backed variable.
    #[must_use]
    pub fn component(key: impl Into<String>, data_type: VarType, step: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            data_type,
            source: VariableSource::Component { step: step.into() },
            initial_value: None,
        }
    }

    /// Creates a plugin-computed variable.
    #[must_use]
    pub fn computed(key: impl Into<String>, data_type: VarType, plugin: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            data_type,
            source: VariableSource::Computed {
                plugin: plugin.into(),
            },
            initial_value: None,
        }
    }

    /// Sets the initial value.
    #[must_use]
    pub fn with_initial_value(mut self, value: impl Into<Value>) -> Self {
        self.initial_value = Some(value.into());
        self
    }

    /// Returns true if the variable is backed by a component.
    #[must_use]
    pub fn is_component(&self) -> bool {
        matches!(self.source, VariableSource::Component { .. })
    }

    /// The value this variable resets to.
    #[must_use]
    pub fn default_value(&self) -> Value {
        self.initial_value
            .clone()
            .and_then(|v| self.data_type.coerce(v))
            .unwrap_or_else(|| self.data_type.empty_value())
    }
}
