//! Error types for formlogic.
//!
//! Uses `thiserror` for ergonomic error definition with rich context.
//! These errors fail a single operation (a store write, compiling one
//! expression, loading a file). Faults found while evaluating a form are
//! reported as diagnostics by the engine instead.

use std::fmt;

use thiserror::Error;

use crate::types::VarType;

/// The main error type for formlogic operations.
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional context about where the error occurred.
    pub context: Option<ErrorContext>,
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: None,
        }
    }

    /// Adds context to this error.
    #[must_use]
    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Creates an unknown variable error.
    #[must_use]
    pub fn unknown_variable(key: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnknownVariable(key.into()))
    }

    /// Creates a type mismatch error for a write to `key`.
    #[must_use]
    pub fn type_mismatch(key: impl Into<String>, expected: VarType, actual: &'static str) -> Self {
        Self::new(ErrorKind::TypeMismatch {
            key: key.into(),
            expected,
            actual,
        })
    }

    /// Creates a duplicate variable error.
    #[must_use]
    pub fn duplicate_variable(key: impl Into<String>) -> Self {
        Self::new(ErrorKind::DuplicateVariable(key.into()))
    }

    /// Creates an invalid expression error.
    #[must_use]
    pub fn invalid_expression(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidExpression(message.into()))
    }

    /// Creates an invalid form definition error.
    #[must_use]
    pub fn invalid_definition(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidDefinition(message.into()))
    }

    /// Returns true if this is an unknown variable error.
    #[must_use]
    pub fn is_unknown_variable(&self) -> bool {
        matches!(self.kind, ErrorKind::UnknownVariable(_))
    }

    /// Returns true if this is a type mismatch error.
    #[must_use]
    pub fn is_type_mismatch(&self) -> bool {
        matches!(self.kind, ErrorKind::TypeMismatch { .. })
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::new(ErrorKind::Io(err.to_string()))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::new(ErrorKind::Serialization(err.to_string()))
    }
}

/// Categorized error kinds for pattern matching.
#[derive(Debug, Error)]
pub enum ErrorKind {
    /// Variable key is not declared by the form.
    #[error("unknown variable: {0}")]
    UnknownVariable(String),

    /// Value cannot be coerced to the variable's declared type.
    #[error("type mismatch for {key}: expected {expected}, got {actual}")]
    TypeMismatch {
        /// The variable written to.
        key: String,
        /// The declared type.
        expected: VarType,
        /// The kind of the rejected value.
        actual: &'static str,
    },

    /// Two variables were declared with the same key.
    #[error("duplicate variable: {0}")]
    DuplicateVariable(String),

    /// Expression source could not be compiled.
    #[error("invalid expression: {0}")]
    InvalidExpression(String),

    /// Form definition is structurally invalid.
    #[error("invalid form definition: {0}")]
    InvalidDefinition(String),

    /// Serialization or deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O failure while loading or writing a file.
    #[error("io error: {0}")]
    Io(String),

    /// Internal error (should not happen).
    #[error("internal error: {0}")]
    Internal(String),
}

/// Context about where an error occurred.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// Source file, rule id, or variable key.
    pub source: Option<String>,
    /// Chain of enclosing items, innermost first.
    pub stack: Vec<String>,
}

impl ErrorContext {
    /// Creates a new empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the source location.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Adds a stack frame.
    #[must_use]
    pub fn with_frame(mut self, frame: impl Into<String>) -> Self {
        self.stack.push(frame.into());
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(source) = &self.source {
            write!(f, "at {source}")?;
        }
        if !self.stack.is_empty() {
            writeln!(f)?;
            for frame in &self.stack {
                writeln!(f, "  in {frame}")?;
            }
        }
        Ok(())
    }
}
