//! Form definitions, variable declarations, and submission state for formlogic.
//!
//! This crate provides:
//! - [`FormDefinition`] - Steps, component trees, declared variables, and rule sources
//! - [`VariableStore`] - Typed key/value store with copy-on-write snapshots
//! - [`Submission`] - Persisted variables and step progress of one end user

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod form;
pub mod store;
pub mod submission;
pub mod variable;

pub use form::{ActionDefinition, Component, FlatComponent, FormDefinition, RuleDefinition, Step};
pub use store::{VariableSnapshot, VariableStore};
pub use submission::Submission;
pub use variable::{VariableDefinition, VariableSource};
