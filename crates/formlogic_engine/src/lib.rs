//! Rule engine, convergence resolver, and result projector for formlogic.
//!
//! This crate provides:
//! - [`FormEngine`] - Compiled rules for one form and the evaluation entry points
//! - [`evaluate`] - One-shot evaluation of a form against a variable store
//! - [`ResolvedView`] - The final, serialisable outcome of an evaluation
//! - [`Diagnostic`] - Faults isolated during evaluation
//! - [`EngineConfig`] - Pass cap and behaviour switches

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod action;
pub mod config;
pub mod context;
pub mod diagnostic;
pub mod engine;
pub mod layout;
pub mod projector;
pub mod resolver;
pub mod rule;

pub use action::Action;
pub use config::{DEFAULT_MAX_PASSES, EngineConfig};
pub use context::{EvaluationContext, Overlay};
pub use diagnostic::{Diagnostic, Diagnostics, Severity};
pub use engine::{FormEngine, evaluate};
pub use layout::FormLayout;
pub use projector::{ComponentState, ResolvedView, StepState};
pub use resolver::Resolution;
pub use rule::{CompiledRule, RuleCompiler, RuleState};
