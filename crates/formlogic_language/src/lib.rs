//! Expression language for formlogic rule triggers and computed values.
//!
//! Expressions are written as JsonLogic (`{"<": [{"var": "age"}, 18]}`).
//! This crate provides:
//! - [`compile`] - JsonLogic source to [`Expr`]
//! - [`Expr`] - The closed set of expression nodes
//! - [`Evaluator`] - Pure, total evaluation with read tracking

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod ast;
pub mod builtins;
pub mod compiler;
pub mod eval;

pub use ast::{ArithOp, CompareOp, Expr};
pub use compiler::{compile, compile_str};
pub use eval::{Evaluator, Read, VariableLookup, evaluate};
