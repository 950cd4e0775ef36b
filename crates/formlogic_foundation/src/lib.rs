//! Core values, variable types, and persistent collections for formlogic.
//!
//! This crate provides:
//! - [`Value`] - The value type held by submission variables
//! - [`VarType`] - Declared variable types and the coercion rules between them
//! - [`Error`] - Rich error types with context
//! - Persistent collections ([`SharedVec`], [`SharedMap`])

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod collections;
pub mod error;
pub mod types;
pub mod value;

pub use collections::{SharedMap, SharedVec};
pub use error::{Error, ErrorContext, ErrorKind};
pub use types::VarType;
pub use value::Value;

/// Result type alias using formlogic's Error.
pub type Result<T> = std::result::Result<T, Error>;
