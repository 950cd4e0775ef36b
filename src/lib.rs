//! formlogic - Form-logic evaluation and variable-resolution engine
//!
//! This crate re-exports all layers of the formlogic system for convenient access.
//! For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 4: formlogic_runtime    - CLI, logging, file loading
//! Layer 3: formlogic_engine     - Rule engine, convergence resolver, projector
//! Layer 2: formlogic_language   - JsonLogic compiler and evaluator
//! Layer 1: formlogic_storage    - Form definitions, variable store, submissions
//! Layer 0: formlogic_foundation - Core types (Value, VarType, Error)
//! ```

pub use formlogic_engine as engine;
pub use formlogic_foundation as foundation;
pub use formlogic_language as language;
pub use formlogic_runtime as runtime;
pub use formlogic_storage as storage;
