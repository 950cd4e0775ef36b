//! Integration tests for Layer 0: Foundation
//!
//! Tests for core types: Value, VarType coercion, and Error.

mod errors;
mod values;
