//! Integration tests for Layer 2: Language
//!
//! Tests for JsonLogic compilation, fail-open evaluation, and read tracking.

mod compiler;
mod evaluation;
mod reads;
