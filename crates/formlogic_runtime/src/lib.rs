//! Command-line interface, logging, and file loading for formlogic.
//!
//! This crate provides:
//! - [`Cli`] - Argument definitions for the `formlogic` binary
//! - [`run`] - Command dispatch, returning the text to print
//! - [`logging`] - `tracing-subscriber` initialisation
//! - [`load`] - Reading forms, data snapshots, and engine configuration

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod cli;
pub mod commands;
pub mod load;
pub mod logging;

pub use cli::{CheckArgs, Cli, Command, EvaluateArgs};
pub use commands::{Outcome, check_form, evaluate_form, run, run_check, run_evaluate};
pub use logging::{LogConfig, init_logging};
