//! Argument definitions for the `formlogic` binary.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

/// Evaluate form logic from the command line.
#[derive(Debug, Parser)]
#[command(name = "formlogic", version, about)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Disable coloured log output.
    #[arg(long, global = true)]
    pub no_color: bool,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Evaluate a form against a data snapshot and print the resolved view.
    Evaluate(EvaluateArgs),
    /// Report rules that fail to compile or target unknown keys.
    Check(CheckArgs),
}

/// Arguments of `formlogic evaluate`.
#[derive(Debug, Args)]
pub struct EvaluateArgs {
    /// Form definition (JSON).
    #[arg(long, value_name = "PATH")]
    pub form: PathBuf,

    /// Variable snapshot (JSON object). Defaults apply when omitted.
    #[arg(long, value_name = "PATH")]
    pub data: Option<PathBuf>,

    /// Key of the step the submission is on.
    #[arg(long, value_name = "KEY")]
    pub step: Option<String>,

    /// Pass cap; overrides the configuration file.
    #[arg(long, value_name = "N")]
    pub max_passes: Option<usize>,

    /// Engine configuration (JSON).
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Pretty-print the resolved view.
    #[arg(long)]
    pub pretty: bool,
}

/// Arguments of `formlogic check`.
#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Form definition (JSON).
    #[arg(long, value_name = "PATH")]
    pub form: PathBuf,

    /// Pretty-print the report.
    #[arg(long)]
    pub pretty: bool,
}
