//! Command execution.
//!
//! Commands return the text for stdout together with a success flag; the
//! binary decides how to print and which exit code to use.

use std::collections::BTreeMap;

use formlogic_engine::{Diagnostic, EngineConfig, FormEngine, Severity};
use formlogic_foundation::{Result, Value};
use formlogic_storage::FormDefinition;
use serde_json::json;
use tracing::info;

use crate::cli::{CheckArgs, Cli, Command, EvaluateArgs};
use crate::load::{load_config, load_data, load_form};

/// Result of a command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Outcome {
    /// Text to print on stdout.
    pub output: String,
    /// False if the command found problems the caller should act on.
    pub success: bool,
}

/// Runs the parsed command.
///
/// # Errors
/// Returns an error if an input file cannot be loaded.
pub fn run(cli: &Cli) -> Result<Outcome> {
    match &cli.command {
        Command::Evaluate(args) => run_evaluate(args),
        Command::Check(args) => run_check(args),
    }
}

/// Runs `formlogic evaluate`.
///
/// # Errors
/// Returns an error if an input file cannot be loaded.
pub fn run_evaluate(args: &EvaluateArgs) -> Result<Outcome> {
    let form = load_form(&args.form)?;
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => EngineConfig::default(),
    };
    if let Some(max_passes) = args.max_passes {
        config = config.with_max_passes(max_passes);
    }
    let data = match &args.data {
        Some(path) => load_data(path)?,
        None => BTreeMap::new(),
    };
    evaluate_form(form, config, &data, args.step.as_deref(), args.pretty)
}

/// Evaluates `form` against `data` and renders the resolved view. Fails
/// when the view carries error-severity diagnostics.
///
/// # Errors
/// Returns `DuplicateVariable` if the form declares a key twice.
pub fn evaluate_form(
    form: FormDefinition,
    config: EngineConfig,
    data: &BTreeMap<String, Value>,
    step: Option<&str>,
    pretty: bool,
) -> Result<Outcome> {
    let engine = FormEngine::new(form, config);
    let view = engine.evaluate_data(data, step)?;
    info!(
        form = %view.form_id,
        passes = view.passes,
        converged = view.converged,
        changed = view.changed.len(),
        "form evaluated"
    );
    Ok(Outcome {
        output: view.to_json(pretty)?,
        success: !has_errors(&view.diagnostics),
    })
}

/// Runs `formlogic check`.
///
/// # Errors
/// Returns an error if the form cannot be loaded.
pub fn run_check(args: &CheckArgs) -> Result<Outcome> {
    let form = load_form(&args.form)?;
    check_form(form, args.pretty)
}

/// Compiles `form` and reports what can be found without data. Any
/// diagnostic makes the check fail.
///
/// # Errors
/// Returns `Serialization` if the report cannot be rendered.
pub fn check_form(form: FormDefinition, pretty: bool) -> Result<Outcome> {
    let engine = FormEngine::new(form, EngineConfig::default());
    let diagnostics = engine.check();
    info!(form = %engine.form().id, found = diagnostics.len(), "form checked");

    let report = json!({
        "form_id": engine.form().id,
        "rules": engine.form().rules.len(),
        "compiled": engine.rules().len(),
        "diagnostics": diagnostics,
    });
    let output = if pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    Ok(Outcome {
        output,
        success: diagnostics.is_empty(),
    })
}

fn has_errors(diagnostics: &[Diagnostic]) -> bool {
    diagnostics.iter().any(|d| d.severity() == Severity::Error)
}
