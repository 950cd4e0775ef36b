//! Reading forms, data snapshots, and engine configuration from disk.
//!
//! Every error carries the path it came from as its context source.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use formlogic_engine::EngineConfig;
use formlogic_foundation::{Error, ErrorContext, ErrorKind, Result, Value};
use formlogic_storage::FormDefinition;
use tracing::info;

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| Error::from(e).with_context(source(path)))
}

fn source(path: &Path) -> ErrorContext {
    ErrorContext::new().with_source(path.display().to_string())
}

/// Loads and validates a form definition.
///
/// # Errors
/// Returns `Io`, `Serialization`, or `InvalidDefinition`.
pub fn load_form(path: &Path) -> Result<FormDefinition> {
    let form = FormDefinition::from_json(&read(path)?)
        .map_err(|e| e.with_context(source(path)))?;
    form.validate().map_err(|e| e.with_context(source(path)))?;
    info!(path = %path.display(), form = %form.id, rules = form.rules.len(), "form loaded");
    Ok(form)
}

/// Parses a data snapshot: a JSON object of variable key to value.
///
/// # Errors
/// Returns `Serialization` if the source is not a JSON object.
pub fn parse_data(source: &str) -> Result<BTreeMap<String, Value>> {
    match serde_json::from_str::<serde_json::Value>(source)? {
        serde_json::Value::Object(entries) => Ok(entries
            .iter()
            .map(|(key, value)| (key.clone(), Value::from(value)))
            .collect()),
        other => Err(Error::new(ErrorKind::Serialization(format!(
            "data snapshot must be a JSON object, found {other}"
        )))),
    }
}

/// Loads a data snapshot.
///
/// # Errors
/// Returns `Io` or `Serialization`.
pub fn load_data(path: &Path) -> Result<BTreeMap<String, Value>> {
    let data = parse_data(&read(path)?).map_err(|e| e.with_context(source(path)))?;
    info!(path = %path.display(), entries = data.len(), "data loaded");
    Ok(data)
}

/// Loads an engine configuration.
///
/// # Errors
/// Returns `Io` or `Serialization`, including for unknown fields.
pub fn load_config(path: &Path) -> Result<EngineConfig> {
    EngineConfig::from_json(&read(path)?).map_err(|e| e.with_context(source(path)))
}
