//! Engine configuration.
//!
//! Configuration is always passed explicitly to the entry points; there is
//! no process-wide default beyond [`EngineConfig::default`].

use formlogic_foundation::Result;
use serde::{Deserialize, Serialize};

/// Default cap on evaluation passes.
pub const DEFAULT_MAX_PASSES: usize = 5;

/// Tunables for one engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Hard cap on passes per evaluation (at least 1).
    pub max_passes: usize,
    /// Reset effectively hidden inputs to their default at the end of a pass.
    pub clear_on_hide: bool,
    /// Emit a `warn!` event for every diagnostic.
    pub log_diagnostics: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_passes: DEFAULT_MAX_PASSES,
            clear_on_hide: true,
            log_diagnostics: true,
        }
    }
}

impl EngineConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the pass cap. Values below 1 are raised to 1.
    #[must_use]
    pub fn with_max_passes(mut self, max_passes: usize) -> Self {
        self.max_passes = max_passes.max(1);
        self
    }

    /// Enables or disables clear-on-hide.
    #[must_use]
    pub fn with_clear_on_hide(mut self, clear_on_hide: bool) -> Self {
        self.clear_on_hide = clear_on_hide;
        self
    }

    /// Enables or disables diagnostic logging.
    #[must_use]
    pub fn with_log_diagnostics(mut self, log_diagnostics: bool) -> Self {
        self.log_diagnostics = log_diagnostics;
        self
    }

    /// Parses a configuration from JSON. Missing fields take their defaults.
    ///
    /// # Errors
    /// Returns `Serialization` for malformed JSON or unknown fields.
    pub fn from_json(source: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(source)?;
        Ok(config.normalized())
    }

    /// The pass cap actually enforced.
    #[must_use]
    pub fn pass_cap(&self) -> usize {
        self.max_passes.max(1)
    }

    fn normalized(self) -> Self {
        let max_passes = self.max_passes;
        self.with_max_passes(max_passes)
    }
}
