//! Optional `lrtable.toml` configuration.
//!
//! # Example
//!
//! ```toml
//! [parser]
//! end_marker = "$"
//! start_state = "1"
//! overrides = "tables/expr-overrides.json"
//! ```
//!
//! Command-line flags take precedence over every value here.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// File looked up in the current directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "lrtable.toml";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub parser: ParserSettings,
}

/// `[parser]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ParserSettings {
    /// End-of-input marker appended to every token sequence.
    pub end_marker: Option<String>,
    /// Row key of the start state.
    pub start_state: Option<String>,
    /// Override table applied when `--overrides` is not passed.
    pub overrides: Option<PathBuf>,
}

impl ParserSettings {
    pub fn end_marker(&self) -> &str {
        self.end_marker
            .as_deref()
            .unwrap_or(lrtable_core::END_MARKER)
    }

    pub fn start_state(&self) -> &str {
        self.start_state
            .as_deref()
            .unwrap_or(lrtable_core::DEFAULT_START_STATE)
    }
}

/// Read and parse a config TOML file from `path`.
///
/// Returns a human-readable error string on failure.
pub fn read_config(path: &Path) -> Result<Config, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("could not read '{}': {}", path.display(), e))?;

    toml::from_str(&content).map_err(|e| format!("could not parse '{}': {}", path.display(), e))
}

/// Resolve the effective configuration.
///
/// An explicit path must exist. Without one, `lrtable.toml` in the current
/// directory is used if present, otherwise defaults apply.
pub fn load(explicit: Option<&Path>) -> Result<Config, String> {
    match explicit {
        Some(path) => read_config(path),
        None => {
            let default = Path::new(DEFAULT_CONFIG_FILE);
            if default.exists() {
                read_config(default)
            } else {
                Ok(Config::default())
            }
        }
    }
}
