//! Configuration loading with environment variable expansion.

use crate::error::ConfigError;
use crate::schema::Config;
use std::path::Path;

/// Loads a [`Config`] from a TOML file, expanding `${VAR}` references
/// against the process environment before parsing.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load from a file path. A missing file yields the built-in defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Config::default());
        }
        let raw = std::fs::read_to_string(path)?;
        Self::load_str(&raw)
    }

    /// Parse from a TOML string.
    pub fn load_str(raw: &str) -> Result<Config, ConfigError> {
        let expanded = Self::expand_env_vars(raw)?;
        let config = toml::from_str(&expanded)?;
        Ok(config)
    }

    /// Replace every `${VAR}` occurrence with the value of `VAR`.
    ///
    /// Unset variables are an error rather than an empty substitution, so a
    /// forgotten `OPENAI_API_KEY` fails at load time instead of at the first
    /// rejected request.
    fn expand_env_vars(raw: &str) -> Result<String, ConfigError> {
        let pattern = regex::Regex::new(r"\$\{([^}]+)\}").expect("valid regex");
        let mut missing = None;
        let expanded = pattern.replace_all(raw, |caps: &regex::Captures| {
            let name = &caps[1];
            match std::env::var(name) {
                Ok(value) => value,
                Err(_) => {
                    if missing.is_none() {
                        missing = Some(name.to_string());
                    }
                    String::new()
                }
            }
        });
        if let Some(name) = missing {
            return Err(ConfigError::EnvVarNotSet(name));
        }
        Ok(expanded.into_owned())
    }
}
