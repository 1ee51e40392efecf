//! Configuration types for pyreview.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::PathBuf;

/// Top-level review configuration.
///
/// All three sections are required when deserializing; keys missing inside a
/// section fall back to their defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewConfig {
    /// Style rule thresholds.
    pub style: StyleConfig,
    /// Per-function limits.
    pub performance: PerformanceConfig,
    /// Risky call tables.
    pub security: SecurityConfig,
}

/// Preferred string quote character.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuotePreference {
    /// `"..."`
    #[default]
    Double,
    /// `'...'`
    Single,
}

/// Docstring convention tag. Not evaluated by any rule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocstringStyle {
    /// Google style.
    #[default]
    Google,
    /// Numpydoc style.
    Numpy,
    /// Sphinx field lists.
    Sphinx,
    /// Plain PEP 257.
    Pep257,
}

/// Import group names, in the order imports should appear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportCategory {
    /// Standard library.
    Stdlib,
    /// Installed packages.
    ThirdParty,
    /// First-party modules.
    Local,
}

/// Style section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    /// Maximum characters per line after trimming trailing whitespace.
    pub max_line_length: usize,
    /// Block statements must start at a multiple of this column.
    pub indent_size: usize,
    /// Preferred quote character.
    #[serde(alias = "quote_type")]
    pub quote_preference: QuotePreference,
    /// Docstring convention.
    pub docstring_style: DocstringStyle,
    /// Expected import grouping.
    pub import_order: Vec<ImportCategory>,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            max_line_length: 88,
            indent_size: 4,
            quote_preference: QuotePreference::Double,
            docstring_style: DocstringStyle::Google,
            import_order: vec![
                ImportCategory::Stdlib,
                ImportCategory::ThirdParty,
                ImportCategory::Local,
            ],
        }
    }
}

/// Performance section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceConfig {
    /// Maximum cyclomatic complexity per function.
    pub max_complexity: usize,
    /// Maximum name bindings per function.
    pub max_locals: usize,
    /// Maximum return statements per function.
    pub max_returns: usize,
    /// Maximum statements per function.
    pub max_statements: usize,
    /// Whether a function's metrics include the bodies of nested functions and classes.
    pub nested_scopes: bool,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            max_complexity: 10,
            max_locals: 15,
            max_returns: 5,
            max_statements: 50,
            nested_scopes: true,
        }
    }
}

/// Security section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Calls that may build SQL from untrusted input.
    pub sql_risk_functions: BTreeSet<String>,
    /// Calls that may run shell commands or evaluate code.
    pub shell_risk_functions: BTreeSet<String>,
    /// Calls that touch the filesystem.
    pub file_risk_functions: BTreeSet<String>,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            sql_risk_functions: names(&["execute", "executemany", "raw_query"]),
            shell_risk_functions: names(&["system", "popen", "exec", "eval"]),
            file_risk_functions: names(&["open", "read", "write"]),
        }
    }
}

fn names(list: &[&str]) -> BTreeSet<String> {
    list.iter().map(|s| (*s).to_string()).collect()
}

impl ReviewConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid or a required section is missing.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }

    /// Serializes the configuration as TOML.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize {
            message: e.to_string(),
        })
    }

    /// Looks up a value by dotted key (e.g. `style.max_line_length`).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownKey`] if no such key exists.
    pub fn get(&self, key: &str) -> Result<toml::Value, ConfigError> {
        let root = self.to_value()?;
        let mut current = &root;
        for part in key.split('.') {
            current = current
                .get(part)
                .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
        }
        Ok(current.clone())
    }

    /// Replaces a value by dotted key.
    ///
    /// `value` is read as a TOML literal (`100`, `true`, `["a", "b"]`); anything
    /// that does not parse as one is taken as a plain string.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the new value has the wrong shape.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut root = self.to_value()?;
        let (path, leaf) = match key.rsplit_once('.') {
            Some((path, leaf)) => (Some(path), leaf),
            None => (None, key),
        };

        let mut table = &mut root;
        if let Some(path) = path {
            for part in path.split('.') {
                table = table
                    .get_mut(part)
                    .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
            }
        }
        let slot = table
            .as_table_mut()
            .and_then(|t| t.get_mut(leaf))
            .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
        if slot.is_table() {
            return Err(ConfigError::UnknownKey(key.to_string()));
        }
        *slot = parse_literal(value);

        *self = root.try_into().map_err(|e: toml::de::Error| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    fn to_value(&self) -> Result<toml::Value, ConfigError> {
        toml::Value::try_from(self).map_err(|e| ConfigError::Serialize {
            message: e.to_string(),
        })
    }
}

fn parse_literal(value: &str) -> toml::Value {
    #[derive(Deserialize)]
    struct Literal {
        v: toml::Value,
    }

    toml::from_str::<Literal>(&format!("v = {value}"))
        .map_or_else(|_| toml::Value::String(value.to_string()), |l| l.v)
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error reading or writing the config file.
    #[error("Failed to access config file {path}: {source}")]
    Io {
        /// Path that failed.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// The config file was rejected by the safe file accessor.
    #[error(transparent)]
    Denied(#[from] crate::access::AccessDenied),

    /// Parse error in config file.
    #[error("Failed to parse config: {message}")]
    Parse {
        /// Parse error message.
        message: String,
    },

    /// Serialization error.
    #[error("Failed to serialize config: {message}")]
    Serialize {
        /// Serialization error message.
        message: String,
    },

    /// No such dotted key.
    #[error("Unknown config key: {0}")]
    UnknownKey(String),

    /// The value does not fit the key's type.
    #[error("Invalid value for {key}: {message}")]
    InvalidValue {
        /// Dotted key.
        key: String,
        /// Deserialization error message.
        message: String,
    },
}
