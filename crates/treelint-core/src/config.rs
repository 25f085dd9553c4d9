//! Configuration types for treelint.

use crate::types::Severity;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

/// Top-level configuration for treelint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Preset to use (e.g., "recommended", "strict", "minimal").
    #[serde(default)]
    pub preset: Option<String>,

    /// Severity threshold for a failing run (default: "error").
    #[serde(default)]
    pub fail_on: Option<Severity>,

    /// Analyzer configuration.
    #[serde(default)]
    pub analyzer: AnalyzerConfig,

    /// Per-check configurations, keyed by check id.
    #[serde(default)]
    pub checks: BTreeMap<String, CheckConfig>,

    /// Suppression entries.
    #[serde(default)]
    pub suppress: Vec<SuppressConfig>,

    /// Message template overrides, keyed by message key.
    #[serde(default)]
    pub messages: HashMap<String, String>,
}

impl Config {
    /// Creates a new default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }

    /// Explicit `enabled` setting of a check, if any.
    #[must_use]
    pub fn check_enabled(&self, check_id: &str) -> Option<bool> {
        self.checks.get(check_id).and_then(|c| c.enabled)
    }

    /// Configuration of a check, or the default one.
    #[must_use]
    pub fn check_config(&self, check_id: &str) -> CheckConfig {
        self.checks.get(check_id).cloned().unwrap_or_default()
    }

    /// Gets the severity override for a check.
    #[must_use]
    pub fn check_severity(&self, check_id: &str) -> Option<Severity> {
        self.checks.get(check_id).and_then(|c| c.severity)
    }

    /// Threshold at or above which findings fail the run.
    #[must_use]
    pub fn fail_threshold(&self) -> Severity {
        self.fail_on.unwrap_or(Severity::Error)
    }
}

/// Analyzer-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Root directory to analyze (default: current directory).
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// Glob patterns to exclude from analysis.
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Glob patterns to include (if empty, every file with a known extension).
    #[serde(default)]
    pub include: Vec<String>,

    /// File extensions to analyze, without the dot.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Whether to respect .gitignore files.
    #[serde(default = "default_true")]
    pub respect_gitignore: bool,

    /// Distance between tab stops for column computation.
    #[serde(default = "default_tab_width")]
    pub tab_width: usize,

    /// Maximum number of parallel file analyses.
    #[serde(default)]
    pub parallelism: Option<usize>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            exclude: vec!["**/target/**".to_string(), "**/build/**".to_string()],
            include: Vec::new(),
            extensions: default_extensions(),
            respect_gitignore: true,
            tab_width: default_tab_width(),
            parallelism: None,
        }
    }
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_true() -> bool {
    true
}

fn default_extensions() -> Vec<String> {
    vec!["java".to_string()]
}

fn default_tab_width() -> usize {
    crate::lexer::DEFAULT_TAB_WIDTH
}

/// Per-check configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CheckConfig {
    /// Whether this check is enabled.
    #[serde(default)]
    pub enabled: Option<bool>,

    /// Severity override for this check.
    #[serde(default)]
    pub severity: Option<Severity>,

    /// Node type names restricting the active token set.
    #[serde(default)]
    pub tokens: Option<Vec<String>>,

    /// Check-specific options as key-value pairs.
    #[serde(flatten)]
    pub options: HashMap<String, toml::Value>,
}

impl CheckConfig {
    /// Creates an empty configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets an option, builder style.
    #[must_use]
    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<toml::Value>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    /// Sets the token restriction, builder style.
    #[must_use]
    pub fn with_tokens<I, S>(mut self, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tokens = Some(tokens.into_iter().map(Into::into).collect());
        self
    }

    /// Gets an option value as a specific type.
    #[must_use]
    pub fn get_option<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.options
            .get(key)
            .and_then(|v| v.clone().try_into().ok())
    }

    /// Gets a boolean option.
    ///
    /// # Errors
    ///
    /// Returns an [`OptionError`] if the option is set to a non-boolean.
    pub fn get_bool(&self, key: &str, default: bool) -> Result<bool, OptionError> {
        self.typed(key, default, "a boolean", toml::Value::as_bool)
    }

    /// Gets an integer option.
    ///
    /// # Errors
    ///
    /// Returns an [`OptionError`] if the option is set to a non-integer.
    pub fn get_int(&self, key: &str, default: i64) -> Result<i64, OptionError> {
        self.typed(key, default, "an integer", toml::Value::as_integer)
    }

    /// Gets a non-negative integer option.
    ///
    /// # Errors
    ///
    /// Returns an [`OptionError`] if the option is not a non-negative integer.
    pub fn get_usize(&self, key: &str, default: usize) -> Result<usize, OptionError> {
        match self.options.get(key) {
            None => Ok(default),
            Some(value) => value
                .as_integer()
                .and_then(|n| usize::try_from(n).ok())
                .ok_or_else(|| OptionError::new(key, "expected a non-negative integer")),
        }
    }

    /// Gets a string option.
    ///
    /// # Errors
    ///
    /// Returns an [`OptionError`] if the option is set to a non-string.
    pub fn get_str<'a>(&'a self, key: &str, default: &'a str) -> Result<&'a str, OptionError> {
        self.typed(key, default, "a string", toml::Value::as_str)
    }

    /// Gets a string array option.
    ///
    /// # Errors
    ///
    /// Returns an [`OptionError`] if the option is not an array of strings.
    pub fn get_str_array(&self, key: &str) -> Result<Option<Vec<String>>, OptionError> {
        let Some(value) = self.options.get(key) else {
            return Ok(None);
        };
        value
            .as_array()
            .and_then(|arr| {
                arr.iter()
                    .map(|v| v.as_str().map(String::from))
                    .collect::<Option<Vec<_>>>()
            })
            .map(Some)
            .ok_or_else(|| OptionError::new(key, "expected an array of strings"))
    }

    /// Gets a numeric array option; integers and floats are both accepted.
    ///
    /// # Errors
    ///
    /// Returns an [`OptionError`] if the option is not an array of numbers.
    pub fn get_number_array(&self, key: &str) -> Result<Option<Vec<f64>>, OptionError> {
        let Some(value) = self.options.get(key) else {
            return Ok(None);
        };
        value
            .as_array()
            .and_then(|arr| {
                arr.iter()
                    .map(|v| match v {
                        #[allow(clippy::cast_precision_loss)]
                        toml::Value::Integer(n) => Some(*n as f64),
                        toml::Value::Float(f) => Some(*f),
                        _ => None,
                    })
                    .collect::<Option<Vec<_>>>()
            })
            .map(Some)
            .ok_or_else(|| OptionError::new(key, "expected an array of numbers"))
    }

    fn typed<'a, T>(
        &'a self,
        key: &str,
        default: T,
        expected: &str,
        convert: impl Fn(&'a toml::Value) -> Option<T>,
    ) -> Result<T, OptionError> {
        match self.options.get(key) {
            None => Ok(default),
            Some(value) => {
                convert(value).ok_or_else(|| OptionError::new(key, format!("expected {expected}")))
            }
        }
    }
}

/// One `[[suppress]]` table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuppressConfig {
    /// Regex over check ids.
    #[serde(default)]
    pub checks: Option<String>,
    /// Regex over file paths relative to the root, with `/` separators.
    #[serde(default)]
    pub files: Option<String>,
    /// Inclusive line range.
    #[serde(default)]
    pub lines: Option<[usize; 2]>,
    /// Inclusive column range.
    #[serde(default)]
    pub columns: Option<[usize; 2]>,
}

/// Invalid value for a check option.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("option `{option}`: {message}")]
pub struct OptionError {
    /// Option name.
    pub option: String,
    /// What is wrong with it.
    pub message: String,
}

impl OptionError {
    /// Creates a new option error.
    #[must_use]
    pub fn new(option: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            option: option.into(),
            message: message.into(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error reading config file.
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Parse error in config file.
    #[error("Failed to parse config: {message}")]
    Parse {
        /// Parse error message.
        message: String,
    },
}

/// A configuration that cannot run. Reported before any file is processed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    /// No check is registered under this id.
    #[error("unknown check `{check}`")]
    UnknownCheck {
        /// Requested check id.
        check: String,
    },

    /// No preset has this name.
    #[error("unknown preset `{preset}`")]
    UnknownPreset {
        /// Requested preset.
        preset: String,
    },

    /// Token name is not a node type.
    #[error("check `{check}`: unknown token `{token}`")]
    UnknownToken {
        /// Check id.
        check: String,
        /// Offending token name.
        token: String,
    },

    /// Token is a node type the check cannot handle.
    #[error("check `{check}`: token `{token}` is not acceptable")]
    UnacceptableToken {
        /// Check id.
        check: String,
        /// Offending token name.
        token: String,
    },

    /// Some required tokens are not active.
    #[error("check `{check}`: required tokens not active: {}", tokens.join(", "))]
    MissingRequiredTokens {
        /// Check id.
        check: String,
        /// Required tokens missing from the active set.
        tokens: Vec<String>,
    },

    /// A check option has an invalid value.
    #[error("check `{check}`: {source}")]
    InvalidOption {
        /// Check id.
        check: String,
        /// What is wrong.
        source: OptionError,
    },

    /// A regular expression does not compile.
    #[error("{context}: invalid pattern `{pattern}`: {message}")]
    InvalidPattern {
        /// Where the pattern was configured.
        context: String,
        /// The pattern.
        pattern: String,
        /// Regex error.
        message: String,
    },

    /// A suppression entry is malformed.
    #[error("suppress[{index}]: {message}")]
    InvalidSuppression {
        /// Position of the entry.
        index: usize,
        /// What is wrong.
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.analyzer.respect_gitignore);
        assert_eq!(config.analyzer.tab_width, 8);
        assert_eq!(config.analyzer.extensions, vec!["java".to_string()]);
        assert!(config.checks.is_empty());
        assert_eq!(config.fail_threshold(), Severity::Error);
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
preset = "recommended"
fail_on = "warning"

[analyzer]
root = "./src"
exclude = ["**/generated/**"]
tab_width = 4

[checks.magic-number]
enabled = true
severity = "error"
tokens = ["NUM_INT"]
ignore_numbers = [-1, 0, 1, 2.5]

[checks.todo-comment]
enabled = false

[[suppress]]
checks = "magic-number"
files = ".*Test\\.java"
lines = [1, 20]

[messages]
"magic.number" = "Avoid magic number {0}."
"#;

        let config = Config::parse(toml).expect("Failed to parse");
        assert_eq!(config.preset.as_deref(), Some("recommended"));
        assert_eq!(config.fail_threshold(), Severity::Warning);
        assert_eq!(config.analyzer.root, PathBuf::from("./src"));
        assert_eq!(config.analyzer.tab_width, 4);
        assert!(config.analyzer.respect_gitignore);

        assert_eq!(config.check_enabled("magic-number"), Some(true));
        assert_eq!(config.check_enabled("todo-comment"), Some(false));
        assert_eq!(config.check_enabled("empty-block"), None);
        assert_eq!(config.check_severity("magic-number"), Some(Severity::Error));

        let magic = config.check_config("magic-number");
        assert_eq!(magic.tokens, Some(vec!["NUM_INT".to_string()]));
        assert_eq!(
            magic.get_number_array("ignore_numbers").unwrap(),
            Some(vec![-1.0, 0.0, 1.0, 2.5])
        );
        assert!(!magic.options.contains_key("tokens"));

        assert_eq!(config.suppress.len(), 1);
        assert_eq!(config.suppress[0].lines, Some([1, 20]));
        assert_eq!(config.suppress[0].columns, None);
        assert_eq!(
            config.messages.get("magic.number").map(String::as_str),
            Some("Avoid magic number {0}.")
        );
    }

    #[test]
    fn test_typed_getters_reject_wrong_types() {
        let config = CheckConfig::new()
            .with_option("max", "three")
            .with_option("format", 7)
            .with_option("flag", true);

        assert_eq!(config.get_int("missing", 3), Ok(3));
        assert!(config.get_int("max", 3).is_err());
        assert!(config.get_str("format", "TODO:").is_err());
        assert_eq!(config.get_bool("flag", false), Ok(true));

        let err = config.get_usize("max", 1).unwrap_err();
        assert_eq!(err.option, "max");
        assert_eq!(err.to_string(), "option `max`: expected a non-negative integer");
    }

    #[test]
    fn test_negative_usize_is_rejected() {
        let config = CheckConfig::new().with_option("max", -1);
        assert!(config.get_usize("max", 3).is_err());
    }

    #[test]
    fn test_str_array_getter() {
        let config = CheckConfig::new().with_option(
            "kinds",
            toml::Value::Array(vec!["a".into(), "b".into()]),
        );
        assert_eq!(
            config.get_str_array("kinds").unwrap(),
            Some(vec!["a".to_string(), "b".to_string()])
        );
        assert_eq!(config.get_str_array("other").unwrap(), None);
    }

    #[test]
    fn test_configuration_error_messages() {
        let err = ConfigurationError::MissingRequiredTokens {
            check: "return-count".to_string(),
            tokens: vec!["METHOD_DEF".to_string(), "LAMBDA".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "check `return-count`: required tokens not active: METHOD_DEF, LAMBDA"
        );
    }

    #[test]
    fn test_parse_error() {
        let err = Config::parse("preset = ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
