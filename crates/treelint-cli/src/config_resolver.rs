//! Locating the configuration for a `check` run.
//!
//! `--config` always wins. Otherwise the analyzed path and its ancestors
//! are searched for `treelint.toml`, then `.treelint.toml`, so checking a
//! single file deep inside a project still picks up the project config.
//! The search stops after the first directory holding a `.git` entry.
//! Without a project config, `config.toml` in `$TREELINT_CONFIG_DIR` (or
//! `~/.treelint`) is used, and built-in defaults after that.

use std::fmt;
use std::path::{Path, PathBuf};

/// File names that mark a project config, in order of preference.
const PROJECT_CONFIG_NAMES: [&str; 2] = ["treelint.toml", ".treelint.toml"];

/// Per-user config file inside the user config directory.
const USER_CONFIG_NAME: &str = "config.toml";

/// Where a run's configuration comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Named by `--config` or `TREELINT_CONFIG`.
    Flag(PathBuf),
    /// Nearest project config above the analyzed path.
    Project(PathBuf),
    /// Per-user fallback.
    User(PathBuf),
    /// No file; built-in defaults.
    Builtin,
}

impl ConfigSource {
    /// Config file to load, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Flag(p) | Self::Project(p) | Self::User(p) => Some(p),
            Self::Builtin => None,
        }
    }
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flag(p) => write!(f, "{} (--config)", p.display()),
            Self::Project(p) => write!(f, "{} (project)", p.display()),
            Self::User(p) => write!(f, "{} (user)", p.display()),
            Self::Builtin => f.write_str("built-in defaults"),
        }
    }
}

/// Finds the config that applies to an analyzed path.
#[derive(Debug, Clone, Default)]
pub struct ConfigLocator {
    user_dir: Option<PathBuf>,
}

impl ConfigLocator {
    /// Locator using `$TREELINT_CONFIG_DIR`, else `~/.treelint`.
    #[must_use]
    pub fn from_env() -> Self {
        let user_dir = std::env::var_os("TREELINT_CONFIG_DIR")
            .map(PathBuf::from)
            .or_else(|| home::home_dir().map(|home| home.join(".treelint")));
        Self { user_dir }
    }

    /// Locator with an explicit user config directory.
    #[must_use]
    pub fn with_user_dir(user_dir: Option<PathBuf>) -> Self {
        Self { user_dir }
    }

    /// Resolves the config for analyzing `target`.
    #[must_use]
    pub fn locate(&self, target: &Path, flag: Option<&Path>) -> ConfigSource {
        if let Some(path) = flag {
            return ConfigSource::Flag(path.to_path_buf());
        }
        if let Some(path) = nearest_project_config(target) {
            return ConfigSource::Project(path);
        }
        self.user_dir
            .as_ref()
            .map(|dir| dir.join(USER_CONFIG_NAME))
            .filter(|path| path.is_file())
            .map_or(ConfigSource::Builtin, ConfigSource::User)
    }
}

/// Walks from `target` (or its directory) towards the filesystem root and
/// returns the first project config, without leaving the enclosing
/// repository.
fn nearest_project_config(target: &Path) -> Option<PathBuf> {
    let target = std::fs::canonicalize(target).unwrap_or_else(|_| target.to_path_buf());
    let start = if target.is_file() {
        target.parent()?
    } else {
        target.as_path()
    };

    for dir in start.ancestors() {
        let found = PROJECT_CONFIG_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|candidate| candidate.is_file());
        if let Some(path) = found {
            tracing::debug!("Found project config: {}", path.display());
            return Some(path);
        }
        if dir.join(".git").exists() {
            tracing::debug!("No project config below repository root {}", dir.display());
            break;
        }
    }
    None
}
