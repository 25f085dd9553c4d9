//! Check presets for common configurations.

use crate::{empty_block, inner_assignment, missing_switch_default, unnecessary_parentheses};
use treelint_core::ConfigurationError;

/// Preset configurations for treelint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Preset {
    /// Recommended checks with sensible defaults.
    #[default]
    Recommended,
    /// Every built-in check.
    Strict,
    /// Minimal checks for gradual adoption.
    Minimal,
}

/// Ids of every built-in check, in registry order.
pub(crate) const ALL: &[&str] = &[
    unnecessary_parentheses::NAME,
    crate::todo_comment::NAME,
    crate::magic_number::NAME,
    crate::return_count::NAME,
    empty_block::NAME,
    missing_switch_default::NAME,
    inner_assignment::NAME,
];

/// Checks of the recommended preset.
///
/// Includes:
/// - `empty-block` - Reports empty blocks
/// - `missing-switch-default` - Requires a default label
/// - `inner-assignment` - Reports assignments used as sub-expressions
/// - `unnecessary-parentheses` - Flags redundant parentheses
const RECOMMENDED: &[&str] = &[
    unnecessary_parentheses::NAME,
    empty_block::NAME,
    missing_switch_default::NAME,
    inner_assignment::NAME,
];

const MINIMAL: &[&str] = &[empty_block::NAME, missing_switch_default::NAME];

impl Preset {
    /// Every preset, in the order `list-checks` shows them.
    pub const ALL: [Self; 3] = [Self::Recommended, Self::Strict, Self::Minimal];

    /// Ids of the checks this preset enables.
    #[must_use]
    pub fn checks(self) -> &'static [&'static str] {
        match self {
            Self::Recommended => RECOMMENDED,
            Self::Strict => ALL,
            Self::Minimal => MINIMAL,
        }
    }

    /// Name used in configuration files.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Recommended => "recommended",
            Self::Strict => "strict",
            Self::Minimal => "minimal",
        }
    }

    /// Resolves the preset named in a configuration, defaulting to
    /// [`Preset::Recommended`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::UnknownPreset`] for an unknown name.
    pub fn from_config(name: Option<&str>) -> Result<Self, ConfigurationError> {
        name.map_or(Ok(Self::default()), str::parse)
    }
}

impl std::str::FromStr for Preset {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|preset| preset.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ConfigurationError::UnknownPreset {
                preset: s.to_string(),
            })
    }
}

impl std::fmt::Display for Preset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
