//! Check that every `switch` statement has a `default` label.
//!
//! # Rationale
//!
//! Without a `default` label, values the author did not anticipate fall
//! through the switch silently. Even when every case is covered, a
//! `default` that throws documents the assumption.

use treelint_core::{
    Check, CheckBox, CheckConfig, CheckContext, CheckResult, NodeRef, NodeType, OptionError,
};

/// Check name for missing-switch-default.
pub const NAME: &str = "missing-switch-default";

const MSG_MISSING: &str = "missing.switch.default";

/// Reports `switch` statements without a `default` label.
#[derive(Debug, Clone, Default)]
pub struct MissingSwitchDefault;

impl MissingSwitchDefault {
    /// Creates a new check.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

/// Builds the check; it takes no options.
///
/// # Errors
///
/// Never fails.
pub fn factory(_config: &CheckConfig) -> Result<CheckBox, OptionError> {
    Ok(Box::new(MissingSwitchDefault::new()))
}

impl Check for MissingSwitchDefault {
    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "Requires a default label in every switch statement"
    }

    fn default_tokens(&self) -> &[NodeType] {
        &[NodeType::LiteralSwitch]
    }

    fn required_tokens(&self) -> &[NodeType] {
        &[NodeType::LiteralSwitch]
    }

    fn messages(&self) -> &[(&'static str, &'static str)] {
        &[(MSG_MISSING, "switch without 'default' clause.")]
    }

    fn visit_node(&mut self, node: NodeRef<'_>, ctx: &mut CheckContext<'_>) -> CheckResult {
        let has_default = node
            .children()
            .filter(|group| group.is(NodeType::CaseGroup))
            .any(|group| group.has_child(NodeType::LiteralDefault));
        if !has_default {
            ctx.log(node, MSG_MISSING, &[]);
        }
        Ok(())
    }
}
