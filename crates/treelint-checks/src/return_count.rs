//! Check limiting the number of `return` statements per method.
//!
//! # Rationale
//!
//! Many exit points make a method harder to follow. A small number of
//! early returns is fine; beyond that the method usually wants splitting.
//!
//! # Configuration
//!
//! - `max`: Maximum returns in a non-void method or lambda (default: 2)
//! - `max_for_void`: Maximum returns in a void method, constructor or
//!   lambda (default: 1)
//! - `format`: Methods whose name matches this pattern are not checked
//!   (default: `^equals$`)
//!
//! Lambdas and methods of local or anonymous classes are counted on their
//! own, not towards the enclosing method.

use regex::Regex;
use treelint_core::{
    Check, CheckBox, CheckConfig, CheckContext, CheckError, CheckResult, NodeRef, NodeType,
    OptionError,
};

/// Check name for return-count.
pub const NAME: &str = "return-count";

const MSG_COUNT: &str = "return.count";
const MSG_COUNT_VOID: &str = "return.countVoid";

/// Default pattern of method names that are skipped.
pub const DEFAULT_FORMAT: &str = "^equals$";

/// Counting state of one method, constructor or lambda.
#[derive(Debug, Clone)]
struct Scope {
    checking: bool,
    /// Known up front for methods; decided by the first `return` of a lambda.
    is_void: Option<bool>,
    count: usize,
}

/// Limits `return` statements per method.
#[derive(Debug, Clone)]
pub struct ReturnCount {
    max: usize,
    max_for_void: usize,
    format: Regex,
    scopes: Vec<Scope>,
}

impl ReturnCount {
    /// Creates a check with explicit limits and skip pattern.
    ///
    /// # Errors
    ///
    /// Returns an error if `format` is not a valid regular expression.
    pub fn with_limits(max: usize, max_for_void: usize, format: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            max,
            max_for_void,
            format: Regex::new(format)?,
            scopes: Vec::new(),
        })
    }

    /// Builds the check from its configuration.
    ///
    /// # Errors
    ///
    /// Returns an [`OptionError`] if an option has the wrong type or `format`
    /// is not a valid pattern.
    pub fn from_config(config: &CheckConfig) -> Result<Self, OptionError> {
        let max = config.get_usize("max", 2)?;
        let max_for_void = config.get_usize("max_for_void", 1)?;
        let format = config.get_str("format", DEFAULT_FORMAT)?;
        Self::with_limits(max, max_for_void, format)
            .map_err(|e| OptionError::new("format", e.to_string()))
    }

    fn enter_definition(&mut self, node: NodeRef<'_>) {
        let name = node
            .find_child(NodeType::Ident)
            .and_then(|n| n.text())
            .unwrap_or_default();
        let is_void = node.is(NodeType::CtorDef)
            || node
                .find_child(NodeType::Type)
                .and_then(|t| t.first_child())
                .is_some_and(|t| t.is(NodeType::LiteralVoid));
        self.scopes.push(Scope {
            checking: !self.format.is_match(name),
            is_void: Some(is_void),
            count: 0,
        });
    }

    fn leave_scope(&mut self, node: NodeRef<'_>, ctx: &mut CheckContext<'_>) -> CheckResult {
        let scope = self
            .scopes
            .pop()
            .ok_or_else(|| CheckError::failed(format!("no open scope for {}", node.kind())))?;
        if !scope.checking {
            return Ok(());
        }
        let (key, max) = if scope.is_void.unwrap_or(true) {
            (MSG_COUNT_VOID, self.max_for_void)
        } else {
            (MSG_COUNT, self.max)
        };
        if scope.count > max {
            ctx.log(node, key, &[&scope.count.to_string(), &max.to_string()]);
        }
        Ok(())
    }
}

/// Builds the check from its configuration.
///
/// # Errors
///
/// Returns an [`OptionError`] for an invalid option.
pub fn factory(config: &CheckConfig) -> Result<CheckBox, OptionError> {
    Ok(Box::new(ReturnCount::from_config(config)?))
}

impl Check for ReturnCount {
    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "Limits the number of return statements per method"
    }

    fn default_tokens(&self) -> &[NodeType] {
        &[
            NodeType::CtorDef,
            NodeType::MethodDef,
            NodeType::Lambda,
            NodeType::LiteralReturn,
        ]
    }

    fn required_tokens(&self) -> &[NodeType] {
        &[NodeType::LiteralReturn]
    }

    fn messages(&self) -> &[(&'static str, &'static str)] {
        &[
            (
                MSG_COUNT,
                "Return count is {0} (max allowed for non-void methods/lambdas is {1}).",
            ),
            (
                MSG_COUNT_VOID,
                "Return count is {0} (max allowed for void methods/constructors/lambdas is {1}).",
            ),
        ]
    }

    fn begin_tree(&mut self, _root: NodeRef<'_>, _ctx: &mut CheckContext<'_>) -> CheckResult {
        self.scopes.clear();
        Ok(())
    }

    fn visit_node(&mut self, node: NodeRef<'_>, _ctx: &mut CheckContext<'_>) -> CheckResult {
        match node.kind() {
            NodeType::MethodDef | NodeType::CtorDef => self.enter_definition(node),
            NodeType::Lambda => self.scopes.push(Scope {
                checking: true,
                is_void: None,
                count: 0,
            }),
            NodeType::LiteralReturn => {
                if let Some(scope) = self.scopes.last_mut() {
                    scope.count += 1;
                    if scope.is_void.is_none() {
                        scope.is_void = Some(node.first_child().is_none());
                    }
                }
            }
            _ => return Err(CheckError::unexpected(node)),
        }
        Ok(())
    }

    fn leave_node(&mut self, node: NodeRef<'_>, ctx: &mut CheckContext<'_>) -> CheckResult {
        match node.kind() {
            NodeType::MethodDef | NodeType::CtorDef | NodeType::Lambda => self.leave_scope(node, ctx),
            _ => Ok(()),
        }
    }
}
