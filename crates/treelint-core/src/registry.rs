//! Check factories and the validated plan built from configuration.
//!
//! Checks are instantiated per file, so the registry stores factories, not
//! instances. A [`CheckPlan`] resolves every enabled check's token set and
//! severity once, up front; any [`ConfigurationError`] surfaces there
//! before a single file is read.

use crate::ast::NodeType;
use crate::check::CheckBox;
use crate::config::{CheckConfig, Config, ConfigurationError, OptionError};
use crate::messages::MessageCatalog;
use crate::types::Severity;
use crate::walker::TreeWalker;
use tracing::debug;

/// Builds a fresh check instance from its configuration.
pub type CheckFactory = fn(&CheckConfig) -> Result<CheckBox, OptionError>;

/// Factories of all known checks, in registration order.
#[derive(Clone, Default)]
pub struct CheckRegistry {
    entries: Vec<(&'static str, CheckFactory)>,
}

impl std::fmt::Debug for CheckRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckRegistry")
            .field("ids", &self.ids().collect::<Vec<_>>())
            .finish()
    }
}

impl CheckRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a factory under `id`, replacing an earlier one.
    pub fn register(&mut self, id: &'static str, factory: CheckFactory) {
        if let Some(entry) = self.entries.iter_mut().find(|(name, _)| *name == id) {
            entry.1 = factory;
        } else {
            self.entries.push((id, factory));
        }
    }

    /// Registers a factory, builder style.
    #[must_use]
    pub fn with(mut self, id: &'static str, factory: CheckFactory) -> Self {
        self.register(id, factory);
        self
    }

    /// Returns true if `id` is registered.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    /// Registered ids in registration order.
    pub fn ids(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(id, _)| *id)
    }

    /// Number of registered checks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Instantiates the check registered under `id`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::UnknownCheck`] or
    /// [`ConfigurationError::InvalidOption`].
    pub fn create(&self, id: &str, config: &CheckConfig) -> Result<CheckBox, ConfigurationError> {
        let factory = self.factory(id)?;
        factory(config).map_err(|source| ConfigurationError::InvalidOption {
            check: id.to_string(),
            source,
        })
    }

    fn factory(&self, id: &str) -> Result<CheckFactory, ConfigurationError> {
        self.position(id)
            .map(|i| self.entries[i].1)
            .ok_or_else(|| ConfigurationError::UnknownCheck {
                check: id.to_string(),
            })
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.entries.iter().position(|(name, _)| *name == id)
    }
}

/// One validated, enabled check.
#[derive(Clone)]
pub struct PlannedCheck {
    /// Check id.
    pub id: String,
    /// Active node types.
    pub tokens: Vec<NodeType>,
    /// Effective severity.
    pub severity: Severity,
    config: CheckConfig,
    factory: CheckFactory,
}

impl std::fmt::Debug for PlannedCheck {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlannedCheck")
            .field("id", &self.id)
            .field("tokens", &self.tokens)
            .field("severity", &self.severity)
            .finish_non_exhaustive()
    }
}

/// Validated set of checks to run on every file.
#[derive(Debug, Clone, Default)]
pub struct CheckPlan {
    checks: Vec<PlannedCheck>,
    messages: Vec<(String, String)>,
}

impl CheckPlan {
    /// Validates `checks` against the registry, in the given order.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigurationError`] found.
    pub fn new<I>(registry: &CheckRegistry, checks: I) -> Result<Self, ConfigurationError>
    where
        I: IntoIterator<Item = (String, CheckConfig)>,
    {
        let mut plan = Self::default();
        for (id, config) in checks {
            let prototype = registry.create(&id, &config)?;
            let tokens = resolve_tokens(&id, &prototype, &config)?;
            let severity = config
                .severity
                .unwrap_or_else(|| prototype.default_severity());

            debug!("Planned check {} on {} token(s)", id, tokens.len());
            plan.messages.extend(
                prototype
                    .messages()
                    .iter()
                    .map(|(key, template)| ((*key).to_string(), (*template).to_string())),
            );
            plan.checks.push(PlannedCheck {
                factory: registry.factory(&id)?,
                id,
                tokens,
                severity,
                config,
            });
        }
        Ok(plan)
    }

    /// Selects checks from a configuration.
    ///
    /// A check runs if it is in `defaults` (usually a preset) or enabled in
    /// `config`, and is not disabled in `config`. Checks run in registry
    /// order.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::UnknownCheck`] for a configured id the
    /// registry does not know, or any validation error of [`CheckPlan::new`].
    pub fn from_config(
        registry: &CheckRegistry,
        config: &Config,
        defaults: &[&str],
    ) -> Result<Self, ConfigurationError> {
        for id in config.checks.keys().map(String::as_str).chain(defaults.iter().copied()) {
            if !registry.contains(id) {
                return Err(ConfigurationError::UnknownCheck {
                    check: id.to_string(),
                });
            }
        }

        let selected = registry
            .ids()
            .filter(|id| {
                config
                    .check_enabled(id)
                    .unwrap_or_else(|| defaults.contains(id))
            })
            .map(|id| (id.to_string(), config.check_config(id)));
        Self::new(registry, selected)
    }

    /// Planned checks in registration order.
    #[must_use]
    pub fn checks(&self) -> &[PlannedCheck] {
        &self.checks
    }

    /// Ids of the planned checks.
    pub fn ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.checks.iter().map(|c| c.id.as_str())
    }

    /// Number of planned checks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.checks.len()
    }

    /// Returns true if no check is planned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }

    /// Built-in templates of the planned checks.
    #[must_use]
    pub fn message_catalog(&self) -> MessageCatalog {
        let mut catalog = MessageCatalog::new();
        for (key, template) in &self.messages {
            catalog.register(key.clone(), template.clone());
        }
        catalog
    }

    /// Builds a walker with fresh instances of every planned check.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigurationError`] if a factory rejects its
    /// configuration, which validation already ruled out for registry
    /// factories.
    pub fn instantiate(&self) -> Result<TreeWalker, ConfigurationError> {
        let mut walker = TreeWalker::new();
        for planned in &self.checks {
            let check = (planned.factory)(&planned.config).map_err(|source| {
                ConfigurationError::InvalidOption {
                    check: planned.id.clone(),
                    source,
                }
            })?;
            walker.register_as(
                planned.id.clone(),
                check,
                planned.tokens.clone(),
                planned.severity,
            )?;
        }
        Ok(walker)
    }
}

/// Computes the active token set: the configured tokens if any, else the
/// defaults. Configured tokens must be acceptable, and every required token
/// must end up active.
fn resolve_tokens(
    id: &str,
    check: &CheckBox,
    config: &CheckConfig,
) -> Result<Vec<NodeType>, ConfigurationError> {
    let mut active: Vec<NodeType> = Vec::new();
    match &config.tokens {
        Some(names) => {
            for name in names {
                let kind = NodeType::from_name(name).ok_or_else(|| {
                    ConfigurationError::UnknownToken {
                        check: id.to_string(),
                        token: name.clone(),
                    }
                })?;
                if !check.acceptable_tokens().contains(&kind) {
                    return Err(ConfigurationError::UnacceptableToken {
                        check: id.to_string(),
                        token: name.clone(),
                    });
                }
                if !active.contains(&kind) {
                    active.push(kind);
                }
            }
        }
        None => {
            for kind in check.default_tokens() {
                if !active.contains(kind) {
                    active.push(*kind);
                }
            }
        }
    }

    missing_required(id, check, &active)?;
    Ok(active)
}

/// Fails if a required token of `check` is not in `active`.
pub(crate) fn missing_required(
    id: &str,
    check: &CheckBox,
    active: &[NodeType],
) -> Result<(), ConfigurationError> {
    let missing: Vec<String> = check
        .required_tokens()
        .iter()
        .filter(|kind| !active.contains(kind))
        .map(|kind| kind.name().to_string())
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ConfigurationError::MissingRequiredTokens {
            check: id.to_string(),
            tokens: missing,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::NodeRef;
    use crate::check::{Check, CheckContext, CheckResult};

    struct Scoped {
        max: usize,
    }

    impl Check for Scoped {
        fn name(&self) -> &'static str {
            "scoped"
        }

        fn default_tokens(&self) -> &[NodeType] {
            &[NodeType::MethodDef, NodeType::LiteralReturn]
        }

        fn acceptable_tokens(&self) -> &[NodeType] {
            &[NodeType::MethodDef, NodeType::CtorDef, NodeType::LiteralReturn]
        }

        fn required_tokens(&self) -> &[NodeType] {
            &[NodeType::LiteralReturn]
        }

        fn messages(&self) -> &[(&'static str, &'static str)] {
            &[("scoped.msg", "max is {0}")]
        }

        fn visit_node(&mut self, node: NodeRef<'_>, ctx: &mut CheckContext<'_>) -> CheckResult {
            ctx.log(node, "scoped.msg", &[self.max.to_string().as_str()]);
            Ok(())
        }
    }

    fn scoped_factory(config: &CheckConfig) -> Result<CheckBox, OptionError> {
        Ok(Box::new(Scoped {
            max: config.get_usize("max", 3)?,
        }))
    }

    struct Plain;

    impl Check for Plain {
        fn name(&self) -> &'static str {
            "plain"
        }

        fn default_severity(&self) -> Severity {
            Severity::Info
        }

        fn default_tokens(&self) -> &[NodeType] {
            &[NodeType::Ident]
        }
    }

    fn plain_factory(_config: &CheckConfig) -> Result<CheckBox, OptionError> {
        Ok(Box::new(Plain))
    }

    fn registry() -> CheckRegistry {
        CheckRegistry::new()
            .with("scoped", scoped_factory)
            .with("plain", plain_factory)
    }

    fn plan(id: &str, config: CheckConfig) -> Result<CheckPlan, ConfigurationError> {
        CheckPlan::new(&registry(), [(id.to_string(), config)])
    }

    #[test]
    fn test_registry_order_and_lookup() {
        let registry = registry();
        assert_eq!(registry.ids().collect::<Vec<_>>(), vec!["scoped", "plain"]);
        assert!(registry.contains("plain"));
        assert!(!registry.contains("missing"));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_default_tokens_are_active() {
        let plan = plan("scoped", CheckConfig::new()).unwrap();
        assert_eq!(
            plan.checks()[0].tokens,
            vec![NodeType::MethodDef, NodeType::LiteralReturn]
        );
        assert_eq!(plan.checks()[0].severity, Severity::Warning);
    }

    #[test]
    fn test_configured_tokens_replace_defaults() {
        let config = CheckConfig::new().with_tokens(["CTOR_DEF", "LITERAL_RETURN"]);
        let plan = plan("scoped", config).unwrap();
        assert_eq!(
            plan.checks()[0].tokens,
            vec![NodeType::CtorDef, NodeType::LiteralReturn]
        );
    }

    #[test]
    fn test_unknown_check() {
        let err = plan("nope", CheckConfig::new()).unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::UnknownCheck {
                check: "nope".to_string()
            }
        );
    }

    #[test]
    fn test_unknown_token() {
        let err = plan("scoped", CheckConfig::new().with_tokens(["NOT_A_TOKEN"])).unwrap_err();
        assert!(matches!(err, ConfigurationError::UnknownToken { ref token, .. } if token == "NOT_A_TOKEN"));
    }

    #[test]
    fn test_unacceptable_token() {
        let err = plan("scoped", CheckConfig::new().with_tokens(["LITERAL_IF"])).unwrap_err();
        assert_eq!(
            err.to_string(),
            "check `scoped`: token `LITERAL_IF` is not acceptable"
        );
    }

    #[test]
    fn test_required_tokens_must_stay_active() {
        let err = plan("scoped", CheckConfig::new().with_tokens(["METHOD_DEF"])).unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::MissingRequiredTokens {
                check: "scoped".to_string(),
                tokens: vec!["LITERAL_RETURN".to_string()],
            }
        );
    }

    #[test]
    fn test_invalid_option_names_check() {
        let err = plan("scoped", CheckConfig::new().with_option("max", "lots")).unwrap_err();
        assert!(matches!(err, ConfigurationError::InvalidOption { ref check, .. } if check == "scoped"));
    }

    #[test]
    fn test_severity_override() {
        let mut config = CheckConfig::new();
        config.severity = Some(Severity::Error);
        let plan = plan("plain", config).unwrap();
        assert_eq!(plan.checks()[0].severity, Severity::Error);

        let plan = CheckPlan::new(&registry(), [("plain".to_string(), CheckConfig::new())]).unwrap();
        assert_eq!(plan.checks()[0].severity, Severity::Info);
    }

    #[test]
    fn test_from_config_uses_registry_order() {
        let config = Config::parse(
            r#"
[checks.plain]
enabled = true
"#,
        )
        .unwrap();
        let plan = CheckPlan::from_config(&registry(), &config, &["scoped"]).unwrap();
        assert_eq!(plan.ids().collect::<Vec<_>>(), vec!["scoped", "plain"]);
    }

    #[test]
    fn test_from_config_disables_defaults() {
        let config = Config::parse("[checks.scoped]\nenabled = false\n").unwrap();
        let plan = CheckPlan::from_config(&registry(), &config, &["scoped", "plain"]).unwrap();
        assert_eq!(plan.ids().collect::<Vec<_>>(), vec!["plain"]);
    }

    #[test]
    fn test_from_config_rejects_unknown_ids() {
        let config = Config::parse("[checks.ghost]\nenabled = true\n").unwrap();
        let err = CheckPlan::from_config(&registry(), &config, &[]).unwrap_err();
        assert_eq!(err.to_string(), "unknown check `ghost`");
    }

    #[test]
    fn test_message_catalog_collects_templates() {
        let plan = plan("scoped", CheckConfig::new()).unwrap();
        let catalog = plan.message_catalog();
        assert_eq!(catalog.render("scoped.msg", &["3".to_string()]), "max is 3");
    }

    #[test]
    fn test_instantiate_builds_fresh_walker() {
        let plan = plan("scoped", CheckConfig::new().with_option("max", 5)).unwrap();
        let first = plan.instantiate().unwrap();
        let second = plan.instantiate().unwrap();
        assert_eq!(first.check_count(), 1);
        assert_eq!(second.check_count(), 1);
    }
}
