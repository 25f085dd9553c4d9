//! Message templates keyed by message key.
//!
//! Checks report a key plus positional arguments; text is produced only
//! when a violation is rendered. Templates use `{0}`, `{1}`, ... for the
//! arguments. A key with no template renders as the key followed by its
//! arguments, so a missing template never hides a violation.

use std::collections::HashMap;

/// Read-only table of message templates for one run.
#[derive(Debug, Clone, Default)]
pub struct MessageCatalog {
    templates: HashMap<String, String>,
}

impl MessageCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a template, replacing any previous one for `key`.
    pub fn register(&mut self, key: impl Into<String>, template: impl Into<String>) {
        self.templates.insert(key.into(), template.into());
    }

    /// Applies user overrides on top of the registered templates.
    #[must_use]
    pub fn with_overrides<'a, I>(mut self, overrides: I) -> Self
    where
        I: IntoIterator<Item = (&'a String, &'a String)>,
    {
        for (key, template) in overrides {
            self.register(key.clone(), template.clone());
        }
        self
    }

    /// Returns the template for `key`.
    #[must_use]
    pub fn template(&self, key: &str) -> Option<&str> {
        self.templates.get(key).map(String::as_str)
    }

    /// Number of registered templates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Returns true if no template is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Renders `key` with `args`.
    #[must_use]
    pub fn render(&self, key: &str, args: &[String]) -> String {
        match self.template(key) {
            Some(template) => substitute(template, args),
            None if args.is_empty() => key.to_string(),
            None => format!("{key}: {}", args.join(", ")),
        }
    }
}

fn substitute(template: &str, args: &[String]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let placeholder = after
            .find('}')
            .and_then(|close| after[..close].parse::<usize>().ok().map(|index| (index, close)));
        match placeholder {
            Some((index, close)) if index < args.len() => {
                out.push_str(&args[index]);
                rest = &after[close + 1..];
            }
            _ => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_render_placeholders() {
        let mut catalog = MessageCatalog::new();
        catalog.register("return.count", "Return count is {0} (max allowed is {1}).");
        assert_eq!(
            catalog.render("return.count", &args(&["4", "3"])),
            "Return count is 4 (max allowed is 3)."
        );
    }

    #[test]
    fn test_render_repeated_and_out_of_order() {
        let mut catalog = MessageCatalog::new();
        catalog.register("k", "{1}-{0}-{1}");
        assert_eq!(catalog.render("k", &args(&["a", "b"])), "b-a-b");
    }

    #[test]
    fn test_unmatched_braces_are_literal() {
        let mut catalog = MessageCatalog::new();
        catalog.register("k", "{x} {5} { {0}");
        assert_eq!(catalog.render("k", &args(&["v"])), "{x} {5} { v");
    }

    #[test]
    fn test_missing_template_falls_back_to_key() {
        let catalog = MessageCatalog::new();
        assert_eq!(catalog.render("todo.match", &[]), "todo.match");
        assert_eq!(
            catalog.render("todo.match", &args(&["TODO:"])),
            "todo.match: TODO:"
        );
    }

    #[test]
    fn test_overrides_replace_defaults() {
        let mut catalog = MessageCatalog::new();
        catalog.register("magic.number", "'{0}' is a magic number.");
        let overrides: HashMap<String, String> =
            [("magic.number".to_string(), "Avoid magic number {0}.".to_string())].into();

        let catalog = catalog.with_overrides(&overrides);
        assert_eq!(
            catalog.render("magic.number", &args(&["42"])),
            "Avoid magic number 42."
        );
        assert_eq!(catalog.len(), 1);
    }
}
