//! Check for numeric literals that are not named constants.
//!
//! # Rationale
//!
//! A bare number in the middle of code hides its meaning and invites
//! inconsistent copies. Declaring it as a `static final` constant names it
//! once.
//!
//! # Configuration
//!
//! - `ignore_numbers`: Numbers that are never reported (default: `[-1, 0, 1, 2]`)
//! - `ignore_hash_code_method`: Skip literals inside `hashCode()` (default: false)
//! - `ignore_annotation`: Skip literals inside annotations (default: false)
//! - `ignore_field_declaration`: Skip initializers of non-constant fields (default: false)
//! - `allow_in_tests`: Skip test sources (default: false)
//!
//! # Detected Patterns
//!
//! Any integer or floating point literal outside a constant definition.
//! A constant definition is a `final` variable, a field of an interface, or
//! an enum constant's arguments; literals there are accepted as long as they
//! are part of the initializing expression rather than, say, the body of a
//! lambda or anonymous class inside it.

use treelint_core::{Check, CheckBox, CheckConfig, CheckContext, CheckResult, NodeRef, NodeType, OptionError};

/// Check name for magic-number.
pub const NAME: &str = "magic-number";

const MSG_MAGIC: &str = "magic.number";

/// Numbers accepted anywhere by default.
pub const DEFAULT_IGNORED: &[f64] = &[-1.0, 0.0, 1.0, 2.0];

const NUMBER_TOKENS: &[NodeType] = &[
    NodeType::NumInt,
    NodeType::NumLong,
    NodeType::NumFloat,
    NodeType::NumDouble,
];

/// Reports magic numbers.
#[derive(Debug, Clone)]
pub struct MagicNumber {
    /// Numbers that are never reported.
    pub ignore_numbers: Vec<f64>,
    /// Skip literals inside `hashCode()`.
    pub ignore_hash_code_method: bool,
    /// Skip literals inside annotations.
    pub ignore_annotation: bool,
    /// Skip initializers of non-constant fields.
    pub ignore_field_declaration: bool,
    /// Skip test sources.
    pub allow_in_tests: bool,
}

impl Default for MagicNumber {
    fn default() -> Self {
        Self::new()
    }
}

impl MagicNumber {
    /// Creates a new check with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            ignore_numbers: DEFAULT_IGNORED.to_vec(),
            ignore_hash_code_method: false,
            ignore_annotation: false,
            ignore_field_declaration: false,
            allow_in_tests: false,
        }
    }

    /// Sets the numbers that are never reported.
    #[must_use]
    pub fn ignore_numbers(mut self, numbers: Vec<f64>) -> Self {
        self.ignore_numbers = numbers;
        self
    }

    /// Sets whether literals inside `hashCode()` are skipped.
    #[must_use]
    pub fn ignore_hash_code_method(mut self, ignore: bool) -> Self {
        self.ignore_hash_code_method = ignore;
        self
    }

    /// Sets whether literals inside annotations are skipped.
    #[must_use]
    pub fn ignore_annotation(mut self, ignore: bool) -> Self {
        self.ignore_annotation = ignore;
        self
    }

    /// Sets whether non-constant field initializers are skipped.
    #[must_use]
    pub fn ignore_field_declaration(mut self, ignore: bool) -> Self {
        self.ignore_field_declaration = ignore;
        self
    }

    /// Sets whether test sources are skipped.
    #[must_use]
    pub fn allow_in_tests(mut self, allow: bool) -> Self {
        self.allow_in_tests = allow;
        self
    }

    /// Builds the check from its configuration.
    ///
    /// # Errors
    ///
    /// Returns an [`OptionError`] if an option has the wrong type.
    pub fn from_config(config: &CheckConfig) -> Result<Self, OptionError> {
        let defaults = Self::new();
        Ok(Self {
            ignore_numbers: config
                .get_number_array("ignore_numbers")?
                .unwrap_or(defaults.ignore_numbers),
            ignore_hash_code_method: config
                .get_bool("ignore_hash_code_method", defaults.ignore_hash_code_method)?,
            ignore_annotation: config.get_bool("ignore_annotation", defaults.ignore_annotation)?,
            ignore_field_declaration: config
                .get_bool("ignore_field_declaration", defaults.ignore_field_declaration)?,
            allow_in_tests: config.get_bool("allow_in_tests", defaults.allow_in_tests)?,
        })
    }

    fn is_ignored(&self, value: f64) -> bool {
        self.ignore_numbers.iter().any(|n| same_number(*n, value))
    }
}

/// Builds the check from its configuration.
///
/// # Errors
///
/// Returns an [`OptionError`] if an option has the wrong type.
pub fn factory(config: &CheckConfig) -> Result<CheckBox, OptionError> {
    Ok(Box::new(MagicNumber::from_config(config)?))
}

impl Check for MagicNumber {
    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "Requires numeric literals to be named constants"
    }

    fn default_tokens(&self) -> &[NodeType] {
        NUMBER_TOKENS
    }

    fn messages(&self) -> &[(&'static str, &'static str)] {
        &[(MSG_MAGIC, "'{0}' is a magic number.")]
    }

    fn visit_node(&mut self, node: NodeRef<'_>, ctx: &mut CheckContext<'_>) -> CheckResult {
        if self.allow_in_tests && ctx.file().is_test {
            return Ok(());
        }
        if self.ignore_annotation && node.ancestors().any(|a| a.is(NodeType::Annotation)) {
            return Ok(());
        }
        if self.ignore_hash_code_method && node.ancestors().any(is_hash_code_method) {
            return Ok(());
        }

        // A leading minus belongs to the literal.
        let (reported, text, negated) = match node.parent() {
            Some(parent) if parent.is(NodeType::UnaryMinus) => (parent, format!("-{}", literal_text(node)), true),
            _ => (node, literal_text(node).to_string(), false),
        };
        if let Some(value) = parse_number(literal_text(node)) {
            let value = if negated { -value } else { value };
            if self.is_ignored(value) {
                return Ok(());
            }
        }

        match containing_definition(node) {
            Some(definition) if is_constant_definition(definition) => {
                if within_initializer(reported, definition) {
                    return Ok(());
                }
            }
            Some(definition) if self.ignore_field_declaration && is_field(definition) => {
                return Ok(());
            }
            _ => {}
        }

        ctx.log(reported, MSG_MAGIC, &[text.as_str()]);
        Ok(())
    }
}

fn literal_text<'a>(node: NodeRef<'a>) -> &'a str {
    node.text().unwrap_or_default()
}

fn same_number(a: f64, b: f64) -> bool {
    (a - b).abs() <= f64::EPSILON * a.abs().max(b.abs()).max(1.0)
}

/// Value of a numeric literal, or `None` for forms not evaluated here
/// (hexadecimal floating point).
#[allow(clippy::cast_precision_loss)]
fn parse_number(text: &str) -> Option<f64> {
    let cleaned: String = text
        .chars()
        .filter(|c| *c != '_')
        .collect::<String>()
        .to_ascii_lowercase();

    if let Some(hex) = cleaned.strip_prefix("0x") {
        if hex.contains('p') || hex.contains('.') {
            return None;
        }
        return u64::from_str_radix(hex.trim_end_matches('l'), 16).ok().map(|v| v as f64);
    }
    if let Some(binary) = cleaned.strip_prefix("0b") {
        return u64::from_str_radix(binary.trim_end_matches('l'), 2).ok().map(|v| v as f64);
    }

    // `010d` is the double ten; only integer literals are octal.
    let floating = cleaned.ends_with(|c| matches!(c, 'f' | 'd'));
    let body = cleaned.trim_end_matches(|c| matches!(c, 'l' | 'f' | 'd'));
    if !floating && body.len() > 1 && body.starts_with('0') && body.bytes().all(|b| b.is_ascii_digit()) {
        return u64::from_str_radix(body, 8).ok().map(|v| v as f64);
    }
    body.parse::<f64>().ok()
}

/// Nearest enclosing variable or enum constant definition.
fn containing_definition(node: NodeRef<'_>) -> Option<NodeRef<'_>> {
    node.ancestors()
        .find(|a| a.is(NodeType::VariableDef) || a.is(NodeType::EnumConstantDef))
}

fn is_constant_definition(definition: NodeRef<'_>) -> bool {
    if definition.is(NodeType::EnumConstantDef) {
        return true;
    }
    let in_interface = definition
        .parent()
        .and_then(|body| body.parent())
        .is_some_and(|owner| owner.is(NodeType::InterfaceDef));
    let is_final = definition
        .find_child(NodeType::Modifiers)
        .is_some_and(|m| m.has_child(NodeType::Final));
    in_interface || is_final
}

fn is_field(definition: NodeRef<'_>) -> bool {
    definition.parent().is_some_and(|p| p.is(NodeType::Objblock))
}

/// Whether every node between `node` and `definition` is part of a plain
/// initializing expression.
fn within_initializer(node: NodeRef<'_>, definition: NodeRef<'_>) -> bool {
    node.ancestors()
        .take_while(|a| a.id() != definition.id())
        .all(|a| is_initializer_part(a.kind()))
}

fn is_initializer_part(kind: NodeType) -> bool {
    if kind == NodeType::Lambda {
        return false;
    }
    kind.is_binary_operator()
        || kind.is_unary_operator()
        || matches!(
            kind,
            NodeType::Assign
                | NodeType::Expr
                | NodeType::Elist
                | NodeType::ArrayInit
                | NodeType::ArrayDeclarator
                | NodeType::LiteralNew
                | NodeType::MethodCall
                | NodeType::Dot
                | NodeType::IndexOp
                | NodeType::Typecast
                | NodeType::ParenExpr
                | NodeType::Question
        )
}

fn is_hash_code_method(node: NodeRef<'_>) -> bool {
    node.is(NodeType::MethodDef)
        && node
            .find_child(NodeType::Ident)
            .is_some_and(|name| name.text() == Some("hashCode"))
        && node
            .find_child(NodeType::Parameters)
            .is_some_and(|p| p.first_child().is_none())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{run, run_in};
    use treelint_core::Violation;

    fn check_code(code: &str) -> Vec<Violation> {
        run(Box::new(MagicNumber::new()), code)
    }

    fn args(violations: &[Violation]) -> Vec<&str> {
        violations
            .iter()
            .map(|v| v.message_args[0].as_str())
            .collect()
    }

    #[test]
    fn test_detects_magic_numbers() {
        let violations = check_code(
            r"
class A {
    int m(int x) {
        return x * 42 + 3.5;
    }
}
",
        );
        assert_eq!(args(&violations), vec!["42", "3.5"]);
        assert_eq!((violations[0].line, violations[0].column), (4, 20));
    }

    #[test]
    fn test_default_ignored_numbers() {
        let violations = check_code("class A { void m() { a = 0; b = 1; c = 2; d = -1; e = 0L; f = 1.0; } }");
        assert!(violations.is_empty());
    }

    #[test]
    fn test_negative_number_is_reported_at_minus() {
        let violations = check_code("class A { void m() { a = -5; } }");
        assert_eq!(args(&violations), vec!["-5"]);
        assert_eq!(violations[0].column, 26);
    }

    #[test]
    fn test_constants_are_accepted() {
        let violations = check_code(
            r"
class A {
    static final int PORT = 8080;
    private static final int[] SIZES = {3, 5, 7};
    static final long TIMEOUT = 60 * 1000L;
    void m() {
        final int local = 10;
    }
}
",
        );
        assert!(violations.is_empty());
    }

    #[test]
    fn test_interface_fields_and_enum_constants_are_constants() {
        let violations = check_code(
            r"
interface Limits {
    int MAX = 100;
}
enum Planet {
    MERCURY(3.303e+23, 2.4397e6);
}
",
        );
        assert!(violations.is_empty());
    }

    #[test]
    fn test_lambda_inside_constant_is_not_a_constant() {
        let violations = check_code("class A { static final Runnable R = () -> call(7); }");
        assert_eq!(args(&violations), vec!["7"]);
    }

    #[test]
    fn test_field_declaration_option() {
        let code = "class A { int size = 16; void m() { x = 16; } }";
        assert_eq!(check_code(code).len(), 2);
        let check = MagicNumber::new().ignore_field_declaration(true);
        assert_eq!(run(Box::new(check), code).len(), 1);
    }

    #[test]
    fn test_hash_code_option() {
        let code = "class A { public int hashCode() { return 31 * h; } }";
        assert_eq!(check_code(code).len(), 1);
        let check = MagicNumber::new().ignore_hash_code_method(true);
        assert!(run(Box::new(check), code).is_empty());
    }

    #[test]
    fn test_annotation_option() {
        let code = "class A { @Timeout(30) void m() {} }";
        assert_eq!(check_code(code).len(), 1);
        let check = MagicNumber::new().ignore_annotation(true);
        assert!(run(Box::new(check), code).is_empty());
    }

    #[test]
    fn test_allow_in_tests() {
        let code = "class ATest { void m() { x = 99; } }";
        let check = MagicNumber::new().allow_in_tests(true);
        assert!(run_in(Box::new(check), code, "src/test/java/ATest.java").is_empty());
        let check = MagicNumber::new().allow_in_tests(true);
        assert_eq!(run_in(Box::new(check), code, "src/main/java/A.java").len(), 1);
    }

    #[test]
    fn test_from_config() {
        let config = CheckConfig::new()
            .with_option("ignore_numbers", vec![toml::Value::Integer(100), toml::Value::Float(0.5)])
            .with_option("ignore_annotation", true);
        let check = MagicNumber::from_config(&config).unwrap();
        assert_eq!(check.ignore_numbers, vec![100.0, 0.5]);
        assert!(check.ignore_annotation);

        let violations = run(Box::new(check), "class A { void m() { a = 100; b = 0.5; c = 1; } }");
        assert_eq!(args(&violations), vec!["1"]);
    }

    #[test]
    fn test_invalid_option_type() {
        let config = CheckConfig::new().with_option("ignore_numbers", "1, 2");
        let err = MagicNumber::from_config(&config).unwrap_err();
        assert_eq!(err.option, "ignore_numbers");
    }

    #[test]
    fn test_parse_number_forms() {
        assert_eq!(parse_number("42"), Some(42.0));
        assert_eq!(parse_number("1_000L"), Some(1000.0));
        assert_eq!(parse_number("0x1F"), Some(31.0));
        assert_eq!(parse_number("0b101"), Some(5.0));
        assert_eq!(parse_number("017"), Some(15.0));
        assert_eq!(parse_number("2.5f"), Some(2.5));
        assert_eq!(parse_number("1e3d"), Some(1000.0));
        assert_eq!(parse_number("0"), Some(0.0));
        assert_eq!(parse_number("0x1.8p1"), None);
    }

    #[test]
    fn test_floating_suffix_is_not_octal() {
        assert_eq!(parse_number("010d"), Some(10.0));
        assert_eq!(parse_number("09f"), Some(9.0));
        assert_eq!(parse_number("010L"), Some(8.0));

        let check = MagicNumber::new().ignore_numbers(vec![10.0]);
        assert!(run(Box::new(check), "class A { void m() { x = 010d; } }").is_empty());
    }

    #[test]
    fn test_every_declarator_of_a_constant_is_a_constant() {
        let violations = check_code(
            r"
class K {
    static final int A = 13, B = 17;
    int c = 19, d = 23;
    void m() {
        final int x = 29, y = 31;
        for (int i = 37, j = 41; ; ) {}
    }
}
",
        );
        assert_eq!(args(&violations), vec!["19", "23", "37", "41"]);
    }
}
