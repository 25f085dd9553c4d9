//! Core analyzer for orchestrating lint execution.

use crate::collector::finalize;
use crate::config::{Config, ConfigurationError};
use crate::context::FileContext;
use crate::filter::{CommentSuppressions, FilterSet};
use crate::lexer::DEFAULT_TAB_WIDTH;
use crate::messages::MessageCatalog;
use crate::parser::parse_source;
use crate::registry::CheckPlan;
use crate::types::{DiagnosticKind, FileDiagnostic, Finding, LintResult};

use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Stack size of analysis threads; parsing recurses once per nesting level.
const WORKER_STACK_SIZE: usize = 16 * 1024 * 1024;

/// Errors that can occur during analysis.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    /// IO error resolving the root.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error walking the directory tree.
    #[error("Failed to walk directory: {0}")]
    Walk(#[from] ignore::Error),

    /// Error walking the directory tree without ignore rules.
    #[error("Failed to walk directory: {0}")]
    WalkDir(#[from] walkdir::Error),

    /// Glob pattern error.
    #[error("Invalid glob pattern: {0}")]
    Glob(#[from] glob::PatternError),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    /// The configuration cannot run.
    #[error("Invalid configuration: {0}")]
    Configuration(#[from] ConfigurationError),

    /// The worker pool could not be started.
    #[error("Failed to start worker threads: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Cooperative cancellation shared with a running analysis.
///
/// Files not yet started when the flag is raised are skipped and counted;
/// a file already being processed runs to completion.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    /// Creates a lowered flag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Raises the flag.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Returns true once the flag was raised.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Findings and diagnostics of a single file.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FileReport {
    /// Sorted, filtered, rendered findings.
    pub findings: Vec<Finding>,
    /// Tool diagnostics for the file.
    pub diagnostics: Vec<FileDiagnostic>,
}

impl FileReport {
    fn failed(diagnostic: FileDiagnostic) -> Self {
        Self {
            findings: Vec::new(),
            diagnostics: vec![diagnostic],
        }
    }
}

enum FileOutcome {
    Checked(FileReport),
    Skipped,
}

/// Builder for configuring an [`Analyzer`].
#[derive(Default)]
pub struct AnalyzerBuilder {
    root: Option<PathBuf>,
    plan: CheckPlan,
    exclude_patterns: Vec<String>,
    include_patterns: Vec<String>,
    extensions: Option<Vec<String>>,
    respect_gitignore: Option<bool>,
    tab_width: Option<usize>,
    parallelism: Option<usize>,
    filters: Option<FilterSet>,
    cancellation: CancellationFlag,
    config: Option<Config>,
}

impl AnalyzerBuilder {
    /// Creates a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the root directory (or single file) to analyze.
    #[must_use]
    pub fn root(mut self, path: impl Into<PathBuf>) -> Self {
        self.root = Some(path.into());
        self
    }

    /// Sets the checks to run.
    #[must_use]
    pub fn plan(mut self, plan: CheckPlan) -> Self {
        self.plan = plan;
        self
    }

    /// Adds an exclude glob pattern.
    #[must_use]
    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.exclude_patterns.push(pattern.into());
        self
    }

    /// Adds multiple exclude glob patterns.
    #[must_use]
    pub fn excludes<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_patterns
            .extend(patterns.into_iter().map(Into::into));
        self
    }

    /// Adds an include glob pattern.
    #[must_use]
    pub fn include(mut self, pattern: impl Into<String>) -> Self {
        self.include_patterns.push(pattern.into());
        self
    }

    /// Sets the file extensions to analyze.
    #[must_use]
    pub fn extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = Some(extensions.into_iter().map(Into::into).collect());
        self
    }

    /// Sets whether `.gitignore` files are honoured (default: true).
    #[must_use]
    pub fn respect_gitignore(mut self, respect: bool) -> Self {
        self.respect_gitignore = Some(respect);
        self
    }

    /// Sets the tab width for column computation.
    #[must_use]
    pub fn tab_width(mut self, tab_width: usize) -> Self {
        self.tab_width = Some(tab_width);
        self
    }

    /// Sets the number of worker threads.
    #[must_use]
    pub fn parallelism(mut self, threads: usize) -> Self {
        self.parallelism = Some(threads);
        self
    }

    /// Sets the suppression filters, replacing those from the configuration.
    #[must_use]
    pub fn filters(mut self, filters: FilterSet) -> Self {
        self.filters = Some(filters);
        self
    }

    /// Shares a cancellation flag with the analyzer.
    #[must_use]
    pub fn cancellation(mut self, flag: CancellationFlag) -> Self {
        self.cancellation = flag;
        self
    }

    /// Sets the configuration.
    #[must_use]
    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Builds the analyzer.
    ///
    /// # Errors
    ///
    /// Returns an error if the current directory cannot be resolved, a glob
    /// pattern is invalid, or a suppression entry does not compile.
    pub fn build(self) -> Result<Analyzer, AnalyzerError> {
        let config = self.config.unwrap_or_default();
        let settings = &config.analyzer;

        let root = self.root.unwrap_or_else(|| settings.root.clone());
        let root = if root.is_absolute() {
            root
        } else {
            std::env::current_dir()?.join(&root)
        };

        // Merge exclude patterns from config
        let mut exclude_patterns = self.exclude_patterns;
        exclude_patterns.extend(settings.exclude.clone());
        let mut include_patterns = self.include_patterns;
        include_patterns.extend(settings.include.clone());

        let filters = match self.filters {
            Some(filters) => filters,
            None => FilterSet::from_config(&config.suppress)?,
        };
        let messages = self.plan.message_catalog().with_overrides(&config.messages);

        Ok(Analyzer {
            root,
            exclude: compile_globs(&exclude_patterns)?,
            include: compile_globs(&include_patterns)?,
            extensions: self
                .extensions
                .unwrap_or_else(|| settings.extensions.clone()),
            respect_gitignore: self
                .respect_gitignore
                .unwrap_or(settings.respect_gitignore),
            tab_width: self
                .tab_width
                .unwrap_or(settings.tab_width)
                .max(1),
            parallelism: self.parallelism.or(settings.parallelism),
            plan: self.plan,
            filters,
            messages,
            cancellation: self.cancellation,
        })
    }
}

fn compile_globs(patterns: &[String]) -> Result<Vec<glob::Pattern>, AnalyzerError> {
    patterns
        .iter()
        .map(|p| glob::Pattern::new(p).map_err(AnalyzerError::from))
        .collect()
}

/// The main analyzer that orchestrates lint execution.
///
/// Use [`Analyzer::builder()`] to construct an instance.
pub struct Analyzer {
    root: PathBuf,
    plan: CheckPlan,
    exclude: Vec<glob::Pattern>,
    include: Vec<glob::Pattern>,
    extensions: Vec<String>,
    respect_gitignore: bool,
    tab_width: usize,
    parallelism: Option<usize>,
    filters: FilterSet,
    messages: MessageCatalog,
    cancellation: CancellationFlag,
}

impl Analyzer {
    /// Creates a new builder for configuring an analyzer.
    #[must_use]
    pub fn builder() -> AnalyzerBuilder {
        AnalyzerBuilder::new()
    }

    /// Returns the root being analyzed.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the number of planned checks.
    #[must_use]
    pub fn check_count(&self) -> usize {
        self.plan.len()
    }

    /// The message catalog findings are rendered with.
    #[must_use]
    pub fn messages(&self) -> &MessageCatalog {
        &self.messages
    }

    /// Analyzes all files and returns the results, ordered by file path.
    ///
    /// # Errors
    ///
    /// Returns an error if file discovery fails or the worker pool cannot
    /// be started. Per-file failures become diagnostics instead.
    pub fn analyze(&self) -> Result<LintResult, AnalyzerError> {
        info!("Starting analysis at {}", self.root.display());

        let files = self.discover_files()?;
        info!(
            "Found {} files to analyze with {} check(s)",
            files.len(),
            self.plan.len()
        );

        let mut pool = rayon::ThreadPoolBuilder::new().stack_size(WORKER_STACK_SIZE);
        if let Some(threads) = self.parallelism {
            pool = pool.num_threads(threads);
        }
        let pool = pool.build()?;

        let outcomes: Vec<FileOutcome> =
            pool.install(|| files.par_iter().map(|path| self.process_file(path)).collect());

        let mut result = LintResult::new();
        for outcome in outcomes {
            match outcome {
                FileOutcome::Checked(report) => {
                    result.files_checked += 1;
                    result.findings.extend(report.findings);
                    result.diagnostics.extend(report.diagnostics);
                }
                FileOutcome::Skipped => result.files_skipped += 1,
            }
        }

        if result.files_skipped > 0 {
            warn!(
                "Analysis cancelled: {} file(s) skipped",
                result.files_skipped
            );
        }
        info!(
            "Analysis complete: {} finding(s), {} diagnostic(s) in {} files",
            result.findings.len(),
            result.diagnostics.len(),
            result.files_checked
        );

        Ok(result)
    }

    /// Analyzes one file's contents.
    ///
    /// The file is atomic: either its complete findings, or exactly one
    /// diagnostic when it cannot be tokenized or parsed.
    #[must_use]
    pub fn analyze_source(&self, path: &Path, content: &str) -> FileReport {
        let ctx = FileContext::new(path, content, &self.root).with_tab_width(self.tab_width);
        let file = ctx.display_path();

        let ast = match parse_source(content, self.tab_width) {
            Ok(ast) => ast,
            Err(e) => {
                warn!("Failed to parse {}: {}", file, e);
                return FileReport::failed(FileDiagnostic::from_parse_error(file.as_str(), &e));
            }
        };

        let mut walker = match self.plan.instantiate() {
            Ok(walker) => walker,
            Err(e) => {
                warn!("Failed to instantiate checks for {}: {}", file, e);
                return FileReport::failed(FileDiagnostic::new(
                    &file,
                    DiagnosticKind::CheckInternal,
                    0,
                    0,
                    e.to_string(),
                ));
            }
        };

        let outcome = walker.walk(&ctx, &ast);
        let comments = CommentSuppressions::from_comments(ast.comments());
        let violations = finalize(outcome.violations, &file, &[&self.filters, &comments]);

        let findings = violations
            .iter()
            .map(|v| Finding::from_violation(&file, v, &self.messages))
            .collect();
        let diagnostics = outcome
            .errors
            .into_iter()
            .map(|e| {
                FileDiagnostic::new(
                    &file,
                    DiagnosticKind::CheckInternal,
                    e.line,
                    e.column,
                    format!("{} on {}: {}", e.phase, e.node, e.message),
                )
                .with_check(e.check_id)
            })
            .collect();

        FileReport {
            findings,
            diagnostics,
        }
    }

    fn process_file(&self, path: &Path) -> FileOutcome {
        if self.cancellation.is_cancelled() {
            debug!("Skipping (cancelled): {}", path.display());
            return FileOutcome::Skipped;
        }
        debug!("Analyzing: {}", path.display());

        match std::fs::read_to_string(path) {
            Ok(content) => FileOutcome::Checked(self.analyze_source(path, &content)),
            Err(e) => {
                warn!("Failed to read {}: {}", path.display(), e);
                let ctx = FileContext::new(path, "", &self.root);
                FileOutcome::Checked(FileReport::failed(FileDiagnostic::new(
                    ctx.display_path(),
                    DiagnosticKind::Io,
                    0,
                    0,
                    e.to_string(),
                )))
            }
        }
    }

    /// Discovers source files under the root, sorted by path.
    fn discover_files(&self) -> Result<Vec<PathBuf>, AnalyzerError> {
        if self.root.is_file() {
            return Ok(vec![self.root.clone()]);
        }

        let mut files = Vec::new();
        if self.respect_gitignore {
            let mut builder = ignore::WalkBuilder::new(&self.root);
            builder.hidden(false).git_ignore(true).require_git(false);
            for entry in builder.build() {
                let entry = entry?;
                let path = entry.path();
                if path.is_file() && self.is_candidate(path) {
                    files.push(path.to_path_buf());
                }
            }
        } else {
            for entry in walkdir::WalkDir::new(&self.root) {
                let entry = entry?;
                let path = entry.path();
                if entry.file_type().is_file() && self.is_candidate(path) {
                    files.push(path.to_path_buf());
                }
            }
        }

        files.sort();
        Ok(files)
    }

    fn is_candidate(&self, path: &Path) -> bool {
        let known_extension = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|e| e == ext));
        if !known_extension {
            return false;
        }
        if self.should_exclude(path) {
            debug!("Excluding: {}", path.display());
            return false;
        }
        let relative = FileContext::new(path, "", &self.root).display_path();
        self.include.is_empty() || self.include.iter().any(|p| p.matches(&relative))
    }

    /// Checks if a path should be excluded.
    fn should_exclude(&self, path: &Path) -> bool {
        let relative = FileContext::new(path, "", &self.root).display_path();
        self.exclude.iter().any(|p| p.matches(&relative))
    }
}

impl std::fmt::Debug for Analyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Analyzer")
            .field("root", &self.root)
            .field("checks", &self.plan.ids().collect::<Vec<_>>())
            .field("tab_width", &self.tab_width)
            .finish_non_exhaustive()
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            plan: CheckPlan::default(),
            exclude: Vec::new(),
            include: Vec::new(),
            extensions: vec!["java".to_string()],
            respect_gitignore: true,
            tab_width: DEFAULT_TAB_WIDTH,
            parallelism: None,
            filters: FilterSet::new(),
            messages: MessageCatalog::new(),
            cancellation: CancellationFlag::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{NodeRef, NodeType};
    use crate::check::{Check, CheckBox, CheckContext, CheckResult};
    use crate::config::{CheckConfig, OptionError};
    use crate::registry::CheckRegistry;

    struct NoFoo;

    impl Check for NoFoo {
        fn name(&self) -> &'static str {
            "no-foo"
        }

        fn default_tokens(&self) -> &[NodeType] {
            &[NodeType::Ident]
        }

        fn messages(&self) -> &[(&'static str, &'static str)] {
            &[("no.foo", "Name '{0}' is banned.")]
        }

        fn visit_node(&mut self, node: NodeRef<'_>, ctx: &mut CheckContext<'_>) -> CheckResult {
            if node.text() == Some("foo") {
                ctx.log(node, "no.foo", &["foo"]);
            }
            Ok(())
        }
    }

    fn no_foo(_config: &CheckConfig) -> Result<CheckBox, OptionError> {
        Ok(Box::new(NoFoo))
    }

    fn plan() -> CheckPlan {
        let registry = CheckRegistry::new().with("no-foo", no_foo);
        CheckPlan::new(&registry, [("no-foo".to_string(), CheckConfig::new())]).unwrap()
    }

    #[test]
    fn test_builder() {
        let analyzer = Analyzer::builder()
            .root(".")
            .exclude("**/target/**")
            .build()
            .expect("Failed to build analyzer");

        assert!(analyzer.root().exists());
        assert_eq!(analyzer.check_count(), 0);
    }

    #[test]
    fn test_exclude_patterns() {
        let analyzer = Analyzer::builder()
            .root("/foo")
            .exclude("**/target/**")
            .exclude("**/generated/**")
            .build()
            .expect("Failed to build analyzer");

        assert!(analyzer.should_exclude(Path::new("/foo/target/classes/A.java")));
        assert!(analyzer.should_exclude(Path::new("/foo/src/generated/B.java")));
        assert!(!analyzer.should_exclude(Path::new("/foo/src/main/java/C.java")));
    }

    #[test]
    fn test_invalid_glob_is_rejected() {
        let err = Analyzer::builder().exclude("[").build().unwrap_err();
        assert!(matches!(err, AnalyzerError::Glob(_)));
    }

    #[test]
    fn test_invalid_suppression_is_rejected() {
        let config = Config::parse("[[suppress]]\nchecks = \"(\"\n").unwrap();
        let err = Analyzer::builder().config(config).build().unwrap_err();
        assert!(matches!(err, AnalyzerError::Configuration(_)));
    }

    #[test]
    fn test_analyze_source_renders_findings() {
        let analyzer = Analyzer::builder().root("/p").plan(plan()).build().unwrap();
        let report = analyzer.analyze_source(
            Path::new("/p/src/A.java"),
            "class A {\n    int foo = bar;\n    int b = foo;\n}\n",
        );

        assert!(report.diagnostics.is_empty());
        let rendered: Vec<_> = report.findings.iter().map(ToString::to_string).collect();
        assert_eq!(
            rendered,
            vec![
                "src/A.java:2:9: Name 'foo' is banned.",
                "src/A.java:3:13: Name 'foo' is banned.",
            ]
        );
    }

    #[test]
    fn test_lex_failure_is_single_diagnostic() {
        let analyzer = Analyzer::builder().root("/p").plan(plan()).build().unwrap();
        let report = analyzer.analyze_source(
            Path::new("/p/A.java"),
            "class foo { String s = \"open; }\n",
        );

        assert!(report.findings.is_empty());
        assert_eq!(report.diagnostics.len(), 1);
        assert_eq!(report.diagnostics[0].kind, DiagnosticKind::Lex);
        assert_eq!(report.diagnostics[0].line, 1);
    }

    #[test]
    fn test_syntax_failure_is_single_diagnostic() {
        let analyzer = Analyzer::builder().root("/p").plan(plan()).build().unwrap();
        let report = analyzer.analyze_source(Path::new("/p/A.java"), "class A { void m() { int x = ; } }");

        assert!(report.findings.is_empty());
        assert_eq!(report.diagnostics.len(), 1);
        assert_eq!(report.diagnostics[0].kind, DiagnosticKind::Syntax);
        assert_eq!(report.diagnostics[0].message, "expected expression, found ';'");
    }

    #[test]
    fn test_config_suppressions_and_message_overrides_apply() {
        let config = Config::parse(
            r#"
[[suppress]]
checks = "no-foo"
lines = [3, 3]

[messages]
"no.foo" = "banned: {0}"
"#,
        )
        .unwrap();
        let analyzer = Analyzer::builder()
            .root("/p")
            .plan(plan())
            .config(config)
            .build()
            .unwrap();
        let report = analyzer.analyze_source(
            Path::new("/p/A.java"),
            "class A {\n    int foo;\n    int foo;\n}\n",
        );

        assert_eq!(report.findings.len(), 1);
        assert_eq!(report.findings[0].line, 2);
        assert_eq!(report.findings[0].message, "banned: foo");
    }

    #[test]
    fn test_comment_directives_apply() {
        let analyzer = Analyzer::builder().root("/p").plan(plan()).build().unwrap();
        let report = analyzer.analyze_source(
            Path::new("/p/A.java"),
            "class A {\n    // treelint: allow(no-foo)\n    int foo;\n    int foo;\n}\n",
        );
        assert_eq!(report.findings.len(), 1);
        assert_eq!(report.findings[0].line, 4);
    }

    #[test]
    fn test_tab_width_affects_columns() {
        let analyzer = Analyzer::builder()
            .root("/p")
            .plan(plan())
            .tab_width(4)
            .build()
            .unwrap();
        let report = analyzer.analyze_source(Path::new("/p/A.java"), "class A {\n\tint foo;\n}\n");
        assert_eq!(report.findings[0].column, 9);
    }

    #[test]
    fn test_cancellation_flag() {
        let flag = CancellationFlag::new();
        let shared = flag.clone();
        assert!(!shared.is_cancelled());
        flag.cancel();
        assert!(shared.is_cancelled());
    }
}
