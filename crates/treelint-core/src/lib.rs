//! # treelint-core
//!
//! Core engine for analyzing Java sources.
//!
//! The pipeline for one file is: [`lexer`] (unicode-escape pre-pass,
//! tab-expanded positions), [`parser`] (typed syntax tree in an arena),
//! [`TreeWalker`] (dispatches nodes to [`Check`]s), [`collector`]
//! (suppression filters, deterministic ordering), then rendering through a
//! [`MessageCatalog`]. The [`Analyzer`] runs that pipeline over a file tree
//! in parallel, with a fresh set of checks per file.
//!
//! ## Example
//!
//! ```ignore
//! use treelint_core::{Analyzer, CheckPlan, Config};
//!
//! let config = Config::from_file("treelint.toml".as_ref())?;
//! let plan = CheckPlan::from_config(&registry, &config, &["todo-comment"])?;
//! let analyzer = Analyzer::builder()
//!     .root("./src")
//!     .plan(plan)
//!     .config(config)
//!     .build()?;
//!
//! let result = analyzer.analyze()?;
//! for finding in &result.findings {
//!     println!("{}", finding.format());
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod analyzer;
mod check;
mod config;
mod context;
mod messages;
mod registry;
mod walker;

/// Syntax tree arena and node types.
pub mod ast;
/// Violation buffering and ordering.
pub mod collector;
/// Violation suppression.
pub mod filter;
/// Tokenizer for Java source text.
pub mod lexer;
/// Recursive-descent parser producing an [`Ast`].
pub mod parser;
/// Violations, findings and run results.
pub mod types;

pub use analyzer::{Analyzer, AnalyzerBuilder, AnalyzerError, CancellationFlag, FileReport};
pub use ast::{Ast, Comment, CommentKind, NodeId, NodeRef, NodeType};
pub use check::{Check, CheckBox, CheckContext, CheckError, CheckResult};
pub use config::{
    AnalyzerConfig, CheckConfig, Config, ConfigError, ConfigurationError, OptionError,
    SuppressConfig,
};
pub use context::FileContext;
pub use messages::MessageCatalog;
pub use parser::{parse_source, ParseError};
pub use registry::{CheckFactory, CheckPlan, CheckRegistry, PlannedCheck};
pub use types::{DiagnosticKind, FileDiagnostic, Finding, LintResult, Severity, Violation};
pub use walker::{CheckInternalError, Phase, TreeWalker, WalkOutcome, WalkState};
