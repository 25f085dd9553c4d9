//! Check command implementation.

use anyhow::{bail, Context, Result};
use std::path::Path;
use treelint_checks::{builtin_registry, Preset};
use treelint_core::{Analyzer, CheckPlan, Config, LintResult};

use crate::config_resolver::ConfigSource;
use crate::OutputFormat;

/// Command-line settings of one `check` run.
#[derive(Debug, Default)]
pub struct CheckOptions {
    /// Output format.
    pub format: OutputFormat,
    /// Comma-separated check ids replacing the preset selection.
    pub checks: Option<String>,
    /// Extra exclude globs.
    pub exclude: Vec<String>,
    /// Tab width override.
    pub tab_width: Option<usize>,
    /// Worker thread count.
    pub jobs: Option<usize>,
}

/// Runs the check command. Returns whether the run failed.
pub fn run(path: &Path, options: &CheckOptions, source: &ConfigSource) -> Result<bool> {
    let config = load_config(source)?;
    let threshold = config.fail_threshold();

    let plan = build_plan(&config, options.checks.as_deref())?;
    let mut builder = Analyzer::builder()
        .root(path)
        .plan(plan)
        .config(config)
        .excludes(options.exclude.iter().cloned());
    if let Some(tab_width) = options.tab_width {
        builder = builder.tab_width(tab_width);
    }
    if let Some(jobs) = options.jobs {
        builder = builder.parallelism(jobs);
    }
    let analyzer = builder.build().context("Failed to build analyzer")?;

    tracing::info!(
        "Analyzing {} with {} check(s)",
        path.display(),
        analyzer.check_count()
    );

    let mut result = analyzer.analyze().context("Analysis failed")?;
    result.config = source.path().map(Path::to_path_buf);
    super::output::print(&result, options.format, analyzer.root())?;

    Ok(is_failure(&result, threshold))
}

/// Loads the located configuration, or defaults.
pub fn load_config(source: &ConfigSource) -> Result<Config> {
    tracing::info!("Using config: {source}");
    match source.path() {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("Failed to load config: {}", path.display())),
        None => Ok(Config::default()),
    }
}

/// Selects checks from `--checks` when given, otherwise from the
/// configured preset plus per-check `enabled` settings.
fn build_plan(config: &Config, checks: Option<&str>) -> Result<CheckPlan> {
    let registry = builtin_registry();
    let plan = match checks {
        Some(list) => {
            let ids: Vec<&str> = list
                .split(',')
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .collect();
            if ids.is_empty() {
                bail!("--checks needs at least one check id");
            }
            CheckPlan::new(
                &registry,
                ids.iter()
                    .map(|id| ((*id).to_string(), config.check_config(id))),
            )?
        }
        None => {
            let preset = Preset::from_config(config.preset.as_deref())?;
            tracing::debug!("Using preset {}", preset);
            CheckPlan::from_config(&registry, config, preset.checks())?
        }
    };
    Ok(plan)
}

fn is_failure(result: &LintResult, threshold: treelint_core::Severity) -> bool {
    !result.diagnostics.is_empty() || result.has_violations_at(threshold)
}
