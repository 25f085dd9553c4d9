//! Init command implementation.

use anyhow::{bail, Context, Result};
use std::path::Path;

const DEFAULT_CONFIG: &str = r#"# treelint configuration

# Check selection: "recommended" (default), "strict" or "minimal"
preset = "recommended"

# Findings at or above this severity fail the run
fail_on = "error"

[analyzer]
# Root directory to analyze (default: current directory)
# root = "./src"

# Glob patterns to exclude from analysis, relative to the root
exclude = [
    "**/target/**",
    "**/build/**",
    "**/generated/**",
]

# Respect .gitignore files
respect_gitignore = true

# Distance between tab stops for column numbers
tab_width = 8

# Check configurations
# Each check can be enabled/disabled and have its severity overridden

[checks.magic-number]
enabled = true
# severity = "warning"
ignore_numbers = [-1, 0, 1, 2]
ignore_hash_code_method = true

# [checks.return-count]
# enabled = true
# max = 2
# max_for_void = 1

# Suppress findings by check, file, line and column
# [[suppress]]
# checks = "magic-number"
# files = ".*Test\\.java"

# Override message templates
# [messages]
# "magic.number" = "Avoid magic number {0}."
"#;

/// Runs the init command.
pub fn run(force: bool) -> Result<()> {
    write_config(Path::new("treelint.toml"), force)?;

    println!("Created treelint.toml");
    println!("\nNext steps:");
    println!("  1. Edit treelint.toml to configure checks");
    println!("  2. Run: treelint check");

    Ok(())
}

fn write_config(config_path: &Path, force: bool) -> Result<()> {
    if config_path.exists() && !force {
        bail!(
            "Configuration file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    std::fs::write(config_path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write {}", config_path.display()))
}
