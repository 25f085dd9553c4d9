//! treelint CLI tool.
//!
//! Usage:
//! ```bash
//! treelint check [OPTIONS] [PATH]
//! treelint list-checks
//! treelint init
//! treelint dump-ast FILE
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod config_resolver;

use config_resolver::ConfigLocator;

/// Style checker for Java sources
#[derive(Parser)]
#[command(name = "treelint")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file (default: nearest treelint.toml)
    #[arg(short, long, global = true, env = "TREELINT_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run checks
    Check {
        /// File or directory to analyze (default: current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,

        /// Only run specific checks (comma-separated)
        #[arg(long)]
        checks: Option<String>,

        /// Exclude patterns (can be specified multiple times)
        #[arg(short, long)]
        exclude: Vec<String>,

        /// Distance between tab stops for column numbers
        #[arg(long)]
        tab_width: Option<usize>,

        /// Number of worker threads (default: one per core)
        #[arg(short = 'j', long)]
        jobs: Option<usize>,
    },

    /// List available checks and presets
    ListChecks,

    /// Initialize configuration file
    Init {
        /// Overwrite existing config
        #[arg(long)]
        force: bool,
    },

    /// Print the syntax tree of a Java file
    DumpAst {
        /// File to parse
        file: PathBuf,

        /// Distance between tab stops for column numbers
        #[arg(long, default_value_t = 8)]
        tab_width: usize,
    },
}

/// Output format for lint results.
#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON output.
    Json,
    /// One-line-per-finding compact format.
    Compact,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env("TREELINT_LOG").unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Check {
            path,
            format,
            checks,
            exclude,
            tab_width,
            jobs,
        } => {
            let source = ConfigLocator::from_env().locate(&path, cli.config.as_deref());
            let options = commands::check::CheckOptions {
                format,
                checks,
                exclude,
                tab_width,
                jobs,
            };
            let failed = commands::check::run(&path, &options, &source)?;
            if failed {
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::ListChecks => {
            commands::list_checks::run();
            Ok(())
        }
        Commands::Init { force } => commands::init::run(force),
        Commands::DumpAst { file, tab_width } => commands::dump_ast::run(&file, tab_width),
    }
}
