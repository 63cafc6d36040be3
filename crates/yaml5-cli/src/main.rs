//! yaml5 CLI tool.
//!
//! Usage:
//! ```bash
//! yaml5 lint [OPTIONS] <TARGETS>...
//! yaml5 version
//! yaml5 init
//! ```

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod commands;
mod config_resolver;

use commands::Outcome;

/// Linter restricting YAML files to YAML5, a JSON5-like subset of YAML
#[derive(Parser)]
#[command(name = "yaml5")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check YAML files against the YAML5 rules
    Lint {
        /// Files or directories to lint
        #[arg(required = true)]
        targets: Vec<PathBuf>,

        /// Allow single quote strings (default: from config, else true)
        #[arg(long, value_name = "BOOL", action = ArgAction::Set)]
        allow_single_quote_strings: Option<bool>,

        /// Allow unquoted identifier object keys (default: from config, else true)
        #[arg(long, value_name = "BOOL", action = ArgAction::Set)]
        allow_unquoted_keys: Option<bool>,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,

        /// Exclude patterns (can be specified multiple times)
        #[arg(short, long)]
        exclude: Vec<String>,
    },

    /// Print version information
    Version,

    /// Initialize configuration file
    Init {
        /// Overwrite existing config
        #[arg(long)]
        force: bool,
    },
}

/// Output format for lint results.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// One `<target>:<line>:<column>: <text>` line per warning.
    #[default]
    Text,
    /// JSON array of per-target reports.
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Lint {
            targets,
            allow_single_quote_strings,
            allow_unquoted_keys,
            format,
            exclude,
        } => commands::lint::run(
            commands::lint::LintArgs {
                targets,
                allow_single_quote_strings,
                allow_unquoted_keys,
                format,
                exclude,
            },
            cli.config.as_deref(),
        ),
        Commands::Version => {
            commands::version::run();
            Ok(Outcome::Clean)
        }
        Commands::Init { force } => commands::init::run(force).map(|()| Outcome::Clean),
    };

    match result {
        Ok(outcome) => outcome.exit_code(),
        Err(err) => {
            eprintln!("Error: {err:#}");
            Outcome::Failed.exit_code()
        }
    }
}
