//! Lint command implementation.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use yaml5_core::{Config, Linter};

use super::output::Printer;
use super::Outcome;
use crate::config_resolver;
use crate::OutputFormat;

/// Arguments of `yaml5 lint`.
pub struct LintArgs {
    /// Files or directories to lint.
    pub targets: Vec<PathBuf>,
    /// `--allow-single-quote-strings` override.
    pub allow_single_quote_strings: Option<bool>,
    /// `--allow-unquoted-keys` override.
    pub allow_unquoted_keys: Option<bool>,
    /// Output format.
    pub format: OutputFormat,
    /// Exclude glob patterns.
    pub exclude: Vec<String>,
}

/// Runs the lint command.
///
/// Setup failures are returned as errors. A target that cannot be read or
/// parsed is rendered as a diagnostic and ends the run with
/// [`Outcome::Failed`]; reports printed before it stay printed.
pub fn run(args: LintArgs, explicit_config: Option<&Path>) -> Result<Outcome> {
    let source = config_resolver::resolve(Path::new("."), explicit_config);
    let config = apply_overrides(source.load()?, &args);
    tracing::debug!("Effective config: {:?}", config);

    let linter = Linter::builder()
        .config(config)
        .targets(args.targets)
        .excludes(args.exclude)
        .build()
        .context("Failed to build linter")?;

    let mut printer = Printer::new(args.format, std::io::stdout().lock());
    let mut write_error = None;
    let run = linter.run_with(|report| {
        if let Err(e) = printer.report(report) {
            if write_error.is_none() {
                write_error = Some(e);
            }
        }
    });
    printer.finish()?;
    if let Some(e) = write_error {
        return Err(e);
    }

    match run {
        Ok(result) if result.is_clean() => Ok(Outcome::Clean),
        Ok(_) => Ok(Outcome::Warnings),
        Err(err) => {
            eprintln!("{:?}", miette::Report::new(err));
            Ok(Outcome::Failed)
        }
    }
}

/// Applies command-line overrides on top of the file configuration.
fn apply_overrides(mut config: Config, args: &LintArgs) -> Config {
    if let Some(allow) = args.allow_single_quote_strings {
        config = config.with_single_quote_strings(allow);
    }
    if let Some(allow) = args.allow_unquoted_keys {
        config = config.with_ident_obj_keys(allow);
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(single: Option<bool>, unquoted: Option<bool>) -> LintArgs {
        LintArgs {
            targets: Vec::new(),
            allow_single_quote_strings: single,
            allow_unquoted_keys: unquoted,
            format: OutputFormat::Text,
            exclude: Vec::new(),
        }
    }

    #[test]
    fn test_flags_override_file_values() {
        let file = Config::default().with_single_quote_strings(false);

        let config = apply_overrides(file, &args(Some(true), Some(false)));
        assert!(config.allow.single_quote_strings);
        assert!(!config.allow.ident_obj_keys);
    }

    #[test]
    fn test_absent_flags_keep_file_values() {
        let file = Config::default().with_ident_obj_keys(false);
        assert_eq!(apply_overrides(file, &args(None, None)), file);
    }
}
