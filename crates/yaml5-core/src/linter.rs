//! Lint driver: resolves targets, parses them and runs the checker.

use crate::checker::check;
use crate::config::Config;
use crate::types::{LintResult, TargetReport, Warning};

use miette::{Diagnostic, NamedSource, SourceSpan};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};
use walkdir::WalkDir;
use yaml5_syntax::ParseError;

/// File extensions picked up when a directory is given as target.
const YAML_EXTENSIONS: &[&str] = &["yaml", "yml"];

/// Errors that abort a lint run.
#[derive(Debug, Error, Diagnostic)]
pub enum LintError {
    /// IO error reading a target.
    #[error("Failed to read {path}: {source}")]
    #[diagnostic(code(yaml5::io))]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Error walking a target directory.
    #[error("Failed to walk {path}: {source}")]
    #[diagnostic(code(yaml5::io))]
    Walk {
        /// Directory being walked.
        path: PathBuf,
        /// Underlying walk error.
        source: walkdir::Error,
    },

    /// The target is not well-formed YAML.
    #[error("Parse error in {name}: {source}")]
    #[diagnostic(code(yaml5::parse))]
    Parse {
        /// Name of the target that failed to parse.
        name: String,
        /// Parser error.
        source: ParseError,
        /// Source text, for rendering the error in context.
        #[source_code]
        src: NamedSource<String>,
        /// Where the error was detected.
        #[label("here")]
        span: SourceSpan,
    },

    /// Invalid exclude pattern.
    #[error("Invalid glob pattern: {0}")]
    #[diagnostic(code(yaml5::glob))]
    Glob(#[from] glob::PatternError),
}

impl LintError {
    fn parse(name: &str, text: &str, source: ParseError) -> Self {
        let span = SourceSpan::from((source.position().offset, 0));
        Self::Parse {
            name: name.to_string(),
            source,
            src: NamedSource::new(name, text.to_string()),
            span,
        }
    }
}

/// Builder for configuring a [`Linter`].
#[derive(Default)]
pub struct LinterBuilder {
    config: Option<Config>,
    targets: Vec<PathBuf>,
    exclude_patterns: Vec<String>,
}

impl LinterBuilder {
    /// Creates a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the configuration.
    #[must_use]
    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Adds a file or directory to lint.
    #[must_use]
    pub fn target(mut self, path: impl Into<PathBuf>) -> Self {
        self.targets.push(path.into());
        self
    }

    /// Adds multiple files or directories to lint.
    #[must_use]
    pub fn targets<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.targets.extend(paths.into_iter().map(Into::into));
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

    /// Builds the linter.
    ///
    /// # Errors
    ///
    /// Returns an error if an exclude pattern is not a valid glob.
    pub fn build(self) -> Result<Linter, LintError> {
        let excludes = self
            .exclude_patterns
            .iter()
            .map(|p| glob::Pattern::new(p))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Linter {
            config: self.config.unwrap_or_default(),
            targets: self.targets,
            excludes,
        })
    }
}

/// Lints YAML files against the YAML5 rules.
///
/// Use [`Linter::builder()`] to construct an instance.
pub struct Linter {
    config: Config,
    targets: Vec<PathBuf>,
    excludes: Vec<glob::Pattern>,
}

impl Linter {
    /// Creates a new builder for configuring a linter.
    #[must_use]
    pub fn builder() -> LinterBuilder {
        LinterBuilder::new()
    }

    /// Returns the configuration applied to every target.
    #[must_use]
    pub fn config(&self) -> Config {
        self.config
    }

    /// Parses and checks `source`. `name` identifies it in errors.
    ///
    /// # Errors
    ///
    /// Returns an error if `source` does not parse.
    pub fn lint_source(&self, name: &str, source: &str) -> Result<Vec<Warning>, LintError> {
        let file =
            yaml5_syntax::parse(source).map_err(|e| LintError::parse(name, source, e))?;
        Ok(check(&file, self.config))
    }

    /// Reads, parses and checks one file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or does not parse.
    pub fn lint_target(&self, path: &Path) -> Result<TargetReport, LintError> {
        debug!("Linting: {}", path.display());
        let content = std::fs::read_to_string(path).map_err(|e| LintError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let warnings = self.lint_source(&path.display().to_string(), &content)?;
        Ok(TargetReport::new(path, warnings))
    }

    /// Expands the configured targets into the list of files to lint.
    ///
    /// Files are kept as given. Directories are walked recursively in
    /// file name order for `.yaml` and `.yml` files. Exclude patterns
    /// apply to both.
    ///
    /// # Errors
    ///
    /// Returns an error if a directory cannot be walked.
    pub fn resolve_targets(&self) -> Result<Vec<PathBuf>, LintError> {
        let mut files = Vec::new();
        for target in &self.targets {
            if !target.is_dir() {
                if self.should_exclude(target) {
                    debug!("Excluding: {}", target.display());
                } else {
                    files.push(target.clone());
                }
                continue;
            }

            for entry in WalkDir::new(target).sort_by_file_name() {
                let entry = entry.map_err(|e| LintError::Walk {
                    path: target.clone(),
                    source: e,
                })?;
                let path = entry.path();
                if !entry.file_type().is_file() || !is_yaml_file(path) {
                    continue;
                }
                if self.should_exclude(path) {
                    debug!("Excluding: {}", path.display());
                    continue;
                }
                files.push(entry.into_path());
            }
        }
        Ok(files)
    }

    /// Lints every target.
    ///
    /// # Errors
    ///
    /// The first target that cannot be read or parsed aborts the run.
    pub fn run(&self) -> Result<LintResult, LintError> {
        self.run_with(|_| {})
    }

    /// Lints every target, handing each report to `on_report` as soon as
    /// it is ready.
    ///
    /// # Errors
    ///
    /// The first target that cannot be read or parsed aborts the run;
    /// reports already handed out stay valid.
    pub fn run_with<F>(&self, mut on_report: F) -> Result<LintResult, LintError>
    where
        F: FnMut(&TargetReport),
    {
        let files = self.resolve_targets()?;
        info!("Found {} files to lint", files.len());
        if files.is_empty() {
            warn!("No YAML files found in the given targets");
        }

        let mut result = LintResult::new();
        for path in &files {
            let report = self.lint_target(path)?;
            on_report(&report);
            result.reports.push(report);
        }

        info!(
            "Lint complete: {} warnings in {} files",
            result.warning_count(),
            result.targets_checked()
        );
        Ok(result)
    }

    /// Checks if a path should be excluded.
    fn should_exclude(&self, path: &Path) -> bool {
        self.excludes.iter().any(|p| p.matches_path(path))
    }
}

fn is_yaml_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| YAML_EXTENSIONS.contains(&ext))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_builder_defaults() {
        let linter = Linter::builder().build().expect("Failed to build linter");
        assert_eq!(linter.config(), Config::default());
        assert!(linter.resolve_targets().unwrap().is_empty());
    }

    #[test]
    fn test_invalid_exclude_pattern() {
        let result = Linter::builder().exclude("a/***").build();
        assert!(matches!(result, Err(LintError::Glob(_))));
    }

    #[test]
    fn test_exclude_patterns() {
        let linter = Linter::builder()
            .exclude("**/vendor/**")
            .exclude("*.generated.yaml")
            .build()
            .unwrap();

        assert!(linter.should_exclude(Path::new("conf/vendor/a.yaml")));
        assert!(linter.should_exclude(Path::new("x.generated.yaml")));
        assert!(!linter.should_exclude(Path::new("conf/app.yaml")));
    }

    #[test]
    fn test_lint_source() {
        let linter = Linter::builder().build().unwrap();
        let warnings = linter.lint_source("inline", "[x]").unwrap();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].text, "unquoted strings are not allowed");
    }

    #[test]
    fn test_lint_source_parse_error() {
        let linter = Linter::builder().build().unwrap();
        let err = linter.lint_source("inline", "[1, 2").unwrap_err();
        let LintError::Parse { name, source, .. } = &err else {
            panic!("expected parse error, got {err:?}");
        };
        assert_eq!(name, "inline");
        assert_eq!(source.message(), "unclosed flow sequence");
        assert_eq!(err.to_string(), "Parse error in inline: unclosed flow sequence at 1:1");
    }

    #[test]
    fn test_resolve_targets_walks_directories() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("nested/skip")).unwrap();
        fs::write(dir.path().join("b.yml"), "{}").unwrap();
        fs::write(dir.path().join("a.yaml"), "{}").unwrap();
        fs::write(dir.path().join("notes.txt"), "{}").unwrap();
        fs::write(dir.path().join("nested/c.yaml"), "{}").unwrap();
        fs::write(dir.path().join("nested/skip/d.yaml"), "{}").unwrap();

        let linter = Linter::builder()
            .target(dir.path())
            .exclude("**/skip/**")
            .build()
            .unwrap();
        let files: Vec<PathBuf> = linter
            .resolve_targets()
            .unwrap()
            .into_iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().to_path_buf())
            .collect();

        assert_eq!(
            files,
            vec![
                PathBuf::from("a.yaml"),
                PathBuf::from("b.yml"),
                PathBuf::from("nested/c.yaml"),
            ]
        );
    }

    #[test]
    fn test_explicit_file_kept_regardless_of_extension() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json5");
        fs::write(&path, "{\"a\": 1}").unwrap();

        let linter = Linter::builder().target(&path).build().unwrap();
        let result = linter.run().unwrap();
        assert_eq!(result.targets_checked(), 1);
        assert!(result.is_clean());
    }

    #[test]
    fn test_run_aborts_on_first_failure() {
        let dir = TempDir::new().unwrap();
        let good = dir.path().join("good.yaml");
        let bad = dir.path().join("bad.yaml");
        let never = dir.path().join("never.yaml");
        fs::write(&good, "[x]").unwrap();
        fs::write(&bad, "{\"a\": ").unwrap();
        fs::write(&never, "[y]").unwrap();

        let linter = Linter::builder()
            .targets([&good, &bad, &never])
            .build()
            .unwrap();

        let mut seen = Vec::new();
        let err = linter
            .run_with(|report| seen.push(report.target.clone()))
            .unwrap_err();

        assert!(matches!(err, LintError::Parse { .. }));
        assert_eq!(seen, vec![good]);
    }

    #[test]
    fn test_missing_target_is_io_error() {
        let linter = Linter::builder()
            .target("/nonexistent/file.yaml")
            .build()
            .unwrap();
        assert!(matches!(linter.run(), Err(LintError::Io { .. })));
    }
}
