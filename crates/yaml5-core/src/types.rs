//! Core types for lint warnings and results.

use serde::Serialize;
use std::path::{Path, PathBuf};
use yaml5_syntax::Position;

/// A rule violation found by the checker.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Warning {
    /// Line number (1-indexed).
    pub line: usize,
    /// Column number (1-indexed).
    pub column: usize,
    /// Human-readable message.
    pub text: String,
}

impl Warning {
    /// Creates a warning at the position of a node.
    #[must_use]
    pub fn new(pos: Position, text: impl Into<String>) -> Self {
        Self {
            line: pos.line,
            column: pos.column,
            text: text.into(),
        }
    }
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}: {}", self.line, self.column, self.text)
    }
}

/// Warnings of one linted target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetReport {
    /// The file that was checked, as given or discovered.
    pub target: PathBuf,
    /// Warnings in traversal order.
    pub warnings: Vec<Warning>,
}

impl TargetReport {
    /// Creates a report for `target`.
    #[must_use]
    pub fn new(target: impl Into<PathBuf>, warnings: Vec<Warning>) -> Self {
        Self {
            target: target.into(),
            warnings,
        }
    }

    /// Returns true if the target has no warnings.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    /// Returns the target path.
    #[must_use]
    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Formats each warning as `<target>:<line>:<column>: <text>`.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.warnings
            .iter()
            .map(|w| format!("{}:{w}", self.target.display()))
            .collect()
    }
}

impl std::fmt::Display for TargetReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for line in self.lines() {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

/// Result of a lint run over all targets.
#[derive(Debug, Default, Serialize)]
pub struct LintResult {
    /// One report per target, in processing order.
    pub reports: Vec<TargetReport>,
}

impl LintResult {
    /// Creates a new empty result.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of targets checked.
    #[must_use]
    pub fn targets_checked(&self) -> usize {
        self.reports.len()
    }

    /// Total number of warnings across all targets.
    #[must_use]
    pub fn warning_count(&self) -> usize {
        self.reports.iter().map(|r| r.warnings.len()).sum()
    }

    /// Returns true if no target has warnings.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.reports.iter().all(TargetReport::is_clean)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn warning(line: usize, column: usize, text: &str) -> Warning {
        Warning::new(Position::new(line, column, 0), text)
    }

    #[test]
    fn test_warning_display() {
        let w = warning(3, 7, "unquoted strings are not allowed");
        assert_eq!(w.to_string(), "3:7: unquoted strings are not allowed");
    }

    #[test]
    fn test_report_lines() {
        let report = TargetReport::new(
            "conf/app.yaml",
            vec![
                warning(1, 1, "use a flow array syntax instead"),
                warning(2, 3, "NaN value should not be used"),
            ],
        );
        assert_eq!(
            report.to_string(),
            "conf/app.yaml:1:1: use a flow array syntax instead\n\
             conf/app.yaml:2:3: NaN value should not be used\n"
        );
        assert!(!report.is_clean());
    }

    #[test]
    fn test_result_counts() {
        let mut result = LintResult::new();
        assert!(result.is_clean());
        result.reports.push(TargetReport::new("a.yaml", Vec::new()));
        result
            .reports
            .push(TargetReport::new("b.yaml", vec![warning(1, 2, "x")]));
        assert_eq!(result.targets_checked(), 2);
        assert_eq!(result.warning_count(), 1);
        assert!(!result.is_clean());
    }

    #[test]
    fn test_warning_serializes_flat() {
        let json = serde_json::to_string(&warning(1, 2, "x")).unwrap();
        assert_eq!(json, r#"{"line":1,"column":2,"text":"x"}"#);
    }
}
