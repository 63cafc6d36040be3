//! # yaml5-core
//!
//! Restricts YAML documents to YAML5, a JSON5-like subset: flow-only
//! collections, no anchors, aliases or tags, no NaN or infinity, and
//! controlled quoting of strings and object keys.
//!
//! This crate provides:
//!
//! - [`check`], the rule checker over a parsed [`yaml5_syntax::File`]
//! - [`Linter`] for resolving, parsing and checking target files
//! - [`Config`] with its TOML file form
//! - [`Warning`], [`TargetReport`] and [`LintResult`] for findings
//!
//! ## Example
//!
//! ```
//! use yaml5_core::{Config, Linter};
//!
//! let linter = Linter::builder().config(Config::default()).build()?;
//! let warnings = linter.lint_source("inline", "[yes, 'no']")?;
//! assert_eq!(warnings[0].to_string(), "1:2: unquoted strings are not allowed");
//! # Ok::<(), yaml5_core::LintError>(())
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod checker;
mod config;
mod ident;
mod linter;
mod types;

pub use checker::check;
pub use config::{AllowConfig, Config, ConfigError};
pub use ident::{is_valid_identifier, RESERVED_WORDS};
pub use linter::{LintError, Linter, LinterBuilder};
pub use types::{LintResult, TargetReport, Warning};
