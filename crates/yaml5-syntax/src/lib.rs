//! # yaml5-syntax
//!
//! YAML parser producing a tree that keeps the details a YAML5 checker
//! cares about: flow or block style, quoting, block scalar indicators,
//! explicit `?` keys, anchors, aliases, tags and directives.
//!
//! ## Example
//!
//! ```
//! use yaml5_syntax::{parse, NodeKind};
//!
//! let file = parse("{\"a\": [1, 2]}").unwrap();
//! assert!(matches!(file.docs[0].body.kind, NodeKind::Mapping { flow: true, .. }));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod ast;
mod error;
mod parser;
mod scalar;

pub use ast::{Document, File, Node, NodeKind, Position, QuoteStyle};
pub use error::{ParseError, Result};
pub use parser::parse;
pub use scalar::resolve_plain;
