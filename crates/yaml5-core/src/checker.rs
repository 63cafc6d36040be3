//! The YAML5 rule checker.
//!
//! A single depth-first pass over a parsed [`File`]. Every node is
//! classified by its variant and the restriction rules for that variant
//! are applied. Warnings are collected in traversal order.
//!
//! The checker keeps a stack of the nodes on the path from the document
//! root to the node being visited. Two rules depend on it:
//!
//! - a `key: value` pair is only legal when its parent is a mapping;
//! - the name of an anchor or alias is exempt from string rules.

use crate::config::Config;
use crate::ident::is_valid_identifier;
use crate::types::Warning;
use tracing::debug;
use yaml5_syntax::{File, Node, NodeKind, Position, QuoteStyle};

/// Checks `file` against the YAML5 rules.
///
/// The tree is only read; the same tree checked twice yields the same
/// warnings.
#[must_use]
pub fn check(file: &File, config: Config) -> Vec<Warning> {
    let warnings = Checker::new(config).run(file);
    debug!(
        documents = file.docs.len(),
        warnings = warnings.len(),
        "checked file"
    );
    warnings
}

struct Checker<'a> {
    config: Config,
    warnings: Vec<Warning>,
    path: Vec<&'a Node>,
}

impl<'a> Checker<'a> {
    fn new(config: Config) -> Self {
        Self {
            config,
            warnings: Vec::new(),
            path: Vec::new(),
        }
    }

    fn run(mut self, file: &'a File) -> Vec<Warning> {
        if let Some(second) = file.docs.get(1) {
            self.warn(second.pos, "found more than one document inside a file");
        }
        for doc in &file.docs {
            self.visit_node(&doc.body);
        }
        self.warnings
    }

    fn warn(&mut self, pos: Position, text: impl Into<String>) {
        self.warnings.push(Warning::new(pos, text));
    }

    /// Parent of the node currently on top of the path.
    fn parent(&self) -> Option<&'a Node> {
        let idx = self.path.len().checked_sub(2)?;
        self.path.get(idx).copied()
    }

    fn visit_node(&mut self, node: &'a Node) {
        self.path.push(node);
        self.dispatch(node);
        self.path.pop();
    }

    fn visit_key(&mut self, node: &'a Node) {
        self.path.push(node);
        match &node.kind {
            NodeKind::String { .. } => self.validate_string(node, true),
            NodeKind::Bool { raw, .. } | NodeKind::Null { raw }
                if matches!(raw.as_str(), "true" | "false" | "null") =>
            {
                self.warn(node.pos, format!("`{raw}` is not a valid ES5.1 object key"));
            }
            _ => self.dispatch(node),
        }
        self.path.pop();
    }

    fn dispatch(&mut self, node: &'a Node) {
        match &node.kind {
            NodeKind::Null { .. }
            | NodeKind::Bool { .. }
            | NodeKind::Integer { .. }
            | NodeKind::Float { .. } => {}
            NodeKind::Nan { .. } => self.warn(node.pos, "NaN value should not be used"),
            NodeKind::Infinity { .. } => {
                self.warn(node.pos, "infinity value should not be used");
            }
            NodeKind::Literal { indicator, .. } => self.warn(
                node.pos,
                format!("literal block scalar '{indicator}' should not be used"),
            ),
            NodeKind::String { .. } => self.validate_string(node, false),
            NodeKind::Alias { name } => {
                self.warn(node.pos, format!("remove {} alias", name_text(name)));
                self.visit_node(name);
            }
            NodeKind::Anchor { name, value } => {
                self.warn(node.pos, format!("remove {} anchor", name_text(name)));
                self.visit_node(name);
                self.visit_node(value);
            }
            NodeKind::Tag { tag, value } => {
                self.warn(node.pos, format!("remove {tag} tag"));
                self.visit_node(value);
            }
            NodeKind::Sequence { flow, items } => {
                if !flow {
                    self.warn(node.pos, "use a flow array syntax instead");
                }
                for item in items {
                    self.visit_node(item);
                }
            }
            NodeKind::Mapping { flow, entries } => {
                if !flow {
                    self.warn(node.pos, "use a flow object syntax {} instead");
                }
                for entry in entries {
                    self.visit_node(entry);
                }
            }
            NodeKind::MappingValue { key, value } => {
                let in_mapping = self
                    .parent()
                    .is_some_and(|p| matches!(p.kind, NodeKind::Mapping { .. }));
                if !in_mapping {
                    self.warn(node.pos, "used a key-value outside of an object");
                }
                self.visit_key(key);
                self.visit_node(value);
            }
            NodeKind::MappingKey { key } => {
                self.warn(node.pos, "don't use ?-style complex mapping key");
                self.visit_node(key);
            }
            NodeKind::Directive { text } => {
                self.warn(node.pos, format!("remove {text} directive"));
            }
        }
    }

    fn validate_string(&mut self, node: &'a Node, is_key: bool) {
        let exempt = self
            .parent()
            .is_some_and(|p| matches!(p.kind, NodeKind::Anchor { .. } | NodeKind::Alias { .. }));
        if exempt {
            return;
        }
        let NodeKind::String { value, style } = &node.kind else {
            return;
        };

        match style {
            QuoteStyle::DoubleQuoted => {}
            QuoteStyle::SingleQuoted => {
                if !self.config.allow.single_quote_strings {
                    self.warn(node.pos, "single quote strings are not allowed");
                }
            }
            QuoteStyle::Unquoted if !is_key => {
                self.warn(node.pos, "unquoted strings are not allowed");
            }
            QuoteStyle::Unquoted => {
                if !self.config.allow.ident_obj_keys {
                    self.warn(node.pos, "unquoted object keys are not allowed");
                } else if !is_valid_identifier(value) {
                    self.warn(
                        node.pos,
                        format!("`{value}` is not a valid ES5.1 object key"),
                    );
                }
            }
        }
    }
}

fn name_text(name: &Node) -> &str {
    name.as_str().unwrap_or_default()
}
