//! Document tree produced by the parser.
//!
//! The tree keeps the syntactic details a YAML5 checker needs and a
//! general-purpose loader throws away: flow vs block style, quoting style,
//! block scalar indicators, explicit `?` keys, directives, anchor and alias
//! names. Every node carries the position of its first significant
//! character.

use serde::Serialize;

/// Source position of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Position {
    /// Line number (1-indexed).
    pub line: usize,
    /// Column number in characters (1-indexed).
    pub column: usize,
    /// Byte offset from the start of the source (for diagnostics).
    pub offset: usize,
}

impl Position {
    /// Creates a new position.
    #[must_use]
    pub fn new(line: usize, column: usize, offset: usize) -> Self {
        Self {
            line,
            column,
            offset,
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::new(1, 1, 0)
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Quoting style of a string scalar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteStyle {
    /// `'text'`
    SingleQuoted,
    /// `"text"`
    DoubleQuoted,
    /// `text`
    Unquoted,
}

/// A parsed file: one or more documents in source order.
#[derive(Debug, Clone, PartialEq)]
pub struct File {
    /// Documents in source order.
    pub docs: Vec<Document>,
}

/// One YAML document.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Position of the document (the position of its root node).
    pub pos: Position,
    /// Root node.
    pub body: Node,
}

impl Document {
    /// Creates a document rooted at `body`.
    #[must_use]
    pub fn new(body: Node) -> Self {
        Self {
            pos: body.pos,
            body,
        }
    }
}

/// A node of the document tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Position of the node.
    pub pos: Position,
    /// What the node is.
    pub kind: NodeKind,
}

/// The closed set of node variants.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// `null`, `~` or an empty value. `raw` is the literal source text.
    Null {
        /// Literal source text (empty for an absent value).
        raw: String,
    },
    /// `true` / `false` in any of the core-schema spellings.
    Bool {
        /// Resolved value.
        value: bool,
        /// Literal source text.
        raw: String,
    },
    /// Integer literal (decimal, `0x`, `0o`, `0b`).
    Integer {
        /// Literal source text.
        raw: String,
    },
    /// Floating point literal.
    Float {
        /// Literal source text.
        raw: String,
    },
    /// `.nan` and friends.
    Nan {
        /// Literal source text.
        raw: String,
    },
    /// `.inf`, `-.Inf` and friends.
    Infinity {
        /// Literal source text.
        raw: String,
    },
    /// A string scalar.
    String {
        /// Decoded text.
        value: String,
        /// How the string was written.
        style: QuoteStyle,
    },
    /// A `|` or `>` block scalar.
    Literal {
        /// Header indicator exactly as written, e.g. `|`, `|-`, `>+2`.
        indicator: String,
        /// Decoded text.
        value: String,
    },
    /// `*name`; the name is an unquoted string node.
    Alias {
        /// The referenced anchor name.
        name: Box<Node>,
    },
    /// `&name value`; the name is an unquoted string node.
    Anchor {
        /// The anchor name.
        name: Box<Node>,
        /// The anchored value.
        value: Box<Node>,
    },
    /// `!tag value`.
    Tag {
        /// Tag text including its marker, e.g. `!!float`.
        tag: String,
        /// The tagged value.
        value: Box<Node>,
    },
    /// A `[...]` or block (`- item`) sequence.
    Sequence {
        /// `true` for `[...]` syntax.
        flow: bool,
        /// Elements in order.
        items: Vec<Node>,
    },
    /// A `{...}` or multi-entry block mapping.
    ///
    /// Entries are always [`NodeKind::MappingValue`] nodes.
    Mapping {
        /// `true` for `{...}` syntax.
        flow: bool,
        /// Entries in order.
        entries: Vec<Node>,
    },
    /// A `key: value` pair, positioned at its `:`.
    MappingValue {
        /// Key node.
        key: Box<Node>,
        /// Value node.
        value: Box<Node>,
    },
    /// An explicit `? key`, positioned at the `?`.
    MappingKey {
        /// The actual key.
        key: Box<Node>,
    },
    /// A `%` directive line.
    Directive {
        /// Directive text without the `%`, e.g. `YAML 1.1`.
        text: String,
    },
}

impl Node {
    /// Creates a node.
    #[must_use]
    pub fn new(pos: Position, kind: NodeKind) -> Self {
        Self { pos, kind }
    }

    /// Creates an empty null node, used for absent values.
    #[must_use]
    pub fn empty(pos: Position) -> Self {
        Self::new(pos, NodeKind::Null { raw: String::new() })
    }

    /// Short lowercase name of the variant, for logs and test output.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match &self.kind {
            NodeKind::Null { .. } => "null",
            NodeKind::Bool { .. } => "bool",
            NodeKind::Integer { .. } => "integer",
            NodeKind::Float { .. } => "float",
            NodeKind::Nan { .. } => "nan",
            NodeKind::Infinity { .. } => "infinity",
            NodeKind::String { .. } => "string",
            NodeKind::Literal { .. } => "literal",
            NodeKind::Alias { .. } => "alias",
            NodeKind::Anchor { .. } => "anchor",
            NodeKind::Tag { .. } => "tag",
            NodeKind::Sequence { .. } => "sequence",
            NodeKind::Mapping { .. } => "mapping",
            NodeKind::MappingValue { .. } => "mapping-value",
            NodeKind::MappingKey { .. } => "mapping-key",
            NodeKind::Directive { .. } => "directive",
        }
    }

    /// Returns the decoded text if this is a string scalar.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::String { value, .. } => Some(value),
            _ => None,
        }
    }
}
