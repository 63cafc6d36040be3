//! Recursive-descent YAML parser producing the document tree.
//!
//! The parser works directly on the character stream and tracks block
//! indentation itself. Block structure is driven by the column of the
//! first significant character on a line; flow collections nest freely
//! across lines.
//!
//! Two shapes are produced on purpose:
//!
//! - a block mapping with a single entry is returned as a bare
//!   [`NodeKind::MappingValue`], a block mapping with more entries as a
//!   [`NodeKind::Mapping`];
//! - every `%` directive line becomes a document of its own.
//!
//! Block scalars and block sequences are accepted as values inside flow
//! collections, so that a checker can report them instead of the parser
//! refusing the whole file.

use crate::ast::{Document, File, Node, NodeKind, Position, QuoteStyle};
use crate::error::{ParseError, Result};
use crate::scalar::resolve_plain;
use tracing::debug;

/// Maximum nesting of nodes before the parser gives up.
const MAX_DEPTH: usize = 128;

/// Parses `source` into a [`File`].
///
/// # Errors
///
/// Returns a [`ParseError`] if the input is not well-formed YAML.
pub fn parse(source: &str) -> Result<File> {
    let mut parser = Parser::new(source);
    let file = parser.parse_stream()?;
    debug!("parsed {} document(s)", file.docs.len());
    Ok(file)
}

fn is_blank(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r')
}

fn is_blank_or_end(c: Option<char>) -> bool {
    c.map_or(true, |c| is_blank(c) || c == '\n')
}

fn is_flow_indicator(c: char) -> bool {
    matches!(c, ',' | '[' | ']' | '{' | '}')
}

fn next_column(pos: Position) -> Position {
    Position::new(pos.line, pos.column + 1, pos.offset + 1)
}

fn pair(pos: Position, key: Node, value: Node) -> Node {
    Node::new(
        pos,
        NodeKind::MappingValue {
            key: Box::new(key),
            value: Box::new(value),
        },
    )
}

fn unquoted(pos: Position, value: String) -> Node {
    Node::new(
        pos,
        NodeKind::String {
            value,
            style: QuoteStyle::Unquoted,
        },
    )
}

/// Whether a `:` may directly follow this key without a separating space.
fn is_json_like(node: &Node) -> bool {
    match &node.kind {
        NodeKind::String { style, .. } => *style != QuoteStyle::Unquoted,
        NodeKind::Sequence { flow, .. } | NodeKind::Mapping { flow, .. } => *flow,
        NodeKind::MappingKey { key } => is_json_like(key),
        _ => false,
    }
}

#[derive(Debug, Clone, Copy)]
enum Chomping {
    Strip,
    Clip,
    Keep,
}

/// Node properties written before the content.
enum Property {
    Anchor { pos: Position, name: Node },
    Tag { pos: Position, tag: String },
}

#[derive(Default)]
struct Properties(Vec<Property>);

impl Properties {
    fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Wraps `node` so that the first written property is the outermost node.
    fn wrap(self, node: Node) -> Node {
        self.0.into_iter().rev().fold(node, |inner, prop| match prop {
            Property::Anchor { pos, name } => Node::new(
                pos,
                NodeKind::Anchor {
                    name: Box::new(name),
                    value: Box::new(inner),
                },
            ),
            Property::Tag { pos, tag } => Node::new(
                pos,
                NodeKind::Tag {
                    tag,
                    value: Box::new(inner),
                },
            ),
        })
    }
}

/// Content read before it is known whether it is a key.
enum Atom {
    Node(Node),
    Plain { pos: Position, text: String },
}

impl Atom {
    fn into_node(self) -> Node {
        match self {
            Self::Node(node) => node,
            Self::Plain { pos, text } => Node::new(pos, resolve_plain(&text)),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Mark {
    index: usize,
    line: usize,
    col: usize,
    byte: usize,
}

struct Parser {
    chars: Vec<char>,
    mark: Mark,
    flow_depth: usize,
    depth: usize,
}

impl Parser {
    fn new(source: &str) -> Self {
        let chars: Vec<char> = source.chars().collect();
        let mut mark = Mark {
            index: 0,
            line: 1,
            col: 0,
            byte: 0,
        };
        if chars.first() == Some(&'\u{feff}') {
            mark.index = 1;
            mark.byte = '\u{feff}'.len_utf8();
        }
        Self {
            chars,
            mark,
            flow_depth: 0,
            depth: 0,
        }
    }

    // === Cursor ===

    fn peek(&self) -> Option<char> {
        self.chars.get(self.mark.index).copied()
    }

    fn peek_at(&self, n: usize) -> Option<char> {
        self.chars.get(self.mark.index + n).copied()
    }

    fn prev(&self) -> Option<char> {
        self.mark
            .index
            .checked_sub(1)
            .and_then(|i| self.chars.get(i).copied())
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.mark.index += 1;
        self.mark.byte += c.len_utf8();
        if c == '\n' {
            self.mark.line += 1;
            self.mark.col = 0;
        } else {
            self.mark.col += 1;
        }
        Some(c)
    }

    fn bump_n(&mut self, n: usize) {
        for _ in 0..n {
            self.bump();
        }
    }

    fn is_eof(&self) -> bool {
        self.mark.index >= self.chars.len()
    }

    fn col(&self) -> usize {
        self.mark.col
    }

    fn position(&self) -> Position {
        Position::new(self.mark.line, self.mark.col + 1, self.mark.byte)
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError::new(message, self.position())
    }

    fn unexpected(&self) -> ParseError {
        match self.peek() {
            Some(c) => self.error(format!("unexpected character '{}'", c.escape_default())),
            None => self.error("unexpected end of input"),
        }
    }

    // === Trivia ===

    fn skip_blanks(&mut self) {
        while self.peek().is_some_and(is_blank) {
            self.bump();
        }
    }

    fn at_comment(&self) -> bool {
        self.peek() == Some('#') && self.prev().map_or(true, |c| is_blank(c) || c == '\n')
    }

    fn skip_comment(&mut self) {
        if self.at_comment() {
            while self.peek().is_some_and(|c| c != '\n') {
                self.bump();
            }
        }
    }

    /// Skips blanks, comments and line breaks.
    fn skip_trivia(&mut self) {
        loop {
            self.skip_blanks();
            self.skip_comment();
            if self.peek() == Some('\n') {
                self.bump();
            } else {
                break;
            }
        }
    }

    /// Skips trivia before block content and rejects tab indentation.
    fn skip_block_trivia(&mut self) -> Result<()> {
        self.skip_trivia();
        if self.flow_depth > 0 || self.is_eof() {
            return Ok(());
        }
        let indent = &self.chars[self.mark.index - self.col()..self.mark.index];
        if indent.contains(&'\t') && indent.iter().all(|&c| is_blank(c)) {
            return Err(self.error("tabs are not allowed for indentation"));
        }
        Ok(())
    }

    /// Nothing but an optional comment remains on the current line.
    fn at_line_end(&self) -> bool {
        matches!(self.peek(), None | Some('\n')) || self.at_comment()
    }

    fn at_marker(&self, c: char) -> bool {
        self.col() == 0
            && (0..3).all(|i| self.peek_at(i) == Some(c))
            && is_blank_or_end(self.peek_at(3))
    }

    fn at_document_marker(&self) -> bool {
        self.at_marker('-') || self.at_marker('.')
    }

    /// End of the current block collection regardless of indentation.
    fn at_block_end(&self) -> bool {
        self.is_eof()
            || self.at_document_marker()
            || (self.flow_depth > 0 && matches!(self.peek(), Some(',' | ']' | '}')))
    }

    fn at_explicit_key(&self) -> bool {
        self.peek() == Some('?') && self.indicator_followed_by_separator()
    }

    fn at_sequence_entry(&self) -> bool {
        self.peek() == Some('-') && is_blank_or_end(self.peek_at(1))
    }

    /// The indicator under the cursor is followed by a blank, the end of a
    /// line or, inside flow collections, a flow indicator.
    fn indicator_followed_by_separator(&self) -> bool {
        let next = self.peek_at(1);
        is_blank_or_end(next) || (self.flow_depth > 0 && next.is_some_and(is_flow_indicator))
    }

    /// Requires the rest of the line to be blank, unless `line` was left.
    fn finish_line(&mut self, line: usize) -> Result<()> {
        if self.mark.line != line || self.col() == 0 {
            return Ok(());
        }
        self.skip_blanks();
        if self.at_line_end() || self.at_block_end() {
            return Ok(());
        }
        if self.peek() == Some(':') {
            Err(self.error("mapping values are not allowed in this context"))
        } else {
            Err(self.error("unexpected content after value"))
        }
    }

    fn descend(&mut self) -> Result<()> {
        if self.depth >= MAX_DEPTH {
            return Err(self.error("nesting too deep"));
        }
        self.depth += 1;
        Ok(())
    }

    // === Stream and documents ===

    fn parse_stream(&mut self) -> Result<File> {
        let mut docs = Vec::new();
        loop {
            self.skip_block_trivia()?;
            if self.is_eof() {
                break;
            }
            if self.col() == 0 && self.peek() == Some('%') {
                docs.push(Document::new(self.parse_directive()));
                continue;
            }
            if self.at_marker('.') {
                self.bump_n(3);
                self.skip_blanks();
                if !self.at_line_end() {
                    return Err(self.error("unexpected content after document end marker"));
                }
                continue;
            }

            let start = self.position();
            let explicit = self.at_marker('-');
            if explicit {
                self.bump_n(3);
                self.skip_blanks();
            }
            let body = if explicit && !self.at_line_end() {
                self.parse_block_node(None, false)?
            } else {
                self.skip_block_trivia()?;
                if self.at_block_end() || (self.col() == 0 && self.peek() == Some('%')) {
                    Node::empty(start)
                } else {
                    self.parse_block_node(None, false)?
                }
            };

            self.skip_trivia();
            if !self.is_eof() && !self.at_document_marker() {
                return Err(self.error("expected the end of the document"));
            }
            debug!(
                line = body.pos.line,
                kind = body.kind_name(),
                "parsed document"
            );
            docs.push(Document::new(body));
        }

        if docs.is_empty() {
            docs.push(Document::new(Node::empty(Position::default())));
        }
        Ok(File { docs })
    }

    fn parse_directive(&mut self) -> Node {
        let pos = self.position();
        self.bump();
        let mut text = String::new();
        while let Some(c) = self.peek() {
            if c == '\n' || self.at_comment() {
                break;
            }
            text.push(c);
            self.bump();
        }
        self.skip_comment();
        Node::new(
            pos,
            NodeKind::Directive {
                text: text.trim().to_string(),
            },
        )
    }

    // === Block context ===

    /// Whether the cursor is deeper than the enclosing block collection.
    fn deeper_than(&self, parent: Option<usize>) -> bool {
        parent.map_or(true, |p| self.col() > p)
    }

    /// Parses a node whose first character is under the cursor.
    ///
    /// `parent` is the indentation of the enclosing block collection
    /// (`None` at the document root). With `inline`, the node follows a
    /// `key:` on the same line and cannot open a block collection.
    fn parse_block_node(&mut self, parent: Option<usize>, inline: bool) -> Result<Node> {
        self.descend()?;
        let node = self.parse_block_content(parent, inline);
        self.depth -= 1;
        node
    }

    fn parse_block_content(&mut self, parent: Option<usize>, inline: bool) -> Result<Node> {
        let start_col = self.col();
        let props = self.parse_properties()?;

        if !props.is_empty() && self.at_line_end() {
            let after = self.position();
            self.skip_block_trivia()?;
            let content = if !self.at_block_end() && self.deeper_than(parent) {
                self.parse_block_node(parent, false)?
            } else {
                Node::empty(after)
            };
            return Ok(props.wrap(content));
        }

        match self.peek() {
            Some('-') if !inline && self.at_sequence_entry() => {
                let indent = self.col();
                Ok(props.wrap(self.parse_block_sequence(indent)?))
            }
            Some('?') if !inline && self.at_explicit_key() => {
                let indent = self.col();
                Ok(props.wrap(self.parse_block_mapping(indent, None)?))
            }
            Some('|' | '>') => Ok(props.wrap(self.parse_block_scalar(parent)?)),
            _ => {
                let atom = self.parse_atom()?;
                if !inline && self.block_mapping_indicator_ahead() {
                    let key = props.wrap(atom.into_node());
                    return self.parse_block_mapping(start_col, Some(key));
                }
                let node = match atom {
                    Atom::Node(node) => node,
                    Atom::Plain { pos, text } => {
                        let text = self.continue_plain(text, parent);
                        Node::new(pos, resolve_plain(&text))
                    }
                };
                Ok(props.wrap(node))
            }
        }
    }

    /// Parses a scalar, alias or flow collection. Plain scalars are read up
    /// to the end of the current line only.
    fn parse_atom(&mut self) -> Result<Atom> {
        let node = match self.peek() {
            Some('[') => self.parse_flow_sequence()?,
            Some('{') => self.parse_flow_mapping()?,
            Some('"') => self.parse_double_quoted()?,
            Some('\'') => self.parse_single_quoted()?,
            Some('*') => self.parse_alias()?,
            _ if self.can_start_plain() => {
                let pos = self.position();
                let text = self.scan_plain_line();
                return Ok(Atom::Plain { pos, text });
            }
            _ => return Err(self.unexpected()),
        };
        Ok(Atom::Node(node))
    }

    fn block_mapping_indicator_ahead(&mut self) -> bool {
        let save = self.mark;
        self.skip_blanks();
        let found = self.peek() == Some(':') && self.indicator_followed_by_separator();
        self.mark = save;
        found
    }

    /// Parses the value after the `-`, `?` or `:` indicator at `indicator`.
    ///
    /// With `indentless`, a sequence starting on a following line at the
    /// collection's own indentation belongs to this value.
    fn parse_block_value(
        &mut self,
        indent: usize,
        indicator: Position,
        indentless: bool,
        inline: bool,
    ) -> Result<Node> {
        self.skip_blanks();
        if !self.at_line_end() {
            let line = self.mark.line;
            let node = self.parse_block_node(Some(indent), inline)?;
            self.finish_line(line)?;
            return Ok(node);
        }

        let empty = Node::empty(next_column(indicator));
        self.skip_block_trivia()?;
        if self.at_block_end() {
            return Ok(empty);
        }
        let col = self.col();
        if col > indent {
            return self.parse_block_node(Some(indent), false);
        }
        if col == indent && indentless && self.at_sequence_entry() {
            return self.parse_block_sequence(col);
        }
        Ok(empty)
    }

    fn parse_block_sequence(&mut self, indent: usize) -> Result<Node> {
        let start = self.position();
        let mut items = Vec::new();
        loop {
            let dash = self.position();
            self.bump();
            items.push(self.parse_block_value(indent, dash, false, false)?);

            self.skip_block_trivia()?;
            if self.at_block_end() {
                break;
            }
            let col = self.col();
            if col == indent && self.at_sequence_entry() {
                continue;
            }
            if col > indent {
                return Err(self.error("bad indentation of a sequence entry"));
            }
            break;
        }
        Ok(Node::new(start, NodeKind::Sequence { flow: false, items }))
    }

    fn parse_block_mapping(&mut self, indent: usize, first_key: Option<Node>) -> Result<Node> {
        let mut entries = Vec::new();
        let mut pending = first_key;
        loop {
            let entry = if let Some(key) = pending.take() {
                self.parse_block_implicit_entry(indent, key)?
            } else if self.at_explicit_key() {
                self.parse_block_explicit_entry(indent)?
            } else {
                let key = self.parse_block_key()?;
                self.parse_block_implicit_entry(indent, key)?
            };
            entries.push(entry);

            self.skip_block_trivia()?;
            if self.at_block_end() {
                break;
            }
            let col = self.col();
            if col < indent {
                break;
            }
            if col > indent {
                return Err(self.error("bad indentation of a mapping entry"));
            }
            if self.at_sequence_entry() {
                return Err(self.error("block sequence entries are not allowed in this context"));
            }
        }

        if entries.len() == 1 {
            return Ok(entries.remove(0));
        }
        let pos = entries[0].pos;
        Ok(Node::new(
            pos,
            NodeKind::Mapping {
                flow: false,
                entries,
            },
        ))
    }

    fn parse_block_key(&mut self) -> Result<Node> {
        let props = self.parse_properties()?;
        let atom = self.parse_atom()?;
        Ok(props.wrap(atom.into_node()))
    }

    fn parse_block_implicit_entry(&mut self, indent: usize, key: Node) -> Result<Node> {
        self.skip_blanks();
        if self.peek() != Some(':') {
            return Err(self.error("could not find expected ':'"));
        }
        let colon = self.position();
        self.bump();
        let value = self.parse_block_value(indent, colon, true, true)?;
        Ok(pair(colon, key, value))
    }

    fn parse_block_explicit_entry(&mut self, indent: usize) -> Result<Node> {
        let question = self.position();
        self.bump();
        let inner = self.parse_block_value(indent, question, false, false)?;
        let key = Node::new(
            question,
            NodeKind::MappingKey {
                key: Box::new(inner),
            },
        );

        self.skip_block_trivia()?;
        if !self.at_block_end()
            && self.col() == indent
            && self.peek() == Some(':')
            && self.indicator_followed_by_separator()
        {
            let colon = self.position();
            self.bump();
            let value = self.parse_block_value(indent, colon, true, false)?;
            return Ok(pair(colon, key, value));
        }
        Ok(pair(question, key, Node::empty(next_column(question))))
    }

    // === Block scalars ===

    fn parse_block_scalar(&mut self, parent: Option<usize>) -> Result<Node> {
        let start = self.position();
        let folded = self.peek() == Some('>');
        let mut indicator = String::new();
        if let Some(c) = self.bump() {
            indicator.push(c);
        }

        let mut chomping = Chomping::Clip;
        let mut explicit = None;
        for _ in 0..2 {
            match self.peek() {
                Some('-') => chomping = Chomping::Strip,
                Some('+') => chomping = Chomping::Keep,
                Some(c @ '1'..='9') => {
                    explicit = c.to_digit(10).and_then(|d| usize::try_from(d).ok());
                }
                _ => break,
            }
            if let Some(c) = self.bump() {
                indicator.push(c);
            }
        }

        self.skip_blanks();
        if !self.at_line_end() {
            return Err(self.error("invalid block scalar header"));
        }
        self.skip_comment();
        self.bump();

        let base = parent.map_or(0, |p| p + 1);
        let indent = match explicit {
            Some(m) => base + m - 1,
            None => self.detect_block_indent(base),
        };
        let lines = self.collect_block_lines(indent);
        let value = fold_block_lines(&lines, folded, chomping);
        Ok(Node::new(start, NodeKind::Literal { indicator, value }))
    }

    /// Indentation of the first non-empty line, at least `base`.
    fn detect_block_indent(&mut self, base: usize) -> usize {
        let save = self.mark;
        let mut indent = base;
        while !self.is_eof() {
            let mut spaces = 0;
            while self.peek() == Some(' ') {
                self.bump();
                spaces += 1;
            }
            self.skip_blanks();
            match self.peek() {
                None => break,
                Some('\n') => {
                    self.bump();
                }
                Some(_) => {
                    indent = spaces.max(base);
                    break;
                }
            }
        }
        self.mark = save;
        indent
    }

    /// Collects the lines of a block scalar with their indentation removed.
    /// Leaves the cursor at the start of the first line that is not part of it.
    fn collect_block_lines(&mut self, indent: usize) -> Vec<String> {
        let mut lines = Vec::new();
        while !self.is_eof() {
            let line_start = self.mark;
            let mut spaces = 0;
            while spaces < indent && self.peek() == Some(' ') {
                self.bump();
                spaces += 1;
            }

            let after_indent = self.mark;
            self.skip_blanks();
            if matches!(self.peek(), None | Some('\n')) {
                lines.push(String::new());
                self.bump();
                continue;
            }
            self.mark = after_indent;

            if spaces < indent || self.at_document_marker() {
                self.mark = line_start;
                break;
            }

            let mut text = String::new();
            while let Some(c) = self.peek() {
                if c == '\n' {
                    break;
                }
                text.push(c);
                self.bump();
            }
            lines.push(text.trim_end_matches('\r').to_string());
            self.bump();
        }
        lines
    }

    // === Plain scalars ===

    fn can_start_plain(&self) -> bool {
        match self.peek() {
            None => false,
            Some('-' | '?' | ':') => !self.indicator_followed_by_separator(),
            Some(
                ',' | '[' | ']' | '{' | '}' | '#' | '&' | '*' | '!' | '|' | '>' | '\'' | '"' | '%'
                | '@' | '`',
            ) => false,
            Some(c) => !is_blank(c) && c != '\n',
        }
    }

    /// Reads one line of a plain scalar, stopping before `: `, ` #`, the
    /// line break and, inside flow collections, flow indicators.
    fn scan_plain_line(&mut self) -> String {
        let mut text = String::new();
        while let Some(c) = self.peek() {
            if c == '\n'
                || (c == ':' && self.indicator_followed_by_separator())
                || self.at_comment()
                || (self.flow_depth > 0 && is_flow_indicator(c))
            {
                break;
            }
            text.push(c);
            self.bump();
        }
        let len = text.trim_end_matches(is_blank).len();
        text.truncate(len);
        text
    }

    /// Folds continuation lines into a plain scalar whose first line is `text`.
    fn continue_plain(&mut self, mut text: String, parent: Option<usize>) -> String {
        loop {
            let save = self.mark;
            self.skip_blanks();
            if self.peek() != Some('\n') {
                self.mark = save;
                break;
            }

            let mut breaks = 0;
            while self.peek() == Some('\n') {
                self.bump();
                breaks += 1;
                self.skip_blanks();
            }

            let stop = self.is_eof()
                || self.at_document_marker()
                || self.at_comment()
                || (self.flow_depth == 0 && !self.deeper_than(parent))
                || !self.can_start_plain();
            if stop {
                self.mark = save;
                break;
            }

            let line = self.scan_plain_line();
            if line.is_empty() {
                self.mark = save;
                break;
            }
            if breaks == 1 {
                text.push(' ');
            } else {
                text.extend(std::iter::repeat('\n').take(breaks - 1));
            }
            text.push_str(&line);
        }
        text
    }

    // === Quoted scalars ===

    fn parse_double_quoted(&mut self) -> Result<Node> {
        let start = self.position();
        self.bump();
        let mut value = String::new();
        // Escaped content is never trimmed by line folding.
        let mut kept = 0;
        loop {
            match self.peek() {
                None => {
                    return Err(ParseError::new(
                        "unterminated double-quoted string",
                        start,
                    ))
                }
                Some('"') => {
                    self.bump();
                    break;
                }
                Some('\\') => {
                    self.bump();
                    self.scan_escape(&mut value, start)?;
                    kept = value.len();
                }
                Some('\n') => self.fold_quoted_break(&mut value, kept),
                Some(c) => {
                    value.push(c);
                    self.bump();
                }
            }
        }
        Ok(Node::new(
            start,
            NodeKind::String {
                value,
                style: QuoteStyle::DoubleQuoted,
            },
        ))
    }

    fn scan_escape(&mut self, value: &mut String, start: Position) -> Result<()> {
        let pos = self.position();
        let Some(esc) = self.bump() else {
            return Err(ParseError::new("unterminated double-quoted string", start));
        };
        let c = match esc {
            '\n' => {
                self.skip_blanks();
                return Ok(());
            }
            '\r' if self.peek() == Some('\n') => {
                self.bump();
                self.skip_blanks();
                return Ok(());
            }
            'x' => self.scan_hex_escape(2, pos)?,
            'u' => self.scan_hex_escape(4, pos)?,
            'U' => self.scan_hex_escape(8, pos)?,
            '0' => '\0',
            'a' => '\u{7}',
            'b' => '\u{8}',
            't' | '\t' => '\t',
            'n' => '\n',
            'v' => '\u{b}',
            'f' => '\u{c}',
            'r' => '\r',
            'e' => '\u{1b}',
            ' ' => ' ',
            '"' => '"',
            '/' => '/',
            '\\' => '\\',
            'N' => '\u{85}',
            '_' => '\u{a0}',
            'L' => '\u{2028}',
            'P' => '\u{2029}',
            other => {
                return Err(ParseError::new(
                    format!("invalid escape sequence '\\{}'", other.escape_default()),
                    pos,
                ))
            }
        };
        value.push(c);
        Ok(())
    }

    fn scan_hex_escape(&mut self, digits: usize, pos: Position) -> Result<char> {
        let mut code = 0u32;
        for _ in 0..digits {
            let digit = self
                .peek()
                .and_then(|c| c.to_digit(16))
                .ok_or_else(|| ParseError::new("invalid hexadecimal escape", pos))?;
            code = code * 16 + digit;
            self.bump();
        }
        char::from_u32(code).ok_or_else(|| ParseError::new("invalid unicode escape", pos))
    }

    fn parse_single_quoted(&mut self) -> Result<Node> {
        let start = self.position();
        self.bump();
        let mut value = String::new();
        let mut kept = 0;
        loop {
            match self.peek() {
                None => {
                    return Err(ParseError::new(
                        "unterminated single-quoted string",
                        start,
                    ))
                }
                Some('\'') if self.peek_at(1) == Some('\'') => {
                    value.push('\'');
                    self.bump_n(2);
                    kept = value.len();
                }
                Some('\'') => {
                    self.bump();
                    break;
                }
                Some('\n') => self.fold_quoted_break(&mut value, kept),
                Some(c) => {
                    value.push(c);
                    self.bump();
                }
            }
        }
        Ok(Node::new(
            start,
            NodeKind::String {
                value,
                style: QuoteStyle::SingleQuoted,
            },
        ))
    }

    /// Folds a line break inside a quoted scalar: one break becomes a space,
    /// every further empty line a newline.
    fn fold_quoted_break(&mut self, value: &mut String, kept: usize) {
        let len = kept + value[kept..].trim_end_matches(is_blank).len();
        value.truncate(len);
        let mut breaks = 0;
        while self.peek() == Some('\n') {
            self.bump();
            breaks += 1;
            self.skip_blanks();
        }
        if breaks == 1 {
            value.push(' ');
        } else {
            value.extend(std::iter::repeat('\n').take(breaks - 1));
        }
    }

    // === Properties and aliases ===

    fn scan_name(&mut self) -> String {
        let mut name = String::new();
        while let Some(c) = self.peek() {
            if is_blank(c) || c == '\n' || is_flow_indicator(c) {
                break;
            }
            name.push(c);
            self.bump();
        }
        name
    }

    fn scan_tag(&mut self) -> Result<String> {
        let start = self.position();
        let mut tag = String::new();
        if let Some(c) = self.bump() {
            tag.push(c);
        }
        if self.peek() == Some('<') {
            while let Some(c) = self.peek() {
                if c == '\n' {
                    break;
                }
                tag.push(c);
                self.bump();
                if c == '>' {
                    return Ok(tag);
                }
            }
            return Err(ParseError::new("unterminated verbatim tag", start));
        }
        tag.push_str(&self.scan_name());
        Ok(tag)
    }

    fn parse_properties(&mut self) -> Result<Properties> {
        let mut props = Properties::default();
        loop {
            let pos = self.position();
            match self.peek() {
                Some('&') => {
                    self.bump();
                    let name_pos = self.position();
                    let name = self.scan_name();
                    if name.is_empty() {
                        return Err(ParseError::new("anchor name is empty", pos));
                    }
                    props.0.push(Property::Anchor {
                        pos,
                        name: unquoted(name_pos, name),
                    });
                }
                Some('!') => {
                    let tag = self.scan_tag()?;
                    props.0.push(Property::Tag { pos, tag });
                }
                _ => break,
            }
            self.skip_blanks();
        }
        Ok(props)
    }

    fn parse_alias(&mut self) -> Result<Node> {
        let pos = self.position();
        self.bump();
        let name_pos = self.position();
        let name = self.scan_name();
        if name.is_empty() {
            return Err(ParseError::new("alias name is empty", pos));
        }
        Ok(Node::new(
            pos,
            NodeKind::Alias {
                name: Box::new(unquoted(name_pos, name)),
            },
        ))
    }

    // === Flow context ===

    fn parse_flow_node(&mut self) -> Result<Node> {
        self.descend()?;
        let node = self.parse_flow_content();
        self.depth -= 1;
        node
    }

    fn parse_flow_content(&mut self) -> Result<Node> {
        let props = self.parse_properties()?;
        if !props.is_empty() {
            self.skip_trivia();
            if matches!(self.peek(), None | Some(',' | ']' | '}'))
                || (self.peek() == Some(':') && self.indicator_followed_by_separator())
            {
                return Ok(props.wrap(Node::empty(self.position())));
            }
        }

        let node = match self.peek() {
            Some('[') => self.parse_flow_sequence()?,
            Some('{') => self.parse_flow_mapping()?,
            Some('"') => self.parse_double_quoted()?,
            Some('\'') => self.parse_single_quoted()?,
            Some('*') => self.parse_alias()?,
            Some('|' | '>') => self.parse_block_scalar(Some(0))?,
            Some('-') if self.at_sequence_entry() => {
                let indent = self.col();
                self.parse_block_sequence(indent)?
            }
            _ if self.can_start_plain() => {
                let pos = self.position();
                let first = self.scan_plain_line();
                let text = self.continue_plain(first, None);
                Node::new(pos, resolve_plain(&text))
            }
            _ => return Err(self.unexpected()),
        };
        Ok(props.wrap(node))
    }

    /// Consumes a `:` value indicator following `key`, if there is one.
    ///
    /// With `multiline`, the indicator may follow on a later line.
    fn flow_value_indicator(&mut self, key: &Node, multiline: bool) -> Option<Position> {
        let save = self.mark;
        if multiline {
            self.skip_trivia();
        } else {
            self.skip_blanks();
        }
        if self.peek() == Some(':')
            && (self.indicator_followed_by_separator() || is_json_like(key))
        {
            let pos = self.position();
            self.bump();
            return Some(pos);
        }
        self.mark = save;
        None
    }

    fn parse_flow_value(&mut self, colon: Position) -> Result<Node> {
        self.skip_trivia();
        if matches!(self.peek(), None | Some(',' | ']' | '}')) {
            return Ok(Node::empty(next_column(colon)));
        }
        self.parse_flow_node()
    }

    fn parse_flow_sequence(&mut self) -> Result<Node> {
        let start = self.position();
        self.bump();
        self.flow_depth += 1;
        let mut items = Vec::new();
        loop {
            self.skip_trivia();
            match self.peek() {
                None => return Err(ParseError::new("unclosed flow sequence", start)),
                Some(']') => {
                    self.bump();
                    break;
                }
                Some(_) => {}
            }

            items.push(self.parse_flow_sequence_entry()?);

            self.skip_trivia();
            match self.peek() {
                Some(',') => {
                    self.bump();
                }
                Some(']') => {}
                None => return Err(ParseError::new("unclosed flow sequence", start)),
                Some(_) => return Err(self.error("expected ',' or ']' in flow sequence")),
            }
        }
        self.flow_depth -= 1;
        Ok(Node::new(start, NodeKind::Sequence { flow: true, items }))
    }

    fn parse_flow_sequence_entry(&mut self) -> Result<Node> {
        if self.at_explicit_key() {
            return self.parse_flow_explicit_entry();
        }
        let node = self.parse_flow_node()?;
        match self.flow_value_indicator(&node, false) {
            Some(colon) => {
                let value = self.parse_flow_value(colon)?;
                Ok(pair(colon, node, value))
            }
            None => Ok(node),
        }
    }

    fn parse_flow_mapping(&mut self) -> Result<Node> {
        let start = self.position();
        self.bump();
        self.flow_depth += 1;
        let mut entries = Vec::new();
        loop {
            self.skip_trivia();
            match self.peek() {
                None => return Err(ParseError::new("unclosed flow mapping", start)),
                Some('}') => {
                    self.bump();
                    break;
                }
                Some(_) => {}
            }

            entries.push(self.parse_flow_mapping_entry()?);

            self.skip_trivia();
            match self.peek() {
                Some(',') => {
                    self.bump();
                }
                Some('}') => {}
                None => return Err(ParseError::new("unclosed flow mapping", start)),
                Some(_) => return Err(self.error("expected ',' or '}' in flow mapping")),
            }
        }
        self.flow_depth -= 1;
        Ok(Node::new(
            start,
            NodeKind::Mapping {
                flow: true,
                entries,
            },
        ))
    }

    fn parse_flow_mapping_entry(&mut self) -> Result<Node> {
        if self.at_explicit_key() {
            return self.parse_flow_explicit_entry();
        }
        let key = if self.peek() == Some(':') && self.indicator_followed_by_separator() {
            Node::empty(self.position())
        } else {
            self.parse_flow_node()?
        };
        match self.flow_value_indicator(&key, true) {
            Some(colon) => {
                let value = self.parse_flow_value(colon)?;
                Ok(pair(colon, key, value))
            }
            None => {
                let pos = key.pos;
                Ok(pair(pos, key, Node::empty(pos)))
            }
        }
    }

    fn parse_flow_explicit_entry(&mut self) -> Result<Node> {
        let question = self.position();
        self.bump();
        self.skip_trivia();
        let inner = if matches!(self.peek(), None | Some(',' | ']' | '}'))
            || (self.peek() == Some(':') && self.indicator_followed_by_separator())
        {
            Node::empty(self.position())
        } else {
            self.parse_flow_node()?
        };
        let key = Node::new(
            question,
            NodeKind::MappingKey {
                key: Box::new(inner),
            },
        );
        match self.flow_value_indicator(&key, true) {
            Some(colon) => {
                let value = self.parse_flow_value(colon)?;
                Ok(pair(colon, key, value))
            }
            None => Ok(pair(question, key, Node::empty(next_column(question)))),
        }
    }
}

/// Builds the value of a block scalar from its de-indented lines.
fn fold_block_lines(lines: &[String], folded: bool, chomping: Chomping) -> String {
    let content_end = lines
        .iter()
        .rposition(|line| !line.is_empty())
        .map_or(0, |i| i + 1);
    let (body, trailing) = lines.split_at(content_end);

    let mut out = String::new();
    if folded {
        let mut breaks = 0;
        let mut first = true;
        let mut prev_more_indented = false;
        for line in body {
            if line.is_empty() {
                breaks += 1;
                continue;
            }
            let more_indented = line.starts_with([' ', '\t']);
            if first {
                out.extend(std::iter::repeat('\n').take(breaks));
            } else if more_indented || prev_more_indented {
                out.extend(std::iter::repeat('\n').take(breaks + 1));
            } else if breaks == 0 {
                out.push(' ');
            } else {
                out.extend(std::iter::repeat('\n').take(breaks));
            }
            out.push_str(line);
            breaks = 0;
            first = false;
            prev_more_indented = more_indented;
        }
    } else {
        out = body.join("\n");
    }

    match chomping {
        Chomping::Strip => {}
        Chomping::Clip => {
            if !body.is_empty() {
                out.push('\n');
            }
        }
        Chomping::Keep => {
            if !body.is_empty() {
                out.push('\n');
            }
            out.extend(std::iter::repeat('\n').take(trailing.len()));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root(src: &str) -> Node {
        let file = parse(src).expect("Failed to parse");
        assert_eq!(file.docs.len(), 1, "expected a single document");
        file.docs.into_iter().next().map(|d| d.body).unwrap()
    }

    fn string(node: &Node) -> (&str, QuoteStyle) {
        match &node.kind {
            NodeKind::String { value, style } => (value.as_str(), *style),
            other => panic!("expected string, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_flow_mapping() {
        let node = root(r#"{"a": 1, b: 'x'}"#);
        let NodeKind::Mapping { flow, entries } = &node.kind else {
            panic!("expected mapping");
        };
        assert!(flow);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].pos, Position::new(1, 5, 4));
        let NodeKind::MappingValue { key, value } = &entries[1].kind else {
            panic!("expected mapping value");
        };
        assert_eq!(string(key), ("b", QuoteStyle::Unquoted));
        assert_eq!(string(value), ("x", QuoteStyle::SingleQuoted));
    }

    #[test]
    fn test_single_entry_block_mapping_is_bare_pair() {
        let node = root("foo: 1\n");
        assert_eq!(node.kind_name(), "mapping-value");
        assert_eq!((node.pos.line, node.pos.column), (1, 4));
    }

    #[test]
    fn test_block_mapping_positioned_at_first_colon() {
        let node = root("bar: 1\nbaz: 2\n");
        let NodeKind::Mapping { flow, entries } = &node.kind else {
            panic!("expected mapping");
        };
        assert!(!flow);
        assert_eq!(entries.len(), 2);
        assert_eq!((node.pos.line, node.pos.column), (1, 4));
    }

    #[test]
    fn test_block_sequence_and_indentless_sequence() {
        let node = root("key:\n- a\n- b\nother: [1]\n");
        let NodeKind::Mapping { entries, .. } = &node.kind else {
            panic!("expected mapping");
        };
        let NodeKind::MappingValue { value, .. } = &entries[0].kind else {
            panic!("expected mapping value");
        };
        let NodeKind::Sequence { flow, items } = &value.kind else {
            panic!("expected sequence");
        };
        assert!(!flow);
        assert_eq!(items.len(), 2);
        assert_eq!((value.pos.line, value.pos.column), (2, 1));
    }

    #[test]
    fn test_compact_mapping_in_sequence() {
        let node = root("- name: a\n  size: 1\n- name: b\n");
        let NodeKind::Sequence { items, .. } = &node.kind else {
            panic!("expected sequence");
        };
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].kind_name(), "mapping");
        assert_eq!(items[1].kind_name(), "mapping-value");
    }

    #[test]
    fn test_pair_inside_flow_sequence() {
        let node = root("[a: 1, 2]");
        let NodeKind::Sequence { items, .. } = &node.kind else {
            panic!("expected sequence");
        };
        assert_eq!(items[0].kind_name(), "mapping-value");
        assert_eq!(items[1].kind_name(), "integer");
    }

    #[test]
    fn test_explicit_keys() {
        let node = root("{? [1, 2]: \"y\", ? true : 'a'}");
        let NodeKind::Mapping { entries, .. } = &node.kind else {
            panic!("expected mapping");
        };
        for (entry, column) in entries.iter().zip([2, 17]) {
            let NodeKind::MappingValue { key, .. } = &entry.kind else {
                panic!("expected mapping value");
            };
            assert_eq!(key.kind_name(), "mapping-key");
            assert_eq!(key.pos.column, column);
        }

        let block = root("? a\n: 1\n? b\n");
        let NodeKind::Mapping { entries, .. } = &block.kind else {
            panic!("expected mapping");
        };
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn test_anchor_alias_and_tag() {
        let node = root("[&a 1, *a, !!str 2]");
        let NodeKind::Sequence { items, .. } = &node.kind else {
            panic!("expected sequence");
        };
        let NodeKind::Anchor { name, value } = &items[0].kind else {
            panic!("expected anchor");
        };
        assert_eq!(string(name), ("a", QuoteStyle::Unquoted));
        assert_eq!(name.pos.column, 3);
        assert_eq!(value.kind_name(), "integer");
        let NodeKind::Alias { name } = &items[1].kind else {
            panic!("expected alias");
        };
        assert_eq!(string(name), ("a", QuoteStyle::Unquoted));
        let NodeKind::Tag { tag, .. } = &items[2].kind else {
            panic!("expected tag");
        };
        assert_eq!(tag, "!!str");
    }

    #[test]
    fn test_anchor_on_block_collection() {
        let node = root("base: &b\n  x: 1\n  y: 2\n");
        let NodeKind::MappingValue { value, .. } = &node.kind else {
            panic!("expected mapping value");
        };
        let NodeKind::Anchor { value: inner, .. } = &value.kind else {
            panic!("expected anchor");
        };
        assert_eq!(inner.kind_name(), "mapping");
    }

    #[test]
    fn test_block_scalars() {
        let node = root("a: |\n  one\n  two\nb: >-\n  folded\n  text\n\nc: 1\n");
        let NodeKind::Mapping { entries, .. } = &node.kind else {
            panic!("expected mapping");
        };
        let values: Vec<(&str, &str)> = entries
            .iter()
            .filter_map(|e| match &e.kind {
                NodeKind::MappingValue { value, .. } => match &value.kind {
                    NodeKind::Literal { indicator, value } => {
                        Some((indicator.as_str(), value.as_str()))
                    }
                    _ => None,
                },
                _ => None,
            })
            .collect();
        assert_eq!(values, vec![("|", "one\ntwo\n"), (">-", "folded text")]);
        assert_eq!(entries.len(), 3);
    }

    #[test]
    fn test_block_scalar_inside_flow_mapping() {
        let node = root("{\n\"a\": |\n    text\n,\n\"b\": 1\n}");
        let NodeKind::Mapping { entries, .. } = &node.kind else {
            panic!("expected mapping");
        };
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn test_quoted_scalars() {
        let node = root(r#"["a\tb\u0041", 'it''s', "line \
  joined", "x
  y"]"#);
        let NodeKind::Sequence { items, .. } = &node.kind else {
            panic!("expected sequence");
        };
        let texts: Vec<&str> = items.iter().map(|n| string(n).0).collect();
        assert_eq!(texts, vec!["a\tbA", "it's", "line joined", "x y"]);
    }

    #[test]
    fn test_multiline_plain_scalar() {
        let node = root("key: first\n  second\n\n  third\n");
        let NodeKind::MappingValue { value, .. } = &node.kind else {
            panic!("expected mapping value");
        };
        assert_eq!(string(value).0, "first second\nthird");
    }

    #[test]
    fn test_directive_forms_its_own_document() {
        let file = parse("%YAML 1.1\n---\n{}").unwrap();
        assert_eq!(file.docs.len(), 2);
        assert_eq!(
            file.docs[0].body.kind,
            NodeKind::Directive {
                text: "YAML 1.1".to_string()
            }
        );
        assert_eq!((file.docs[1].pos.line, file.docs[1].pos.column), (3, 1));
    }

    #[test]
    fn test_multiple_documents() {
        let file = parse("{}\n---\n[]\n...\n--- \"x\"\n").unwrap();
        assert_eq!(file.docs.len(), 3);
        assert_eq!(file.docs[1].pos.line, 3);
        assert_eq!(file.docs[2].body.kind_name(), "string");
    }

    #[test]
    fn test_empty_input() {
        let file = parse("# only a comment\n").unwrap();
        assert_eq!(file.docs.len(), 1);
        assert_eq!(file.docs[0].body, Node::empty(Position::default()));
    }

    #[test]
    fn test_comments_are_skipped() {
        let node = root("{\n  # comment\n  \"a\": 1, # trailing\n}\n");
        let NodeKind::Mapping { entries, .. } = &node.kind else {
            panic!("expected mapping");
        };
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_errors() {
        let cases = [
            ("[1, 2", "unclosed flow sequence"),
            ("{\"a\": 1", "unclosed flow mapping"),
            ("\"abc", "unterminated double-quoted string"),
            ("'abc", "unterminated single-quoted string"),
            ("a: b: c", "mapping values are not allowed in this context"),
            ("a: 1\n  b: 2", "bad indentation of a mapping entry"),
            ("\"\\q\"", "invalid escape sequence '\\q'"),
            ("[&, 1]", "anchor name is empty"),
            ("{} []", "expected the end of the document"),
            ("a:\n\tb: 1", "tabs are not allowed for indentation"),
            ("- 1\n\t- 2", "tabs are not allowed for indentation"),
        ];
        for (src, message) in cases {
            let err = parse(src).expect_err(src);
            assert_eq!(err.message(), message, "{src:?}");
        }
    }

    #[test]
    fn test_nesting_limit() {
        let nested = |n: usize| format!("{}{}", "[".repeat(n), "]".repeat(n));
        assert!(parse(&nested(100)).is_ok());

        let err = parse(&nested(20_000)).unwrap_err();
        assert_eq!(err.message(), "nesting too deep");
        assert_eq!((err.position().line, err.position().column), (1, 129));

        let err = parse(&"- ".repeat(500)).unwrap_err();
        assert_eq!(err.message(), "nesting too deep");
    }

    #[test]
    fn test_tabs_as_separation() {
        let node = root("{\t\"a\":\t1}\n\t# comment\n");
        assert_eq!(node.kind_name(), "mapping");
        assert_eq!(root("a:\t1").kind_name(), "mapping-value");
    }

    #[test]
    fn test_error_position() {
        let err = parse("{\n  \"a\": 1\n  \"b\": 2\n}").unwrap_err();
        assert_eq!(err.message(), "expected ',' or '}' in flow mapping");
        assert_eq!((err.position().line, err.position().column), (3, 3));
    }
}
