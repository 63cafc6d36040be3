//! Parse errors.

use crate::ast::Position;
use miette::{Diagnostic, SourceSpan};

/// A malformed YAML input.
///
/// Parse errors are hard failures: a document that does not parse is never
/// handed to the checker.
#[derive(Debug, Clone, thiserror::Error, Diagnostic)]
#[error("{message} at {pos}")]
#[diagnostic(code(yaml5::parse))]
pub struct ParseError {
    message: String,
    pos: Position,
    #[label("here")]
    span: SourceSpan,
}

impl ParseError {
    /// Creates an error pointing at `pos`.
    #[must_use]
    pub fn new(message: impl Into<String>, pos: Position) -> Self {
        Self {
            message: message.into(),
            pos,
            span: SourceSpan::from((pos.offset, 0)),
        }
    }

    /// The error message without position.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Where the error was detected.
    #[must_use]
    pub fn position(&self) -> Position {
        self.pos
    }
}

/// Result alias for parser operations.
pub type Result<T> = std::result::Result<T, ParseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_position() {
        let err = ParseError::new("unclosed flow sequence", Position::new(3, 7, 20));
        assert_eq!(err.to_string(), "unclosed flow sequence at 3:7");
        assert_eq!(err.message(), "unclosed flow sequence");
        assert_eq!(err.position().offset, 20);
    }
}
