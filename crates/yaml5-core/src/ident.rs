//! ES5.1 identifier rules for unquoted object keys.

/// Words that cannot be used as unquoted keys: the `null`, `true` and
/// `false` literals, the ES5.1 future reserved words and the keywords.
pub const RESERVED_WORDS: &[&str] = &[
    // Literals
    "null",
    "true",
    "false",
    // FutureReservedWord
    "class",
    "enum",
    "extends",
    "super",
    "const",
    "export",
    "import",
    // Keyword
    "break",
    "case",
    "catch",
    "continue",
    "debugger",
    "default",
    "delete",
    "do",
    "else",
    "finally",
    "for",
    "function",
    "if",
    "in",
    "instanceof",
    "new",
    "return",
    "switch",
    "this",
    "throw",
    "try",
    "typeof",
    "var",
    "void",
    "while",
    "with",
];

/// Returns true if `text` can be written as an unquoted ES5.1 object key.
///
/// Only ASCII identifiers are recognized.
#[must_use]
pub fn is_valid_identifier(text: &str) -> bool {
    if RESERVED_WORDS.contains(&text) {
        return false;
    }
    let mut chars = text.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    is_identifier_start(first) && chars.all(is_identifier_part)
}

fn is_identifier_start(c: char) -> bool {
    c == '$' || c == '_' || c.is_ascii_alphabetic()
}

fn is_identifier_part(c: char) -> bool {
    is_identifier_start(c) || c.is_ascii_digit()
}
