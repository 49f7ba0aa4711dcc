//! Language-neutral literal values and the syntax-tree helpers shared by
//! the per-language metadata extractors.

use std::collections::BTreeSet;

use tree_sitter::{Node, Parser, Tree};

/// A literal value read out of an example script without running it.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Str(String),
    /// Sets, lists, tuples and R vectors all collapse to a sequence.
    Seq(Vec<Literal>),
    /// Key/value records, in declaration order.
    Map(Vec<(String, Literal)>),
    /// Numbers and booleans, kept as their source spelling.
    Scalar(String),
    Null,
}

impl Literal {
    /// Render as plain text, if this literal has a textual form.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Literal::Str(s) | Literal::Scalar(s) => Some(s.clone()),
            Literal::Null => None,
            other => Some(other.to_string()),
        }
    }

    /// Flatten into a set of strings. A lone string is a one-element set.
    pub fn to_string_set(&self) -> BTreeSet<String> {
        match self {
            Literal::Str(s) | Literal::Scalar(s) => {
                BTreeSet::from([s.clone()])
            }
            Literal::Seq(items) => {
                items.iter().flat_map(|item| item.to_string_set()).collect()
            }
            Literal::Map(_) | Literal::Null => BTreeSet::new(),
        }
    }
}

impl std::fmt::Display for Literal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Literal::Str(s) | Literal::Scalar(s) => f.write_str(s),
            Literal::Null => f.write_str("null"),
            Literal::Seq(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Literal::Map(entries) => {
                f.write_str("{")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                f.write_str("}")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("line {line}: {message}")]
pub struct LiteralError {
    pub line: usize,
    pub message: String,
}

impl LiteralError {
    pub fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

/// Parse `source` with a tree-sitter grammar.
pub(crate) fn parse(
    language: tree_sitter::Language,
    source: &str,
) -> Result<Tree, LiteralError> {
    let mut parser = Parser::new();
    parser
        .set_language(&language)
        .map_err(|e| LiteralError::new(1, e.to_string()))?;
    parser
        .parse(source, None)
        .ok_or_else(|| LiteralError::new(1, "parser produced no syntax tree"))
}

/// One-based line a node starts on.
pub(crate) fn line(node: Node<'_>) -> usize {
    node.start_position().row + 1
}

pub(crate) fn text<'s>(node: Node<'_>, source: &'s str) -> &'s str {
    source.get(node.byte_range()).unwrap_or_default()
}

/// Named children minus comments and separators.
pub(crate) fn values<'t>(node: Node<'t>) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|child| !child.is_extra() && child.kind() != "comma")
        .collect()
}

/// The first error or missing node under `node`, as a literal error.
pub(crate) fn syntax_error(node: Node<'_>) -> Option<LiteralError> {
    if node.is_error() || node.is_missing() {
        let message = if node.is_missing() {
            format!("syntax error: missing {}", node.kind())
        } else {
            "syntax error".to_string()
        };
        return Some(LiteralError::new(line(node), message));
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    let children: Vec<_> = node.children(&mut cursor).collect();
    children.into_iter().find_map(syntax_error)
}

/// Decode backslash escapes in a quoted string body.
///
/// With `line_continuation`, a backslash before a line break removes both.
pub(crate) fn unescape(body: &str, line_continuation: bool) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let Some(next) = chars.next() else {
            out.push('\\');
            break;
        };
        match next {
            '\n' if line_continuation => {}
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            'a' => out.push('\u{7}'),
            'b' => out.push('\u{8}'),
            'f' => out.push('\u{c}'),
            'v' => out.push('\u{b}'),
            '0'..='7' => {
                let mut digits = String::from(next);
                while digits.len() < 3 {
                    match chars.next_if(|d| ('0'..='7').contains(d)) {
                        Some(d) => digits.push(d),
                        None => break,
                    }
                }
                let code = u32::from_str_radix(&digits, 8).unwrap_or_default();
                out.push(char::from_u32(code).unwrap_or_default());
            }
            '\\' | '\'' | '"' | '`' | '\n' => out.push(next),
            'x' | 'u' | 'U' => {
                let width = match next {
                    'x' => 2,
                    'u' => 4,
                    _ => 8,
                };
                let braced = chars.next_if_eq(&'{').is_some();
                let mut digits = String::new();
                while digits.len() < width || braced {
                    match chars.next_if(char::is_ascii_hexdigit) {
                        Some(d) => digits.push(d),
                        None => break,
                    }
                }
                if braced {
                    chars.next_if_eq(&'}');
                }
                match u32::from_str_radix(&digits, 16)
                    .ok()
                    .and_then(char::from_u32)
                {
                    Some(decoded) => out.push(decoded),
                    None => {
                        out.push('\\');
                        out.push(next);
                        out.push_str(&digits);
                    }
                }
            }
            other => {
                out.push('\\');
                out.push(other);
            }
        }
    }
    out
}

/// Source line breaks inside string literals read as `\n`.
pub(crate) fn normalize_newlines(body: &str) -> String {
    body.replace("\r\n", "\n").replace('\r', "\n")
}
