//! Static extraction of the `metadata` literal from Python example scripts.

use tree_sitter::Node;

use crate::literal::{self, Literal, LiteralError};

const METADATA_NAME: &str = "metadata";

/// Constructors whose single argument is passed through as a sequence.
const SEQUENCE_CALLS: &[&str] =
    &["set", "frozenset", "list", "tuple", "sorted"];

/// Find the top-level `metadata = {...}` assignment and read its value.
///
/// Returns `Ok(None)` when the script declares no metadata.
pub fn extract_metadata(source: &str) -> Result<Option<Literal>, LiteralError> {
    let tree = literal::parse(tree_sitter_python::LANGUAGE.into(), source)?;

    for statement in literal::values(tree.root_node()) {
        if let Some(value) = metadata_value(statement, source) {
            if let Some(err) = literal::syntax_error(value) {
                return Err(err);
            }
            return Reader { source }.value(value).map(Some);
        }
        if statement.has_error()
            && names_metadata(literal::text(statement, source))
        {
            return Err(literal::syntax_error(statement).unwrap_or_else(|| {
                LiteralError::new(literal::line(statement), "syntax error")
            }));
        }
    }
    Ok(None)
}

/// The right-hand side of `metadata = ...` or `metadata: T = ...`.
fn metadata_value<'t>(statement: Node<'t>, source: &str) -> Option<Node<'t>> {
    if statement.kind() != "expression_statement" {
        return None;
    }
    let assignment = literal::values(statement).into_iter().next()?;
    if assignment.kind() != "assignment" {
        return None;
    }
    let target = assignment.child_by_field_name("left")?;
    if target.kind() != "identifier"
        || literal::text(target, source) != METADATA_NAME
    {
        return None;
    }
    assignment.child_by_field_name("right")
}

fn names_metadata(text: &str) -> bool {
    text.strip_prefix(METADATA_NAME).is_some_and(|rest| {
        !rest.starts_with(|c: char| c.is_alphanumeric() || c == '_' || c == '.')
    })
}

fn unsupported(node: Node<'_>, what: impl std::fmt::Display) -> LiteralError {
    LiteralError::new(
        literal::line(node),
        format!("unsupported {what} in metadata literal"),
    )
}

struct Reader<'s> {
    source: &'s str,
}

impl<'s> Reader<'s> {
    fn text(&self, node: Node<'_>) -> &'s str {
        literal::text(node, self.source)
    }

    fn value(&self, node: Node<'_>) -> Result<Literal, LiteralError> {
        match node.kind() {
            "dictionary" => self.dictionary(node),
            "set" | "list" | "tuple" => self.sequence(node).map(Literal::Seq),
            "parenthesized_expression" => {
                match literal::values(node).as_slice() {
                    [inner] => self.value(*inner),
                    _ => Err(unsupported(node, "empty parentheses")),
                }
            }
            "string" => self.string(node).map(Literal::Str),
            "concatenated_string" => {
                let mut out = String::new();
                for part in literal::values(node) {
                    out.push_str(&self.string(part)?);
                }
                Ok(Literal::Str(out))
            }
            "integer" | "float" | "true" | "false" => {
                Ok(Literal::Scalar(self.text(node).to_string()))
            }
            "none" => Ok(Literal::Null),
            "unary_operator" => self.signed(node),
            "call" => self.call(node),
            "identifier" => match self.text(node) {
                "None" => Ok(Literal::Null),
                name @ ("True" | "False") => {
                    Ok(Literal::Scalar(name.to_string()))
                }
                name => {
                    Err(unsupported(node, format_args!("expression '{name}'")))
                }
            },
            kind => Err(unsupported(node, kind)),
        }
    }

    fn dictionary(&self, node: Node<'_>) -> Result<Literal, LiteralError> {
        let mut entries = Vec::new();
        for pair in literal::values(node) {
            if pair.kind() != "pair" {
                return Err(unsupported(pair, pair.kind()));
            }
            let (Some(key), Some(value)) = (
                pair.child_by_field_name("key"),
                pair.child_by_field_name("value"),
            ) else {
                return Err(unsupported(pair, "incomplete dictionary entry"));
            };
            entries.push((self.key(key)?, self.value(value)?));
        }
        Ok(Literal::Map(entries))
    }

    fn key(&self, node: Node<'_>) -> Result<String, LiteralError> {
        match self.value(node)? {
            Literal::Str(s) | Literal::Scalar(s) => Ok(s),
            other => {
                Err(unsupported(node, format_args!("dictionary key {other}")))
            }
        }
    }

    fn sequence(&self, node: Node<'_>) -> Result<Vec<Literal>, LiteralError> {
        literal::values(node)
            .into_iter()
            .map(|item| self.value(item))
            .collect()
    }

    fn string(&self, node: Node<'_>) -> Result<String, LiteralError> {
        if node.kind() != "string" {
            return Err(unsupported(node, node.kind()));
        }
        if literal::values(node)
            .iter()
            .any(|part| part.kind() == "interpolation")
        {
            return Err(unsupported(node, "f-string interpolation"));
        }

        let raw = self.text(node);
        let malformed = || unsupported(node, "malformed string");
        let start = raw.find(['\'', '"']).ok_or_else(malformed)?;
        let (prefix, quoted) = raw.split_at(start);
        let triple =
            quoted.starts_with("\"\"\"") || quoted.starts_with("'''");
        let quote = if triple { 3 } else { 1 };
        let body = quoted
            .get(quote..quoted.len().saturating_sub(quote))
            .ok_or_else(malformed)?;

        let body = literal::normalize_newlines(body);
        if prefix.contains(['r', 'R']) {
            Ok(body)
        } else {
            Ok(literal::unescape(&body, true))
        }
    }

    /// `-1`, `+2.5`.
    fn signed(&self, node: Node<'_>) -> Result<Literal, LiteralError> {
        let operator =
            node.child_by_field_name("operator").map(|op| self.text(op));
        match (operator, node.child_by_field_name("argument")) {
            (Some(op @ ("-" | "+")), Some(number))
                if matches!(number.kind(), "integer" | "float") =>
            {
                Ok(Literal::Scalar(format!("{op}{}", self.text(number))))
            }
            _ => Err(unsupported(
                node,
                format_args!("expression '{}'", self.text(node)),
            )),
        }
    }

    fn call(&self, node: Node<'_>) -> Result<Literal, LiteralError> {
        let name = node
            .child_by_field_name("function")
            .map_or("", |function| self.text(function));
        let arguments = node
            .child_by_field_name("arguments")
            .filter(|args| args.kind() == "argument_list");
        let arguments = match arguments {
            Some(args) if name == "dict" || SEQUENCE_CALLS.contains(&name) => {
                args
            }
            _ => return Err(unsupported(node, format_args!("call '{name}()'"))),
        };

        let mut positional = Vec::new();
        let mut keywords = Vec::new();
        for arg in literal::values(arguments) {
            if arg.kind() != "keyword_argument" {
                positional.push(self.value(arg)?);
                continue;
            }
            let (Some(key), Some(value)) = (
                arg.child_by_field_name("name"),
                arg.child_by_field_name("value"),
            ) else {
                return Err(unsupported(arg, "keyword argument"));
            };
            keywords.push((self.text(key).to_string(), self.value(value)?));
        }

        if name == "dict" {
            return dict_call(node, positional, keywords);
        }
        if !keywords.is_empty() {
            return Err(unsupported(node, format_args!("keywords to {name}()")));
        }
        sequence_call(node, name, positional)
    }
}

/// `dict(mapping, key=value, ...)`; keywords override the mapping.
fn dict_call(
    node: Node<'_>,
    mut positional: Vec<Literal>,
    keywords: Vec<(String, Literal)>,
) -> Result<Literal, LiteralError> {
    let mut entries = match positional.len() {
        0 => Vec::new(),
        1 => match positional.remove(0) {
            Literal::Map(entries) => entries,
            other => {
                return Err(unsupported(node, format_args!("dict() of {other}")));
            }
        },
        _ => {
            return Err(unsupported(node, "dict() with several positional arguments"));
        }
    };
    for (key, value) in keywords {
        match entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some(entry) => entry.1 = value,
            None => entries.push((key, value)),
        }
    }
    Ok(Literal::Map(entries))
}

fn sequence_call(
    node: Node<'_>,
    name: &str,
    mut args: Vec<Literal>,
) -> Result<Literal, LiteralError> {
    match args.len() {
        0 => Ok(Literal::Seq(Vec::new())),
        1 => match args.remove(0) {
            seq @ Literal::Seq(_) => Ok(seq),
            Literal::Map(entries) => Ok(Literal::Seq(
                entries.into_iter().map(|(k, _)| Literal::Str(k)).collect(),
            )),
            other => {
                Err(unsupported(node, format_args!("{name}() of {other}")))
            }
        },
        _ => Err(unsupported(
            node,
            format_args!("{name}() with several arguments"),
        )),
    }
}
