//! Static extraction of the `metadata` literal from R example scripts.

use tree_sitter::Node;

use crate::literal::{self, Literal, LiteralError};

const METADATA_NAME: &str = "metadata";

/// Assignment node kinds across grammar generations.
const ASSIGNMENTS: &[&str] = &[
    "binary_operator",
    "left_assignment",
    "super_assignment",
    "equals_assignment",
];

/// Find the top-level `metadata <- list(...)` assignment and read its value.
///
/// Returns `Ok(None)` when the script declares no metadata.
pub fn extract_metadata(source: &str) -> Result<Option<Literal>, LiteralError> {
    let tree = literal::parse(tree_sitter_r::LANGUAGE.into(), source)?;

    for expression in literal::values(tree.root_node()) {
        if let Some(value) = metadata_value(expression, source) {
            if let Some(err) = literal::syntax_error(value) {
                return Err(err);
            }
            return Reader { source }.value(value).map(Some);
        }
        if expression.has_error()
            && literal::text(expression, source).starts_with(METADATA_NAME)
        {
            return Err(literal::syntax_error(expression).unwrap_or_else(|| {
                LiteralError::new(literal::line(expression), "syntax error")
            }));
        }
    }
    Ok(None)
}

fn field<'t>(node: Node<'t>, names: &[&str]) -> Option<Node<'t>> {
    names.iter().find_map(|name| node.child_by_field_name(name))
}

/// The right-hand side of `metadata <- ...`, `metadata <<- ...` or
/// `metadata = ...`.
fn metadata_value<'t>(expression: Node<'t>, source: &str) -> Option<Node<'t>> {
    if !ASSIGNMENTS.contains(&expression.kind()) {
        return None;
    }
    let mut cursor = expression.walk();
    let operator = expression.child_by_field_name("operator").or_else(|| {
        expression.children(&mut cursor).find(|child| !child.is_named())
    });
    if !operator.is_some_and(|op| {
        matches!(literal::text(op, source), "<-" | "<<-" | "=")
    }) {
        return None;
    }
    let target = field(expression, &["lhs", "name", "left"])?;
    if target.kind() != "identifier"
        || identifier(literal::text(target, source)) != METADATA_NAME
    {
        return None;
    }
    field(expression, &["rhs", "value", "right"])
}

/// Strip the backticks from a quoted name.
fn identifier(text: &str) -> &str {
    text.strip_prefix('`')
        .and_then(|t| t.strip_suffix('`'))
        .unwrap_or(text)
}

fn unsupported(node: Node<'_>, what: impl std::fmt::Display) -> LiteralError {
    LiteralError::new(
        literal::line(node),
        format!("unsupported {what} in metadata literal"),
    )
}

type Argument = (Option<String>, Literal);

struct Reader<'s> {
    source: &'s str,
}

impl<'s> Reader<'s> {
    fn text(&self, node: Node<'_>) -> &'s str {
        literal::text(node, self.source)
    }

    fn value(&self, node: Node<'_>) -> Result<Literal, LiteralError> {
        match node.kind() {
            "string" => self.string(node).map(Literal::Str),
            "integer" | "float" | "complex" => {
                Ok(Literal::Scalar(self.text(node).to_string()))
            }
            "parenthesized_expression" => {
                match literal::values(node).as_slice() {
                    [inner] => self.value(*inner),
                    _ => Err(unsupported(node, "empty parentheses")),
                }
            }
            "unary_operator" => self.signed(node),
            "call" => self.call(node),
            _ => match self.text(node) {
                "NULL" => Ok(Literal::Null),
                constant @ ("TRUE" | "FALSE" | "NA" | "Inf" | "NaN") => {
                    Ok(Literal::Scalar(constant.to_string()))
                }
                name if node.kind() == "identifier" => {
                    Err(unsupported(node, format_args!("name '{name}'")))
                }
                _ => Err(unsupported(node, node.kind())),
            },
        }
    }

    fn string(&self, node: Node<'_>) -> Result<String, LiteralError> {
        let raw = self.text(node);
        let malformed = || unsupported(node, "malformed string");

        if let Some(rest) = raw.strip_prefix(['r', 'R']) {
            // r"-(...)-": quote, dashes, opening bracket, body, then the
            // mirror image.
            let dashes = rest.get(1..).map_or(0, |r| {
                r.chars().take_while(|c| *c == '-').count()
            });
            let body = rest
                .get(dashes + 2..rest.len().saturating_sub(dashes + 2))
                .ok_or_else(malformed)?;
            return Ok(literal::normalize_newlines(body));
        }

        let body = raw
            .get(1..raw.len().saturating_sub(1))
            .ok_or_else(malformed)?;
        Ok(literal::unescape(&literal::normalize_newlines(body), false))
    }

    fn signed(&self, node: Node<'_>) -> Result<Literal, LiteralError> {
        let operator =
            node.child_by_field_name("operator").map(|op| self.text(op));
        let operand = field(node, &["rhs", "argument"]);
        match (operator, operand) {
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
            .map_or("", |function| identifier(self.text(function)));
        if !matches!(
            name,
            "c" | "list" | "character" | "vector" | "paste" | "paste0"
        ) {
            return Err(unsupported(node, format_args!("call '{name}()'")));
        }
        let args = match node.child_by_field_name("arguments") {
            Some(arguments) => self.arguments(arguments)?,
            None => Vec::new(),
        };

        match name {
            "c" => Ok(Literal::Seq(combine(args))),
            "list" => Ok(list(args)),
            "paste" | "paste0" => paste(node, name, args),
            _ => Ok(Literal::Seq(Vec::new())),
        }
    }

    fn arguments(&self, node: Node<'_>) -> Result<Vec<Argument>, LiteralError> {
        let mut args = Vec::new();
        for arg in literal::values(node) {
            if !matches!(arg.kind(), "argument" | "default_argument") {
                args.push((None, self.value(arg)?));
                continue;
            }
            let name = match arg.child_by_field_name("name") {
                Some(name) if name.kind() == "string" => {
                    Some(self.string(name)?)
                }
                Some(name) => Some(identifier(self.text(name)).to_string()),
                None => None,
            };
            let value = match arg.child_by_field_name("value") {
                Some(value) => self.value(value)?,
                None => return Err(unsupported(arg, "empty argument")),
            };
            args.push((name, value));
        }
        Ok(args)
    }
}

/// `c()` flattens nested vectors and drops `NULL`.
fn combine(args: Vec<Argument>) -> Vec<Literal> {
    let mut out = Vec::new();
    for (_, value) in args {
        match value {
            Literal::Seq(items) => out.extend(items),
            Literal::Null => {}
            other => out.push(other),
        }
    }
    out
}

fn list(args: Vec<Argument>) -> Literal {
    if args.is_empty() {
        return Literal::Map(Vec::new());
    }
    if args.iter().all(|(name, _)| name.is_some()) {
        Literal::Map(
            args.into_iter()
                .filter_map(|(name, value)| name.map(|n| (n, value)))
                .collect(),
        )
    } else {
        Literal::Seq(args.into_iter().map(|(_, value)| value).collect())
    }
}

fn paste(
    node: Node<'_>,
    name: &str,
    args: Vec<Argument>,
) -> Result<Literal, LiteralError> {
    let mut sep = if name == "paste" { " " } else { "" }.to_string();
    let mut parts = Vec::new();
    for (arg_name, value) in args {
        match (arg_name.as_deref(), value) {
            (Some("sep"), Literal::Str(s)) => sep = s,
            (Some("collapse"), _) => {}
            (_, Literal::Str(s) | Literal::Scalar(s)) => parts.push(s),
            (_, other) => {
                return Err(unsupported(
                    node,
                    format_args!("{name}() of non-scalar value {other}"),
                ));
            }
        }
    }
    Ok(Literal::Str(parts.join(&sep)))
}
