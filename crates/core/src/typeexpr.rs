//! Parsed type-expression IR.
//!
//! Raw TypeScript type strings are parsed exactly once into `TypeExpr`; every
//! target renders from this structure instead of re-scanning the raw text.
//! Parsing is total: anything unrecognized passes through as a `Reference`,
//! and malformed generics degrade to a string-keyed map of `any`.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use tracing::warn;

/// Fixed-token primitives of the source type language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    String,
    Number,
    Boolean,
    Any,
    Unknown,
    Null,
    Undefined,
    Void,
    Object,
}

impl Primitive {
    fn from_token(token: &str) -> Option<Self> {
        Some(match token {
            "string" => Primitive::String,
            "number" => Primitive::Number,
            "boolean" => Primitive::Boolean,
            "any" => Primitive::Any,
            "unknown" => Primitive::Unknown,
            "null" => Primitive::Null,
            "undefined" => Primitive::Undefined,
            "void" => Primitive::Void,
            "object" => Primitive::Object,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LiteralValue {
    Str(String),
    Int(i64),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExpr {
    Primitive(Primitive),
    List(Box<TypeExpr>),
    Map {
        key: Box<TypeExpr>,
        value: Box<TypeExpr>,
    },
    /// `T | null` / `T | undefined`: the wrapped expression with null-ness
    /// hoisted out, so optionality is applied exactly once downstream.
    Nullable(Box<TypeExpr>),
    Union(Vec<TypeExpr>),
    /// A union (or single token) consisting entirely of literal values.
    Literals(Vec<LiteralValue>),
    /// A name expected to resolve to another definition.
    Reference(String),
    /// A branded identifier alias such as `NodeID`.
    Nominal(String),
}

#[allow(clippy::unwrap_used)]
static BRAND_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"__brand\s*:\s*['"]([^'"]+)['"]"#).unwrap());

#[allow(clippy::unwrap_used)]
static QUALIFIED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*\.([A-Za-z_$][A-Za-z0-9_$]*)$").unwrap()
});

#[allow(clippy::unwrap_used)]
static IDENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").unwrap());

impl TypeExpr {
    /// Parse a raw type string. `nominals` is the registry of known branded
    /// identifier names; bare occurrences of those names parse as `Nominal`.
    pub fn parse(raw: &str, nominals: &BTreeSet<String>) -> TypeExpr {
        let cleaned = strip_inline_comments(raw);
        parse_inner(cleaned.trim(), nominals)
    }

    /// The string-keyed map of `any` that malformed or inline-object types
    /// degrade to.
    pub fn any_map() -> TypeExpr {
        TypeExpr::Map {
            key: Box::new(TypeExpr::Primitive(Primitive::String)),
            value: Box::new(TypeExpr::Primitive(Primitive::Any)),
        }
    }
}

fn parse_inner(raw: &str, nominals: &BTreeSet<String>) -> TypeExpr {
    let raw = raw.trim();
    if raw.is_empty() {
        return TypeExpr::Primitive(Primitive::Any);
    }

    // Branded intersections collapse to the brand name before anything else:
    // `string & { readonly __brand: 'NodeID' }` is `NodeID`, not an
    // intersection to be decomposed.
    if raw.contains("__brand") {
        if let Some(captures) = BRAND_RE.captures(raw) {
            return TypeExpr::Nominal(captures[1].to_string());
        }
    }

    // Qualified names lose their namespace: `Domain.NodeType` -> `NodeType`.
    if let Some(captures) = QUALIFIED_RE.captures(raw) {
        return parse_inner(&captures[1], nominals);
    }

    // Top-level unions, split outside brackets/braces/quotes.
    let branches = split_top_level(raw, '|');
    if branches.len() > 1 {
        return parse_union(&branches, nominals);
    }

    // Array shorthand `T[]`, possibly parenthesized.
    if let Some(inner) = raw.strip_suffix("[]") {
        let inner = strip_outer_parens(inner.trim());
        return TypeExpr::List(Box::new(parse_inner(inner, nominals)));
    }

    // Generic forms.
    if let Some(args) = generic_args(raw, "Array") {
        return match args.as_slice() {
            [element] => TypeExpr::List(Box::new(parse_inner(element, nominals))),
            _ => degrade(raw),
        };
    }
    for keyword in ["Record", "Map"] {
        if let Some(args) = generic_args(raw, keyword) {
            return match args.as_slice() {
                [key, value] => TypeExpr::Map {
                    key: Box::new(parse_inner(key, nominals)),
                    value: Box::new(parse_inner(value, nominals)),
                },
                _ => degrade(raw),
            };
        }
    }
    // A generic opener that fell through the forms above is malformed.
    if raw.contains('<') {
        return degrade(raw);
    }

    // Inline object literals (including the empty `{}`) carry structure this
    // IR does not model; they become string-keyed maps of `any`.
    if raw.starts_with('{') {
        return TypeExpr::any_map();
    }

    if let Some(literal) = parse_literal(raw) {
        return TypeExpr::Literals(vec![literal]);
    }

    if let Some(primitive) = Primitive::from_token(raw) {
        return TypeExpr::Primitive(primitive);
    }

    if nominals.contains(raw) {
        return TypeExpr::Nominal(raw.to_string());
    }

    if IDENT_RE.is_match(raw) {
        return TypeExpr::Reference(raw.to_string());
    }

    // Best effort: pass the token through and let the target render it bare.
    warn!(raw, "Unrecognized type expression, passing through as reference.");
    TypeExpr::Reference(raw.to_string())
}

fn parse_union(branches: &[&str], nominals: &BTreeSet<String>) -> TypeExpr {
    let mut had_null = false;
    let mut remaining = Vec::new();
    for branch in branches {
        let branch = branch.trim();
        if branch == "null" || branch == "undefined" {
            had_null = true;
        } else {
            remaining.push(branch);
        }
    }

    if remaining.is_empty() {
        return TypeExpr::Primitive(Primitive::Null);
    }

    // A union made purely of literal values is a closed value set.
    let literals: Option<Vec<LiteralValue>> =
        remaining.iter().map(|branch| parse_literal(branch)).collect();

    let base = if let Some(literals) = literals {
        TypeExpr::Literals(literals)
    } else if remaining.len() == 1 {
        parse_inner(remaining[0], nominals)
    } else {
        TypeExpr::Union(
            remaining
                .iter()
                .map(|branch| parse_inner(branch, nominals))
                .collect(),
        )
    };

    if had_null {
        TypeExpr::Nullable(Box::new(base))
    } else {
        base
    }
}

fn parse_literal(token: &str) -> Option<LiteralValue> {
    let token = token.trim();
    if token.len() >= 2 {
        let bytes = token.as_bytes();
        let quote = bytes[0];
        if (quote == b'\'' || quote == b'"') && bytes[bytes.len() - 1] == quote {
            return Some(LiteralValue::Str(token[1..token.len() - 1].to_string()));
        }
    }
    token.parse::<i64>().ok().map(LiteralValue::Int)
}

fn degrade(raw: &str) -> TypeExpr {
    warn!(raw, "Malformed generic type, degrading to string-keyed any map.");
    TypeExpr::any_map()
}

/// Extract the comma-separated argument list of `Keyword<...>`, or `None` if
/// `raw` is not that form. An opener without a matching closer yields an empty
/// argument list, which the caller treats as malformed.
fn generic_args(raw: &str, keyword: &str) -> Option<Vec<String>> {
    let rest = raw.strip_prefix(keyword)?;
    let rest = rest.trim_start();
    let body = rest.strip_prefix('<')?;
    let Some(body) = body.strip_suffix('>') else {
        return Some(Vec::new());
    };
    Some(
        split_top_level(body, ',')
            .into_iter()
            .map(|arg| arg.trim().to_string())
            .filter(|arg| !arg.is_empty())
            .collect(),
    )
}

/// Split on `separator` at bracket depth zero, respecting quotes.
fn split_top_level(raw: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0_i32;
    let mut quote: Option<char> = None;
    let mut start = 0;
    for (idx, ch) in raw.char_indices() {
        if let Some(active) = quote {
            if ch == active {
                quote = None;
            }
            continue;
        }
        match ch {
            '\'' | '"' => quote = Some(ch),
            '<' | '(' | '[' | '{' => depth += 1,
            '>' | ')' | ']' | '}' => depth -= 1,
            _ if ch == separator && depth == 0 => {
                parts.push(&raw[start..idx]);
                start = idx + ch.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&raw[start..]);
    parts
}

fn strip_outer_parens(raw: &str) -> &str {
    let Some(inner) = raw.strip_prefix('(').and_then(|r| r.strip_suffix(')')) else {
        return raw;
    };
    // Only strip when the parens actually wrap the whole expression.
    let mut depth = 0_i32;
    for ch in inner.chars() {
        match ch {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth < 0 {
                    return raw;
                }
            }
            _ => {}
        }
    }
    inner
}

/// Drop `// ...` line comments and `/* ... */` block comments from a raw type
/// string, leaving the expression itself intact.
fn strip_inline_comments(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '/' {
            match chars.peek() {
                Some('/') => {
                    for skipped in chars.by_ref() {
                        if skipped == '\n' {
                            out.push(' ');
                            break;
                        }
                    }
                    continue;
                }
                Some('*') => {
                    chars.next();
                    let mut prev = ' ';
                    for skipped in chars.by_ref() {
                        if prev == '*' && skipped == '/' {
                            break;
                        }
                        prev = skipped;
                    }
                    out.push(' ');
                    continue;
                }
                _ => {}
            }
        }
        out.push(ch);
    }
    out
}
