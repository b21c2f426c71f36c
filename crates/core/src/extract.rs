//! Schema extraction from TypeScript declaration sources.
//!
//! A mechanical declaration-level scan: interface and enum declarations are
//! located, member names and raw type strings are captured verbatim, and the
//! result is persisted as the IR document. No type interpretation happens
//! here; raw strings flow to `typeexpr` untouched.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::error::GenError;
use crate::ir::{IrDocument, PropertyInfo, SchemaDefinition};

#[allow(clippy::unwrap_used)]
static INTERFACE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*(?:export\s+)?interface\s+([A-Za-z_$][A-Za-z0-9_$]*)([^{]*)\{")
        .unwrap()
});

#[allow(clippy::unwrap_used)]
static ENUM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*(?:export\s+)?(?:const\s+)?enum\s+([A-Za-z_$][A-Za-z0-9_$]*)\s*\{")
        .unwrap()
});

#[allow(clippy::unwrap_used)]
static TYPE_ALIAS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*(?:export\s+)?type\s+([A-Za-z_$][A-Za-z0-9_$]*)\s*=\s*([^;\n]+)")
        .unwrap()
});

#[allow(clippy::unwrap_used)]
static PROPERTY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^\s*(?:readonly\s+)?([A-Za-z_$][A-Za-z0-9_$]*)\s*(\?)?\s*:\s*(.+)$")
        .unwrap()
});

#[allow(clippy::unwrap_used)]
static ENUM_MEMBER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^\s*([A-Za-z_$][A-Za-z0-9_$-]*)\s*(?:=\s*(.+))?$").unwrap()
});

/// Scan every `.ts` file under `root` and build the IR document. Traversal is
/// path-sorted so repeated runs produce byte-identical output.
pub fn extract_sources(root: &Path) -> Result<IrDocument, GenError> {
    std::fs::metadata(root).map_err(|err| GenError::io(root, err))?;

    let mut definitions = Vec::new();
    let mut nominals = Vec::new();

    for entry in WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
    {
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some("ts") {
            continue;
        }
        let content =
            std::fs::read_to_string(path).map_err(|err| GenError::io(path, err))?;
        let before = definitions.len();
        parse_source(&content, &mut definitions, &mut nominals);
        debug!(
            path = %path.display(),
            definitions = definitions.len() - before,
            "Scanned source file."
        );
    }

    nominals.sort();
    nominals.dedup();

    let document = IrDocument::new(definitions, nominals);
    document.validate()?;
    document.check_extends();
    info!(
        definitions = document.definitions.len(),
        nominals = document.nominals.len(),
        "Extraction complete."
    );
    Ok(document)
}

/// Parse one source file's declarations into `definitions` and `nominals`.
pub fn parse_source(
    content: &str,
    definitions: &mut Vec<SchemaDefinition>,
    nominals: &mut Vec<String>,
) {
    for captures in INTERFACE_RE.captures_iter(content) {
        let Some(full) = captures.get(0) else {
            continue;
        };
        let name = captures[1].to_string();
        let extends = parse_extends_clause(&captures[2]);
        let Some(body) = brace_block(content, full.end()) else {
            continue;
        };

        let mut def = SchemaDefinition::interface(name);
        def.extends = extends;
        def.description = doc_before(content, full.start());
        for chunk in split_members(body, &[';', ',']) {
            let (description, code) = take_member_doc(chunk);
            let Some(member) = PROPERTY_RE.captures(code) else {
                continue;
            };
            def.properties.insert(
                member[1].to_string(),
                PropertyInfo {
                    raw_type: member[3].trim().to_string(),
                    optional: member.get(2).is_some(),
                    description,
                },
            );
        }
        definitions.push(def);
    }

    for captures in ENUM_RE.captures_iter(content) {
        let Some(full) = captures.get(0) else {
            continue;
        };
        let name = captures[1].to_string();
        let Some(body) = brace_block(content, full.end()) else {
            continue;
        };

        let mut values = Vec::new();
        for chunk in split_members(body, &[',']) {
            let (_, code) = take_member_doc(chunk);
            let Some(member) = ENUM_MEMBER_RE.captures(code) else {
                continue;
            };
            // The literal value wins over the symbolic member name.
            let value = match member.get(2) {
                Some(value) => unquote(value.as_str().trim()).to_string(),
                None => member[1].to_string(),
            };
            values.push(value);
        }
        if values.is_empty() {
            continue;
        }
        let mut def = SchemaDefinition::enumeration(name, values);
        def.description = doc_before(content, full.start());
        definitions.push(def);
    }

    // Branded type aliases seed the nominal identifier registry.
    for captures in TYPE_ALIAS_RE.captures_iter(content) {
        if captures[2].contains("__brand") {
            nominals.push(captures[1].to_string());
        }
    }
}

fn parse_extends_clause(clause: &str) -> Vec<String> {
    let Some(rest) = clause.trim().strip_prefix("extends") else {
        return Vec::new();
    };
    rest.split(',')
        .map(str::trim)
        .filter(|parent| !parent.is_empty())
        .map(ToString::to_string)
        .collect()
}

fn unquote(value: &str) -> &str {
    let bytes = value.as_bytes();
    if bytes.len() >= 2 {
        let quote = bytes[0];
        if (quote == b'\'' || quote == b'"') && bytes[bytes.len() - 1] == quote {
            return &value[1..value.len() - 1];
        }
    }
    value
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Normal,
    LineComment,
    BlockComment,
    Quote(char),
}

/// The body between a `{` at `open_end` (index just past the brace) and its
/// matching `}`, skipping braces inside strings and comments.
fn brace_block(text: &str, open_end: usize) -> Option<&str> {
    let mut depth = 1_i32;
    let mut state = ScanState::Normal;
    let mut prev = '\0';
    for (offset, ch) in text[open_end..].char_indices() {
        match state {
            ScanState::Normal => match ch {
                '\'' | '"' | '`' => state = ScanState::Quote(ch),
                '/' if prev == '/' => state = ScanState::LineComment,
                '*' if prev == '/' => state = ScanState::BlockComment,
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(&text[open_end..open_end + offset]);
                    }
                }
                _ => {}
            },
            ScanState::LineComment => {
                if ch == '\n' {
                    state = ScanState::Normal;
                }
            }
            ScanState::BlockComment => {
                if prev == '*' && ch == '/' {
                    state = ScanState::Normal;
                }
            }
            ScanState::Quote(quote) => {
                if ch == quote && prev != '\\' {
                    state = ScanState::Normal;
                }
            }
        }
        prev = ch;
    }
    None
}

/// Split a declaration body on any of `separators` at nesting depth zero,
/// ignoring separators inside strings, comments, and nested brackets.
fn split_members<'a>(body: &'a str, separators: &[char]) -> Vec<&'a str> {
    let mut parts = Vec::new();
    let mut depth = 0_i32;
    let mut state = ScanState::Normal;
    let mut prev = '\0';
    let mut start = 0;
    for (idx, ch) in body.char_indices() {
        match state {
            ScanState::Normal => match ch {
                '\'' | '"' | '`' => state = ScanState::Quote(ch),
                '/' if prev == '/' => state = ScanState::LineComment,
                '*' if prev == '/' => state = ScanState::BlockComment,
                '{' | '[' | '(' | '<' => depth += 1,
                '}' | ']' | ')' => depth -= 1,
                // `=>` is an arrow, not a closing angle bracket.
                '>' if prev != '=' => depth -= 1,
                _ if depth == 0 && separators.contains(&ch) => {
                    parts.push(&body[start..idx]);
                    start = idx + ch.len_utf8();
                }
                _ => {}
            },
            ScanState::LineComment => {
                if ch == '\n' {
                    state = ScanState::Normal;
                }
            }
            ScanState::BlockComment => {
                if prev == '*' && ch == '/' {
                    state = ScanState::Normal;
                }
            }
            ScanState::Quote(quote) => {
                if ch == quote && prev != '\\' {
                    state = ScanState::Normal;
                }
            }
        }
        prev = ch;
    }
    parts.push(&body[start..]);
    parts
}

/// The `/** ... */` block immediately preceding `pos`, cleaned to one line.
fn doc_before(text: &str, pos: usize) -> Option<String> {
    let head = text[..pos].trim_end();
    if !head.ends_with("*/") {
        return None;
    }
    let start = head.rfind("/**")?;
    let inner = &head[start + 3..head.len() - 2];
    let cleaned = clean_doc(inner);
    if cleaned.is_empty() { None } else { Some(cleaned) }
}

/// Split a leading `/** ... */` doc comment off a member chunk.
fn take_member_doc(chunk: &str) -> (Option<String>, &str) {
    let mut rest = chunk.trim_start();
    let mut doc = None;
    if let Some(after_open) = rest.strip_prefix("/**") {
        if let Some(close) = after_open.find("*/") {
            let cleaned = clean_doc(&after_open[..close]);
            if !cleaned.is_empty() {
                doc = Some(cleaned);
            }
            rest = after_open[close + 2..].trim_start();
        }
    }
    // Stray line comments between members attach to nothing.
    while rest.starts_with("//") {
        rest = match rest.find('\n') {
            Some(newline) => rest[newline + 1..].trim_start(),
            None => "",
        };
    }
    (doc, rest)
}

fn clean_doc(inner: &str) -> String {
    inner
        .lines()
        .map(|line| line.trim().trim_start_matches('*').trim())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
