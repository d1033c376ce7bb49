//! Parsers turning override source contents into ordered patches.

use crate::ConfigError;
use crate::value::RawValue;
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

/// Prefix used by deployment files that assign into the portal's global object.
const GLOBAL_OBJECT_PREFIX: &str = "appConfig.";

const BYTE_ORDER_MARK: char = '\u{feff}';

static ASSIGNMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z_$][A-Za-z0-9_$]*(?:\.[A-Za-z_$][A-Za-z0-9_$]*)+)\s*=\s*(\S.*?)\s*$")
        .expect("assignment pattern is valid")
});

/// One key assignment read from a source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchEntry {
    pub key: String,
    pub value: RawValue,
    /// Line within the source, when the format tracks it.
    pub line: Option<usize>,
}

/// Ordered assignments from a single override source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPatch {
    /// Human-readable label of the source (layer kind and path).
    pub source: String,
    pub entries: Vec<PatchEntry>,
}

impl RawPatch {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            entries: Vec::new(),
        }
    }

    /// Append an assignment, mostly useful when building patches in code.
    pub fn set(mut self, key: &str, value: impl Into<RawValue>) -> Self {
        self.entries.push(PatchEntry {
            key: key.to_string(),
            value: value.into(),
            line: None,
        });
        self
    }

    /// `label:line` for entries that carry a line number.
    pub(crate) fn origin(&self, entry: &PatchEntry) -> String {
        match entry.line {
            Some(line) => format!("{}:{line}", self.source),
            None => self.source.clone(),
        }
    }
}

/// Parse `<namespace>.<field> = <value>` statements.
pub fn parse_assignments(label: &str, contents: &str) -> Result<RawPatch, ConfigError> {
    let contents = strip_bom(contents);
    let mut patch = RawPatch::new(label);
    for statement in split_statements(label, contents)? {
        let text = statement.text.trim();
        let text = text.strip_prefix(GLOBAL_OBJECT_PREFIX).unwrap_or(text);
        let Some(captures) = ASSIGNMENT.captures(text) else {
            let message = if !text.contains('=') && text.contains(':') {
                "expected `=` assignment, `:` is not a valid separator"
            } else {
                "expected `<namespace>.<field> = <value>`"
            };
            return Err(ConfigError::parse(
                label,
                Some(statement.line),
                statement.text.trim(),
                message,
            ));
        };
        let value = parse_value(&captures[2]).map_err(|message| {
            ConfigError::parse(label, Some(statement.line), statement.text.trim(), message)
        })?;
        patch.entries.push(PatchEntry {
            key: captures[1].to_string(),
            value,
            line: Some(statement.line),
        });
    }
    Ok(patch)
}

/// Parse a JSON5 document of nested namespace objects.
pub fn parse_json5(label: &str, contents: &str) -> Result<RawPatch, ConfigError> {
    let contents = strip_bom(contents);
    let value: Value = json5::from_str(contents).map_err(|err| {
        // json5 positions are zero-based.
        let line = err.position().map(|position| position.line + 1);
        let content = match line {
            Some(line) => contents.lines().nth(line - 1).unwrap_or_default().trim().to_string(),
            None => snippet(contents),
        };
        ConfigError::parse(label, line, content, err.to_string())
    })?;
    let Value::Object(map) = value else {
        return Err(ConfigError::parse(
            label,
            None,
            snippet(contents),
            "expected a top-level object",
        ));
    };
    let mut patch = RawPatch::new(label);
    flatten(label, "", &map, &mut patch)?;
    Ok(patch)
}

fn flatten(
    label: &str,
    prefix: &str,
    map: &serde_json::Map<String, Value>,
    patch: &mut RawPatch,
) -> Result<(), ConfigError> {
    for (key, value) in map {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        let raw = match value {
            Value::Object(nested) => {
                flatten(label, &path, nested, patch)?;
                continue;
            }
            Value::String(text) => RawValue::Text(text.clone()),
            Value::Bool(flag) => RawValue::Bool(*flag),
            Value::Null => RawValue::Absent,
            other => {
                return Err(ConfigError::parse(
                    label,
                    None,
                    format!("{path}: {other}"),
                    "only strings, booleans and null are supported",
                ));
            }
        };
        patch.entries.push(PatchEntry {
            key: path,
            value: raw,
            line: None,
        });
    }
    Ok(())
}

fn strip_bom(contents: &str) -> &str {
    contents.strip_prefix(BYTE_ORDER_MARK).unwrap_or(contents)
}

fn snippet(contents: &str) -> String {
    let first = contents.trim().lines().next().unwrap_or_default();
    if first.chars().count() > 60 {
        format!("{}...", first.chars().take(60).collect::<String>())
    } else {
        first.to_string()
    }
}

/// A statement with comments removed and the line it started on.
#[derive(Debug)]
struct Statement {
    line: usize,
    text: String,
}

/// Split source text into statements on `;` and newlines, dropping comments.
/// A line ending in `=` continues onto the next line.
fn split_statements(label: &str, contents: &str) -> Result<Vec<Statement>, ConfigError> {
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut start_line = 1;
    let mut line = 1;
    let mut quote: Option<char> = None;
    let mut chars = contents.chars().peekable();

    let mut flush = |current: &mut String, start_line: usize| {
        if !current.trim().is_empty() {
            statements.push(Statement {
                line: start_line,
                text: std::mem::take(current),
            });
        }
        current.clear();
    };

    while let Some(c) = chars.next() {
        if let Some(open) = quote {
            match c {
                '\\' => {
                    current.push(c);
                    if let Some(escaped) = chars.next() {
                        current.push(escaped);
                    }
                }
                '\n' => {
                    return Err(ConfigError::parse(
                        label,
                        Some(line),
                        current.trim(),
                        "unterminated string",
                    ));
                }
                _ => {
                    current.push(c);
                    if c == open {
                        quote = None;
                    }
                }
            }
            continue;
        }

        match c {
            '"' | '\'' => {
                quote = Some(c);
                current.push(c);
            }
            '/' if chars.peek() == Some(&'/') => {
                while chars.peek().is_some_and(|next| *next != '\n') {
                    chars.next();
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let opened_at = line;
                let mut closed = false;
                while let Some(inner) = chars.next() {
                    if inner == '\n' {
                        line += 1;
                    } else if inner == '*' && chars.peek() == Some(&'/') {
                        chars.next();
                        closed = true;
                        break;
                    }
                }
                if !closed {
                    return Err(ConfigError::parse(
                        label,
                        Some(opened_at),
                        "/*",
                        "unterminated block comment",
                    ));
                }
                current.push(' ');
            }
            ';' => flush(&mut current, start_line),
            '\n' if current.trim_end().ends_with('=') => {
                current.push(' ');
                line += 1;
            }
            '\n' => {
                flush(&mut current, start_line);
                line += 1;
            }
            _ => {
                if current.trim().is_empty() && !c.is_whitespace() {
                    start_line = line;
                }
                current.push(c);
            }
        }
    }

    if quote.is_some() {
        return Err(ConfigError::parse(
            label,
            Some(line),
            current.trim(),
            "unterminated string",
        ));
    }
    flush(&mut current, start_line);
    Ok(statements)
}

/// Parse the right-hand side of an assignment.
fn parse_value(raw: &str) -> Result<RawValue, String> {
    match raw {
        "true" => return Ok(RawValue::Bool(true)),
        "false" => return Ok(RawValue::Bool(false)),
        "null" | "undefined" => return Ok(RawValue::Absent),
        _ => {}
    }

    let mut chars = raw.chars();
    let open = match chars.next() {
        Some(open @ ('"' | '\'')) => open,
        _ => return Err(format!("unsupported value `{raw}`")),
    };

    let mut text = String::new();
    let mut closed = false;
    while let Some(c) = chars.next() {
        if closed {
            return Err(format!("unexpected content after string in `{raw}`"));
        }
        match c {
            '\\' => {
                let escaped = match chars.next() {
                    Some('n') => '\n',
                    Some('t') => '\t',
                    Some('r') => '\r',
                    Some(c @ ('"' | '\'' | '\\' | '/')) => c,
                    Some(other) => return Err(format!("unsupported escape `\\{other}`")),
                    None => return Err("dangling escape".to_string()),
                };
                text.push(escaped);
            }
            c if c == open => closed = true,
            c => text.push(c),
        }
    }

    if closed {
        Ok(RawValue::Text(text))
    } else {
        Err("unterminated string".to_string())
    }
}
