//! On-disk note format.
//!
//! ```text
//! ---
//! title: Note Title
//! created: 2024-01-15T10:30:00Z
//! modified: 2024-01-15T10:30:00Z
//! tags: [java, programming]
//! author: Ada
//! status: draft
//! priority: 3
//! ---
//!
//! Body content here...
//! ```
//!
//! The header is a small YAML subset: `key: value` pairs where values are
//! plain, single-quoted or double-quoted scalars, and `tags` is a flow list
//! (`[a, b]`) or a block list (`- a` lines). Only the seven known keys are
//! read; anything else is ignored.
use std::sync::Arc;

use log::trace;

use crate::{note::parse_timestamp, Clock, Note, NotesError, Result};

pub const DELIMITER: &str = "---";

/// File suffix of note files.
pub const NOTE_EXTENSION: &str = "note";

/// Serializes a note to its on-disk text form.
pub fn encode(note: &Note) -> String {
    let mut out = String::new();
    out.push_str(DELIMITER);
    out.push('\n');

    push_entry(&mut out, "title", &scalar(&note.title, false));
    if let Some(created) = note.formatted_created() {
        push_entry(&mut out, "created", &created);
    }
    if let Some(modified) = note.formatted_modified() {
        push_entry(&mut out, "modified", &modified);
    }
    if !note.tags.is_empty() {
        let items: Vec<String> = note.tags.iter().map(|t| scalar(t, true)).collect();
        push_entry(&mut out, "tags", &format!("[{}]", items.join(", ")));
    }
    if let Some(author) = &note.author {
        push_entry(&mut out, "author", &scalar(author, false));
    }
    if let Some(status) = &note.status {
        push_entry(&mut out, "status", &scalar(status, false));
    }
    if let Some(priority) = note.priority {
        push_entry(&mut out, "priority", &priority.to_string());
    }

    out.push_str(DELIMITER);
    out.push('\n');

    if !note.content.trim().is_empty() {
        out.push('\n');
        out.push_str(&note.content);
    }
    out
}

/// Parses the on-disk text form of a note.
///
/// The returned note has no file path; timestamps are taken from the header
/// as-is and later mutations use `clock`.
pub fn decode(text: &str, clock: Arc<dyn Clock>) -> Result<Note> {
    let lines: Vec<&str> = text.lines().collect();

    if lines.first().copied() != Some(DELIMITER) {
        return Err(format_error("missing opening '---' delimiter"));
    }

    let end = lines
        .iter()
        .enumerate()
        .skip(1)
        .find(|(_, line)| line.trim() == DELIMITER)
        .map(|(i, _)| i)
        .ok_or_else(|| format_error("missing closing '---' delimiter"))?;

    let header = parse_header(&lines[1..end])?;
    trace!("Parsed header with {} known keys", header.len());

    let content = lines[end + 1..].join("\n").trim().to_string();

    let mut note = Note {
        title: String::new(),
        created: None,
        modified: None,
        tags: Vec::new(),
        author: None,
        status: None,
        priority: None,
        content,
        file_path: None,
        clock,
    };

    let mut saw_title = false;
    for (key, value) in header {
        match (key, value) {
            ("title", HeaderValue::Scalar(title)) => {
                note.title = title;
                saw_title = true;
            }
            ("title", HeaderValue::List(_)) => {
                return Err(format_error("'title' must be a scalar"));
            }
            ("created", HeaderValue::Scalar(value)) => {
                note.created = Some(timestamp("created", &value)?);
            }
            ("modified", HeaderValue::Scalar(value)) => {
                note.modified = Some(timestamp("modified", &value)?);
            }
            ("tags", HeaderValue::List(tags)) => {
                for tag in tags {
                    if !note.tags.contains(&tag) {
                        note.tags.push(tag);
                    }
                }
            }
            ("author", HeaderValue::Scalar(author)) => note.author = Some(author),
            ("status", HeaderValue::Scalar(status)) => note.status = Some(status),
            ("priority", HeaderValue::Scalar(value)) => {
                let priority = value.trim().parse::<i32>().map_err(|_| {
                    format_error(&format!("'priority' is not an integer: {}", value))
                })?;
                note.priority = Some(priority);
            }
            (_, HeaderValue::Null) => {}
            (key, _) => trace!("Ignoring header value of unexpected shape for '{}'", key),
        }
    }

    if !saw_title {
        return Err(format_error("missing 'title' in header"));
    }

    Ok(note)
}

#[derive(Debug, Clone, PartialEq)]
enum HeaderValue {
    Scalar(String),
    List(Vec<String>),
    Null,
}

const KNOWN_KEYS: [&str; 7] = [
    "title", "created", "modified", "tags", "author", "status", "priority",
];

/// Parses the lines between the delimiters into known key/value pairs, in
/// file order. A repeated key keeps its last value.
fn parse_header(lines: &[&str]) -> Result<Vec<(&'static str, HeaderValue)>> {
    let mut entries: Vec<(&'static str, HeaderValue)> = Vec::new();
    // Key whose value is being collected as a block list, if any.
    let mut open_list: Option<(&'static str, Vec<String>)> = None;

    for raw in lines {
        let line = raw.trim_end();
        let trimmed = line.trim_start();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        if let Some(item) = block_item(trimmed) {
            match open_list.as_mut() {
                Some((_, items)) => {
                    items.push(parse_scalar(item)?);
                    continue;
                }
                None if line.starts_with(char::is_whitespace) || line.starts_with('-') => {
                    // list item under an ignored key
                    continue;
                }
                None => {}
            }
        }

        if line.starts_with(char::is_whitespace) {
            // continuation of an ignored or nested value
            continue;
        }

        if let Some((key, items)) = open_list.take() {
            insert(&mut entries, key, list_or_null(items));
        }

        let (key, value) = line
            .split_once(':')
            .ok_or_else(|| format_error(&format!("expected 'key: value', found '{}'", line)))?;
        let key = key.trim();
        let Some(key) = KNOWN_KEYS.iter().copied().find(|k| *k == key) else {
            trace!("Ignoring unknown header key '{}'", key);
            continue;
        };

        let value = value.trim();
        if value.is_empty() {
            open_list = Some((key, Vec::new()));
        } else if value.starts_with('[') {
            insert(&mut entries, key, HeaderValue::List(parse_flow_list(value)?));
        } else if is_null(value) {
            insert(&mut entries, key, HeaderValue::Null);
        } else {
            insert(&mut entries, key, HeaderValue::Scalar(parse_scalar(value)?));
        }
    }

    if let Some((key, items)) = open_list.take() {
        insert(&mut entries, key, list_or_null(items));
    }

    Ok(entries)
}

fn insert(entries: &mut Vec<(&'static str, HeaderValue)>, key: &'static str, value: HeaderValue) {
    entries.retain(|(k, _)| *k != key);
    entries.push((key, value));
}

fn list_or_null(items: Vec<String>) -> HeaderValue {
    if items.is_empty() {
        HeaderValue::Null
    } else {
        HeaderValue::List(items)
    }
}

fn block_item(trimmed: &str) -> Option<&str> {
    if trimmed == "-" {
        Some("")
    } else {
        trimmed.strip_prefix("- ").map(str::trim)
    }
}

fn is_null(value: &str) -> bool {
    matches!(value, "~" | "null" | "Null" | "NULL")
}

/// Parses a single scalar: quoted forms are unescaped, plain forms have any
/// trailing ` # comment` removed.
fn parse_scalar(value: &str) -> Result<String> {
    let value = value.trim();
    if let Some(rest) = value.strip_prefix('\'') {
        let (text, remainder) = single_quoted(rest)?;
        ensure_only_comment(remainder)?;
        Ok(text)
    } else if let Some(rest) = value.strip_prefix('"') {
        let (text, remainder) = double_quoted(rest)?;
        ensure_only_comment(remainder)?;
        Ok(text)
    } else {
        let text = match value.find(" #") {
            Some(pos) => &value[..pos],
            None => value,
        };
        Ok(text.trim_end().to_string())
    }
}

fn ensure_only_comment(remainder: &str) -> Result<()> {
    let remainder = remainder.trim();
    if remainder.is_empty() || remainder.starts_with('#') {
        Ok(())
    } else {
        Err(format_error(&format!(
            "unexpected text after quoted value: '{}'",
            remainder
        )))
    }
}

/// Reads a single-quoted scalar body (after the opening quote). Returns the
/// text and whatever follows the closing quote.
fn single_quoted(input: &str) -> Result<(String, &str)> {
    let mut text = String::new();
    let mut chars = input.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if c == '\'' {
            if let Some((_, '\'')) = chars.peek() {
                text.push('\'');
                chars.next();
            } else {
                return Ok((text, &input[i + 1..]));
            }
        } else {
            text.push(c);
        }
    }
    Err(format_error("unterminated single-quoted value"))
}

fn double_quoted(input: &str) -> Result<(String, &str)> {
    let mut text = String::new();
    let mut chars = input.char_indices();
    while let Some((i, c)) = chars.next() {
        match c {
            '"' => return Ok((text, &input[i + 1..])),
            '\\' => match chars.next() {
                Some((_, 'n')) => text.push('\n'),
                Some((_, 't')) => text.push('\t'),
                Some((_, 'r')) => text.push('\r'),
                Some((_, '0')) => text.push('\0'),
                Some((_, '"')) => text.push('"'),
                Some((_, '\\')) => text.push('\\'),
                Some((_, '/')) => text.push('/'),
                Some((_, other)) => {
                    text.push('\\');
                    text.push(other);
                }
                None => break,
            },
            _ => text.push(c),
        }
    }
    Err(format_error("unterminated double-quoted value"))
}

/// Parses `[a, 'b, c', "d"]`.
fn parse_flow_list(value: &str) -> Result<Vec<String>> {
    let unterminated = || format_error(&format!("unterminated list: {}", value));
    let body = value.strip_prefix('[').ok_or_else(unterminated)?;
    let close = closing_bracket(body).ok_or_else(unterminated)?;
    let trailing = body[close + 1..].trim();
    if !trailing.is_empty() && !trailing.starts_with('#') {
        return Err(unterminated());
    }
    let inner = &body[..close];

    let mut items = Vec::new();
    let mut rest = inner.trim_start();
    while !rest.is_empty() {
        let (item, remainder) = if let Some(body) = rest.strip_prefix('\'') {
            single_quoted(body)?
        } else if let Some(body) = rest.strip_prefix('"') {
            double_quoted(body)?
        } else {
            let end = rest.find(',').unwrap_or(rest.len());
            (rest[..end].trim().to_string(), &rest[end..])
        };

        let remainder = remainder.trim_start();
        rest = match remainder.strip_prefix(',') {
            Some(after) => after.trim_start(),
            None if remainder.is_empty() => remainder,
            None => {
                return Err(format_error(&format!(
                    "expected ',' in list, found '{}'",
                    remainder
                )))
            }
        };

        if !item.is_empty() {
            items.push(item);
        }
    }
    Ok(items)
}

/// Byte offset of the `]` closing a flow list, skipping quoted items.
fn closing_bracket(body: &str) -> Option<usize> {
    let mut chars = body.char_indices().peekable();
    let mut item_start = true;
    while let Some((i, c)) = chars.next() {
        match c {
            ']' => return Some(i),
            ',' => item_start = true,
            c if c.is_whitespace() => {}
            '\'' if item_start => {
                loop {
                    match chars.next()? {
                        (_, '\'') if matches!(chars.peek(), Some((_, '\''))) => {
                            chars.next();
                        }
                        (_, '\'') => break,
                        _ => {}
                    }
                }
                item_start = false;
            }
            '"' if item_start => {
                loop {
                    match chars.next()? {
                        (_, '\\') => {
                            chars.next();
                        }
                        (_, '"') => break,
                        _ => {}
                    }
                }
                item_start = false;
            }
            _ => item_start = false,
        }
    }
    None
}

fn timestamp(key: &str, value: &str) -> Result<chrono::NaiveDateTime> {
    parse_timestamp(value)
        .ok_or_else(|| format_error(&format!("'{}' is not a valid timestamp: {}", key, value)))
}

fn push_entry(out: &mut String, key: &str, value: &str) {
    out.push_str(key);
    out.push_str(": ");
    out.push_str(value);
    out.push('\n');
}

/// Renders `value` as a plain scalar when that reads back as the same string,
/// otherwise as a double-quoted scalar.
fn scalar(value: &str, in_flow: bool) -> String {
    if is_plain_safe(value, in_flow) {
        value.to_string()
    } else {
        quote(value)
    }
}

fn is_plain_safe(value: &str, in_flow: bool) -> bool {
    const INDICATORS: &[char] = &[
        '-', '?', ':', ',', '[', ']', '{', '}', '#', '&', '*', '!', '|', '>', '\'', '"', '%',
        '@', '`',
    ];
    const FLOW_INDICATORS: &[char] = &[',', '[', ']', '{', '}'];
    const RESERVED: &[&str] = &[
        "true", "false", "yes", "no", "on", "off", "y", "n", "null", "~",
    ];

    let Some(first) = value.chars().next() else {
        return false;
    };
    if value.trim() != value || INDICATORS.contains(&first) {
        return false;
    }
    if value.chars().any(char::is_control) {
        return false;
    }
    if value.contains(": ") || value.contains(" #") || value.ends_with(':') {
        return false;
    }
    if in_flow && value.contains(FLOW_INDICATORS) {
        return false;
    }
    if RESERVED.contains(&value.to_lowercase().as_str()) {
        return false;
    }
    // Numbers, dates, sexagesimals and `.inf`-style floats all start this way
    if first.is_ascii_digit() || matches!(first, '.' | '+') {
        return false;
    }
    value.parse::<f64>().is_err() && parse_timestamp(value).is_none()
}

fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '\0' => out.push_str("\\0"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

fn format_error(message: &str) -> NotesError {
    NotesError::InvalidFormat {
        message: message.to_string(),
    }
}
