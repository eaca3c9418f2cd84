use std::{fs, path::Path, sync::Arc};

use log::{debug, error, trace};

use crate::{decode, Clock, Note, Result};

/// Helper method to load a single note from file
pub fn load_note_from_file(path: &Path, clock: Arc<dyn Clock>) -> Result<Note> {
    debug!("Loading note from file: {}", path.display());
    let content = fs::read_to_string(path).map_err(|e| {
        error!("Failed to open note file {}: {}", path.display(), e);
        e
    })?;

    let mut note = decode(&content, clock)?;
    note.set_file_path(Some(path.to_path_buf()));

    trace!("Successfully loaded note: {}", note.title());
    Ok(note)
}

// Helper method for parsing tags
pub fn parse_tags(tags: Option<String>) -> Vec<String> {
    tags.map(|t| {
        t.split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    })
    .unwrap_or_default()
}

/// Number of whitespace-separated words.
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Case-insensitive substring test.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Shortens `text` to `max_len` characters, ending in `...` when cut.
pub fn truncate(text: &str, max_len: usize) -> String {
    if text.chars().count() <= max_len {
        text.to_string()
    } else {
        let kept: String = text.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Returns `...<context>...` around the first case-insensitive occurrence of
/// `query` in `content`, or an empty string when there is none.
pub fn content_snippet(content: &str, query: &str, radius: usize) -> String {
    if content.is_empty() || query.is_empty() {
        return String::new();
    }

    // Per-character lowering keeps indices aligned with `content`.
    let chars: Vec<char> = content.chars().collect();
    let lowered: Vec<char> = chars.iter().map(|c| lower_char(*c)).collect();
    let needle: Vec<char> = query.chars().map(lower_char).collect();

    let Some(index) = lowered
        .windows(needle.len())
        .position(|window| window == needle.as_slice())
    else {
        return String::new();
    };

    let start = index.saturating_sub(radius);
    let end = (index + needle.len() + radius).min(chars.len());
    let snippet: String = chars[start..end].iter().collect();
    format!("...{}...", snippet.trim())
}

fn lower_char(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}
