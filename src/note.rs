//! The note entity.
//!
//! A note carries its metadata header fields, free-form content and, once
//! persisted, the path of its backing file. Every content or metadata setter
//! bumps `modified` using the note's clock.
use std::{
    fmt,
    path::{Path, PathBuf},
    sync::Arc,
};

use chrono::{NaiveDateTime, Timelike};

use crate::{Clock, SystemClock};

/// Format used for `created`/`modified` in note headers and output.
///
/// The trailing `Z` is a literal; stored times are local and are not converted.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Represents a single note in our system
#[derive(Debug, Clone)]
pub struct Note {
    pub(crate) title: String,
    pub(crate) created: Option<NaiveDateTime>,
    pub(crate) modified: Option<NaiveDateTime>,
    pub(crate) tags: Vec<String>,
    pub(crate) author: Option<String>,
    pub(crate) status: Option<String>,
    pub(crate) priority: Option<i32>,
    pub(crate) content: String,
    pub(crate) file_path: Option<PathBuf>,
    pub(crate) clock: Arc<dyn Clock>,
}

impl Note {
    /// Creates a new note stamped with the system clock.
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self::with_clock(title, content, Arc::new(SystemClock))
    }

    /// Creates a new note whose timestamps come from `clock`.
    pub fn with_clock(
        title: impl Into<String>,
        content: impl Into<String>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let now = truncate_to_seconds(clock.now());
        Note {
            title: title.into(),
            created: Some(now),
            modified: Some(now),
            tags: Vec::new(),
            author: None,
            status: None,
            priority: None,
            content: content.into(),
            file_path: None,
            clock,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
        self.touch();
    }

    pub fn created(&self) -> Option<NaiveDateTime> {
        self.created
    }

    /// Sets the creation time. Does not affect `modified`.
    pub fn set_created(&mut self, created: Option<NaiveDateTime>) {
        self.created = created.map(truncate_to_seconds);
    }

    pub fn modified(&self) -> Option<NaiveDateTime> {
        self.modified
    }

    pub fn set_modified(&mut self, modified: Option<NaiveDateTime>) {
        self.modified = modified.map(truncate_to_seconds);
    }

    /// Tags in insertion order.
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Replaces all tags, dropping duplicates while keeping first occurrences.
    pub fn set_tags<I, S>(&mut self, tags: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.clear();
        for tag in tags {
            let tag = tag.into();
            if !self.tags.contains(&tag) {
                self.tags.push(tag);
            }
        }
        self.touch();
    }

    /// Appends `tag` unless it is already present. A redundant add leaves
    /// `modified` untouched.
    pub fn add_tag(&mut self, tag: impl Into<String>) {
        let tag = tag.into();
        if !self.tags.contains(&tag) {
            self.tags.push(tag);
            self.touch();
        }
    }

    /// Removes `tag` if present. Always bumps `modified`.
    pub fn remove_tag(&mut self, tag: &str) {
        self.tags.retain(|t| t != tag);
        self.touch();
    }

    /// Exact, case-sensitive tag membership.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    pub fn author(&self) -> Option<&str> {
        self.author.as_deref()
    }

    pub fn set_author(&mut self, author: Option<String>) {
        self.author = author;
        self.touch();
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn set_status(&mut self, status: Option<String>) {
        self.status = status;
        self.touch();
    }

    pub fn priority(&self) -> Option<i32> {
        self.priority
    }

    pub fn set_priority(&mut self, priority: Option<i32>) {
        self.priority = priority;
        self.touch();
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
        self.touch();
    }

    /// Location of the backing file, set once the note has been saved or loaded.
    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    pub fn set_file_path(&mut self, path: Option<PathBuf>) {
        self.file_path = path;
    }

    pub fn formatted_created(&self) -> Option<String> {
        self.created.map(format_timestamp)
    }

    pub fn formatted_modified(&self) -> Option<String> {
        self.modified.map(format_timestamp)
    }

    /// Derives the lookup identifier: the title slug, a hyphen, and the
    /// creation time in epoch seconds (the stored local time read as UTC).
    ///
    /// Returns `None` when the title is empty or `created` is unset.
    pub fn id(&self) -> Option<String> {
        if self.title.is_empty() {
            return None;
        }
        let created = self.created?;
        Some(format!(
            "{}-{}",
            title_slug(&self.title),
            created.and_utc().timestamp()
        ))
    }

    /// A note is valid when its trimmed title is non-empty and both
    /// timestamps are set.
    pub fn is_valid(&self) -> bool {
        !self.title.trim().is_empty() && self.created.is_some() && self.modified.is_some()
    }

    fn touch(&mut self) {
        self.modified = Some(truncate_to_seconds(self.clock.now()));
    }
}

/// Equality covers title, creation time and content only.
impl PartialEq for Note {
    fn eq(&self, other: &Self) -> bool {
        self.title == other.title && self.created == other.created && self.content == other.content
    }
}

impl Eq for Note {}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title)?;
        if let Some(id) = self.id() {
            write!(f, " ({})", id)?;
        }
        Ok(())
    }
}

/// Lowercases `title`, drops everything but ASCII lowercase letters, digits
/// and whitespace, then collapses whitespace runs into single hyphens.
pub fn title_slug(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut in_whitespace = false;
    for c in title.to_lowercase().chars() {
        if c.is_ascii_whitespace() {
            if !in_whitespace {
                slug.push('-');
                in_whitespace = true;
            }
        } else if c.is_ascii_lowercase() || c.is_ascii_digit() {
            slug.push(c);
            in_whitespace = false;
        }
    }
    slug
}

pub fn format_timestamp(time: NaiveDateTime) -> String {
    time.format(TIMESTAMP_FORMAT).to_string()
}

/// Parses a `YYYY-MM-DDTHH:MM:SSZ` header timestamp.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value.trim(), TIMESTAMP_FORMAT).ok()
}

fn truncate_to_seconds(time: NaiveDateTime) -> NaiveDateTime {
    time.with_nanosecond(0).unwrap_or(time)
}
