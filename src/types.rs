//! Shared data structures for the notes application.
//!
//! This module contains the result alias, load reports, statistics and the
//! subcommand definitions.
use std::{collections::BTreeSet, path::PathBuf};

use clap::Subcommand;

use crate::{count_words, Note, NotesError};

/// A specialized Result type for notes operations.
pub type Result<T> = std::result::Result<T, NotesError>;

/// A note file that could not be read during a bulk load.
#[derive(Debug, Clone)]
pub struct LoadFailure {
    pub path: PathBuf,
    pub message: String,
}

/// Outcome of loading every note file in the notes directory.
#[derive(Debug, Default)]
pub struct LoadedNotes {
    /// Notes that decoded successfully, in file name order
    pub notes: Vec<Note>,
    /// Files that were skipped
    pub failures: Vec<LoadFailure>,
}

/// Aggregate figures shown by the `stats` command.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NoteStats {
    pub total_notes: usize,
    /// Distinct tags across all notes, sorted
    pub unique_tags: Vec<String>,
    pub total_words: usize,
    /// Integer average; zero when there are no notes
    pub average_words: usize,
    /// Notes whose author is set and not blank
    pub notes_with_authors: usize,
}

impl NoteStats {
    pub fn from_notes(notes: &[Note]) -> Self {
        let unique_tags: BTreeSet<&str> = notes
            .iter()
            .flat_map(|note| note.tags().iter().map(String::as_str))
            .collect();

        let total_words: usize = notes.iter().map(|note| count_words(note.content())).sum();

        let notes_with_authors = notes
            .iter()
            .filter(|note| note.author().is_some_and(|a| !a.trim().is_empty()))
            .count();

        NoteStats {
            total_notes: notes.len(),
            unique_tags: unique_tags.into_iter().map(str::to_string).collect(),
            total_words,
            average_words: if notes.is_empty() {
                0
            } else {
                total_words / notes.len()
            },
            notes_with_authors,
        }
    }
}

/// Available subcommands for the notes application
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a new note
    Create {
        /// Note title (prompted for when omitted)
        #[clap(short, long)]
        title: Option<String>,

        /// Tags to add to the note (comma-separated)
        #[clap(long)]
        tag: Option<String>,
    },

    /// List all notes or filter by tag
    List {
        /// Filter notes by tag
        #[clap(long)]
        tag: Option<String>,
    },

    /// Display a specific note
    Read {
        /// Note ID or title to read
        identifier: String,
    },

    /// Edit a specific note
    Edit {
        /// Note ID or title to edit
        identifier: String,
    },

    /// Delete a specific note
    Delete {
        /// Note ID or title to delete
        identifier: String,

        /// Force delete without confirmation
        #[clap(short, long)]
        force: bool,
    },

    /// Search notes by content, title, or tags
    Search {
        /// Search query
        query: String,

        /// Search in content only
        #[clap(short, long, conflicts_with = "title")]
        content: bool,

        /// Search in titles only
        #[clap(short, long)]
        title: bool,
    },

    /// Display statistics about your notes
    Stats,
}
