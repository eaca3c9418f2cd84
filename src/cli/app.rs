//! CLI module for the notes application
//!
//! This module handles the command-line interface for interacting with the
//! note repository.
use std::io::{stdin, stdout, Write};

use console::style;
use log::{debug, info};

use crate::{
    content_snippet, parse_tags, select_by_identifier, select_matching, select_tagged, truncate,
    Commands, Editor, Note, NoteRepository, NoteStats, NotesError, Result,
};

const LIST_WIDTH: usize = 50;
const READ_WIDTH: usize = 60;
const STATS_WIDTH: usize = 40;
const SNIPPET_RADIUS: usize = 30;
const EMPTY_MESSAGE: &str = "No notes found. Create your first note with 'notes create'";

/// CLI Application handler - processes CLI commands and interfaces with NoteRepository
pub struct App {
    /// The note repository backend
    repository: NoteRepository,

    /// Used by `create` and `edit` to obtain note content
    editor: Box<dyn Editor>,

    /// Whether to display verbose output
    verbose: bool,
}

impl App {
    /// Create a new CLI application with the given repository and editor
    pub fn new(repository: NoteRepository, editor: Box<dyn Editor>, verbose: bool) -> Self {
        Self {
            repository,
            editor,
            verbose,
        }
    }

    /// Run the CLI application with the given command
    pub fn run(&self, command: Commands) -> Result<()> {
        debug!("Running command: {:?}", command);
        match command {
            Commands::Create { title, tag } => self.create_note(title, tag),
            Commands::List { tag } => self.list_notes(tag),
            Commands::Read { identifier } => self.read_note(&identifier),
            Commands::Edit { identifier } => self.edit_note(&identifier),
            Commands::Delete { identifier, force } => self.delete_note(&identifier, force),
            Commands::Search {
                query,
                content,
                title,
            } => self.search_notes(&query, title, content),
            Commands::Stats => self.show_stats(),
        }
    }

    fn create_note(&self, title: Option<String>, tags: Option<String>) -> Result<()> {
        let title = match title.filter(|t| !t.trim().is_empty()) {
            Some(title) => title.trim().to_string(),
            None => prompt_for_title()?,
        };

        let clock = self.repository.clock();
        let mut note = Note::with_clock(title.as_str(), "", clock.clone());
        for tag in parse_tags(tags) {
            note.add_tag(tag);
        }

        let template = format!("# {}\n\nWrite your note content here...\n", title);
        let content = self
            .editor
            .edit_content(&template, &format!("note-{}", clock.epoch_millis()))?;

        // An untouched template means the user wrote nothing
        if content != template {
            note.set_content(content);
        }

        self.repository.save(&mut note)?;

        println!("Note created successfully: {}", note.title());
        println!("ID: {}", note.id().unwrap_or_default());
        if self.verbose {
            if let Some(path) = note.file_path() {
                println!("File: {}", path.display());
            }
        }
        Ok(())
    }

    /// List every note, or only those carrying `tag`
    fn list_notes(&self, tag: Option<String>) -> Result<()> {
        let notes = self.load_notes()?;
        let notes = match &tag {
            Some(tag) => select_tagged(notes, tag),
            None => notes,
        };

        if notes.is_empty() {
            match tag {
                Some(tag) => println!("No notes found with tag: {}", tag),
                None => println!("{}", EMPTY_MESSAGE),
            }
            return Ok(());
        }

        match &tag {
            Some(tag) => println!("Notes with tag '{}':", tag),
            None => println!("All notes:"),
        }
        println!("{}", rule('─', LIST_WIDTH));
        for note in &notes {
            self.print_note_row(note);
        }
        println!("{}", rule('─', LIST_WIDTH));
        println!("Total: {} notes", notes.len());
        Ok(())
    }

    fn read_note(&self, identifier: &str) -> Result<()> {
        let note = self.get_note(identifier)?;

        println!("{}", rule('═', READ_WIDTH));
        println!("Title: {}", style(note.title()).bold());
        println!("Created: {}", note.formatted_created().unwrap_or_default());
        println!("Modified: {}", note.formatted_modified().unwrap_or_default());

        if !note.tags().is_empty() {
            println!("Tags: {}", style(note.tags().join(", ")).cyan());
        }
        if let Some(author) = note.author() {
            println!("Author: {}", author);
        }
        if let Some(status) = note.status() {
            println!("Status: {}", status);
        }
        if let Some(priority) = note.priority() {
            println!("Priority: {}", priority);
        }
        if self.verbose {
            if let Some(id) = note.id() {
                println!("ID: {}", id);
            }
            if let Some(path) = note.file_path() {
                println!("File: {}", path.display());
            }
        }

        println!("{}", rule('═', READ_WIDTH));
        println!();
        println!("{}", note.content());
        println!();
        Ok(())
    }

    fn edit_note(&self, identifier: &str) -> Result<()> {
        let mut note = self.get_note(identifier)?;

        let current = if note.content().is_empty() {
            format!("# {}\n\n", note.title())
        } else {
            note.content().to_string()
        };

        let hint = format!("edit-{}", note.id().unwrap_or_default());
        let edited = self.editor.edit_content(&current, &hint)?;

        if edited == current {
            println!("No changes made to: {}", note.title());
            return Ok(());
        }

        note.set_content(edited);

        // Replace the old file with a freshly named one
        self.repository.delete(&note)?;
        self.repository.save(&mut note)?;

        info!("Note {} rewritten", note.title());
        println!("Note updated: {}", note.title());
        Ok(())
    }

    fn delete_note(&self, identifier: &str, force: bool) -> Result<()> {
        let note = self.get_note(identifier)?;

        if !force && !confirm_deletion(&note)? {
            println!("Deletion cancelled");
            return Ok(());
        }

        if !self.repository.delete(&note)? {
            return Err(NotesError::ApplicationError {
                message: "Failed to delete note file".to_string(),
            });
        }

        println!("Note deleted: {}", note.title());
        Ok(())
    }

    fn search_notes(&self, query: &str, title_only: bool, content_only: bool) -> Result<()> {
        let results = select_matching(self.load_notes()?, query, title_only, content_only);

        if results.is_empty() {
            println!("No notes found matching: {}", query);
            return Ok(());
        }

        println!("Search results for '{}':", query);
        println!("{}", rule('─', LIST_WIDTH));
        for note in &results {
            self.print_note_row(note);

            let snippet = content_snippet(note.content(), query, SNIPPET_RADIUS);
            if !snippet.is_empty() {
                println!("  {}", snippet);
            }
            println!();
        }
        println!("{}", rule('─', LIST_WIDTH));
        println!("Found {} notes", results.len());
        Ok(())
    }

    fn show_stats(&self) -> Result<()> {
        let notes = self.load_notes()?;
        if notes.is_empty() {
            println!("{}", EMPTY_MESSAGE);
            return Ok(());
        }

        let stats = NoteStats::from_notes(&notes);

        println!("{}", style("Notes Statistics").bold());
        println!("{}", rule('═', STATS_WIDTH));
        println!("Total notes: {}", stats.total_notes);
        println!("Unique tags: {}", stats.unique_tags.len());
        if !stats.unique_tags.is_empty() {
            println!("Tags: {}", stats.unique_tags.join(", "));
        }
        println!("Total words: {}", stats.total_words);
        println!("Average words per note: {}", stats.average_words);
        if stats.notes_with_authors > 0 {
            println!("Notes with authors: {}", stats.notes_with_authors);
        }
        Ok(())
    }

    /// Every readable note. Files that fail to load are reported on stderr.
    fn load_notes(&self) -> Result<Vec<Note>> {
        let loaded = self.repository.load_all()?;
        for failure in &loaded.failures {
            eprintln!(
                "Warning: Could not read note file {}: {}",
                failure.path.display(),
                failure.message
            );
        }
        Ok(loaded.notes)
    }

    fn get_note(&self, identifier: &str) -> Result<Note> {
        select_by_identifier(self.load_notes()?, identifier).ok_or_else(|| {
            NotesError::NoteNotFound {
                identifier: identifier.to_string(),
            }
        })
    }

    fn print_note_row(&self, note: &Note) {
        let tags = if note.tags().is_empty() {
            String::new()
        } else {
            format!("[{}]", note.tags().join(", "))
        };
        println!(
            "{:<30} {}",
            truncate(note.title(), 28),
            style(tags).cyan()
        );
        if self.verbose {
            if let Some(id) = note.id() {
                println!("  id: {}", id);
            }
        }
    }
}

/// A horizontal rule, narrowed to the terminal when it is smaller.
fn rule(ch: char, width: usize) -> String {
    let term_width = terminal_size::terminal_size()
        .map(|(w, _)| w.0 as usize)
        .unwrap_or(width);
    ch.to_string().repeat(term_width.min(width))
}

fn prompt_for_title() -> Result<String> {
    print!("Enter note title: ");
    stdout().flush()?;

    let mut input = String::new();
    stdin().read_line(&mut input)?;

    let input = input.trim();
    if input.is_empty() {
        Ok("Untitled Note".to_string())
    } else {
        Ok(input.to_string())
    }
}

fn confirm_deletion(note: &Note) -> Result<bool> {
    println!("About to delete note: {}", note.title());
    print!("Are you sure? (y/N): ");
    stdout().flush()?;

    let mut input = String::new();
    stdin().read_line(&mut input)?;

    let input = input.trim().to_lowercase();
    Ok(input == "y" || input == "yes")
}
