use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
    sync::Arc,
};

use log::{debug, error, info, trace, warn};
use tempfile::NamedTempFile;
use walkdir::WalkDir;

use crate::{
    contains_ignore_case, encode, load_note_from_file, title_slug, Clock, LoadFailure,
    LoadedNotes, Note, NotesError, Result, SystemClock, NOTE_EXTENSION,
};

/// Longest title slug used in a note file name.
const MAX_FILENAME_SLUG: usize = 50;

/// Manages the notes directory: loading, saving, deleting and querying notes.
///
/// Nothing is cached; every query re-reads the directory.
#[derive(Debug, Clone)]
pub struct NoteRepository {
    /// Directory holding the `.note` files
    notes_dir: PathBuf,

    /// Time source handed to every loaded note and used for file name stamps
    clock: Arc<dyn Clock>,
}

impl NoteRepository {
    /// Opens the repository at `notes_dir`, creating the directory if needed.
    pub fn new(notes_dir: impl Into<PathBuf>) -> Result<Self> {
        Self::with_clock(notes_dir, Arc::new(SystemClock))
    }

    pub fn with_clock(notes_dir: impl Into<PathBuf>, clock: Arc<dyn Clock>) -> Result<Self> {
        let notes_dir = notes_dir.into();

        if !notes_dir.exists() {
            debug!(
                "Notes directory does not exist, creating: {}",
                notes_dir.display()
            );
            fs::create_dir_all(&notes_dir).map_err(|e| {
                error!("Failed to create notes directory: {}", e);
                NotesError::DirectoryError {
                    path: notes_dir.clone(),
                    source: e,
                }
            })?;
        }

        if !notes_dir.is_dir() {
            error!("Notes path is not a directory: {}", notes_dir.display());
            return Err(NotesError::DirectoryError {
                path: notes_dir.clone(),
                source: std::io::Error::new(std::io::ErrorKind::Other, "not a directory"),
            });
        }

        Ok(Self { notes_dir, clock })
    }

    pub fn notes_dir(&self) -> &Path {
        &self.notes_dir
    }

    pub fn clock(&self) -> Arc<dyn Clock> {
        Arc::clone(&self.clock)
    }

    /// Loads every note file, in file name order, collecting the ones that
    /// cannot be decoded instead of failing.
    pub fn load_all(&self) -> Result<LoadedNotes> {
        let mut loaded = LoadedNotes::default();

        for entry in WalkDir::new(&self.notes_dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| {
                error!("Failed to read notes directory: {}", e);
                NotesError::from(std::io::Error::from(e))
            })?;
            let path = entry.path();

            if !entry.file_type().is_file()
                || path.extension().map_or(true, |ext| ext != NOTE_EXTENSION)
            {
                trace!("Skipping non-note entry: {}", path.display());
                continue;
            }

            match load_note_from_file(path, self.clock()) {
                Ok(note) => loaded.notes.push(note),
                Err(e) => {
                    loaded.failures.push(LoadFailure {
                        path: path.to_path_buf(),
                        message: e.to_string(),
                    });
                }
            }
        }

        debug!(
            "Loaded {} notes ({} unreadable) from {}",
            loaded.notes.len(),
            loaded.failures.len(),
            self.notes_dir.display()
        );
        Ok(loaded)
    }

    /// All readable notes. Unreadable files are logged and skipped.
    pub fn list_all(&self) -> Result<Vec<Note>> {
        let loaded = self.load_all()?;
        for failure in &loaded.failures {
            warn!(
                "Could not read note file {}: {}",
                failure.path.display(),
                failure.message
            );
        }
        Ok(loaded.notes)
    }

    /// Notes carrying exactly `tag`.
    pub fn filter_by_tag(&self, tag: &str) -> Result<Vec<Note>> {
        Ok(select_tagged(self.list_all()?, tag))
    }

    /// Finds a note by exact ID, falling back to the first note whose title
    /// contains `identifier` (case-insensitive).
    pub fn find(&self, identifier: &str) -> Result<Option<Note>> {
        Ok(select_by_identifier(self.list_all()?, identifier))
    }

    /// Like [`find`](Self::find) but a miss is an error.
    pub fn get(&self, identifier: &str) -> Result<Note> {
        self.find(identifier)?
            .ok_or_else(|| NotesError::NoteNotFound {
                identifier: identifier.to_string(),
            })
    }

    /// Case-insensitive substring search.
    ///
    /// `title_only` restricts the match to titles and takes precedence over
    /// `content_only`; with neither, title, content, tags and author are checked.
    pub fn search(&self, query: &str, title_only: bool, content_only: bool) -> Result<Vec<Note>> {
        Ok(select_matching(
            self.list_all()?,
            query,
            title_only,
            content_only,
        ))
    }

    /// Writes `note` to a new file in the notes directory and records the
    /// path on the note.
    pub fn save(&self, note: &mut Note) -> Result<()> {
        if !note.is_valid() {
            return Err(NotesError::ValidationFailed {
                message: "a note needs a non-empty title and both timestamps".to_string(),
            });
        }

        let file_path = self.notes_dir.join(self.generate_file_name(note.title()));
        debug!("File path for note: {}", file_path.display());

        let mut temp_file = NamedTempFile::new_in(&self.notes_dir).map_err(|e| {
            error!("Failed to create temporary file: {}", e);
            e
        })?;

        temp_file.write_all(encode(note).as_bytes()).map_err(|e| {
            error!("Failed to write to temporary file: {}", e);
            e
        })?;
        temp_file.flush()?;

        temp_file.persist(&file_path).map_err(|e| {
            error!(
                "Failed to persist file {}: {}",
                file_path.display(),
                e.error
            );
            NotesError::Io(e.error)
        })?;

        note.set_file_path(Some(file_path));
        info!("Note saved successfully: {}", note.title());
        Ok(())
    }

    /// Removes the note's backing file. Returns `false` when the note has no
    /// path or the file is already gone.
    pub fn delete(&self, note: &Note) -> Result<bool> {
        let Some(path) = note.file_path() else {
            debug!("Note has no file path, nothing to delete");
            return Ok(false);
        };

        if !path.exists() {
            debug!("Note file already missing: {}", path.display());
            return Ok(false);
        }

        fs::remove_file(path).map_err(|e| {
            error!("Failed to delete note file {}: {}", path.display(), e);
            e
        })?;
        info!("Deleted note file: {}", path.display());
        Ok(true)
    }

    /// `<slug>-<epoch millis>.note`, the slug clamped to the title length and
    /// 50 characters.
    fn generate_file_name(&self, title: &str) -> String {
        let slug = title_slug(title);
        let limit = title.chars().count().min(MAX_FILENAME_SLUG);
        let stem: String = slug.chars().take(limit).collect();
        format!("{}-{}.{}", stem, self.clock.epoch_millis(), NOTE_EXTENSION)
    }
}

/// Keeps the notes carrying exactly `tag`.
pub fn select_tagged(notes: Vec<Note>, tag: &str) -> Vec<Note> {
    let notes: Vec<Note> = notes.into_iter().filter(|note| note.has_tag(tag)).collect();
    info!("Found {} notes with tag: {}", notes.len(), tag);
    notes
}

/// The note whose ID is `identifier`, else the first whose title contains it.
pub fn select_by_identifier(notes: Vec<Note>, identifier: &str) -> Option<Note> {
    if let Some(pos) = notes
        .iter()
        .position(|note| note.id().as_deref() == Some(identifier))
    {
        debug!("Found note by ID: {}", identifier);
        return notes.into_iter().nth(pos);
    }

    let found = notes
        .into_iter()
        .find(|note| contains_ignore_case(note.title(), identifier));
    if found.is_some() {
        debug!("Found note by title match: {}", identifier);
    } else {
        debug!("Note not found: {}", identifier);
    }
    found
}

/// Keeps the notes matching `query`, see [`NoteRepository::search`].
pub fn select_matching(
    notes: Vec<Note>,
    query: &str,
    title_only: bool,
    content_only: bool,
) -> Vec<Note> {
    info!("Searching notes with query: '{}'", query);
    let notes: Vec<Note> = notes
        .into_iter()
        .filter(|note| matches_query(note, query, title_only, content_only))
        .collect();
    info!("Found {} matching notes", notes.len());
    notes
}

fn matches_query(note: &Note, query: &str, title_only: bool, content_only: bool) -> bool {
    if title_only {
        return contains_ignore_case(note.title(), query);
    }
    if content_only {
        return contains_ignore_case(note.content(), query);
    }

    contains_ignore_case(note.title(), query)
        || contains_ignore_case(note.content(), query)
        || note.tags().iter().any(|tag| contains_ignore_case(tag, query))
        || note.author().is_some_and(|author| contains_ignore_case(author, query))
}
