//! Error types for the notes application.
//!
//! This module defines custom error types that categorize different failures
//! that can occur during note management operations.

use std::{io, path::PathBuf};

use thiserror::Error;

/// The main error type for the notes application.
#[derive(Error, Debug)]
pub enum NotesError {
    /// Errors related to file I/O operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Errors related to reading or writing the configuration file.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// No note matched the given ID or title.
    #[error("Note not found: {identifier}")]
    NoteNotFound { identifier: String },

    /// A note file could not be decoded.
    #[error("Invalid note format: {message}")]
    InvalidFormat { message: String },

    /// A note failed validation before being written.
    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    /// Directory creation or access failed.
    #[error("Failed to create or access directory {path}: {source}")]
    DirectoryError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Errors related to configuration.
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("{message}")]
    EditorError { message: String },

    /// Generic application error with a custom message.
    #[error("{message}")]
    ApplicationError { message: String },
}
