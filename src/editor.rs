//! Interactive editing of note content.
//!
//! Commands depend on the [`Editor`] trait so tests can substitute an
//! in-process double for the external program.
use std::{
    fs::read_to_string,
    io::Write,
    path::Path,
    process::Command,
};

use log::{debug, info};
use shell_words::split;
use tempfile::Builder;

use crate::{NotesError, Result};

/// Something that lets the user edit a piece of text.
pub trait Editor {
    /// Presents `initial` for editing and returns the edited text.
    ///
    /// `name_hint` labels the scratch file the text is edited in.
    fn edit_content(&self, initial: &str, name_hint: &str) -> Result<String>;
}

/// Runs an external editor program on a temporary file.
#[derive(Debug, Clone)]
pub struct ExternalEditor {
    command: String,
}

impl ExternalEditor {
    /// `command` is split shell-style; the file path is appended as the last argument.
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    fn launch(&self, file_path: &Path) -> Result<()> {
        // Handle shell-like command parsing
        let args = split(&self.command).map_err(|e| NotesError::EditorError {
            message: format!("Failed to parse editor command: {}", e),
        })?;

        let Some((program, rest)) = args.split_first() else {
            return Err(NotesError::EditorError {
                message: "Empty editor command".to_string(),
            });
        };

        debug!("Launching editor {} on {}", program, file_path.display());
        let status = Command::new(program)
            .args(rest)
            .arg(file_path)
            .status()
            .map_err(|e| NotesError::EditorError {
                message: format!("Failed to execute editor command '{}': {}", program, e),
            })?;

        if !status.success() {
            return Err(NotesError::EditorError {
                message: match status.code() {
                    Some(code) => format!("Editor exited with code {}", code),
                    None => "Editor was terminated by a signal".to_string(),
                },
            });
        }

        Ok(())
    }
}

impl Editor for ExternalEditor {
    fn edit_content(&self, initial: &str, name_hint: &str) -> Result<String> {
        // Removed on drop, whether or not the editor succeeds
        let mut temp_file = Builder::new()
            .prefix(&format!("{}-", name_hint))
            .suffix(".md")
            .tempfile()?;
        temp_file.write_all(initial.as_bytes())?;
        temp_file.flush()?;

        info!("Opening editor. Save and exit when done...");
        self.launch(temp_file.path())?;

        let edited = read_to_string(temp_file.path())?;
        Ok(edited)
    }
}
