use std::{
    fs,
    path::{Path, PathBuf},
};

use log::{debug, info};
use serde::{Deserialize, Serialize};
use which::which;

use crate::{NotesError, Result};

/// Editors probed on PATH, in order of preference, when none is configured.
const CANDIDATE_EDITORS: [&str; 5] = ["nano", "vim", "vi", "emacs", "pico"];

/// Application configuration settings.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Directory where notes are stored
    pub notes_dir: PathBuf,

    /// Editor command, split shell-style (e.g. `code --wait`)
    pub editor_command: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            notes_dir: PathBuf::from("notes"),
            editor_command: None,
        }
    }
}

impl Config {
    /// Location of the per-user configuration file, if the platform has one.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("notes").join("config.json"))
    }

    /// Loads configuration from `explicit`, or from the default location when
    /// that file exists, or falls back to defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            if !path.is_file() {
                return Err(NotesError::ConfigError {
                    message: format!("config file not found: {}", path.display()),
                });
            }
            return Self::read(path);
        }

        match Self::default_path() {
            Some(path) if path.is_file() => Self::read(&path),
            _ => {
                debug!("No configuration file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    fn read(path: &Path) -> Result<Self> {
        debug!("Reading configuration from {}", path.display());
        let raw = fs::read_to_string(path)?;
        serde_json::from_str(&raw).map_err(|e| NotesError::ConfigError {
            message: format!("{}: {}", path.display(), e),
        })
    }

    /// Writes the configuration as pretty JSON, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        info!("Configuration written to {}", path.display());
        Ok(())
    }

    // This method provides smart fallbacks when no editor is configured
    pub fn get_editor_command(&self) -> String {
        // First try the configured editor
        if let Some(editor) = self.editor_command.as_ref().filter(|e| !e.trim().is_empty()) {
            return editor.clone();
        }

        // Then try environment variable
        if let Ok(editor) = std::env::var("EDITOR") {
            if !editor.trim().is_empty() {
                return editor;
            }
        }

        // Then the first common editor on PATH
        for editor in CANDIDATE_EDITORS {
            if which(editor).is_ok() {
                return editor.to_string();
            }
        }

        // Fall back to platform defaults
        if cfg!(windows) {
            "notepad".to_string()
        } else if cfg!(target_os = "macos") {
            "open -e".to_string()
        } else {
            "vi".to_string()
        }
    }
}
