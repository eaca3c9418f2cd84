//! Personal notes library
//!
//! This library provides functionality for creating, storing, searching, and
//! managing notes kept as individual text files with a metadata header.

mod cli;
mod clock;
mod config;
mod editor;
mod errors;
mod format;
mod helper;
mod note;
mod storage;
mod types;

// Re-export key components
pub use cli::*;
pub use clock::*;
pub use config::*;
pub use editor::*;
pub use errors::*;
pub use format::*;
pub use helper::*;
pub use note::*;
pub use storage::*;
pub use types::*;
