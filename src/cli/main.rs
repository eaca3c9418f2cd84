use std::path::PathBuf;

use clap::Parser;

use crate::Commands;

/// Main CLI application arguments and command structure
#[derive(Parser, Debug)]
#[clap(
    name = "notes",
    version,
    about = "Personal Notes Manager - A CLI tool for managing notes with YAML metadata"
)]
pub struct Cli {
    /// Path to the configuration file
    #[clap(long, value_parser)]
    pub config: Option<PathBuf>,

    /// Path to the notes directory
    #[clap(long, value_parser)]
    pub notes_dir: Option<PathBuf>,

    /// Verbose output mode
    #[clap(short, long)]
    pub verbose: bool,

    /// Subcommands for the notes application
    #[clap(subcommand)]
    pub command: Option<Commands>,
}
