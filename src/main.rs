use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use log::{debug, info};

use notes::{App, Cli, Commands, Config, ExternalEditor, NoteRepository, Result};

pub fn initialize_logger(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp_secs()
        .format_module_path(true)
        .init();

    debug!("Logger initialized");
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    initialize_logger(cli.verbose);

    let Some(command) = cli.command else {
        // No subcommand: show usage
        return match Cli::command().print_help() {
            Ok(()) => ExitCode::SUCCESS,
            Err(_) => ExitCode::FAILURE,
        };
    };

    match run(cli.config, cli.notes_dir, cli.verbose, command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(
    config_path: Option<std::path::PathBuf>,
    notes_dir: Option<std::path::PathBuf>,
    verbose: bool,
    command: Commands,
) -> Result<()> {
    let mut config = Config::load(config_path.as_deref())?;
    if let Some(dir) = notes_dir {
        config.notes_dir = dir;
    }
    info!("Using notes directory: {}", config.notes_dir.display());

    let repository = NoteRepository::new(&config.notes_dir)?;
    let editor = ExternalEditor::new(config.get_editor_command());
    debug!("Editor command: {}", editor.command());

    App::new(repository, Box::new(editor), verbose).run(command)
}
