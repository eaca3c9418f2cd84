//! Command-line interface: argument definitions and the command handler.

mod app;
mod main;

pub use app::*;
pub use main::*;
