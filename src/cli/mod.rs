//! Command-line interface: argument parsing (`args`) and runtime setup (`setup`).

pub mod args;
pub mod setup;

pub use args::{Cli, Commands, OutputFormat};
pub use setup::{default_filter, init_logging};
