//! CLI command implementations for markscan.
//!
//! Available commands:
//! - **generate**: Run a generation pass and print, write or check the output
//! - **scan**: Report what a pass would see without emitting anything
//! - **init**: Initialize a new `.markscan.toml` configuration file

pub mod generate;
pub mod init;
pub mod scan;

pub use generate::{run_generate, GenerateConfig};
pub use init::init_config;
pub use scan::{render_terminal_report, run_scan, ScanConfig};
