use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "markscan")]
#[command(
    about = "Group registered functions by marker attributes and emit the lists as Rust source",
    long_about = None
)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a generation pass over a crate
    Generate {
        /// Crate directory (containing src/)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Verify that the output file is up to date instead of writing it
        #[arg(long, requires = "output")]
        check: bool,

        /// Configuration file
        #[arg(short, long, env = "MARKSCAN_CONFIG")]
        config: Option<PathBuf>,

        /// Increase verbosity level (can be repeated: -v, -vv)
        #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
        verbosity: u8,
    },

    /// Report directives, attributed functions and groupings without emitting
    Scan {
        /// Crate directory (containing src/)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "terminal")]
        format: OutputFormat,

        /// Configuration file
        #[arg(short, long, env = "MARKSCAN_CONFIG")]
        config: Option<PathBuf>,

        /// Increase verbosity level (can be repeated: -v, -vv)
        #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
        verbosity: u8,
    },

    /// Initialize configuration file
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Terminal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing_generate_command() {
        let cli = Cli::parse_from([
            "markscan",
            "generate",
            "/test/crate",
            "--output",
            "src/generated.rs",
            "--check",
            "-vv",
        ]);

        match cli.command {
            Commands::Generate {
                path,
                output,
                check,
                verbosity,
                ..
            } => {
                assert_eq!(path, PathBuf::from("/test/crate"));
                assert_eq!(output, Some(PathBuf::from("src/generated.rs")));
                assert!(check);
                assert_eq!(verbosity, 2);
            }
            _ => panic!("Expected Generate command"),
        }
    }

    #[test]
    fn test_check_requires_output() {
        let result = Cli::try_parse_from(["markscan", "generate", ".", "--check"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_parsing_scan_defaults() {
        let cli = Cli::parse_from(["markscan", "scan"]);

        match cli.command {
            Commands::Scan { path, format, .. } => {
                assert_eq!(path, PathBuf::from("."));
                assert_eq!(format, OutputFormat::Terminal);
            }
            _ => panic!("Expected Scan command"),
        }
    }

    #[test]
    fn test_cli_parsing_init_command() {
        let cli = Cli::parse_from(["markscan", "init", "--force"]);

        match cli.command {
            Commands::Init { force } => assert!(force),
            _ => panic!("Expected Init command"),
        }
    }
}
