use anyhow::Result;
use clap::Parser;
use markscan::cli::{init_logging, Cli, Commands};
use markscan::commands::{GenerateConfig, ScanConfig};
use markscan::observability::install_panic_hook;

fn main() -> Result<()> {
    install_panic_hook();
    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            path,
            output,
            check,
            config,
            verbosity,
        } => {
            init_logging(verbosity);
            markscan::commands::run_generate(GenerateConfig {
                path,
                output,
                check,
                config,
            })
        }
        Commands::Scan {
            path,
            format,
            config,
            verbosity,
        } => {
            init_logging(verbosity);
            markscan::commands::run_scan(ScanConfig {
                path,
                format,
                config,
            })
        }
        Commands::Init { force } => {
            init_logging(0);
            markscan::commands::init_config(force)
        }
    }
}
