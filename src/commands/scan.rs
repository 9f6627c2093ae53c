use crate::cli::OutputFormat;
use crate::config::resolve_settings;
use crate::pipeline::{analyze, ScanReport};
use crate::scanner::SourceCorpus;
use anyhow::{Context, Result};
use colored::*;
use std::fmt::Write as _;
use std::path::PathBuf;

pub struct ScanConfig {
    pub path: PathBuf,
    pub format: OutputFormat,
    pub config: Option<PathBuf>,
}

pub fn run_scan(config: ScanConfig) -> Result<()> {
    let settings = resolve_settings(&config.path, config.config.as_deref())
        .with_context(|| format!("Failed to load configuration for {}", config.path.display()))?;
    let corpus = SourceCorpus::discover(&config.path, &settings)?;
    let report = analyze(&corpus, &settings)?;

    match config.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Terminal => print!("{}", render_terminal_report(&report)),
    }
    Ok(())
}

/// Human-readable summary of a scan
pub fn render_terminal_report(report: &ScanReport) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "{}", "Groupings".bold().underline());
    if report.groupings.is_empty() {
        let _ = writeln!(out, "  {}", "none requested".dimmed());
    }
    for entry in &report.classification.entries {
        let _ = writeln!(
            out,
            "  {} {} ({})",
            entry.grouping.binding_name().green().bold(),
            format!("#[{}]", entry.grouping.marker).dimmed(),
            entry.names.len()
        );
        for name in &entry.names {
            let _ = writeln!(out, "    - {}", name);
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "{}", "Attributed functions".bold().underline());
    if report.declarations.is_empty() {
        let _ = writeln!(out, "  {}", "none found".dimmed());
    }
    for declaration in &report.declarations {
        let name = match &declaration.registration_name {
            Some(name) => format!("{:?}", name).cyan().to_string(),
            None => "unregistered".yellow().to_string(),
        };
        let _ = writeln!(
            out,
            "  {} {} {}",
            declaration.qualified_name(),
            name,
            format!("{}:{}", declaration.file.display(), declaration.line).dimmed()
        );
    }

    out
}
