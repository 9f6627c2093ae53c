//! Turns the raw TOML configuration into checked generator settings.

use super::core::MarkscanConfig;
use crate::core::{Error, ItemPath, Result};
use std::path::PathBuf;

/// Configuration after validation, in the types the pipeline works with
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorSettings {
    pub registration_marker: ItemPath,
    pub directive_macro: ItemPath,
    pub namespace: String,
    pub container: String,
    pub file_name: String,
    pub crate_root: Option<PathBuf>,
    /// Globs matched against paths relative to `src/`
    pub ignore_patterns: Vec<String>,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            registration_marker: ItemPath::new(["functions_worker", "function"]),
            directive_macro: ItemPath::new(["markscan", "generate_functions_with"]),
            namespace: super::core::default_namespace(),
            container: super::core::default_container(),
            file_name: super::core::default_file_name(),
            crate_root: None,
            ignore_patterns: super::core::default_ignore_patterns(),
        }
    }
}

pub fn validate_config(config: &MarkscanConfig) -> Result<GeneratorSettings> {
    let registration_marker =
        parse_marker_path("markers.registration", &config.markers.registration)?;
    let directive_macro = parse_marker_path("markers.directive", &config.markers.directive)?;
    let namespace = parse_identifier("output.namespace", &config.output.namespace)?;
    let container = parse_identifier("output.container", &config.output.container)?;

    if config.output.file_name.trim().is_empty() {
        return Err(Error::Configuration(
            "output.file_name must not be empty".to_string(),
        ));
    }

    for pattern in &config.ignore.patterns {
        glob::Pattern::new(pattern)?;
    }

    Ok(GeneratorSettings {
        registration_marker,
        directive_macro,
        namespace,
        container,
        file_name: config.output.file_name.clone(),
        crate_root: config.source.crate_root.clone(),
        ignore_patterns: config.ignore.patterns.clone(),
    })
}

fn parse_marker_path(key: &str, value: &str) -> Result<ItemPath> {
    ItemPath::parse(value)
        .ok_or_else(|| Error::Configuration(format!("{key}: `{value}` is not a Rust path")))
}

fn parse_identifier(key: &str, value: &str) -> Result<String> {
    syn::parse_str::<syn::Ident>(value.trim())
        .map(|ident| ident.to_string())
        .map_err(|_| Error::Configuration(format!("{key}: `{value}` is not a Rust identifier")))
}
