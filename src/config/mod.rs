// Core configuration types
mod core;
mod loader;
pub mod validation;

pub use core::{
    default_container, default_directive_macro, default_file_name, default_ignore_patterns,
    default_namespace, default_registration_marker, IgnoreConfig, MarkersConfig, MarkscanConfig,
    OutputConfig, SourceConfig,
};
pub use loader::{
    default_config_toml, directory_ancestors, find_config_file, load_config, load_config_from,
    parse_config, CONFIG_FILE_NAME,
};
pub use validation::{validate_config, GeneratorSettings};

use crate::core::Result;
use std::path::Path;

/// Resolve the settings for a project: an explicit file wins, otherwise the
/// nearest `.markscan.toml` above `project_dir`, otherwise defaults.
pub fn resolve_settings(project_dir: &Path, explicit: Option<&Path>) -> Result<GeneratorSettings> {
    let config = match explicit {
        Some(path) => load_config_from(path)?,
        None => load_config(project_dir),
    };
    validate_config(&config)
}
