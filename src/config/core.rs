use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure for markscan
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct MarkscanConfig {
    /// Marker identities the scanner looks for
    #[serde(default)]
    pub markers: MarkersConfig,

    /// Shape and location of the generated source
    #[serde(default)]
    pub output: OutputConfig,

    /// Source tree layout overrides
    #[serde(default)]
    pub source: SourceConfig,

    /// Ignore patterns, relative to `src/`
    #[serde(default)]
    pub ignore: IgnoreConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MarkersConfig {
    /// Path of the registration attribute, e.g. `functions_worker::function`
    #[serde(default = "default_registration_marker")]
    pub registration: String,

    /// Path of the crate-level directive macro
    #[serde(default = "default_directive_macro")]
    pub directive: String,
}

impl Default for MarkersConfig {
    fn default() -> Self {
        Self {
            registration: default_registration_marker(),
            directive: default_directive_macro(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutputConfig {
    /// Module wrapping the generated bindings
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// Type whose associated consts hold the lists
    #[serde(default = "default_container")]
    pub container: String,

    /// File name used when writing into a directory such as `OUT_DIR`
    #[serde(default = "default_file_name")]
    pub file_name: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            container: default_container(),
            file_name: default_file_name(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct SourceConfig {
    /// Crate root file, relative to the project directory
    #[serde(default)]
    pub crate_root: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IgnoreConfig {
    #[serde(default = "default_ignore_patterns")]
    pub patterns: Vec<String>,
}

impl Default for IgnoreConfig {
    fn default() -> Self {
        Self {
            patterns: default_ignore_patterns(),
        }
    }
}

pub fn default_registration_marker() -> String {
    "functions_worker::function".to_string()
}

pub fn default_directive_macro() -> String {
    "markscan::generate_functions_with".to_string()
}

pub fn default_namespace() -> String {
    "functions_attributes".to_string()
}

pub fn default_container() -> String {
    "GenerateFunctionsWith".to_string()
}

pub fn default_file_name() -> String {
    "functions_attributes.rs".to_string()
}

pub fn default_ignore_patterns() -> Vec<String> {
    vec!["bin/**".to_string()]
}
