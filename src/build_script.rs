//! Helper for running a pass from a crate's `build.rs`.
//!
//! ```ignore
//! // build.rs
//! fn main() {
//!     markscan::build_script::generate_to_out_dir().unwrap();
//! }
//!
//! // src/lib.rs
//! include!(concat!(env!("OUT_DIR"), "/functions_attributes.rs"));
//! ```

use crate::config::{find_config_file, resolve_settings};
use crate::core::{Error, Result};
use crate::pipeline::{generate_for_project, write_output, WriteOutcome};
use std::path::{Path, PathBuf};

/// Scan the crate being built and write the result into `OUT_DIR`.
///
/// Returns the written path, or `None` if the crate has no directives.
pub fn generate_to_out_dir() -> Result<Option<PathBuf>> {
    let manifest_dir = env_path("CARGO_MANIFEST_DIR")?;
    let out_dir = env_path("OUT_DIR")?;
    generate_into(&manifest_dir, &out_dir)
}

/// Same as [`generate_to_out_dir`] with explicit directories
pub fn generate_into(manifest_dir: &Path, out_dir: &Path) -> Result<Option<PathBuf>> {
    println!("cargo:rerun-if-changed={}", manifest_dir.join("src").display());
    if let Some(config) = find_config_file(manifest_dir) {
        println!("cargo:rerun-if-changed={}", config.display());
    }

    let settings = resolve_settings(manifest_dir, None)?;
    let generated = generate_for_project(manifest_dir, &settings)?;
    let path = out_dir.join(&settings.file_name);

    match write_output(&path, generated.as_ref())? {
        WriteOutcome::Written | WriteOutcome::Unchanged => Ok(Some(path)),
        WriteOutcome::Removed | WriteOutcome::Skipped => Ok(None),
    }
}

fn env_path(name: &str) -> Result<PathBuf> {
    std::env::var_os(name)
        .map(PathBuf::from)
        .ok_or_else(|| Error::Configuration(format!("{name} is not set; run from a build script")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_generate_into_writes_file() {
        let project = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let src = project.path().join("src");
        fs::create_dir_all(&src).unwrap();
        fs::write(
            src.join("lib.rs"),
            concat!(
                "markscan::generate_functions_with!(Tag);\n",
                "pub struct Tag;\n",
                "#[Tag]\n",
                "#[functions_worker::function(\"One\")]\n",
                "fn one() {}\n",
            ),
        )
        .unwrap();

        let path = generate_into(project.path(), out.path()).unwrap().unwrap();
        let contents = fs::read_to_string(path).unwrap();
        assert!(contents.contains("\"One\","));
    }

    #[test]
    fn test_generate_into_without_directives_writes_nothing() {
        let project = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let src = project.path().join("src");
        fs::create_dir_all(&src).unwrap();
        fs::write(src.join("main.rs"), "fn main() {}\n").unwrap();

        assert_eq!(generate_into(project.path(), out.path()).unwrap(), None);
        assert!(fs::read_dir(out.path()).unwrap().next().is_none());
    }
}
