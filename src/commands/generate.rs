use crate::config::resolve_settings;
use crate::pipeline::{check_output, generate_for_project, write_output, WriteOutcome};
use anyhow::{Context, Result};
use std::path::PathBuf;

pub struct GenerateConfig {
    pub path: PathBuf,
    pub output: Option<PathBuf>,
    pub check: bool,
    pub config: Option<PathBuf>,
}

/// Run a pass and deliver the result.
///
/// Without `output` the generated source goes to stdout. With `check`, the
/// output file is compared instead of written and a mismatch is an error.
pub fn run_generate(config: GenerateConfig) -> Result<()> {
    let settings = resolve_settings(&config.path, config.config.as_deref())
        .with_context(|| format!("Failed to load configuration for {}", config.path.display()))?;
    let generated = generate_for_project(&config.path, &settings)?;

    let Some(output) = config.output else {
        if let Some(generated) = generated {
            print!("{}", generated.contents);
        }
        return Ok(());
    };

    if config.check {
        check_output(&output, generated.as_ref())?;
        eprintln!("{} is up to date", output.display());
        return Ok(());
    }

    match write_output(&output, generated.as_ref())? {
        WriteOutcome::Written => eprintln!("Wrote {}", output.display()),
        WriteOutcome::Unchanged => eprintln!("{} is up to date", output.display()),
        WriteOutcome::Removed => eprintln!("Removed {} (no grouping directives)", output.display()),
        WriteOutcome::Skipped => eprintln!("No grouping directives; nothing written"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn project_with(lib: &str) -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("src")).unwrap();
        fs::write(dir.path().join("src").join("lib.rs"), lib).unwrap();
        dir
    }

    const LIB: &str = concat!(
        "markscan::generate_functions_with!(Tag);\n",
        "pub struct Tag;\n",
        "#[Tag]\n",
        "#[functions_worker::function(\"Ping\")]\n",
        "pub fn ping() {}\n",
    );

    #[test]
    fn test_generate_writes_then_checks() {
        let project = project_with(LIB);
        let output = project.path().join("src").join("generated.rs");

        run_generate(GenerateConfig {
            path: project.path().to_path_buf(),
            output: Some(output.clone()),
            check: false,
            config: None,
        })
        .unwrap();
        assert!(fs::read_to_string(&output).unwrap().contains("\"Ping\","));

        run_generate(GenerateConfig {
            path: project.path().to_path_buf(),
            output: Some(output),
            check: true,
            config: None,
        })
        .unwrap();
    }

    #[test]
    fn test_check_fails_on_missing_output() {
        let project = project_with(LIB);
        let result = run_generate(GenerateConfig {
            path: project.path().to_path_buf(),
            output: Some(project.path().join("missing.rs")),
            check: true,
            config: None,
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_generate_reports_unresolved_directive() {
        let project = project_with("markscan::generate_functions_with!(crate::Missing);\n");
        let result = run_generate(GenerateConfig {
            path: project.path().to_path_buf(),
            output: None,
            check: false,
            config: None,
        });
        let message = format!("{:#}", result.unwrap_err());
        assert!(message.contains("crate::Missing"), "{message}");
    }
}
