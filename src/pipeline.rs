//! One generation pass: scan, classify, emit.
//!
//! Nothing is cached between passes; running twice over the same sources
//! yields the same bytes.

use crate::classifier::classify;
use crate::config::GeneratorSettings;
use crate::core::{ClassificationResult, Error, Grouping, MethodDeclaration, Result};
use crate::emitter::Emitter;
use crate::io;
use crate::scanner::{declarations, directives, SourceCorpus, SymbolTable};
use serde::Serialize;
use std::path::Path;
use tracing::{info, info_span};

/// Text produced by a pass, with the file name it should be written under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedSource {
    pub file_name: String,
    pub contents: String,
}

/// Everything a pass learned, for reporting
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    pub groupings: Vec<Grouping>,
    pub declarations: Vec<MethodDeclaration>,
    pub classification: ClassificationResult,
}

/// What [`write_output`] did on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Written,
    Unchanged,
    /// The pass produced nothing and a previous output was deleted
    Removed,
    Skipped,
}

/// Run a full pass. `None` means the crate requested no groupings.
pub fn generate(
    corpus: &SourceCorpus,
    settings: &GeneratorSettings,
) -> Result<Option<GeneratedSource>> {
    let _span = info_span!("generate", files = corpus.len()).entered();

    let (symbols, groupings) = resolve_groupings(corpus, settings)?;
    if groupings.is_empty() {
        info!("No grouping directives; nothing to generate");
        return Ok(None);
    }

    let declarations = declarations::scan(corpus, &symbols, &settings.registration_marker);
    let classification = classify(&declarations, &groupings);
    let contents = Emitter::from_settings(settings).emit(&classification)?;

    Ok(contents.map(|contents| GeneratedSource {
        file_name: settings.file_name.clone(),
        contents,
    }))
}

/// Run every stage except emission
pub fn analyze(corpus: &SourceCorpus, settings: &GeneratorSettings) -> Result<ScanReport> {
    let _span = info_span!("analyze", files = corpus.len()).entered();

    let (symbols, groupings) = resolve_groupings(corpus, settings)?;
    let declarations = declarations::scan(corpus, &symbols, &settings.registration_marker);
    let classification = classify(&declarations, &groupings);

    Ok(ScanReport {
        groupings,
        declarations,
        classification,
    })
}

/// Build the symbol table and read the directives.
///
/// The configured markers and every external grouping are registered with
/// the table so that `use dep::*;` imports of them resolve.
fn resolve_groupings(
    corpus: &SourceCorpus,
    settings: &GeneratorSettings,
) -> Result<(SymbolTable, Vec<Grouping>)> {
    let symbols = SymbolTable::build(corpus).with_external_items([
        settings.registration_marker.clone(),
        settings.directive_macro.clone(),
    ]);
    let groupings = directives::collect(corpus, &symbols, settings)?;
    let symbols = symbols.with_external_items(groupings.iter().map(|g| g.marker.clone()));
    Ok((symbols, groupings))
}

/// Discover the crate under `project_dir` and run a pass over it
pub fn generate_for_project(
    project_dir: &Path,
    settings: &GeneratorSettings,
) -> Result<Option<GeneratedSource>> {
    let corpus = SourceCorpus::discover(project_dir, settings)?;
    generate(&corpus, settings)
}

/// Bring `path` in line with the pass result.
///
/// An identical file is left untouched so its timestamp stays stable. When
/// the pass produced nothing, a file left by an earlier pass is removed.
pub fn write_output(path: &Path, generated: Option<&GeneratedSource>) -> Result<WriteOutcome> {
    let existing = if io::file_exists(path) {
        Some(io::read_file(path)?)
    } else {
        None
    };

    match (generated, existing) {
        (Some(generated), Some(existing)) if existing == generated.contents => {
            Ok(WriteOutcome::Unchanged)
        }
        (Some(generated), _) => {
            io::write_file(path, &generated.contents)?;
            info!(
                path = %path.display(),
                bytes = generated.contents.len(),
                "Wrote generated source"
            );
            Ok(WriteOutcome::Written)
        }
        (None, Some(_)) => {
            io::remove_file(path)?;
            info!(path = %path.display(), "Removed stale generated source");
            Ok(WriteOutcome::Removed)
        }
        (None, None) => Ok(WriteOutcome::Skipped),
    }
}

/// Fail unless `path` already holds exactly what this pass would write
pub fn check_output(path: &Path, generated: Option<&GeneratedSource>) -> Result<()> {
    let existing = if io::file_exists(path) {
        Some(io::read_file(path)?)
    } else {
        None
    };
    let expected = generated.map(|g| g.contents.as_str());

    if existing.as_deref() == expected {
        Ok(())
    } else {
        Err(Error::StaleOutput {
            path: path.to_path_buf(),
        })
    }
}
