//! Parsed view of one crate's module tree.
//!
//! Files are loaded the way the compiler finds them: starting at the crate
//! root and following every out-of-line `mod name;` declaration, so a file
//! that no module declares is never scanned. Each file is tagged with the
//! module path it occupies and the corpus is kept sorted by path so that
//! every later pass sees the files in the same order.

use crate::config::GeneratorSettings;
use crate::core::{Error, ItemPath, Result};
use crate::io::{self, walker::find_source_files};
use crate::observability::{
    increment_processed, set_current_file, set_phase, set_progress, ScanPhase,
};
use std::collections::{HashMap, HashSet};
use std::path::{Component, Path, PathBuf};
use syn::ext::IdentExt;
use syn::{Attribute, Expr, Item, Lit};
use tracing::{debug, info, warn};

const CRATE_ROOT_CANDIDATES: [&str; 2] = ["src/lib.rs", "src/main.rs"];

/// One parsed source file
pub struct SourceFile {
    /// Path used in diagnostics
    pub path: PathBuf,
    /// Module this file defines, e.g. `crate::handlers`
    pub module: ItemPath,
    pub ast: syn::File,
    pub is_crate_root: bool,
}

impl std::fmt::Debug for SourceFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceFile")
            .field("path", &self.path)
            .field("module", &self.module)
            .field("items", &self.ast.items.len())
            .field("is_crate_root", &self.is_crate_root)
            .finish()
    }
}

/// All files of one crate, in scan order
#[derive(Debug, Default)]
pub struct SourceCorpus {
    files: Vec<SourceFile>,
}

impl SourceCorpus {
    /// Locate the crate root under `project_dir` and load the module tree
    /// below it.
    ///
    /// The source directory is walked first; files excluded by `.gitignore`
    /// or an ignore pattern are never loaded even when a module declares
    /// them.
    pub fn discover(project_dir: &Path, settings: &GeneratorSettings) -> Result<Self> {
        let (root_file, src_dir, candidates) = {
            let _phase = set_phase(ScanPhase::Discovery);
            let root_file = normalize_path(&locate_crate_root(
                project_dir,
                settings.crate_root.as_deref(),
            )?);
            let src_dir = root_file.parent().map(Path::to_path_buf).unwrap_or_default();
            let candidates: HashSet<PathBuf> =
                find_source_files(&src_dir, settings.ignore_patterns.clone())?
                    .into_iter()
                    .collect();
            (root_file, src_dir, candidates)
        };

        let _phase = set_phase(ScanPhase::Parsing);
        set_progress(0, candidates.len());
        let root_text = io::read_file(&root_file)?;
        let files = ModuleTreeLoader::new(|path: &Path| match path.strip_prefix(&src_dir) {
            Ok(relative) if !candidates.contains(relative) => {
                if io::file_exists(path) {
                    debug!(path = %path.display(), "Declared module file is ignored");
                }
                Ok(None)
            }
            _ if io::file_exists(path) => io::read_file(path).map(Some),
            _ => Ok(None),
        })
        .load(root_file, &root_text)?;

        let loaded: HashSet<&Path> = files
            .iter()
            .filter_map(|f| f.path.strip_prefix(&src_dir).ok())
            .collect();
        for orphan in candidates.iter().filter(|c| !loaded.contains(c.as_path())) {
            debug!(path = %orphan.display(), "Not part of the module tree; skipped");
        }
        info!(
            src_dir = %src_dir.display(),
            files = files.len(),
            skipped = candidates.len().saturating_sub(loaded.len()),
            "Loaded crate module tree"
        );

        Ok(Self { files })
    }

    /// Build a corpus from in-memory sources. Paths are relative to the
    /// source directory; `lib.rs` (or else `main.rs`) is the crate root and
    /// only the modules it reaches are kept.
    pub fn from_sources<I, P, S>(sources: I) -> Result<Self>
    where
        I: IntoIterator<Item = (P, S)>,
        P: AsRef<Path>,
        S: Into<String>,
    {
        let sources: HashMap<PathBuf, String> = sources
            .into_iter()
            .map(|(path, text)| (normalize_path(path.as_ref()), text.into()))
            .collect();

        let (root_name, root_text) = ["lib.rs", "main.rs"]
            .iter()
            .map(PathBuf::from)
            .find_map(|candidate| sources.get(&candidate).map(|text| (candidate, text)))
            .ok_or_else(|| {
                Error::Configuration("no lib.rs or main.rs among the sources".to_string())
            })?;

        set_progress(0, sources.len());
        let files = ModuleTreeLoader::new(|path: &Path| Ok(sources.get(path).cloned()))
            .load(root_name, root_text)?;

        Ok(Self { files })
    }

    pub fn files(&self) -> &[SourceFile] {
        &self.files
    }

    pub fn crate_root(&self) -> Option<&SourceFile> {
        self.files.iter().find(|f| f.is_crate_root)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl SourceFile {
    pub fn parse(path: PathBuf, module: ItemPath, text: &str, is_crate_root: bool) -> Result<Self> {
        let ast = syn::parse_file(text).map_err(|e| Error::parse(&path, &e))?;
        debug!(path = %path.display(), module = %module, items = ast.items.len(), "Parsed file");
        Ok(Self {
            path,
            module,
            ast,
            is_crate_root,
        })
    }
}

/// An out-of-line module waiting to be loaded
struct PendingModule {
    module: ItemPath,
    /// Files tried in order, each with the directory its own children live
    /// in; the first file that exists wins
    candidates: Vec<(PathBuf, PathBuf)>,
    /// `#[cfg(..)]` modules may legitimately have no file
    conditional: bool,
}

/// Follows `mod name;` declarations from the crate root.
///
/// `read` returns `None` for a file that does not exist or must not be
/// scanned.
struct ModuleTreeLoader<F> {
    read: F,
    visited: HashSet<PathBuf>,
    files: Vec<SourceFile>,
}

impl<F> ModuleTreeLoader<F>
where
    F: FnMut(&Path) -> Result<Option<String>>,
{
    fn new(read: F) -> Self {
        Self {
            read,
            visited: HashSet::new(),
            files: Vec::new(),
        }
    }

    fn load(mut self, root: PathBuf, root_text: &str) -> Result<Vec<SourceFile>> {
        let child_dir = parent_dir(&root);
        self.visited.insert(root.clone());
        let mut pending = Vec::new();
        self.add_file(root, ItemPath::crate_root(), root_text, &child_dir, true, &mut pending)?;

        while let Some(next) = pending.pop() {
            self.load_pending(next, &mut pending)?;
        }

        self.files.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(self.files)
    }

    fn load_pending(
        &mut self,
        next: PendingModule,
        pending: &mut Vec<PendingModule>,
    ) -> Result<()> {
        for (candidate, child_dir) in &next.candidates {
            if self.visited.contains(candidate) {
                debug!(path = %candidate.display(), "Module file already loaded");
                return Ok(());
            }
            let Some(text) = (self.read)(candidate)? else {
                continue;
            };
            self.visited.insert(candidate.clone());
            return self.add_file(candidate.clone(), next.module, &text, child_dir, false, pending);
        }

        if next.conditional {
            debug!(module = %next.module, "No file for conditional module");
        } else {
            warn!(
                module = %next.module,
                tried = ?next.candidates.iter().map(|(file, _)| file).collect::<Vec<_>>(),
                "Declared module has no source file; skipped"
            );
        }
        Ok(())
    }

    fn add_file(
        &mut self,
        path: PathBuf,
        module: ItemPath,
        text: &str,
        child_dir: &Path,
        is_crate_root: bool,
        pending: &mut Vec<PendingModule>,
    ) -> Result<()> {
        let _file = set_current_file(&path);
        let file = SourceFile::parse(path, module, text, is_crate_root)?;
        increment_processed();

        let file_dir = parent_dir(&file.path);
        collect_declared_modules(
            &file.ast.items,
            &file.module,
            &file_dir,
            child_dir,
            false,
            pending,
        );
        self.files.push(file);
        Ok(())
    }
}

/// Queue every out-of-line module declared in `items`, recursing into
/// inline modules.
///
/// `file_dir` is the directory of the declaring file and `dir` the
/// directory the child modules of `module` live in.
fn collect_declared_modules(
    items: &[Item],
    module: &ItemPath,
    file_dir: &Path,
    dir: &Path,
    inline: bool,
    pending: &mut Vec<PendingModule>,
) {
    for item in items {
        let Item::Mod(item_mod) = item else {
            continue;
        };
        let name = item_mod.ident.unraw().to_string();
        let child = module.join(name.clone());
        let path_attr = path_attribute(&item_mod.attrs);

        match &item_mod.content {
            Some((_, nested)) => {
                let nested_dir = dir.join(path_attr.unwrap_or_else(|| name.clone()));
                collect_declared_modules(nested, &child, file_dir, &nested_dir, true, pending);
            }
            None => {
                let candidates = match path_attr {
                    // Outside inline modules `#[path]` is relative to the declaring file
                    Some(path) => {
                        let base = if inline { dir } else { file_dir };
                        let file = normalize_path(&base.join(path));
                        let own_dir = parent_dir(&file);
                        vec![(file, own_dir)]
                    }
                    None => {
                        let child_dir = normalize_path(&dir.join(&name));
                        vec![
                            (normalize_path(&dir.join(format!("{name}.rs"))), child_dir.clone()),
                            (child_dir.join("mod.rs"), child_dir),
                        ]
                    }
                };
                pending.push(PendingModule {
                    module: child,
                    candidates,
                    conditional: item_mod.attrs.iter().any(|a| a.path().is_ident("cfg")),
                });
            }
        }
    }
}

/// Value of `#[path = "..."]`, if present
fn path_attribute(attrs: &[Attribute]) -> Option<String> {
    attrs
        .iter()
        .filter(|attr| attr.path().is_ident("path"))
        .find_map(|attr| match &attr.meta.require_name_value().ok()?.value {
            Expr::Lit(expr) => match &expr.lit {
                Lit::Str(lit) => Some(lit.value()),
                _ => None,
            },
            _ => None,
        })
}

fn parent_dir(path: &Path) -> PathBuf {
    path.parent().map(Path::to_path_buf).unwrap_or_default()
}

/// Lexically resolve `.` and `..` so that one file always has one key
fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let can_pop = matches!(
                    normalized.components().next_back(),
                    Some(Component::Normal(_))
                );
                if can_pop {
                    normalized.pop();
                } else {
                    normalized.push(component);
                }
            }
            other => normalized.push(other),
        }
    }
    normalized
}

/// Find the crate root file: the configured one, else `src/lib.rs`, else `src/main.rs`
pub fn locate_crate_root(project_dir: &Path, configured: Option<&Path>) -> Result<PathBuf> {
    if let Some(configured) = configured {
        let path = project_dir.join(configured);
        return if io::file_exists(&path) {
            Ok(path)
        } else {
            Err(Error::Configuration(format!(
                "crate root {} does not exist",
                path.display()
            )))
        };
    }

    CRATE_ROOT_CANDIDATES
        .iter()
        .map(|candidate| project_dir.join(candidate))
        .find(|path| io::file_exists(path))
        .ok_or_else(|| {
            Error::Configuration(format!(
                "no src/lib.rs or src/main.rs under {}",
                project_dir.display()
            ))
        })
}
