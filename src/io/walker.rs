use crate::core::Result;
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

/// Finds the Rust sources of one crate, in a stable order
pub struct SourceWalker {
    root: PathBuf,
    ignore_patterns: Vec<String>,
}

impl SourceWalker {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            ignore_patterns: vec![],
        }
    }

    pub fn with_ignore_patterns(mut self, patterns: Vec<String>) -> Self {
        self.ignore_patterns = patterns;
        self
    }

    /// Returns paths relative to the walk root, sorted
    pub fn walk(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        let walker = WalkBuilder::new(&self.root)
            .hidden(false)
            .git_ignore(true)
            .build();

        for entry in walker {
            let entry = entry?;
            let path = entry.path();

            if !path.is_file() {
                continue;
            }
            let Ok(relative) = path.strip_prefix(&self.root) else {
                continue;
            };
            if self.should_process(relative) {
                files.push(relative.to_path_buf());
            }
        }

        // Walk order depends on the file system
        files.sort();
        Ok(files)
    }

    fn should_process(&self, relative: &Path) -> bool {
        if relative.extension().and_then(|e| e.to_str()) != Some("rs") {
            return false;
        }

        let path_str = relative.to_string_lossy().replace('\\', "/");
        !self.ignore_patterns.iter().any(|pattern| {
            glob::Pattern::new(pattern)
                .map(|p| p.matches(&path_str))
                .unwrap_or(false)
        })
    }
}

pub fn find_source_files(root: &Path, ignore_patterns: Vec<String>) -> Result<Vec<PathBuf>> {
    SourceWalker::new(root.to_path_buf())
        .with_ignore_patterns(ignore_patterns)
        .walk()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    #[test]
    fn test_walk_sorts_and_filters_extensions() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "lib.rs");
        touch(dir.path(), "b/mod.rs");
        touch(dir.path(), "a.rs");
        touch(dir.path(), "notes.md");

        let files = find_source_files(dir.path(), vec![]).unwrap();
        assert_eq!(
            files,
            vec![
                PathBuf::from("a.rs"),
                PathBuf::from("b/mod.rs"),
                PathBuf::from("lib.rs"),
            ]
        );
    }

    #[test]
    fn test_ignore_patterns_are_relative() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "main.rs");
        touch(dir.path(), "bin/tool.rs");

        let files = find_source_files(dir.path(), vec!["bin/**".to_string()]).unwrap();
        assert_eq!(files, vec![PathBuf::from("main.rs")]);
    }
}
