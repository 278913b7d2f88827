//! Source file discovery.

use crate::core::Language;
use anyhow::Result;
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

pub struct FileWalker {
    root: PathBuf,
    languages: Vec<Language>,
    ignore_patterns: Vec<String>,
}

impl FileWalker {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            languages: vec![Language::ObjectiveC, Language::Swift],
            ignore_patterns: vec![],
        }
    }

    pub fn with_languages(mut self, languages: Vec<Language>) -> Self {
        self.languages = languages;
        self
    }

    pub fn with_ignore_patterns(mut self, patterns: Vec<String>) -> Self {
        self.ignore_patterns = patterns;
        self
    }

    /// Walk the tree, honoring `.gitignore`, returning matching files in a
    /// stable sorted order.
    pub fn walk(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        let walker = WalkBuilder::new(&self.root)
            .hidden(false)
            .git_ignore(true)
            .build();

        for entry in walker {
            let entry = entry?;
            let path = entry.path();

            if path.is_file() && self.should_process(path) {
                files.push(path.to_path_buf());
            }
        }

        files.sort();
        Ok(files)
    }

    fn should_process(&self, path: &Path) -> bool {
        let Some(language) = path
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(Language::from_extension)
        else {
            return false;
        };

        if !self.languages.contains(&language) {
            return false;
        }

        let path_str = path.to_string_lossy();
        for pattern in &self.ignore_patterns {
            if glob::Pattern::new(pattern)
                .map(|p| p.matches(&path_str))
                .unwrap_or(false)
            {
                return false;
            }
        }

        true
    }
}

pub fn find_project_files(root: &Path, ignore_patterns: Vec<String>) -> Result<Vec<PathBuf>> {
    FileWalker::new(root.to_path_buf())
        .with_ignore_patterns(ignore_patterns)
        .walk()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn walk_finds_only_supported_extensions() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("A.m"), "").unwrap();
        fs::write(dir.path().join("B.swift"), "").unwrap();
        fs::write(dir.path().join("C.h"), "").unwrap();
        fs::write(dir.path().join("notes.txt"), "").unwrap();
        fs::write(dir.path().join("build.rs"), "").unwrap();

        let files = FileWalker::new(dir.path().to_path_buf()).walk().unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, vec!["A.m", "B.swift", "C.h"]);
    }

    #[test]
    fn language_filter_narrows_results() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("A.m"), "").unwrap();
        fs::write(dir.path().join("B.swift"), "").unwrap();

        let files = FileWalker::new(dir.path().to_path_buf())
            .with_languages(vec![Language::Swift])
            .walk()
            .unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("B.swift"));
    }

    #[test]
    fn ignore_patterns_exclude_matches() {
        let dir = TempDir::new().unwrap();
        let vendored = dir.path().join("Pods");
        fs::create_dir(&vendored).unwrap();
        fs::write(vendored.join("Dep.m"), "").unwrap();
        fs::write(dir.path().join("Mine.m"), "").unwrap();

        let files = FileWalker::new(dir.path().to_path_buf())
            .with_ignore_patterns(vec!["**/Pods/**".to_string()])
            .walk()
            .unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("Mine.m"));
    }
}
