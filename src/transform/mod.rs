//! Applies the frozen rename map to source text.
//!
//! Substitution is whole-identifier only: a mapped name never matches inside
//! a longer identifier. Files are independent once the map is frozen, so
//! callers are free to transform them in parallel; every transform writes
//! into a fresh buffer and never touches the input.

use crate::core::{ParsedFile, SymbolKind, TransformResult};
use crate::naming::RenameMap;
use regex::Regex;
use std::path::{Path, PathBuf};

/// Symbol kinds that can give a file its base name
const FILE_NAMING_KINDS: &[SymbolKind] = &[
    SymbolKind::Class,
    SymbolKind::Protocol,
    SymbolKind::Struct,
    SymbolKind::Enum,
];

pub struct CodeTransformer<'a> {
    map: &'a RenameMap,
    pattern: Option<Regex>,
    build_error: Option<String>,
}

impl<'a> CodeTransformer<'a> {
    /// Compile the identifier-boundary pattern for a frozen rename map
    pub fn new(map: &'a RenameMap) -> Self {
        if map.is_empty() {
            return Self {
                map,
                pattern: None,
                build_error: None,
            };
        }

        // Longest-first keeps the alternation deterministic when one key
        // prefixes another.
        let mut originals: Vec<&str> = map.originals().collect();
        originals.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));
        let alternation = originals
            .iter()
            .map(|name| regex::escape(name))
            .collect::<Vec<_>>()
            .join("|");

        match Regex::new(&format!(r"\b(?:{alternation})\b")) {
            Ok(pattern) => Self {
                map,
                pattern: Some(pattern),
                build_error: None,
            },
            Err(e) => Self {
                map,
                pattern: None,
                build_error: Some(format!("failed to compile rename pattern: {e}")),
            },
        }
    }

    /// Apply the map to one file's original (unmasked) text
    pub fn transform(&self, content: &str) -> TransformResult {
        if let Some(error) = &self.build_error {
            return TransformResult {
                transformed_content: content.to_string(),
                replacements: 0,
                errors: vec![error.clone()],
            };
        }

        let Some(pattern) = &self.pattern else {
            return TransformResult {
                transformed_content: content.to_string(),
                replacements: 0,
                errors: Vec::new(),
            };
        };

        let mut replacements = 0usize;
        let mut errors = Vec::new();
        let transformed = pattern.replace_all(content, |caps: &regex::Captures| {
            let original = &caps[0];
            match self.map.get(original) {
                Some(replacement) => {
                    replacements += 1;
                    replacement.to_string()
                }
                None => {
                    errors.push(format!("no mapping for matched identifier '{original}'"));
                    original.to_string()
                }
            }
        });

        TransformResult {
            transformed_content: transformed.into_owned(),
            replacements,
            errors,
        }
    }

    /// Output file name for a transformed file.
    ///
    /// When a type declared in the file shares its name with the file's base
    /// name, the output keeps header and implementation paired by taking the
    /// generated name with the original extension; otherwise the name is
    /// unchanged.
    pub fn output_file_name(&self, path: &Path, parsed: &ParsedFile) -> PathBuf {
        let stem = path.file_stem().and_then(|s| s.to_str());
        let extension = path.extension().and_then(|s| s.to_str());

        let renamed = stem.and_then(|stem| {
            parsed
                .symbols
                .iter()
                .find(|symbol| {
                    FILE_NAMING_KINDS.contains(&symbol.kind) && symbol.name == stem
                })
                .and_then(|symbol| self.map.get(&symbol.name))
        });

        match (renamed, extension) {
            (Some(new_stem), Some(ext)) => PathBuf::from(format!("{new_stem}.{ext}")),
            (Some(new_stem), None) => PathBuf::from(new_stem),
            _ => PathBuf::from(path.file_name().unwrap_or_default()),
        }
    }
}
