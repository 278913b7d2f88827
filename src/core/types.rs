//! Common type definitions used across the codebase

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::path::PathBuf;

/// Language enumeration for all supported languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    ObjectiveC,
    Swift,
}

impl Language {
    /// Get file extensions for this language
    pub fn extensions(&self) -> &[&str] {
        match self {
            Language::ObjectiveC => &["h", "m", "mm"],
            Language::Swift => &["swift"],
        }
    }

    /// Resolve a language from a file extension, if supported
    pub fn from_extension(ext: &str) -> Option<Language> {
        match ext {
            "h" | "m" | "mm" => Some(Language::ObjectiveC),
            "swift" => Some(Language::Swift),
            _ => None,
        }
    }

    /// Get the display name for this language
    pub fn display_name(&self) -> &str {
        match self {
            Language::ObjectiveC => "Objective-C",
            Language::Swift => "Swift",
        }
    }
}

/// Kinds of renameable source entities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SymbolKind {
    Class,
    Protocol,
    Category,
    Extension,
    Struct,
    Enum,
    Method,
    Property,
    InstanceVariable,
    Parameter,
    LocalVariable,
    Constant,
    Macro,
    Typedef,
}

impl SymbolKind {
    /// Get display name for this kind
    pub fn display_name(&self) -> &str {
        match self {
            SymbolKind::Class => "Class",
            SymbolKind::Protocol => "Protocol",
            SymbolKind::Category => "Category",
            SymbolKind::Extension => "Extension",
            SymbolKind::Struct => "Struct",
            SymbolKind::Enum => "Enum",
            SymbolKind::Method => "Method",
            SymbolKind::Property => "Property",
            SymbolKind::InstanceVariable => "InstanceVariable",
            SymbolKind::Parameter => "Parameter",
            SymbolKind::LocalVariable => "LocalVariable",
            SymbolKind::Constant => "Constant",
            SymbolKind::Macro => "Macro",
            SymbolKind::Typedef => "Typedef",
        }
    }
}

/// One extracted, nameable source entity
///
/// Created once per structural match during extraction and never mutated
/// afterwards; owned by the `ParsedFile` that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    pub file: PathBuf,
    pub line: usize,
    pub original_line: String,
    /// Enclosing type or protocol name, when declared inside a body
    pub parent: Option<String>,
    pub access_modifier: String,
    pub is_static: bool,
    pub return_type: String,
    pub parameters: Vec<String>,
    pub references: BTreeSet<String>,
}

impl Symbol {
    pub fn new(name: impl Into<String>, kind: SymbolKind, file: PathBuf, line: usize) -> Self {
        Self {
            name: name.into(),
            kind,
            file,
            line,
            original_line: String::new(),
            parent: None,
            access_modifier: String::new(),
            is_static: false,
            return_type: String::new(),
            parameters: Vec::new(),
            references: BTreeSet::new(),
        }
    }

    pub fn with_original_line(mut self, line: impl Into<String>) -> Self {
        self.original_line = line.into();
        self
    }

    pub fn with_parent(mut self, parent: Option<String>) -> Self {
        self.parent = parent;
        self
    }

    pub fn with_access_modifier(mut self, access: impl Into<String>) -> Self {
        self.access_modifier = access.into();
        self
    }

    pub fn with_static(mut self, is_static: bool) -> Self {
        self.is_static = is_static;
        self
    }

    pub fn with_return_type(mut self, return_type: impl Into<String>) -> Self {
        self.return_type = return_type.into();
        self
    }

    pub fn with_parameters(mut self, parameters: Vec<String>) -> Self {
        self.parameters = parameters;
        self
    }
}

/// Extraction result for a single source file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedFile {
    pub file: PathBuf,
    pub language: Language,
    pub symbols: Vec<Symbol>,
    pub imports: BTreeSet<String>,
    pub forward_declarations: BTreeSet<String>,
}

impl ParsedFile {
    pub fn new(file: PathBuf, language: Language) -> Self {
        Self {
            file,
            language,
            symbols: Vec::new(),
            imports: BTreeSet::new(),
            forward_declarations: BTreeSet::new(),
        }
    }
}

/// Result of applying the rename map to one file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformResult {
    pub transformed_content: String,
    pub replacements: usize,
    pub errors: Vec<String>,
}

impl TransformResult {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Per-run summary counters reported after a batch completes
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunSummary {
    pub files_discovered: usize,
    pub files_processed: usize,
    pub files_skipped: usize,
    pub symbols_extracted: usize,
    pub names_generated: usize,
    pub total_replacements: usize,
    pub language_breakdown: HashMap<Language, usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn language_from_extension_dispatches_objc_and_swift() {
        assert_eq!(Language::from_extension("h"), Some(Language::ObjectiveC));
        assert_eq!(Language::from_extension("m"), Some(Language::ObjectiveC));
        assert_eq!(Language::from_extension("mm"), Some(Language::ObjectiveC));
        assert_eq!(Language::from_extension("swift"), Some(Language::Swift));
        assert_eq!(Language::from_extension("rs"), None);
        assert_eq!(Language::from_extension(""), None);
    }

    #[test]
    fn symbol_builder_sets_fields() {
        let symbol = Symbol::new("Foo", SymbolKind::Class, PathBuf::from("Foo.h"), 3)
            .with_parent(Some("NSObject".to_string()))
            .with_original_line("@interface Foo : NSObject")
            .with_static(false);

        assert_eq!(symbol.name, "Foo");
        assert_eq!(symbol.kind, SymbolKind::Class);
        assert_eq!(symbol.line, 3);
        assert_eq!(symbol.parent.as_deref(), Some("NSObject"));
        assert!(symbol.parameters.is_empty());
    }

    #[test]
    fn parsed_file_starts_empty() {
        let parsed = ParsedFile::new(PathBuf::from("App.swift"), Language::Swift);
        assert!(parsed.symbols.is_empty());
        assert!(parsed.imports.is_empty());
        assert!(parsed.forward_declarations.is_empty());
    }
}
