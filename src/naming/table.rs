//! Project-wide symbol table and rename map.
//!
//! The table preserves extraction order so that deterministic seeding is
//! meaningful, dedupes by rename key (first occurrence wins), and produces
//! the single flat original-name → replacement-name mapping shared by every
//! file in the project.

use crate::config::Whitelist;
use crate::core::{CodemaskResult, ParsedFile, Symbol, SymbolKind};
use crate::naming::{NameGenerator, NamingConfig};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// One renamed identifier in the exported mapping document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingEntry {
    pub original: String,
    pub obfuscated: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub source_file: String,
}

/// The project-wide rename mapping, keyed by bare identifier text.
///
/// Every occurrence of a given name renames identically everywhere in the
/// project, whatever kind of symbol introduced it.
#[derive(Debug, Clone, Default)]
pub struct RenameMap {
    map: HashMap<String, String>,
    entries: Vec<MappingEntry>,
}

impl RenameMap {
    pub fn get(&self, original: &str) -> Option<&str> {
        self.map.get(original).map(String::as_str)
    }

    pub fn contains(&self, original: &str) -> bool {
        self.map.contains_key(original)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Original names in first-seen order
    pub fn originals(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.original.as_str())
    }

    /// Export entries in first-seen order
    pub fn entries(&self) -> &[MappingEntry] {
        &self.entries
    }
}

/// Key under which a symbol participates in renaming.
///
/// Multi-segment selectors cannot be substituted as one identifier, so each
/// label becomes its own rename key; everything else renames by its bare
/// name. Category symbols contribute the category component, the class half
/// is covered by its own symbol.
fn rename_keys(symbol: &Symbol) -> Vec<String> {
    match symbol.kind {
        SymbolKind::Method if symbol.name.contains(':') => symbol
            .name
            .split(':')
            .filter(|segment| !segment.is_empty())
            .map(str::to_string)
            .collect(),
        SymbolKind::Category => match symbol.name.split_once('+') {
            Some((_, category)) if !category.is_empty() => vec![category.to_string()],
            _ => vec![symbol.name.clone()],
        },
        _ => vec![symbol.name.clone()],
    }
}

/// Ordered, append-only collection of extracted symbols feeding the name
/// generator.
#[derive(Debug)]
pub struct SymbolTable {
    whitelist: Whitelist,
    /// (key, kind, source file) in first-seen order
    keys: Vec<(String, SymbolKind, String)>,
    seen: HashSet<String>,
    total_symbols: usize,
}

impl SymbolTable {
    pub fn new(whitelist: Whitelist) -> Self {
        Self {
            whitelist,
            keys: Vec::new(),
            seen: HashSet::new(),
            total_symbols: 0,
        }
    }

    /// Fold one file's symbols into the table, preserving extraction order
    pub fn add_file(&mut self, parsed: &ParsedFile) {
        for symbol in &parsed.symbols {
            self.add_symbol(symbol);
        }
    }

    pub fn add_symbol(&mut self, symbol: &Symbol) {
        self.total_symbols += 1;
        let source_file = symbol.file.display().to_string();
        for key in rename_keys(symbol) {
            if self.whitelist.is_whitelisted(&key) {
                continue;
            }
            if self.seen.insert(key.clone()) {
                self.keys.push((key, symbol.kind, source_file.clone()));
            }
        }
    }

    /// Number of symbols folded in (before dedup)
    pub fn symbol_count(&self) -> usize {
        self.total_symbols
    }

    /// Number of distinct rename keys
    pub fn key_count(&self) -> usize {
        self.keys.len()
    }

    /// Run the name generator over the table, producing the project-wide
    /// rename map. Each name is generated exactly once; the map is immutable
    /// from here on.
    pub fn generate(&self, config: &NamingConfig) -> CodemaskResult<RenameMap> {
        config.validate()?;

        let mut generator = NameGenerator::new(config);
        generator.reserve(self.keys.iter().map(|(key, _, _)| key.clone()));

        let mut map = HashMap::with_capacity(self.keys.len());
        let mut entries = Vec::with_capacity(self.keys.len());
        for (key, kind, source_file) in &self.keys {
            let replacement = generator.next_name(*kind);
            map.insert(key.clone(), replacement.clone());
            entries.push(MappingEntry {
                original: key.clone(),
                obfuscated: replacement,
                kind: kind.display_name().to_string(),
                source_file: source_file.clone(),
            });
        }

        Ok(RenameMap { map, entries })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Language;
    use std::path::PathBuf;

    fn symbol(name: &str, kind: SymbolKind) -> Symbol {
        Symbol::new(name, kind, PathBuf::from("Foo.m"), 1)
    }

    fn seeded_config() -> NamingConfig {
        NamingConfig {
            seed: Some(99),
            deterministic: true,
            ..NamingConfig::default()
        }
    }

    #[test]
    fn selector_labels_become_individual_keys() {
        let mut table = SymbolTable::new(Whitelist::empty());
        table.add_symbol(
            &symbol("configureWith:animated:", SymbolKind::Method)
                .with_parameters(vec!["model".to_string(), "flag".to_string()]),
        );
        assert_eq!(table.key_count(), 2);

        let map = table.generate(&seeded_config()).unwrap();
        assert!(map.contains("configureWith"));
        assert!(map.contains("animated"));
        assert!(!map.contains("configureWith:animated:"));
    }

    #[test]
    fn zero_colon_selector_keeps_bare_name() {
        let mut table = SymbolTable::new(Whitelist::empty());
        table.add_symbol(&symbol("reload", SymbolKind::Method));
        let map = table.generate(&seeded_config()).unwrap();
        assert!(map.contains("reload"));
    }

    #[test]
    fn category_contributes_category_component() {
        let mut table = SymbolTable::new(Whitelist::empty());
        table.add_symbol(&symbol("NSString+Checksum", SymbolKind::Category));
        let map = table.generate(&seeded_config()).unwrap();
        assert!(map.contains("Checksum"));
        assert!(!map.contains("NSString"));
    }

    #[test]
    fn duplicate_names_share_one_replacement() {
        let mut table = SymbolTable::new(Whitelist::empty());
        table.add_symbol(&symbol("Foo", SymbolKind::Class));
        table.add_symbol(&symbol("Foo", SymbolKind::Class));
        table.add_symbol(&symbol("bar", SymbolKind::Property));
        assert_eq!(table.symbol_count(), 3);
        assert_eq!(table.key_count(), 2);
    }

    #[test]
    fn whitelisted_names_never_enter_the_map() {
        let whitelist = Whitelist::empty().with_names(vec!["Foo".to_string()]);
        let mut table = SymbolTable::new(whitelist);
        table.add_symbol(&symbol("Foo", SymbolKind::Class));
        table.add_symbol(&symbol("bar", SymbolKind::Property));
        let map = table.generate(&seeded_config()).unwrap();
        assert!(!map.contains("Foo"));
        assert!(map.contains("bar"));
    }

    #[test]
    fn generated_names_avoid_existing_project_names() {
        let mut table = SymbolTable::new(Whitelist::empty());
        table.add_symbol(&symbol("Foo", SymbolKind::Class));
        table.add_symbol(&symbol("bar", SymbolKind::Property));
        let map = table.generate(&seeded_config()).unwrap();
        for entry in map.entries() {
            assert_ne!(entry.obfuscated, "Foo");
            assert_ne!(entry.obfuscated, "bar");
        }
    }

    #[test]
    fn same_seed_same_ordered_input_same_map() {
        let build = || {
            let mut table = SymbolTable::new(Whitelist::empty());
            let mut parsed = ParsedFile::new(PathBuf::from("A.m"), Language::ObjectiveC);
            parsed.symbols.push(symbol("Alpha", SymbolKind::Class));
            parsed.symbols.push(symbol("beta", SymbolKind::Property));
            parsed.symbols.push(symbol("gamma:delta:", SymbolKind::Method));
            table.add_file(&parsed);
            table.generate(&seeded_config()).unwrap()
        };
        let a = build();
        let b = build();
        let pairs_a: Vec<_> = a.entries().to_vec();
        let pairs_b: Vec<_> = b.entries().to_vec();
        assert_eq!(pairs_a, pairs_b);
    }

    #[test]
    fn entries_preserve_first_seen_order() {
        let mut table = SymbolTable::new(Whitelist::empty());
        table.add_symbol(&symbol("Zed", SymbolKind::Class));
        table.add_symbol(&symbol("Alpha", SymbolKind::Class));
        let map = table.generate(&seeded_config()).unwrap();
        let originals: Vec<_> = map.originals().collect();
        assert_eq!(originals, vec!["Zed", "Alpha"]);
    }
}
