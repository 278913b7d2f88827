//! Source parsing and symbol extraction.
//!
//! One extractor per language, selected once by file extension; both consume
//! string-protected text through a shared line-state machine. Extraction is
//! best-effort by design: unrecognized syntax is ordinary code, never an
//! error.

pub mod objc;
pub mod strings;
pub mod swift;

pub use objc::ObjCParser;
pub use strings::StringLiteralProtector;
pub use swift::SwiftParser;

use crate::config::Whitelist;
use crate::core::{CodemaskError, CodemaskResult, Language, ParsedFile, Symbol, SymbolKind};
use rayon::prelude::*;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

/// Line-scanning state shared by both extractors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LineState {
    Code,
    BlockComment,
    Continuation,
}

/// Remove `//` and `/* */` comment spans from one line, entering
/// `BlockComment` when a block comment is left open.
pub(crate) fn strip_comments(line: &str, state: &mut LineState) -> String {
    let mut out = String::new();
    let mut rest = line;
    loop {
        let line_pos = rest.find("//");
        let block_pos = rest.find("/*");
        match (line_pos, block_pos) {
            (Some(l), Some(b)) if l < b => {
                out.push_str(&rest[..l]);
                break;
            }
            (Some(l), None) => {
                out.push_str(&rest[..l]);
                break;
            }
            (_, Some(b)) => {
                out.push_str(&rest[..b]);
                match rest[b + 2..].find("*/") {
                    Some(end) => rest = &rest[b + 2 + end + 2..],
                    None => {
                        *state = LineState::BlockComment;
                        break;
                    }
                }
            }
            (None, None) => {
                out.push_str(rest);
                break;
            }
        }
    }
    out
}

/// One language's symbol extractor
pub trait SymbolParser: Send + Sync {
    /// Extract symbols from already-loaded source text
    fn parse_source(&self, content: &str, path: &Path) -> ParsedFile;

    fn language(&self) -> Language;

    /// Read and extract one file
    fn parse(&self, path: &Path) -> CodemaskResult<ParsedFile> {
        let content = fs::read_to_string(path).map_err(|e| CodemaskError::Parse {
            file: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(self.parse_source(&content, path))
    }
}

/// Resolve the language for a path, or fail with an unsupported-file-type
/// error. This is the only place extension dispatch happens.
pub fn language_of(path: &Path) -> CodemaskResult<Language> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(Language::from_extension)
        .ok_or_else(|| CodemaskError::UnsupportedFileType(path.to_path_buf()))
}

pub fn get_parser(language: Language, whitelist: Whitelist) -> Box<dyn SymbolParser> {
    match language {
        Language::ObjectiveC => Box::new(ObjCParser::new(whitelist)),
        Language::Swift => Box::new(SwiftParser::new(whitelist)),
    }
}

/// Parse a single file, dispatching on its extension
pub fn parse_file(path: &Path, whitelist: &Whitelist) -> CodemaskResult<ParsedFile> {
    let language = language_of(path)?;
    get_parser(language, whitelist.clone()).parse(path)
}

/// Parse a batch of files sequentially, reporting `(fraction_complete,
/// current_path)` after each file. Per-file failures are logged and the file
/// skipped; the batch always runs to completion.
pub fn parse_files<F>(
    paths: &[PathBuf],
    whitelist: &Whitelist,
    mut progress: F,
) -> BTreeMap<PathBuf, ParsedFile>
where
    F: FnMut(f64, &str),
{
    let total = paths.len().max(1);
    let mut results = BTreeMap::new();
    for (index, path) in paths.iter().enumerate() {
        match parse_file(path, whitelist) {
            Ok(parsed) => {
                results.insert(path.clone(), parsed);
            }
            Err(e) => log::warn!("skipping {}: {e}", path.display()),
        }
        progress((index + 1) as f64 / total as f64, &path.display().to_string());
    }
    results
}

/// Parallel variant of [`parse_files`]: a shared-nothing map over files,
/// merged into an ordered map by path so downstream name generation sees a
/// stable symbol order.
pub fn parse_files_parallel(paths: &[PathBuf], whitelist: &Whitelist) -> BTreeMap<PathBuf, ParsedFile> {
    paths
        .par_iter()
        .filter_map(|path| match parse_file(path, whitelist) {
            Ok(parsed) => Some((path.clone(), parsed)),
            Err(e) => {
                log::warn!("skipping {}: {e}", path.display());
                None
            }
        })
        .collect::<Vec<_>>()
        .into_iter()
        .collect()
}

/// Flatten every symbol across the result set, in path-then-extraction order
pub fn all_symbols(files: &BTreeMap<PathBuf, ParsedFile>) -> Vec<&Symbol> {
    files.values().flat_map(|parsed| &parsed.symbols).collect()
}

/// Symbols of one kind across the result set
pub fn symbols_of_kind(files: &BTreeMap<PathBuf, ParsedFile>, kind: SymbolKind) -> Vec<&Symbol> {
    all_symbols(files)
        .into_iter()
        .filter(|symbol| symbol.kind == kind)
        .collect()
}

/// Group all symbols by kind
pub fn group_by_kind(files: &BTreeMap<PathBuf, ParsedFile>) -> HashMap<SymbolKind, Vec<&Symbol>> {
    let mut groups: HashMap<SymbolKind, Vec<&Symbol>> = HashMap::new();
    for symbol in all_symbols(files) {
        groups.entry(symbol.kind).or_default().push(symbol);
    }
    groups
}
