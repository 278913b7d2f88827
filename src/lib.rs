// Export modules for library usage
pub mod cache;
pub mod cli;
pub mod commands;
pub mod config;
pub mod core;
pub mod io;
pub mod naming;
pub mod parsers;
pub mod progress;
pub mod transform;

// Re-export commonly used types
pub use crate::core::{
    CodemaskError, CodemaskResult, Language, ParsedFile, RunSummary, Symbol, SymbolKind,
    TransformResult,
};

pub use crate::cache::{ChangeSet, ChangeState, FileMetadata, IncrementalCache};

pub use crate::config::{CodemaskConfig, Whitelist};

pub use crate::naming::{
    MappingEntry, NameGenerator, NamingConfig, NamingStrategy, RenameMap, SymbolTable,
};

pub use crate::parsers::{
    all_symbols, group_by_kind, parse_file, parse_files, parse_files_parallel, symbols_of_kind,
    ObjCParser, StringLiteralProtector, SwiftParser, SymbolParser,
};

pub use crate::transform::CodeTransformer;

pub use crate::io::output::{create_mapping_writer, MappingFormat, MappingWriter};
