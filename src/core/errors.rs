//! Shared error types for the application

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for codemask operations
#[derive(Debug, Error)]
pub enum CodemaskError {
    /// File extension outside the supported set; fatal for that file only
    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(PathBuf),

    /// I/O or decode failure while reading a source file
    #[error("Parse error in {file}: {message}")]
    Parse { file: PathBuf, message: String },

    /// Failure while applying the rename map to a file
    #[error("Transform error in {file}: {message}")]
    Transform { file: PathBuf, message: String },

    /// Cache load/store failure; callers degrade to a full rebuild
    #[error("Cache error: {0}")]
    Cache(String),

    /// Rejected before any file is touched
    #[error("Configuration error: {0}")]
    Config(String),

    /// Wrapped I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias
pub type CodemaskResult<T> = Result<T, CodemaskError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_file_type_names_the_path() {
        let err = CodemaskError::UnsupportedFileType(PathBuf::from("notes.txt"));
        assert!(err.to_string().contains("notes.txt"));
    }

    #[test]
    fn io_errors_convert() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: CodemaskError = io.into();
        assert!(matches!(err, CodemaskError::Io(_)));
    }
}
