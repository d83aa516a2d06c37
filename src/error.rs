//! Error types for RO-Crate export

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Invalid project structure: {0}")]
    InvalidStructure(String),

    #[error("Duplicate @id '{0}': two entities derive the same identifier")]
    DuplicateId(String),

    #[error("Field '{field}' references unknown vocabulary '{vocabulary}'")]
    UnknownVocabulary { field: String, vocabulary: String },

    #[error("Failed to load vocabulary from {path}: {reason}")]
    VocabularyLoad { path: String, reason: String },

    #[error("Refusing to overwrite read-only file: {0}")]
    ReadOnlyFile(PathBuf),

    #[error("Project has no directory to write ro-crate-metadata.json into")]
    MissingProjectDirectory,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid path: {0}")]
    InvalidPath(PathBuf),
}
