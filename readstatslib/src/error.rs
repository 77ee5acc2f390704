//! Error types for readstatslib

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading, counting or caching documents
#[derive(Error, Debug)]
pub enum ReadstatsError {
    /// Failed to read a file
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to write a file
    #[error("failed to write file '{path}': {source}")]
    FileWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Invalid glob pattern
    #[error("invalid glob pattern '{pattern}': {message}")]
    InvalidGlob { pattern: String, message: String },

    /// Path does not exist
    #[error("path does not exist: {0}")]
    PathNotFound(PathBuf),

    /// The pandoc executable could not be started
    #[error("failed to run '{program}': {source}")]
    PandocSpawn {
        program: String,
        source: std::io::Error,
    },

    /// pandoc ran but reported a failure
    #[error("pandoc failed on '{path}' ({status}): {stderr}")]
    PandocFailed {
        path: PathBuf,
        status: String,
        stderr: String,
    },

    /// The JSON does not have the shape of a Pandoc document
    #[error("invalid pandoc AST: {0}")]
    InvalidAst(String),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML (de)serialization error
    #[error("YAML error in '{path}': {source}")]
    Yaml {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    /// A stats record holds the other kind of record
    #[error("stats record '{path}' has type {found}, expected {expected}")]
    RecordKind {
        path: PathBuf,
        expected: crate::cache::RecordKind,
        found: crate::cache::RecordKind,
    },

    /// Render timer state is missing or unusable
    #[error("render timer: {0}")]
    Timer(String),

    /// Invalid n-gram settings
    #[error("invalid n-gram settings: {0}")]
    InvalidNgram(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
