//! Getting a [`Document`] for a source file.
//!
//! Source files are converted by the external `pandoc` executable. Files that
//! are already Pandoc JSON can be read directly, which is also what the tests
//! rely on.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::debug;

use crate::error::ReadstatsError;
use crate::Result;

use super::Document;

/// Reader format handed to pandoc for Quarto markdown.
pub const PANDOC_READER_FORMAT: &str = "markdown\
+yaml_metadata_block\
+fenced_divs\
+link_attributes\
+bracketed_spans\
+pipe_tables\
+grid_tables\
+raw_html";

/// Something that can turn a file on disk into a document tree.
pub trait AstLoader {
    fn load(&self, path: &Path) -> Result<Document>;
}

/// Runs `pandoc <path> -f <format> -t json`.
#[derive(Debug, Clone)]
pub struct PandocLoader {
    /// Executable name or path
    pub program: PathBuf,
    /// Reader format (`-f`)
    pub format: String,
}

impl Default for PandocLoader {
    fn default() -> Self {
        Self {
            program: PathBuf::from("pandoc"),
            format: PANDOC_READER_FORMAT.to_string(),
        }
    }
}

impl PandocLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a specific pandoc executable.
    pub fn program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    /// Use a different reader format.
    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.format = format.into();
        self
    }
}

impl AstLoader for PandocLoader {
    fn load(&self, path: &Path) -> Result<Document> {
        if !path.exists() {
            return Err(ReadstatsError::PathNotFound(path.to_path_buf()));
        }

        debug!(path = %path.display(), program = %self.program.display(), "running pandoc");
        let output = Command::new(&self.program)
            .arg(path)
            .args(["-f", self.format.as_str(), "-t", "json"])
            .output()
            .map_err(|source| ReadstatsError::PandocSpawn {
                program: self.program.display().to_string(),
                source,
            })?;

        if !output.status.success() {
            return Err(ReadstatsError::PandocFailed {
                path: path.to_path_buf(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let json = String::from_utf8_lossy(&output.stdout);
        Document::from_json(&json)
    }
}

/// Reads a file that already holds Pandoc JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonLoader;

impl AstLoader for JsonLoader {
    fn load(&self, path: &Path) -> Result<Document> {
        let json = fs::read_to_string(path).map_err(|source| ReadstatsError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        Document::from_json(&json)
    }
}

/// `.json` files are read as-is, everything else goes through pandoc.
#[derive(Debug, Clone, Default)]
pub struct AutoLoader {
    pub pandoc: PandocLoader,
}

impl AutoLoader {
    pub fn new(pandoc: PandocLoader) -> Self {
        Self { pandoc }
    }
}

impl AstLoader for AutoLoader {
    fn load(&self, path: &Path) -> Result<Document> {
        if path.extension().is_some_and(|ext| ext == "json") {
            JsonLoader.load(path)
        } else {
            self.pandoc.load(path)
        }
    }
}
