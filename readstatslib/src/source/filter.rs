//! Document discovery with glob pattern support.
//!
//! Patterns are matched against paths relative to the project root, written
//! with `/` separators. `*` stays within one path segment, so recursion needs
//! `**`.

use std::path::{Path, PathBuf};

use glob::{MatchOptions, Pattern};
use walkdir::WalkDir;

use crate::error::ReadstatsError;
use crate::Result;

/// Build-output and dependency directories never searched for documents.
pub const SKIPPED_DIRS: [&str; 4] = ["_site", "_freeze", "node_modules", "site_libs"];

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Configuration for document filtering.
#[derive(Debug, Clone, Default)]
pub struct FilterConfig {
    /// Glob patterns to include (if empty, include all .qmd files)
    pub include: Vec<Pattern>,
    /// Glob patterns to exclude
    pub exclude: Vec<Pattern>,
}

fn compile(pattern: &str) -> Result<Pattern> {
    Pattern::new(pattern).map_err(|e| ReadstatsError::InvalidGlob {
        pattern: pattern.to_string(),
        message: e.to_string(),
    })
}

impl FilterConfig {
    /// Create a new empty filter config (includes all .qmd files).
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an include pattern.
    pub fn include(mut self, pattern: &str) -> Result<Self> {
        self.include.push(compile(pattern)?);
        Ok(self)
    }

    /// Add an exclude pattern.
    pub fn exclude(mut self, pattern: &str) -> Result<Self> {
        self.exclude.push(compile(pattern)?);
        Ok(self)
    }

    /// Add multiple include patterns.
    pub fn include_many<S: AsRef<str>>(mut self, patterns: &[S]) -> Result<Self> {
        for pattern in patterns {
            self = self.include(pattern.as_ref())?;
        }
        Ok(self)
    }

    /// Add multiple exclude patterns.
    pub fn exclude_many<S: AsRef<str>>(mut self, patterns: &[S]) -> Result<Self> {
        for pattern in patterns {
            self = self.exclude(pattern.as_ref())?;
        }
        Ok(self)
    }

    /// Check if a root-relative path is selected.
    ///
    /// A path matches if:
    /// 1. It doesn't match any exclude pattern
    /// 2. It matches at least one include pattern, or include is empty and
    ///    it is a `.qmd` file
    pub fn matches(&self, relative: &Path) -> bool {
        self.matches_str(&to_posix(relative))
    }

    /// [`FilterConfig::matches`] on an already `/`-separated path.
    pub fn matches_str(&self, relative: &str) -> bool {
        if self
            .exclude
            .iter()
            .any(|p| p.matches_with(relative, MATCH_OPTIONS))
        {
            return false;
        }

        if self.include.is_empty() {
            return relative.ends_with(".qmd");
        }

        self.include
            .iter()
            .any(|p| p.matches_with(relative, MATCH_OPTIONS))
    }
}

/// Render a relative path with `/` separators.
pub fn to_posix(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// `path` relative to `root` with `/` separators.
///
/// Paths outside `root` are returned whole.
pub fn relative_posix(root: &Path, path: &Path) -> String {
    to_posix(path.strip_prefix(root).unwrap_or(path))
}

/// Check if a directory should be skipped during traversal.
fn should_skip_dir(name: &str) -> bool {
    name.starts_with('.') || SKIPPED_DIRS.contains(&name)
}

fn walk(root: &Path) -> impl Iterator<Item = walkdir::DirEntry> {
    WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_entry(|e| {
            if e.depth() == 0 || !e.file_type().is_dir() {
                return true;
            }
            let name = e.file_name().to_str().unwrap_or("");
            !should_skip_dir(name)
        })
        .filter_map(|entry| entry.ok())
}

/// Discover the documents of a project.
///
/// Walks the directory tree and returns every file whose root-relative path
/// matches the filter, sorted.
pub fn discover_documents(root: impl AsRef<Path>, filter: &FilterConfig) -> Result<Vec<PathBuf>> {
    let root = root.as_ref();

    if !root.is_dir() {
        return Err(ReadstatsError::PathNotFound(root.to_path_buf()));
    }

    let mut files: Vec<PathBuf> = walk(root)
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| filter.matches_str(&relative_posix(root, entry.path())))
        .map(|entry| entry.into_path())
        .collect();

    files.sort();
    files.dedup();

    Ok(files)
}

/// Expand aggregate prefixes into root-relative directories.
///
/// Patterns containing `*` are matched against the project's directories;
/// plain prefixes are kept as given, minus surrounding slashes.
pub fn resolve_aggregate_dirs<S: AsRef<str>>(
    root: impl AsRef<Path>,
    patterns: &[S],
) -> Result<Vec<String>> {
    let root = root.as_ref();
    let mut dirs = Vec::new();
    let mut globs = Vec::new();

    for pattern in patterns {
        let pattern = pattern.as_ref().trim_matches('/');
        if pattern.is_empty() {
            continue;
        }
        if pattern.contains('*') {
            globs.push(compile(pattern)?);
        } else {
            dirs.push(pattern.to_string());
        }
    }

    if !globs.is_empty() && root.is_dir() {
        for entry in walk(root) {
            if entry.depth() == 0 || !entry.file_type().is_dir() {
                continue;
            }
            let rel = relative_posix(root, entry.path());
            if globs.iter().any(|g| g.matches_with(&rel, MATCH_OPTIONS)) {
                dirs.push(rel);
            }
        }
    }

    dirs.sort();
    dirs.dedup();

    Ok(dirs)
}
