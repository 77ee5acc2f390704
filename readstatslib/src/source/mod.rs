//! Source discovery: find the documents to count.
//!
//! This module handles the first stage of the pipeline. It walks the project
//! root, skipping build output, and selects documents with include/exclude
//! globs. It also expands the directory prefixes that get aggregate records.
//!
//! ## Example
//!
//! ```rust,ignore
//! use readstatslib::source::{discover_documents, FilterConfig};
//!
//! let filter = FilterConfig::new()
//!     .include("**/*.qmd")?
//!     .exclude("drafts/**")?;
//! let docs = discover_documents(".", &filter)?;
//! ```

pub mod filter;

pub use filter::{
    discover_documents, relative_posix, resolve_aggregate_dirs, to_posix, FilterConfig,
    SKIPPED_DIRS,
};
