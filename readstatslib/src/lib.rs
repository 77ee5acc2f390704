//! # readstatslib
//!
//! Build-time reading statistics for Quarto sites: word counts, syllable
//! counts and reading time per document, cached next to the sources.
//!
//! ## Overview
//!
//! Documents are converted to Pandoc's JSON tree and walked. Only prose
//! counts: code, raw output, navigation envelopes and reference lists are
//! skipped. The library provides:
//!
//! - **AST counting**: words and vowel-run syllables over metadata and body
//! - **Focus regions**: restrict counting to Divs/Spans with a chosen class
//! - **Hash cache**: a `<stem>_reading_stats.yml` record per document,
//!   rebuilt only when the source, language or reading speed changes
//! - **Aggregates**: `index_reading_stats.yml` totals per directory
//! - **Word clouds**: Turkish-aware unigram and n-gram frequency files
//! - **Render timing**: a wall-clock timer and per-document render times
//!
//! ## Example
//!
//! ```rust
//! use readstatslib::{precompute, FilterConfig, JsonLoader, PrecomputeOptions};
//! use std::fs;
//! use tempfile::tempdir;
//!
//! // A project with one document, already in Pandoc JSON form
//! let dir = tempdir().unwrap();
//! fs::write(
//!     dir.path().join("post.json"),
//!     r#"{"meta":{},"blocks":[{"t":"Para","c":[{"t":"Str","c":"Merhaba"},{"t":"Space"},{"t":"Str","c":"dünya"}]}]}"#,
//! )
//! .unwrap();
//!
//! let filter = FilterConfig::new().include("**/*.json").unwrap();
//! let options = PrecomputeOptions::new().filter(filter);
//!
//! // First run counts the document and writes its record
//! let report = precompute(dir.path(), &options, &JsonLoader).unwrap();
//! assert_eq!(report.rebuilt(), 1);
//! assert_eq!(report.total().words, 2);
//! assert!(dir.path().join("post_reading_stats.yml").exists());
//!
//! // Second run finds the record current
//! let report = precompute(dir.path(), &options, &JsonLoader).unwrap();
//! assert_eq!(report.cached(), 1);
//! ```

pub mod ast;
pub mod cache;
pub mod config;
pub mod data;
pub mod error;
pub mod ngram;
pub mod output;
pub mod source;
pub mod timing;

pub use ast::{AstLoader, AutoLoader, Document, JsonLoader, PandocLoader};
pub use cache::{
    precompute, AggregateOutcome, DocumentOutcome, PrecomputeOptions, PrecomputeReport,
};
pub use config::{project_root, ProjectConfig};
pub use data::{
    count_document, count_loaded, CountOptions, Counts, DocumentReport, FocusRule, Language,
    ReadingStats, SkipRules,
};
pub use error::ReadstatsError;
pub use ngram::{export_ngram_files, ExportReport, NgramFrequencies, NgramOptions};
pub use output::{OrderBy, Ordering, StatsTable, TableRow};
pub use source::FilterConfig;
pub use timing::{elapsed_seconds, emit_render_times, start_timer, EmitReport, RenderTimes};

/// Result type for readstatslib operations
pub type Result<T> = std::result::Result<T, ReadstatsError>;
