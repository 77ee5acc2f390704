//! Data collection: count documents and derive reading statistics.
//!
//! This module handles the counting stage of the pipeline. It provides:
//!
//! - **Syllables**: vowel-run heuristic over single tokens
//! - **Walking**: tree visitor with skip and focus rules
//! - **Statistics**: `Counts`, `ReadingStats` and the reading-time label
//! - **Counting**: high-level API (`count_document`, `count_loaded`)
//!
//! ## Example
//!
//! ```rust,ignore
//! use readstatslib::data::{count_document, CountOptions};
//!
//! let report = count_document("posts/hello.qmd", &CountOptions::new())?;
//! println!("{} words, {}", report.counts.words, report.reading.text);
//! ```

pub mod counter;
pub mod stats;
pub mod syllables;
pub mod visitor;

pub use counter::{count_document, count_loaded, count_with_loader, CountOptions, DocumentReport};
pub use stats::{
    format_reading_time, labels, Counts, LabelScope, Language, ReadingStats,
    DEFAULT_SECONDS_PER_SYLLABLE,
};
pub use syllables::{SyllableCounter, TokenCount, TURKISH_VOWELS};
pub use visitor::{gather_stats, CountReport, FocusRule, SkipRules, Visitor, META_FIELDS};
