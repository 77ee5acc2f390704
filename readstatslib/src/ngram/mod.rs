//! Word-cloud term frequencies.
//!
//! Takes the words counted in a document and produces unigram and n-gram
//! frequency tables, written as data files that the site's word-cloud
//! overlay renders. Casing follows Turkish rules and acronyms keep their
//! capitals.
//!
//! ## Example
//!
//! ```rust,ignore
//! use readstatslib::ngram::{export_ngram_files, NgramOptions};
//!
//! let report = count_document("posts/dava.qmd", &CountOptions::new())?;
//! export_ngram_files(&report.path, &report.words, &NgramOptions::new().max_ngram(2), true)?;
//! ```

pub mod casing;
pub mod export;
pub mod frequency;
pub mod tokens;

pub use casing::{turkish_lower, turkish_lower_plain, turkish_upper};
pub use export::{export_ngram_files, ngram_path, words_json_path, write_ngram_files, ExportReport};
pub use frequency::{
    compute_ngram_frequencies, compute_ngram_frequencies_with, parse_min_count, stopwords_with,
    IdentityLemmatizer, Lemmatizer, NgramFilter, NgramFrequencies, NgramOptions, StopwordFilter,
    TermCount, TURKISH_STOPWORDS,
};
pub use tokens::{preprocess_tokens, ProperNames};
