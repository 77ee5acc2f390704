//! Stats records stored next to the documents.
//!
//! Each document `post.qmd` gets a sibling `post_reading_stats.yml`; each
//! aggregate directory gets an `index_reading_stats.yml`. The site templates
//! read these files, so their layout is fixed.
//!
//! The two kinds can land on the same path (`posts/index.qmd` and the
//! aggregate for `posts`), so loading checks the `type` field.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::data::stats::{Language, ReadingStats};
use crate::error::ReadstatsError;
use crate::Result;

/// Suffix of per-document records.
pub const STATS_SUFFIX: &str = "_reading_stats.yml";

/// File name of aggregate records.
pub const AGGREGATE_FILE: &str = "index_reading_stats.yml";

/// Suffix of word logs.
pub const WORD_LOG_SUFFIX: &str = "_words.tmp";

/// The `type` field of a record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordKind {
    #[default]
    #[serde(rename = "stat")]
    Stat,
    #[serde(rename = "aggregated_stat")]
    AggregatedStat,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::Stat => write!(f, "stat"),
            RecordKind::AggregatedStat => write!(f, "aggregated_stat"),
        }
    }
}

/// A record type stored on disk, tagged by its `type` field.
pub trait Record: DeserializeOwned {
    const KIND: RecordKind;

    fn kind(&self) -> RecordKind;
}

/// Per-document record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsRecord {
    /// [`document_hash`](super::hash::document_hash) of the source
    #[serde(default)]
    pub hash: String,
    #[serde(default)]
    pub generated_at: String,
    #[serde(default)]
    pub language: Language,
    #[serde(rename = "type", default)]
    pub kind: RecordKind,
    pub reading: ReadingStats,
}

impl Record for StatsRecord {
    const KIND: RecordKind = RecordKind::Stat;

    fn kind(&self) -> RecordKind {
        self.kind
    }
}

impl StatsRecord {
    pub fn new(hash: String, language: Language, reading: ReadingStats) -> Self {
        Self {
            hash,
            generated_at: timestamp(),
            language,
            kind: RecordKind::Stat,
            reading,
        }
    }
}

/// Per-directory record summing the documents below it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateRecord {
    #[serde(default)]
    pub aggregated_hash: String,
    #[serde(default)]
    pub generated_at: String,
    #[serde(default)]
    pub language: Language,
    #[serde(rename = "type", default = "aggregated_kind")]
    pub kind: RecordKind,
    pub reading: ReadingStats,
}

fn aggregated_kind() -> RecordKind {
    RecordKind::AggregatedStat
}

impl Record for AggregateRecord {
    const KIND: RecordKind = RecordKind::AggregatedStat;

    fn kind(&self) -> RecordKind {
        self.kind
    }
}

impl AggregateRecord {
    pub fn new(aggregated_hash: String, language: Language, reading: ReadingStats) -> Self {
        Self {
            aggregated_hash,
            generated_at: timestamp(),
            language,
            kind: RecordKind::AggregatedStat,
            reading,
        }
    }
}

/// Current time as RFC 3339 in UTC.
pub fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, false)
}

fn sibling(source: &Path, suffix: &str) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    source.with_file_name(format!("{stem}{suffix}"))
}

/// `posts/hello.qmd` -> `posts/hello_reading_stats.yml`
pub fn stats_path(source: &Path) -> PathBuf {
    sibling(source, STATS_SUFFIX)
}

/// `posts/hello.qmd` -> `posts/hello_words.tmp`
pub fn word_log_path(source: &Path) -> PathBuf {
    sibling(source, WORD_LOG_SUFFIX)
}

/// `<root>/<prefix>/index_reading_stats.yml`
pub fn aggregate_path(root: &Path, prefix: &str) -> PathBuf {
    root.join(prefix).join(AGGREGATE_FILE)
}

/// Load a record. A missing file is `Ok(None)`; an empty file is a parse
/// error, and so is a record of the other kind.
pub fn load_record<T: Record>(path: &Path) -> Result<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }
    let text = fs::read_to_string(path).map_err(|source| ReadstatsError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let record: T = serde_yaml::from_str(&text).map_err(|source| ReadstatsError::Yaml {
        path: path.to_path_buf(),
        source,
    })?;
    if record.kind() != T::KIND {
        return Err(ReadstatsError::RecordKind {
            path: path.to_path_buf(),
            expected: T::KIND,
            found: record.kind(),
        });
    }
    Ok(Some(record))
}

/// Load a record, logging and discarding anything unreadable.
pub fn load_record_lenient<T: Record>(path: &Path) -> Option<T> {
    match load_record(path) {
        Ok(record) => record,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "ignoring unreadable stats record");
            None
        }
    }
}

/// Write a record as YAML, creating the parent directory if needed.
pub fn write_record<T: Serialize>(path: &Path, record: &T) -> Result<()> {
    let text = serde_yaml::to_string(record).map_err(|source| ReadstatsError::Yaml {
        path: path.to_path_buf(),
        source,
    })?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| ReadstatsError::FileWrite {
            path: path.to_path_buf(),
            source,
        })?;
    }
    fs::write(path, text).map_err(|source| ReadstatsError::FileWrite {
        path: path.to_path_buf(),
        source,
    })
}

/// Whether the record at `path` is missing, unreadable, or was computed for
/// a different hash.
pub fn needs_rebuild(path: &Path, expected_hash: &str) -> bool {
    match load_record_lenient::<StatsRecord>(path) {
        Some(record) => record.hash != expected_hash,
        None => true,
    }
}

/// Write counted words one per line.
pub fn write_word_log(path: &Path, words: &[String]) -> Result<()> {
    let mut text = words.join("\n");
    if !text.is_empty() {
        text.push('\n');
    }
    fs::write(path, text).map_err(|source| ReadstatsError::FileWrite {
        path: path.to_path_buf(),
        source,
    })
}
