//! The precompute run: refresh stale document records, then aggregates.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::ast::AstLoader;
use crate::config::ProjectConfig;
use crate::data::counter::{count_with_loader, CountOptions};
use crate::data::stats::{Counts, ReadingStats};
use crate::error::ReadstatsError;
use crate::source::filter::{
    discover_documents, relative_posix, resolve_aggregate_dirs, FilterConfig,
};
use crate::Result;

use super::hash::{aggregate_entry, aggregate_hash, document_hash};
use super::record::{
    aggregate_path, load_record_lenient, needs_rebuild, stats_path, word_log_path, write_record,
    write_word_log, AggregateRecord, StatsRecord,
};

/// Options for a precompute run.
#[derive(Debug, Clone, Default)]
pub struct PrecomputeOptions {
    pub count: CountOptions,
    pub filter: FilterConfig,
    /// Aggregate prefixes, globs allowed
    pub aggregate: Vec<String>,
    /// Rebuild every document even when its record is current
    pub force: bool,
    /// Write `<stem>_words.tmp` for rebuilt documents
    pub word_log: bool,
}

impl PrecomputeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Options as configured in the project's `_quarto.yml`.
    pub fn from_config(config: &ProjectConfig) -> Result<Self> {
        let reading = &config.reading_time;
        let filter = FilterConfig::new()
            .include_many(&reading.include)?
            .exclude_many(&reading.exclude)?;

        Ok(Self {
            count: CountOptions::from_config(config),
            filter,
            aggregate: reading.aggregate.clone(),
            force: false,
            word_log: reading.word_log,
        })
    }

    pub fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    pub fn filter(mut self, filter: FilterConfig) -> Self {
        self.filter = filter;
        self
    }

    pub fn aggregate(mut self, prefixes: Vec<String>) -> Self {
        self.aggregate = prefixes;
        self
    }

    pub fn count(mut self, count: CountOptions) -> Self {
        self.count = count;
        self
    }

    pub fn word_log(mut self, enabled: bool) -> Self {
        self.word_log = enabled;
        self
    }
}

/// What happened to one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentOutcome {
    Rebuilt,
    Cached,
    /// Its record path is an aggregate's `index_reading_stats.yml`
    Skipped,
}

/// What happened to one aggregate prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregateOutcome {
    Written,
    Unchanged,
    /// Nothing counted under the prefix; no record written
    Empty,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentEntry {
    pub path: PathBuf,
    /// Path relative to the project root, `/`-separated
    pub relative: String,
    pub outcome: DocumentOutcome,
    pub reading: Option<ReadingStats>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateEntry {
    pub prefix: String,
    pub outcome: AggregateOutcome,
    /// Number of documents with a record under the prefix
    pub documents: usize,
    pub reading: Option<ReadingStats>,
}

/// Result of a precompute run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PrecomputeReport {
    pub documents: Vec<DocumentEntry>,
    pub aggregates: Vec<AggregateEntry>,
}

impl PrecomputeReport {
    pub fn rebuilt(&self) -> usize {
        self.count_documents(DocumentOutcome::Rebuilt)
    }

    pub fn cached(&self) -> usize {
        self.count_documents(DocumentOutcome::Cached)
    }

    pub fn skipped(&self) -> usize {
        self.count_documents(DocumentOutcome::Skipped)
    }

    fn count_documents(&self, outcome: DocumentOutcome) -> usize {
        self.documents
            .iter()
            .filter(|d| d.outcome == outcome)
            .count()
    }

    /// Counts over every document with stats.
    pub fn total(&self) -> Counts {
        self.documents
            .iter()
            .filter_map(|d| d.reading.as_ref())
            .fold(Counts::default(), |acc, r| acc + r.counts())
    }
}

/// Refresh the reading stats of a project.
///
/// 1. Discovers documents under `root` with the options' filter
/// 2. Rebuilds each document whose record is missing, unreadable, or stale
/// 3. Writes an aggregate record for each resolved prefix whose children
///    changed
///
/// A document whose record would be an aggregate's record (`<prefix>/index.qmd`)
/// is skipped and left out of the totals.
pub fn precompute(
    root: impl AsRef<Path>,
    options: &PrecomputeOptions,
    loader: &dyn AstLoader,
) -> Result<PrecomputeReport> {
    let root = root.as_ref();
    let discovered = discover_documents(root, &options.filter)?;
    debug!(root = %root.display(), count = discovered.len(), "discovered documents");

    let prefixes = resolve_aggregate_dirs(root, &options.aggregate)?;
    let reserved: HashSet<PathBuf> = prefixes
        .iter()
        .map(|prefix| aggregate_path(root, prefix))
        .collect();

    let mut report = PrecomputeReport::default();
    let mut documents = Vec::with_capacity(discovered.len());
    for path in discovered {
        if reserved.contains(&stats_path(&path)) {
            let relative = relative_posix(root, &path);
            warn!(document = %relative, "record path belongs to an aggregate, skipping");
            report.documents.push(DocumentEntry {
                path,
                relative,
                outcome: DocumentOutcome::Skipped,
                reading: None,
            });
            continue;
        }
        report
            .documents
            .push(refresh_document(root, &path, options, loader)?);
        documents.push(path);
    }

    for prefix in prefixes {
        report
            .aggregates
            .push(refresh_aggregate(root, &prefix, &documents, &options.count)?);
    }

    Ok(report)
}

fn refresh_document(
    root: &Path,
    path: &Path,
    options: &PrecomputeOptions,
    loader: &dyn AstLoader,
) -> Result<DocumentEntry> {
    let count = &options.count;
    let relative = relative_posix(root, path);
    let bytes = fs::read(path).map_err(|source| ReadstatsError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let hash = document_hash(&bytes, &count.language, count.seconds_per_syllable);
    let record_path = stats_path(path);

    if !options.force && !needs_rebuild(&record_path, &hash) {
        debug!(document = %relative, "stats up to date");
        let reading = load_record_lenient::<StatsRecord>(&record_path).map(|r| r.reading);
        return Ok(DocumentEntry {
            path: path.to_path_buf(),
            relative,
            outcome: DocumentOutcome::Cached,
            reading,
        });
    }

    let counted = count_with_loader(path, loader, count)?;
    write_record(
        &record_path,
        &StatsRecord::new(hash, count.language.clone(), counted.reading.clone()),
    )?;
    if options.word_log {
        write_word_log(&word_log_path(path), &counted.words)?;
    }
    info!(
        document = %relative,
        words = counted.counts.words,
        syllables = counted.counts.syllables,
        "rebuilt reading stats"
    );

    Ok(DocumentEntry {
        path: path.to_path_buf(),
        relative,
        outcome: DocumentOutcome::Rebuilt,
        reading: Some(counted.reading),
    })
}

/// Whether a root-relative document path falls under an aggregate prefix.
pub fn under_prefix(relative: &str, prefix: &str) -> bool {
    relative == prefix
        || relative
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('/'))
}

fn refresh_aggregate(
    root: &Path,
    prefix: &str,
    documents: &[PathBuf],
    count: &CountOptions,
) -> Result<AggregateEntry> {
    let mut totals = Counts::default();
    let mut seconds = 0.0;
    let mut entries = Vec::new();
    let mut children = 0;

    for path in documents {
        let relative = relative_posix(root, path);
        if !under_prefix(&relative, prefix) {
            continue;
        }
        let Some(record) = load_record_lenient::<StatsRecord>(&stats_path(path)) else {
            continue;
        };

        totals += record.reading.counts();
        seconds += record.reading.seconds;
        children += 1;
        if !record.hash.is_empty() {
            entries.push(aggregate_entry(&relative, &record.hash));
        }
    }

    if totals.is_empty() {
        debug!(prefix, "nothing to aggregate");
        return Ok(AggregateEntry {
            prefix: prefix.to_string(),
            outcome: AggregateOutcome::Empty,
            documents: children,
            reading: None,
        });
    }

    let hash = aggregate_hash(&entries);
    let out_path = aggregate_path(root, prefix);

    if let Some(existing) = load_record_lenient::<AggregateRecord>(&out_path) {
        if existing.aggregated_hash == hash {
            debug!(prefix, "aggregate up to date");
            return Ok(AggregateEntry {
                prefix: prefix.to_string(),
                outcome: AggregateOutcome::Unchanged,
                documents: children,
                reading: Some(existing.reading),
            });
        }
    }

    let reading = ReadingStats::for_aggregate(
        totals,
        seconds,
        count.seconds_per_syllable,
        &count.language,
    );
    write_record(
        &out_path,
        &AggregateRecord::new(hash, count.language.clone(), reading.clone()),
    )?;
    info!(prefix, words = totals.words, "wrote aggregate reading stats");

    Ok(AggregateEntry {
        prefix: prefix.to_string(),
        outcome: AggregateOutcome::Written,
        documents: children,
        reading: Some(reading),
    })
}
