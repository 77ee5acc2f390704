//! Word-cloud data files written next to a document.
//!
//! - `<stem>_words.json`: unigrams as `[{"text": .., "value": ..}]`
//! - `<stem>_{n}gram.txt`: one `term,count` line per n-gram

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use crate::error::ReadstatsError;
use crate::Result;

use super::frequency::{compute_ngram_frequencies, NgramFrequencies, NgramOptions, TermCount};

/// Files written by an export.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExportReport {
    pub words_json: Option<PathBuf>,
    pub ngram_files: Vec<PathBuf>,
}

fn sibling(source: &Path, suffix: &str) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    source.with_file_name(format!("{stem}{suffix}"))
}

/// `post.qmd` -> `post_words.json`
pub fn words_json_path(source: &Path) -> PathBuf {
    sibling(source, "_words.json")
}

/// `post.qmd`, 2 -> `post_2gram.txt`
pub fn ngram_path(source: &Path, n: usize) -> PathBuf {
    sibling(source, &format!("_{n}gram.txt"))
}

fn write(path: &Path, text: String) -> Result<()> {
    fs::write(path, text).map_err(|source| ReadstatsError::FileWrite {
        path: path.to_path_buf(),
        source,
    })
}

/// Render a table as word-cloud JSON.
pub fn words_json(rows: &[TermCount], compressed: bool) -> Result<String> {
    let text = if compressed {
        serde_json::to_string(rows)?
    } else {
        serde_json::to_string_pretty(rows)?
    };
    Ok(text)
}

/// Render a table as `term,count` lines.
pub fn ngram_lines(rows: &[TermCount]) -> String {
    rows.iter()
        .map(|row| format!("{},{}\n", row.text, row.value))
        .collect()
}

/// Write the files for already computed tables.
pub fn write_ngram_files(
    source: &Path,
    freqs: &NgramFrequencies,
    compressed: bool,
) -> Result<ExportReport> {
    let mut report = ExportReport::default();

    let unigrams = freqs.unigrams();
    if !unigrams.is_empty() {
        let path = words_json_path(source);
        write(&path, words_json(unigrams, compressed)?)?;
        report.words_json = Some(path);
    }

    for (n, rows) in &freqs.by_n {
        if rows.is_empty() {
            continue;
        }
        let path = ngram_path(source, *n);
        write(&path, ngram_lines(rows))?;
        report.ngram_files.push(path);
    }

    debug!(
        source = %source.display(),
        files = report.ngram_files.len(),
        "wrote word-cloud data"
    );
    Ok(report)
}

/// Compute tables from counted words and write them next to `source`.
pub fn export_ngram_files<S: AsRef<str>>(
    source: &Path,
    tokens: &[S],
    options: &NgramOptions,
    compressed: bool,
) -> Result<(NgramFrequencies, ExportReport)> {
    let freqs = compute_ngram_frequencies(tokens, options);
    let report = write_ngram_files(source, &freqs, compressed)?;
    Ok((freqs, report))
}
