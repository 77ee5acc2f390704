//! Per-document render times collected during a `quarto render`.
//!
//! A render hook appends `relpath<TAB>milliseconds` lines to
//! `.qrender-time.tmp-<lang>.tsv` files. After the render, the emitter merges
//! them into `.qrender-time-<lang>.json` at the project root and removes the
//! temporary files.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::ReadstatsError;
use crate::Result;

/// Fewer temporary files than this and nothing is emitted.
pub const MIN_TMP_FILES: usize = 2;

pub fn tmp_file_name(lang: &str) -> String {
    format!(".qrender-time.tmp-{lang}.tsv")
}

pub fn output_file_name(lang: &str) -> String {
    format!(".qrender-time-{lang}.json")
}

/// Contents of `.qrender-time-<lang>.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RenderTimes {
    /// Milliseconds per document, by root-relative path
    pub files: BTreeMap<String, f64>,
    /// Milliseconds per directory, summed over everything below it
    pub folders: BTreeMap<String, f64>,
    pub total: f64,
    pub count: usize,
    /// Longest path in `files`, in characters
    #[serde(rename = "max-length")]
    pub max_length: usize,
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Ancestor directories of a relative path, outermost first, without the
/// root: `a/b/c.qmd -> [a, a/b]`.
pub fn parent_dirs(relative: &str) -> Vec<String> {
    let trimmed = relative.trim_matches('/');
    let parts: Vec<&str> = trimmed.split('/').collect();
    if parts.len() < 2 {
        return Vec::new();
    }
    (1..parts.len()).map(|i| parts[..i].join("/")).collect()
}

impl RenderTimes {
    /// Build from raw per-file milliseconds.
    pub fn from_files(raw: BTreeMap<String, f64>) -> Self {
        let files: BTreeMap<String, f64> =
            raw.into_iter().map(|(k, v)| (k, round3(v))).collect();

        let mut folders: BTreeMap<String, f64> = BTreeMap::new();
        for (path, ms) in &files {
            for dir in parent_dirs(path) {
                *folders.entry(dir).or_default() += ms;
            }
        }
        for ms in folders.values_mut() {
            *ms = round3(*ms);
        }

        Self {
            total: round3(files.values().sum()),
            count: files.len(),
            max_length: files.keys().map(|k| k.chars().count()).max().unwrap_or(0),
            files,
            folders,
        }
    }
}

/// Parse `relpath<TAB>ms` lines into `into`. Malformed lines are ignored and
/// later entries replace earlier ones.
pub fn parse_tsv(text: &str, into: &mut BTreeMap<String, f64>) {
    for line in text.lines() {
        let line = line.trim();
        let Some((path, ms)) = line.split_once('\t') else {
            continue;
        };
        let Ok(ms) = ms.trim().parse::<f64>() else {
            continue;
        };
        into.insert(path.replace('\\', "/"), ms);
    }
}

/// Every temporary file for `lang` under `root`, oldest first.
pub fn find_tmp_files(root: &Path, lang: &str) -> Vec<PathBuf> {
    let needle = tmp_file_name(lang);
    let mut found: Vec<(PathBuf, SystemTime)> = WalkDir::new(root)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file() && entry.file_name() == needle.as_str())
        .map(|entry| {
            let mtime = entry
                .metadata()
                .ok()
                .and_then(|m| m.modified().ok())
                .unwrap_or(SystemTime::UNIX_EPOCH);
            (entry.into_path(), mtime)
        })
        .collect();

    found.sort_by(|a, b| a.1.cmp(&b.1));
    found.into_iter().map(|(path, _)| path).collect()
}

/// Result of emitting one language.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmitReport {
    pub language: String,
    /// Temporary files found
    pub tmp_files: usize,
    /// Written JSON, if anything was emitted
    pub output: Option<PathBuf>,
    pub times: Option<RenderTimes>,
}

/// Merge the temporary render-time files of `lang` into JSON.
pub fn emit_render_times(root: &Path, lang: &str) -> Result<EmitReport> {
    let tmp_files = find_tmp_files(root, lang);
    let mut report = EmitReport {
        language: lang.to_string(),
        tmp_files: tmp_files.len(),
        output: None,
        times: None,
    };

    if tmp_files.len() < MIN_TMP_FILES {
        debug!(lang, found = tmp_files.len(), "not enough render-time files");
        return Ok(report);
    }

    let mut raw = BTreeMap::new();
    for path in &tmp_files {
        match fs::read_to_string(path) {
            Ok(text) => parse_tsv(&text, &mut raw),
            Err(err) => warn!(path = %path.display(), error = %err, "skipping render-time file"),
        }
    }

    let times = RenderTimes::from_files(raw);
    let out_path = root.join(output_file_name(lang));
    fs::write(&out_path, serde_json::to_string_pretty(&times)?).map_err(|source| {
        ReadstatsError::FileWrite {
            path: out_path.clone(),
            source,
        }
    })?;

    for path in &tmp_files {
        if let Err(err) = fs::remove_file(path) {
            warn!(path = %path.display(), error = %err, "could not remove render-time file");
        }
    }

    report.output = Some(out_path);
    report.times = Some(times);
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::tempdir;

    fn write_tmp(dir: &Path, lang: &str, body: &str, mtime_secs: u64) -> PathBuf {
        fs::create_dir_all(dir).unwrap();
        let path = dir.join(tmp_file_name(lang));
        fs::write(&path, body).unwrap();
        let file = fs::File::options().write(true).open(&path).unwrap();
        file.set_modified(SystemTime::UNIX_EPOCH + Duration::from_secs(mtime_secs))
            .unwrap();
        path
    }

    #[test]
    fn test_parent_dirs() {
        assert_eq!(parent_dirs("a/b/c.qmd"), vec!["a", "a/b"]);
        assert_eq!(parent_dirs("/a/c.qmd"), vec!["a"]);
        assert!(parent_dirs("index.qmd").is_empty());
        assert!(parent_dirs("").is_empty());
    }

    #[test]
    fn test_parse_tsv() {
        let mut files = BTreeMap::new();
        parse_tsv(
            "posts\\a.qmd\t10.5\n\nbroken line\nposts/b.qmd\tabc\nindex.qmd\t 3 \nposts/a.qmd\t12\n",
            &mut files,
        );

        assert_eq!(files.len(), 2);
        assert_eq!(files["posts/a.qmd"], 12.0);
        assert_eq!(files["index.qmd"], 3.0);
    }

    #[test]
    fn test_render_times_aggregation() {
        let raw = BTreeMap::from([
            ("posts/2024/a.qmd".to_string(), 100.12345),
            ("posts/b.qmd".to_string(), 50.0),
            ("index.qmd".to_string(), 25.0),
        ]);
        let times = RenderTimes::from_files(raw);

        assert_eq!(times.files["posts/2024/a.qmd"], 100.123);
        assert_eq!(times.folders["posts"], 150.123);
        assert_eq!(times.folders["posts/2024"], 100.123);
        assert!(!times.folders.contains_key(""));
        assert_eq!(times.total, 175.123);
        assert_eq!(times.count, 3);
        assert_eq!(times.max_length, "posts/2024/a.qmd".len());
    }

    #[test]
    fn test_json_layout() {
        let times = RenderTimes::from_files(BTreeMap::from([("a/b.qmd".to_string(), 1.0)]));
        let json = serde_json::to_string(&times).unwrap();

        assert_eq!(
            json,
            r#"{"files":{"a/b.qmd":1.0},"folders":{"a":1.0},"total":1.0,"count":1,"max-length":7}"#
        );
    }

    #[test]
    fn test_emit_merges_last_write_wins() {
        let temp = tempdir().unwrap();
        let root = temp.path();
        write_tmp(&root.join("posts"), "tr", "posts/a.qmd\t100\n", 2_000);
        write_tmp(root, "tr", "posts/a.qmd\t80\nindex.qmd\t20\n", 1_000);
        write_tmp(root, "en", "en/index.qmd\t5\n", 1_000);

        let report = emit_render_times(root, "tr").unwrap();

        assert_eq!(report.tmp_files, 2);
        assert_eq!(report.output, Some(root.join(".qrender-time-tr.json")));
        let times = report.times.unwrap();
        assert_eq!(times.files["posts/a.qmd"], 100.0);
        assert_eq!(times.total, 120.0);

        let written: RenderTimes =
            serde_json::from_str(&fs::read_to_string(root.join(".qrender-time-tr.json")).unwrap())
                .unwrap();
        assert_eq!(written.count, 2);

        assert!(find_tmp_files(root, "tr").is_empty());
        assert_eq!(find_tmp_files(root, "en").len(), 1);
    }

    #[test]
    fn test_emit_needs_two_files() {
        let temp = tempdir().unwrap();
        let root = temp.path();
        write_tmp(root, "tr", "index.qmd\t20\n", 1_000);

        let report = emit_render_times(root, "tr").unwrap();

        assert_eq!(report.tmp_files, 1);
        assert!(report.output.is_none());
        assert!(!root.join(".qrender-time-tr.json").exists());
        assert_eq!(find_tmp_files(root, "tr").len(), 1);
    }
}
