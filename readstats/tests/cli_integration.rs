//! Integration tests for readstats CLI
//!
//! Fixtures are Pandoc JSON documents, so pandoc does not need to be installed.

use std::fs;
use std::path::Path;
use std::process::Command;

use tempfile::{tempdir, TempDir};

fn run_readstats(args: &[&str]) -> (String, String, bool) {
    let mut cmd_args = vec!["run", "-q", "-p", "readstats", "--"];
    cmd_args.extend(args);

    let output = Command::new("cargo")
        .args(&cmd_args)
        .current_dir(env!("CARGO_MANIFEST_DIR").to_string() + "/..")
        .env_remove("QUARTO_PROJECT_DIR")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let success = output.status.success();

    (stdout, stderr, success)
}

/// A Pandoc JSON document with one paragraph
fn paragraph(text: &str) -> String {
    let inlines: Vec<String> = text
        .split(' ')
        .map(|w| format!(r#"{{"t":"Str","c":"{}"}}"#, w))
        .collect();
    format!(
        r#"{{"pandoc-api-version":[1,23],"meta":{{}},"blocks":[{{"t":"Para","c":[{}]}}]}}"#,
        inlines.join(r#",{"t":"Space"},"#)
    )
}

fn write(root: &Path, rel: &str, contents: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn project() -> TempDir {
    let dir = tempdir().unwrap();
    write(dir.path(), "posts/a.json", &paragraph("bir iki üç"));
    write(dir.path(), "posts/b.json", &paragraph("Merhaba dünya"));
    write(dir.path(), "about.json", &paragraph("selam"));
    dir
}

fn root_str(dir: &TempDir) -> &str {
    dir.path().to_str().unwrap()
}

#[test]
fn test_cli_help() {
    let (stdout, _, success) = run_readstats(&["--help"]);

    assert!(success);
    assert!(stdout.contains("readstats"));
    assert!(stdout.contains("--root"));
    assert!(stdout.contains("--aggregate"));
    assert!(stdout.contains("--output"));
    assert!(stdout.contains("ngrams"));
    assert!(stdout.contains("timer"));
}

#[test]
fn test_cli_version() {
    let (stdout, _, success) = run_readstats(&["--version"]);

    assert!(success);
    assert!(stdout.contains("readstats"));
}

#[test]
fn test_stats_table_output() {
    let dir = project();
    let (stdout, stderr, success) = run_readstats(&[
        "stats",
        "--root",
        root_str(&dir),
        "--include",
        "**/*.json",
        "--aggregate",
        "posts",
    ]);

    assert!(success, "stderr: {}", stderr);
    assert!(stdout.contains("Document"));
    assert!(stdout.contains("Reading time"));
    assert!(stdout.contains("posts/a.json"));
    assert!(stdout.contains("Total (3 documents)"));
    assert!(stdout.contains("Aggregate"));
    assert!(stdout.contains("3 rebuilt, 0 cached"));

    assert!(dir.path().join("posts/a_reading_stats.yml").exists());
    assert!(dir.path().join("about_reading_stats.yml").exists());
    assert!(dir.path().join("posts/index_reading_stats.yml").exists());
}

#[test]
fn test_stats_second_run_is_cached() {
    let dir = project();
    let args = ["--root", root_str(&dir), "--include", "**/*.json"];

    let (_, _, success) = run_readstats(&args);
    assert!(success);

    let (stdout, _, success) = run_readstats(&args);
    assert!(success);
    assert!(stdout.contains("0 rebuilt, 3 cached"));

    let (stdout, _, success) = run_readstats(&[args.as_slice(), &["--force"]].concat());
    assert!(success);
    assert!(stdout.contains("3 rebuilt, 0 cached"));
}

#[test]
fn test_stats_index_under_aggregate_settles() {
    let dir = project();
    write(dir.path(), "posts/index.json", &paragraph("yazılar listesi"));
    let args = [
        "--root",
        root_str(&dir),
        "--include",
        "**/*.json",
        "--aggregate",
        "posts",
    ];

    let (stdout, stderr, success) = run_readstats(&args);
    assert!(success, "stderr: {}", stderr);
    assert!(stdout.contains("3 rebuilt, 0 cached, 1 skipped"));

    let (stdout, _, success) = run_readstats(&args);
    assert!(success);
    assert!(stdout.contains("0 rebuilt, 3 cached, 1 skipped"));
    assert!(stdout.contains("unchanged"));

    let record = fs::read_to_string(dir.path().join("posts/index_reading_stats.yml")).unwrap();
    assert!(record.contains("type: aggregated_stat"));
}

#[test]
fn test_stats_json_output() {
    let dir = project();
    let (stdout, _, success) = run_readstats(&[
        "--root",
        root_str(&dir),
        "--include",
        "**/*.json",
        "--lang",
        "en",
        "--output",
        "json",
    ]);

    assert!(success);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).expect("Invalid JSON output");
    let documents = parsed["documents"].as_array().unwrap();
    assert_eq!(documents.len(), 3);
    assert!(documents.iter().all(|d| d["outcome"] == "rebuilt"));

    let about = documents
        .iter()
        .find(|d| d["relative"] == "about.json")
        .unwrap();
    assert_eq!(about["reading"]["words"], 1);
    assert_eq!(about["reading"]["label_word_count"], "Word Count");

    let record = fs::read_to_string(dir.path().join("about_reading_stats.yml")).unwrap();
    assert!(record.contains("language: en"));
    assert!(record.contains("type: stat"));
}

#[test]
fn test_stats_invalid_root() {
    let (_, stderr, success) = run_readstats(&["--root", "/nonexistent/readstats/root"]);

    assert!(!success);
    assert!(stderr.contains("Error:"));
}

#[test]
fn test_count_words() {
    let dir = project();
    let file = dir.path().join("posts/a.json");
    let (stdout, _, success) = run_readstats(&["count", file.to_str().unwrap(), "--words"]);

    assert!(success);
    assert_eq!(stdout.lines().collect::<Vec<_>>(), vec!["bir", "iki", "üç"]);
}

#[test]
fn test_count_json_output() {
    let dir = project();
    let file = dir.path().join("posts/b.json");
    let (stdout, _, success) =
        run_readstats(&["count", file.to_str().unwrap(), "--output", "json"]);

    assert!(success);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).expect("Invalid JSON output");
    assert_eq!(parsed["counts"]["words"], 2);
    assert_eq!(parsed["reading"]["words"], 2);

    // Counting alone writes no record
    assert!(!dir.path().join("posts/b_reading_stats.yml").exists());
}

#[test]
fn test_count_missing_file() {
    let (_, stderr, success) = run_readstats(&["count", "/nonexistent/post.json"]);

    assert!(!success);
    assert!(stderr.contains("Error:"));
}

#[test]
fn test_ngrams_from_word_log() {
    let dir = tempdir().unwrap();
    write(dir.path(), "post_words.tmp", "Dava\ndava\nkitap\nve\n2024\n");
    let log = dir.path().join("post_words.tmp");

    let (stdout, stderr, success) = run_readstats(&["ngrams", log.to_str().unwrap()]);

    assert!(success, "stderr: {}", stderr);
    assert!(stdout.contains("post_words.json"));

    let json = fs::read_to_string(dir.path().join("post_words.json")).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed[0]["text"], "dava");
    assert_eq!(parsed[0]["value"], 2);
    assert_eq!(parsed[1]["text"], "kitap");
    assert_eq!(parsed.as_array().unwrap().len(), 2);
}

#[test]
fn test_ngrams_invalid_min_count() {
    let dir = tempdir().unwrap();
    write(dir.path(), "post_words.tmp", "dava\n");
    let log = dir.path().join("post_words.tmp");

    let (_, stderr, success) =
        run_readstats(&["ngrams", log.to_str().unwrap(), "--min-count", "2:3"]);

    assert!(!success);
    assert!(stderr.contains("Error:"));
}

#[test]
fn test_timer_start_end() {
    let dir = tempdir().unwrap();

    let (_, _, success) = run_readstats(&["timer", "start", "--root", root_str(&dir)]);
    assert!(success);
    assert!(dir.path().join(".qrender_timer.json").exists());

    let (stdout, _, success) = run_readstats(&["timer", "end", "--root", root_str(&dir)]);
    assert!(success);
    assert!(stdout.contains("Total render time:"));
}

#[test]
fn test_timer_end_without_start() {
    let dir = tempdir().unwrap();
    write(dir.path(), ".qrender-time.tmp-tr.tsv", "index.qmd\t20\n");
    write(dir.path(), "posts/.qrender-time.tmp-tr.tsv", "posts/a.qmd\t100\n");

    let (_, stderr, success) = run_readstats(&["timer", "end", "--root", root_str(&dir)]);

    assert!(!success);
    assert!(stderr.contains("Error:"));
    // nothing emitted before the missing start time is noticed
    assert!(dir.path().join(".qrender-time.tmp-tr.tsv").exists());
    assert!(dir.path().join("posts/.qrender-time.tmp-tr.tsv").exists());
    assert!(!dir.path().join(".qrender-time-tr.json").exists());
}

#[test]
fn test_emit_render_times() {
    let dir = tempdir().unwrap();
    write(dir.path(), ".qrender-time.tmp-tr.tsv", "index.qmd\t20\n");
    write(dir.path(), "posts/.qrender-time.tmp-tr.tsv", "posts/a.qmd\t100\n");

    let (stdout, _, success) =
        run_readstats(&["emit-render-times", "--root", root_str(&dir), "--lang", "tr"]);

    assert!(success);
    assert!(stdout.contains("2 files"));

    let json = fs::read_to_string(dir.path().join(".qrender-time-tr.json")).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed["count"], 2);
    assert_eq!(parsed["total"], 120.0);
    assert_eq!(parsed["folders"]["posts"], 100.0);
    assert!(!dir.path().join(".qrender-time.tmp-tr.tsv").exists());
}
