//! Wall-clock timer around a whole `quarto render`.
//!
//! `start` runs as a pre-render script and stores the current time; `end`
//! runs as a post-render script and reads it back.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ReadstatsError;
use crate::Result;

/// Timer state file, relative to the project root.
pub const TIMER_FILE: &str = ".qrender_timer.json";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
struct TimerState {
    /// Unix time in seconds
    t: f64,
}

pub fn timer_path(root: &Path) -> PathBuf {
    root.join(TIMER_FILE)
}

fn now() -> Result<f64> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .map_err(|e| ReadstatsError::Timer(e.to_string()))
}

/// Record the start time. Returns it as Unix seconds.
pub fn start_timer(root: &Path) -> Result<f64> {
    let t = now()?;
    let path = timer_path(root);
    let text = serde_json::to_string(&TimerState { t })?;
    fs::write(&path, text).map_err(|source| ReadstatsError::FileWrite {
        path: path.clone(),
        source,
    })?;
    debug!(path = %path.display(), "render timer started");
    Ok(t)
}

/// Seconds since the recorded start.
pub fn elapsed_seconds(root: &Path) -> Result<f64> {
    let path = timer_path(root);
    let text = fs::read_to_string(&path).map_err(|e| {
        ReadstatsError::Timer(format!("cannot read '{}': {e}", path.display()))
    })?;
    let state: TimerState = serde_json::from_str(&text)
        .map_err(|e| ReadstatsError::Timer(format!("invalid '{}': {e}", path.display())))?;
    Ok((now()? - state.t).max(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn start_writes_state_file() {
        let dir = tempdir().unwrap();
        let t = start_timer(dir.path()).unwrap();

        let text = fs::read_to_string(dir.path().join(TIMER_FILE)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert!((value["t"].as_f64().unwrap() - t).abs() < 1e-3);
    }

    #[test]
    fn elapsed_after_start() {
        let dir = tempdir().unwrap();
        start_timer(dir.path()).unwrap();

        let elapsed = elapsed_seconds(dir.path()).unwrap();
        assert!((0.0..60.0).contains(&elapsed));
    }

    #[test]
    fn elapsed_reads_external_state() {
        let dir = tempdir().unwrap();
        let ten_seconds_ago = now().unwrap() - 10.0;
        fs::write(
            dir.path().join(TIMER_FILE),
            format!(r#"{{"t": {ten_seconds_ago}}}"#),
        )
        .unwrap();

        let elapsed = elapsed_seconds(dir.path()).unwrap();
        assert!(elapsed >= 10.0 && elapsed < 70.0);
    }

    #[test]
    fn missing_or_bad_state_is_an_error() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            elapsed_seconds(dir.path()),
            Err(ReadstatsError::Timer(_))
        ));

        fs::write(dir.path().join(TIMER_FILE), "{}").unwrap();
        assert!(matches!(
            elapsed_seconds(dir.path()),
            Err(ReadstatsError::Timer(_))
        ));
    }
}
