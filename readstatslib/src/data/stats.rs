//! Core data structures for reading statistics.
//!
//! - [`Counts`]: raw syllable and word totals, summed while walking a tree
//! - [`ReadingStats`]: the `reading` block stored in stats records, with the
//!   derived reading time and its human label

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign};

/// Default reading speed.
pub const DEFAULT_SECONDS_PER_SYLLABLE: f64 = 0.2;

/// Syllable and word totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counts {
    pub syllables: u64,
    pub words: u64,
}

impl Counts {
    pub fn new(syllables: u64, words: u64) -> Self {
        Self { syllables, words }
    }

    pub fn is_empty(&self) -> bool {
        self.syllables == 0 && self.words == 0
    }
}

impl Add for Counts {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            syllables: self.syllables + other.syllables,
            words: self.words + other.words,
        }
    }
}

impl AddAssign for Counts {
    fn add_assign(&mut self, other: Self) {
        self.syllables += other.syllables;
        self.words += other.words;
    }
}

/// Site language, as the `lang` code from the project config.
///
/// Only Turkish gets its own labels; every other code uses English.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Language(String);

impl Default for Language {
    fn default() -> Self {
        Self("tr".to_string())
    }
}

impl Language {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn code(&self) -> &str {
        &self.0
    }

    pub fn is_turkish(&self) -> bool {
        self.0 == "tr"
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Whether labels describe a single document or a summed directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelScope {
    Document,
    Aggregate,
}

/// Format a duration as `~ 1 h 5 min` / `~ 1 sa 5 dk`.
///
/// Minutes are rounded half up before being split into hours.
pub fn format_reading_time(seconds: f64, lang: &Language) -> String {
    let minutes_rounded = (seconds / 60.0 + 0.5).floor().max(0.0) as u64;
    let hours = minutes_rounded / 60;
    let minutes = minutes_rounded % 60;

    let (h, m) = if lang.is_turkish() {
        ("sa", "dk")
    } else {
        ("h", "min")
    };

    match (hours, minutes) {
        (0, minutes) => format!("~ {minutes} {m}"),
        (hours, 0) => format!("~ {hours} {h}"),
        (hours, minutes) => format!("~ {hours} {h} {minutes} {m}"),
    }
}

/// Captions shown next to the reading time and word count.
pub fn labels(lang: &Language, scope: LabelScope) -> (&'static str, &'static str) {
    match (lang.is_turkish(), scope) {
        (true, LabelScope::Document) => ("Okuma Süresi", "Kelime Sayısı"),
        (true, LabelScope::Aggregate) => ("Toplam Okuma Süresi", "Toplam Kelime Sayısı"),
        (false, LabelScope::Document) => ("Reading Time", "Word Count"),
        (false, LabelScope::Aggregate) => ("Total Reading Time", "Total Word Count"),
    }
}

/// Round to two decimals, as stored in records.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// The `reading` block of a stats record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadingStats {
    /// Reading speed the numbers were computed with
    #[serde(alias = "secones_per_syllable")]
    pub seconds_per_syllable: f64,
    pub syllables: u64,
    pub words: u64,
    /// Reading time in seconds, rounded to two decimals
    pub seconds: f64,
    /// Human label, e.g. `~ 12 dk`
    pub text: String,
    pub label_reading_time: String,
    pub label_word_count: String,
}

impl ReadingStats {
    /// Stats for a single document: seconds derive from syllables.
    pub fn for_document(counts: Counts, seconds_per_syllable: f64, lang: &Language) -> Self {
        let seconds = counts.syllables as f64 * seconds_per_syllable;
        Self::build(counts, seconds, seconds_per_syllable, lang, LabelScope::Document)
    }

    /// Stats for a directory: seconds are the sum of the children's stored
    /// seconds.
    pub fn for_aggregate(
        counts: Counts,
        seconds: f64,
        seconds_per_syllable: f64,
        lang: &Language,
    ) -> Self {
        Self::build(counts, seconds, seconds_per_syllable, lang, LabelScope::Aggregate)
    }

    fn build(
        counts: Counts,
        seconds: f64,
        seconds_per_syllable: f64,
        lang: &Language,
        scope: LabelScope,
    ) -> Self {
        let (label_reading_time, label_word_count) = labels(lang, scope);
        Self {
            seconds_per_syllable,
            syllables: counts.syllables,
            words: counts.words,
            seconds: round2(seconds),
            text: format_reading_time(seconds, lang),
            label_reading_time: label_reading_time.to_string(),
            label_word_count: label_word_count.to_string(),
        }
    }

    pub fn counts(&self) -> Counts {
        Counts::new(self.syllables, self.words)
    }
}
