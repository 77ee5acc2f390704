//! High-level counting API.
//!
//! This module provides the entry points for counting a single document,
//! either from a path (through an [`AstLoader`]) or from an already loaded
//! [`Document`].

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::ast::{AstLoader, AutoLoader, Document, PandocLoader};
use crate::config::ProjectConfig;
use crate::Result;

use super::stats::{Counts, Language, ReadingStats, DEFAULT_SECONDS_PER_SYLLABLE};
use super::syllables::{SyllableCounter, TURKISH_VOWELS};
use super::visitor::{CountReport, FocusRule, SkipRules, Visitor};

/// Options for counting a document.
#[derive(Debug, Clone)]
pub struct CountOptions {
    /// Loader used by [`count_document`]
    pub loader: AutoLoader,
    /// Characters treated as vowels
    pub vowels: String,
    /// Regions to restrict counting to
    pub focus: FocusRule,
    /// Divs pruned from the walk
    pub skip: SkipRules,
    pub seconds_per_syllable: f64,
    pub language: Language,
}

impl Default for CountOptions {
    fn default() -> Self {
        Self {
            loader: AutoLoader::default(),
            vowels: TURKISH_VOWELS.to_string(),
            focus: FocusRule::default(),
            skip: SkipRules::default(),
            seconds_per_syllable: DEFAULT_SECONDS_PER_SYLLABLE,
            language: Language::default(),
        }
    }
}

impl CountOptions {
    /// Create new default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Options as configured in the project's `_quarto.yml`.
    pub fn from_config(config: &ProjectConfig) -> Self {
        let reading = &config.reading_time;
        Self {
            loader: AutoLoader::new(PandocLoader::new().program(&reading.pandoc)),
            vowels: reading.vowels.clone(),
            focus: FocusRule::new(reading.focus_classes.iter().cloned()),
            skip: SkipRules::default(),
            seconds_per_syllable: reading.seconds_per_syllable,
            language: config.lang.clone(),
        }
    }

    /// Set the loader.
    pub fn loader(mut self, loader: AutoLoader) -> Self {
        self.loader = loader;
        self
    }

    /// Set the vowel set.
    pub fn vowels(mut self, vowels: impl Into<String>) -> Self {
        self.vowels = vowels.into();
        self
    }

    /// Set the focus rule.
    pub fn focus(mut self, focus: FocusRule) -> Self {
        self.focus = focus;
        self
    }

    /// Set the skip rules.
    pub fn skip(mut self, skip: SkipRules) -> Self {
        self.skip = skip;
        self
    }

    /// Set the reading speed.
    pub fn seconds_per_syllable(mut self, seconds: f64) -> Self {
        self.seconds_per_syllable = seconds;
        self
    }

    /// Set the language.
    pub fn language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }
}

/// Result of counting one document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentReport {
    pub path: PathBuf,
    pub counts: Counts,
    /// Counted words in document order
    #[serde(skip)]
    pub words: Vec<String>,
    pub reading: ReadingStats,
}

impl DocumentReport {
    fn new(path: PathBuf, report: CountReport, options: &CountOptions) -> Self {
        let reading = ReadingStats::for_document(
            report.counts,
            options.seconds_per_syllable,
            &options.language,
        );
        Self {
            path,
            counts: report.counts,
            words: report.words,
            reading,
        }
    }

    /// Counted words with ASCII punctuation removed.
    pub fn words_without_punctuation(&self) -> Vec<String> {
        CountReport {
            counts: self.counts,
            words: self.words.clone(),
        }
        .words_without_punctuation()
    }
}

/// Count an already loaded document.
pub fn count_loaded(
    path: impl Into<PathBuf>,
    doc: &Document,
    options: &CountOptions,
) -> DocumentReport {
    let syllables = SyllableCounter::new(&options.vowels);
    let report = Visitor::new(&syllables, &options.skip, &options.focus).visit_document(doc);
    DocumentReport::new(path.into(), report, options)
}

/// Load a document with `loader` and count it.
pub fn count_with_loader(
    path: impl AsRef<Path>,
    loader: &dyn AstLoader,
    options: &CountOptions,
) -> Result<DocumentReport> {
    let path = path.as_ref();
    let doc = loader.load(path)?;
    Ok(count_loaded(path, &doc, options))
}

/// Count a single document.
///
/// # Example
///
/// ```rust
/// use readstatslib::{count_document, CountOptions};
/// use std::fs;
/// use tempfile::tempdir;
///
/// let dir = tempdir().unwrap();
/// let path = dir.path().join("post.json");
/// fs::write(
///     &path,
///     r#"{"meta":{},"blocks":[{"t":"Para","c":[{"t":"Str","c":"Merhaba"},{"t":"Space"},{"t":"Str","c":"dünya"}]}]}"#,
/// )
/// .unwrap();
///
/// let report = count_document(&path, &CountOptions::new()).unwrap();
/// assert_eq!(report.counts.words, 2);
/// assert_eq!(report.counts.syllables, 5);
/// assert_eq!(report.reading.text, "~ 0 dk");
/// ```
pub fn count_document(path: impl AsRef<Path>, options: &CountOptions) -> Result<DocumentReport> {
    count_with_loader(path, &options.loader, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Attr, Block, Inline, JsonLoader};
    use crate::error::ReadstatsError;
    use std::fs;
    use tempfile::tempdir;

    fn words_doc(text: &str) -> Document {
        Document::new(vec![Block::Para(vec![Inline::Str(text.to_string())])])
    }

    #[test]
    fn test_count_loaded_document() {
        let doc = words_doc("bir iki üç");
        let report = count_loaded("a.qmd", &doc, &CountOptions::new());

        assert_eq!(report.counts, Counts::new(4, 3));
        assert_eq!(report.reading.seconds, 0.8);
        assert_eq!(report.reading.label_reading_time, "Okuma Süresi");
        assert_eq!(report.path, PathBuf::from("a.qmd"));
    }

    #[test]
    fn test_count_uses_language_and_speed() {
        let doc = words_doc("merhaba");
        let options = CountOptions::new()
            .language(Language::new("en"))
            .seconds_per_syllable(30.0);
        let report = count_loaded("a.qmd", &doc, &options);

        assert_eq!(report.reading.seconds, 90.0);
        assert_eq!(report.reading.text, "~ 2 min");
        assert_eq!(report.reading.label_word_count, "Word Count");
    }

    #[test]
    fn test_count_with_custom_vowels() {
        let doc = words_doc("rhythm");
        let default = count_loaded("a", &doc, &CountOptions::new());
        let english = count_loaded("a", &doc, &CountOptions::new().vowels("aeiouy"));

        assert_eq!(default.counts.words, 0);
        assert_eq!(english.counts.words, 1);
    }

    #[test]
    fn test_count_with_focus() {
        let doc = Document::new(vec![
            Block::Para(vec![Inline::Str("dışarıda".into())]),
            Block::Div {
                attr: Attr::with_classes(["reading"]),
                content: vec![Block::Para(vec![Inline::Str("içeride".into())])],
            },
        ]);
        let options = CountOptions::new().focus(FocusRule::new(["reading"]));
        let report = count_loaded("a", &doc, &options);

        assert_eq!(report.words, vec!["içeride"]);
    }

    #[test]
    fn test_count_document_from_json_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("doc.json");
        fs::write(
            &path,
            r#"{"meta":{"title":{"t":"MetaInlines","c":[{"t":"Str","c":"Başlık"}]}},"blocks":[{"t":"Para","c":[{"t":"Str","c":"Evet,"},{"t":"Space"},{"t":"Code","c":[["",[],[]],"kod"]}]}]}"#,
        )
        .unwrap();

        let report = count_document(&path, &CountOptions::new()).unwrap();
        assert_eq!(report.words, vec!["Başlık", "Evet,"]);
        assert_eq!(report.words_without_punctuation(), vec!["Başlık", "Evet"]);
    }

    #[test]
    fn test_count_with_explicit_loader() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("doc.qmd");
        fs::write(&path, r#"{"blocks":[{"t":"Plain","c":[{"t":"Str","c":"okul"}]}]}"#).unwrap();

        let report = count_with_loader(&path, &JsonLoader, &CountOptions::new()).unwrap();
        assert_eq!(report.counts, Counts::new(2, 1));
    }

    #[test]
    fn test_count_document_missing_file() {
        let result = count_document("/nonexistent/doc.json", &CountOptions::new());
        assert!(matches!(result, Err(ReadstatsError::FileRead { .. })));
    }

    #[test]
    fn test_options_from_config() {
        let mut config = ProjectConfig::default();
        config.lang = Language::new("en");
        config.reading_time.seconds_per_syllable = 0.25;
        config.reading_time.focus_classes = vec!["main".into()];
        config.reading_time.pandoc = "/opt/pandoc".into();

        let options = CountOptions::from_config(&config);
        assert_eq!(options.language, Language::new("en"));
        assert_eq!(options.seconds_per_syllable, 0.25);
        assert_eq!(options.focus, FocusRule::new(["main"]));
        assert_eq!(options.loader.pandoc.program, PathBuf::from("/opt/pandoc"));
    }
}
