//! Project configuration read from `_quarto.yml`.
//!
//! Only the keys these tools care about are modelled; everything else in the
//! file is ignored. A project without `_quarto.yml` gets the defaults.

use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer};
use tracing::debug;

use crate::data::stats::{Language, DEFAULT_SECONDS_PER_SYLLABLE};
use crate::data::syllables::TURKISH_VOWELS;
use crate::error::ReadstatsError;
use crate::Result;

/// Name of the project config file.
pub const CONFIG_FILE: &str = "_quarto.yml";

/// Environment variable set by `quarto render` for pre/post scripts.
pub const PROJECT_DIR_ENV: &str = "QUARTO_PROJECT_DIR";

/// Pick the project root: an explicit path, then `QUARTO_PROJECT_DIR`, then
/// the current directory.
pub fn project_root(explicit: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    match env::var_os(PROJECT_DIR_ENV) {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => PathBuf::from("."),
    }
}

/// A key with no value (`reading-time:`) reads as YAML null.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// The parts of `_quarto.yml` used here.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ProjectConfig {
    /// Site language code
    #[serde(deserialize_with = "null_as_default")]
    pub lang: Language,
    #[serde(deserialize_with = "null_as_default")]
    pub reading_time: ReadingTimeConfig,
    #[serde(deserialize_with = "null_as_default")]
    pub wordcloud: WordcloudConfig,
    #[serde(deserialize_with = "null_as_default")]
    pub render_time: RenderTimeConfig,
}

/// `reading-time:` section.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ReadingTimeConfig {
    pub seconds_per_syllable: f64,
    /// Globs relative to the project root
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    /// Directory prefixes that get an aggregate record
    pub aggregate: Vec<String>,
    pub focus_classes: Vec<String>,
    pub vowels: String,
    /// pandoc executable
    pub pandoc: String,
    /// Write `<stem>_words.tmp` next to rebuilt documents
    pub word_log: bool,
}

impl Default for ReadingTimeConfig {
    fn default() -> Self {
        Self {
            seconds_per_syllable: DEFAULT_SECONDS_PER_SYLLABLE,
            include: vec!["**/*.qmd".to_string()],
            exclude: Vec::new(),
            aggregate: Vec::new(),
            focus_classes: Vec::new(),
            vowels: TURKISH_VOWELS.to_string(),
            pandoc: "pandoc".to_string(),
            word_log: false,
        }
    }
}

/// `wordcloud:` section.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct WordcloudConfig {
    pub max_ngram: usize,
    pub top_k: usize,
    /// Minimum count per n-gram size
    pub min_count: BTreeMap<usize, u64>,
    /// Added to the built-in Turkish stopwords
    pub stopwords: Vec<String>,
    pub proper_names: Vec<String>,
    /// Minify `<stem>_words.json`
    pub compressed: bool,
}

impl Default for WordcloudConfig {
    fn default() -> Self {
        Self {
            max_ngram: 1,
            top_k: 200,
            min_count: BTreeMap::new(),
            stopwords: Vec::new(),
            proper_names: Vec::new(),
            compressed: true,
        }
    }
}

/// `render-time:` section.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RenderTimeConfig {
    pub languages: Vec<String>,
}

impl Default for RenderTimeConfig {
    fn default() -> Self {
        Self {
            languages: vec!["tr".to_string(), "en".to_string()],
        }
    }
}

impl ProjectConfig {
    /// Load `<root>/_quarto.yml`, or defaults when it does not exist.
    pub fn load(root: impl AsRef<Path>) -> Result<Self> {
        let path = root.as_ref().join(CONFIG_FILE);
        if !path.is_file() {
            debug!(path = %path.display(), "no project config, using defaults");
            return Ok(Self::default());
        }

        let text = fs::read_to_string(&path).map_err(|source| ReadstatsError::FileRead {
            path: path.clone(),
            source,
        })?;
        Self::from_yaml(&text).map_err(|source| ReadstatsError::Yaml { path, source })
    }

    /// Parse config from YAML text. An empty document yields defaults.
    pub fn from_yaml(text: &str) -> std::result::Result<Self, serde_yaml::Error> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = ProjectConfig::default();

        assert_eq!(config.lang, Language::new("tr"));
        assert_eq!(config.reading_time.seconds_per_syllable, 0.2);
        assert_eq!(config.reading_time.include, vec!["**/*.qmd"]);
        assert_eq!(config.reading_time.pandoc, "pandoc");
        assert_eq!(config.wordcloud.max_ngram, 1);
        assert_eq!(config.wordcloud.top_k, 200);
        assert!(config.wordcloud.compressed);
        assert_eq!(config.render_time.languages, vec!["tr", "en"]);
    }

    #[test]
    fn test_parse_quarto_file_with_unrelated_keys() {
        let yaml = r#"
project:
  type: website
  pre-render: readstats
lang: en
website:
  title: "Blog"
reading-time:
  seconds-per-syllable: 0.25
  exclude: ["drafts/**"]
  aggregate: ["posts", "notes/*"]
  focus-classes: [article-body]
  word-log: true
wordcloud:
  max-ngram: 3
  min-count:
    2: 2
    3: 3
  stopwords: [şey]
  proper-names: [Narin]
  compressed: false
render-time:
  languages: [en]
"#;
        let config = ProjectConfig::from_yaml(yaml).unwrap();

        assert_eq!(config.lang, Language::new("en"));
        assert_eq!(config.reading_time.seconds_per_syllable, 0.25);
        assert_eq!(config.reading_time.include, vec!["**/*.qmd"]);
        assert_eq!(config.reading_time.exclude, vec!["drafts/**"]);
        assert_eq!(config.reading_time.aggregate, vec!["posts", "notes/*"]);
        assert_eq!(config.reading_time.focus_classes, vec!["article-body"]);
        assert!(config.reading_time.word_log);
        assert_eq!(config.wordcloud.max_ngram, 3);
        assert_eq!(config.wordcloud.top_k, 200);
        assert_eq!(config.wordcloud.min_count.get(&2), Some(&2));
        assert_eq!(config.wordcloud.min_count.get(&3), Some(&3));
        assert_eq!(config.wordcloud.proper_names, vec!["Narin"]);
        assert!(!config.wordcloud.compressed);
        assert_eq!(config.render_time.languages, vec!["en"]);
    }

    #[test]
    fn test_empty_yaml_is_default() {
        assert_eq!(ProjectConfig::from_yaml("").unwrap(), ProjectConfig::default());
    }

    #[test]
    fn test_empty_sections_are_default() {
        let yaml = "lang:\nreading-time:\nwordcloud:\nrender-time: ~\n";
        assert_eq!(ProjectConfig::from_yaml(yaml).unwrap(), ProjectConfig::default());

        let config = ProjectConfig::from_yaml("reading-time:\nwordcloud:\n  top-k: 50\n").unwrap();
        assert_eq!(config.reading_time, ReadingTimeConfig::default());
        assert_eq!(config.wordcloud.top_k, 50);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempdir().unwrap();
        let config = ProjectConfig::load(dir.path()).unwrap();
        assert_eq!(config, ProjectConfig::default());
    }

    #[test]
    fn test_load_invalid_yaml() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "reading-time: [1, 2\n").unwrap();

        let result = ProjectConfig::load(dir.path());
        assert!(matches!(result, Err(ReadstatsError::Yaml { .. })));
    }

    #[test]
    fn test_explicit_root_wins() {
        assert_eq!(
            project_root(Some(Path::new("/srv/site"))),
            PathBuf::from("/srv/site")
        );
    }
}
