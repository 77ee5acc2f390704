//! N-gram frequency tables.
//!
//! The pipeline over a document's counted words:
//!
//! 1. Clean and lowercase tokens, keeping acronyms as written
//! 2. Replace known proper names with their configured spelling
//! 3. Lemmatize
//! 4. For each `n`, count the n-grams that pass the filter (unigrams and
//!    bigrams lose apostrophe suffixes first)
//! 5. Drop rare n-grams, order by count, keep the top `k`

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use serde::Serialize;

use crate::config::WordcloudConfig;
use crate::error::ReadstatsError;
use crate::Result;

use super::tokens::{all_caps_bases, ngrams, preprocess_tokens, strip_apostrophes, ProperNames};

/// Built-in Turkish stopwords.
pub const TURKISH_STOPWORDS: &[&str] = &[
    "ve", "veya", "ile", "da", "dan", "de", "den", "mi", "bir", "bu", "şu", "o", "i", "ise",
    "göre", "a", "e", "nin", "ama", "fakat", "in", "ın", "nın", "adet", "ne", "nun", "için",
    "gibi", "daha", "çok", "yani", "biz", "ki", "ı", "mu", "çünkü", "ancak", "her", "hiç", "bazı",
    "opr", "ya",
];

/// Maps a token to its dictionary form.
pub trait Lemmatizer {
    fn lemma(&self, token: &str) -> String;
}

/// Leaves tokens unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityLemmatizer;

impl Lemmatizer for IdentityLemmatizer {
    fn lemma(&self, token: &str) -> String {
        token.to_string()
    }
}

/// Decides whether an n-gram is counted.
pub trait NgramFilter {
    fn keep(&self, ngram: &[&str]) -> bool;
}

/// Hybrid stopword rule: a unigram is dropped when it is a stopword; a
/// longer n-gram only when every token is one, so `suçun işlendiği` and
/// `dava ve karar` both survive.
#[derive(Debug, Clone, Copy)]
pub struct StopwordFilter<'a> {
    stopwords: &'a HashSet<String>,
}

impl<'a> StopwordFilter<'a> {
    pub fn new(stopwords: &'a HashSet<String>) -> Self {
        Self { stopwords }
    }
}

impl NgramFilter for StopwordFilter<'_> {
    fn keep(&self, ngram: &[&str]) -> bool {
        match ngram {
            [] => false,
            [single] => !self.stopwords.contains(*single),
            many => !many.iter().all(|tok| self.stopwords.contains(*tok)),
        }
    }
}

/// The built-in stopwords plus `extra`.
pub fn stopwords_with<I, S>(extra: I) -> HashSet<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    TURKISH_STOPWORDS
        .iter()
        .map(|s| s.to_string())
        .chain(extra.into_iter().map(Into::into))
        .collect()
}

/// One row of a frequency table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TermCount {
    pub text: String,
    pub value: u64,
}

impl TermCount {
    pub fn new(text: impl Into<String>, value: u64) -> Self {
        Self {
            text: text.into(),
            value,
        }
    }
}

/// Options for [`compute_ngram_frequencies`].
#[derive(Debug, Clone)]
pub struct NgramOptions {
    /// Largest n-gram size; `0` computes nothing
    pub max_ngram: usize,
    pub top_k: usize,
    /// Minimum count per size; sizes not listed need 1
    pub min_count_per_n: BTreeMap<usize, u64>,
    pub stopwords: HashSet<String>,
    pub proper_names: ProperNames,
    pub lowercase: bool,
}

impl Default for NgramOptions {
    fn default() -> Self {
        Self {
            max_ngram: 1,
            top_k: 200,
            min_count_per_n: BTreeMap::new(),
            stopwords: stopwords_with(Vec::<String>::new()),
            proper_names: ProperNames::default(),
            lowercase: true,
        }
    }
}

impl NgramOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Options from the `wordcloud:` config section.
    pub fn from_config(config: &WordcloudConfig) -> Self {
        Self {
            max_ngram: config.max_ngram,
            top_k: config.top_k,
            min_count_per_n: config.min_count.clone(),
            stopwords: stopwords_with(&config.stopwords),
            proper_names: ProperNames::new(&config.proper_names),
            lowercase: true,
        }
    }

    pub fn max_ngram(mut self, n: usize) -> Self {
        self.max_ngram = n;
        self
    }

    pub fn top_k(mut self, k: usize) -> Self {
        self.top_k = k;
        self
    }

    pub fn min_count(mut self, n: usize, count: u64) -> Self {
        self.min_count_per_n.insert(n, count);
        self
    }

    pub fn stopwords(mut self, stopwords: HashSet<String>) -> Self {
        self.stopwords = stopwords;
        self
    }

    pub fn proper_names(mut self, names: ProperNames) -> Self {
        self.proper_names = names;
        self
    }

    fn threshold(&self, n: usize) -> u64 {
        self.min_count_per_n.get(&n).copied().unwrap_or(1)
    }
}

/// Parse an `n=count` minimum-count setting.
pub fn parse_min_count(setting: &str) -> Result<(usize, u64)> {
    let invalid = || ReadstatsError::InvalidNgram(format!("expected n=count, got '{setting}'"));
    let (n, count) = setting.split_once('=').ok_or_else(invalid)?;
    let n: usize = n.trim().parse().map_err(|_| invalid())?;
    let count: u64 = count.trim().parse().map_err(|_| invalid())?;
    if n == 0 {
        return Err(ReadstatsError::InvalidNgram(
            "n-gram size must be at least 1".into(),
        ));
    }
    Ok((n, count))
}

/// Frequency tables for every non-empty n-gram size.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NgramFrequencies {
    pub by_n: BTreeMap<usize, Vec<TermCount>>,
    /// Acronyms seen in the input, as written
    pub all_caps: BTreeSet<String>,
}

impl NgramFrequencies {
    pub fn unigrams(&self) -> &[TermCount] {
        self.table(1)
    }

    pub fn table(&self, n: usize) -> &[TermCount] {
        self.by_n.get(&n).map(Vec::as_slice).unwrap_or_default()
    }
}

/// Counts keyed by term, remembering first-occurrence order.
#[derive(Default)]
struct OrderedCounter {
    index: HashMap<String, usize>,
    rows: Vec<TermCount>,
}

impl OrderedCounter {
    fn add(&mut self, term: String, count: u64) {
        match self.index.get(&term) {
            Some(&i) => self.rows[i].value += count,
            None => {
                self.index.insert(term.clone(), self.rows.len());
                self.rows.push(TermCount::new(term, count));
            }
        }
    }

    fn into_rows(self) -> Vec<TermCount> {
        self.rows
    }
}

/// Compute n-gram tables with the stopword filter and no lemmatization.
///
/// # Example
///
/// ```rust
/// use readstatslib::ngram::{compute_ngram_frequencies, NgramOptions, TermCount};
///
/// let words = ["Dava", "ve", "dava", "TCK’nin", "maddesi"];
/// let freqs = compute_ngram_frequencies(&words, &NgramOptions::new().max_ngram(2));
///
/// assert_eq!(freqs.unigrams()[0], TermCount::new("dava", 2));
/// assert!(freqs.table(2).iter().any(|t| t.text == "TCK maddesi"));
/// ```
pub fn compute_ngram_frequencies<S: AsRef<str>>(
    tokens: &[S],
    options: &NgramOptions,
) -> NgramFrequencies {
    let filter = StopwordFilter::new(&options.stopwords);
    compute_ngram_frequencies_with(tokens, options, &filter, &IdentityLemmatizer)
}

/// Compute n-gram tables with a custom filter and lemmatizer.
pub fn compute_ngram_frequencies_with<S: AsRef<str>>(
    tokens: &[S],
    options: &NgramOptions,
    filter: &dyn NgramFilter,
    lemmatizer: &dyn Lemmatizer,
) -> NgramFrequencies {
    let cleaned = preprocess_tokens(tokens, options.lowercase);
    let all_caps = all_caps_bases(&cleaned);

    let lemmas: Vec<String> = cleaned
        .iter()
        .map(|tok| options.proper_names.apply(tok))
        .map(|tok| lemmatizer.lemma(&tok))
        .collect();
    let stripped = strip_apostrophes(&lemmas);

    let mut by_n = BTreeMap::new();
    for n in 1..=options.max_ngram {
        let source = if n > 2 { &lemmas } else { &stripped };

        let mut counter = OrderedCounter::default();
        for gram in ngrams(source, n) {
            if filter.keep(&gram) {
                counter.add(gram.join(" "), 1);
            }
        }

        let threshold = options.threshold(n);
        let mut renamed = OrderedCounter::default();
        for row in counter.into_rows() {
            if row.value >= threshold {
                renamed.add(options.proper_names.apply_phrase(&row.text), row.value);
            }
        }

        let mut rows = renamed.into_rows();
        if rows.is_empty() {
            continue;
        }
        rows.sort_by(|a, b| b.value.cmp(&a.value));
        rows.truncate(options.top_k);
        by_n.insert(n, rows);
    }

    NgramFrequencies { by_n, all_caps }
}
