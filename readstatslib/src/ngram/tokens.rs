//! Token cleanup ahead of n-gram counting.

use std::collections::{BTreeSet, HashMap, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;

use super::casing::{apostrophe_base, is_all_caps, turkish_lower, turkish_lower_plain};

static NUMERIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[\d/.:,-]+$").expect("valid regex"));
static LETTER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[a-zA-ZğüşöçıİĞÜŞÖÇ]").expect("valid regex"));

/// Trim, optionally lowercase, and drop tokens that are not words.
///
/// Dropped: empty tokens, numbers and dates (`2024`, `12.05.2024`, `1/2`),
/// and anything without a Latin or Turkish letter (`:`, `...`).
pub fn preprocess_tokens<S: AsRef<str>>(tokens: &[S], lowercase: bool) -> Vec<String> {
    tokens
        .iter()
        .filter_map(|tok| {
            let tok = tok.as_ref().trim();
            if tok.is_empty() {
                return None;
            }
            let tok = if lowercase {
                turkish_lower(tok)
            } else {
                tok.to_string()
            };
            if NUMERIC.is_match(&tok) || !LETTER.is_match(&tok) {
                return None;
            }
            Some(tok)
        })
        .collect()
}

/// Acronyms in the token stream.
///
/// Apostrophe suffixes are removed first (`CMK’nun -> CMK`). A base counts
/// when it is all caps and its lowercase form never appears as a base.
pub fn all_caps_bases<S: AsRef<str>>(tokens: &[S]) -> BTreeSet<String> {
    let bases: Vec<&str> = tokens
        .iter()
        .map(|t| apostrophe_base(t.as_ref().trim()).trim())
        .filter(|b| !b.is_empty())
        .collect();
    let present: HashSet<&str> = bases.iter().copied().collect();

    bases
        .iter()
        .filter(|b| is_all_caps(b))
        .filter(|b| !present.contains(turkish_lower_plain(b).as_str()))
        .map(|b| b.to_string())
        .collect()
}

/// Preferred spellings for proper names, looked up case-insensitively.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProperNames {
    by_lower: HashMap<String, String>,
}

impl ProperNames {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let by_lower = names
            .into_iter()
            .map(Into::into)
            .map(|name: String| (turkish_lower_plain(&name), name))
            .collect();
        Self { by_lower }
    }

    pub fn is_empty(&self) -> bool {
        self.by_lower.is_empty()
    }

    /// The configured spelling of `token`, if it is a known name.
    pub fn lookup(&self, token: &str) -> Option<&str> {
        self.by_lower
            .get(&turkish_lower_plain(token))
            .map(String::as_str)
    }

    pub fn apply(&self, token: &str) -> String {
        self.lookup(token).unwrap_or(token).to_string()
    }

    /// Apply to every space-separated token of a phrase.
    pub fn apply_phrase(&self, phrase: &str) -> String {
        phrase
            .split_whitespace()
            .map(|tok| self.apply(tok))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Drop apostrophe suffixes: `TCK’nin -> TCK`.
pub fn strip_apostrophes<S: AsRef<str>>(tokens: &[S]) -> Vec<String> {
    tokens
        .iter()
        .map(|t| apostrophe_base(t.as_ref()).to_string())
        .collect()
}

/// Consecutive runs of `n` tokens. Empty for `n == 0` or fewer than `n`
/// tokens.
pub fn ngrams<S: AsRef<str>>(tokens: &[S], n: usize) -> Vec<Vec<&str>> {
    if n == 0 {
        return Vec::new();
    }
    tokens
        .windows(n)
        .map(|w| w.iter().map(AsRef::as_ref).collect())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preprocess_lowercases_and_drops_non_words() {
        let tokens = [
            " Merhaba ", "", "2024", "12.05.2024", "1/2", "-", ":", "...", "TCK’nin", "3üncü",
        ];
        assert_eq!(
            preprocess_tokens(&tokens, true),
            vec!["merhaba", "TCK’nin", "3üncü"]
        );
    }

    #[test]
    fn preprocess_without_lowercase() {
        assert_eq!(preprocess_tokens(&["Işık", "42"], false), vec!["Işık"]);
    }

    #[test]
    fn preprocess_keeps_turkish_only_letters() {
        assert_eq!(preprocess_tokens(&["ğ", "ış"], true), vec!["ğ", "ış"]);
    }

    #[test]
    fn acronyms_without_lowercase_twin() {
        let tokens = ["TCK’nin", "CMK", "cmk", "dava", "TCK"];
        let caps = all_caps_bases(&tokens);

        assert_eq!(caps.into_iter().collect::<Vec<_>>(), vec!["TCK"]);
    }

    #[test]
    fn proper_names_are_case_insensitive() {
        let names = ProperNames::new(["Narin", "Diyarbakır", "İzmir"]);

        assert_eq!(names.apply("narin"), "Narin");
        assert_eq!(names.apply("DİYARBAKIR"), "Diyarbakır");
        assert_eq!(names.apply("izmir"), "İzmir");
        assert_eq!(names.apply("dava"), "dava");
        assert_eq!(names.apply_phrase("narin güran"), "Narin güran");
    }

    #[test]
    fn apostrophes_are_stripped() {
        assert_eq!(
            strip_apostrophes(&["TCK’nin", "Ankara'ya", "dava"]),
            vec!["TCK", "Ankara", "dava"]
        );
    }

    #[test]
    fn ngram_windows() {
        let tokens = ["a", "b", "c"];

        assert_eq!(ngrams(&tokens, 2), vec![vec!["a", "b"], vec!["b", "c"]]);
        assert_eq!(ngrams(&tokens, 3), vec![vec!["a", "b", "c"]]);
        assert!(ngrams(&tokens, 4).is_empty());
        assert!(ngrams(&tokens, 0).is_empty());
    }
}
