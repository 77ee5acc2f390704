//! Vowel-run syllable heuristic.
//!
//! A syllable is approximated as a maximal run of vowels. The default vowel
//! set is tuned for Turkish and works acceptably for English text too.

use std::borrow::Cow;
use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

/// Default vowels (Turkish, including circumflexed forms).
pub const TURKISH_VOWELS: &str = "aeıioöuüâîûAEIİOÖUÜ";

/// Runs of decimal digits (Unicode `Nd`, not `²` or `½`).
static DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("valid regex"));

static ALL_DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+$").expect("valid regex"));

/// Brackets and braces removed from every token, e.g. `{yazdığım yazıda}[1]`.
const BRACKETS: [char; 4] = ['{', '}', '[', ']'];

/// Result of counting one raw token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenCount {
    /// Cleaned token as it was counted
    pub word: String,
    /// Estimated syllables
    pub syllables: u64,
}

/// Counts syllables against a configurable vowel set.
#[derive(Debug, Clone)]
pub struct SyllableCounter {
    vowels: HashSet<char>,
}

impl Default for SyllableCounter {
    fn default() -> Self {
        Self::new(TURKISH_VOWELS)
    }
}

impl SyllableCounter {
    /// Create a counter treating every char of `vowels` as a vowel.
    pub fn new(vowels: &str) -> Self {
        Self {
            vowels: vowels.chars().collect(),
        }
    }

    pub fn is_vowel(&self, ch: char) -> bool {
        self.vowels.contains(&ch)
    }

    /// Whether the token has a vowel once digits are removed.
    pub fn has_vowel(&self, tok: &str) -> bool {
        without_digits(tok).chars().any(|ch| self.is_vowel(ch))
    }

    /// Approximate syllables of a single token.
    ///
    /// Pure numbers count as one syllable, and so do tokens with letters but
    /// no vowel (abbreviations).
    pub fn syllables_for_word(&self, tok: &str) -> u64 {
        if is_all_digits(tok) {
            return 1;
        }

        let mut syllables = 0;
        let mut prev_vowel = false;
        let mut saw_letter = false;

        for ch in without_digits(tok).chars() {
            if ch.is_alphabetic() {
                saw_letter = true;
            }
            let vowel = self.is_vowel(ch);
            if vowel && !prev_vowel {
                syllables += 1;
            }
            prev_vowel = vowel;
        }

        if saw_letter && syllables == 0 {
            1
        } else {
            syllables
        }
    }

    /// Count one whitespace-free token from the document text.
    ///
    /// Returns `None` when the token is not a word: empty after bracket
    /// stripping, or without any vowel (numbers, symbols, bare consonants).
    pub fn count_token(&self, tok: &str) -> Option<TokenCount> {
        let cleaned = strip_brackets(tok);
        let cleaned = cleaned.trim();

        if cleaned.is_empty() || !self.has_vowel(cleaned) {
            return None;
        }

        Some(TokenCount {
            word: cleaned.to_string(),
            syllables: self.syllables_for_word(cleaned),
        })
    }
}

/// Remove `{`, `}`, `[` and `]` anywhere in the token.
pub fn strip_brackets(tok: &str) -> String {
    tok.chars().filter(|c| !BRACKETS.contains(c)).collect()
}

/// Whether the trimmed token is non-empty and made only of decimal digits.
pub fn is_all_digits(tok: &str) -> bool {
    ALL_DIGITS.is_match(tok.trim())
}

fn without_digits(tok: &str) -> Cow<'_, str> {
    DIGITS.replace_all(tok, "")
}
