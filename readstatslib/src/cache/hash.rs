//! Content hashes that decide whether stats are stale.

use sha2::{Digest, Sha256};

use crate::data::stats::Language;

/// Hash of a document's bytes together with the settings its stats depend on.
///
/// The reading speed is hashed in its shortest round-trip form (`0.2`,
/// `1.0`, `1e-05`), so records written by earlier tooling stay valid.
pub fn document_hash(bytes: &[u8], language: &Language, seconds_per_syllable: f64) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hasher.update(language.code().as_bytes());
    hasher.update(float_repr(seconds_per_syllable).as_bytes());
    hex::encode(hasher.finalize())
}

/// Shortest round-trip text of a float with a signed, two-digit exponent:
/// `0.2`, `1e-05`, `1.5e+16`.
pub fn float_repr(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    let text = format!("{value:?}");
    let Some((mantissa, exponent)) = text.split_once('e') else {
        return text;
    };
    let (sign, digits) = match exponent.strip_prefix('-') {
        Some(digits) => ('-', digits),
        None => ('+', exponent),
    };
    format!("{mantissa}e{sign}{digits:0>2}")
}

/// One child's contribution to an aggregate hash.
pub fn aggregate_entry(relative: &str, hash: &str) -> String {
    format!("{relative}:{hash}")
}

/// Hash over `"<relpath>:<hash>"` entries, independent of their order.
pub fn aggregate_hash<S: AsRef<str>>(entries: &[S]) -> String {
    let mut sorted: Vec<&str> = entries.iter().map(AsRef::as_ref).collect();
    sorted.sort_unstable();

    let mut hasher = Sha256::new();
    for entry in sorted {
        hasher.update(entry.as_bytes());
    }
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    const EMPTY_SHA256: &str = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

    fn tr() -> Language {
        Language::new("tr")
    }

    #[test]
    fn float_repr_forms() {
        assert_eq!(float_repr(0.2), "0.2");
        assert_eq!(float_repr(1.0), "1.0");
        assert_eq!(float_repr(0.0001), "0.0001");
        assert_eq!(float_repr(0.00001), "1e-05");
        assert_eq!(float_repr(2.5e-7), "2.5e-07");
        assert_eq!(float_repr(1.5e16), "1.5e+16");
        assert_eq!(float_repr(1e100), "1e+100");
    }

    #[test]
    fn small_speed_hashes_exponent_form() {
        let mut hasher = Sha256::new();
        hasher.update(b"abc");
        hasher.update(b"tr");
        hasher.update(b"1e-05");
        let expected = hex::encode(hasher.finalize());

        assert_eq!(document_hash(b"abc", &tr(), 0.00001), expected);
    }

    #[test]
    fn hash_is_hex_sha256() {
        let hash = document_hash(b"# Merhaba", &tr(), 0.2);
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn hash_covers_bytes_then_language_then_speed() {
        let mut hasher = Sha256::new();
        hasher.update(b"abc");
        hasher.update(b"tr");
        hasher.update(b"0.2");
        let expected = hex::encode(hasher.finalize());

        assert_eq!(document_hash(b"abc", &tr(), 0.2), expected);
    }

    #[test]
    fn whole_number_speed_keeps_decimal() {
        let mut hasher = Sha256::new();
        hasher.update(b"abc");
        hasher.update(b"en");
        hasher.update(b"1.0");
        let expected = hex::encode(hasher.finalize());

        assert_eq!(document_hash(b"abc", &Language::new("en"), 1.0), expected);
    }

    #[test]
    fn settings_change_the_hash() {
        let base = document_hash(b"metin", &tr(), 0.2);

        assert_eq!(base, document_hash(b"metin", &tr(), 0.2));
        assert_ne!(base, document_hash(b"metin!", &tr(), 0.2));
        assert_ne!(base, document_hash(b"metin", &Language::new("en"), 0.2));
        assert_ne!(base, document_hash(b"metin", &tr(), 0.25));
    }

    #[test]
    fn aggregate_hash_ignores_order() {
        let a = aggregate_entry("posts/a.qmd", "111");
        let b = aggregate_entry("posts/b.qmd", "222");

        assert_eq!(a, "posts/a.qmd:111");
        assert_eq!(
            aggregate_hash(&[a.clone(), b.clone()]),
            aggregate_hash(&[b, a])
        );
    }

    #[test]
    fn aggregate_hash_of_nothing() {
        let none: [&str; 0] = [];
        assert_eq!(aggregate_hash(&none), EMPTY_SHA256);
    }
}
