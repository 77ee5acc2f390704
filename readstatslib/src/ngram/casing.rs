//! Turkish-aware case mapping.
//!
//! Unicode default casing maps `i` to `I` and `I` to `i`. Turkish pairs
//! dotted `i` with `İ` and dotless `ı` with `I`, so those four are mapped by
//! hand before the default conversion runs.

/// Uppercase with `ı -> I` and `i -> İ`.
pub fn turkish_upper(text: &str) -> String {
    text.replace('ı', "I").replace('i', "İ").to_uppercase()
}

/// Lowercase with `I -> ı` and `İ -> i`.
pub fn turkish_lower_plain(text: &str) -> String {
    text.replace('I', "ı").replace('İ', "i").to_lowercase()
}

/// Lowercase a token unless it is an acronym.
///
/// A token whose part before the first apostrophe is already all caps
/// (`TCK`, `TCK’nin`) is returned unchanged.
pub fn turkish_lower(text: &str) -> String {
    if is_all_caps(apostrophe_base(text)) {
        return text.to_string();
    }
    turkish_lower_plain(text)
}

/// Whether uppercasing leaves the text unchanged.
pub fn is_all_caps(text: &str) -> bool {
    turkish_upper(text) == text
}

/// The part of a token before its first `’` or `'`: `TCK’nin -> TCK`.
pub fn apostrophe_base(token: &str) -> &str {
    let base = token.split('’').next().unwrap_or(token);
    base.split('\'').next().unwrap_or(base)
}
