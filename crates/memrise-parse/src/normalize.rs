use regex::Regex;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\s\u{00A0}\u{FEFF}]+").expect("valid regex"));

/// Normalize scraped cell text to NFC and collapse whitespace runs.
///
/// Table cells come back with indentation, non-breaking spaces and
/// decomposed accents (common for Korean jamo and Vietnamese tones), all of
/// which would otherwise reach the speech API verbatim.
pub fn normalize_text(input: &str) -> String {
    let nfc: String = input.nfc().collect();
    WHITESPACE.replace_all(&nfc, " ").trim().to_string()
}
