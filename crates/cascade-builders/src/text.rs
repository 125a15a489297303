//! Text preparation for XML metadata elements.
//!
//! Titles and captions coming out of the store may contain markup,
//! newlines and arbitrary length. Google's extensions want short plain
//! text, so every metadata element goes through [`prepare`]: tags
//! stripped, whitespace collapsed, truncated at a word boundary.

use std::sync::OnceLock;

use regex::Regex;

fn tag_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"<[^>]*>").unwrap())
}

fn whitespace_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[\s]+").unwrap())
}

/// Strip markup, collapse whitespace runs and truncate to at most
/// `max_chars` characters, cutting at the last word boundary.
#[must_use]
pub fn prepare(raw: &str, max_chars: usize) -> String {
    let stripped = tag_pattern().replace_all(raw, " ");
    let collapsed = whitespace_pattern().replace_all(stripped.trim(), " ");
    truncate_words(&collapsed, max_chars)
}

fn truncate_words(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_owned();
    }

    let cut: String = text.chars().take(max_chars).collect();
    match cut.rfind(' ') {
        Some(boundary) if boundary > 0 => cut[..boundary].to_owned(),
        _ => cut,
    }
}
