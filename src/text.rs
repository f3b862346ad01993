/// Truncate to at most `max_chars` Unicode scalar values.
/// Counts characters, not bytes, so multibyte text is never split mid-codepoint.
pub(crate) fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((end, _)) => &s[..end],
        None => s,
    }
}

/// Collapse runs of whitespace (including newlines) into single spaces.
pub(crate) fn squash_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
