// Terminal rendering for verdicts and log listings.

pub mod terminal;

/// Shorten `text` to `max_chars` characters, marking the cut with "...".
///
/// Counts chars, not bytes, so provider replies and usernames with
/// multi-byte characters are never split mid-codepoint.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
