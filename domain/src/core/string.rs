//! Text helpers for outbound notifications.

/// Maximum length of a single outbound SMS body in bytes.
pub const SMS_MAX_LEN: usize = 1600;

/// Maximum length of a chat embed description in bytes.
pub const EMBED_DESCRIPTION_MAX_LEN: usize = 4096;

/// Truncate a string to a maximum byte length with ellipsis (UTF-8 safe)
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        return s.to_string();
    }
    let mut end = max_len.saturating_sub(3).min(s.len());
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &s[..end])
}

/// Collapse all whitespace runs (including newlines) into single spaces.
///
/// Used for SMS bodies and log fields where line breaks are noise.
pub fn single_line(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
