//! Summary text cleanup.

use regex::Regex;
use std::sync::LazyLock;

/// Marker appended to text cut short by [`normalize`].
pub const ELLIPSIS: &str = "...";

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").unwrap());
static LINE_BREAK_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\n\r\t]+").unwrap());
static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Strip markup, collapse whitespace and cap the result at `max_len` characters.
///
/// Tags are removed with a simple pattern match, not an HTML parser, so
/// malformed fragments may survive partially. Text longer than `max_len` is
/// cut to `max_len - 3` characters followed by [`ELLIPSIS`], so the output
/// never exceeds `max_len` characters.
pub fn normalize(raw: &str, max_len: usize) -> String {
    if raw.is_empty() {
        return String::new();
    }

    let text = TAG_RE.replace_all(raw, "");
    let text = LINE_BREAK_RE.replace_all(&text, " ");
    let text = WHITESPACE_RE.replace_all(&text, " ");
    let text = text.trim();

    let ellipsis_len = ELLIPSIS.chars().count();
    if text.chars().count() <= max_len {
        return text.to_string();
    }

    if max_len < ellipsis_len {
        // No room for the marker.
        let cut: String = text.chars().take(max_len).collect();
        return cut.trim_end().to_string();
    }

    let mut cut: String = text.chars().take(max_len - ellipsis_len).collect();
    cut.push_str(ELLIPSIS);
    cut
}

/// Like [`normalize`] but for fields that may be absent.
pub fn normalize_opt(raw: Option<&str>, max_len: usize) -> String {
    raw.map(|text| normalize(text, max_len)).unwrap_or_default()
}
