//! Width-aware text helpers for single-line terminal output.

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

pub const ELLIPSIS: &str = "…";

/// Display columns of `text`. Control characters count as zero.
pub fn visible_width(text: &str) -> usize {
    text.graphemes(true).map(grapheme_width).sum()
}

fn grapheme_width(grapheme: &str) -> usize {
    if grapheme.chars().all(char::is_control) {
        return 0;
    }
    UnicodeWidthStr::width(grapheme)
}

/// Collapses line breaks and tabs to single spaces.
pub fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Cuts `text` to at most `max_width` columns, ending in `…` when cut.
///
/// Graphemes are never split; a wide grapheme that would straddle the limit
/// is dropped.
pub fn truncate_to_width(text: &str, max_width: usize) -> String {
    if max_width == 0 {
        return String::new();
    }
    if visible_width(text) <= max_width {
        return text.to_string();
    }

    let budget = max_width.saturating_sub(visible_width(ELLIPSIS));
    let mut truncated = String::with_capacity(text.len().min(max_width * 4));
    let mut used = 0;
    for grapheme in text.graphemes(true) {
        let width = grapheme_width(grapheme);
        if used + width > budget {
            break;
        }
        truncated.push_str(grapheme);
        used += width;
    }
    truncated.push_str(ELLIPSIS);
    truncated
}
