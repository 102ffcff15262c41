//! Small string helpers shared by the document model and the mention input.
//!
//! Editor offsets count Unicode scalar values (`char`s), while Rust strings
//! are indexed by bytes, so every slice of editor text goes through here.

use unicode_segmentation::UnicodeSegmentation;

/// Returns the byte index of the `char_idx`-th character of `text`.
///
/// An index at or past the end of the text maps to `text.len()`.
pub fn char_index_to_byte_index(text: &str, char_idx: usize) -> usize {
    text.char_indices()
        .nth(char_idx)
        .map_or(text.len(), |(byte_idx, _)| byte_idx)
}

/// Returns the substring between the given character indices, clamped to the text.
pub fn safe_substring_by_char_indices(text: &str, start: usize, end: usize) -> &str {
    if start >= end {
        return "";
    }
    let start_byte = char_index_to_byte_index(text, start);
    let end_byte = char_index_to_byte_index(text, end);
    &text[start_byte..end_byte]
}

/// Removes the last grapheme cluster from `text`, returning how many chars it spanned.
///
/// Backspace in the editor removes a whole user-perceived character,
/// so the filter text must shrink by the same amount.
pub fn pop_grapheme(text: &mut String) -> usize {
    let Some((byte_idx, grapheme)) = text.grapheme_indices(true).next_back() else {
        return 0;
    };
    let removed = grapheme.chars().count();
    text.truncate(byte_idx);
    removed
}

/// Returns the number of chars in the last grapheme cluster of `text`.
pub fn last_grapheme_char_len(text: &str) -> usize {
    text.graphemes(true)
        .next_back()
        .map_or(0, |g| g.chars().count())
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_char_index_to_byte_index() {
        assert_eq!(char_index_to_byte_index("hello", 0), 0);
        assert_eq!(char_index_to_byte_index("hello", 3), 3);
        assert_eq!(char_index_to_byte_index("hello", 99), 5);
        // "é" is two bytes
        assert_eq!(char_index_to_byte_index("héllo", 2), 3);
        assert_eq!(char_index_to_byte_index("", 0), 0);
    }

    #[test]
    fn test_safe_substring() {
        assert_eq!(safe_substring_by_char_indices("hello world", 6, 11), "world");
        assert_eq!(safe_substring_by_char_indices("日本語テキスト", 1, 3), "本語");
        assert_eq!(safe_substring_by_char_indices("abc", 2, 1), "");
        assert_eq!(safe_substring_by_char_indices("abc", 1, 50), "bc");
    }

    #[test]
    fn test_pop_grapheme() {
        let mut text = String::from("Jo");
        assert_eq!(pop_grapheme(&mut text), 1);
        assert_eq!(text, "J");

        // e + combining acute accent is one grapheme but two chars
        let mut text = String::from("Jose\u{0301}");
        assert_eq!(pop_grapheme(&mut text), 2);
        assert_eq!(text, "Jos");

        let mut empty = String::new();
        assert_eq!(pop_grapheme(&mut empty), 0);
        assert!(empty.is_empty());
    }

    #[test]
    fn test_last_grapheme_char_len() {
        assert_eq!(last_grapheme_char_len("abc"), 1);
        assert_eq!(last_grapheme_char_len("👨‍👩‍👧‍👦"), 7);
        assert_eq!(last_grapheme_char_len(""), 0);
    }
}
