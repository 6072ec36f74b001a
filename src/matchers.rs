use crate::charclasses::is_word_byte;
use crate::insn::{ByteRange, Look};

/// \return whether the byte at \p at in \p hay is a word byte.
/// Positions outside the haystack are not word bytes.
#[inline(always)]
fn word_byte_at(hay: &[u8], at: Option<usize>) -> bool {
    at.and_then(|idx| hay.get(idx))
        .map_or(false, |&b| is_word_byte(b))
}

/// \return whether \p at is between a word byte and a non-word byte.
#[inline]
pub fn is_word_boundary(hay: &[u8], at: usize) -> bool {
    word_byte_at(hay, at.checked_sub(1)) != word_byte_at(hay, Some(at))
}

/// \return whether the zero-width condition \p look holds at \p at.
/// The whole haystack is consulted, so a search that starts in the middle of
/// the subject still sees the bytes before it.
#[inline]
pub fn look_matches(look: Look, hay: &[u8], at: usize) -> bool {
    debug_assert!(at <= hay.len(), "Position out of range");
    match look {
        Look::StartOfText => at == 0,
        Look::EndOfText => at == hay.len(),
        Look::StartOfLine => at == 0 || hay[at - 1] == b'\n',
        Look::EndOfLine => at == hay.len() || hay[at] == b'\n',
        Look::WordBoundary => is_word_boundary(hay, at),
        Look::NotWordBoundary => !is_word_boundary(hay, at),
    }
}

/// \return whether an optional byte is in the given range.
#[inline(always)]
pub fn byte_in_range(b: Option<u8>, range: ByteRange) -> bool {
    b.map_or(false, |b| range.contains(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_and_line_anchors() {
        let hay = b"ab\ncd";
        assert!(look_matches(Look::StartOfText, hay, 0));
        assert!(!look_matches(Look::StartOfText, hay, 3));
        assert!(look_matches(Look::StartOfLine, hay, 3));
        assert!(!look_matches(Look::StartOfLine, hay, 2));
        assert!(look_matches(Look::EndOfLine, hay, 2));
        assert!(look_matches(Look::EndOfLine, hay, 5));
        assert!(!look_matches(Look::EndOfText, hay, 2));
        assert!(look_matches(Look::EndOfText, hay, 5));
        assert!(look_matches(Look::StartOfText, b"", 0));
        assert!(look_matches(Look::EndOfText, b"", 0));
    }

    #[test]
    fn word_boundaries() {
        let hay = b"hi there";
        assert!(is_word_boundary(hay, 0));
        assert!(!is_word_boundary(hay, 1));
        assert!(is_word_boundary(hay, 2));
        assert!(is_word_boundary(hay, 3));
        assert!(is_word_boundary(hay, 8));
        assert!(!is_word_boundary(b"", 0));
        assert!(look_matches(Look::NotWordBoundary, b"  ", 1));
        // Non-ASCII bytes are never word bytes.
        assert!(!is_word_boundary("é".as_bytes(), 1));
    }
}
