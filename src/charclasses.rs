use crate::codepointset::Interval;

// Character classes like \d or [[:alpha:]]. All of these are ASCII-only.

/// Construct an interval from an inclusive range of char.
const fn r(first: char, last: char) -> Interval {
    Interval {
        first: first as u32,
        last: last as u32,
    }
}

/// Construct an interval from a single char.
const fn r1(c: char) -> Interval {
    Interval {
        first: c as u32,
        last: c as u32,
    }
}

// Note all of these are sorted.

/// \w
pub const WORD_CHARS: [Interval; 4] = [r('0', '9'), r('A', 'Z'), r1('_'), r('a', 'z')];

/// \d
pub const DIGITS: [Interval; 1] = [r('0', '9')];

/// \s: tab, newline, form feed, carriage return and space. Vertical tab is excluded.
pub const WHITESPACE: [Interval; 3] = [r('\t', '\n'), r('\u{0C}', '\r'), r1(' ')];

const ALNUM: [Interval; 3] = [r('0', '9'), r('A', 'Z'), r('a', 'z')];
const ALPHA: [Interval; 2] = [r('A', 'Z'), r('a', 'z')];
const ASCII: [Interval; 1] = [r('\0', '\u{7F}')];
const BLANK: [Interval; 2] = [r1('\t'), r1(' ')];
const CNTRL: [Interval; 2] = [r('\0', '\u{1F}'), r1('\u{7F}')];
const GRAPH: [Interval; 1] = [r('!', '~')];
const LOWER: [Interval; 1] = [r('a', 'z')];
const PRINT: [Interval; 1] = [r(' ', '~')];
const PUNCT: [Interval; 4] = [r('!', '/'), r(':', '@'), r('[', '`'), r('{', '~')];
const SPACE: [Interval; 2] = [r('\t', '\r'), r1(' ')];
const UPPER: [Interval; 1] = [r('A', 'Z')];
const XDIGIT: [Interval; 3] = [r('0', '9'), r('A', 'F'), r('a', 'f')];

/// \return the intervals of the POSIX class with the given name, as in `[[:alpha:]]`.
pub fn posix_class(name: &str) -> Option<&'static [Interval]> {
    let ivs: &'static [Interval] = match name {
        "alnum" => &ALNUM,
        "alpha" => &ALPHA,
        "ascii" => &ASCII,
        "blank" => &BLANK,
        "cntrl" => &CNTRL,
        "digit" => &DIGITS,
        "graph" => &GRAPH,
        "lower" => &LOWER,
        "print" => &PRINT,
        "punct" => &PUNCT,
        "space" => &SPACE,
        "upper" => &UPPER,
        "word" => &WORD_CHARS,
        "xdigit" => &XDIGIT,
        _ => return None,
    };
    Some(ivs)
}

/// \return whether the byte \p b is a word character for the purposes of \b.
#[inline(always)]
pub fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}
