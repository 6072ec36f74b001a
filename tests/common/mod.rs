#![allow(clippy::uninlined_format_args)]

use relinear::{Range, Subject, Text};

/// A match with all ranges expressed as byte offsets into the UTF-8 input,
/// whichever subject encoding produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestMatch {
    pub range: Range,
    pub captures: Vec<Option<Range>>,
}

impl TestMatch {
    pub fn range(&self) -> Range {
        self.range.clone()
    }
}

/// Format a Match by inserting commas between all capture groups.
fn format_match(r: &TestMatch, input: &str) -> String {
    let mut result = input[r.range()].to_string();
    for cg in r.captures.iter() {
        result.push(',');
        if let Some(cg) = cg {
            result.push_str(&input[cg.clone()])
        }
    }
    result
}

/// Encode a string as UTF16.
pub fn to_utf16(input: &str) -> Vec<u16> {
    input.encode_utf16().collect()
}

/// Encode a string as UTF32.
pub fn to_utf32(input: &str) -> Vec<char> {
    input.chars().collect()
}

/// Given a range of a string encoded as UTF16, return the corresponding
/// range in the original string (UTF-8).
pub fn range_from_utf16(utf16: &[u16], r: Range) -> Range {
    use std::char::decode_utf16;
    let start_utf8: usize = decode_utf16(utf16[0..r.start].iter().copied())
        .map(|r| r.expect("Invalid UTF16").len_utf8())
        .sum();
    let len_utf8: usize = decode_utf16(utf16[r].iter().copied())
        .map(|r| r.expect("Invalid UTF16").len_utf8())
        .sum();
    start_utf8..(start_utf8 + len_utf8)
}

/// Given a range of a string encoded as UTF32, return the corresponding
/// range in the original string (UTF-8).
pub fn range_from_utf32(utf32: &[char], r: Range) -> Range {
    let start_utf8: usize = utf32[0..r.start].iter().map(|c| c.len_utf8()).sum();
    let len_utf8: usize = utf32[r].iter().map(|c| c.len_utf8()).sum();
    start_utf8..(start_utf8 + len_utf8)
}

pub trait StringTestHelpers {
    /// "Fluent" style helper for testing that a String is equal to a str.
    fn test_eq(&self, s: &str);
}

impl StringTestHelpers for String {
    fn test_eq(&self, rhs: &str) {
        assert_eq!(self.as_str(), rhs)
    }
}

pub trait VecTestHelpers {
    /// "Fluent" style helper for testing that a Vec<&str> is equal to a
    /// Vec<&str>.
    fn test_eq(&self, rhs: Vec<&str>);
}

impl VecTestHelpers for Vec<&str> {
    fn test_eq(&self, rhs: Vec<&str>) {
        assert_eq!(*self, rhs)
    }
}

/// A compiled regex which remembers a TestConfig.
#[derive(Debug, Clone)]
pub struct TestCompiledRegex {
    re: relinear::Regex,
    tc: TestConfig,
}

/// Collect all matches in \p subject from native offset \p start, converting
/// ranges with \p convert.
fn collect_matches<T, F>(re: &relinear::Regex, subject: &T, start: usize, convert: F) -> Vec<TestMatch>
where
    T: Subject + ?Sized,
    F: Fn(Range) -> Range,
{
    let to_test_match = |m: relinear::Match<T>| TestMatch {
        range: convert(m.range()),
        captures: m.captures.iter().map(|r| r.clone().map(&convert)).collect(),
    };
    let all: Vec<TestMatch> = re.find_iter_at(subject, start).map(to_test_match).collect();
    assert_eq!(
        all.first().cloned(),
        re.find_at(subject, start).map(to_test_match),
        "find_at and find_iter_at disagree on the first match"
    );
    assert_eq!(
        re.is_match_at(subject, start),
        !all.is_empty(),
        "is_match_at disagrees with find_iter_at"
    );
    if start == 0 {
        assert_eq!(
            all,
            re.find_iter(subject).map(to_test_match).collect::<Vec<_>>(),
            "find_iter and find_iter_at disagree"
        );
    }
    all
}

impl TestCompiledRegex {
    /// Search for self in \p input, returning a list of all matches.
    /// \p start is a byte offset into \p input.
    #[track_caller]
    pub fn matches(&self, input: &str, start: usize) -> Vec<TestMatch> {
        let identity = |r: Range| r;
        match self.tc.encoding {
            Encoding::Str => collect_matches(&self.re, input, start, identity),
            Encoding::Bytes => {
                // Empty matches may land inside a character of a byte subject,
                // which cannot be expressed as a str range. Only test ASCII.
                if !input.is_ascii() {
                    return collect_matches(&self.re, input, start, identity);
                }
                collect_matches(&self.re, input.as_bytes(), start, identity)
            }
            Encoding::Utf16 => {
                let units = to_utf16(input);
                let text = Text::new(&units);
                let u16_start = input[..start].chars().map(char::len_utf16).sum();
                collect_matches(&self.re, &text, u16_start, |r| range_from_utf16(&units, r))
            }
            Encoding::Utf32 => {
                let chars = to_utf32(input);
                let text = Text::new(&chars);
                let u32_start = input[..start].chars().count();
                collect_matches(&self.re, &text, u32_start, |r| range_from_utf32(&chars, r))
            }
        }
    }

    /// Search for self in \p input, returning the first Match, or None if
    /// none.
    pub fn find(&self, input: &str) -> Option<TestMatch> {
        self.matches(input, 0).into_iter().next()
    }

    /// Match against a string, returning the first formatted match.
    #[track_caller]
    pub fn match1f(&self, input: &str) -> String {
        match self.find(input) {
            Some(m) => format_match(&m, input),
            None => panic!("Failed to match {}", input),
        }
    }

    /// Match against a string, returning the string of the named capture group given.
    pub fn match1_named_group(&self, input: &str, group: &str) -> String {
        let m = self.re.find(input).expect("Failed to match");
        match m.named_group(group) {
            Some(r) => input[r].to_string(),
            None => panic!("Named capture group does not exist {}", group),
        }
    }

    /// Match against a string, returning the match as a Vec containing None
    /// for unmatched groups, or the matched strings.
    pub fn match1_vec<'b>(&self, input: &'b str) -> Vec<Option<&'b str>> {
        let mut result = Vec::new();
        let m = self.find(input).expect("Failed to match");
        result.push(Some(&input[m.range()]));
        for cr in m.captures {
            result.push(cr.map(|r| &input[r]));
        }
        result
    }

    /// Test that matching against \p input fails.
    #[track_caller]
    pub fn test_fails(&self, input: &str) {
        assert!(self.find(input).is_none(), "Should not have matched");
        assert!(!self.re.is_match(input), "is_match disagrees with find");
    }

    /// Test that matching against \p input succeeds.
    #[track_caller]
    pub fn test_succeeds(&self, input: &str) {
        assert!(self.find(input).is_some(), "Should have matched");
        assert!(self.re.is_match(input), "is_match disagrees with find");
    }

    /// Return a list of all non-overlapping total match ranges from a given
    /// start.
    pub fn match_all_from(&self, input: &str, start: usize) -> Vec<Range> {
        self.matches(input, start)
            .into_iter()
            .map(|m| m.range())
            .collect()
    }

    /// Return a list of all non-overlapping matches.
    pub fn match_all<'b>(&self, input: &'b str) -> Vec<&'b str> {
        self.matches(input, 0)
            .into_iter()
            .map(move |m| &input[m.range()])
            .collect()
    }
}

/// Our subject encodings.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Encoding {
    Str,
    Bytes,
    Utf16,
    Utf32,
}

/// Description of how to test a regex.
#[derive(Debug, Copy, Clone)]
pub struct TestConfig {
    // Which kind of subject to search.
    encoding: Encoding,
}

impl TestConfig {
    /// Compile a pattern to a regex, with default flags.
    pub fn compile(&self, pattern: &str) -> TestCompiledRegex {
        self.compilef(pattern, "")
    }

    /// Compile a pattern to a regex, with given flags.
    #[track_caller]
    pub fn compilef(&self, pattern: &str, flags_str: &str) -> TestCompiledRegex {
        let re = relinear::Regex::with_flags(pattern, flags_str);
        match re {
            Ok(re) => TestCompiledRegex { re, tc: *self },
            Err(err) => panic!(
                "Failed to parse! flags: {} pattern: {}, error: {}",
                flags_str, pattern, err
            ),
        }
    }
}

/// Invoke \p F with each test config, in turn.
pub fn test_with_configs<F>(func: F)
where
    F: Fn(TestConfig),
{
    for encoding in [
        Encoding::Str,
        Encoding::Bytes,
        Encoding::Utf16,
        Encoding::Utf32,
    ] {
        func(TestConfig { encoding });
    }
}
