#![allow(clippy::uninlined_format_args)]

use relinear::{Regex, RegexCache, Text};

const PATTERNS: &[&str] = &[
    "",
    "a",
    "a*",
    "a|ab",
    r"(\w+)\s+(\w+)",
    r"\bcar\b",
    r"^\d+$",
    r"(?m)^\w",
    "[^x]+",
    r"(a)|(b)|(c)",
    "\u{00E9}+",
    r"x{2,3}?",
];

const INPUTS: &[&str] = &[
    "",
    "a",
    "ab",
    "red car white car",
    "12345",
    "line one\nline two",
    "xxxx",
    "caf\u{00E9}\u{00E9}",
    "abcabc",
    "\u{2070E}a\u{2070E}",
];

fn to_utf16(s: &str) -> Vec<u16> {
    s.encode_utf16().collect()
}

#[test]
fn is_match_agrees_with_find() {
    for pattern in PATTERNS {
        for flags in ["", "L", "i", "U"] {
            let re = Regex::with_flags(pattern, flags).unwrap();
            for input in INPUTS {
                let units = to_utf16(input);
                let text = Text::new(&units);
                assert_eq!(
                    re.is_match(*input),
                    re.find(*input).is_some(),
                    "pattern {:?} input {:?}",
                    pattern,
                    input
                );
                assert_eq!(re.is_match(input.as_bytes()), re.find(input.as_bytes()).is_some());
                assert_eq!(re.is_match(&text), re.find(&text).is_some());
            }
        }
    }
}

#[test]
fn group_zero_is_the_match() {
    for pattern in PATTERNS {
        let re = Regex::new(pattern).unwrap();
        for input in INPUTS {
            for m in re.find_iter(*input) {
                assert_eq!(m.group(0), Some(m.range()));
                assert_eq!(m.captures.len() + 1, re.num_captures());
                assert_eq!(m.groups().len(), re.num_captures());
                assert_eq!(m.as_slice(), &input[m.range()]);
                for group in m.groups() {
                    if let Some(range) = group.range {
                        assert!(input.is_char_boundary(range.start));
                        assert!(input.is_char_boundary(range.end));
                    }
                }
            }
        }
    }
}

#[test]
fn matches_are_ordered_and_disjoint() {
    for pattern in PATTERNS {
        let re = Regex::new(pattern).unwrap();
        for input in INPUTS {
            let mut last_end = 0;
            let mut last_was_empty_at = None;
            for m in re.find_iter(*input) {
                assert!(m.start() >= last_end, "overlap for {:?} in {:?}", pattern, input);
                assert!(m.end() <= input.len());
                if m.is_empty() {
                    assert_ne!(last_was_empty_at, Some(m.start()), "repeated empty match");
                    last_was_empty_at = Some(m.start());
                }
                last_end = m.end();
            }
        }
    }
}

#[test]
fn find_iter_restarts_from_scratch() {
    let re = Regex::new(r"\d+").unwrap();
    let input = "a1b22c333";
    let first: Vec<_> = re.find_iter(input).map(|m| m.range()).collect();
    let second: Vec<_> = re.find_iter(input).map(|m| m.range()).collect();
    assert_eq!(first, vec![1..2, 3..5, 6..9]);
    assert_eq!(first, second);

    // The iterator stays exhausted.
    let mut iter = re.find_iter(input);
    assert_eq!(iter.by_ref().count(), 3);
    assert!(iter.next().is_none());
    assert!(iter.next().is_none());

    // Stopping early and resuming later sees the remaining matches.
    let mut iter = re.find_iter(input);
    assert_eq!(iter.next().map(|m| m.range()), Some(1..2));
    let rest: Vec<_> = iter.map(|m| m.as_slice()).collect();
    assert_eq!(rest, vec!["22", "333"]);
}

#[test]
fn leftmost_first_and_leftmost_longest() {
    let first = Regex::new("a|ab|abc").unwrap();
    let longest = Regex::with_flags("a|ab|abc", "L").unwrap();
    assert_eq!(first.find("xabcd").unwrap().range(), 1..2);
    assert_eq!(longest.find("xabcd").unwrap().range(), 1..4);

    // Longest still prefers the leftmost start.
    let longest = Regex::with_flags("bcd|abc", "L").unwrap();
    assert_eq!(longest.find("abcd").unwrap().range(), 0..3);

    // Lazy quantifiers are overruled by longest matching.
    let lazy = Regex::with_flags("a+?", "L").unwrap();
    assert_eq!(lazy.find("aaa").unwrap().range(), 0..3);

    for pattern in PATTERNS {
        let first = Regex::new(pattern).unwrap();
        let longest = Regex::with_flags(pattern, "L").unwrap();
        for input in INPUTS {
            match (first.find(*input), longest.find(*input)) {
                (Some(f), Some(l)) => {
                    assert_eq!(f.start(), l.start(), "{:?} on {:?}", pattern, input);
                    assert!(f.end() <= l.end(), "{:?} on {:?}", pattern, input);
                }
                (None, None) => {}
                (f, l) => panic!("{:?} on {:?}: {:?} vs {:?}", pattern, input, f, l),
            }
        }
    }
}

#[test]
fn empty_matches_advance() {
    let empty = Regex::new("").unwrap();
    assert_eq!(empty.find_iter("xxxx").count(), 5);
    let star = Regex::new("a*").unwrap();
    let ranges: Vec<_> = star.find_iter("xxxx").map(|m| m.range()).collect();
    assert_eq!(ranges, vec![0..0, 1..1, 2..2, 3..3, 4..4]);

    // On a str an empty match advances by a whole character.
    let starts: Vec<_> = empty.find_iter("\u{00E9}\u{00E9}").map(|m| m.start()).collect();
    assert_eq!(starts, vec![0, 2, 4]);

    // Bytes are not assumed to be UTF-8, so the search advances by a byte.
    let starts: Vec<_> = empty
        .find_iter("\u{00E9}".as_bytes())
        .map(|m| m.start())
        .collect();
    assert_eq!(starts, vec![0, 1, 2]);

    // Text advances by a character, so a surrogate pair is never split.
    let units = to_utf16("\u{2070E}a");
    let text = Text::new(&units);
    let starts: Vec<_> = empty.find_iter(&text).map(|m| m.start()).collect();
    assert_eq!(starts, vec![0, 2, 3]);
}

#[test]
fn iteration_examples() {
    let re = Regex::new(r"(\w+)\s+(car)").unwrap();
    let matches: Vec<_> = re.find_iter("red car white car").collect();
    assert_eq!(matches.len(), 2);
    assert_eq!(matches[0].start(), 0);
    assert_eq!(matches[1].start(), 8);
    assert_eq!(matches[1].group_slice(1), Some("white"));
    assert_eq!(matches[1].group_slice(2), Some("car"));

    let re = Regex::new(r"\d*").unwrap();
    let m = re.find_at("123", 1).unwrap();
    assert_eq!(m.range(), 1..3);
    assert_eq!(m.as_slice(), "23");
}

#[test]
fn find_at_bounds() {
    let empty = Regex::new("").unwrap();
    assert_eq!(empty.find_at("abc", 3).unwrap().range(), 3..3);
    assert!(empty.find_at("abc", 4).is_none());
    assert!(empty.find_at(&b"abc"[..], 4).is_none());

    // A start inside a character rounds up to the next character.
    let a = Regex::new("a").unwrap();
    assert_eq!(a.find_at("\u{00E9}a", 1).unwrap().range(), 2..3);
    let units = to_utf16("\u{2070E}a");
    let text = Text::new(&units);
    assert_eq!(a.find_at(&text, 1).unwrap().range(), 2..3);
    assert!(a.find_at(&text, 4).is_none());

    // Anchors see the text before the start.
    let anchored = Regex::new("^a").unwrap();
    assert!(anchored.find_at("aa", 1).is_none());
    let boundary = Regex::new(r"\Ba").unwrap();
    assert_eq!(boundary.find_at("aa", 1).unwrap().range(), 1..2);
}

#[test]
fn start_offsets_for_is_match_and_find_iter() {
    let digits = Regex::new(r"\d+").unwrap();
    assert!(digits.is_match_at("1a23", 0));
    assert!(digits.is_match_at("1a23", 3));
    assert!(!digits.is_match_at("12a", 2));
    assert!(!digits.is_match_at("12", 3));
    assert!(!digits.is_match_at(&b"12"[..], 3));

    let ranges: Vec<_> = digits.find_iter_at("1a23b4", 1).map(|m| m.range()).collect();
    assert_eq!(ranges, vec![2..4, 5..6]);
    assert_eq!(digits.find_iter_at("1a23b4", 6).count(), 0);
    assert_eq!(digits.find_iter_at("1a23b4", 7).count(), 0);

    // An empty pattern still matches at the very end.
    let empty = Regex::new("").unwrap();
    assert!(empty.is_match_at("ab", 2));
    assert_eq!(empty.find_iter_at("ab", 2).map(|m| m.range()).collect::<Vec<_>>(), vec![2..2]);

    // Offsets are native units, and round up inside a character.
    let units = to_utf16("\u{2070E}1\u{2070E}2");
    let text = Text::new(&units);
    let ranges: Vec<_> = digits.find_iter_at(&text, 1).map(|m| m.range()).collect();
    assert_eq!(ranges, vec![2..3, 5..6]);
    assert!(digits.is_match_at(&text, 4));
    assert!(!digits.is_match_at(&text, 7));
    let ranges: Vec<_> = digits.find_iter_at("\u{00E9}1", 1).map(|m| m.range()).collect();
    assert_eq!(ranges, vec![2..3]);

    // Anchors and word boundaries see the text before the start.
    let anchored = Regex::new("^a").unwrap();
    assert!(!anchored.is_match_at("aa", 1));
    assert_eq!(anchored.find_iter_at("aa", 1).count(), 0);
    let word = Regex::new(r"\ba").unwrap();
    assert!(!word.is_match_at("ba", 1));
}

#[test]
fn text_offsets_are_in_code_units() {
    let any = Regex::new(".+").unwrap();

    let s = "\u{6C34}\u{1C4}";
    assert_eq!(any.find(s).unwrap().len(), 5);
    let chars: Vec<char> = s.chars().collect();
    assert_eq!(any.find(&Text::new(&chars)).unwrap().len(), 2);
    let units = to_utf16(s);
    assert_eq!(any.find(&Text::new(&units)).unwrap().len(), 2);

    let s = "\u{2070E}\u{20731}\u{20779}\u{20C53}";
    assert_eq!(any.find(s).unwrap().len(), 16);
    let chars: Vec<char> = s.chars().collect();
    assert_eq!(any.find(&Text::new(&chars)).unwrap().len(), 4);
    let units = to_utf16(s);
    assert_eq!(any.find(&Text::new(&units)).unwrap().len(), 8);

    let re = Regex::new("\u{20779}\u{20C53}").unwrap();
    let s = "xxx\u{2070E}\u{20731}\u{20779}\u{20C53}";
    let chars: Vec<char> = s.chars().collect();
    let text = Text::new(&chars);
    let m = re.find(&text).unwrap();
    assert_eq!(m.range(), 5..7);
    let units = to_utf16(s);
    let text = Text::new(&units);
    let m = re.find(&text).unwrap();
    assert_eq!(m.range(), 7..11);
    assert_eq!(m.as_slice(), &units[7..11]);
    assert_eq!(String::from_utf16(m.as_slice()).unwrap(), "\u{20779}\u{20C53}");
}

#[test]
fn text_captures() {
    let re = Regex::new(r"(?<word>\w+)\s(\S+)").unwrap();
    let s = "\u{6C34} ab \u{2070E}!";
    let units = to_utf16(s);
    let text = Text::new(&units);
    let m = re.find(&text).unwrap();
    assert_eq!(m.range(), 2..8);
    assert_eq!(m.named_group("word"), Some(2..4));
    assert_eq!(m.group(2), Some(5..8));
    assert_eq!(m.group_slice(2), Some(&units[5..8]));

    // Searching the same text again reuses its encoding and agrees.
    let again = re.find(&text).unwrap();
    assert_eq!(again.range(), m.range());
    assert_eq!(again.captures, m.captures);
}

#[test]
fn lone_surrogates() {
    let units: Vec<u16> = vec![0x61, 0xD800, 0x62, 0xDC00];
    let text = Text::new(&units);

    let re = Regex::new("a\u{FFFD}b").unwrap();
    assert_eq!(re.find(&text).unwrap().range(), 0..3);

    let any = Regex::new(".").unwrap();
    let ranges: Vec<_> = any.find_iter(&text).map(|m| m.range()).collect();
    assert_eq!(ranges, vec![0..1, 1..2, 2..3, 3..4]);

    let replacement = Regex::new("\u{FFFD}").unwrap();
    assert_eq!(replacement.find_iter(&text).count(), 2);
}

#[test]
fn latin1_subjects() {
    let re = Regex::with_flags("caf.", "l").unwrap();
    assert_eq!(re.find(&b"caf\xE9"[..]).unwrap().range(), 0..4);
    let utf8 = Regex::new("caf.").unwrap();
    assert!(utf8.find(&b"caf\xE9"[..]).is_none());

    let e_acute = Regex::with_flags(r"\x{E9}", "l").unwrap();
    assert_eq!(e_acute.find(&b"caf\xE9"[..]).unwrap().range(), 3..4);
    // Code points above 0xFF can never match.
    let wide = Regex::with_flags("\u{20AC}|\u{0100}", "l").unwrap();
    assert!(!wide.is_match(&b"\xE2\x82\xAC\x00\x01"[..]));

    // Case folding within Latin-1.
    let icase = Regex::with_flags("\u{00E9}", "li").unwrap();
    assert!(icase.is_match(&b"\xC9"[..]));

    // Text outside Latin-1 is searched with '?' in its place.
    let units = to_utf16("\u{00E9}\u{20AC}!");
    let text = Text::new(&units);
    let question = Regex::with_flags(r"\?", "l").unwrap();
    assert_eq!(question.find(&text).unwrap().range(), 1..2);
    let e_acute = Regex::with_flags("\u{00E9}", "l").unwrap();
    assert_eq!(e_acute.find(&text).unwrap().range(), 0..1);

    // A str is searched by character but reported in bytes.
    assert_eq!(e_acute.find("caf\u{00E9}!").unwrap().range(), 3..5);
    let dots = Regex::with_flags("f..", "l").unwrap();
    assert_eq!(dots.find("f\u{00E9}\u{00E9}").unwrap().as_slice(), "f\u{00E9}\u{00E9}");
}

#[test]
fn byte_subjects() {
    let re = Regex::new("\u{00E9}+").unwrap();
    let m = re.find("caf\u{00E9}\u{00E9}".as_bytes()).unwrap();
    assert_eq!(m.range(), 3..7);
    assert_eq!(m.as_slice(), "\u{00E9}\u{00E9}".as_bytes());

    // Invalid UTF-8 never matches a UTF-8 character, but is skipped over.
    let any = Regex::new(".").unwrap();
    let ranges: Vec<_> = any.find_iter(&b"a\xFFb"[..]).map(|m| m.range()).collect();
    assert_eq!(ranges, vec![0..1, 2..3]);
    let dot_all = Regex::with_flags(r"a.b", "s").unwrap();
    assert!(!dot_all.is_match(&b"a\xFFb"[..]));
}

#[test]
fn named_groups_and_metadata() {
    let re = Regex::new(r"(?P<year>\d{4})-(\d{2})-(?<day>\d{2})").unwrap();
    assert_eq!(re.num_captures(), 4);
    assert_eq!(re.group_index_for_name("year"), Some(1));
    assert_eq!(re.group_index_for_name("day"), Some(3));
    assert_eq!(re.group_index_for_name("month"), None);
    assert_eq!(re.group_index_for_name(""), None);
    let names: Vec<_> = re.group_names().collect();
    assert_eq!(names, vec![(1, "year"), (3, "day")]);

    let m = re.find("on 2020-12-05").unwrap();
    let named: Vec<_> = m.named_groups().map(|g| (g.name, g.range)).collect();
    assert_eq!(
        named,
        vec![(Some("year"), Some(3..7)), (Some("day"), Some(11..13))]
    );
    let indexes: Vec<_> = m.groups().map(|g| g.index).collect();
    assert_eq!(indexes, vec![0, 1, 2, 3]);
    assert_eq!(m.group(4), None);
    assert_eq!(m.named_group(""), None);

    assert_eq!(re.pattern(), r"(?P<year>\d{4})-(\d{2})-(?<day>\d{2})");
    assert_eq!(re.to_string(), re.pattern());
    let parsed: Regex = "a+".parse().unwrap();
    assert_eq!(parsed.find("baa").unwrap().range(), 1..3);
    assert!("(".parse::<Regex>().is_err());
}

#[test]
fn flags_round_trip() {
    let re = Regex::with_flags("a", "imsLU").unwrap();
    let flags = re.flags();
    assert!(flags.icase && flags.multiline && flags.dot_all && flags.longest && flags.ungreedy);
    assert!(!flags.latin1 && !flags.literal && !flags.single_capture);
    assert_eq!(relinear::Flags::from(flags.to_string().as_str()), flags);

    // Inline flags do not leak into the regex's flags.
    assert!(!Regex::new("(?i)a").unwrap().flags().icase);
}

#[test]
fn no_catastrophic_backtracking() {
    let long_a = "a".repeat(5000);
    assert!(!Regex::new("(a*)*b").unwrap().is_match(long_a.as_str()));
    assert!(Regex::new("(a*)*b").unwrap().find(long_a.as_str()).is_none());

    let long_x = "x".repeat(2000);
    assert!(!Regex::new("(x+x+)+y").unwrap().is_match(long_x.as_str()));
    assert!(Regex::new("(?:x|x)*y").unwrap().find(long_x.as_str()).is_none());

    let m = Regex::new("(a|aa)+$").unwrap().find(long_a.as_str()).unwrap();
    assert_eq!(m.range(), 0..5000);
}

#[test]
fn regexes_are_shareable() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Regex>();
    assert_send_sync::<RegexCache>();
    assert_send_sync::<relinear::Error>();

    let re = Regex::new(r"\d+").unwrap();
    let inputs = ["a1", "b22", "c333", "d4444"];
    std::thread::scope(|scope| {
        for (i, input) in inputs.iter().enumerate() {
            let re = &re;
            scope.spawn(move || {
                assert_eq!(re.find(*input).unwrap().len(), i + 1);
            });
        }
    });
}

#[test]
fn cached_regexes() {
    let mut cache = RegexCache::default();
    let a = cache.get_or_compile(r"(\w+)@(\w+)", "").unwrap();
    let b = cache.get_or_compile(r"(\w+)@(\w+)", "").unwrap();
    assert!(std::sync::Arc::ptr_eq(&a, &b));
    assert_eq!(a.find("mail bob@example").unwrap().group_slice(2), Some("example"));
    let err = cache.get_or_compile("(?=x)", "").unwrap_err();
    assert_eq!(err.kind, relinear::ErrorKind::UnsupportedConstruct);
    assert_eq!(cache.len(), 1);
}
