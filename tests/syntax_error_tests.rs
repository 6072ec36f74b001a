#![allow(clippy::uninlined_format_args)]

use relinear::{ErrorKind, Flags};

#[track_caller]
fn test_1_error_kind(pattern: &str, expected_kind: ErrorKind, expected_err: &str) {
    let res = relinear::Regex::new(pattern);
    assert!(res.is_err(), "Pattern should not have parsed: {}", pattern);

    let err = res.err().unwrap();
    assert_eq!(err.kind, expected_kind, "Wrong error kind for pattern '{}'", pattern);
    assert!(
        err.text.contains(expected_err),
        "Error text '{}' did not contain '{}' for pattern '{}'",
        err.text,
        expected_err,
        pattern
    );
}

#[track_caller]
fn test_1_error(pattern: &str, expected_err: &str) {
    test_1_error_kind(pattern, ErrorKind::Syntax, expected_err)
}

#[track_caller]
fn test_1_unsupported(pattern: &str) {
    let res = relinear::Regex::new(pattern);
    match res {
        Ok(_) => panic!("Pattern should not have parsed: {}", pattern),
        Err(err) => assert_eq!(
            err.kind,
            ErrorKind::UnsupportedConstruct,
            "Wrong error kind for pattern '{}': {}",
            pattern,
            err
        ),
    }
}

#[test]
fn test_excessive_capture_groups() {
    let mut captures = String::from("s");
    for _ in 0..65536 {
        captures.push_str("(x)");
    }
    test_1_error_kind(
        captures.as_str(),
        ErrorKind::CaptureLimitExceeded,
        "Capture group count limit exceeded",
    );

    // Without capturing, the same pattern is fine.
    let re = relinear::Regex::with_flags(captures.as_str(), "c").unwrap();
    assert_eq!(re.num_captures(), 1);
}

#[test]
fn test_pattern_too_large() {
    test_1_error_kind(
        "(?:x{1000}){1000}",
        ErrorKind::PatternTooLarge,
        "Pattern too large",
    );

    let small = Flags {
        size_limit: Some(256),
        ..Flags::default()
    };
    assert!(relinear::Regex::with_flags("a{4}", small).is_ok());
    let err = relinear::Regex::with_flags("a{100}", small).unwrap_err();
    assert_eq!(err.kind, ErrorKind::PatternTooLarge);

    let large = Flags {
        size_limit: Some(1 << 30),
        ..Flags::default()
    };
    assert!(relinear::Regex::with_flags("(?:x{100}){100}", large).is_ok());
}

#[test]
fn test_syntax_errors() {
    const NOTHING_TO_REPEAT: &str = "nothing to repeat";
    const COMBINED_REPEAT: &str = "cannot be combined";

    test_1_error(r"*", NOTHING_TO_REPEAT);
    test_1_error(r"?", NOTHING_TO_REPEAT);
    test_1_error(r"+a", NOTHING_TO_REPEAT);
    test_1_error(r"{3,5}", NOTHING_TO_REPEAT);
    test_1_error(r"a|*", NOTHING_TO_REPEAT);
    test_1_error(r"(*)", NOTHING_TO_REPEAT);
    test_1_error("^*", NOTHING_TO_REPEAT);
    test_1_error("$+", NOTHING_TO_REPEAT);
    test_1_error(r"\b*", NOTHING_TO_REPEAT);
    test_1_error(r"(?i)*", NOTHING_TO_REPEAT);
    test_1_error(r"x**", COMBINED_REPEAT);
    test_1_error(r"x{2}*", COMBINED_REPEAT);
    test_1_error(r"x*??", COMBINED_REPEAT);

    test_1_error(r"x{5,3}", "Invalid repetition argument");
    test_1_error(r"x{1001}", "Invalid repetition argument");
    test_1_error(r"x{2,1001}", "Invalid repetition argument");
    test_1_error(r"x{99999999999999999999}", "Invalid repetition argument");

    test_1_error(r"[abc", "Missing bracket");
    test_1_error(r"[", "Missing bracket");
    test_1_error(r"[]", "Missing bracket");
    test_1_error(r"[^", "Missing bracket");
    test_1_error(r"[[:alpha:]", "Missing bracket");
    test_1_error(r"[z-a]", "Invalid character class range");
    test_1_error(r"[a-\s]", "Invalid character class range");
    test_1_error(r"[\d-z]", "Invalid character class range");
    test_1_error(r"[[:foo:]]", "Invalid character class");

    test_1_error(r"(", "Missing parenthesis");
    test_1_error(r"(a|b", "Missing parenthesis");
    test_1_error(r"abc)", "Missing parenthesis");
    test_1_error(r"(?:a", "Missing parenthesis");
    test_1_error(r"(?i", "Missing parenthesis");

    test_1_error("\\", "trailing backslash");
    test_1_error("a\\", "trailing backslash");
    test_1_error("[a\\", "trailing backslash");
    test_1_error(r"\q", "Invalid escape sequence");
    test_1_error(r"\xZ1", "Invalid escape sequence");
    test_1_error(r"\x{}", "Invalid escape sequence");
    test_1_error(r"\x{110000}", "Invalid escape sequence");
    test_1_error(r"\x{41", "Invalid escape sequence");

    test_1_error("(?q:abc)", "Invalid Perl operator");
    test_1_error("(?)", "Invalid Perl operator");
    test_1_error("(?i-)", "Invalid Perl operator");
    test_1_error("(?--i)", "Invalid Perl operator");

    test_1_error("(?P<>a)", "Invalid named capture group");
    test_1_error("(?P<a-b>a)", "Invalid named capture group");
    test_1_error("(?P<n>a)(?<n>b)", "Invalid named capture group");
    test_1_error("(?<n", "Invalid named capture group");
}

#[test]
fn test_unsupported_constructs() {
    test_1_unsupported(r"(?=a)");
    test_1_unsupported(r"(?!a)");
    test_1_unsupported(r"(?<=a)b");
    test_1_unsupported(r"(?<!a)b");
    test_1_unsupported(r"(?>a)");
    test_1_unsupported(r"(a)\1");
    test_1_unsupported(r"\2(a)");
    test_1_unsupported(r"(?P<n>a)(?P=n)");
    test_1_unsupported(r"(?<n>a)\k<n>");
    test_1_unsupported(r"\pL");
    test_1_unsupported(r"\p{Greek}");
    test_1_unsupported(r"[\P{Greek}]");
    test_1_unsupported(r"\C");
    test_1_unsupported(r"a*+");
    test_1_unsupported(r"a{2}+");
}

#[test]
fn test_errors_display_their_text() {
    let err = relinear::Regex::new("(").unwrap_err();
    assert_eq!(err.to_string(), err.text);
    let boxed: Box<dyn std::error::Error> = Box::new(err);
    assert!(boxed.to_string().contains("Missing parenthesis"));
}

#[test]
fn test_valid_edge_cases() {
    for pattern in [
        "]",
        "}",
        "a{",
        "a{,5}",
        "a{1,2",
        "[]]",
        "[a-]",
        "[-a]",
        r"[\]]",
        r"\Q(\E",
        r"\Q",
        "(?i)",
        "(?i-s:a)",
        "()",
        "(|)",
        "a||b",
        "x{1000}",
        "x{0,1000}",
        r"\x{10FFFF}",
    ] {
        assert!(
            relinear::Regex::new(pattern).is_ok(),
            "Pattern should have parsed: {}",
            pattern
        );
    }
}
