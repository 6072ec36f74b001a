//! Parser from regex patterns to IR

use crate::api;
use crate::charclasses;
use crate::codepointset::{CodePointSet, Interval, CODE_POINT_MAX};
use crate::folds;
use crate::ir;
use crate::types::{BracketContents, CaptureGroupID, MAX_CAPTURE_GROUPS, MAX_REPETITION};
use std::fmt;
use std::iter::Peekable;

/// The category of a compilation error.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The pattern is malformed.
    Syntax,

    /// The pattern uses a construct which cannot be matched in linear time,
    /// such as lookaround or backreferences.
    UnsupportedConstruct,

    /// The pattern has too many capture groups.
    CaptureLimitExceeded,

    /// The compiled program would exceed the size limit.
    PatternTooLarge,
}

/// Represents an error encountered during regex compilation.
/// The text contains a human-readable error message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    pub kind: ErrorKind,
    pub text: String,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl std::error::Error for Error {}

pub(crate) fn error_of_kind<S, T>(kind: ErrorKind, text: S) -> Result<T, Error>
where
    S: ToString,
{
    Err(Error {
        kind,
        text: text.to_string(),
    })
}

fn error<S, T>(text: S) -> Result<T, Error>
where
    S: ToString,
{
    error_of_kind(ErrorKind::Syntax, text)
}

fn unsupported<S, T>(text: S) -> Result<T, Error>
where
    S: ToString,
{
    error_of_kind(ErrorKind::UnsupportedConstruct, text)
}

const NOTHING_TO_REPEAT: &str = "Invalid repetition operator (nothing to repeat)";
const COMBINED_REPEAT: &str =
    "Invalid repetition operator (repetition operators cannot be combined)";

fn make_cat(mut nodes: Vec<ir::Node>) -> ir::Node {
    match nodes.len() {
        0 => ir::Node::Empty,
        1 => nodes.pop().unwrap_or(ir::Node::Empty),
        _ => ir::Node::Cat(nodes),
    }
}

fn make_alt(nodes: Vec<ir::Node>) -> ir::Node {
    let mut mright = None;
    for node in nodes.into_iter().rev() {
        match mright {
            None => mright = Some(node),
            Some(right) => mright = Some(ir::Node::Alt(Box::new(node), Box::new(right))),
        }
    }
    mright.unwrap_or(ir::Node::Empty)
}

/// \return the code points of a Perl class escape like \d or \W.
fn codepoints_from_class(class: char) -> CodePointSet {
    let ivs: &[Interval] = match class.to_ascii_lowercase() {
        'd' => &charclasses::DIGITS,
        's' => &charclasses::WHITESPACE,
        'w' => &charclasses::WORD_CHARS,
        _ => panic!("Not a class escape"),
    };
    let cps = CodePointSet::from_sorted_disjoint_intervals(ivs.to_vec());
    if class.is_ascii_uppercase() {
        cps.inverted()
    } else {
        cps
    }
}

fn is_class_escape(c: char) -> bool {
    matches!(c, 'd' | 'D' | 's' | 'S' | 'w' | 'W')
}

enum ClassAtom {
    CodePoint(u32),
    Set(CodePointSet),
}

fn add_class_atom(cps: &mut CodePointSet, atom: ClassAtom) {
    match atom {
        ClassAtom::CodePoint(c) => cps.add_one(c),
        ClassAtom::Set(set) => cps.add_set(set),
    }
}

/// Represents the state used to parse a regex.
struct Parser<'a> {
    /// The remaining input.
    input: Peekable<std::str::Chars<'a>>,

    /// Flags in effect at the current position. Inline flags modify these
    /// until the end of the enclosing group.
    flags: api::Flags,

    /// Number of capturing groups.
    group_count: usize,

    /// Names of named groups seen so far.
    group_names: Vec<String>,
}

impl<'a> Parser<'a> {
    /// Consume a character, returning it.
    fn consume(&mut self, c: char) -> char {
        let nc = self.input.next();
        debug_assert!(nc == Some(c), "char was not next");
        c
    }

    /// If our contents begin with the char c, consume it from our contents
    /// and return true. Otherwise return false.
    fn try_consume(&mut self, c: char) -> bool {
        if self.input.peek() == Some(&c) {
            self.input.next();
            true
        } else {
            false
        }
    }

    /// If our contents begin with the string \p s, consume it from our contents
    /// and return true. Otherwise return false.
    fn try_consume_str(&mut self, s: &str) -> bool {
        let mut cursor = self.input.clone();
        for c1 in s.chars() {
            if cursor.next() != Some(c1) {
                return false;
            }
        }
        self.input = cursor;
        true
    }

    /// Peek at the next character.
    fn peek(&mut self) -> Option<char> {
        self.input.peek().copied()
    }

    /// \return the next character.
    fn next(&mut self) -> Option<char> {
        self.input.next()
    }

    fn make_char(&self, c: u32) -> ir::Node {
        ir::Node::Char {
            c,
            icase: self.flags.icase,
        }
    }

    fn make_bracket(&self, invert: bool, cps: CodePointSet) -> ir::Node {
        let cps = if self.flags.icase {
            folds::fold_code_points(&cps)
        } else {
            cps
        };
        ir::Node::Bracket(BracketContents { invert, cps })
    }

    fn try_parse(&mut self) -> Result<ir::Regex, Error> {
        let body = if self.flags.literal {
            let mut chars = Vec::new();
            while let Some(c) = self.next() {
                chars.push(self.make_char(c as u32));
            }
            make_cat(chars)
        } else {
            self.consume_disjunction()?
        };
        // If there's something left, it's an error (for example, an excess closing paren).
        match self.input.peek() {
            Some(')') => error("Missing parenthesis"),
            Some(c) => error(format!("Unexpected char: {}", c)),
            None => Ok(ir::Regex {
                node: make_cat(vec![body, ir::Node::Goal]),
                flags: self.flags,
            }),
        }
    }

    fn consume_disjunction(&mut self) -> Result<ir::Node, Error> {
        let mut terms = vec![self.consume_term()?];
        while self.try_consume('|') {
            terms.push(self.consume_term()?)
        }
        Ok(make_alt(terms))
    }

    fn consume_term(&mut self) -> Result<ir::Node, Error> {
        let mut result: Vec<ir::Node> = Vec::new();
        loop {
            let mut start_offset = result.len();
            let mut quantifier_allowed = true;

            let c = match self.peek() {
                None => break,
                Some(c) => c,
            };
            match c {
                // A concatenation is terminated by closing parens or vertical bar (alternations).
                ')' | '|' => break,
                '^' => {
                    self.consume('^');
                    result.push(ir::Node::Anchor(if self.flags.multiline {
                        ir::AnchorType::StartOfLine
                    } else {
                        ir::AnchorType::StartOfText
                    }));
                    quantifier_allowed = false;
                }

                '$' => {
                    self.consume('$');
                    result.push(ir::Node::Anchor(if self.flags.multiline {
                        ir::AnchorType::EndOfLine
                    } else {
                        ir::AnchorType::EndOfText
                    }));
                    quantifier_allowed = false;
                }

                '\\' => {
                    self.consume('\\');
                    if self.try_consume('Q') {
                        let mut literal = self.consume_quoted_literal();
                        match literal.pop() {
                            Some(last) => {
                                result.extend(literal);
                                start_offset = result.len();
                                result.push(last);
                            }
                            None => quantifier_allowed = false,
                        }
                    } else {
                        let node = self.consume_atom_escape()?;
                        quantifier_allowed =
                            !matches!(node, ir::Node::Anchor(..) | ir::Node::WordBoundary { .. });
                        result.push(node);
                    }
                }

                '.' => {
                    self.consume('.');
                    result.push(if self.flags.dot_all {
                        ir::Node::MatchAny
                    } else {
                        ir::Node::MatchAnyExceptLineTerminator
                    });
                }

                '(' => match self.consume_group()? {
                    Some(node) => result.push(node),
                    None => quantifier_allowed = false,
                },

                '[' => {
                    result.push(self.consume_bracket()?);
                }

                c => {
                    // It's an error if this parses successfully as a quantifier.
                    // Note this covers *, +, ? as well.
                    let saved = self.input.clone();
                    if self.try_consume_quantifier()?.is_some() {
                        return error(NOTHING_TO_REPEAT);
                    }
                    self.input = saved;
                    let c = self.consume(c);
                    result.push(self.make_char(c as u32));
                }
            }

            // We just parsed a term; try parsing a quantifier.
            if let Some(quant) = self.try_consume_quantifier()? {
                if !quantifier_allowed || start_offset == result.len() {
                    return error(NOTHING_TO_REPEAT);
                }
                if self.peek() == Some('+') {
                    return unsupported("Possessive quantifiers are not supported");
                }
                let saved = self.input.clone();
                if self.try_consume_quantifier()?.is_some() {
                    return error(COMBINED_REPEAT);
                }
                self.input = saved;
                let quantifee = result.split_off(start_offset);
                result.push(ir::Node::Loop {
                    loopee: Box::new(make_cat(quantifee)),
                    quant,
                });
            }
        }
        Ok(make_cat(result))
    }

    /// Consume the characters of a \Q...\E sequence, after the \Q.
    fn consume_quoted_literal(&mut self) -> Vec<ir::Node> {
        let mut result = Vec::new();
        while let Some(c) = self.next() {
            if c == '\\' && self.try_consume('E') {
                break;
            }
            result.push(self.make_char(c as u32));
        }
        result
    }

    /// Consume a parenthesized group.
    /// \return None for a bare flag group like (?i), which matches nothing.
    fn consume_group(&mut self) -> Result<Option<ir::Node>, Error> {
        let saved_flags = self.flags;
        let node = if self.try_consume_str("(?=") || self.try_consume_str("(?!") {
            return unsupported("Lookahead assertions are not supported");
        } else if self.try_consume_str("(?<=") || self.try_consume_str("(?<!") {
            return unsupported("Lookbehind assertions are not supported");
        } else if self.try_consume_str("(?>") {
            return unsupported("Atomic groups are not supported");
        } else if self.try_consume_str("(?P=") {
            return unsupported("Backreferences are not supported");
        } else if self.try_consume_str("(?P<") || self.try_consume_str("(?<") {
            let name = self.consume_group_name()?;
            let group = self.reserve_capture_group()?;
            let contents = self.consume_group_contents(saved_flags)?;
            self.make_capture_group(contents, group, Some(name))
        } else if self.try_consume_str("(?") {
            if self.consume_inline_flags()? {
                // Like (?i); applies until the end of the enclosing group.
                return Ok(None);
            }
            self.consume_group_contents(saved_flags)?
        } else {
            self.consume('(');
            let group = self.reserve_capture_group()?;
            let contents = self.consume_group_contents(saved_flags)?;
            self.make_capture_group(contents, group, None)
        };
        Ok(Some(node))
    }

    /// Consume a group's disjunction and its closing paren, restoring flags.
    fn consume_group_contents(&mut self, saved_flags: api::Flags) -> Result<ir::Node, Error> {
        let contents = self.consume_disjunction()?;
        self.flags = saved_flags;
        if !self.try_consume(')') {
            return error("Missing parenthesis");
        }
        Ok(contents)
    }

    fn reserve_capture_group(&mut self) -> Result<Option<CaptureGroupID>, Error> {
        if self.flags.single_capture {
            return Ok(None);
        }
        if self.group_count >= MAX_CAPTURE_GROUPS {
            return error_of_kind(
                ErrorKind::CaptureLimitExceeded,
                "Capture group count limit exceeded",
            );
        }
        let group = self.group_count as CaptureGroupID;
        self.group_count += 1;
        Ok(Some(group))
    }

    fn make_capture_group(
        &self,
        contents: ir::Node,
        group: Option<CaptureGroupID>,
        name: Option<String>,
    ) -> ir::Node {
        match (group, name) {
            (None, _) => contents,
            (Some(id), None) => ir::Node::CaptureGroup(Box::new(contents), id),
            (Some(id), Some(name)) => ir::Node::NamedCaptureGroup(Box::new(contents), id, name),
        }
    }

    /// Consume a group name through its closing '>'.
    fn consume_group_name(&mut self) -> Result<String, Error> {
        let mut name = String::new();
        loop {
            match self.next() {
                Some('>') => break,
                Some(c) if c.is_alphanumeric() || c == '_' => name.push(c),
                _ => return error("Invalid named capture group"),
            }
        }
        if name.is_empty() || self.group_names.contains(&name) {
            return error("Invalid named capture group");
        }
        self.group_names.push(name.clone());
        Ok(name)
    }

    /// Consume flags after "(?", through the ')' or ':'.
    /// \return true if the flags were terminated by ')', i.e. they apply to the
    /// rest of the enclosing group.
    fn consume_inline_flags(&mut self) -> Result<bool, Error> {
        let mut negated = false;
        let mut saw_flag = false;
        // Set after a '-' until a flag follows it.
        let mut dangling_negation = false;
        loop {
            let c = match self.next() {
                Some(c) => c,
                None => return error("Missing parenthesis"),
            };
            match c {
                'i' => self.flags.icase = !negated,
                'm' => self.flags.multiline = !negated,
                's' => self.flags.dot_all = !negated,
                'U' => self.flags.ungreedy = !negated,
                '-' if !negated => {
                    negated = true;
                    dangling_negation = true;
                    continue;
                }
                ')' if saw_flag && !dangling_negation => return Ok(true),
                ':' if !dangling_negation => return Ok(false),
                _ => return error("Invalid Perl operator"),
            }
            saw_flag = true;
            dangling_negation = false;
        }
    }

    fn consume_bracket(&mut self) -> Result<ir::Node, Error> {
        self.consume('[');
        let invert = self.try_consume('^');
        let mut cps = CodePointSet::new();

        // A leading ] is literal.
        if self.try_consume(']') {
            cps.add_one(']' as u32);
        }

        loop {
            match self.peek() {
                None => return error("Missing bracket"),
                Some(']') => {
                    self.consume(']');
                    return Ok(self.make_bracket(invert, cps));
                }
                _ => {}
            }

            if let Some(posix) = self.try_consume_posix_class()? {
                cps.add_set(posix);
                continue;
            }

            // Parse a code point or character class.
            let first = self.consume_bracket_class_atom()?;

            // Check for a dash; we may have a range. A dash before ] is literal.
            let mut cursor = self.input.clone();
            let is_range = cursor.next() == Some('-') && !matches!(cursor.next(), Some(']') | None);
            if !is_range {
                add_class_atom(&mut cps, first);
                continue;
            }
            self.consume('-');
            let second = self.consume_bracket_class_atom()?;

            // Ranges can't contain character classes, and must be in order.
            match (first, second) {
                (ClassAtom::CodePoint(c1), ClassAtom::CodePoint(c2)) if c1 <= c2 => {
                    cps.add(Interval::new(c1, c2))
                }
                _ => return error("Invalid character class range"),
            }
        }
    }

    /// Try consuming a POSIX class like [:alpha:] or [:^digit:].
    fn try_consume_posix_class(&mut self) -> Result<Option<CodePointSet>, Error> {
        if !self.try_consume_str("[:") {
            return Ok(None);
        }
        let negate = self.try_consume('^');
        let mut name = String::new();
        while let Some(c) = self.next() {
            if c == ':' && self.try_consume(']') {
                let ivs = match charclasses::posix_class(&name) {
                    Some(ivs) => ivs,
                    None => return error("Invalid character class"),
                };
                let cps = CodePointSet::from_sorted_disjoint_intervals(ivs.to_vec());
                return Ok(Some(if negate { cps.inverted() } else { cps }));
            }
            name.push(c);
        }
        error("Missing bracket")
    }

    fn consume_bracket_class_atom(&mut self) -> Result<ClassAtom, Error> {
        match self.next() {
            None => error("Missing bracket"),
            Some('\\') => match self.peek() {
                None => error("Missing escape sequence (trailing backslash)"),
                Some(c) if is_class_escape(c) => {
                    self.consume(c);
                    Ok(ClassAtom::Set(codepoints_from_class(c)))
                }
                Some(_) => Ok(ClassAtom::CodePoint(self.consume_character_escape()?)),
            },
            Some(c) => Ok(ClassAtom::CodePoint(c as u32)),
        }
    }

    fn try_consume_quantifier(&mut self) -> Result<Option<ir::Quantifier>, Error> {
        if let Some(mut quant) = self.try_consume_quantifier_prefix()? {
            let lazy = self.try_consume('?');
            quant.greedy = lazy == self.flags.ungreedy;
            Ok(Some(quant))
        } else {
            Ok(None)
        }
    }

    fn try_consume_quantifier_prefix(&mut self) -> Result<Option<ir::Quantifier>, Error> {
        let (min, max) = match self.peek() {
            Some('+') => (1, None),
            Some('*') => (0, None),
            Some('?') => (0, Some(1)),
            Some('{') => return self.try_consume_counted_repetition(),
            _ => return Ok(None),
        };
        self.next();
        Ok(Some(ir::Quantifier {
            min,
            max,
            greedy: true,
        }))
    }

    /// Try consuming {n}, {n,} or {n,m}. If the brace does not begin a valid
    /// repetition, nothing is consumed and it is treated as a literal.
    fn try_consume_counted_repetition(&mut self) -> Result<Option<ir::Quantifier>, Error> {
        let saved = self.input.clone();
        self.consume('{');
        let min = match self.try_consume_decimal_integer_literal() {
            Some(min) => min,
            None => {
                self.input = saved;
                return Ok(None);
            }
        };
        let max = if self.try_consume(',') {
            // Like {3,} or {3,4}
            self.try_consume_decimal_integer_literal()
        } else {
            // Like {3}.
            Some(min)
        };
        if !self.try_consume('}') {
            self.input = saved;
            return Ok(None);
        }
        if min > MAX_REPETITION || max.map_or(false, |max| max > MAX_REPETITION || max < min) {
            return error("Invalid repetition argument");
        }
        Ok(Some(ir::Quantifier {
            min,
            max,
            greedy: true,
        }))
    }

    /// Consume a run of decimal digits, saturating at usize::MAX.
    /// \return None if there were no digits.
    fn try_consume_decimal_integer_literal(&mut self) -> Option<usize> {
        let mut value = None;
        while let Some(digit) = self.peek().and_then(|c| c.to_digit(10)) {
            self.next();
            let acc: usize = value.unwrap_or(0);
            value = Some(acc.saturating_mul(10).saturating_add(digit as usize));
        }
        value
    }

    /// Consume up to \p max_digits digits in the given radix.
    fn consume_digits(&mut self, radix: u32, max_digits: usize) -> Option<u32> {
        let mut result: Option<u32> = None;
        for _ in 0..max_digits {
            match self.peek().and_then(|c| c.to_digit(radix)) {
                Some(digit) => {
                    self.next();
                    result = Some(result.unwrap_or(0).saturating_mul(radix).saturating_add(digit));
                }
                None => break,
            }
        }
        result
    }

    /// Consume an escape which denotes a single character, after the backslash.
    fn consume_character_escape(&mut self) -> Result<u32, Error> {
        let c = match self.next() {
            Some(c) => c,
            None => return error("Missing escape sequence (trailing backslash)"),
        };
        let cp = match c {
            'a' => 0x7,
            'f' => 0xC,
            'n' => 0xA,
            'r' => 0xD,
            't' => 0x9,
            'v' => 0xB,
            '0' => self.consume_digits(8, 2).unwrap_or(0),
            '1'..='9' => return unsupported("Backreferences are not supported"),
            'x' => {
                if self.try_consume('{') {
                    let mut value: u32 = 0;
                    let mut digits = 0;
                    while let Some(d) = self.peek().and_then(|c| c.to_digit(16)) {
                        self.next();
                        digits += 1;
                        value = value.saturating_mul(16).saturating_add(d);
                    }
                    if digits == 0 || !self.try_consume('}') || value > CODE_POINT_MAX {
                        return error("Invalid escape sequence");
                    }
                    value
                } else {
                    let x1 = self.next().and_then(|c| c.to_digit(16));
                    let x2 = self.next().and_then(|c| c.to_digit(16));
                    match (x1, x2) {
                        (Some(x1), Some(x2)) => x1 * 16 + x2,
                        _ => return error("Invalid escape sequence"),
                    }
                }
            }
            'k' => return unsupported("Backreferences are not supported"),
            'p' | 'P' => return unsupported("Unicode property classes are not supported"),
            'C' => return unsupported("Single-byte matching (\\C) is not supported"),
            // Punctuation may always be escaped.
            c if c.is_ascii_punctuation() || c == ' ' => c as u32,
            _ => return error("Invalid escape sequence"),
        };
        Ok(cp)
    }

    fn consume_atom_escape(&mut self) -> Result<ir::Node, Error> {
        let c = match self.peek() {
            Some(c) => c,
            None => return error("Missing escape sequence (trailing backslash)"),
        };
        match c {
            'b' | 'B' => {
                self.consume(c);
                Ok(ir::Node::WordBoundary { invert: c == 'B' })
            }
            'A' => {
                self.consume(c);
                Ok(ir::Node::Anchor(ir::AnchorType::StartOfText))
            }
            'z' => {
                self.consume(c);
                Ok(ir::Node::Anchor(ir::AnchorType::EndOfText))
            }
            c if is_class_escape(c) => {
                self.consume(c);
                Ok(self.make_bracket(false, codepoints_from_class(c)))
            }
            _ => {
                let cp = self.consume_character_escape()?;
                Ok(self.make_char(cp))
            }
        }
    }
}

/// Try parsing a given pattern.
/// Return the resulting IR regex, or an error.
pub fn try_parse(pattern: &str, flags: api::Flags) -> Result<ir::Regex, Error> {
    let mut p = Parser {
        input: pattern.chars().peekable(),
        flags,
        group_count: 0,
        group_names: Vec::new(),
    };
    let mut re = p.try_parse()?;
    // Inline flags do not leak into the compiled regex's flags.
    re.flags = flags;
    Ok(re)
}
