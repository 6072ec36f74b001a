use crate::emit;
use crate::exec;
use crate::indexing::{Haystack, Subject};
use crate::insn::Program;
use crate::parse;
use crate::pikevm;
use core::{fmt, str::FromStr};
use std::sync::Arc;

pub use parse::{Error, ErrorKind};

/// Flags used to control regex parsing and matching.
/// The default flags are case-sensitive, not-multiline, UTF-8 and
/// leftmost-first.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct Flags {
    /// If set, make the regex case-insensitive, using simple Unicode case
    /// folding.
    pub icase: bool,

    /// If set, ^ and $ also match just after and just before a `\n`.
    pub multiline: bool,

    /// If set, . matches `\n` as well as any other character.
    pub dot_all: bool,

    /// If set, one byte is one character: code points above 0xFF in the
    /// pattern can never match, and text subjects are searched as Latin-1.
    pub latin1: bool,

    /// If set, find the leftmost-longest match instead of the leftmost-first.
    pub longest: bool,

    /// If set, quantifiers are lazy by default and `?` makes them greedy.
    pub ungreedy: bool,

    /// If set, the whole pattern is matched as a literal string.
    pub literal: bool,

    /// If set, only the overall match is recorded. Parentheses do not capture.
    pub single_capture: bool,

    /// The maximum size of the compiled program in bytes.
    /// None means [`DEFAULT_SIZE_LIMIT`](crate::DEFAULT_SIZE_LIMIT).
    pub size_limit: Option<usize>,
}

impl Flags {
    /// Construct a Flags from a sequence of flag letters.
    /// 'i' means to ignore case, 'm' multiline, 's' dot-all, 'U' ungreedy,
    /// 'l' latin1, 'L' longest, 'q' literal and 'c' single capture.
    /// Other letters are ignored.
    #[inline]
    pub fn new<T: Iterator<Item = char>>(chars: T) -> Self {
        let mut result = Self::default();
        for c in chars {
            match c {
                'i' => result.icase = true,
                'm' => result.multiline = true,
                's' => result.dot_all = true,
                'U' => result.ungreedy = true,
                'l' => result.latin1 = true,
                'L' => result.longest = true,
                'q' => result.literal = true,
                'c' => result.single_capture = true,
                _ => {
                    // Silently skip unsupported flags.
                }
            }
        }
        result
    }
}

impl From<&str> for Flags {
    /// Construct a Flags from a string of flag letters.
    ///
    /// See also: [`Flags::new`].
    #[inline]
    fn from(s: &str) -> Self {
        Self::new(s.chars())
    }
}

impl fmt::Display for Flags {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let letters = [
            (self.icase, 'i'),
            (self.multiline, 'm'),
            (self.dot_all, 's'),
            (self.ungreedy, 'U'),
            (self.latin1, 'l'),
            (self.longest, 'L'),
            (self.literal, 'q'),
            (self.single_capture, 'c'),
        ];
        for (set, letter) in letters {
            if set {
                write!(f, "{}", letter)?;
            }
        }
        Ok(())
    }
}

/// Range is used to express the extent of a match, as indexes into the
/// subject in its native units.
pub type Range = core::ops::Range<usize>;

/// An iterator type which yields `Match`es found in a subject.
pub type Matches<'r, 't, T> = exec::Matches<'r, 't, T>;

/// A Match represents a portion of a subject which was found to match a Regex.
pub struct Match<'t, T: Subject + ?Sized> {
    subject: &'t T,

    /// The total range of the match. Note this may be empty, if the regex
    /// matched an empty string.
    pub range: Range,

    /// The list of captures. This has length equal to the number of capturing
    /// groups in the regex. For each capture, if the value is None, that group
    /// did not participate in the match (for example, it was in a not-taken
    /// branch of an alternation). If the value is Some, the group matched the
    /// enclosed range, which may be empty.
    pub captures: Vec<Option<Range>>,

    // Capture group names, in the same order as `captures`.
    // Groups without names have an empty string.
    group_names: Arc<[Box<str>]>,
}

impl<'t, T: Subject + ?Sized> Match<'t, T> {
    /// Build a match from capture slots in haystack byte offsets.
    pub(crate) fn from_slots(
        subject: &'t T,
        hay: &Haystack,
        slots: &[Option<usize>],
        group_names: &Arc<[Box<str>]>,
    ) -> Self {
        let mut pairs = slots.chunks_exact(2).map(|pair| match (pair[0], pair[1]) {
            (Some(start), Some(end)) => Some(hay.range_to_native(start..end)),
            _ => None,
        });
        let range = match pairs.next() {
            Some(Some(range)) => range,
            _ => panic!("Match without group 0"),
        };
        Self {
            subject,
            range,
            captures: pairs.collect(),
            group_names: Arc::clone(group_names),
        }
    }

    /// Access a group by index, using the convention of Python's group()
    /// function. Index 0 is the total match, index 1 is the first capture
    /// group. Returns None for a group that did not participate, or an index
    /// that is out of range.
    #[inline]
    pub fn group(&self, idx: usize) -> Option<Range> {
        if idx == 0 {
            Some(self.range.clone())
        } else {
            self.captures.get(idx - 1).cloned().flatten()
        }
    }

    /// Access a named group by name.
    #[inline]
    pub fn named_group(&self, name: &str) -> Option<Range> {
        // Empty strings are used as sentinels to indicate unnamed group.
        if name.is_empty() {
            return None;
        }
        let pos = self.group_names.iter().position(|s| s.as_ref() == name)?;
        self.captures[pos].clone()
    }

    /// \return the matched part of the subject for a group.
    #[inline]
    pub fn group_slice(&self, idx: usize) -> Option<&'t T::Native> {
        let subject = self.subject;
        self.group(idx).map(|range| subject.native_slice(range))
    }

    /// Return an iterator over the named groups of a Match.
    #[inline]
    pub fn named_groups(&self) -> NamedGroups<'_, 't, T> {
        NamedGroups {
            groups: self.groups(),
        }
    }

    /// Returns the range over the starting and ending offsets of the match in
    /// the subject.
    ///
    /// This is a convenience function to work around
    /// the fact that Range does not support Copy.
    #[inline]
    pub fn range(&self) -> Range {
        self.range.clone()
    }

    /// Returns the starting offset of the match in the subject.
    #[inline]
    pub fn start(&self) -> usize {
        self.range.start
    }

    /// Returns the ending offset of the match in the subject.
    #[inline]
    pub fn end(&self) -> usize {
        self.range.end
    }

    /// Returns the length of the match in native units.
    #[inline]
    pub fn len(&self) -> usize {
        self.range.len()
    }

    /// Returns whether the match is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }

    /// Returns the matched part of the subject.
    #[inline]
    pub fn as_slice(&self) -> &'t T::Native {
        self.subject.native_slice(self.range())
    }

    /// Return an iterator over a Match. The first returned value is the total
    /// match, and subsequent values represent the capture groups.
    #[inline]
    pub fn groups(&self) -> Groups<'_, 't, T> {
        Groups { mat: self, i: 0 }
    }
}

impl<T: Subject + ?Sized> Clone for Match<'_, T> {
    fn clone(&self) -> Self {
        Self {
            subject: self.subject,
            range: self.range.clone(),
            captures: self.captures.clone(),
            group_names: Arc::clone(&self.group_names),
        }
    }
}

impl<T: Subject + ?Sized> fmt::Debug for Match<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Match")
            .field("range", &self.range)
            .field("captures", &self.captures)
            .finish()
    }
}

/// A capture group of a [`Match`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group<'m> {
    /// The group's index. Group 0 is the whole match.
    pub index: usize,

    /// The group's name, if it has one.
    pub name: Option<&'m str>,

    /// The range the group matched, or None if it did not participate.
    pub range: Option<Range>,
}

/// An iterator over the capture groups of a [`Match`]
///
/// This struct is created by the [`groups`] method on [`Match`].
///
/// [`Match`]: ../struct.Match.html
/// [`groups`]: ../struct.Match.html#method.groups
pub struct Groups<'m, 't, T: Subject + ?Sized> {
    mat: &'m Match<'t, T>,
    i: usize,
}

impl<'m, 't, T: Subject + ?Sized> Iterator for Groups<'m, 't, T> {
    type Item = Group<'m>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let index = self.i;
        if index > self.mat.captures.len() {
            return None;
        }
        self.i += 1;
        let name = match index {
            0 => None,
            _ => self
                .mat
                .group_names
                .get(index - 1)
                .map(|n| n.as_ref())
                .filter(|n| !n.is_empty()),
        };
        Some(Group {
            index,
            name,
            range: self.mat.group(index),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.mat.captures.len() + 1).saturating_sub(self.i);
        (remaining, Some(remaining))
    }
}

impl<T: Subject + ?Sized> ExactSizeIterator for Groups<'_, '_, T> {}

/// An iterator over the named capture groups of a [`Match`]
///
/// This struct is created by the [`named_groups`] method on [`Match`].
///
/// [`Match`]: ../struct.Match.html
/// [`named_groups`]: ../struct.Match.html#method.named_groups
pub struct NamedGroups<'m, 't, T: Subject + ?Sized> {
    groups: Groups<'m, 't, T>,
}

impl<'m, 't, T: Subject + ?Sized> Iterator for NamedGroups<'m, 't, T> {
    type Item = Group<'m>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.groups.find(|group| group.name.is_some())
    }
}

/// A Regex is the compiled version of a pattern.
///
/// A Regex is immutable and may be shared freely between threads.
#[derive(Debug, Clone)]
pub struct Regex {
    pattern: Box<str>,
    prog: Program,
}

impl Regex {
    /// Construct a regex by parsing `pattern` using the default flags.
    /// An Error may be returned if the syntax is invalid.
    /// Note that this is rather expensive; prefer to cache a Regex which is
    /// intended to be used more than once.
    #[inline]
    pub fn new(pattern: &str) -> Result<Regex, Error> {
        Self::with_flags(pattern, Flags::default())
    }

    /// Construct a regex by parsing `pattern` with `flags`.
    /// An Error may be returned if the syntax is invalid, or if the compiled
    /// program would exceed the size limit.
    pub fn with_flags<F>(pattern: &str, flags: F) -> Result<Regex, Error>
    where
        F: Into<Flags>,
    {
        let ire = parse::try_parse(pattern, flags.into())?;
        let prog = emit::emit(&ire)?;
        Ok(Regex {
            pattern: pattern.into(),
            prog,
        })
    }

    /// Returns the pattern this regex was compiled from.
    #[inline]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Returns the flags this regex was compiled with.
    #[inline]
    pub fn flags(&self) -> Flags {
        self.prog.flags
    }

    /// Returns the number of capture groups, including the implicit group 0.
    #[inline]
    pub fn num_captures(&self) -> usize {
        self.prog.num_captures()
    }

    /// Returns the index of the group with the given name.
    #[inline]
    pub fn group_index_for_name(&self, name: &str) -> Option<usize> {
        self.prog.group_index_for_name(name)
    }

    /// Returns the named groups as (index, name) pairs, in index order.
    pub fn group_names(&self) -> impl Iterator<Item = (usize, &str)> + '_ {
        self.prog
            .group_names
            .iter()
            .enumerate()
            .filter(|(_, name)| !name.is_empty())
            .map(|(idx, name)| (idx + 1, name.as_ref()))
    }

    /// Returns whether the regex matches anywhere in `subject`.
    #[inline]
    pub fn is_match<T: Subject + ?Sized>(&self, subject: &T) -> bool {
        self.is_match_at(subject, 0)
    }

    /// Returns whether the regex matches at or after `start`, given in the
    /// subject's native units. Assertions still see the text before `start`.
    /// Returns false if `start` is beyond the end of the subject.
    ///
    ///  ```rust
    ///   use relinear::Regex;
    ///   let re = Regex::new(r"\d").unwrap();
    ///   assert!(re.is_match_at("1a", 0));
    ///   assert!(!re.is_match_at("1a", 1));
    ///   assert!(!re.is_match_at("1a", 3));
    ///  ```
    pub fn is_match_at<T: Subject + ?Sized>(&self, subject: &T, start: usize) -> bool {
        let hay = subject.haystack(self.prog.flags.latin1);
        match hay.to_byte(start) {
            Some(byte_start) => {
                let mut cache = pikevm::Cache::new(&self.prog);
                pikevm::is_match(&self.prog, hay.bytes(), hay.is_utf8(), byte_start, &mut cache)
            }
            None => false,
        }
    }

    /// Searches `subject` to find the first match.
    #[inline]
    pub fn find<'t, T: Subject + ?Sized>(&self, subject: &'t T) -> Option<Match<'t, T>> {
        self.find_at(subject, 0)
    }

    /// Searches `subject` to find the first match starting at or after
    /// `start`, given in the subject's native units. Assertions still see the
    /// text before `start`.
    /// Returns None if `start` is beyond the end of the subject.
    ///
    ///  ```rust
    ///   use relinear::Regex;
    ///   let re = Regex::new(r"\bfoo").unwrap();
    ///   assert!(re.find_at("afoo foo", 1).unwrap().range() == (5..8));
    ///   assert!(re.find(&"afoo foo"[1..]).unwrap().range() == (0..3));
    ///  ```
    pub fn find_at<'t, T: Subject + ?Sized>(&self, subject: &'t T, start: usize) -> Option<Match<'t, T>> {
        let hay = subject.haystack(self.prog.flags.latin1);
        let byte_start = hay.to_byte(start)?;
        let mut cache = pikevm::Cache::new(&self.prog);
        let slots = pikevm::run(&self.prog, hay.bytes(), hay.is_utf8(), byte_start, false, &mut cache)?;
        Some(Match::from_slots(
            subject,
            &hay,
            &slots,
            &self.prog.group_names,
        ))
    }

    /// Searches `subject`, returning a lazy iterator over non-overlapping
    /// matches. Note that the resulting Iterator borrows both the regex `'r`
    /// and the subject `'t`. Calling `find_iter` again starts over.
    #[inline]
    pub fn find_iter<'r, 't, T: Subject + ?Sized>(&'r self, subject: &'t T) -> Matches<'r, 't, T> {
        self.find_iter_at(subject, 0)
    }

    /// Like `find_iter`, but the first match starts at or after `start`, given
    /// in the subject's native units. The iterator is empty if `start` is
    /// beyond the end of the subject.
    ///
    ///  ```rust
    ///   use relinear::Regex;
    ///   let re = Regex::new(r"\w+").unwrap();
    ///   let words: Vec<_> = re.find_iter_at("one two three", 2).map(|m| m.range()).collect();
    ///   assert_eq!(words, vec![2..3, 4..7, 8..13]);
    ///  ```
    #[inline]
    pub fn find_iter_at<'r, 't, T: Subject + ?Sized>(
        &'r self,
        subject: &'t T,
        start: usize,
    ) -> Matches<'r, 't, T> {
        exec::Matches::new(&self.prog, subject, start)
    }
}

impl FromStr for Regex {
    type Err = Error;

    /// Attempts to parse a string into a regular expression
    #[inline]
    fn from_str(s: &str) -> Result<Self, Error> {
        Self::new(s)
    }
}

impl fmt::Display for Regex {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.pattern)
    }
}

// Access to the compiler phases and the engine, for the tool and tests.
#[doc(hidden)]
pub mod backends {
    pub use crate::emit::emit;
    pub use crate::insn::Program;
    pub use crate::ir::Regex as Ir;
    pub use crate::parse::try_parse;
    pub use crate::pikevm::{run, Cache};

    /// Returns the compiled program of a regex.
    pub fn program(re: &super::Regex) -> &Program {
        &re.prog
    }
}
