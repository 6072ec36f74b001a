//! Instructions for a compiled regex program
use crate::api;
use crate::bytesearch::{ByteBitmap, ByteSearcher};
use crate::types::IP;
use core::fmt;
use memchr::memmem;
use std::sync::Arc;

/// A closed range of bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u8,
    pub end: u8,
}

impl ByteRange {
    #[inline]
    pub fn new(start: u8, end: u8) -> Self {
        assert!(start <= end);
        Self { start, end }
    }

    #[inline(always)]
    pub fn contains(self, b: u8) -> bool {
        self.start <= b && b <= self.end
    }
}

impl fmt::Display for ByteRange {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{:#04X}", self.start)
        } else {
            write!(f, "{:#04X}-{:#04X}", self.start, self.end)
        }
    }
}

/// A zero-width condition on the position between two bytes.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Look {
    StartOfText,
    EndOfText,
    StartOfLine,
    EndOfLine,
    WordBoundary,
    NotWordBoundary,
}

/// The list of program instructions.
/// Instructions which do not name a successor continue at the next instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Insn {
    /// The match was successful.
    Goal,

    /// Match a single byte.
    Byte(u8),

    /// Match a byte in an inclusive range.
    ByteRange(ByteRange),

    /// Set the IP to a new value.
    Jump { target: IP },

    /// Fork. The primary branch has priority over the secondary.
    Split { primary: IP, secondary: IP },

    /// Record the current position in a capture slot.
    Save(usize),

    /// Continue only if the condition holds at the current position.
    Assert(Look),

    /// An instruction that always fails, which may be produced in weird cases
    /// like an inverted bracket which matches everything.
    JustFail,
}

/// The peeled prefix start predicate.
/// This is a fast way of locating the first potential match.
#[derive(Debug, Clone)]
pub enum StartPredicate {
    /// May match an arbitrary sequence.
    Arbitrary,

    /// Look for the first instance of any of the given bytes.
    ByteSet1([u8; 1]),
    ByteSet2([u8; 2]),
    ByteSet3([u8; 3]),

    /// Look for a byte sequence.
    ByteSeq(Box<memmem::Finder<'static>>),

    /// Look for a byte which matches the bitmap.
    ByteBracket(ByteBitmap),

    /// The regex is anchored to the start of the text.
    /// This avoids string searching entirely and only tries matching at the beginning.
    StartAnchored,
}

impl StartPredicate {
    /// \return the offset of the first position in \p bytes at which a match
    /// could begin, or None if there is none.
    #[inline]
    pub fn find_in(&self, bytes: &[u8]) -> Option<usize> {
        match self {
            StartPredicate::Arbitrary | StartPredicate::StartAnchored => Some(0),
            StartPredicate::ByteSet1(set) => set.find_in(bytes),
            StartPredicate::ByteSet2(set) => set.find_in(bytes),
            StartPredicate::ByteSet3(set) => set.find_in(bytes),
            StartPredicate::ByteSeq(finder) => finder.find_in(bytes),
            StartPredicate::ByteBracket(bitmap) => bitmap.find_in(bytes),
        }
    }
}

/// A compiled regex program.
/// The program is never modified after it is emitted.
#[derive(Debug, Clone)]
pub struct Program {
    /// The instructions. Execution starts at index 0.
    pub insns: Vec<Insn>,

    /// How to find the first possible match position.
    pub start_pred: StartPredicate,

    /// The number of explicit capture groups.
    pub groups: usize,

    /// Names of capture groups, indexed by explicit group ID.
    /// Unnamed groups have an empty name.
    pub group_names: Arc<[Box<str>]>,

    /// Flags the program was compiled with.
    pub flags: api::Flags,
}

impl Program {
    /// \return the number of capture groups, including the implicit group 0.
    pub fn num_captures(&self) -> usize {
        self.groups + 1
    }

    /// \return the number of capture slots: two per group.
    pub fn num_slots(&self) -> usize {
        2 * self.num_captures()
    }

    /// \return the index of the group with the given name, counting group 0.
    pub fn group_index_for_name(&self, name: &str) -> Option<usize> {
        if name.is_empty() {
            return None;
        }
        self.group_names
            .iter()
            .position(|n| n.as_ref() == name)
            .map(|idx| idx + 1)
    }

    /// \return whether the program can only match at the start of the text.
    pub fn is_start_anchored(&self) -> bool {
        matches!(self.start_pred, StartPredicate::StartAnchored)
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "start: {:?}", self.start_pred)?;
        for (ip, insn) in self.insns.iter().enumerate() {
            write!(f, "{:>4}: ", ip)?;
            match insn {
                Insn::Goal => writeln!(f, "Goal")?,
                Insn::Byte(b) => writeln!(f, "Byte {:#04X}", b)?,
                Insn::ByteRange(range) => writeln!(f, "ByteRange {}", range)?,
                Insn::Jump { target } => writeln!(f, "Jump {}", target)?,
                Insn::Split { primary, secondary } => {
                    writeln!(f, "Split {}, {}", primary, secondary)?
                }
                Insn::Save(slot) => writeln!(f, "Save {}", slot)?,
                Insn::Assert(look) => writeln!(f, "Assert {:?}", look)?,
                Insn::JustFail => writeln!(f, "JustFail")?,
            }
        }
        Ok(())
    }
}
