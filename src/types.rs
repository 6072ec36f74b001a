use crate::codepointset::{CodePointSet, Interval};
use core::fmt;

/// A group index is u16.
/// CaptureGroupID 0 corresponds to the first capture group.
pub type CaptureGroupID = u16;

/// The name of a named capture group.
pub type CaptureGroupName = String;

/// The maximum number of capture groups supported.
pub const MAX_CAPTURE_GROUPS: usize = 65535;

/// The maximum count in a counted repetition like {3,5}.
pub const MAX_REPETITION: usize = 1000;

/// An instruction pointer.
pub type IP = usize;

/// The stuff in a bracket.
#[derive(Debug, Clone, Default)]
pub struct BracketContents {
    pub invert: bool,
    pub cps: CodePointSet,
}

impl BracketContents {
    /// \return the set of code points matched by the bracket, respecting 'invert'.
    pub fn code_points(&self) -> CodePointSet {
        if self.invert {
            self.cps.inverted()
        } else {
            self.cps.clone()
        }
    }
}

impl fmt::Display for BracketContents {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[")?;
        if self.invert {
            write!(f, "^")?;
        }
        for &Interval { first, last } in self.cps.intervals() {
            if first == last {
                write!(f, "\\x{{{:X}}}", first)?;
            } else {
                write!(f, "\\x{{{:X}}}-\\x{{{:X}}}", first, last)?;
            }
        }
        write!(f, "]")
    }
}

/// The values recorded for capture groups during a match.
/// Slot 2i is the start of group i, and 2i + 1 is its end; group 0 is the
/// whole match. None means the slot is unset.
pub type Slots = Vec<Option<usize>>;
