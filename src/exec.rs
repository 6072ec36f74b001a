//! Execution engine bits.

use crate::api::Match;
use crate::indexing::{Haystack, Subject};
use crate::insn::Program;
use crate::pikevm::{self, Cache};
use crate::types::Slots;
use core::iter::FusedIterator;

/// Finds successive matches of a program in a haystack.
/// Offsets going in and out are haystack byte offsets.
#[derive(Debug)]
pub struct Searcher<'r, 'h> {
    prog: &'r Program,
    hay: Haystack<'h>,
    cache: Cache,
}

impl<'r, 'h> Searcher<'r, 'h> {
    pub fn new(prog: &'r Program, hay: Haystack<'h>) -> Self {
        Self {
            prog,
            hay,
            cache: Cache::new(prog),
        }
    }

    #[inline]
    pub fn haystack(&self) -> &Haystack<'h> {
        &self.hay
    }

    /// Attempt to match at or after \p pos.
    /// \return the capture slots of the match, and set \p next_start to the
    /// position to look for the next match (None if there is none).
    /// An empty match moves the next start forward by one character.
    pub fn next_match(&mut self, pos: usize, next_start: &mut Option<usize>) -> Option<Slots> {
        let slots = pikevm::run(
            self.prog,
            self.hay.bytes(),
            self.hay.is_utf8(),
            pos,
            false,
            &mut self.cache,
        )?;
        let (start, end) = match (slots[0], slots[1]) {
            (Some(start), Some(end)) => (start, end),
            _ => panic!("Match without group 0"),
        };
        *next_start = if end != start {
            Some(end)
        } else {
            self.hay.next_char(end)
        };
        Some(slots)
    }
}

/// An iterator over the non-overlapping matches of a regex in a subject.
///
/// The iterator is lazy: each call to `next` resumes where the previous match
/// ended. It owns its scratch space, so iterating does not allocate per match
/// beyond the `Match` itself.
#[derive(Debug)]
pub struct Matches<'r, 't, T: Subject + ?Sized> {
    subject: &'t T,
    searcher: Searcher<'r, 't>,
    offset: Option<usize>,
}

impl<'r, 't, T: Subject + ?Sized> Matches<'r, 't, T> {
    /// \p start is in native units; past the end, the iterator is empty.
    pub(crate) fn new(prog: &'r Program, subject: &'t T, start: usize) -> Self {
        let hay = subject.haystack(prog.flags.latin1);
        let offset = hay.to_byte(start);
        Self {
            subject,
            searcher: Searcher::new(prog, hay),
            offset,
        }
    }
}

impl<'r, 't, T: Subject + ?Sized> Iterator for Matches<'r, 't, T> {
    type Item = Match<'t, T>;

    fn next(&mut self) -> Option<Self::Item> {
        let start = self.offset?;
        match self.searcher.next_match(start, &mut self.offset) {
            Some(slots) => Some(Match::from_slots(
                self.subject,
                self.searcher.haystack(),
                &slots,
                &self.searcher.prog.group_names,
            )),
            None => {
                self.offset = None;
                None
            }
        }
    }
}

impl<'r, 't, T: Subject + ?Sized> FusedIterator for Matches<'r, 't, T> {}
