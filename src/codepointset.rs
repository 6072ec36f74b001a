//! Sets of code points, as sorted lists of inclusive intervals.

use core::cmp;

pub type CodePoint = u32;

/// The maximum (inclusive) code point.
pub const CODE_POINT_MAX: CodePoint = 0x10FFFF;

/// An inclusive range of code points.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Interval {
    pub(crate) first: CodePoint,
    pub(crate) last: CodePoint,
}

impl Interval {
    pub(crate) const fn new(first: CodePoint, last: CodePoint) -> Interval {
        debug_assert!(first <= last);
        Interval { first, last }
    }

    /// Return whether self contains a code point \p cp.
    #[inline]
    pub fn contains(self, cp: CodePoint) -> bool {
        self.first <= cp && cp <= self.last
    }

    /// \return the intersection of self and \p other, if they share any code
    /// point.
    fn intersect(self, other: Interval) -> Option<Interval> {
        let first = cmp::max(self.first, other.first);
        let last = cmp::min(self.last, other.last);
        if first <= last {
            Some(Interval { first, last })
        } else {
            None
        }
    }

    /// Return whether \p other overlaps or directly follows self, so that the
    /// two can be replaced by a single interval.
    fn touches(self, other: Interval) -> bool {
        other.first <= self.last.saturating_add(1) && self.first <= other.last.saturating_add(1)
    }
}

/// A set of code points.
/// The intervals are kept sorted, and never overlap or abut.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CodePointSet {
    ivs: Vec<Interval>,
}

impl CodePointSet {
    pub fn new() -> CodePointSet {
        CodePointSet { ivs: Vec::new() }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.ivs.is_empty()
    }

    /// Construct a set containing a single interval.
    pub fn from_interval(first: CodePoint, last: CodePoint) -> CodePointSet {
        CodePointSet {
            ivs: vec![Interval::new(first, last)],
        }
    }

    /// Construct from sorted intervals which neither overlap nor abut.
    pub fn from_sorted_disjoint_intervals(ivs: Vec<Interval>) -> CodePointSet {
        debug_assert!(
            ivs.windows(2)
                .all(|w| w[0].last.saturating_add(1) < w[1].first),
            "Intervals not sorted and disjoint"
        );
        debug_assert!(ivs.iter().all(|iv| iv.first <= iv.last && iv.last <= CODE_POINT_MAX));
        CodePointSet { ivs }
    }

    pub(crate) fn contains(&self, cp: CodePoint) -> bool {
        // The first interval which does not end before cp.
        let idx = self.ivs.partition_point(|iv| iv.last < cp);
        self.ivs.get(idx).map_or(false, |iv| iv.contains(cp))
    }

    /// Add an interval of code points to the set.
    pub fn add(&mut self, new_iv: Interval) {
        debug_assert!(new_iv.first <= new_iv.last && new_iv.last <= CODE_POINT_MAX);
        // Intervals in [start, end) touch new_iv and are absorbed into it.
        let start = self
            .ivs
            .partition_point(|iv| iv.last.saturating_add(1) < new_iv.first);
        let end = start
            + self.ivs[start..]
                .iter()
                .take_while(|iv| iv.touches(new_iv))
                .count();
        if start == end {
            self.ivs.insert(start, new_iv);
            return;
        }
        let merged = Interval {
            first: cmp::min(self.ivs[start].first, new_iv.first),
            last: cmp::max(self.ivs[end - 1].last, new_iv.last),
        };
        self.ivs[start] = merged;
        self.ivs.drain(start + 1..end);
    }

    /// Add a single code point to the set.
    #[inline]
    pub fn add_one(&mut self, cp: CodePoint) {
        self.add(Interval::new(cp, cp))
    }

    /// Add another code point set.
    pub fn add_set(&mut self, mut rhs: CodePointSet) {
        // Add the smaller set to the larger.
        if self.ivs.len() < rhs.ivs.len() {
            core::mem::swap(self, &mut rhs);
        }
        for iv in rhs.ivs {
            self.add(iv)
        }
    }

    /// \return the intervals, in ascending order.
    pub fn intervals(&self) -> &[Interval] {
        &self.ivs
    }

    /// \return a set containing every code point NOT in the receiver.
    pub fn inverted(&self) -> CodePointSet {
        let mut ivs = Vec::with_capacity(self.ivs.len() + 1);
        // The first code point after the previous interval.
        let mut next: CodePoint = 0;
        for iv in &self.ivs {
            if next < iv.first {
                ivs.push(Interval::new(next, iv.first - 1));
            }
            next = iv.last + 1;
        }
        if next <= CODE_POINT_MAX {
            ivs.push(Interval::new(next, CODE_POINT_MAX));
        }
        CodePointSet::from_sorted_disjoint_intervals(ivs)
    }

    /// Restrict the set to code points within \p bounds.
    pub(crate) fn clip(&self, bounds: Interval) -> CodePointSet {
        let ivs = self.ivs.iter().filter_map(|iv| iv.intersect(bounds)).collect();
        CodePointSet::from_sorted_disjoint_intervals(ivs)
    }
}
