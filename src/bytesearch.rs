//! Scanning byte subjects for the places a match could begin.

use core::fmt;
use memchr::memmem;

/// Something which can locate its next occurrence in a byte slice.
pub trait ByteSearcher {
    /// \return the index of the first byte in \p hay at which we occur, or None.
    /// \p hay may be empty.
    fn find_in(&self, hay: &[u8]) -> Option<usize>;
}

// Small sets of bytes go straight to memchr.
impl ByteSearcher for [u8; 1] {
    #[inline(always)]
    fn find_in(&self, hay: &[u8]) -> Option<usize> {
        memchr::memchr(self[0], hay)
    }
}

impl ByteSearcher for [u8; 2] {
    #[inline(always)]
    fn find_in(&self, hay: &[u8]) -> Option<usize> {
        let [b0, b1] = *self;
        memchr::memchr2(b0, b1, hay)
    }
}

impl ByteSearcher for [u8; 3] {
    #[inline(always)]
    fn find_in(&self, hay: &[u8]) -> Option<usize> {
        let [b0, b1, b2] = *self;
        memchr::memchr3(b0, b1, b2, hay)
    }
}

impl ByteSearcher for memmem::Finder<'_> {
    #[inline(always)]
    fn find_in(&self, hay: &[u8]) -> Option<usize> {
        self.find(hay)
    }
}

/// A set of bytes, one bit per byte value.
#[derive(Default, Copy, Clone, PartialEq, Eq)]
pub struct ByteBitmap([u64; 4]);

impl ByteBitmap {
    /// Construct a bitmap holding exactly \p bytes.
    pub fn new(bytes: &[u8]) -> ByteBitmap {
        let mut bm = ByteBitmap::default();
        bytes.iter().for_each(|&b| bm.set(b));
        bm
    }

    #[inline(always)]
    fn word_and_mask(b: u8) -> (usize, u64) {
        ((b >> 6) as usize, 1u64 << (b & 63))
    }

    /// \return whether \p b is in the set.
    #[inline(always)]
    pub fn contains(&self, b: u8) -> bool {
        let (word, mask) = Self::word_and_mask(b);
        self.0[word] & mask != 0
    }

    /// Add \p b to the set.
    #[inline(always)]
    pub fn set(&mut self, b: u8) {
        let (word, mask) = Self::word_and_mask(b);
        self.0[word] |= mask;
    }

    /// Add every byte in \p first..=\p last.
    pub fn set_range(&mut self, first: u8, last: u8) {
        (first..=last).for_each(|b| self.set(b))
    }

    /// Add every byte of \p rhs.
    pub fn bitor(&mut self, rhs: &ByteBitmap) {
        for (lhs, rhs) in self.0.iter_mut().zip(rhs.0.iter()) {
            *lhs |= *rhs;
        }
    }

    /// \return the bytes in the set, ascending.
    #[allow(clippy::wrong_self_convention)]
    pub fn to_vec(&self) -> Vec<u8> {
        (0..=u8::MAX).filter(|&b| self.contains(b)).collect()
    }
}

impl ByteSearcher for ByteBitmap {
    #[inline(always)]
    fn find_in(&self, hay: &[u8]) -> Option<usize> {
        hay.iter().position(|&b| self.contains(b))
    }
}

impl fmt::Debug for ByteBitmap {
    // Runs of bytes print as ranges, e.g. ByteBitmap[1-3 7 255].
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bytes = self.to_vec();
        let mut runs: Vec<(u8, u8)> = Vec::new();
        for b in bytes {
            match runs.last_mut() {
                Some((_, last)) if *last as u16 + 1 == b as u16 => *last = b,
                _ => runs.push((b, b)),
            }
        }
        f.write_str("ByteBitmap[")?;
        for (idx, (first, last)) in runs.into_iter().enumerate() {
            if idx > 0 {
                f.write_str(" ")?;
            }
            if first == last {
                write!(f, "{}", first)?;
            } else {
                write!(f, "{}-{}", first, last)?;
            }
        }
        f.write_str("]")
    }
}
