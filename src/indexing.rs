//! Subjects: the things a regex can be run against.
//!
//! The engine only ever sees bytes. Text subjects are encoded to UTF-8 (or to
//! Latin-1 in latin1 mode) once, alongside an OffsetTable which translates
//! between byte offsets and the subject's native code units.

use crate::util::is_utf8_continuation;
use std::borrow::Cow;
use std::cell::OnceCell;
use std::fmt;
use std::ops::Range;

/// Marks an offset which is not the start of a character.
const NOT_A_BOUNDARY: usize = usize::MAX;

/// The character substituted for code points which Latin-1 cannot represent.
const LATIN1_REPLACEMENT: u8 = b'?';

/// Translates between byte offsets in an encoded haystack and offsets in the
/// code units of the subject it was encoded from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OffsetTable {
    /// Indexed by byte offset, length bytes + 1.
    to_native: Vec<usize>,

    /// Indexed by native offset, length units + 1.
    /// Offsets inside a multi-unit character round up to the next character.
    to_byte: Vec<usize>,
}

impl OffsetTable {
    fn with_capacity(bytes: usize, units: usize) -> Self {
        Self {
            to_native: Vec::with_capacity(bytes + 1),
            to_byte: Vec::with_capacity(units + 1),
        }
    }

    /// Record a character of \p nbytes bytes and \p nunits units, which starts
    /// at byte \p byte_pos and unit \p unit_pos.
    fn push_char(&mut self, byte_pos: usize, unit_pos: usize, nbytes: usize, nunits: usize) {
        debug_assert!(nbytes > 0 && nunits > 0);
        self.to_native.push(unit_pos);
        self.to_native
            .extend(core::iter::repeat(NOT_A_BOUNDARY).take(nbytes - 1));
        self.to_byte.push(byte_pos);
        self.to_byte
            .extend(core::iter::repeat(byte_pos + nbytes).take(nunits - 1));
    }

    fn finish(&mut self, byte_len: usize, unit_len: usize) {
        self.to_native.push(unit_len);
        self.to_byte.push(byte_len);
    }

    /// \return the native offset of byte offset \p byte.
    /// Panics if \p byte is inside a character: the engine only reports
    /// offsets on character boundaries.
    #[inline]
    pub fn to_native(&self, byte: usize) -> usize {
        let native = self.to_native[byte];
        assert!(
            native != NOT_A_BOUNDARY,
            "Byte offset {} is not on a character boundary",
            byte
        );
        native
    }

    /// \return the byte offset of native offset \p native.
    #[inline]
    pub fn to_byte(&self, native: usize) -> usize {
        self.to_byte[native]
    }

    /// \return the number of native units.
    pub fn native_len(&self) -> usize {
        self.to_byte.len() - 1
    }
}

/// An encoded haystack, with bytes owned by itself.
#[derive(Debug, Clone)]
pub struct Encoded {
    bytes: Vec<u8>,
    table: OffsetTable,
}

impl Encoded {
    /// Encode a sequence of characters, each spanning some number of native
    /// units. In latin1 mode each character becomes one byte.
    fn new<I>(chars: I, unit_len: usize, latin1: bool) -> Self
    where
        I: Iterator<Item = (char, usize)>,
    {
        let mut bytes = Vec::with_capacity(unit_len);
        let mut table = OffsetTable::with_capacity(unit_len, unit_len);
        let mut unit_pos = 0;
        for (c, nunits) in chars {
            let byte_pos = bytes.len();
            if latin1 {
                bytes.push(u8::try_from(u32::from(c)).unwrap_or(LATIN1_REPLACEMENT));
            } else {
                let mut buf = [0; 4];
                bytes.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
            }
            table.push_char(byte_pos, unit_pos, bytes.len() - byte_pos, nunits);
            unit_pos += nunits;
        }
        debug_assert_eq!(unit_pos, unit_len, "Units not fully consumed");
        table.finish(bytes.len(), unit_pos);
        Self { bytes, table }
    }

    fn as_haystack(&self, latin1: bool) -> Haystack<'_> {
        Haystack {
            bytes: Cow::Borrowed(&self.bytes),
            table: Some(Cow::Borrowed(&self.table)),
            utf8: !latin1,
        }
    }
}

/// The bytes the engine runs over, plus what is needed to report offsets in
/// the subject's native units.
#[derive(Debug, Clone)]
pub struct Haystack<'h> {
    bytes: Cow<'h, [u8]>,

    /// None if native offsets are byte offsets.
    table: Option<Cow<'h, OffsetTable>>,

    /// Whether the bytes are known to be valid UTF-8, so that advancing by a
    /// character skips continuation bytes.
    utf8: bool,
}

impl<'h> Haystack<'h> {
    /// A haystack whose native units are its bytes.
    pub fn from_bytes(bytes: &'h [u8], utf8: bool) -> Self {
        Self {
            bytes: Cow::Borrowed(bytes),
            table: None,
            utf8,
        }
    }

    fn from_encoded(enc: Encoded, latin1: bool) -> Self {
        Self {
            bytes: Cow::Owned(enc.bytes),
            table: Some(Cow::Owned(enc.table)),
            utf8: !latin1,
        }
    }

    #[inline]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// \return whether the bytes are UTF-8 which matches must not split.
    #[inline]
    pub fn is_utf8(&self) -> bool {
        self.utf8
    }

    /// \return the length in native units.
    pub fn native_len(&self) -> usize {
        match &self.table {
            Some(table) => table.native_len(),
            None => self.bytes.len(),
        }
    }

    /// Convert a byte offset to a native offset.
    #[inline]
    pub fn to_native(&self, byte: usize) -> usize {
        match &self.table {
            Some(table) => table.to_native(byte),
            None => byte,
        }
    }

    /// Convert a byte range to a native range.
    pub fn range_to_native(&self, range: Range<usize>) -> Range<usize> {
        self.to_native(range.start)..self.to_native(range.end)
    }

    /// Convert a native offset to a byte offset, rounding up to the next
    /// character if the offset is inside one.
    /// \return None if \p native is past the end.
    pub fn to_byte(&self, native: usize) -> Option<usize> {
        if native > self.native_len() {
            return None;
        }
        Some(match &self.table {
            Some(table) => table.to_byte(native),
            None if self.utf8 => self.char_boundary_at_or_after(native),
            None => native,
        })
    }

    fn char_boundary_at_or_after(&self, mut pos: usize) -> usize {
        while pos < self.bytes.len() && is_utf8_continuation(self.bytes[pos]) {
            pos += 1;
        }
        pos
    }

    /// \return the byte offset one character after \p pos, or None if \p pos
    /// is at the end.
    pub fn next_char(&self, pos: usize) -> Option<usize> {
        if pos >= self.bytes.len() {
            None
        } else if self.utf8 {
            Some(self.char_boundary_at_or_after(pos + 1))
        } else {
            Some(pos + 1)
        }
    }
}

mod private {
    pub trait Sealed {}
    impl Sealed for str {}
    impl Sealed for [u8] {}
    impl<U: super::CodeUnit> Sealed for super::Text<'_, U> {}
    impl Sealed for u16 {}
    impl Sealed for char {}
}

/// Something a regex can search.
///
/// Match offsets are reported in the subject's native units: bytes for `str`
/// and `[u8]`, code units for [`Text`].
pub trait Subject: private::Sealed {
    /// The slice type produced by [`crate::Match::as_slice`].
    type Native: ?Sized;

    /// \return the haystack for this subject, encoded for the given mode.
    #[doc(hidden)]
    fn haystack(&self, latin1: bool) -> Haystack<'_>;

    /// \return the native slice for a range of native offsets.
    #[doc(hidden)]
    fn native_slice(&self, range: Range<usize>) -> &Self::Native;
}

impl Subject for [u8] {
    type Native = [u8];

    fn haystack(&self, _latin1: bool) -> Haystack<'_> {
        // Bytes are never transcoded; latin1 only affects how the pattern is compiled.
        Haystack::from_bytes(self, false)
    }

    fn native_slice(&self, range: Range<usize>) -> &[u8] {
        &self[range]
    }
}

impl Subject for str {
    type Native = str;

    fn haystack(&self, latin1: bool) -> Haystack<'_> {
        if !latin1 {
            return Haystack::from_bytes(self.as_bytes(), true);
        }
        if self.is_ascii() {
            return Haystack::from_bytes(self.as_bytes(), false);
        }
        let chars = self.chars().map(|c| (c, c.len_utf8()));
        Haystack::from_encoded(Encoded::new(chars, self.len(), true), true)
    }

    fn native_slice(&self, range: Range<usize>) -> &str {
        &self[range]
    }
}

/// A code unit of a [`Text`] subject.
pub trait CodeUnit: private::Sealed + Copy + fmt::Debug + 'static {
    /// Decode \p units, calling \p f with each character and the number of
    /// units it spans. Malformed sequences decode to U+FFFD.
    fn decode<F: FnMut(char, usize)>(units: &[Self], f: F);
}

impl CodeUnit for u16 {
    fn decode<F: FnMut(char, usize)>(units: &[u16], mut f: F) {
        for decoded in char::decode_utf16(units.iter().copied()) {
            match decoded {
                Ok(c) => f(c, c.len_utf16()),
                // A lone surrogate.
                Err(_) => f(char::REPLACEMENT_CHARACTER, 1),
            }
        }
    }
}

impl CodeUnit for char {
    fn decode<F: FnMut(char, usize)>(units: &[char], mut f: F) {
        for &c in units {
            f(c, 1)
        }
    }
}

/// Text held as UTF-16 (`Text<u16>`) or UTF-32 (`Text<char>`) code units.
///
/// The text is encoded for the engine the first time it is searched, and the
/// encoding is kept for later searches of the same `Text`.
///
/// ```rust
/// use relinear::{Regex, Text};
/// let units: Vec<u16> = "xxx\u{2070E}yyy".encode_utf16().collect();
/// let text = Text::new(&units);
/// let m = Regex::new("y+").unwrap().find(&text).unwrap();
/// assert_eq!(m.range(), 5..8);
/// ```
pub struct Text<'t, U: CodeUnit> {
    units: &'t [U],
    utf8: OnceCell<Encoded>,
    latin1: OnceCell<Encoded>,
}

impl<'t, U: CodeUnit> Text<'t, U> {
    pub fn new(units: &'t [U]) -> Self {
        Self {
            units,
            utf8: OnceCell::new(),
            latin1: OnceCell::new(),
        }
    }

    /// \return the underlying code units.
    pub fn units(&self) -> &'t [U] {
        self.units
    }

    /// \return the number of code units.
    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    fn encoded(&self, latin1: bool) -> &Encoded {
        let cell = if latin1 { &self.latin1 } else { &self.utf8 };
        cell.get_or_init(|| {
            let mut chars = Vec::with_capacity(self.units.len());
            U::decode(self.units, |c, n| chars.push((c, n)));
            Encoded::new(chars.into_iter(), self.units.len(), latin1)
        })
    }
}

impl<'t, U: CodeUnit> From<&'t [U]> for Text<'t, U> {
    fn from(units: &'t [U]) -> Self {
        Self::new(units)
    }
}

impl<U: CodeUnit> fmt::Debug for Text<'_, U> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("Text").field(&self.units).finish()
    }
}

impl<U: CodeUnit> Subject for Text<'_, U> {
    type Native = [U];

    fn haystack(&self, latin1: bool) -> Haystack<'_> {
        self.encoded(latin1).as_haystack(latin1)
    }

    fn native_slice(&self, range: Range<usize>) -> &[U] {
        &self.units[range]
    }
}
