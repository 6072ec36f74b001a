//! Lowering of code point sets to sequences of UTF-8 byte ranges.

use crate::codepointset::{CodePointSet, Interval};
use crate::insn::ByteRange;
use smallvec::SmallVec;

const fn br(start: u8, end: u8) -> ByteRange {
    ByteRange { start, end }
}

/// A UTF-8 structural bucket: the exact code-point span it covers and
/// the per-byte closed ranges that encode that span.
#[derive(Copy, Clone)]
pub struct Utf8Bucket {
    pub ivs: Interval,                     // closed code-point interval
    pub byte_ranges: &'static [ByteRange], // per-byte closed ranges
}

/// Buckets in code point order. Surrogates are not covered by any bucket.
#[rustfmt::skip]
pub const UTF8_BUCKETS: &[Utf8Bucket] = &[
    Utf8Bucket {
        ivs: Interval::new(0x0000, 0x007F),
        byte_ranges: &[br(0x00, 0x7F)],
    },
    Utf8Bucket {
        ivs: Interval::new(0x0080, 0x07FF),
        byte_ranges: &[br(0xC2, 0xDF), br(0x80, 0xBF)],
    },
    // E0: avoid overlongs -> A0..BF
    Utf8Bucket {
        ivs: Interval::new(0x0800, 0x0FFF),
        byte_ranges: &[br(0xE0, 0xE0), br(0xA0, 0xBF), br(0x80, 0xBF)],
    },
    Utf8Bucket {
        ivs: Interval::new(0x1000, 0xCFFF),
        byte_ranges: &[br(0xE1, 0xEC), br(0x80, 0xBF), br(0x80, 0xBF)],
    },
    // ED: stop before the surrogates -> 80..9F
    Utf8Bucket {
        ivs: Interval::new(0xD000, 0xD7FF),
        byte_ranges: &[br(0xED, 0xED), br(0x80, 0x9F), br(0x80, 0xBF)],
    },
    Utf8Bucket {
        ivs: Interval::new(0xE000, 0xFFFF),
        byte_ranges: &[br(0xEE, 0xEF), br(0x80, 0xBF), br(0x80, 0xBF)],
    },
    // F0: avoid overlongs -> 90..BF
    Utf8Bucket {
        ivs: Interval::new(0x1_0000, 0x3_FFFF),
        byte_ranges: &[br(0xF0, 0xF0), br(0x90, 0xBF), br(0x80, 0xBF), br(0x80, 0xBF)],
    },
    Utf8Bucket {
        ivs: Interval::new(0x4_0000, 0xF_FFFF),
        byte_ranges: &[br(0xF1, 0xF3), br(0x80, 0xBF), br(0x80, 0xBF), br(0x80, 0xBF)],
    },
    // F4: cap at U+10FFFF -> 80..8F
    Utf8Bucket {
        ivs: Interval::new(0x10_0000, 0x10_FFFF),
        byte_ranges: &[br(0xF4, 0xF4), br(0x80, 0x8F), br(0x80, 0xBF), br(0x80, 0xBF)],
    },
];

// Length boundaries for mapping from code points to number of UTF-8 bytes.
// These are closed boundaries (<=).
pub const UTF8_LENGTH_BOUNDARIES: [u32; 4] = [0x007F, 0x07FF, 0xFFFF, 0x10FFFF];

/// A sequence of byte ranges, one per encoded byte.
pub type Utf8Sequence = SmallVec<[ByteRange; 4]>;

/// Encode a code point which is known not to be a surrogate.
fn encode(cp: u32, buf: &mut [u8; 4]) -> &[u8] {
    match char::from_u32(cp) {
        Some(c) => c.encode_utf8(buf).as_bytes(),
        None => panic!("Surrogate code point {:#X} in UTF-8 bucket", cp),
    }
}

/// Append the sequences for an interval lying within a single bucket.
/// Intervals are split until each byte position varies independently.
fn push_bucket_interval(iv: Interval, out: &mut Vec<Utf8Sequence>) {
    let mut pending = vec![iv];
    while let Some(Interval { first, mut last }) = pending.pop() {
        'split: loop {
            for i in 1..4 {
                let m: u32 = (1 << (6 * i)) - 1;
                if (first & !m) != (last & !m) {
                    if (first & m) != 0 {
                        pending.push(Interval::new((first | m) + 1, last));
                        last = first | m;
                        continue 'split;
                    }
                    if (last & m) != m {
                        pending.push(Interval::new(last & !m, last));
                        last = (last & !m) - 1;
                        continue 'split;
                    }
                }
            }
            break;
        }
        let (mut buf1, mut buf2) = ([0; 4], [0; 4]);
        let bytes1 = encode(first, &mut buf1);
        let bytes2 = encode(last, &mut buf2);
        debug_assert_eq!(bytes1.len(), bytes2.len());
        out.push(
            bytes1
                .iter()
                .zip(bytes2.iter())
                .map(|(&start, &end)| ByteRange::new(start, end))
                .collect(),
        );
    }
}

/// \return the disjoint UTF-8 byte range sequences matching exactly the
/// code points of \p cps, in code point order. Surrogates are dropped.
pub fn utf8_sequences(cps: &CodePointSet) -> Vec<Utf8Sequence> {
    let mut result = Vec::new();
    for bucket in UTF8_BUCKETS {
        for iv in cps.clip(bucket.ivs).intervals() {
            if *iv == bucket.ivs {
                result.push(bucket.byte_ranges.iter().copied().collect());
            } else {
                push_bucket_interval(*iv, &mut result);
            }
        }
    }
    result
}
