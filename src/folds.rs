use crate::codepointset::{CodePoint, CodePointSet};
use smallvec::SmallVec;
use std::sync::OnceLock;

/// The largest code point which participates in a simple case mapping.
const MAX_CASED_CODE_POINT: CodePoint = 0x1E943;

/// Apply a case mapping, ignoring mappings which expand to multiple chars.
fn simple_mapping<I: Iterator<Item = char>>(c: char, mut mapped: I) -> char {
    match (mapped.next(), mapped.next()) {
        (Some(m), None) => m,
        _ => c,
    }
}

/// \return the representative of the case-insensitive class of \p c.
/// Dotless i only folds to itself, as in the non-Turkic folding.
fn fold_key(c: char) -> char {
    if c == '\u{131}' {
        return c;
    }
    let upper = simple_mapping(c, c.to_uppercase());
    simple_mapping(upper, upper.to_lowercase())
}

/// Pairs of (representative, member) sorted by representative.
/// Code points which are their own representative are not stored.
fn fold_pairs() -> &'static [(CodePoint, CodePoint)] {
    static PAIRS: OnceLock<Vec<(CodePoint, CodePoint)>> = OnceLock::new();
    PAIRS.get_or_init(|| {
        let mut pairs: Vec<(CodePoint, CodePoint)> = (0..=MAX_CASED_CODE_POINT)
            .filter_map(char::from_u32)
            .filter_map(|c| {
                let key = fold_key(c);
                if key != c {
                    Some((key as CodePoint, c as CodePoint))
                } else {
                    None
                }
            })
            .collect();
        pairs.sort_unstable();
        pairs
    })
}

/// \return every code point which matches \p cp case-insensitively,
/// including \p cp itself, in ascending order.
pub fn fold_equivalents(cp: CodePoint) -> SmallVec<[CodePoint; 4]> {
    let key = match char::from_u32(cp) {
        Some(c) if cp <= MAX_CASED_CODE_POINT => fold_key(c) as CodePoint,
        _ => return smallvec::smallvec![cp],
    };
    let pairs = fold_pairs();
    let start = pairs.partition_point(|p| p.0 < key);
    let end = start + pairs[start..].partition_point(|p| p.0 == key);
    let mut result: SmallVec<[CodePoint; 4]> = smallvec::smallvec![key];
    result.extend(pairs[start..end].iter().map(|p| p.1));
    result.sort_unstable();
    result
}

/// \return the set \p set closed under simple case folding.
pub fn fold_code_points(set: &CodePointSet) -> CodePointSet {
    let mut result = set.clone();
    let pairs = fold_pairs();
    let mut idx = 0;
    while idx < pairs.len() {
        let key = pairs[idx].0;
        let end = idx + pairs[idx..].partition_point(|p| p.0 == key);
        let group = &pairs[idx..end];
        if set.contains(key) || group.iter().any(|p| set.contains(p.1)) {
            result.add_one(key);
            for &(_, member) in group {
                result.add_one(member);
            }
        }
        idx = end;
    }
    result
}
