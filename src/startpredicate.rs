//! Support for quickly finding potential match locations.

use crate::bytesearch::ByteBitmap;
use crate::codepointset::{CodePointSet, Interval};
use crate::folds;
use crate::insn::StartPredicate;
use crate::ir::{self, Node};
use crate::utf8::utf8_sequences;
use memchr::memmem;

/// Check if a node is anchored to the start of the text.
fn is_start_anchored(n: &Node) -> bool {
    match n {
        Node::Anchor(ir::AnchorType::StartOfText) => true,
        Node::Cat(nodes) => nodes.first().map_or(false, is_start_anchored),
        Node::CaptureGroup(child, ..) | Node::NamedCaptureGroup(child, ..) => {
            is_start_anchored(child)
        }
        Node::Alt(left, right) => is_start_anchored(left) && is_start_anchored(right),
        _ => false,
    }
}

/// The "IR" for a start predicate.
enum AbstractStartPredicate {
    /// No predicate.
    Arbitrary,

    /// Sequence of non-empty bytes.
    Sequence(Vec<u8>),

    /// Set of bytes.
    Set(ByteBitmap),
}

impl AbstractStartPredicate {
    /// \return the disjunction of two predicates.
    /// That is, a predicate that matches x OR y.
    fn disjunction(x: Self, y: Self) -> Self {
        match (x, y) {
            (Self::Arbitrary, _) => Self::Arbitrary,
            (_, Self::Arbitrary) => Self::Arbitrary,

            (Self::Sequence(s1), Self::Sequence(s2)) => {
                // Compute the length of the shared prefix.
                let shared_len = s1.iter().zip(s2.iter()).take_while(|(a, b)| a == b).count();
                if shared_len > 0 {
                    Self::Sequence(s1[..shared_len].to_vec())
                } else {
                    Self::Set(ByteBitmap::new(&[s1[0], s2[0]]))
                }
            }

            (Self::Set(mut s1), Self::Set(s2)) => {
                s1.bitor(&s2);
                Self::Set(s1)
            }

            (Self::Set(mut set), Self::Sequence(seq)) | (Self::Sequence(seq), Self::Set(mut set)) => {
                set.set(seq[0]);
                Self::Set(set)
            }
        }
    }

    /// Resolve ourselves to a concrete start predicate.
    fn resolve(self) -> StartPredicate {
        match self {
            Self::Arbitrary => StartPredicate::Arbitrary,
            Self::Sequence(vals) => match vals.len() {
                0 => StartPredicate::Arbitrary,
                1 => StartPredicate::ByteSet1([vals[0]]),
                _ => StartPredicate::ByteSeq(Box::new(memmem::Finder::new(&vals).into_owned())),
            },
            Self::Set(bm) => match bm.to_vec().as_slice() {
                // An empty set means nothing can match; searching still terminates.
                [] => StartPredicate::ByteBracket(bm),
                &[b0] => StartPredicate::ByteSet1([b0]),
                &[b0, b1] => StartPredicate::ByteSet2([b0, b1]),
                &[b0, b1, b2] => StartPredicate::ByteSet3([b0, b1, b2]),
                all if all.len() == 256 => StartPredicate::Arbitrary,
                _ => StartPredicate::ByteBracket(bm),
            },
        }
    }
}

/// Computes start predicates for a given input encoding.
struct PredicateBuilder {
    latin1: bool,
}

impl PredicateBuilder {
    /// \return the encoded bytes of a literal char, or None if it cannot match.
    fn encode_char(&self, c: u32) -> Option<Vec<u8>> {
        if self.latin1 {
            u8::try_from(c).ok().map(|b| vec![b])
        } else {
            let mut buf = [0; 4];
            char::from_u32(c).map(|ch| ch.encode_utf8(&mut buf).as_bytes().to_vec())
        }
    }

    /// \return the set of possible first bytes of a code point set.
    fn first_bytes(&self, cps: &CodePointSet) -> ByteBitmap {
        let mut bitmap = ByteBitmap::default();
        if self.latin1 {
            for iv in cps.clip(Interval::new(0, 0xFF)).intervals() {
                bitmap.set_range(iv.first as u8, iv.last as u8);
            }
        } else {
            for seq in utf8_sequences(cps) {
                if let Some(lead) = seq.first() {
                    bitmap.set_range(lead.start, lead.end);
                }
            }
        }
        bitmap
    }

    /// \return the literal bytes of a case-sensitive char node.
    fn literal(&self, n: &Node) -> Option<Vec<u8>> {
        match *n {
            Node::Char { c, icase: false } => self.encode_char(c),
            _ => None,
        }
    }

    /// Compute any start-predicate for a node.
    /// If this returns None, then the node is zero-width (e.g. an anchor) and
    /// does not contribute to the predicate.
    /// If this returns Arbitrary, then there is no predicate.
    fn compute(&self, n: &Node) -> Option<AbstractStartPredicate> {
        let arbitrary = Some(AbstractStartPredicate::Arbitrary);
        match n {
            Node::Empty | Node::Anchor(..) | Node::WordBoundary { .. } => None,
            Node::Goal => arbitrary,

            &Node::Char { c, icase } => {
                if !icase {
                    return Some(match self.encode_char(c) {
                        Some(bytes) => AbstractStartPredicate::Sequence(bytes),
                        None => AbstractStartPredicate::Set(ByteBitmap::default()),
                    });
                }
                let mut cps = CodePointSet::new();
                for equiv in folds::fold_equivalents(c) {
                    cps.add_one(equiv);
                }
                Some(AbstractStartPredicate::Set(self.first_bytes(&cps)))
            }

            // Cats take the first non-None value. A leading literal is extended by
            // any literals that directly follow it.
            Node::Cat(nodes) => {
                for (idx, node) in nodes.iter().enumerate() {
                    match self.compute(node) {
                        None => continue,
                        Some(AbstractStartPredicate::Sequence(mut seq))
                            if self.literal(node).is_some() =>
                        {
                            for next in &nodes[idx + 1..] {
                                match self.literal(next) {
                                    Some(bytes) => seq.extend(bytes),
                                    None => break,
                                }
                            }
                            return Some(AbstractStartPredicate::Sequence(seq));
                        }
                        other => return other,
                    }
                }
                None
            }

            // MatchAny (aka .) is too common to do a fast prefix search for.
            Node::MatchAny | Node::MatchAnyExceptLineTerminator => arbitrary,

            Node::CaptureGroup(child, ..) | Node::NamedCaptureGroup(child, ..) => {
                self.compute(child)
            }

            Node::Loop { loopee, quant } => {
                if quant.min > 0 {
                    self.compute(loopee)
                } else {
                    arbitrary
                }
            }

            // The disjunction of the predicates of our two arms.
            Node::Alt(left, right) => {
                if let (Some(x), Some(y)) = (self.compute(left), self.compute(right)) {
                    Some(AbstractStartPredicate::disjunction(x, y))
                } else {
                    // One of our branches could match the empty string.
                    arbitrary
                }
            }

            Node::Bracket(bc) => Some(AbstractStartPredicate::Set(
                self.first_bytes(&bc.code_points()),
            )),
        }
    }
}

/// \return the start predicate for a Regex.
pub fn predicate_for_re(re: &ir::Regex) -> StartPredicate {
    if is_start_anchored(&re.node) {
        return StartPredicate::StartAnchored;
    }
    let builder = PredicateBuilder {
        latin1: re.flags.latin1,
    };
    builder
        .compute(&re.node)
        .unwrap_or(AbstractStartPredicate::Arbitrary)
        .resolve()
}
