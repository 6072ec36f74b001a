//! Regex compiler back-end: transforms IR into a Program

use crate::codepointset::{CodePointSet, Interval, CODE_POINT_MAX};
use crate::folds;
use crate::insn::{ByteRange, Insn, Look, Program};
use crate::ir::{self, Node};
use crate::parse::{error_of_kind, Error, ErrorKind};
use crate::startpredicate;
use crate::types::IP;
use crate::utf8::{self, Utf8Sequence};
use smallvec::smallvec;

/// The default limit on the size of a compiled program, in bytes.
pub const DEFAULT_SIZE_LIMIT: usize = 8 << 20;

/// \return an assertion instruction for a given IR anchor.
fn make_anchor(anchor_type: ir::AnchorType) -> Insn {
    Insn::Assert(match anchor_type {
        ir::AnchorType::StartOfText => Look::StartOfText,
        ir::AnchorType::EndOfText => Look::EndOfText,
        ir::AnchorType::StartOfLine => Look::StartOfLine,
        ir::AnchorType::EndOfLine => Look::EndOfLine,
    })
}

/// \return the slot recording the start of the explicit group \p group.
fn group_start_slot(group: u16) -> usize {
    2 * (group as usize + 1)
}

/// Type which wraps up the context needed to emit a Program.
struct Emitter {
    insns: Vec<Insn>,

    // If set, each byte is a character and code points above 0xFF never match.
    latin1: bool,

    // Maximum number of instructions.
    max_insns: usize,
}

impl Emitter {
    /// Emit an instruction.
    fn emit_insn(&mut self, insn: Insn) -> Result<(), Error> {
        if self.insns.len() >= self.max_insns {
            return error_of_kind(ErrorKind::PatternTooLarge, "Pattern too large");
        }
        self.insns.push(insn);
        Ok(())
    }

    /// Get an instruction at a given index.
    fn get_insn(&mut self, idx: IP) -> &mut Insn {
        &mut self.insns[idx]
    }

    /// \return the offset of the next instruction emitted.
    fn next_offset(&self) -> IP {
        self.insns.len()
    }

    fn emit_insn_offset(&mut self, insn: Insn) -> Result<IP, Error> {
        let ret = self.next_offset();
        self.emit_insn(insn)?;
        Ok(ret)
    }

    /// Emit a Split whose targets are patched later.
    fn emit_split(&mut self) -> Result<IP, Error> {
        self.emit_insn_offset(Insn::Split {
            primary: 0,
            secondary: 0,
        })
    }

    fn patch_split(&mut self, split: IP, new_primary: IP, new_secondary: IP) {
        match self.get_insn(split) {
            Insn::Split { primary, secondary } => {
                *primary = new_primary;
                *secondary = new_secondary;
            }
            _ => panic!("Should be a Split instruction"),
        }
    }

    fn patch_jump(&mut self, jump: IP, new_target: IP) {
        match self.get_insn(jump) {
            Insn::Jump { target } => *target = new_target,
            _ => panic!("Should be a Jump instruction"),
        }
    }

    fn emit_byte_range(&mut self, range: ByteRange) -> Result<(), Error> {
        if range.start == range.end {
            self.emit_insn(Insn::Byte(range.start))
        } else {
            self.emit_insn(Insn::ByteRange(range))
        }
    }

    /// Emit a prioritized alternation of byte range sequences.
    /// An empty list never matches.
    fn emit_sequences(&mut self, seqs: &[Utf8Sequence]) -> Result<(), Error> {
        if seqs.is_empty() {
            return self.emit_insn(Insn::JustFail);
        }
        let mut jumps = Vec::with_capacity(seqs.len());
        for (idx, seq) in seqs.iter().enumerate() {
            let is_last = idx + 1 == seqs.len();
            let split = if is_last {
                None
            } else {
                Some(self.emit_split()?)
            };
            for &range in seq {
                self.emit_byte_range(range)?;
            }
            if let Some(split) = split {
                jumps.push(self.emit_insn_offset(Insn::Jump { target: 0 })?);
                let next = self.next_offset();
                self.patch_split(split, split + 1, next);
            }
        }
        let exit = self.next_offset();
        for jump in jumps {
            self.patch_jump(jump, exit);
        }
        Ok(())
    }

    /// Emit instructions matching exactly one character from \p cps.
    fn emit_code_points(&mut self, cps: &CodePointSet) -> Result<(), Error> {
        let seqs: Vec<Utf8Sequence> = if self.latin1 {
            cps.clip(Interval::new(0, 0xFF))
                .intervals()
                .iter()
                .map(|iv| smallvec![ByteRange::new(iv.first as u8, iv.last as u8)])
                .collect()
        } else {
            utf8::utf8_sequences(cps)
        };
        self.emit_sequences(&seqs)
    }

    /// Emit a single literal character.
    fn emit_char(&mut self, c: u32) -> Result<(), Error> {
        if self.latin1 {
            return match u8::try_from(c) {
                Ok(b) => self.emit_insn(Insn::Byte(b)),
                Err(_) => self.emit_insn(Insn::JustFail),
            };
        }
        match char::from_u32(c) {
            Some(ch) => {
                let mut buf = [0; 4];
                for &b in ch.encode_utf8(&mut buf).as_bytes() {
                    self.emit_insn(Insn::Byte(b))?;
                }
                Ok(())
            }
            // Surrogates have no UTF-8 encoding.
            None => self.emit_insn(Insn::JustFail),
        }
    }

    fn emit_loop(&mut self, loopee: &Node, quant: &ir::Quantifier) -> Result<(), Error> {
        for _ in 0..quant.min {
            self.emit_node(loopee)?;
        }
        match quant.max {
            None => {
                // L: Split body, exit; body; Jump L
                let split = self.emit_split()?;
                self.emit_node(loopee)?;
                self.emit_insn(Insn::Jump { target: split })?;
                let exit = self.next_offset();
                if quant.greedy {
                    self.patch_split(split, split + 1, exit);
                } else {
                    self.patch_split(split, exit, split + 1);
                }
            }
            Some(max) => {
                // Each optional copy is only reachable after the previous one.
                let mut splits = Vec::with_capacity(max - quant.min);
                for _ in quant.min..max {
                    splits.push(self.emit_split()?);
                    self.emit_node(loopee)?;
                }
                let exit = self.next_offset();
                for split in splits {
                    if quant.greedy {
                        self.patch_split(split, split + 1, exit);
                    } else {
                        self.patch_split(split, exit, split + 1);
                    }
                }
            }
        }
        Ok(())
    }

    /// Emit instructions corresponding to a given node.
    fn emit_node(&mut self, node: &Node) -> Result<(), Error> {
        match node {
            Node::Empty => {}
            Node::Goal => {
                self.emit_insn(Insn::Save(1))?;
                self.emit_insn(Insn::Goal)?;
            }
            &Node::Char { c, icase } => {
                let equivs = if icase {
                    folds::fold_equivalents(c)
                } else {
                    smallvec![c]
                };
                if equivs.len() == 1 {
                    self.emit_char(c)?;
                } else {
                    let mut cps = CodePointSet::new();
                    for equiv in equivs {
                        cps.add_one(equiv);
                    }
                    self.emit_code_points(&cps)?;
                }
            }
            Node::Cat(children) => {
                for nn in children {
                    self.emit_node(nn)?;
                }
            }
            Node::Alt(left, right) => {
                // Alternation forks to the primary branch first. After the
                // primary branch, jump to the continuation.
                let split = self.emit_split()?;
                self.emit_node(left)?;
                let jump_insn = self.emit_insn_offset(Insn::Jump { target: 0 })?;
                let right_branch = self.next_offset();
                self.emit_node(right)?;
                let exit = self.next_offset();

                // Fix up our jump targets.
                self.patch_split(split, split + 1, right_branch);
                self.patch_jump(jump_insn, exit);
            }
            Node::Bracket(contents) => self.emit_code_points(&contents.code_points())?,
            Node::MatchAny => {
                self.emit_code_points(&CodePointSet::from_interval(0, CODE_POINT_MAX))?
            }
            Node::MatchAnyExceptLineTerminator => {
                let mut cps = CodePointSet::new();
                cps.add(Interval::new(0, '\n' as u32 - 1));
                cps.add(Interval::new('\n' as u32 + 1, CODE_POINT_MAX));
                self.emit_code_points(&cps)?
            }
            Node::Anchor(anchor_type) => self.emit_insn(make_anchor(*anchor_type))?,
            Node::WordBoundary { invert } => self.emit_insn(Insn::Assert(if *invert {
                Look::NotWordBoundary
            } else {
                Look::WordBoundary
            }))?,
            Node::Loop { loopee, quant } => self.emit_loop(loopee, quant)?,
            Node::CaptureGroup(contents, group) | Node::NamedCaptureGroup(contents, group, _) => {
                let slot = group_start_slot(*group);
                self.emit_insn(Insn::Save(slot))?;
                self.emit_node(contents)?;
                self.emit_insn(Insn::Save(slot + 1))?;
            }
        }
        Ok(())
    }
}

/// Compile the given IR to a Program.
pub fn emit(re: &ir::Regex) -> Result<Program, Error> {
    let size_limit = re.flags.size_limit.unwrap_or(DEFAULT_SIZE_LIMIT);
    let mut emitter = Emitter {
        insns: Vec::new(),
        latin1: re.flags.latin1,
        max_insns: size_limit / core::mem::size_of::<Insn>(),
    };
    emitter.emit_insn(Insn::Save(0))?;
    emitter.emit_node(&re.node)?;
    Ok(Program {
        insns: emitter.insns,
        start_pred: startpredicate::predicate_for_re(re),
        groups: re.group_count(),
        group_names: re.group_names().into(),
        flags: re.flags,
    })
}
