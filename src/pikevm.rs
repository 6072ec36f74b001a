//! A Pike VM: a breadth-first simulation of the program which tracks every
//! live thread at once, so matching is linear in the length of the haystack.

use crate::insn::{Insn, Program};
use crate::matchers;
use crate::sparse::SparseSet;
use crate::types::{Slots, IP};
use crate::util::{is_utf8_continuation, DebugCheckIndex};

/// A set of threads at a single haystack position.
/// Each IP holds a row of capture slots.
#[derive(Debug, Clone)]
struct Threads {
    set: SparseSet,
    caps: Vec<Option<usize>>,
    slots_per_thread: usize,
}

impl Threads {
    fn new() -> Self {
        Self {
            set: SparseSet::new(0),
            caps: Vec::new(),
            slots_per_thread: 0,
        }
    }

    fn resize(&mut self, ninsns: usize, nslots: usize) {
        self.set.resize(ninsns);
        self.caps.clear();
        self.caps.resize(ninsns * nslots, None);
        self.slots_per_thread = nslots;
    }

    #[inline(always)]
    fn caps(&self, ip: IP) -> &[Option<usize>] {
        let n = self.slots_per_thread;
        self.caps.iat(ip * n..(ip + 1) * n)
    }

    #[inline(always)]
    fn caps_mut(&mut self, ip: IP) -> &mut [Option<usize>] {
        let n = self.slots_per_thread;
        self.caps.mat(ip * n..(ip + 1) * n)
    }
}

/// A frame of the explicit stack used to follow epsilon transitions.
#[derive(Debug, Clone, Copy)]
enum Frame {
    /// Follow transitions starting at an IP.
    Explore(IP),

    /// Undo a Save once the branch that made it has been explored.
    RestoreCapture { slot: usize, old: Option<usize> },
}

/// Scratch space for running a program.
/// A cache may be reused across searches; it adapts itself to whichever
/// program it is handed.
#[derive(Debug, Clone)]
pub struct Cache {
    clist: Threads,
    nlist: Threads,
    stack: Vec<Frame>,
    scratch: Slots,
}

impl Cache {
    pub fn new(prog: &Program) -> Self {
        let mut cache = Self {
            clist: Threads::new(),
            nlist: Threads::new(),
            stack: Vec::new(),
            scratch: Vec::new(),
        };
        cache.reset(prog);
        cache
    }

    /// Size the cache for \p prog, clearing any existing threads.
    fn reset(&mut self, prog: &Program) {
        let ninsns = prog.insns.len();
        let nslots = prog.num_slots();
        for threads in [&mut self.clist, &mut self.nlist] {
            if threads.set.capacity() != ninsns || threads.slots_per_thread != nslots {
                threads.resize(ninsns, nslots);
            } else {
                threads.set.clear();
            }
        }
        self.stack.clear();
        self.scratch.clear();
        self.scratch.resize(nslots, None);
    }
}

/// Add a thread at \p ip to \p threads, following all epsilon transitions
/// from it at position \p at. \p scratch holds the thread's capture slots; it
/// is restored to its original contents on return.
fn add_thread(
    threads: &mut Threads,
    stack: &mut Vec<Frame>,
    scratch: &mut [Option<usize>],
    prog: &Program,
    hay: &[u8],
    at: usize,
    ip: IP,
) {
    debug_assert!(stack.is_empty(), "Stack should be empty");
    stack.push(Frame::Explore(ip));
    while let Some(frame) = stack.pop() {
        let mut ip = match frame {
            Frame::Explore(ip) => ip,
            Frame::RestoreCapture { slot, old } => {
                scratch[slot] = old;
                continue;
            }
        };
        // Follow the primary branch; secondaries are pushed and explored later.
        while threads.set.insert(ip) {
            match *prog.insns.iat(ip) {
                Insn::Jump { target } => ip = target,
                Insn::Split { primary, secondary } => {
                    stack.push(Frame::Explore(secondary));
                    ip = primary;
                }
                Insn::Save(slot) => {
                    stack.push(Frame::RestoreCapture {
                        slot,
                        old: scratch[slot],
                    });
                    scratch[slot] = Some(at);
                    ip += 1;
                }
                Insn::Assert(look) => {
                    if !matchers::look_matches(look, hay, at) {
                        break;
                    }
                    ip += 1;
                }
                Insn::Goal | Insn::Byte(..) | Insn::ByteRange(..) => {
                    threads.caps_mut(ip).copy_from_slice(scratch);
                    break;
                }
                Insn::JustFail => break,
            }
        }
    }
}

/// \return whether candidate slots describe a better match than \p best under
/// leftmost-longest rules: an earlier start, or the same start and a later end.
fn is_longer(candidate: &[Option<usize>], best: &[Option<usize>]) -> bool {
    match (candidate[0], candidate[1], best[0], best[1]) {
        (Some(cs), Some(ce), Some(bs), Some(be)) => cs < bs || (cs == bs && ce > be),
        (Some(_), Some(_), _, _) => true,
        _ => false,
    }
}

/// Core search loop. On success the winning thread's slots are copied into
/// \p slots. If \p earliest is set, stop at the first thread to reach Goal.
/// If \p utf8 is set, threads are only started on character boundaries.
#[allow(clippy::too_many_arguments)]
fn search(
    prog: &Program,
    hay: &[u8],
    utf8: bool,
    start: usize,
    anchored: bool,
    earliest: bool,
    cache: &mut Cache,
    slots: &mut [Option<usize>],
) -> bool {
    if start > hay.len() {
        return false;
    }
    cache.reset(prog);
    let Cache {
        clist,
        nlist,
        stack,
        scratch,
    } = cache;
    let anchored = anchored || prog.is_start_anchored();
    let longest = prog.flags.longest;
    let mut matched = false;
    let mut at = start;
    loop {
        if clist.set.is_empty() {
            if matched || (anchored && at > start) {
                break;
            }
            if !anchored {
                // No live threads: jump to the next position that could start a match.
                match prog.start_pred.find_in(&hay[at..]) {
                    Some(skip) => at += skip,
                    None => break,
                }
            }
        }

        // Seed a new thread at the lowest priority, with no groups set.
        let on_boundary = !utf8 || !hay.get(at).map_or(false, |&b| is_utf8_continuation(b));
        if !matched && on_boundary && (!anchored || at == start) {
            scratch.fill(None);
            add_thread(clist, stack, scratch, prog, hay, at, 0);
        }

        let byte = hay.get(at).copied();
        for idx in 0..clist.set.len() {
            let ip = clist.set.get(idx);
            let advance = match *prog.insns.iat(ip) {
                Insn::Byte(b) => byte == Some(b),
                Insn::ByteRange(range) => matchers::byte_in_range(byte, range),
                Insn::Goal => {
                    let caps = clist.caps(ip);
                    if earliest {
                        slots.copy_from_slice(caps);
                        return true;
                    }
                    if !longest {
                        // Leftmost-first: lower priority threads are cut off.
                        slots.copy_from_slice(caps);
                        matched = true;
                        break;
                    }
                    if !matched || is_longer(caps, slots) {
                        slots.copy_from_slice(caps);
                        matched = true;
                    }
                    false
                }
                _ => false,
            };
            if advance {
                scratch.copy_from_slice(clist.caps(ip));
                add_thread(nlist, stack, scratch, prog, hay, at + 1, ip + 1);
            }
        }

        if at >= hay.len() {
            break;
        }
        at += 1;
        core::mem::swap(clist, nlist);
        nlist.set.clear();
    }
    matched
}

/// Run \p prog over \p hay starting at byte offset \p start.
/// If \p anchored is set, a match must begin at \p start.
/// If \p utf8 is set, \p hay is UTF-8 and matches only begin on character
/// boundaries.
/// \return the capture slots of the match, or None if there is no match.
pub fn run(
    prog: &Program,
    hay: &[u8],
    utf8: bool,
    start: usize,
    anchored: bool,
    cache: &mut Cache,
) -> Option<Slots> {
    let mut slots = vec![None; prog.num_slots()];
    if search(prog, hay, utf8, start, anchored, false, cache, &mut slots) {
        Some(slots)
    } else {
        None
    }
}

/// \return whether \p prog matches anywhere in \p hay at or after \p start.
pub fn is_match(prog: &Program, hay: &[u8], utf8: bool, start: usize, cache: &mut Cache) -> bool {
    let mut slots = vec![None; prog.num_slots()];
    search(prog, hay, utf8, start, false, true, cache, &mut slots)
}
