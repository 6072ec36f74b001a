//! The parsed form of a pattern, before it is lowered to instructions.

use crate::api;
use crate::types::{BracketContents, CaptureGroupID, CaptureGroupName};
use core::fmt;

/// The zero-width assertions written with ^, $, \A and \z.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AnchorType {
    StartOfText,
    EndOfText,
    StartOfLine,
    EndOfLine,
}

/// How many times a loop body may run.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Quantifier {
    pub min: usize,

    /// Inclusive. None is unbounded.
    pub max: Option<usize>,

    /// Greedy loops prefer another iteration over leaving.
    pub greedy: bool,
}

/// A node of the parsed pattern.
/// Mode flags are already resolved: case-insensitivity is recorded per
/// character, and `.`, `^` and `$` are lowered to the node they mean under
/// the flags in effect where they appear.
#[derive(Debug)]
pub enum Node {
    /// Matches the empty string.
    Empty,

    /// The end of the pattern. Reaching it is a match.
    Goal,

    /// A literal character, with any of its case equivalents if icase.
    Char { c: u32, icase: bool },

    Cat(Vec<Node>),

    /// Prefers the left branch.
    Alt(Box<Node>, Box<Node>),

    MatchAny,

    MatchAnyExceptLineTerminator,

    Anchor(AnchorType),

    /// \b, or \B if inverted.
    WordBoundary { invert: bool },

    CaptureGroup(Box<Node>, CaptureGroupID),

    NamedCaptureGroup(Box<Node>, CaptureGroupID, CaptureGroupName),

    /// A character class. Case folding has already been applied.
    Bracket(BracketContents),

    Loop { loopee: Box<Node>, quant: Quantifier },
}

impl Node {
    /// \return the capture group ID and name of this node, if it captures.
    pub fn capture_group(&self) -> Option<(CaptureGroupID, Option<&str>)> {
        match self {
            Node::CaptureGroup(_, id) => Some((*id, None)),
            Node::NamedCaptureGroup(_, id, name) => Some((*id, Some(name.as_str()))),
            _ => None,
        }
    }

    /// \return the direct children of this node, in pattern order.
    fn children(&self) -> &[Node] {
        match self {
            Node::Cat(nodes) => nodes,
            Node::Loop { loopee, .. } => core::slice::from_ref(loopee.as_ref()),
            Node::CaptureGroup(contents, ..) | Node::NamedCaptureGroup(contents, ..) => {
                core::slice::from_ref(contents.as_ref())
            }
            _ => &[],
        }
    }

    /// Visit this node and its descendants in preorder, passing each node's
    /// depth below self.
    pub fn visit<F>(&self, f: &mut F)
    where
        F: FnMut(&Node, usize),
    {
        self.visit_at(0, f)
    }

    fn visit_at<F>(&self, depth: usize, f: &mut F)
    where
        F: FnMut(&Node, usize),
    {
        f(self, depth);
        if let Node::Alt(left, right) = self {
            left.visit_at(depth + 1, f);
            right.visit_at(depth + 1, f);
        } else {
            for child in self.children() {
                child.visit_at(depth + 1, f);
            }
        }
    }
}

/// A parsed pattern together with the flags it was compiled with.
pub struct Regex {
    pub node: Node,
    pub flags: api::Flags,
}

impl Regex {
    /// \return the number of explicit capture groups.
    pub fn group_count(&self) -> usize {
        let mut count = 0;
        self.node.visit(&mut |n, _| {
            if let Some((id, _)) = n.capture_group() {
                count = count.max(id as usize + 1);
            }
        });
        count
    }

    /// \return the names of capture groups, indexed by group ID.
    /// Unnamed groups get an empty name.
    pub fn group_names(&self) -> Box<[Box<str>]> {
        let mut names = vec![Box::<str>::default(); self.group_count()];
        self.node.visit(&mut |n, _| {
            if let Some((id, Some(name))) = n.capture_group() {
                names[id as usize] = name.into();
            }
        });
        names.into_boxed_slice()
    }
}

impl fmt::Display for Node {
    // A single line describing the node itself, without its children.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Node::Empty => f.write_str("Empty"),
            Node::Goal => f.write_str("Goal"),
            &Node::Char { c, icase } => {
                let ch = char::from_u32(c).unwrap_or(char::REPLACEMENT_CHARACTER);
                write!(f, "Char {:?}{}", ch, if icase { " icase" } else { "" })
            }
            Node::Cat(nodes) => write!(f, "Cat ({})", nodes.len()),
            Node::Alt(..) => f.write_str("Alt"),
            Node::MatchAny => f.write_str("MatchAny"),
            Node::MatchAnyExceptLineTerminator => f.write_str("MatchAnyExceptLineTerminator"),
            Node::Anchor(anchor) => write!(f, "Anchor {:?}", anchor),
            Node::WordBoundary { invert: false } => f.write_str("WordBoundary \\b"),
            Node::WordBoundary { invert: true } => f.write_str("WordBoundary \\B"),
            Node::CaptureGroup(_, id) => write!(f, "CaptureGroup {}", id),
            Node::NamedCaptureGroup(_, id, name) => write!(f, "CaptureGroup {} <{}>", id, name),
            Node::Bracket(contents) => write!(f, "Bracket {}", contents),
            Node::Loop { quant, .. } => {
                let max = quant.max.map_or_else(|| "inf".to_string(), |m| m.to_string());
                let lazy = if quant.greedy { "" } else { " lazy" };
                write!(f, "Loop {{{},{}}}{}", quant.min, max, lazy)
            }
        }
    }
}

impl fmt::Display for Regex {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut result = Ok(());
        self.node.visit(&mut |n, depth| {
            if result.is_ok() {
                result = writeln!(f, "{:width$}{}", "", n, width = depth * 2);
            }
        });
        result
    }
}
