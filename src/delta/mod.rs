// Block-level delta between an old and a new version of a byte stream.
//
// Pipeline:
//   old bytes --SignatureBuilder--> Signature
//   new bytes + Signature --DeltaBuilder--> Delta
//   Delta --format_delta--> text lines

pub mod format;
pub mod matching;
pub mod signature;

use std::fmt;

pub use format::{format_delta, sorted_blocks};
pub use matching::DeltaBuilder;
pub use signature::{Signature, SignatureBuilder};

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// Classification of a region of the new version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    /// Matches the old block at the same offset.
    Original,
    /// Matches an old block at a different offset.
    Moved,
    /// No accepted match.
    Changed,
}

impl Op {
    /// Single-letter code used in the text format.
    pub fn code(self) -> char {
        match self {
            Self::Original => 'O',
            Self::Moved => 'M',
            Self::Changed => 'C',
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ---------------------------------------------------------------------------
// Blocks
// ---------------------------------------------------------------------------

/// One delta entry.
///
/// `from_*` are offsets in the old version (both 0 for `Changed`), `to_*` are
/// offsets in the new version. Ranges are half-open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block {
    pub op: Op,
    pub from_start: usize,
    pub from_end: usize,
    pub to_start: usize,
    pub to_end: usize,
}

impl Block {
    /// Old block `index` found at the same offset in the new version.
    pub fn original(index: usize, block_size: usize) -> Self {
        let start = index * block_size;
        Self {
            op: Op::Original,
            from_start: start,
            from_end: start + block_size,
            to_start: start,
            to_end: start + block_size,
        }
    }

    /// Old block `index` found at `to_start..to_end` in the new version.
    pub fn moved(index: usize, block_size: usize, to_start: usize, to_end: usize) -> Self {
        Self {
            op: Op::Moved,
            from_start: index * block_size,
            from_end: (index + 1) * block_size,
            to_start,
            to_end,
        }
    }

    /// New content at `to_start..to_end`.
    pub fn changed(to_start: usize, to_end: usize) -> Self {
        Self {
            op: Op::Changed,
            from_start: 0,
            from_end: 0,
            to_start,
            to_end,
        }
    }

    /// Whether this block references old content.
    pub fn is_match(&self) -> bool {
        matches!(self.op, Op::Original | Op::Moved)
    }

    /// Length of the new-version range.
    pub fn len(&self) -> usize {
        self.to_end.saturating_sub(self.to_start)
    }

    /// Whether the new-version range is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}:{} {}:{}",
            self.op, self.to_start, self.to_end, self.from_start, self.from_end
        )
    }
}

// ---------------------------------------------------------------------------
// Delta
// ---------------------------------------------------------------------------

/// Blocks in discovery order: matches first (by old index), then the
/// changed regions found between them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Delta {
    pub blocks: Vec<Block>,
    /// Number of bytes read from the new version.
    pub new_size: usize,
}

/// Per-operation block counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeltaSummary {
    pub original: usize,
    pub moved: usize,
    pub changed: usize,
}

impl Delta {
    /// Count blocks by operation.
    pub fn summary(&self) -> DeltaSummary {
        let mut s = DeltaSummary::default();
        for b in &self.blocks {
            match b.op {
                Op::Original => s.original += 1,
                Op::Moved => s.moved += 1,
                Op::Changed => s.changed += 1,
            }
        }
        s
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}
