// Delta construction: dense window hashing, block matching, gap filling.
//
//   1. Hash the window `[j, j + block_size)` of the new version at every
//      byte offset `j`, then extend with `block_size - 1` virtual windows
//      that roll `PAD_BYTE` in past end-of-stream.
//   2. For each signature block `i` (ascending) visit the positions whose
//      window hash equals `hashes[i]` (ascending) and accept Original /
//      Moved matches, up to one accepted match per signature block overall.
//   3. Walk the accepted matches in discovery order and emit Changed blocks
//      for the gaps between them.
//
// A hash hit is accepted without comparing bytes unless the signature was
// built with block digests.

use std::collections::VecDeque;
use std::io::{self, Read};

use log::{debug, trace};

use super::{Block, Delta, Signature};
use crate::hash::config::{DeltaOptions, MatchStrategy};
use crate::hash::rolling::{PAD_BYTE, RollingHash};
#[cfg(feature = "verify")]
use crate::hash::strong;
use crate::hash::table::PositionIndex;

// ---------------------------------------------------------------------------
// Window hashes of the new version
// ---------------------------------------------------------------------------

/// Hash of every window of the new version, plus the virtual tail.
#[derive(Debug, Default)]
pub struct WindowHashes {
    /// `hashes[j]` is the hash of new bytes `[j, j + block_size)`.
    pub hashes: Vec<u32>,
    /// Bytes read from the new version.
    pub size: usize,
    /// New-version bytes, retained only for verified matching.
    pub data: Option<Vec<u8>>,
}

impl WindowHashes {
    /// Read `reader` to end-of-stream one byte at a time.
    ///
    /// `reader` should be buffered; it is consumed through `Read::bytes`.
    pub fn scan<R: Read>(reader: R, block_size: usize, keep_data: bool) -> io::Result<Self> {
        let mut window: VecDeque<u8> = VecDeque::with_capacity(block_size + 1);
        let mut hash = RollingHash::new(block_size);
        let mut hashes = Vec::new();
        let mut data = keep_data.then(Vec::new);
        let mut size = 0usize;
        let mut primed = false;

        for byte in reader.bytes() {
            let byte = byte?;
            window.push_back(byte);
            if window.len() >= block_size {
                if primed {
                    hash.roll(window[0], byte);
                } else {
                    hash.hash_block(window.make_contiguous());
                    primed = true;
                }
                hashes.push(hash.value());
            }
            if window.len() > block_size {
                window.pop_front();
            }
            if let Some(data) = data.as_mut() {
                data.push(byte);
            }
            size += 1;
        }

        // Windows running past end-of-stream.
        for _ in 1..block_size {
            window.push_back(PAD_BYTE);
            hash.roll(window[0], PAD_BYTE);
            hashes.push(hash.value());
            window.pop_front();
        }

        Ok(Self { hashes, size, data })
    }

    /// Ascending positions whose window hashes to `hash` (full scan).
    fn positions_of(&self, hash: u32) -> impl Iterator<Item = usize> + '_ {
        self.hashes
            .iter()
            .enumerate()
            .filter(move |&(_, &h)| h == hash)
            .map(|(j, _)| j)
    }
}

// ---------------------------------------------------------------------------
// Accepted matches
// ---------------------------------------------------------------------------

/// Accepted Original/Moved blocks and the state of the acceptance rules.
#[derive(Debug)]
struct MatchSet {
    blocks: Vec<Block>,
    /// At most one accepted match per signature block.
    cap: usize,
    block_size: usize,
    new_size: usize,
    /// Old index of the last accepted move.
    last_index: usize,
}

impl MatchSet {
    fn new(cap: usize, block_size: usize, new_size: usize) -> Self {
        Self {
            blocks: Vec::new(),
            cap,
            block_size,
            new_size,
            last_index: 0,
        }
    }

    #[inline]
    fn is_full(&self) -> bool {
        self.blocks.len() >= self.cap
    }

    /// Offer the ascending positions where old block `index` hashes equal.
    ///
    /// A position at the block's own offset is Original. Any other position is
    /// a move, accepted only for a later old block than the last accepted move
    /// or at least one block past the previous move of this block; this stops a
    /// run of repeated bytes from matching at every offset.
    fn offer(&mut self, index: usize, candidates: impl IntoIterator<Item = usize>) {
        let bs = self.block_size;
        let mut last_pos = 0usize;
        for pos in candidates {
            if self.is_full() {
                break;
            }
            if pos == index * bs {
                trace!("O old block {index} at {pos}");
                self.blocks.push(Block::original(index, bs));
            } else if index > self.last_index || pos >= last_pos + bs {
                let to_end = (pos + bs).min(self.new_size);
                trace!("M old block {index} at {pos}..{to_end}");
                self.blocks.push(Block::moved(index, bs, pos, to_end));
                last_pos = pos;
                self.last_index = index;
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Delta builder
// ---------------------------------------------------------------------------

/// Computes the [`Delta`] of a new version against a [`Signature`].
#[derive(Debug, Clone)]
pub struct DeltaBuilder<'a> {
    signature: &'a Signature,
    strategy: MatchStrategy,
}

impl<'a> DeltaBuilder<'a> {
    pub fn new(signature: &'a Signature) -> Self {
        Self {
            signature,
            strategy: MatchStrategy::default(),
        }
    }

    /// Builder configured from `opts` (the strategy; verification is a
    /// property of the signature).
    pub fn with_options(signature: &'a Signature, opts: &DeltaOptions) -> Self {
        Self::new(signature).strategy(opts.strategy)
    }

    /// Set the candidate lookup strategy.
    pub fn strategy(mut self, strategy: MatchStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Read the new version from `reader` and compute the delta.
    ///
    /// Read errors are returned unchanged; no partial delta is produced.
    pub fn build<R: Read>(&self, reader: R) -> io::Result<Delta> {
        let block_size = self.signature.block_size();
        let windows = WindowHashes::scan(reader, block_size, self.signature.is_verified())?;
        debug!(
            "delta: {} window hashes over {} new bytes",
            windows.hashes.len(),
            windows.size
        );
        Ok(self.build_from_windows(&windows))
    }

    /// Compute the delta from already scanned window hashes.
    pub fn build_from_windows(&self, windows: &WindowHashes) -> Delta {
        let matches = self.match_blocks(windows);
        let changed = fill_gaps(&matches, self.signature.block_size(), windows.size);
        debug!(
            "delta: {} matched, {} changed (strategy {})",
            matches.len(),
            changed.len(),
            self.strategy.name()
        );

        let mut blocks = matches;
        blocks.extend(changed);
        Delta {
            blocks,
            new_size: windows.size,
        }
    }

    fn match_blocks(&self, windows: &WindowHashes) -> Vec<Block> {
        let sig = self.signature;
        let mut set = MatchSet::new(sig.len(), sig.block_size(), windows.size);
        let data = windows.data.as_deref();

        let index = match self.strategy {
            MatchStrategy::Indexed => {
                let index = PositionIndex::build(&windows.hashes);
                debug!("delta: position index over {} distinct hashes", index.len());
                if index.is_empty() {
                    return set.blocks;
                }
                Some(index)
            }
            MatchStrategy::Scan => None,
        };

        for (i, &hash) in sig.hashes().iter().enumerate() {
            if set.is_full() {
                debug!("delta: match cap {} reached before old block {i}", set.cap);
                break;
            }
            let confirmed = |&pos: &usize| confirms(sig, data, i, pos);
            match &index {
                Some(index) => set.offer(i, index.lookup(hash).iter().copied().filter(confirmed)),
                None => set.offer(i, windows.positions_of(hash).filter(confirmed)),
            }
        }

        set.blocks
    }
}

/// Strong-digest confirmation of a weak hash hit, when the signature has
/// digests.
#[cfg(feature = "verify")]
fn confirms(sig: &Signature, data: Option<&[u8]>, index: usize, pos: usize) -> bool {
    match (sig.digests(), data) {
        (Some(digests), Some(data)) => {
            let ok = strong::window_digest(data, pos, sig.block_size()) == digests[index];
            if !ok {
                trace!("rejected hash collision: old block {index} at {pos}");
            }
            ok
        }
        _ => true,
    }
}

#[cfg(not(feature = "verify"))]
#[inline(always)]
fn confirms(_sig: &Signature, _data: Option<&[u8]>, _index: usize, _pos: usize) -> bool {
    true
}

/// Changed blocks for the regions not covered by `matches`.
///
/// `matches` is walked in discovery order with the previous end starting at
/// `2 * block_size`, and a gap is emitted whenever a match starts past the
/// previous match's end. Without any match, the whole new version is cut into
/// `block_size` blocks; the last one is not clipped to `new_size`.
pub fn fill_gaps(matches: &[Block], block_size: usize, new_size: usize) -> Vec<Block> {
    if matches.is_empty() {
        return (0..new_size)
            .step_by(block_size)
            .map(|start| Block::changed(start, start + block_size))
            .collect();
    }

    let mut changed = Vec::new();
    let mut prev_end = 2 * block_size;
    for m in matches {
        if prev_end < m.to_start {
            changed.push(Block::changed(prev_end, m.to_start.min(new_size)));
        }
        prev_end = m.to_end;
    }
    changed
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
