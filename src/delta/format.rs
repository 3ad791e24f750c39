// Text rendering of a delta.
//
// One line per block, sorted by position in the new version:
//
//     <op> <to_start>:<to_end> <from_start>:<from_end>

use std::fmt::Write;

use super::{Block, Delta};

/// Blocks of `delta` sorted by `to_start` (stable).
pub fn sorted_blocks(delta: &Delta) -> Vec<Block> {
    let mut blocks = delta.blocks.clone();
    blocks.sort_by_key(|b| b.to_start);
    blocks
}

/// Render `delta` as newline-terminated text lines.
pub fn format_delta(delta: &Delta) -> String {
    let mut out = String::with_capacity(delta.blocks.len() * 24);
    for block in sorted_blocks(delta) {
        // Writing into a String cannot fail.
        let _ = writeln!(out, "{block}");
    }
    out
}
