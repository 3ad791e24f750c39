// Position index over the window hashes of the new version.
//
// Maps each window hash to the ascending list of new-version positions that
// produced it. Looking up a signature hash then yields exactly the positions
// a full nested scan would stop at, in the same order.

use std::collections::HashMap;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Hashes per rayon task when building the index in parallel.
#[cfg(feature = "parallel")]
const PARALLEL_CHUNK: usize = 1 << 16;

/// Hash-to-positions index. Every posting list is strictly ascending.
#[derive(Debug, Default)]
pub struct PositionIndex {
    positions: HashMap<u32, Vec<usize>>,
}

impl PositionIndex {
    /// Index `hashes`, where `hashes[j]` is the hash of the window at `j`.
    #[cfg(not(feature = "parallel"))]
    pub fn build(hashes: &[u32]) -> Self {
        Self {
            positions: index_range(hashes, 0),
        }
    }

    /// Index `hashes`, where `hashes[j]` is the hash of the window at `j`.
    ///
    /// Chunks are indexed in parallel and merged in chunk order, so every
    /// posting list stays ascending.
    #[cfg(feature = "parallel")]
    pub fn build(hashes: &[u32]) -> Self {
        if hashes.len() <= PARALLEL_CHUNK {
            return Self {
                positions: index_range(hashes, 0),
            };
        }
        let partials: Vec<HashMap<u32, Vec<usize>>> = hashes
            .par_chunks(PARALLEL_CHUNK)
            .enumerate()
            .map(|(n, chunk)| index_range(chunk, n * PARALLEL_CHUNK))
            .collect();

        let mut positions: HashMap<u32, Vec<usize>> = HashMap::new();
        for partial in partials {
            for (hash, mut list) in partial {
                positions.entry(hash).or_default().append(&mut list);
            }
        }
        Self { positions }
    }

    /// Ascending positions whose window hashes to `hash`.
    #[inline]
    pub fn lookup(&self, hash: u32) -> &[usize] {
        self.positions.get(&hash).map_or(&[], Vec::as_slice)
    }

    /// Number of distinct hashes indexed.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Whether the index holds no positions.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

fn index_range(hashes: &[u32], base: usize) -> HashMap<u32, Vec<usize>> {
    let mut positions: HashMap<u32, Vec<usize>> = HashMap::with_capacity(hashes.len());
    for (j, &hash) in hashes.iter().enumerate() {
        positions.entry(hash).or_default().push(base + j);
    }
    positions
}
