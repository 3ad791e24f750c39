// Block signature of the old version.
//
// The old version is cut into consecutive non-overlapping blocks of
// `block_size` bytes and each block is hashed with the rolling hash. A final
// short block is padded with `PAD_BYTE` up to the full block size and still
// contributes one entry.

use std::io::{self, Read};
use std::num::NonZeroUsize;

use log::debug;

use crate::hash::rolling::{PAD_BYTE, RollingHash};
#[cfg(feature = "verify")]
use crate::hash::strong::{self, BlockDigest};
use crate::io::read_block;

/// Ordered block hashes of the old version.
///
/// `hashes()[i]` covers old bytes `[i * block_size, (i + 1) * block_size)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    block_size: usize,
    hashes: Vec<u32>,
    #[cfg(feature = "verify")]
    digests: Option<Vec<BlockDigest>>,
}

impl Signature {
    /// Signature from precomputed block hashes.
    pub fn new(block_size: NonZeroUsize, hashes: Vec<u32>) -> Self {
        Self {
            block_size: block_size.get(),
            hashes,
            #[cfg(feature = "verify")]
            digests: None,
        }
    }

    /// Signature with precomputed block hashes and SHA-256 block digests.
    ///
    /// `digests` must hold one entry per hash.
    #[cfg(feature = "verify")]
    pub fn verified(block_size: NonZeroUsize, hashes: Vec<u32>, digests: Vec<BlockDigest>) -> Self {
        debug_assert_eq!(hashes.len(), digests.len());
        Self {
            block_size: block_size.get(),
            hashes,
            digests: Some(digests),
        }
    }

    /// Block size in bytes.
    #[inline]
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Block hashes in old-version order.
    #[inline]
    pub fn hashes(&self) -> &[u32] {
        &self.hashes
    }

    /// Number of blocks.
    pub fn len(&self) -> usize {
        self.hashes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hashes.is_empty()
    }

    /// Per-block SHA-256 digests, present when built for verified matching.
    #[cfg(feature = "verify")]
    pub fn digests(&self) -> Option<&[BlockDigest]> {
        self.digests.as_deref()
    }

    /// Whether weak hash hits against this signature get confirmed.
    pub fn is_verified(&self) -> bool {
        #[cfg(feature = "verify")]
        {
            self.digests.is_some()
        }
        #[cfg(not(feature = "verify"))]
        {
            false
        }
    }
}

/// Builds a [`Signature`] from a byte source.
#[derive(Debug, Clone)]
pub struct SignatureBuilder {
    block_size: NonZeroUsize,
    #[cfg(feature = "verify")]
    digests: bool,
}

impl SignatureBuilder {
    pub fn new(block_size: NonZeroUsize) -> Self {
        Self {
            block_size,
            #[cfg(feature = "verify")]
            digests: false,
        }
    }

    /// Also record a SHA-256 digest per block for verified matching.
    #[cfg(feature = "verify")]
    pub fn with_digests(mut self, enabled: bool) -> Self {
        self.digests = enabled;
        self
    }

    /// Read `reader` to end-of-stream and hash every block.
    ///
    /// Read errors are returned unchanged.
    pub fn build<R: Read>(&self, mut reader: R) -> io::Result<Signature> {
        let block_size = self.block_size.get();
        let mut hash = RollingHash::new(block_size);
        let mut block = vec![PAD_BYTE; block_size];
        let mut hashes = Vec::new();
        #[cfg(feature = "verify")]
        let mut digests = self.digests.then(Vec::new);

        loop {
            let n = read_block(&mut reader, &mut block)?;
            if n == 0 {
                break;
            }
            block[n..].fill(PAD_BYTE);
            hashes.push(hash.hash_block(&block));
            #[cfg(feature = "verify")]
            {
                if let Some(digests) = digests.as_mut() {
                    digests.push(strong::block_digest(&block, block_size));
                }
            }
            if n < block_size {
                break;
            }
        }

        debug!("signature: {} blocks of {block_size} bytes", hashes.len());

        Ok(Signature {
            block_size,
            hashes,
            #[cfg(feature = "verify")]
            digests,
        })
    }
}
