// SHA-256 block digests for verified matching.
//
// A weak (rolling) hash hit is only trusted in verified mode when the strong
// digest of the zero-padded window agrees with the signature's block digest.

use sha2::{Digest, Sha256};

use super::rolling::PAD_BYTE;

/// SHA-256 digest of one block.
pub type BlockDigest = [u8; 32];

/// Digest of `data` treated as a `block_size` window: bytes past the end of
/// `data` are [`PAD_BYTE`], bytes beyond `block_size` are ignored.
pub fn block_digest(data: &[u8], block_size: usize) -> BlockDigest {
    let mut hasher = Sha256::new();
    let take = data.len().min(block_size);
    hasher.update(&data[..take]);
    let mut missing = block_size - take;
    const PAD: [u8; 64] = [PAD_BYTE; 64];
    while missing > 0 {
        let n = missing.min(PAD.len());
        hasher.update(&PAD[..n]);
        missing -= n;
    }
    hasher.finalize().into()
}

/// Digest of the window starting at `pos` in `data`.
pub fn window_digest(data: &[u8], pos: usize, block_size: usize) -> BlockDigest {
    let start = pos.min(data.len());
    block_digest(&data[start..], block_size)
}
