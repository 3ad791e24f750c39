// Rabin-Karp rolling hash over 32-bit wrapping arithmetic.
//
// A window of `block_size` bytes hashes to
//
//     h = b[0]*B^(n-1) + b[1]*B^(n-2) + ... + b[n-1]    (mod 2^32)
//
// Sliding the window one byte to the right is O(1):
//
//     h' = h*B + incoming - B^n * outgoing
//
// where `B^n` is precomputed once per block size.

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Polynomial base (the 32-bit FNV prime).
pub const PRIME_RK: u32 = 16_777_619;

/// Byte used to pad a window that runs past end-of-stream.
///
/// Both the final short signature block and the virtual tail windows of the
/// new version are padded with this value, so a trailing partial block can
/// still match.
pub const PAD_BYTE: u8 = 0;

/// `PRIME_RK^exp mod 2^32` by binary exponentiation.
pub fn pow_mod32(exp: usize) -> u32 {
    let mut pow: u32 = 1;
    let mut mul = PRIME_RK;
    let mut i = exp;
    while i > 0 {
        if i & 1 != 0 {
            pow = pow.wrapping_mul(mul);
        }
        mul = mul.wrapping_mul(mul);
        i >>= 1;
    }
    pow
}

// ---------------------------------------------------------------------------
// Rolling hash state
// ---------------------------------------------------------------------------

/// Stateful rolling hash for a fixed window width.
///
/// Hash the first window with [`hash_block`](Self::hash_block), then advance
/// one byte at a time with [`roll`](Self::roll). Rolling from a state that
/// was never primed by `hash_block` starts from an accumulator of zero.
#[derive(Debug, Clone)]
pub struct RollingHash {
    /// Window width in bytes.
    pub block_size: usize,
    /// `PRIME_RK^block_size`, the weight of the byte leaving the window.
    pow: u32,
    hash: u32,
}

impl RollingHash {
    /// Build hash state for the given window width.
    pub fn new(block_size: usize) -> Self {
        Self {
            block_size,
            pow: pow_mod32(block_size),
            hash: 0,
        }
    }

    /// Reset the accumulator and hash the first `block_size` bytes of `block`
    /// (Horner's method).
    ///
    /// Panics if `block` is shorter than the window; callers pad short blocks
    /// with [`PAD_BYTE`] first.
    #[inline]
    pub fn hash_block(&mut self, block: &[u8]) -> u32 {
        self.hash = block[..self.block_size]
            .iter()
            .fold(0u32, |h, &b| h.wrapping_mul(PRIME_RK).wrapping_add(b as u32));
        self.hash
    }

    /// Slide the window one byte: drop `outgoing`, append `incoming`.
    #[inline(always)]
    pub fn roll(&mut self, outgoing: u8, incoming: u8) -> u32 {
        self.hash = self
            .hash
            .wrapping_mul(PRIME_RK)
            .wrapping_add(incoming as u32)
            .wrapping_sub(self.pow.wrapping_mul(outgoing as u32));
        self.hash
    }

    /// Current hash value.
    #[inline(always)]
    pub fn value(&self) -> u32 {
        self.hash
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
