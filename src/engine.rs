// Delta engine: ties the signature and delta stages together.
//
// Provides high-level APIs that run:
//   - Signature construction over the old version (optionally with digests)
//   - Delta construction over the new version against that signature
//
// The two stages run strictly one after the other; the delta stage needs the
// complete signature.

use std::io::{self, Read};
use std::num::NonZeroUsize;

use crate::delta::{Delta, DeltaBuilder, Signature, SignatureBuilder};
use crate::error::Result;
use crate::hash::config::DeltaOptions;

// ---------------------------------------------------------------------------
// Stages
// ---------------------------------------------------------------------------

/// Build the signature of `old` as configured by `opts`.
pub fn signature<R: Read>(
    old: R,
    block_size: NonZeroUsize,
    opts: &DeltaOptions,
) -> io::Result<Signature> {
    let builder = SignatureBuilder::new(block_size);
    #[cfg(feature = "verify")]
    let builder = builder.with_digests(opts.verify);
    #[cfg(not(feature = "verify"))]
    {
        if opts.verify {
            log::warn!("verified matching requested but the `verify` feature is disabled");
        }
    }
    builder.build(old)
}

/// Build the delta of `new` against `signature`.
pub fn delta<R: Read>(new: R, signature: &Signature, opts: &DeltaOptions) -> io::Result<Delta> {
    DeltaBuilder::with_options(signature, opts).build(new)
}

// ---------------------------------------------------------------------------
// High-level diff
// ---------------------------------------------------------------------------

/// Compute the delta of `new` against `old` with default options.
///
/// `new` is read one byte at a time; wrap unbuffered sources in a
/// `BufReader`.
pub fn diff<O: Read, N: Read>(old: O, new: N, block_size: NonZeroUsize) -> Result<Delta> {
    diff_with_options(old, new, block_size, &DeltaOptions::default())
}

/// Compute the delta with custom options.
pub fn diff_with_options<O: Read, N: Read>(
    old: O,
    new: N,
    block_size: NonZeroUsize,
    opts: &DeltaOptions,
) -> Result<Delta> {
    let signature = signature(old, block_size, opts)?;
    Ok(delta(new, &signature, opts)?)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
