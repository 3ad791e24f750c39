// Hashing primitives for block matching.
//
// This module provides:
// - The Rabin-Karp rolling hash used for signatures and window scans
// - A hash-to-positions index over the new version
// - Matcher options (lookup strategy, verified mode)
// - SHA-256 block digests for verified matching (`verify` feature)

pub mod config;
pub mod rolling;
#[cfg(feature = "verify")]
pub mod strong;
pub mod table;
