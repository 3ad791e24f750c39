//! Blockdelta: block-level rolling-hash deltas between two versions of a file.
//!
//! The crate provides:
//! - A Rabin-Karp rolling hash and candidate index (`hash`)
//! - Signature and delta construction plus text rendering (`delta`)
//! - High-level reader-based APIs (`engine`)
//! - File-oriented helpers (`io`)
//! - An optional CLI (`cli` feature)
//!
//! # Quick Start
//!
//! ```
//! use std::num::NonZeroUsize;
//! use blockdelta::{delta::format_delta, engine};
//!
//! let old = b"123456789";
//! let new = b"123abc456789";
//!
//! let block_size = NonZeroUsize::new(3).unwrap();
//! let delta = engine::diff(&old[..], &new[..], block_size).unwrap();
//! assert_eq!(
//!     format_delta(&delta),
//!     "O 0:3 0:3\nC 3:6 0:0\nM 6:9 3:6\nM 9:12 6:9\n"
//! );
//! ```

pub mod delta;
pub mod engine;
pub mod error;
pub mod hash;
pub mod io;

#[cfg(feature = "cli")]
pub mod cli;
