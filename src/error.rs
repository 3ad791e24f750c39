// Error type for file-level delta operations.
//
// The core stages only fail on byte source reads and return plain
// `std::io::Error`; this type adds the file-layer failures on top.

use std::path::PathBuf;

use thiserror::Error;

/// Errors reported by the file layer and the high-level engine API.
#[derive(Debug, Error)]
pub enum DeltaError {
    /// Read failure from a byte source, passed through unchanged.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// An input file could not be opened or inspected.
    #[error("Open: {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An input does not span at least two blocks.
    #[error("at least 2 blocks are required")]
    TooSmall {
        path: PathBuf,
        size: u64,
        block_size: usize,
    },
}

/// Result alias for [`DeltaError`].
pub type Result<T> = std::result::Result<T, DeltaError>;
