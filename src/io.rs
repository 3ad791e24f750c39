// File-level I/O helpers for delta computation.
//
// Provides `open_input()` (buffered reader with the two-block minimum),
// `diff_files()` which runs both stages over two files, and `read_block()`,
// the block reader used by the signature stage.

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::num::NonZeroUsize;
use std::path::Path;

use log::{debug, info};

use crate::delta::Delta;
use crate::engine;
use crate::error::{DeltaError, Result};
use crate::hash::config::DeltaOptions;

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// Statistics returned by `diff_files()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffStats {
    /// Old file size in bytes.
    pub old_size: u64,
    /// New file size in bytes.
    pub new_size: u64,
    /// Block size used for the signature.
    pub block_size: usize,
    /// Number of blocks in the old file's signature.
    pub signature_blocks: usize,
    /// Blocks found at their original offset.
    pub original: usize,
    /// Blocks found at a different offset.
    pub moved: usize,
    /// Regions with no accepted match.
    pub changed: usize,
}

// ---------------------------------------------------------------------------
// Default buffer size
// ---------------------------------------------------------------------------

const BUF_SIZE: usize = 64 * 1024; // 64 KiB

// ---------------------------------------------------------------------------
// Block reads
// ---------------------------------------------------------------------------

/// Fill `buf` from `reader`, retrying short and interrupted reads.
///
/// Returns the number of bytes read, which is less than `buf.len()` only at
/// end-of-stream.
pub fn read_block<R: Read + ?Sized>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

// ---------------------------------------------------------------------------
// open_input
// ---------------------------------------------------------------------------

/// Open `path` for buffered reading.
///
/// Fails with [`DeltaError::TooSmall`] unless the file spans at least two
/// blocks of `block_size` bytes (a partial last block counts).
pub fn open_input(path: &Path, block_size: NonZeroUsize) -> Result<BufReader<File>> {
    let open_err = |source| DeltaError::Open {
        path: path.to_path_buf(),
        source,
    };
    let file = File::open(path).map_err(open_err)?;
    let size = file.metadata().map_err(open_err)?.len();

    let blocks = size.div_ceil(block_size.get() as u64);
    if blocks <= 1 {
        return Err(DeltaError::TooSmall {
            path: path.to_path_buf(),
            size,
            block_size: block_size.get(),
        });
    }
    debug!("{}: {size} bytes, {blocks} blocks", path.display());

    Ok(BufReader::with_capacity(BUF_SIZE, file))
}

// ---------------------------------------------------------------------------
// diff_files
// ---------------------------------------------------------------------------

/// Compute the delta of `new_path` against `old_path`.
///
/// Both files are opened (and size-checked) before either is read. The old
/// file is read block by block, the new file byte by byte, both through
/// 64 KiB buffers.
pub fn diff_files(
    old_path: &Path,
    new_path: &Path,
    block_size: NonZeroUsize,
    opts: &DeltaOptions,
) -> Result<(Delta, DiffStats)> {
    let old_reader = open_input(old_path, block_size)?;
    let new_reader = open_input(new_path, block_size)?;
    let old_size = old_reader.get_ref().metadata()?.len();

    let signature = engine::signature(old_reader, block_size, opts)?;
    let delta = engine::delta(new_reader, &signature, opts)?;

    let summary = delta.summary();
    let stats = DiffStats {
        old_size,
        new_size: delta.new_size as u64,
        block_size: block_size.get(),
        signature_blocks: signature.len(),
        original: summary.original,
        moved: summary.moved,
        changed: summary.changed,
    };
    info!(
        "diff: old {} bytes ({} blocks), new {} bytes: {} original, {} moved, {} changed",
        stats.old_size,
        stats.signature_blocks,
        stats.new_size,
        stats.original,
        stats.moved,
        stats.changed
    );

    Ok((delta, stats))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delta::format_delta;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn bs(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    fn write_temp_file(dir: &TempDir, name: &str, data: &[u8]) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, data).unwrap();
        path
    }

    /// Reader that returns `Interrupted` before every successful read.
    struct Flaky<'a> {
        data: &'a [u8],
        interrupt: bool,
    }

    impl Read for Flaky<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.interrupt = !self.interrupt;
            if self.interrupt {
                return Err(io::ErrorKind::Interrupted.into());
            }
            let n = buf.len().min(self.data.len()).min(2);
            buf[..n].copy_from_slice(&self.data[..n]);
            self.data = &self.data[n..];
            Ok(n)
        }
    }

    #[test]
    fn read_block_retries_interrupts_and_short_reads() {
        let mut r = Flaky {
            data: b"abcdefg",
            interrupt: false,
        };
        let mut buf = [0u8; 4];
        assert_eq!(read_block(&mut r, &mut buf).unwrap(), 4);
        assert_eq!(&buf, b"abcd");
        assert_eq!(read_block(&mut r, &mut buf).unwrap(), 3);
        assert_eq!(&buf[..3], b"efg");
        assert_eq!(read_block(&mut r, &mut buf).unwrap(), 0);
    }

    #[test]
    fn open_input_requires_two_blocks() {
        let dir = tempfile::tempdir().unwrap();
        let exact = write_temp_file(&dir, "exact.bin", b"abc");
        let err = open_input(&exact, bs(3)).unwrap_err();
        assert!(matches!(err, DeltaError::TooSmall { size: 3, block_size: 3, .. }));
        assert_eq!(err.to_string(), "at least 2 blocks are required");

        let empty = write_temp_file(&dir, "empty.bin", b"");
        assert!(matches!(
            open_input(&empty, bs(3)),
            Err(DeltaError::TooSmall { size: 0, .. })
        ));

        // A partial second block is enough.
        let partial = write_temp_file(&dir, "partial.bin", b"abcd");
        assert!(open_input(&partial, bs(3)).is_ok());
    }

    #[test]
    fn open_input_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.bin");
        let err = open_input(&missing, bs(3)).unwrap_err();
        match err {
            DeltaError::Open { path, source } => {
                assert_eq!(path, missing);
                assert_eq!(source.kind(), io::ErrorKind::NotFound);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn diff_files_insertion() {
        let dir = tempfile::tempdir().unwrap();
        let old = write_temp_file(&dir, "old.bin", b"123456789");
        let new = write_temp_file(&dir, "new.bin", b"123abc456789");

        let (delta, stats) = diff_files(&old, &new, bs(3), &DeltaOptions::default()).unwrap();
        assert_eq!(
            format_delta(&delta),
            "O 0:3 0:3\nC 3:6 0:0\nM 6:9 3:6\nM 9:12 6:9\n"
        );
        assert_eq!(
            stats,
            DiffStats {
                old_size: 9,
                new_size: 12,
                block_size: 3,
                signature_blocks: 3,
                original: 1,
                moved: 2,
                changed: 1,
            }
        );
    }

    #[test]
    fn diff_files_checks_new_file_size() {
        let dir = tempfile::tempdir().unwrap();
        let old = write_temp_file(&dir, "old.bin", b"123456789");
        let new = write_temp_file(&dir, "new.bin", b"12");
        let err = diff_files(&old, &new, bs(3), &DeltaOptions::default()).unwrap_err();
        assert!(matches!(err, DeltaError::TooSmall { ref path, .. } if *path == new));
    }

    #[test]
    fn diff_files_large_block_aligned_edit() {
        let dir = tempfile::tempdir().unwrap();
        let mut seed = 42u64;
        let old_data: Vec<u8> = (0..64 * 1024)
            .map(|_| {
                seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1);
                (seed >> 33) as u8
            })
            .collect();
        let mut new_data = old_data.clone();
        for b in &mut new_data[4096..8192] {
            *b = b.wrapping_add(1);
        }
        let old = write_temp_file(&dir, "old.bin", &old_data);
        let new = write_temp_file(&dir, "new.bin", &new_data);

        let (_, stats) = diff_files(&old, &new, bs(1024), &DeltaOptions::default()).unwrap();
        assert_eq!(stats.signature_blocks, 64);
        assert_eq!(stats.original, 60);
        assert_eq!(stats.moved, 0);
        assert_eq!(stats.changed, 1);
    }
}
