//! Disk side of a job: part file sweeping and ordered reassembly.
//!
//! Part files are append-only buffers owned by one segment each. Once every
//! segment succeeded they are concatenated in index order into a temp file that
//! is atomically renamed onto the destination, then swept.

mod merge;
mod sweep;

pub use merge::{merge_parts, MergeError, MergeSummary};
pub use sweep::{find_part_files, remove_part_files, SweepError};

use std::path::{Path, PathBuf};

/// Copy buffer size for streaming part files and the default libcurl receive buffer.
pub const BUF_SIZE: usize = 8 * 1024;

/// Suffix of the file the reassembler writes before renaming onto the destination.
pub const MERGE_SUFFIX: &str = ".merging";

/// Temp path used while merging: `file.iso` → `file.iso.merging`.
pub fn merge_temp_path(destination: &Path) -> PathBuf {
    let mut o = destination.as_os_str().to_owned();
    o.push(MERGE_SUFFIX);
    PathBuf::from(o)
}

/// Directory holding `destination` (`.` for a bare file name).
pub(crate) fn parent_dir(destination: &Path) -> &Path {
    match destination.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    }
}
