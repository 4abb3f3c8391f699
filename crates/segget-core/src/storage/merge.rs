//! Ordered reassembly of part files into the destination.

use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use super::sweep::{remove_part_files, SweepError};
use super::{merge_temp_path, BUF_SIZE};
use crate::segmenter::Segment;

#[derive(Debug, thiserror::Error)]
pub enum MergeError {
    #[error("the download file {} could not be created", .path.display())]
    Create {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("part file {} could not be read", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("writing {} failed", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("could not move {} into place", .path.display())]
    Finalize {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The destination is complete; only removing used part files failed.
    #[error("download complete but part files could not be removed")]
    PartCleanup(#[source] SweepError),
}

/// Outcome of a successful merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeSummary {
    pub bytes_written: u64,
    pub parts_removed: usize,
}

/// Concatenates the part files of `segments` in index order into `destination`,
/// then deletes every part file of `destination` in its directory.
///
/// Data goes to `<destination>.merging` first and is renamed into place only
/// after the last part was copied and synced.
pub fn merge_parts(destination: &Path, segments: &[Segment]) -> Result<MergeSummary, MergeError> {
    let temp = merge_temp_path(destination);
    let bytes_written = match concat_into(&temp, segments) {
        Ok(n) => n,
        Err(e) => {
            if let Err(rm) = fs::remove_file(&temp) {
                if rm.kind() != io::ErrorKind::NotFound {
                    tracing::warn!("could not remove {}: {}", temp.display(), rm);
                }
            }
            return Err(e);
        }
    };

    fs::rename(&temp, destination).map_err(|source| MergeError::Finalize {
        path: destination.to_path_buf(),
        source,
    })?;
    tracing::info!(
        "merged {} part(s), {} bytes into {}",
        segments.len(),
        bytes_written,
        destination.display()
    );

    let parts_removed = remove_part_files(destination).map_err(MergeError::PartCleanup)?;
    Ok(MergeSummary {
        bytes_written,
        parts_removed,
    })
}

fn concat_into(temp: &Path, segments: &[Segment]) -> Result<u64, MergeError> {
    let write_err = |source| MergeError::Write {
        path: temp.to_path_buf(),
        source,
    };
    let mut out = File::create(temp).map_err(|source| MergeError::Create {
        path: temp.to_path_buf(),
        source,
    })?;

    let mut ordered: Vec<&Segment> = segments.iter().collect();
    ordered.sort_by_key(|s| s.index);

    let mut buf = [0u8; BUF_SIZE];
    let mut total = 0u64;
    for segment in ordered {
        let read_err = |source| MergeError::Read {
            path: segment.path.clone(),
            source,
        };
        let mut part = File::open(&segment.path).map_err(read_err)?;
        loop {
            let n = part.read(&mut buf).map_err(read_err)?;
            if n == 0 {
                break;
            }
            out.write_all(&buf[..n]).map_err(write_err)?;
            total += n as u64;
        }
    }
    out.sync_all().map_err(write_err)?;
    Ok(total)
}
