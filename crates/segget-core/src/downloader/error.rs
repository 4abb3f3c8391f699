//! Per-segment and aggregate download errors.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Why a single segment fetch failed. Terminal for that segment; part file
/// bytes already on disk are kept for a later run to resume from.
#[derive(Debug, thiserror::Error)]
pub enum SegmentError {
    #[error("part file {} could not be opened", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("request failed")]
    Request(#[source] curl::Error),
    #[error("server returned HTTP {0}, expected 2XX")]
    Status(u32),
    /// Server answered a ranged request with the full body (200) for a partial segment.
    #[error("server ignored the Range header (HTTP 200 for bytes {offset}-{end})")]
    RangeIgnored { offset: u64, end: u64 },
    /// A 206 whose `Content-Range` starts somewhere other than the requested offset.
    #[error("server answered bytes from {served} when {requested} was requested")]
    RangeMismatch { requested: u64, served: u64 },
    #[error("writing part file failed")]
    PartWrite(#[source] io::Error),
    #[error("server sent more than the {expected} bytes requested")]
    Overrun { expected: u64 },
    #[error("transfer ended early: expected {expected} bytes, got {received}")]
    Incomplete { expected: u64, received: u64 },
}

impl From<curl::Error> for SegmentError {
    fn from(e: curl::Error) -> Self {
        SegmentError::Request(e)
    }
}

/// A failed segment with its position in the plan.
#[derive(Debug, thiserror::Error)]
#[error("segment {index}: {error}")]
pub struct SegmentFailure {
    pub index: usize,
    #[source]
    pub error: SegmentError,
}

/// Every failure from one coordinator run, ordered by segment index.
#[derive(Debug)]
pub struct PartialDownloadError {
    pub failures: Vec<SegmentFailure>,
    pub segment_count: usize,
}

impl fmt::Display for PartialDownloadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} of {} segment(s) failed; part files were kept so the download can resume",
            self.failures.len(),
            self.segment_count
        )?;
        for failure in &self.failures {
            write!(f, "\n  - {}", failure)?;
            let mut source = std::error::Error::source(&failure.error);
            while let Some(s) = source {
                write!(f, ": {}", s)?;
                source = s.source();
            }
        }
        Ok(())
    }
}

impl std::error::Error for PartialDownloadError {}
