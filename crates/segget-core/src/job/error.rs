//! Job-level error: which phase failed and why.

use crate::downloader::{PartialDownloadError, SegmentFailure};
use crate::guard::GuardError;
use crate::probe::ProbeError;
use crate::storage::MergeError;

#[derive(Debug, thiserror::Error)]
pub enum JobError {
    /// Rejected while preparing; nothing was downloaded.
    #[error(transparent)]
    Guard(#[from] GuardError),
    #[error(transparent)]
    Probe(#[from] ProbeError),
    /// The only segment of a single-stream job failed.
    #[error("download failed")]
    Segment(#[source] SegmentFailure),
    /// One or more segments failed; nothing was merged.
    #[error(transparent)]
    PartialDownload(#[from] PartialDownloadError),
    #[error(transparent)]
    Merge(#[from] MergeError),
}

impl JobError {
    /// True if part files were left on disk and re-running the same job resumes it.
    pub fn is_resumable(&self) -> bool {
        matches!(self, JobError::PartialDownload(_))
            || matches!(self, JobError::Merge(MergeError::Read { .. } | MergeError::Write { .. }))
    }
}
