//! Job-level API: validate, probe and plan once, then run.
//!
//! `DownloadJob::prepare` is the only place a job is built; the resulting
//! plan is never mutated. `run` fetches and, for multi-segment plans, merges.

mod error;
mod plan;

pub use error::JobError;
pub use plan::{Degradation, ResolvedPlan};

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::downloader::{self, FetchContext, FetchOutcome, SegmentFailure};
use crate::guard;
use crate::http::HttpOptions;
use crate::probe;
use crate::storage;

/// What the caller asked for. Immutable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRequest {
    pub url: String,
    pub destination: PathBuf,
    pub parts: usize,
    pub overwrite: bool,
}

impl JobRequest {
    pub fn new(url: impl Into<String>, destination: impl Into<PathBuf>, parts: usize) -> Self {
        Self {
            url: url.into(),
            destination: destination.into(),
            parts,
            overwrite: false,
        }
    }

    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }
}

/// A validated, probed and planned download.
#[derive(Debug, Clone)]
pub struct DownloadJob {
    request: JobRequest,
    plan: ResolvedPlan,
    http: HttpOptions,
}

/// What a successful run did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobReport {
    pub segments: usize,
    pub bytes_downloaded: u64,
    /// Segments whose part file was already complete from an earlier run.
    pub segments_reused: usize,
    pub elapsed: Duration,
}

impl DownloadJob {
    /// Validates the request, probes the server and resolves the plan.
    ///
    /// May delete files when `request.overwrite` is set. Without it, an
    /// existing destination is only accepted for a single-part ranged plan,
    /// which resumes it. Degraded plans (no size, no range support) are
    /// logged as warnings, not errors.
    pub fn prepare(request: JobRequest, http: HttpOptions) -> Result<Self, JobError> {
        guard::prepare_destination(
            &request.url,
            &request.destination,
            request.parts,
            request.overwrite,
        )?;

        let caps = probe::probe(&request.url, &http)?;
        let plan = ResolvedPlan::resolve(&request.destination, request.parts, &caps);
        guard::ensure_resumable(&request.destination, plan.resumes_in_place())?;
        for reason in &plan.degraded {
            tracing::warn!("{} - setting parallelism to {}...", reason, plan.effective_parts);
        }
        tracing::info!(
            url = %request.url,
            destination = %request.destination.display(),
            total_size = ?plan.total_size,
            parts = plan.effective_parts,
            "job prepared"
        );

        Ok(Self {
            request,
            plan,
            http,
        })
    }

    pub fn request(&self) -> &JobRequest {
        &self.request
    }

    pub fn plan(&self) -> &ResolvedPlan {
        &self.plan
    }

    pub fn destination(&self) -> &Path {
        &self.request.destination
    }

    /// Fetches all segments and reassembles them into the destination.
    ///
    /// A single-segment plan streams straight into the destination. Otherwise
    /// every segment runs to completion first; if any failed, nothing is merged
    /// and the part files are left for the next identical run to resume.
    pub fn run(&self) -> Result<JobReport, JobError> {
        let started = Instant::now();
        let ctx = FetchContext {
            url: &self.request.url,
            http: &self.http,
            mode: self.plan.mode,
        };

        let report = if self.plan.is_segmented() {
            let summary = downloader::download_segments(&ctx, &self.plan.segments)?;
            storage::merge_parts(self.destination(), &self.plan.segments)?;
            JobReport {
                segments: self.plan.segments.len(),
                bytes_downloaded: summary.bytes_downloaded,
                segments_reused: summary.segments_already_complete,
                elapsed: started.elapsed(),
            }
        } else {
            let segment = &self.plan.segments[0];
            let outcome = downloader::fetch_segment(&ctx, segment).map_err(|error| {
                JobError::Segment(SegmentFailure {
                    index: segment.index,
                    error,
                })
            })?;
            let (bytes_downloaded, segments_reused) = match outcome {
                FetchOutcome::AlreadyComplete => (0, 1),
                FetchOutcome::Downloaded { bytes, .. } => (bytes, 0),
            };
            JobReport {
                segments: 1,
                bytes_downloaded,
                segments_reused,
                elapsed: started.elapsed(),
            }
        };

        tracing::info!(
            destination = %self.destination().display(),
            bytes = report.bytes_downloaded,
            elapsed_ms = report.elapsed.as_millis() as u64,
            "download complete"
        );
        Ok(report)
    }
}
