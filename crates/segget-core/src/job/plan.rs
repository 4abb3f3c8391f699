//! Pure planning step: requested parts + probe result → segments and fetch mode.

use std::fmt;
use std::path::Path;

use crate::downloader::FetchMode;
use crate::probe::Capabilities;
use crate::segmenter::{plan_segments, Segment};

/// Why a job runs with fewer segments than requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Degradation {
    /// No `Content-Length`: single stream of unknown length.
    NoContentLength,
    /// No `Accept-Ranges`: single stream, no resume.
    NoRangeSupport,
    /// `Content-Length: 0`: nothing to split.
    EmptyResource,
    /// Fewer bytes than requested parts; one byte per part at most.
    ClampedParts { requested: usize, effective: usize },
}

impl fmt::Display for Degradation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Degradation::NoContentLength => {
                write!(f, "the URL does not provide a \"Content-Length\" header")
            }
            Degradation::NoRangeSupport => write!(f, "the URL does not accept range downloads"),
            Degradation::EmptyResource => write!(f, "the resource is empty"),
            Degradation::ClampedParts {
                requested,
                effective,
            } => write!(
                f,
                "resource is smaller than {} bytes; using {} part(s)",
                requested, effective
            ),
        }
    }
}

/// Resolved shape of a job, fixed before any byte is fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPlan {
    pub total_size: Option<u64>,
    pub range_supported: bool,
    pub requested_parts: usize,
    pub effective_parts: usize,
    pub mode: FetchMode,
    pub degraded: Vec<Degradation>,
    pub segments: Vec<Segment>,
}

impl ResolvedPlan {
    /// Builds the plan. Parallelism requires both a content length and range
    /// support; otherwise the job falls back to one plain GET into `destination`.
    pub fn resolve(destination: &Path, requested_parts: usize, caps: &Capabilities) -> Self {
        let mut degraded = Vec::new();
        if caps.content_length.is_none() {
            degraded.push(Degradation::NoContentLength);
        }
        if !caps.accept_ranges {
            degraded.push(Degradation::NoRangeSupport);
        }

        let (mode, effective_parts) = match caps.content_length {
            Some(0) => {
                degraded.push(Degradation::EmptyResource);
                (
                    FetchMode::Whole {
                        content_length: Some(0),
                    },
                    1,
                )
            }
            Some(total_size) if caps.accept_ranges => {
                let mut parts = requested_parts.max(1);
                if parts as u64 > total_size {
                    let effective = total_size as usize;
                    degraded.push(Degradation::ClampedParts {
                        requested: parts,
                        effective,
                    });
                    parts = effective;
                }
                (FetchMode::Ranged { total_size }, parts)
            }
            content_length => (FetchMode::Whole { content_length }, 1),
        };

        let segments = plan_segments(caps.content_length.unwrap_or(0), effective_parts, destination);

        ResolvedPlan {
            total_size: caps.content_length,
            range_supported: caps.accept_ranges,
            requested_parts,
            effective_parts,
            mode,
            degraded,
            segments,
        }
    }

    pub fn is_segmented(&self) -> bool {
        self.segments.len() > 1
    }

    /// Whether fetching resumes from bytes already in the working files.
    /// Plain GETs start over.
    pub fn resumes_in_place(&self) -> bool {
        matches!(self.mode, FetchMode::Ranged { .. })
    }
}
