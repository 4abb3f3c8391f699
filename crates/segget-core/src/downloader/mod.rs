//! Segmented downloader engine.
//!
//! Runs one HTTP Range GET per segment, each on its own thread, appending into
//! the segment's part file. All segments are launched at once and every one
//! reports exactly one outcome; the coordinator waits for all of them before
//! deciding, so a fast failure never cancels slower segments still in flight.

mod error;
mod segment;

pub use error::{PartialDownloadError, SegmentError, SegmentFailure};
pub use segment::fetch_segment;

use std::sync::mpsc;
use std::thread;

use crate::http::HttpOptions;
use crate::segmenter::Segment;

/// How segments are requested from the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    /// Range GETs with resume from the part file size. Size and range support known.
    Ranged { total_size: u64 },
    /// One plain GET of the whole resource, no `Range` header, no resume.
    Whole { content_length: Option<u64> },
}

/// Everything a segment fetch needs besides the segment itself.
#[derive(Debug, Clone, Copy)]
pub struct FetchContext<'a> {
    pub url: &'a str,
    pub http: &'a HttpOptions,
    pub mode: FetchMode,
}

/// Result of a successful segment fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The part file already held the whole segment; no request was made.
    AlreadyComplete,
    Downloaded { bytes: u64, resumed_from: u64 },
}

/// Totals for a coordinator run in which every segment succeeded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DownloadSummary {
    pub bytes_downloaded: u64,
    pub segments_downloaded: usize,
    pub segments_already_complete: usize,
}

/// Downloads every segment concurrently, one thread per segment.
///
/// Waits for all outcomes. Returns every failure (sorted by index) if any
/// segment failed; part files stay on disk for a later resume.
pub fn download_segments(
    ctx: &FetchContext<'_>,
    segments: &[Segment],
) -> Result<DownloadSummary, PartialDownloadError> {
    let count = segments.len();
    let (tx, rx) = mpsc::channel::<(usize, Result<FetchOutcome, SegmentError>)>();

    let outcomes = thread::scope(|scope| {
        for segment in segments {
            let tx = tx.clone();
            scope.spawn(move || {
                let res = fetch_segment(ctx, segment);
                let _ = tx.send((segment.index, res));
            });
        }
        drop(tx);

        let mut outcomes = Vec::with_capacity(count);
        for _ in 0..count {
            match rx.recv() {
                Ok(outcome) => outcomes.push(outcome),
                Err(_) => break,
            }
        }
        outcomes
    });

    let mut summary = DownloadSummary::default();
    let mut failures = Vec::new();
    for (index, res) in outcomes {
        match res {
            Ok(FetchOutcome::AlreadyComplete) => summary.segments_already_complete += 1,
            Ok(FetchOutcome::Downloaded { bytes, resumed_from }) => {
                tracing::debug!(segment = index, bytes, resumed_from, "segment done");
                summary.bytes_downloaded += bytes;
                summary.segments_downloaded += 1;
            }
            Err(error) => {
                tracing::warn!(segment = index, "segment failed: {}", error);
                failures.push(SegmentFailure { index, error });
            }
        }
    }

    if failures.is_empty() {
        Ok(summary)
    } else {
        failures.sort_by_key(|f| f.index);
        Err(PartialDownloadError {
            failures,
            segment_count: count,
        })
    }
}
