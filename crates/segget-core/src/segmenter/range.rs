//! Segment type and range planning.

use std::path::{Path, PathBuf};

use super::naming::part_path;

/// A single segment: byte range `[begin, end]` (both inclusive) bound to a working file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    /// Position in the plan; part files are merged in this order.
    pub index: usize,
    pub begin: u64,
    pub end: u64,
    /// Part file, or the destination itself for a single-segment plan.
    pub path: PathBuf,
}

impl Segment {
    /// Bytes the server can actually deliver for this segment.
    ///
    /// The last segment's `end` is `total_size`, one past the final byte, so it
    /// is clamped here. Used as the completeness test when resuming.
    pub fn expected_len(&self, total_size: u64) -> u64 {
        if total_size == 0 {
            return 0;
        }
        let last = self.end.min(total_size - 1);
        (last + 1).saturating_sub(self.begin)
    }

    /// HTTP Range header value when resuming at `offset`: `bytes=offset-end`.
    pub fn range_header_value(&self, offset: u64) -> String {
        format!("bytes={}-{}", offset, self.end)
    }
}

/// Builds the segment plan for `total_size` bytes split into `part_count` parts.
///
/// `size_per_part = total_size / part_count` with the remainder dropped; the
/// last segment's end is forced to `total_size`, absorbing the remainder. With
/// one part the segment spans `[0, total_size]` and writes to `destination`.
///
/// Callers must keep `1 <= part_count <= total_size` for multi-part plans; the
/// job planner clamps before calling.
pub fn plan_segments(total_size: u64, part_count: usize, destination: &Path) -> Vec<Segment> {
    if part_count <= 1 {
        return vec![Segment {
            index: 0,
            begin: 0,
            end: total_size,
            path: destination.to_path_buf(),
        }];
    }

    let parts = part_count as u64;
    let size_per_part = total_size / parts;

    (0..part_count)
        .map(|i| {
            let n = i as u64;
            let begin = n * size_per_part;
            let end = if i == part_count - 1 {
                total_size
            } else {
                ((n + 1) * size_per_part).saturating_sub(1)
            };
            Segment {
                index: i,
                begin,
                end,
                path: part_path(destination, i),
            }
        })
        .collect()
}
