//! Single-segment HTTP GET into its working file, resuming from what is on disk.

use std::cell::Cell;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::str;

use super::error::SegmentError;
use super::{FetchContext, FetchMode, FetchOutcome};
use crate::http::parse_status_line;
use crate::segmenter::Segment;

/// Fetches one segment. Performs no retries; the caller re-runs the whole job
/// to resume.
pub fn fetch_segment(ctx: &FetchContext<'_>, segment: &Segment) -> Result<FetchOutcome, SegmentError> {
    match ctx.mode {
        FetchMode::Ranged { total_size } => fetch_range(ctx, segment, total_size),
        FetchMode::Whole { content_length } => fetch_whole(ctx, segment, content_length),
    }
}

fn fetch_range(
    ctx: &FetchContext<'_>,
    segment: &Segment,
    total_size: u64,
) -> Result<FetchOutcome, SegmentError> {
    let open_err = |source| SegmentError::Open {
        path: segment.path.clone(),
        source,
    };
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&segment.path)
        .map_err(open_err)?;
    let on_disk = file.metadata().map_err(open_err)?.len();

    let expected = segment.expected_len(total_size);
    if on_disk >= expected {
        tracing::debug!(segment = segment.index, on_disk, "segment already complete");
        return Ok(FetchOutcome::AlreadyComplete);
    }

    let offset = segment.begin + on_disk;
    let remaining = expected - on_disk;
    // A plain 200 is only usable when it is exactly what we asked for.
    let full_body_ok = offset == 0 && expected == total_size;

    tracing::debug!(
        segment = segment.index,
        range = %segment.range_header_value(offset),
        resumed_from = on_disk,
        "fetching segment"
    );

    let mut easy = ctx.http.easy(ctx.url)?;
    easy.range(&format!("{}-{}", offset, segment.end))?;

    let accept = |reply: &Reply| match reply.status {
        206 => reply.range_start.map_or(true, |start| start == offset),
        200 => full_body_ok,
        _ => false,
    };
    let streamed = stream_body(&mut easy, &mut file, Some(remaining), accept)?;
    let received = streamed.received;

    match streamed.reply {
        Reply { status, .. } if !(200..300).contains(&status) => {
            return Err(SegmentError::Status(status));
        }
        Reply {
            status: 206,
            range_start: Some(served),
        } if served != offset => {
            return Err(SegmentError::RangeMismatch {
                requested: offset,
                served,
            });
        }
        reply if !accept(&reply) => {
            return Err(SegmentError::RangeIgnored {
                offset,
                end: segment.end,
            });
        }
        _ => {}
    }
    if received < remaining {
        return Err(SegmentError::Incomplete {
            expected: remaining,
            received,
        });
    }

    Ok(FetchOutcome::Downloaded {
        bytes: received,
        resumed_from: on_disk,
    })
}

/// Plain GET of the whole resource. Nothing can be resumed without ranges, so
/// the working file is truncated first.
fn fetch_whole(
    ctx: &FetchContext<'_>,
    segment: &Segment,
    content_length: Option<u64>,
) -> Result<FetchOutcome, SegmentError> {
    let mut file = File::create(&segment.path).map_err(|source| SegmentError::Open {
        path: segment.path.clone(),
        source,
    })?;

    tracing::debug!(path = %segment.path.display(), ?content_length, "fetching whole resource");

    let mut easy = ctx.http.easy(ctx.url)?;
    let accept = |reply: &Reply| (200..300).contains(&reply.status);
    let streamed = stream_body(&mut easy, &mut file, content_length, accept)?;
    let received = streamed.received;

    if !accept(&streamed.reply) {
        return Err(SegmentError::Status(streamed.reply.status));
    }
    if let Some(expected) = content_length {
        if received < expected {
            return Err(SegmentError::Incomplete { expected, received });
        }
    }

    Ok(FetchOutcome::Downloaded {
        bytes: received,
        resumed_from: 0,
    })
}

/// Status line and `Content-Range` start of the response being received.
#[derive(Debug, Clone, Copy, Default)]
struct Reply {
    status: u32,
    range_start: Option<u64>,
}

struct Streamed {
    reply: Reply,
    received: u64,
}

/// Runs the transfer, appending the body to `file` when the response passes
/// `accept`. Any other response (error page, ignored or misplaced range) is
/// aborted at its first body chunk and nothing of it is written.
/// Never writes more than `limit` bytes. A body cut short by the server is not
/// an error here; the caller compares `received` with what it expected.
fn stream_body(
    easy: &mut curl::easy::Easy,
    file: &mut File,
    limit: Option<u64>,
    accept: impl Fn(&Reply) -> bool,
) -> Result<Streamed, SegmentError> {
    let reply = Cell::new(Reply::default());
    let mut received = 0u64;
    let mut write_error: Option<io::Error> = None;
    let mut overrun = false;
    let mut rejected = false;

    let performed = {
        let mut transfer = easy.transfer();
        transfer.header_function(|line| {
            let Ok(line) = str::from_utf8(line) else {
                return true;
            };
            if let Some(status) = parse_status_line(line) {
                // each response of a redirect chain starts over
                reply.set(Reply {
                    status,
                    range_start: None,
                });
            } else if let Some(start) = parse_content_range_start(line) {
                reply.set(Reply {
                    range_start: Some(start),
                    ..reply.get()
                });
            }
            true
        })?;
        transfer.write_function(|data| {
            if !accept(&reply.get()) {
                rejected = true;
                return Ok(0); // abort transfer
            }
            let take = match limit {
                Some(l) => (l - received).min(data.len() as u64) as usize,
                None => data.len(),
            };
            if let Err(e) = file.write_all(&data[..take]) {
                write_error = Some(e);
                return Ok(0);
            }
            received += take as u64;
            if take < data.len() {
                overrun = true;
                return Ok(0);
            }
            Ok(data.len())
        })?;
        transfer.perform()
    };

    if let Some(e) = write_error {
        return Err(SegmentError::PartWrite(e));
    }
    if overrun {
        return Err(SegmentError::Overrun {
            expected: limit.unwrap_or(received),
        });
    }
    match performed {
        Ok(()) => {}
        Err(e) if rejected && e.is_write_error() => {}
        Err(e) if e.is_partial_file() => {
            tracing::debug!(received, "server closed the connection mid-body");
        }
        Err(e) => return Err(e.into()),
    }
    file.flush().map_err(SegmentError::PartWrite)?;
    Ok(Streamed {
        reply: reply.get(),
        received,
    })
}

/// `Content-Range: bytes X-Y/Z` → `X`.
fn parse_content_range_start(line: &str) -> Option<u64> {
    let (name, value) = line.split_once(':')?;
    if !name.trim().eq_ignore_ascii_case("content-range") {
        return None;
    }
    let range = value.trim().strip_prefix("bytes")?.trim_start();
    let (start, _) = range.split_once('-')?;
    start.trim().parse().ok()
}
