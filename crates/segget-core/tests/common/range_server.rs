//! Minimal HTTP/1.1 server that supports HEAD and Range GET for integration tests.
//!
//! Serves a single static body and records every request it sees, so tests can
//! assert on exact `Range` headers and request counts.

use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

const CHUNK: usize = 16 * 1024;

#[derive(Debug, Clone, Copy)]
pub struct RangeServerOptions {
    /// If false, HEAD and GET omit `Content-Length` (GET body ends at connection close).
    pub send_content_length: bool,
    /// If false, GET ignores Range and always returns 200 with the full body.
    pub support_ranges: bool,
    /// If false, omit `Accept-Ranges: bytes` header even if ranges work.
    pub advertise_ranges: bool,
    /// Ranged GETs whose start offset equals this value get a 500.
    pub fail_range_starting_at: Option<u64>,
    /// Status returned for HEAD (200 unless testing probe failures).
    pub head_status: u16,
    /// GET bodies stop after this many bytes and the connection is closed,
    /// although `Content-Length` announces the full length.
    pub cut_body_after: Option<usize>,
    /// Junk bytes appended to every 206 body (counted in `Content-Length`).
    pub extra_bytes: usize,
    /// 206 responses start this many bytes after the requested offset.
    pub shift_ranges_by: u64,
}

impl Default for RangeServerOptions {
    fn default() -> Self {
        Self {
            send_content_length: true,
            support_ranges: true,
            advertise_ranges: true,
            fail_range_starting_at: None,
            head_status: 200,
            cut_body_after: None,
            extra_bytes: 0,
            shift_ranges_by: 0,
        }
    }
}

/// One request as seen by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recorded {
    pub method: String,
    /// Raw `Range` header value, e.g. `bytes=0-249`.
    pub range: Option<String>,
}

pub struct RangeServer {
    pub url: String,
    requests: Arc<Mutex<Vec<Recorded>>>,
    stats: Arc<Stats>,
}

#[derive(Default)]
struct Stats {
    /// Body bytes handed to the socket, summed over all responses.
    body_bytes_sent: AtomicU64,
    /// Connections still being served.
    in_flight: AtomicUsize,
}

impl RangeServer {
    /// Waits for every open connection to finish, then returns the body bytes sent.
    pub fn body_bytes_sent(&self) -> u64 {
        let deadline = Instant::now() + Duration::from_secs(10);
        while self.stats.in_flight.load(Ordering::SeqCst) > 0 && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(10));
        }
        self.stats.body_bytes_sent.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    pub fn gets(&self) -> Vec<Recorded> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == "GET")
            .collect()
    }

    /// Sorted `Range` values of all GETs.
    pub fn get_ranges(&self) -> Vec<String> {
        let mut ranges: Vec<String> = self.gets().into_iter().filter_map(|r| r.range).collect();
        ranges.sort();
        ranges
    }
}

/// Starts a server in a background thread serving `body` at `/file.bin`.
/// The server runs until the process exits.
pub fn start(body: Vec<u8>) -> RangeServer {
    start_with_options(body, RangeServerOptions::default())
}

/// Like `start` but allows customizing server behavior.
pub fn start_with_options(body: Vec<u8>, opts: RangeServerOptions) -> RangeServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let body = Arc::new(body);
    let requests = Arc::new(Mutex::new(Vec::new()));
    let stats = Arc::new(Stats::default());
    let log = Arc::clone(&requests);
    let server_stats = Arc::clone(&stats);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let body = Arc::clone(&body);
            let log = Arc::clone(&log);
            let stats = Arc::clone(&server_stats);
            stats.in_flight.fetch_add(1, Ordering::SeqCst);
            thread::spawn(move || {
                handle(stream, &body, opts, &log, &stats);
                stats.in_flight.fetch_sub(1, Ordering::SeqCst);
            });
        }
    });
    RangeServer {
        url: format!("http://127.0.0.1:{}/file.bin", port),
        requests,
        stats,
    }
}

fn handle(
    mut stream: std::net::TcpStream,
    body: &[u8],
    opts: RangeServerOptions,
    log: &Mutex<Vec<Recorded>>,
    stats: &Stats,
) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(5)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(5)));
    let request = match read_head(&mut stream) {
        Some(r) => r,
        None => return,
    };
    let (method, raw_range) = parse_request(&request);
    log.lock().unwrap().push(Recorded {
        method: method.to_string(),
        range: raw_range.clone(),
    });

    let total = body.len() as u64;
    let accept_ranges = if opts.advertise_ranges {
        "Accept-Ranges: bytes\r\n"
    } else {
        ""
    };

    if method.eq_ignore_ascii_case("HEAD") {
        let length = if opts.send_content_length {
            format!("Content-Length: {}\r\n", total)
        } else {
            String::new()
        };
        let response = format!(
            "HTTP/1.1 {} X\r\n{}{}Connection: close\r\n\r\n",
            opts.head_status, length, accept_ranges
        );
        let _ = stream.write_all(response.as_bytes());
        return;
    }

    if !method.eq_ignore_ascii_case("GET") {
        let _ = stream.write_all(b"HTTP/1.1 405 Method Not Allowed\r\nContent-Length: 0\r\nConnection: close\r\n\r\n");
        return;
    }

    let range = raw_range.as_deref().and_then(parse_range);
    if let (Some((start, _)), Some(fail_at)) = (range, opts.fail_range_starting_at) {
        if start == fail_at {
            let msg = b"boom";
            let response = format!(
                "HTTP/1.1 500 Internal Server Error\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                msg.len()
            );
            let _ = stream.write_all(response.as_bytes());
            let _ = stream.write_all(msg);
            return;
        }
    }

    let mut ranged = false;
    let (status, content_range, slice) = match range {
        Some((start, end_incl)) if opts.support_ranges => {
            let start = start.saturating_add(opts.shift_ranges_by);
            let end_incl = end_incl.min(total.saturating_sub(1));
            if start > end_incl || start >= total {
                (
                    "416 Range Not Satisfiable",
                    Some(format!("bytes */{}", total)),
                    &body[0..0],
                )
            } else {
                ranged = true;
                let slice = &body[start as usize..=end_incl as usize];
                (
                    "206 Partial Content",
                    Some(format!("bytes {}-{}/{}", start, end_incl, total)),
                    slice,
                )
            }
        }
        _ => ("200 OK", None, body),
    };

    let mut payload = slice.to_vec();
    if ranged {
        payload.extend(std::iter::repeat(0xEE).take(opts.extra_bytes));
    }

    let mut response = format!("HTTP/1.1 {}\r\n", status);
    if opts.send_content_length {
        response.push_str(&format!("Content-Length: {}\r\n", payload.len()));
    }
    if let Some(cr) = content_range {
        response.push_str(&format!("Content-Range: {}\r\n", cr));
    }
    response.push_str(accept_ranges);
    response.push_str("Connection: close\r\n\r\n");
    if stream.write_all(response.as_bytes()).is_err() {
        return;
    }

    let send = opts.cut_body_after.map_or(payload.len(), |n| n.min(payload.len()));
    for chunk in payload[..send].chunks(CHUNK) {
        if stream.write_all(chunk).is_err() {
            return;
        }
        stats
            .body_bytes_sent
            .fetch_add(chunk.len() as u64, Ordering::SeqCst);
    }
}

/// Reads until the end of the request head (`\r\n\r\n`).
fn read_head(stream: &mut std::net::TcpStream) -> Option<String> {
    let mut data = Vec::new();
    let mut buf = [0u8; 4096];
    while !data.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = stream.read(&mut buf).ok()?;
        if n == 0 {
            return None;
        }
        data.extend_from_slice(&buf[..n]);
    }
    String::from_utf8(data).ok()
}

/// Returns (method, raw Range header value).
fn parse_request(request: &str) -> (&str, Option<String>) {
    let mut method = "";
    let mut range = None;
    for line in request.lines() {
        let line = line.trim();
        if line.is_empty() {
            break;
        }
        if method.is_empty() {
            method = line.split_whitespace().next().unwrap_or("");
            continue;
        }
        if let Some((name, value)) = line.split_once(':') {
            if name.trim().eq_ignore_ascii_case("range") {
                range = Some(value.trim().to_string());
            }
        }
    }
    (method, range)
}

/// `bytes=X-Y` → (X, Y inclusive); open-ended `bytes=X-` → (X, u64::MAX).
fn parse_range(value: &str) -> Option<(u64, u64)> {
    let bounds = value.strip_prefix("bytes=")?;
    let (a, b) = bounds.split_once('-')?;
    let start = a.trim().parse::<u64>().ok()?;
    let b = b.trim();
    let end = if b.is_empty() {
        u64::MAX
    } else {
        b.parse::<u64>().ok()?
    };
    Some((start, end))
}
