//! libcurl handle options shared by the probe and every segment transfer.

use std::time::Duration;

/// Per-handle transfer settings. Built from `SeggetConfig::http_options`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpOptions {
    pub connect_timeout: Duration,
    /// Abort if throughput stays below this many bytes/sec for `low_speed_time`.
    pub low_speed_limit: u32,
    pub low_speed_time: Duration,
    pub max_redirections: u32,
    /// Receive buffer size handed to libcurl; each write callback sees at most this much.
    pub buffer_size: usize,
    pub user_agent: Option<String>,
}

impl Default for HttpOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            low_speed_limit: 1024,
            low_speed_time: Duration::from_secs(60),
            max_redirections: 10,
            buffer_size: crate::storage::BUF_SIZE,
            user_agent: None,
        }
    }
}

impl HttpOptions {
    /// Creates an Easy handle for `url` with redirects, timeouts and buffer size applied.
    pub(crate) fn easy(&self, url: &str) -> Result<curl::easy::Easy, curl::Error> {
        let mut easy = curl::easy::Easy::new();
        easy.url(url)?;
        easy.follow_location(true)?;
        easy.max_redirections(self.max_redirections)?;
        easy.connect_timeout(self.connect_timeout)?;
        // Prefer low-speed timeout over a wall clock limit so large segments on slow links survive.
        easy.low_speed_limit(self.low_speed_limit)?;
        easy.low_speed_time(self.low_speed_time)?;
        easy.buffer_size(self.buffer_size)?;
        if let Some(ua) = &self.user_agent {
            easy.useragent(ua)?;
        }
        Ok(easy)
    }
}

/// Status code from an HTTP status line (`HTTP/1.1 206 Partial Content`, `HTTP/2 200`).
pub(crate) fn parse_status_line(line: &str) -> Option<u32> {
    let mut parts = line.split_whitespace();
    let proto = parts.next()?;
    if !proto.starts_with("HTTP/") {
        return None;
    }
    parts.next()?.parse().ok()
}
