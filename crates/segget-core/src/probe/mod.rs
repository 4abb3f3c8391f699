//! HTTP HEAD / capability probing.
//!
//! Uses the curl crate (libcurl) to fetch response headers and learn the
//! total size (`Content-Length`) and whether the server accepts range
//! requests (`Accept-Ranges`). Parallel download needs both.

mod parse;

pub use parse::parse_headers;

use std::str;

use crate::http::HttpOptions;

/// What the server told us about the resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
    /// Total size in bytes, if `Content-Length` is present.
    pub content_length: Option<u64>,
    /// True if the server sent an `Accept-Ranges` header, whatever its value.
    pub accept_ranges: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("could not connect to {url}")]
    Request {
        url: String,
        #[source]
        source: curl::Error,
    },
    #[error("HEAD {url} returned HTTP {status}, expected 2XX")]
    Status { url: String, status: u32 },
    #[error("server returned an invalid Content-Length header: {0:?}")]
    InvalidContentLength(String),
}

/// Performs a HEAD request and returns the parsed capabilities.
///
/// Follows redirects; only the headers of the final response count.
/// Blocks the current thread.
pub fn probe(url: &str, http: &HttpOptions) -> Result<Capabilities, ProbeError> {
    let request_err = |source| ProbeError::Request {
        url: url.to_string(),
        source,
    };
    let mut headers: Vec<String> = Vec::new();

    let mut easy = http.easy(url).map_err(request_err)?;
    easy.nobody(true).map_err(request_err)?; // HEAD request

    {
        let mut transfer = easy.transfer();
        transfer
            .header_function(|data| {
                if let Ok(s) = str::from_utf8(data) {
                    headers.push(s.trim_end().to_string());
                }
                true
            })
            .map_err(request_err)?;
        transfer.perform().map_err(request_err)?;
    }

    let status = easy.response_code().map_err(request_err)?;
    if !(200..300).contains(&status) {
        return Err(ProbeError::Status {
            url: url.to_string(),
            status,
        });
    }

    let caps = parse_headers(&headers)?;
    tracing::debug!(
        url,
        content_length = ?caps.content_length,
        accept_ranges = caps.accept_ranges,
        "probe complete"
    );
    Ok(caps)
}
