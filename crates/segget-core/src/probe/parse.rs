//! Parse HTTP response header lines into Capabilities.

use super::{Capabilities, ProbeError};

/// Parse collected header lines into Capabilities.
///
/// When redirects were followed the lines hold several responses; a status
/// line starts a new block, so only the last response is used.
///
/// An `Accept-Ranges` header with any value counts as range support. An
/// unparsable `Content-Length` is only fatal when ranges are supported; without
/// them the job degrades to a single stream anyway and the length is dropped.
pub fn parse_headers(lines: &[String]) -> Result<Capabilities, ProbeError> {
    let mut content_length: Option<&str> = None;
    let mut accept_ranges = false;

    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if crate::http::parse_status_line(line).is_some() {
            content_length = None;
            accept_ranges = false;
            continue;
        }
        if let Some((name, value)) = line.split_once(':') {
            let name = name.trim();
            let value = value.trim();
            if name.eq_ignore_ascii_case("content-length") {
                content_length = Some(value);
            }
            if name.eq_ignore_ascii_case("accept-ranges") {
                accept_ranges = true;
            }
        }
    }

    let content_length = match content_length.map(|v| (v, v.parse::<u64>())) {
        None => None,
        Some((_, Ok(n))) => Some(n),
        Some((v, Err(_))) if accept_ranges => {
            return Err(ProbeError::InvalidContentLength(v.to_string()))
        }
        Some((v, Err(_))) => {
            tracing::warn!("ignoring invalid Content-Length {:?} from a server without range support", v);
            None
        }
    };

    Ok(Capabilities {
        content_length,
        accept_ranges,
    })
}
