//! Default output location: file name from the URL, directory from the caller.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Default filename when the URL path yields nothing usable.
const DEFAULT_FILENAME: &str = "download.bin";

/// Last path segment of `url`, sanitized, or `download.bin`.
pub(crate) fn filename_from_url(url: &str) -> String {
    let segment = url::Url::parse(url).ok().and_then(|parsed| {
        parsed
            .path()
            .split('/')
            .filter(|s| !s.is_empty())
            .last()
            .map(str::to_string)
    });

    match segment.map(|s| sanitize(&s)) {
        Some(s) if !s.is_empty() && s != "." && s != ".." => s,
        _ => DEFAULT_FILENAME.to_string(),
    }
}

/// Replaces path separators and control characters with `_` and trims dots and spaces.
fn sanitize(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| {
            if c == '/' || c == '\\' || c == '\0' || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect();
    replaced
        .trim_matches(|c| c == ' ' || c == '.')
        .to_string()
}

/// Resolves the destination: `dir` (or the current directory) joined with
/// `output` (or the name derived from the URL). Creates `dir` if missing.
pub(crate) fn resolve_destination(url: &str, output: Option<&str>, dir: Option<&Path>) -> Result<PathBuf> {
    let dir = match dir {
        Some(d) => d.to_path_buf(),
        None => std::env::current_dir().context("current directory")?,
    };
    std::fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;

    let name = match output {
        Some(o) if !o.is_empty() => o.to_string(),
        _ => filename_from_url(url),
    };
    Ok(dir.join(name))
}
