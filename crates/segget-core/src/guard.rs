//! Preconditions checked before any network traffic: part count, URL shape,
//! existing output handling, and stale part file cleanup on overwrite.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::storage::{self, SweepError};

#[derive(Debug, thiserror::Error)]
pub enum GuardError {
    #[error("the number of parts should be greater than 0, got {0}")]
    InvalidPartCount(usize),
    #[error("invalid URL {url:?}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("unsupported URL scheme {scheme:?}; only http and https are supported")]
    UnsupportedScheme { scheme: String },
    #[error("the download file {} already exists; use overwrite to replace it", .0.display())]
    AlreadyExists(PathBuf),
    #[error("the existing download file {} could not be deleted", .path.display())]
    CleanupFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl From<SweepError> for GuardError {
    fn from(e: SweepError) -> Self {
        GuardError::CleanupFailed {
            path: e.path,
            source: e.source,
        }
    }
}

/// Validates a job's inputs and prepares its destination.
///
/// Without `overwrite`, existing data is never discarded. A multi-part job
/// merges into its destination, so an existing one is rejected. A single-part
/// job uses the destination as its working file and may resume it; whether it
/// can is only known after the probe (see [`ensure_resumable`]). With
/// `overwrite`, the destination, its part files and any merge leftover are
/// deleted so the job starts from zero.
pub fn prepare_destination(
    url: &str,
    destination: &Path,
    parts: usize,
    overwrite: bool,
) -> Result<(), GuardError> {
    if parts == 0 {
        return Err(GuardError::InvalidPartCount(parts));
    }

    validate_url(url)?;

    let exists = destination.exists();
    if exists && !overwrite {
        if parts > 1 {
            return Err(GuardError::AlreadyExists(destination.to_path_buf()));
        }
        tracing::debug!("{} exists; single-part job may resume it", destination.display());
    }

    if overwrite {
        if exists {
            remove_file(destination)?;
        }
        let merge_temp = storage::merge_temp_path(destination);
        if merge_temp.exists() {
            remove_file(&merge_temp)?;
        }
        let removed = storage::remove_part_files(destination)?;
        if removed > 0 {
            tracing::info!(
                "overwrite: removed {} stale part file(s) of {}",
                removed,
                destination.display()
            );
        }
    }

    Ok(())
}

/// Second half of the existing-destination check, run once the fetch mode is
/// known. A plain GET truncates its working file, so an existing destination
/// survives only when the job resumes it with ranges.
pub fn ensure_resumable(destination: &Path, resumes_in_place: bool) -> Result<(), GuardError> {
    if !resumes_in_place && destination.exists() {
        return Err(GuardError::AlreadyExists(destination.to_path_buf()));
    }
    Ok(())
}

/// Basic syntactic check; anything but http(s) is out of reach for the engine.
pub fn validate_url(url: &str) -> Result<url::Url, GuardError> {
    let parsed = url::Url::parse(url).map_err(|source| GuardError::InvalidUrl {
        url: url.to_string(),
        source,
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(GuardError::UnsupportedScheme {
            scheme: other.to_string(),
        }),
    }
}

fn remove_file(path: &Path) -> Result<(), GuardError> {
    fs::remove_file(path).map_err(|source| GuardError::CleanupFailed {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!("removed {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "https://example.com/file.iso";

    #[test]
    fn zero_parts_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = prepare_destination(URL, &dir.path().join("f"), 0, false).unwrap_err();
        assert!(matches!(err, GuardError::InvalidPartCount(0)));
    }

    #[test]
    fn bad_urls_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("f");
        assert!(matches!(
            prepare_destination("not a url", &dest, 4, false),
            Err(GuardError::InvalidUrl { .. })
        ));
        assert!(matches!(
            prepare_destination("ftp://example.com/f", &dest, 4, false),
            Err(GuardError::UnsupportedScheme { scheme }) if scheme == "ftp"
        ));
    }

    #[test]
    fn existing_destination_rejected_without_overwrite_for_multi_part() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("file.iso");
        fs::write(&dest, b"keep me").unwrap();
        fs::write(dir.path().join("file.iso.part0"), b"p").unwrap();

        let err = prepare_destination(URL, &dest, 3, false).unwrap_err();
        assert!(matches!(err, GuardError::AlreadyExists(ref p) if p == &dest));
        assert_eq!(fs::read(&dest).unwrap(), b"keep me");
        assert!(dir.path().join("file.iso.part0").exists());
    }

    #[test]
    fn existing_destination_left_for_single_part_resume() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("file.iso");
        fs::write(&dest, b"first half").unwrap();

        prepare_destination(URL, &dest, 1, false).unwrap();
        assert_eq!(fs::read(&dest).unwrap(), b"first half");

        ensure_resumable(&dest, true).unwrap();
        let err = ensure_resumable(&dest, false).unwrap_err();
        assert!(matches!(err, GuardError::AlreadyExists(ref p) if p == &dest));
        ensure_resumable(&dir.path().join("absent"), false).unwrap();
    }

    #[test]
    fn missing_destination_keeps_parts_for_resume() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("file.iso");
        fs::write(dir.path().join("file.iso.part1"), b"partial").unwrap();

        prepare_destination(URL, &dest, 4, false).unwrap();
        assert!(dir.path().join("file.iso.part1").exists());
    }

    #[test]
    fn overwrite_removes_destination_parts_and_merge_leftover_only() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("file.iso");
        for name in [
            "file.iso",
            "file.iso.part0",
            "file.iso.part9",
            "file.iso.merging",
            "file.iso.sig",
            "file.isobar",
        ] {
            fs::write(dir.path().join(name), b"x").unwrap();
        }

        prepare_destination(URL, &dest, 4, true).unwrap();

        for gone in ["file.iso", "file.iso.part0", "file.iso.part9", "file.iso.merging"] {
            assert!(!dir.path().join(gone).exists(), "{gone} should be removed");
        }
        for kept in ["file.iso.sig", "file.isobar"] {
            assert!(dir.path().join(kept).exists(), "{kept} should be kept");
        }
    }

    #[test]
    fn overwrite_without_existing_destination_still_clears_parts() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("file.iso");
        fs::write(dir.path().join("file.iso.part2"), b"old").unwrap();

        prepare_destination(URL, &dest, 1, true).unwrap();
        assert!(!dir.path().join("file.iso.part2").exists());
    }

    #[test]
    fn overwrite_delete_failure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("file.iso");
        // remove_file refuses directories, whoever runs the test
        let blocker = dir.path().join("file.iso.part0");
        fs::create_dir(&blocker).unwrap();
        fs::write(blocker.join("inner"), b"x").unwrap();

        let err = prepare_destination(URL, &dest, 2, true).unwrap_err();
        match err {
            GuardError::CleanupFailed { path, .. } => assert_eq!(path, blocker),
            other => panic!("expected CleanupFailed, got {other:?}"),
        }
        assert!(blocker.exists());
    }

    #[test]
    fn overwrite_of_undeletable_destination_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("file.iso");
        fs::create_dir(&dest).unwrap();

        let err = prepare_destination(URL, &dest, 1, true).unwrap_err();
        assert!(matches!(err, GuardError::CleanupFailed { ref path, .. } if path == &dest));
    }
}
