//! Pattern-based removal of part files next to a destination.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::segmenter::is_part_file_name;

#[derive(Debug, thiserror::Error)]
#[error("could not remove part file {}", .path.display())]
pub struct SweepError {
    /// File that could not be removed, or the directory that could not be listed.
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

/// All files in the destination's directory named `<dest name>.part<N>`, sorted by name.
/// This includes orphans from earlier runs with a different part count.
pub fn find_part_files(destination: &Path) -> Result<Vec<PathBuf>, SweepError> {
    let dir = super::parent_dir(destination);
    let dest_name = match destination.file_name() {
        Some(n) => n.to_string_lossy().into_owned(),
        None => return Ok(Vec::new()),
    };
    let entries = fs::read_dir(dir).map_err(|source| SweepError {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut out = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| SweepError {
            path: dir.to_path_buf(),
            source,
        })?;
        let name = entry.file_name();
        if is_part_file_name(&dest_name, &name.to_string_lossy()) {
            out.push(dir.join(name));
        }
    }
    out.sort();
    Ok(out)
}

/// Removes every part file of `destination`. Returns how many were removed.
/// Stops at the first file that cannot be deleted.
pub fn remove_part_files(destination: &Path) -> Result<usize, SweepError> {
    let parts = find_part_files(destination)?;
    for path in &parts {
        fs::remove_file(path).map_err(|source| SweepError {
            path: path.clone(),
            source,
        })?;
        tracing::debug!("removed part file {}", path.display());
    }
    Ok(parts.len())
}
