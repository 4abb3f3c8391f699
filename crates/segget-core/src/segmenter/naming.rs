//! Part file naming: `<destination file name>.part<index>` next to the destination.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Literal placed between the destination file name and the segment index.
pub const PART_SEPARATOR: &str = ".part";

/// Path of the part file for segment `index` of `destination`.
pub fn part_path(destination: &Path, index: usize) -> PathBuf {
    let mut o: OsString = destination.as_os_str().to_owned();
    o.push(format!("{}{}", PART_SEPARATOR, index));
    PathBuf::from(o)
}

/// True if `candidate` is a part file of a destination named `dest_name`,
/// i.e. matches `^<dest_name>\.part[0-9]+$`.
pub fn is_part_file_name(dest_name: &str, candidate: &str) -> bool {
    candidate
        .strip_prefix(dest_name)
        .and_then(|rest| rest.strip_prefix(PART_SEPARATOR))
        .map(|idx| !idx.is_empty() && idx.bytes().all(|b| b.is_ascii_digit()))
        .unwrap_or(false)
}
