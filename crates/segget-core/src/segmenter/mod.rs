//! Range math and segment planning.
//!
//! Splits a download into N segments with inclusive byte bounds and derives
//! the part file each segment is written to. The part file names double as the
//! resume key across invocations.

mod naming;
mod range;

pub use naming::{is_part_file_name, part_path, PART_SEPARATOR};
pub use range::{plan_segments, Segment};
