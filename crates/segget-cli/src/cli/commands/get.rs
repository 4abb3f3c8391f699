//! `segget get <url>` – download one file.

use anyhow::{Context, Result};
use segget_core::config::SeggetConfig;
use segget_core::{DownloadJob, JobRequest};
use std::path::PathBuf;

use crate::cli::output::resolve_destination;

#[derive(Debug)]
pub struct GetArgs {
    pub url: String,
    pub parts: usize,
    pub output: Option<String>,
    pub dir: Option<PathBuf>,
    pub overwrite: bool,
}

pub fn run_get(cfg: &SeggetConfig, args: GetArgs) -> Result<()> {
    let destination = resolve_destination(&args.url, args.output.as_deref(), args.dir.as_deref())?;
    let request = JobRequest::new(args.url, &destination, args.parts).overwrite(args.overwrite);

    let job = DownloadJob::prepare(request, cfg.http_options())
        .with_context(|| format!("cannot start download to {}", destination.display()))?;
    let plan = job.plan();
    match plan.total_size {
        Some(size) => println!(
            "Downloading {} bytes in {} part(s) to {}",
            size,
            plan.effective_parts,
            destination.display()
        ),
        None => println!(
            "Downloading (unknown size) to {}",
            destination.display()
        ),
    }

    match job.run() {
        Ok(report) => {
            println!(
                "Done: {} in {:.1}s ({} bytes fetched, {} part(s) reused)",
                destination.display(),
                report.elapsed.as_secs_f64(),
                report.bytes_downloaded,
                report.segments_reused
            );
            Ok(())
        }
        Err(e) => {
            if e.is_resumable() {
                eprintln!("Run the same command again to resume.");
            }
            Err(e).with_context(|| format!("could not finish {}", destination.display()))
        }
    }
}
