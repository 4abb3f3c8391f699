//! CLI for the segget downloader.

mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use segget_core::config;
use std::path::PathBuf;

use commands::{run_config_path, run_get, GetArgs};

/// Top-level CLI for segget.
#[derive(Debug, Parser)]
#[command(name = "segget")]
#[command(about = "segget: resumable parallel HTTP downloader", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Download a single file, splitting it into parallel range requests.
    #[command(alias = "single")]
    Get {
        /// Direct HTTP/HTTPS URL to download.
        url: String,

        /// Number of parts to split the file into (default: config or 2x CPUs).
        #[arg(short = 'c', long = "parts", value_name = "N")]
        parts: Option<usize>,

        /// Output file name (default: last URL path segment).
        #[arg(short, long, value_name = "NAME")]
        output: Option<String>,

        /// Output directory (default: current directory).
        #[arg(short, long, value_name = "DIR")]
        dir: Option<PathBuf>,

        /// Overwrite the output file if it already exists, discarding partial parts.
        #[arg(short = 'f', long)]
        overwrite: bool,
    },

    /// Print the path of the configuration file.
    ConfigPath,
}

impl CliCommand {
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();

        match cli.command {
            CliCommand::Get {
                url,
                parts,
                output,
                dir,
                overwrite,
            } => {
                let cfg = config::load_or_init()?;
                tracing::debug!("loaded config: {:?}", cfg);
                let args = GetArgs {
                    url,
                    parts: parts.unwrap_or_else(|| cfg.effective_default_parts()),
                    output,
                    dir,
                    overwrite,
                };
                run_get(&cfg, args)?;
            }
            CliCommand::ConfigPath => run_config_path()?,
        }

        Ok(())
    }
}
