pub mod config;
pub mod logging;

pub mod downloader;
pub mod guard;
pub mod http;
pub mod job;
pub mod probe;
pub mod segmenter;
pub mod storage;

pub use job::{DownloadJob, JobError, JobReport, JobRequest};
