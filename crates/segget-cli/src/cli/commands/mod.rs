//! CLI command handlers.

mod config_path;
mod get;

pub use config_path::run_config_path;
pub use get::{run_get, GetArgs};
