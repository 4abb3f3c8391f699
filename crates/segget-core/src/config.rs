use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::http::HttpOptions;

/// Global configuration loaded from `~/.config/segget/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SeggetConfig {
    /// Number of segments when `--parts` is not given. None = twice the CPU parallelism.
    pub default_parts: Option<usize>,
    /// libcurl receive buffer size in bytes (bounds per-segment memory).
    pub buffer_bytes: usize,
    /// TCP/TLS connect timeout in seconds.
    pub connect_timeout_secs: u64,
    /// Abort a transfer slower than this many bytes/sec for `low_speed_time_secs`.
    pub low_speed_limit_bytes: u32,
    pub low_speed_time_secs: u64,
    /// Maximum number of redirects followed by the probe and every segment.
    pub max_redirections: u32,
    /// Optional User-Agent header; libcurl sends none by default.
    pub user_agent: Option<String>,
}

impl Default for SeggetConfig {
    fn default() -> Self {
        Self {
            default_parts: None,
            buffer_bytes: crate::storage::BUF_SIZE,
            connect_timeout_secs: 30,
            low_speed_limit_bytes: 1024,
            low_speed_time_secs: 60,
            max_redirections: 10,
            user_agent: None,
        }
    }
}

impl SeggetConfig {
    /// Segment count used when the caller did not ask for one.
    pub fn effective_default_parts(&self) -> usize {
        self.default_parts.filter(|n| *n > 0).unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get() * 2)
                .unwrap_or(4)
        })
    }

    /// Handle options passed down to the engine.
    pub fn http_options(&self) -> HttpOptions {
        HttpOptions {
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            low_speed_limit: self.low_speed_limit_bytes,
            low_speed_time: Duration::from_secs(self.low_speed_time_secs),
            max_redirections: self.max_redirections,
            buffer_size: self.buffer_bytes,
            user_agent: self.user_agent.clone(),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("segget")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<SeggetConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = SeggetConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: SeggetConfig = toml::from_str(&data)?;
    Ok(cfg)
}
