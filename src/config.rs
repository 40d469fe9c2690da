//! Client configuration.
//!
//! A small TOML file under the per-user config directory holds the API
//! root, timeouts, and a stable client id. The `NANSHE_API_URL`
//! environment variable overrides the configured base URL.

use std::fs;
use std::path::{Path, PathBuf};

use log::warn;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot determine a config directory")]
    ConfigDirNotFound,
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("config write error: {0}")]
    Serialize(#[from] toml::ser::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

const DEFAULT_BASE_URL: &str = "https://api.nanshe.app";

fn default_request_timeout() -> u64 {
    30
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_send_beacon() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    /// API root without a trailing slash.
    pub base_url: String,
    /// Whole-request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// Connection timeout in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    /// Stable id for this installation, minted on first load.
    #[serde(default)]
    pub client_id: String,
    /// Whether to send the fire-and-forget activity-end beacon.
    #[serde(default = "default_send_beacon")]
    pub send_activity_beacon: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: default_request_timeout(),
            connect_timeout_secs: default_connect_timeout(),
            client_id: String::new(),
            send_activity_beacon: default_send_beacon(),
        }
    }
}

impl ClientConfig {
    /// Load from the default location, with the environment override
    /// applied and a client id minted if missing.
    ///
    /// A minted id is written back immediately so it stays stable across
    /// runs. The write happens before the URL override is applied, so an
    /// environment override never ends up in the file.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::default_path()?)?;

        if config.client_id.is_empty() {
            config.client_id = Uuid::new_v4().to_string();
            if let Err(err) = config.save() {
                warn!("config: could not persist minted client id: {}", err);
            }
        }

        if let Ok(url) = std::env::var("NANSHE_API_URL") {
            let url = url.trim();
            if !url.is_empty() {
                config.base_url = url.trim_end_matches('/').to_string();
            }
        }
        Ok(config)
    }

    /// Load exactly what a file says; a missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        Ok(toml::from_str(&fs::read_to_string(path)?)?)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::default_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Default config file path.
    pub fn default_path() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join("nanshe").join("config.toml"))
            .ok_or(ConfigError::ConfigDirNotFound)
    }

    /// Base URL with any trailing slash removed.
    pub fn base_url_trimmed(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}
