use anyhow::{Context, Result};

use nanshe_client::api::ApiClient;
use nanshe_client::config::ClientConfig;

/// Shared application state for CLI commands
pub struct App {
    pub config: ClientConfig,
    pub client: ApiClient,
}

impl App {
    /// Initialize from the config file, with an optional base-URL override
    pub fn new(api_url: Option<&str>) -> Result<Self> {
        let mut config = ClientConfig::load().context("Failed to load client config")?;
        if let Some(url) = api_url {
            config.base_url = url.trim().to_string();
        }

        let client = ApiClient::new(&config)
            .with_context(|| format!("Failed to build API client for {}", config.base_url))?;

        Ok(Self { config, client })
    }
}
