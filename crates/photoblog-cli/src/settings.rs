//! Configuration loading and gateway construction.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use directories::ProjectDirs;
use tracing::debug;

use photoblog_cache::PostCache;
use photoblog_core::{ApiUrl, GalleryConfig};
use photoblog_http::HttpGateway;

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "PHOTOBLOG_API_KEY";

/// Environment variable overriding the configured API base URL.
pub const API_URL_ENV: &str = "PHOTOBLOG_API_URL";

/// Everything a command needs to reach the blog.
#[derive(Debug)]
pub struct Settings {
    pub config: GalleryConfig,
    api_url: Option<ApiUrl>,
    api_key: Option<String>,
}

/// Get the default config file path, if a home directory is known.
fn default_config_path() -> Option<PathBuf> {
    let dirs = ProjectDirs::from("", "", "photoblog")?;
    Some(dirs.config_dir().join("config.json"))
}

fn read_config(path: &Path) -> Result<GalleryConfig> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    GalleryConfig::from_json(&json)
        .with_context(|| format!("Invalid config file {}", path.display()))
}

impl Settings {
    /// Load the config file and resolve the API endpoint.
    ///
    /// An explicit `config_path` must exist; the default location is
    /// optional. The API URL is taken from `api_url`, then
    /// `PHOTOBLOG_API_URL`, then the config file.
    pub fn load(config_path: Option<&Path>, api_url: Option<&str>) -> Result<Self> {
        let config = match config_path {
            Some(path) => read_config(path)?,
            None => match default_config_path().filter(|path| path.exists()) {
                Some(path) => read_config(&path)?,
                None => {
                    debug!("No config file, using defaults");
                    GalleryConfig::default()
                }
            },
        };

        let api_url = match api_url
            .map(str::to_string)
            .or_else(|| std::env::var(API_URL_ENV).ok())
        {
            Some(url) => Some(ApiUrl::new(url).context("Invalid API URL")?),
            None => config.api_url.clone(),
        };

        let api_key = std::env::var(API_KEY_ENV)
            .ok()
            .filter(|key| !key.trim().is_empty());

        Ok(Self {
            config,
            api_url,
            api_key,
        })
    }

    /// Build an HTTP gateway for the configured blog.
    pub fn gateway(&self) -> Result<HttpGateway> {
        let Some(api_url) = &self.api_url else {
            bail!("No API URL configured. Pass --api-url or set {}.", API_URL_ENV);
        };
        let Some(api_key) = &self.api_key else {
            bail!("No API key configured. Set {}.", API_KEY_ENV);
        };

        HttpGateway::new(api_url.clone(), api_key, self.config.request_timeout())
            .context("Failed to create HTTP client")
    }

    /// Build an empty cache backed by the HTTP gateway.
    pub fn cache(&self) -> Result<PostCache<HttpGateway>> {
        PostCache::with_config(self.gateway()?, &self.config).context("Failed to create cache")
    }
}
