//! Gallery configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{Error, InvalidInputError};
use crate::types::{ApiUrl, Contributor};

/// Viewport widths at which the gallery gains columns.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breakpoints {
    /// From this width up the gallery shows 3 columns.
    #[serde(default = "default_wide")]
    pub wide: u32,
    /// Above this width the gallery shows 4 columns.
    #[serde(default = "default_ultra_wide")]
    pub ultra_wide: u32,
}

impl Default for Breakpoints {
    fn default() -> Self {
        Self {
            wide: default_wide(),
            ultra_wide: default_ultra_wide(),
        }
    }
}

fn default_wide() -> u32 {
    1280
}

fn default_ultra_wide() -> u32 {
    2560
}

/// Settings shared by the cache, the views and the CLI.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GalleryConfig {
    /// Base URL of the blog API.
    #[serde(default)]
    pub api_url: Option<ApiUrl>,
    /// Posts requested per page.
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default)]
    pub breakpoints: Breakpoints,
    /// Smallest target width requested by the detail view.
    #[serde(default = "default_detail_min_width")]
    pub detail_min_width: u32,
    /// Window in which repeated navigation inputs are ignored.
    #[serde(default = "default_navigation_debounce_ms")]
    pub navigation_debounce_ms: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default)]
    pub contributors: Vec<Contributor>,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            api_url: None,
            page_size: default_page_size(),
            breakpoints: Breakpoints::default(),
            detail_min_width: default_detail_min_width(),
            navigation_debounce_ms: default_navigation_debounce_ms(),
            request_timeout_secs: default_request_timeout_secs(),
            contributors: Vec::new(),
        }
    }
}

fn default_page_size() -> u32 {
    20
}

fn default_detail_min_width() -> u32 {
    992
}

fn default_navigation_debounce_ms() -> u64 {
    250
}

fn default_request_timeout_secs() -> u64 {
    20
}

impl GalleryConfig {
    /// Parse a JSON configuration document and validate it.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let config: GalleryConfig =
            serde_json::from_str(json).map_err(|e| InvalidInputError::Config {
                field: "<document>",
                reason: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges that serde cannot express.
    pub fn validate(&self) -> Result<(), Error> {
        if self.page_size == 0 {
            return Err(InvalidInputError::Config {
                field: "page_size",
                reason: "must be greater than zero".to_string(),
            }
            .into());
        }

        if self.breakpoints.ultra_wide < self.breakpoints.wide {
            return Err(InvalidInputError::Config {
                field: "breakpoints.ultra_wide",
                reason: format!(
                    "must not be smaller than breakpoints.wide ({})",
                    self.breakpoints.wide
                ),
            }
            .into());
        }

        if self.request_timeout_secs == 0 {
            return Err(InvalidInputError::Config {
                field: "request_timeout_secs",
                reason: "must be greater than zero".to_string(),
            }
            .into());
        }

        Ok(())
    }

    pub fn navigation_debounce(&self) -> Duration {
        Duration::from_millis(self.navigation_debounce_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
