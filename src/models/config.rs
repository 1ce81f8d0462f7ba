//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::TimelineSelectors;

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Scraping behavior settings
    #[serde(default)]
    pub scraper: ScraperConfig,

    /// Browser session settings
    #[serde(default)]
    pub session: SessionConfig,

    /// Timeline markup selectors
    #[serde(default)]
    pub selectors: TimelineSelectors,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.scraper.search_url.trim().is_empty() {
            return Err(AppError::config("scraper.search_url is empty"));
        }
        url::Url::parse(&self.scraper.search_url)
            .map_err(|e| AppError::config(format!("scraper.search_url: {e}")))?;
        url::Url::parse(&self.scraper.profile_url)
            .map_err(|e| AppError::config(format!("scraper.profile_url: {e}")))?;
        if self.scraper.times == 0 {
            return Err(AppError::config("scraper.times must be > 0"));
        }
        if self.scraper.reload_every == 0 {
            return Err(AppError::config("scraper.reload_every must be > 0"));
        }
        Ok(())
    }
}

/// Pagination and collection behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperConfig {
    /// Search endpoint the query template is rendered against
    #[serde(default = "defaults::search_url")]
    pub search_url: String,

    /// Base URL for per-item thread permalinks
    #[serde(default = "defaults::profile_url")]
    pub profile_url: String,

    /// Scroll steps per pagination cycle
    #[serde(default = "defaults::per_driver")]
    pub per_driver: usize,

    /// Pagination cycles per scrape run
    #[serde(default = "defaults::times")]
    pub times: usize,

    /// Page loads served by one session before it is replaced
    #[serde(default = "defaults::reload_every")]
    pub reload_every: usize,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            search_url: defaults::search_url(),
            profile_url: defaults::profile_url(),
            per_driver: defaults::per_driver(),
            times: defaults::times(),
            reload_every: defaults::reload_every(),
        }
    }
}

/// Browser session behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Run the browser headless
    #[serde(default = "defaults::headless")]
    pub headless: bool,

    /// Delay treated as page quiescence after a scroll or navigation
    #[serde(default = "defaults::settle_delay_ms")]
    pub settle_delay_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            headless: defaults::headless(),
            settle_delay_ms: defaults::settle_delay_ms(),
        }
    }
}

mod defaults {
    pub fn search_url() -> String {
        "https://twitter.com/search".to_string()
    }

    pub fn profile_url() -> String {
        "https://twitter.com".to_string()
    }

    pub fn per_driver() -> usize {
        10
    }

    pub fn times() -> usize {
        1
    }

    pub fn reload_every() -> usize {
        1000
    }

    pub fn headless() -> bool {
        true
    }

    pub fn settle_delay_ms() -> u64 {
        1000
    }
}
