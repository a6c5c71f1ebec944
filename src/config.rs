// src/config.rs

//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// HTTP and scraping behavior settings
    #[serde(default)]
    pub scraper: ScraperConfig,

    /// SQLite persistence settings
    #[serde(default)]
    pub database: DatabaseConfig,
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
        if self.scraper.user_agent.trim().is_empty() {
            return Err(AppError::validation("scraper.user_agent is empty"));
        }
        if self.scraper.timeout_secs == 0 {
            return Err(AppError::validation("scraper.timeout_secs must be > 0"));
        }
        if self.scraper.base_url.trim().is_empty() {
            return Err(AppError::validation("scraper.base_url is empty"));
        }
        if self.database.path.trim().is_empty() {
            return Err(AppError::validation("database.path is empty"));
        }
        Ok(())
    }
}

/// HTTP client and scraping behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperConfig {
    /// Base URL of the championship site
    #[serde(default = "defaults::base_url")]
    pub base_url: String,

    /// Path to the driver listing page
    #[serde(default = "defaults::drivers_page")]
    pub drivers_page: String,

    /// Path template for a season's race calendar ({season} placeholder)
    #[serde(default = "defaults::races_page")]
    pub races_page: String,

    /// Path template for a season's results index ({season} placeholder)
    #[serde(default = "defaults::results_page")]
    pub results_page: String,

    /// Path template for a season's driver standings ({season} placeholder)
    #[serde(default = "defaults::standings_page")]
    pub standings_page: String,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Delay between requests in milliseconds
    #[serde(default = "defaults::request_delay")]
    pub request_delay_ms: u64,

    /// Maximum retries per request before giving up
    #[serde(default = "defaults::max_retries")]
    pub max_retries: u32,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::base_url(),
            drivers_page: defaults::drivers_page(),
            races_page: defaults::races_page(),
            results_page: defaults::results_page(),
            standings_page: defaults::standings_page(),
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            request_delay_ms: defaults::request_delay(),
            max_retries: defaults::max_retries(),
        }
    }
}

impl ScraperConfig {
    fn expand(&self, template: &str, season: i32) -> String {
        format!(
            "{}{}",
            self.base_url,
            template.replace("{season}", &season.to_string())
        )
    }

    /// Full URL of the driver listing page.
    pub fn drivers_url(&self) -> String {
        format!("{}{}", self.base_url, self.drivers_page)
    }

    /// Full URL of a season's race calendar.
    pub fn races_url(&self, season: i32) -> String {
        self.expand(&self.races_page, season)
    }

    /// Full URL of a season's results index.
    pub fn results_url(&self, season: i32) -> String {
        self.expand(&self.results_page, season)
    }

    /// Full URL of a season's driver standings.
    pub fn standings_url(&self, season: i32) -> String {
        self.expand(&self.standings_page, season)
    }
}

/// SQLite persistence settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file
    #[serde(default = "defaults::database_path")]
    pub path: String,

    /// Age threshold in days for the retention sweep
    #[serde(default = "defaults::retention_days")]
    pub retention_days: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: defaults::database_path(),
            retention_days: defaults::retention_days(),
        }
    }
}

mod defaults {
    // Scraper defaults
    pub fn base_url() -> String {
        "https://www.formula1.com".into()
    }
    pub fn drivers_page() -> String {
        "/en/drivers.html".into()
    }
    pub fn races_page() -> String {
        "/en/racing/{season}/races.html".into()
    }
    pub fn results_page() -> String {
        "/en/results.html/{season}/races.html".into()
    }
    pub fn standings_page() -> String {
        "/en/results.html/{season}/drivers.html".into()
    }
    pub fn user_agent() -> String {
        "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) \
         Chrome/91.0.4472.124 Safari/537.36"
            .into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn request_delay() -> u64 {
        1000
    }
    pub fn max_retries() -> u32 {
        3
    }

    // Database defaults
    pub fn database_path() -> String {
        "data/championship.db".into()
    }
    pub fn retention_days() -> u32 {
        30
    }
}
