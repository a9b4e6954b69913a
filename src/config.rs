//! Adapter configuration with sensible defaults.
//!
//! [`BingConfig`] holds the endpoints and transport knobs for the Bing
//! adapter. Everything has a default, so an empty JSON object is a valid
//! configuration.

use serde::{Deserialize, Serialize};

use crate::{BingError, Result};

/// Bing web search endpoint.
pub const DEFAULT_BASE_URL: &str = "https://www.bing.com/search";

/// Reference page listing the market and language codes Bing accepts.
pub const DEFAULT_TRAITS_URL: &str =
    "https://learn.microsoft.com/en-us/bing/search-apis/bing-web-search/reference/market-codes";

/// Configuration for the Bing adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BingConfig {
    /// Search endpoint queried for result pages.
    pub base_url: String,
    /// Reference document scraped when refreshing market codes.
    pub traits_url: String,
    /// User-Agent sent by the default HTTP fetcher.
    pub user_agent: String,
    /// Per-request timeout in seconds for the default HTTP fetcher.
    pub timeout_secs: u64,
    /// Interval between background market-code refreshes, in seconds.
    pub traits_refresh_secs: u64,
    /// Bing language used when a locale has no mapping.
    pub default_language: String,
    /// Bing market used when a locale has no mapping.
    pub default_region: String,
}

impl Default for BingConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            traits_url: DEFAULT_TRAITS_URL.to_string(),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".to_string(),
            timeout_secs: 5,
            traits_refresh_secs: 24 * 60 * 60,
            default_language: "en".to_string(),
            default_region: "us".to_string(),
        }
    }
}

impl BingConfig {
    /// Parses a configuration from JSON and validates it.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| BingError::Config(format!("invalid JSON: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates this configuration, returning an error if any field is invalid.
    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.base_url)
            .map_err(|e| BingError::Config(format!("base_url: {}", e)))?;
        url::Url::parse(&self.traits_url)
            .map_err(|e| BingError::Config(format!("traits_url: {}", e)))?;
        if self.timeout_secs == 0 {
            return Err(BingError::Config(
                "timeout_secs must be greater than 0".into(),
            ));
        }
        if self.traits_refresh_secs == 0 {
            return Err(BingError::Config(
                "traits_refresh_secs must be greater than 0".into(),
            ));
        }
        if self.default_language.is_empty() || self.default_region.is_empty() {
            return Err(BingError::Config(
                "default_language and default_region must not be empty".into(),
            ));
        }
        Ok(())
    }
}
