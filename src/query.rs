//! Search query representation.

use serde::{Deserialize, Serialize};

use crate::{BingError, Result};

/// Time range filter for search results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeRange {
    Day,
    Week,
    Month,
    Year,
}

impl std::str::FromStr for TimeRange {
    type Err = BingError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "day" => Ok(Self::Day),
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            "year" => Ok(Self::Year),
            other => Err(BingError::InvalidQuery(format!(
                "unknown time range '{}'",
                other
            ))),
        }
    }
}

/// A search query with all parameters the Bing adapter understands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    /// The search terms.
    pub query: String,
    /// Page number (1-indexed).
    #[serde(default = "default_page")]
    pub page: u32,
    /// Internal locale tag (e.g., "de-DE", "fr", "all").
    #[serde(default)]
    pub locale: Option<String>,
    /// Time range filter.
    #[serde(default)]
    pub time_range: Option<TimeRange>,
}

fn default_page() -> u32 {
    1
}

impl SearchQuery {
    /// Creates a new search query with the given terms.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            page: 1,
            locale: None,
            time_range: None,
        }
    }

    /// Sets the internal locale tag.
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    /// Sets the page number.
    pub fn with_page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    /// Sets the time range filter.
    pub fn with_time_range(mut self, range: TimeRange) -> Self {
        self.time_range = Some(range);
        self
    }

    /// Checks the query text is non-blank and the page is at least 1.
    pub fn validate(&self) -> Result<()> {
        if self.query.trim().is_empty() {
            return Err(BingError::InvalidQuery("Query cannot be empty".into()));
        }
        if self.page == 0 {
            return Err(BingError::InvalidQuery("Page numbers start at 1".into()));
        }
        Ok(())
    }
}
