//! Search engine trait and configuration.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{Result, ResultPage, SearchQuery};

/// Categories for search engines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineCategory {
    #[default]
    General,
    Web,
}

/// Configuration for a search engine as seen by the aggregator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Display name of the engine.
    pub name: String,
    /// Short identifier (e.g., "bing").
    pub shortcut: String,
    /// Categories this engine belongs to.
    pub categories: Vec<EngineCategory>,
    /// Whether pagination is supported.
    #[serde(default)]
    pub paging: bool,
    /// Whether time range filtering is supported.
    #[serde(default)]
    pub time_range_support: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            shortcut: String::new(),
            categories: vec![EngineCategory::General],
            paging: false,
            time_range_support: false,
        }
    }
}

/// Trait for implementing search engines.
///
/// The aggregator drives every engine through this trait.
#[async_trait]
pub trait Engine: Send + Sync {
    /// Returns the engine configuration.
    fn config(&self) -> &EngineConfig;

    /// Performs a search and returns one page of results.
    async fn search(&self, query: &SearchQuery) -> Result<ResultPage>;

    /// Returns the engine name.
    fn name(&self) -> &str {
        &self.config().name
    }

    /// Returns the engine shortcut.
    fn shortcut(&self) -> &str {
        &self.config().shortcut
    }
}
