//! Bing web search engine implementation.
//!
//! Glues the request builder, the page fetcher, the result extractor and
//! the pagination guard together behind the [`Engine`] trait.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::config::BingConfig;
use crate::extract::ResultExtractor;
use crate::fetcher::PageFetcher;
use crate::fetcher_http::HttpFetcher;
use crate::locale::TraitStore;
use crate::pagination::guard;
use crate::request::{RequestBuilder, RequestDescriptor};
use crate::{Engine, EngineCategory, EngineConfig, Result, ResultPage, SearchQuery};

/// Bing web search engine.
pub struct Bing {
    config: EngineConfig,
    settings: BingConfig,
    fetcher: Arc<dyn PageFetcher>,
    traits: Arc<TraitStore>,
    builder: RequestBuilder,
    extractor: ResultExtractor,
}

impl Bing {
    /// Creates a Bing engine using `fetcher` as transport and default
    /// settings. The trait table starts empty until refreshed or replaced.
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Result<Self> {
        Self::with_settings(fetcher, BingConfig::default())
    }

    /// Creates a Bing engine backed by [`HttpFetcher`].
    pub fn http(settings: BingConfig) -> Result<Self> {
        let fetcher = Arc::new(HttpFetcher::from_config(&settings)?);
        Self::with_settings(fetcher, settings)
    }

    /// Creates a Bing engine with explicit adapter settings.
    pub fn with_settings(fetcher: Arc<dyn PageFetcher>, settings: BingConfig) -> Result<Self> {
        settings.validate()?;
        Ok(Self {
            config: EngineConfig {
                name: "Bing".to_string(),
                shortcut: "bing".to_string(),
                categories: vec![EngineCategory::General, EngineCategory::Web],
                paging: true,
                time_range_support: true,
            },
            builder: RequestBuilder::from_config(&settings),
            extractor: ResultExtractor::new()?,
            traits: Arc::new(TraitStore::default()),
            settings,
            fetcher,
        })
    }

    /// Creates with custom configuration.
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Shares an existing trait store, e.g. one refreshed in the background.
    pub fn with_traits(mut self, traits: Arc<TraitStore>) -> Self {
        self.traits = traits;
        self
    }

    /// The trait store consulted for locale resolution.
    pub fn traits(&self) -> &Arc<TraitStore> {
        &self.traits
    }

    /// Adapter settings in use.
    pub fn settings(&self) -> &BingConfig {
        &self.settings
    }

    /// Builds the outbound request for `query` against the current table.
    pub fn request(&self, query: &SearchQuery) -> RequestDescriptor {
        let table = self.traits.snapshot();
        self.builder.build(query, table.as_ref())
    }

    /// Extracts a fetched page and applies the pagination guard.
    pub fn parse_response(&self, html: &str, page: u32) -> ResultPage {
        let results = self.extractor.extract(html);
        for failure in results.failures() {
            warn!(error = %failure, "Dropping Bing result");
        }
        let total = results.number_of_results;
        guard(page, total, results)
    }

    /// Refreshes the market-code table from the configured reference page.
    pub async fn refresh_traits(&self) -> Result<()> {
        self.traits
            .refresh(self.fetcher.as_ref(), &self.settings.traits_url)
            .await
    }

    /// Starts periodic background refreshes of the market-code table.
    pub fn spawn_traits_refresh(&self) -> tokio::task::JoinHandle<()> {
        self.traits.spawn_refresh_loop(
            Arc::clone(&self.fetcher),
            self.settings.traits_url.clone(),
            std::time::Duration::from_secs(self.settings.traits_refresh_secs),
        )
    }
}

#[async_trait]
impl Engine for Bing {
    fn config(&self) -> &EngineConfig {
        &self.config
    }

    async fn search(&self, query: &SearchQuery) -> Result<ResultPage> {
        query.validate()?;

        let request = self.request(query);
        debug!(url = %request.url, "Bing request");
        let html = self.fetcher.fetch(&request).await?;

        Ok(self.parse_response(&html, query.page))
    }
}
