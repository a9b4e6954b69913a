//! HTTP-based page fetcher using reqwest.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::COOKIE;
use reqwest::Client;
use tracing::debug;

use crate::config::BingConfig;
use crate::fetcher::PageFetcher;
use crate::request::RequestDescriptor;
use crate::{BingError, Result};

/// A page fetcher that uses plain HTTP requests via reqwest.
///
/// Cookies from the descriptor are sent as a single `Cookie` header; no
/// cookie jar is kept between requests.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Creates an `HttpFetcher` from the adapter configuration.
    pub fn from_config(config: &BingConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client })
    }

    /// Creates an `HttpFetcher` with a custom reqwest client.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, request: &RequestDescriptor) -> Result<String> {
        let mut builder = self.client.get(&request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(cookies) = request.cookie_header() {
            builder = builder.header(COOKIE, cookies);
        }

        let response = builder.send().await?;
        let status = response.status();
        debug!(url = %request.url, status = status.as_u16(), "Fetched page");
        if !status.is_success() {
            return Err(BingError::Status(status.as_u16()));
        }
        Ok(response.text().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_fetcher_from_config() {
        assert!(HttpFetcher::from_config(&BingConfig::default()).is_ok());
    }

    #[test]
    fn test_http_fetcher_with_client() {
        let client = Client::builder()
            .user_agent("test-agent")
            .build()
            .unwrap();
        let _fetcher = HttpFetcher::with_client(client);
    }

    #[tokio::test]
    async fn test_http_fetcher_connection_error() {
        let fetcher = HttpFetcher::from_config(&BingConfig {
            timeout_secs: 1,
            ..Default::default()
        })
        .unwrap();
        // Port 9 (discard) on localhost is expected to refuse connections.
        let err = fetcher
            .fetch(&RequestDescriptor::get("http://127.0.0.1:9/"))
            .await
            .unwrap_err();
        assert!(matches!(err, BingError::Http(_)));
    }
}
