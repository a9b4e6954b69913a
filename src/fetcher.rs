//! Page fetcher abstraction for retrieving HTML content.

use async_trait::async_trait;

use crate::request::RequestDescriptor;
use crate::Result;

/// Trait for executing a [`RequestDescriptor`] and returning the body.
///
/// The adapter never talks to the network directly; connection pooling,
/// retries, TLS and proxies all belong to the implementation. All
/// configuration is set at construction time.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Performs the GET request described by `request` and returns the
    /// response body as text.
    async fn fetch(&self, request: &RequestDescriptor) -> Result<String>;
}
