//! # a3s-bing
//!
//! The Bing web engine for the a3s meta search library.
//!
//! The adapter covers the parts of talking to Bing that have to be right no
//! matter how results are later merged:
//!
//! - Request construction with paging, market cookies and time filters
//! - Result extraction from Bing's HTML, including `/ck/a` link decoding
//! - Detection of out-of-range pages Bing silently recycles
//! - Market/language code sync from Bing's reference page
//!
//! ## Example
//!
//! ```rust,no_run
//! use a3s_bing::{engines::Bing, BingConfig, Engine, SearchQuery};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let bing = Bing::http(BingConfig::default())?;
//!     bing.refresh_traits().await?;
//!
//!     let query = SearchQuery::new("rust programming").with_locale("de-DE");
//!     let page = bing.search(&query).await?;
//!
//!     for result in page.results() {
//!         println!("{}: {}", result.title, result.url);
//!     }
//!     Ok(())
//! }
//! ```

mod config;
mod engine;
mod error;
mod query;
mod result;

pub mod engines;
pub mod extract;
pub mod fetcher;
pub mod fetcher_http;
pub mod locale;
pub mod pagination;
pub mod redirect;
pub mod request;

pub use config::{BingConfig, DEFAULT_BASE_URL, DEFAULT_TRAITS_URL};
pub use engine::{Engine, EngineCategory, EngineConfig};
pub use error::{BingError, RecordError, Result};
pub use query::{SearchQuery, TimeRange};
pub use result::{ExtractedRecord, ResultItem, ResultPage, SearchResult};
