//! End-to-end tests for the Bing adapter.
//!
//! The offline tests drive the full pipeline through a fake fetcher. The
//! live tests are marked with `#[ignore]` because they require network
//! access and depend on Bing's current markup.
//!
//! Run with: `cargo test --test integration -- --ignored`

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use a3s_bing::{
    engines::Bing,
    fetcher::PageFetcher,
    locale::{LocaleTraitTable, TraitStore},
    redirect::{encode_redirect_param, REDIRECT_PREFIX},
    request::RequestDescriptor,
    BingConfig, Engine, ResultItem, SearchQuery, SearchResult, TimeRange,
};

const MARKET_CODES_HTML: &str = r#"<html><body>
<table>
  <thead><tr><th>Country/Region</th><th>Language</th><th>Market code</th></tr></thead>
  <tbody>
    <tr><td>Germany</td><td>German</td><td>de-DE</td></tr>
    <tr><td>Japan</td><td>Japanese</td><td>ja-JP</td></tr>
    <tr><td>United States</td><td>English</td><td>en-US</td></tr>
    <tr><td>Worldwide</td><td>English</td><td>en-WW</td></tr>
  </tbody>
</table>
<table><tbody><tr><td>Germany</td><td>DE</td></tr></tbody></table>
<table>
  <tbody>
    <tr><td>German</td><td>de</td></tr>
    <tr><td>English</td><td>en</td></tr>
    <tr><td>Japanese</td><td>jp</td></tr>
  </tbody>
</table>
</body></html>"#;

/// Serves the market-code page or the result page depending on the URL.
struct RoutingFetcher {
    results_html: String,
    requests: Mutex<Vec<RequestDescriptor>>,
}

impl RoutingFetcher {
    fn new(results_html: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            results_html: results_html.into(),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn search_requests(&self) -> Vec<RequestDescriptor> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.url.contains("?q="))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl PageFetcher for RoutingFetcher {
    async fn fetch(&self, request: &RequestDescriptor) -> a3s_bing::Result<String> {
        self.requests.lock().unwrap().push(request.clone());
        if request.url.contains("market-codes") {
            Ok(MARKET_CODES_HTML.to_string())
        } else {
            Ok(self.results_html.clone())
        }
    }
}

fn results_page(count: &str) -> String {
    format!(
        r#"<!DOCTYPE html><html><body>
        <div id="b_tween"><span class="sb_count">{count}</span></div>
        <ol id="b_results">
          <li class="b_algo">
            <h2><a href="{prefix}!&amp;&amp;p=1&amp;u={first}&amp;ntb=1">Rust Programming Language</a></h2>
            <div class="b_caption"><p>Fast, reliable, productive. <a href="https://www.bing.com/ck/a?x">Pick Rust</a> today.</p></div>
          </li>
          <li class="b_algo">
            <h2><a href="https://doc.rust-lang.org/book/">The Rust Book</a></h2>
            <div class="b_caption"><p>An introductory book about Rust.</p></div>
          </li>
          <li class="b_algo">
            <h2><a href="{prefix}u=a1%%%%">Broken link</a></h2>
          </li>
          <li class="b_algo">
            <h2><a href="https://crates.io/">crates.io</a></h2>
            <div class="b_caption"><p>The Rust community's crate registry.</p></div>
          </li>
        </ol>
        </body></html>"#,
        count = count,
        prefix = REDIRECT_PREFIX,
        first = encode_redirect_param("https://www.rust-lang.org/"),
    )
}

async fn bing_with(fetcher: Arc<RoutingFetcher>) -> Bing {
    let bing = Bing::new(fetcher).unwrap();
    bing.refresh_traits().await.unwrap();
    bing
}

#[tokio::test]
async fn test_full_pipeline() {
    let fetcher = RoutingFetcher::new(results_page("1-10 of 1,234 results"));
    let bing = bing_with(fetcher.clone()).await;

    let query = SearchQuery::new("rust").with_locale("de-DE");
    let page = bing.search(&query).await.unwrap();

    let results: Vec<_> = page.results().cloned().collect();
    assert_eq!(
        results,
        vec![
            SearchResult::new(
                "https://www.rust-lang.org/",
                "Rust Programming Language",
                "Fast, reliable, productive. today."
            ),
            SearchResult::new(
                "https://doc.rust-lang.org/book/",
                "The Rust Book",
                "An introductory book about Rust."
            ),
            SearchResult::new(
                "https://crates.io/",
                "crates.io",
                "The Rust community's crate registry."
            ),
        ]
    );
    assert_eq!(page.failures().count(), 1);
    assert_eq!(page.number_of_results, Some(1234));

    let requests = fetcher.search_requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].cookie("_EDGE_CD"), Some("m=de-de&u=de;"));
}

#[tokio::test]
async fn test_items_for_aggregator() {
    let fetcher = RoutingFetcher::new(results_page("About 1,234 results"));
    let bing = bing_with(fetcher).await;

    let items = bing
        .search(&SearchQuery::new("rust"))
        .await
        .unwrap()
        .into_items();
    assert_eq!(items.len(), 4);
    assert_eq!(
        items.last(),
        Some(&ResultItem::NumberOfResults {
            number_of_results: 1234
        })
    );

    let json = serde_json::to_value(&items).unwrap();
    assert_eq!(json[0]["url"], "https://www.rust-lang.org/");
    assert_eq!(json[3]["number_of_results"], 1234);
}

#[tokio::test]
async fn test_recycled_page_is_dropped() {
    let fetcher = RoutingFetcher::new(results_page("About 30 results"));
    let bing = bing_with(fetcher.clone()).await;

    let page = bing
        .search(&SearchQuery::new("rust").with_page(5))
        .await
        .unwrap();
    assert!(page.into_items().is_empty());
    assert!(fetcher.search_requests()[0].url.contains("first=41"));
}

#[tokio::test]
async fn test_zero_count_keeps_results() {
    let fetcher = RoutingFetcher::new(results_page("0 results"));
    let bing = bing_with(fetcher).await;

    let page = bing.search(&SearchQuery::new("rust")).await.unwrap();
    assert_eq!(page.results().count(), 3);
    assert_eq!(page.number_of_results, Some(0));
}

#[tokio::test]
async fn test_locale_resolution_variants() {
    let fetcher = RoutingFetcher::new(results_page(""));
    let bing = bing_with(fetcher.clone()).await;

    for (locale, expected) in [
        ("ja", "m=ja-jp&u=jp;"),
        ("en", "m=en-us&u=en;"),
        ("all", "m=en-ww&u=en-ww;"),
        ("pt-BR", "m=us&u=en;"),
    ] {
        let query = SearchQuery::new("rust").with_locale(locale);
        let request = bing.request(&query);
        assert_eq!(request.cookie("_EDGE_CD"), Some(expected), "locale {}", locale);
    }
}

#[tokio::test]
async fn test_time_range_filter_in_request() {
    let fetcher = RoutingFetcher::new(results_page(""));
    let bing = bing_with(fetcher.clone()).await;

    bing.search(&SearchQuery::new("rust").with_time_range(TimeRange::Year))
        .await
        .unwrap();
    let url = &fetcher.search_requests()[0].url;
    let filter = url.split("&filters=").nth(1).unwrap();
    let filter = urlencoding::decode(filter).unwrap();
    assert!(filter.starts_with("ex1:\"ez5_"));

    let days: Vec<i64> = filter
        .trim_start_matches("ex1:\"ez5_")
        .trim_end_matches('"')
        .split('_')
        .map(|d| d.parse().unwrap())
        .collect();
    assert_eq!(days.len(), 2);
    assert_eq!(days[1] - days[0], 365);
}

#[tokio::test]
async fn test_shared_trait_store_swap() {
    let store = Arc::new(TraitStore::default());
    let fetcher = RoutingFetcher::new(results_page(""));
    let bing = Bing::new(fetcher).unwrap().with_traits(store.clone());

    let query = SearchQuery::new("rust").with_locale("fr-FR");
    assert_eq!(bing.request(&query).cookie("_EDGE_CD"), Some("m=us&u=en;"));

    let mut table = LocaleTraitTable::new();
    table.insert_language("fr", "fr");
    table.insert_region("fr-FR", "fr-FR");
    store.replace(table);

    assert_eq!(bing.request(&query).cookie("_EDGE_CD"), Some("m=fr-fr&u=fr;"));
}

mod live_tests {
    use super::*;

    #[tokio::test]
    #[ignore]
    async fn test_bing_live_search() {
        let bing = Bing::http(BingConfig::default()).unwrap();
        let page = bing.search(&SearchQuery::new("rust programming")).await.unwrap();
        println!(
            "Bing returned {} results (about {:?} total)",
            page.len(),
            page.number_of_results
        );
        for (i, result) in page.results().take(3).enumerate() {
            println!("  {}. {} - {}", i + 1, result.title, result.url);
        }
        assert!(page.results().count() > 0, "Bing should return results");
        assert!(page.results().all(|r| !r.url.starts_with(REDIRECT_PREFIX)));
    }

    #[tokio::test]
    #[ignore]
    async fn test_bing_live_traits() {
        let bing = Bing::http(BingConfig::default()).unwrap();
        bing.refresh_traits().await.unwrap();
        let table = bing.traits().snapshot();
        println!(
            "{} languages, {} regions",
            table.languages.len(),
            table.regions.len()
        );
        assert_eq!(table.all_locale.as_deref(), Some("en-WW"));
        assert!(table.regions.contains_key("de-DE"));
    }
}
