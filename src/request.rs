//! Outbound request construction for Bing web search.
//!
//! Bing reads the market and language from the `_EDGE_CD` / `_EDGE_S`
//! cookies on this surface and ignores them in the query string, so the
//! locale travels as cookies while paging and time filters are URL
//! parameters.

use crate::config::{BingConfig, DEFAULT_BASE_URL};
use crate::locale::{LocaleResolver, ProviderLocale};
use crate::{SearchQuery, TimeRange};

/// Results per Bing page.
pub const PAGE_SIZE: u64 = 10;

/// 1-based offset of the first result on `page` (`first=` parameter).
///
/// Page 0 is treated as page 1.
pub fn page_offset(page: u32) -> u64 {
    (u64::from(page.max(1)) - 1) * PAGE_SIZE + 1
}

/// Days elapsed since the Unix epoch, in UTC.
pub fn unix_day_now() -> i64 {
    chrono::Utc::now().timestamp().div_euclid(86_400)
}

/// Bing's `ez` code for a time range. The year range is a rolling window
/// ending on `unix_day`.
pub fn time_range_code(range: TimeRange, unix_day: i64) -> String {
    match range {
        TimeRange::Day => "ez1".to_string(),
        TimeRange::Week => "ez2".to_string(),
        TimeRange::Month => "ez3".to_string(),
        TimeRange::Year => format!("ez5_{}_{}", unix_day - 365, unix_day),
    }
}

/// Everything the transport needs to issue one GET request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestDescriptor {
    /// Full URL including the query string.
    pub url: String,
    /// Cookies to send, in order.
    pub cookies: Vec<(String, String)>,
    /// Extra request headers.
    pub headers: Vec<(String, String)>,
}

impl RequestDescriptor {
    /// A bare GET of `url` without cookies or headers.
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Value of the named cookie, if set.
    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// `Cookie` header value, or `None` when there are no cookies.
    pub fn cookie_header(&self) -> Option<String> {
        if self.cookies.is_empty() {
            return None;
        }
        Some(
            self.cookies
                .iter()
                .map(|(name, value)| format!("{}={}", name, value))
                .collect::<Vec<_>>()
                .join("; "),
        )
    }
}

/// Turns a [`SearchQuery`] into a [`RequestDescriptor`] for Bing.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    base_url: String,
    default_locale: ProviderLocale,
}

impl RequestBuilder {
    /// Creates a builder targeting `base_url` with the `en`/`us` fallback.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            default_locale: ProviderLocale::default(),
        }
    }

    pub fn from_config(config: &BingConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            default_locale: ProviderLocale::new(&config.default_language, &config.default_region),
        }
    }

    /// Sets the locale used when the resolver has no mapping.
    pub fn with_default_locale(mut self, locale: ProviderLocale) -> Self {
        self.default_locale = locale;
        self
    }

    /// Builds the request for `query`, resolving its locale with `resolver`.
    ///
    /// The year filter depends on today's date, so the descriptor must not be
    /// cached across days.
    pub fn build(&self, query: &SearchQuery, resolver: &dyn LocaleResolver) -> RequestDescriptor {
        self.build_at(query, resolver, unix_day_now())
    }

    /// Same as [`RequestBuilder::build`] with an explicit day number.
    pub fn build_at(
        &self,
        query: &SearchQuery,
        resolver: &dyn LocaleResolver,
        unix_day: i64,
    ) -> RequestDescriptor {
        let locale = resolver.resolve(query.locale.as_deref(), &self.default_locale);

        let mut url = format!(
            "{}?q={}&first={}",
            self.base_url,
            urlencoding::encode(&query.query),
            page_offset(query.page)
        );
        if let Some(range) = query.time_range {
            let filter = format!("ex1:\"{}\"", time_range_code(range, unix_day));
            url.push_str("&filters=");
            url.push_str(&urlencoding::encode(&filter));
        }

        RequestDescriptor {
            url,
            cookies: locale_cookies(&locale),
            headers: vec![(
                "Accept".to_string(),
                "text/html,application/xhtml+xml".to_string(),
            )],
        }
    }
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

fn locale_cookies(locale: &ProviderLocale) -> Vec<(String, String)> {
    vec![
        (
            "_EDGE_CD".to_string(),
            format!("m={}&u={};", locale.region, locale.language),
        ),
        (
            "_EDGE_S".to_string(),
            format!("mkt={}&ui={}", locale.region, locale.language),
        ),
    ]
}
