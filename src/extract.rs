//! Result extraction from Bing's HTML result page.
//!
//! Bing's markup is unversioned and changes without notice, so every
//! structural lookup goes through a [`FieldExtractor`] keyed by the
//! semantic [`Field`] it serves. [`CssFieldExtractor`] is the default,
//! backed by CSS selectors.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::redirect::resolve_url;
use crate::{BingError, RecordError, Result, ResultPage, SearchResult};

static NON_DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^0-9]").expect("static regex is valid"));

/// Semantic fields of a result page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// One organic result block.
    Block,
    /// Title link inside a block; its `href` is the result URL.
    Title,
    /// Paragraph holding the snippet inside a block.
    Snippet,
    /// Element(s) holding the "X-Y of Z results" text.
    Count,
}

/// Locates semantic fields in a parsed page.
pub trait FieldExtractor: Send + Sync {
    /// Result blocks in document order.
    fn blocks<'a>(&self, document: &'a Html) -> Vec<ElementRef<'a>>;

    /// Title link of a block, if present.
    fn title<'a>(&self, block: ElementRef<'a>) -> Option<ElementRef<'a>>;

    /// Snippet element of a block, if present.
    fn snippet<'a>(&self, block: ElementRef<'a>) -> Option<ElementRef<'a>>;

    /// Concatenated text of the count element(s).
    fn count_text(&self, document: &Html) -> String;
}

/// [`FieldExtractor`] driven by one CSS selector per field.
#[derive(Debug, Clone)]
pub struct CssFieldExtractor {
    selectors: HashMap<Field, Selector>,
}

impl CssFieldExtractor {
    /// Selectors matching Bing's current web result markup.
    pub const DEFAULT_SELECTORS: [(Field, &'static str); 4] = [
        (Field::Block, "ol#b_results > li.b_algo"),
        (Field::Title, "h2 a"),
        (Field::Snippet, "p"),
        (Field::Count, "span.sb_count"),
    ];

    /// Creates an extractor with [`Self::DEFAULT_SELECTORS`].
    pub fn new() -> Result<Self> {
        Self::from_selectors(Self::DEFAULT_SELECTORS)
    }

    /// Builds an extractor from `(field, css)` pairs. Every field must be
    /// covered.
    pub fn from_selectors<'s>(pairs: impl IntoIterator<Item = (Field, &'s str)>) -> Result<Self> {
        let mut selectors = HashMap::new();
        for (field, css) in pairs {
            let selector = Selector::parse(css).map_err(|e| {
                BingError::Parse(format!("Failed to parse selector {:?}: {:?}", css, e))
            })?;
            selectors.insert(field, selector);
        }
        for field in [Field::Block, Field::Title, Field::Snippet, Field::Count] {
            if !selectors.contains_key(&field) {
                return Err(BingError::Parse(format!("No selector for {:?}", field)));
            }
        }
        Ok(Self { selectors })
    }

    fn selector(&self, field: Field) -> &Selector {
        // from_selectors guarantees every field is present.
        &self.selectors[&field]
    }
}

impl FieldExtractor for CssFieldExtractor {
    fn blocks<'a>(&self, document: &'a Html) -> Vec<ElementRef<'a>> {
        document.select(self.selector(Field::Block)).collect()
    }

    fn title<'a>(&self, block: ElementRef<'a>) -> Option<ElementRef<'a>> {
        block.select(self.selector(Field::Title)).next()
    }

    fn snippet<'a>(&self, block: ElementRef<'a>) -> Option<ElementRef<'a>> {
        block.select(self.selector(Field::Snippet)).next()
    }

    fn count_text(&self, document: &Html) -> String {
        document
            .select(self.selector(Field::Count))
            .flat_map(|el| el.text())
            .collect()
    }
}

/// Turns a result page's HTML into a [`ResultPage`].
pub struct ResultExtractor<F = CssFieldExtractor> {
    fields: F,
}

impl ResultExtractor<CssFieldExtractor> {
    /// Creates an extractor with the default CSS selectors.
    pub fn new() -> Result<Self> {
        Ok(Self::with_fields(CssFieldExtractor::new()?))
    }
}

impl<F: FieldExtractor> ResultExtractor<F> {
    /// Creates an extractor that reads fields through `fields`, e.g. a
    /// [`CssFieldExtractor`] built with alternate selectors.
    pub fn with_fields(fields: F) -> Self {
        Self { fields }
    }

    /// Extracts all result blocks plus the total-count estimate.
    ///
    /// Blocks without a title link are skipped. A block whose link cannot be
    /// decoded becomes an error entry at its position; its siblings are
    /// unaffected.
    pub fn extract(&self, html: &str) -> ResultPage {
        let document = Html::parse_document(html);
        let mut page = ResultPage::new();

        for (position, block) in self.fields.blocks(&document).into_iter().enumerate() {
            let Some(link) = self.fields.title(block) else {
                debug!(position, "Result block without title link, skipping");
                continue;
            };

            let title = normalize_text(&link.text().collect::<String>());
            let href = link.value().attr("href").unwrap_or_default();
            let content = self
                .fields
                .snippet(block)
                .map(text_without_links)
                .unwrap_or_default();

            let entry = match resolve_url(href) {
                Ok(url) => Ok(SearchResult::new(url, title, content)),
                Err(source) => {
                    debug!(position, error = %source, "Failed to decode result URL");
                    Err(RecordError {
                        position,
                        title,
                        source,
                    })
                }
            };
            page.push(entry);
        }

        page.number_of_results = parse_result_count(&self.fields.count_text(&document));
        debug!(
            results = page.len(),
            number_of_results = ?page.number_of_results,
            "Bing page extracted"
        );
        page
    }
}

/// Parses Bing's result count text, e.g. `"1-10 of 1,234 results"` or
/// `"About 1,234 results"`. Returns `None` when no number can be read.
pub fn parse_result_count(text: &str) -> Option<u64> {
    let total = match text.find('-') {
        // Drop the "X-Y" range of a paginated request.
        Some(dash) => text[dash + 1..]
            .trim_start()
            .trim_start_matches(|c: char| c.is_ascii_digit() || c == ',' || c == '.'),
        None => text,
    };

    let digits = NON_DIGITS.replace_all(total, "");
    if digits.is_empty() {
        debug!(text, "No result count in page");
        return None;
    }
    match digits.parse::<u64>() {
        Ok(count) => Some(count),
        Err(e) => {
            debug!(text, error = %e, "Unreadable result count");
            None
        }
    }
}

/// Text of `element` with every `<a>` subtree left out.
fn text_without_links(element: ElementRef<'_>) -> String {
    let mut text = String::new();
    for node in element.descendants() {
        let Some(fragment) = node.value().as_text() else {
            continue;
        };
        let inside_link = node
            .ancestors()
            .take_while(|ancestor| ancestor.id() != element.id())
            .any(|ancestor| {
                ancestor
                    .value()
                    .as_element()
                    .is_some_and(|el| el.name() == "a")
            });
        if !inside_link {
            text.push_str(fragment);
        }
    }
    normalize_text(&text)
}

fn normalize_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::redirect::{encode_redirect_param, REDIRECT_PREFIX};

    const MOCK_BING_HTML: &str = r#"<!DOCTYPE html>
<html>
<body>
<span class="sb_count">1-10 of 1,234 results</span>
<ol id="b_results">
<li class="b_algo">
  <h2><a href="https://www.rust-lang.org/" h="ID=SERP">Rust Programming Language</a></h2>
  <div class="b_caption"><p>A language empowering everyone to build reliable and efficient software.</p></div>
</li>
<li class="b_algo">
  <h2><a href="https://doc.rust-lang.org/book/" h="ID=SERP">The Rust Programming
      Language Book</a></h2>
  <div class="b_caption"><p>An introductory book about Rust. <a href="https://example.com/more">Read more</a></p></div>
</li>
<li class="b_ad">
  <h2><a href="https://ads.example.com/">Sponsored</a></h2>
</li>
<li class="b_algo">
  <h2><a href="https://en.wikipedia.org/wiki/Rust_(programming_language)" h="ID=SERP">Rust (programming language) - Wikipedia</a></h2>
  <div class="b_caption"><p>Rust is a multi-paradigm programming language.</p><p>Second paragraph.</p></div>
</li>
</ol>
</body>
</html>"#;

    fn extractor() -> ResultExtractor {
        ResultExtractor::new().unwrap()
    }

    #[test]
    fn test_extract_mock_html() {
        let page = extractor().extract(MOCK_BING_HTML);
        let results: Vec<_> = page.results().collect();
        assert_eq!(results.len(), 3);

        assert_eq!(results[0].title, "Rust Programming Language");
        assert_eq!(results[0].url, "https://www.rust-lang.org/");
        assert_eq!(
            results[0].content,
            "A language empowering everyone to build reliable and efficient software."
        );
        assert_eq!(results[1].title, "The Rust Programming Language Book");
        assert_eq!(results[2].content, "Rust is a multi-paradigm programming language.");
        assert_eq!(page.number_of_results, Some(1234));
    }

    #[test]
    fn test_extract_preserves_document_order() {
        let page = extractor().extract(MOCK_BING_HTML);
        let urls: Vec<_> = page.results().map(|r| r.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://www.rust-lang.org/",
                "https://doc.rust-lang.org/book/",
                "https://en.wikipedia.org/wiki/Rust_(programming_language)",
            ]
        );
    }

    #[test]
    fn test_extract_strips_links_from_snippet() {
        let page = extractor().extract(MOCK_BING_HTML);
        let second = page.results().nth(1).unwrap();
        assert_eq!(second.content, "An introductory book about Rust.");
        assert!(!second.content.contains("Read more"));
    }

    #[test]
    fn test_extract_skips_non_result_blocks() {
        let page = extractor().extract(MOCK_BING_HTML);
        assert!(page.results().all(|r| !r.url.contains("ads.example.com")));
    }

    #[test]
    fn test_extract_skips_block_without_title_link() {
        let html = r#"<ol id="b_results">
            <li class="b_algo"><h2>No link here</h2><p>orphan</p></li>
            <li class="b_algo"><h2><a href="https://example.com/">Example</a></h2><p>kept</p></li>
        </ol>"#;
        let page = extractor().extract(html);
        assert_eq!(page.len(), 1);
        assert_eq!(page.results().next().unwrap().content, "kept");
        assert_eq!(page.failures().count(), 0);
    }

    #[test]
    fn test_extract_decodes_redirects() {
        let href = format!(
            "{}!&amp;&amp;p=1&amp;u={}&amp;ntb=1",
            REDIRECT_PREFIX,
            encode_redirect_param("https://example.com/decoded")
        );
        let html = format!(
            r#"<ol id="b_results"><li class="b_algo"><h2><a href="{}">Decoded</a></h2><p>snippet</p></li></ol>"#,
            href
        );
        let page = extractor().extract(&html);
        let result = page.results().next().unwrap();
        assert_eq!(result.url, "https://example.com/decoded");
        assert!(page.results().all(|r| !r.url.starts_with(REDIRECT_PREFIX)));
    }

    #[test]
    fn test_extract_isolates_decode_failure() {
        let html = format!(
            r#"<ol id="b_results">
            <li class="b_algo"><h2><a href="https://one.example/">One</a></h2></li>
            <li class="b_algo"><h2><a href="{}u=a1!!!!">Broken</a></h2></li>
            <li class="b_algo"><h2><a href="https://three.example/">Three</a></h2></li>
            </ol>"#,
            REDIRECT_PREFIX
        );
        let page = extractor().extract(&html);
        assert_eq!(page.len(), 3);

        let urls: Vec<_> = page.results().map(|r| r.url.as_str()).collect();
        assert_eq!(urls, vec!["https://one.example/", "https://three.example/"]);

        let failure = page.failures().next().unwrap();
        assert_eq!(failure.position, 1);
        assert_eq!(failure.title, "Broken");
        assert!(matches!(failure.source, BingError::RedirectDecode(_)));
        assert!(page.entries()[1].is_err());
    }

    #[test]
    fn test_extract_missing_snippet_is_empty() {
        let html = r#"<ol id="b_results"><li class="b_algo"><h2><a href="https://example.com/">Example</a></h2></li></ol>"#;
        let page = extractor().extract(html);
        assert_eq!(page.results().next().unwrap().content, "");
    }

    #[test]
    fn test_extract_empty_html() {
        let page = extractor().extract("<html><body></body></html>");
        assert!(page.is_empty());
        assert!(page.number_of_results.is_none());
    }

    #[test]
    fn test_parse_result_count_paginated() {
        assert_eq!(parse_result_count("1-10 of 1,234 results"), Some(1234));
        assert_eq!(parse_result_count("11-20 of 1,234 results"), Some(1234));
        assert_eq!(parse_result_count("991-1000 of 25,300 results"), Some(25300));
        assert_eq!(parse_result_count("11 - 20 von 1.234 Ergebnissen"), Some(1234));
    }

    #[test]
    fn test_parse_result_count_plain() {
        assert_eq!(parse_result_count("About 56,700,000 results"), Some(56_700_000));
        assert_eq!(parse_result_count("42 results"), Some(42));
    }

    #[test]
    fn test_parse_result_count_unknown() {
        assert_eq!(parse_result_count(""), None);
        assert_eq!(parse_result_count("no results"), None);
        assert_eq!(parse_result_count("1-10 of many"), None);
    }

    #[test]
    fn test_parse_result_count_overflow_is_unknown() {
        assert_eq!(parse_result_count("99999999999999999999999 results"), None);
    }

    #[test]
    fn test_count_text_concatenates_nested_text() {
        let html = r#"<span class="sb_count"><span>1-10</span> of <b>1,234</b> results</span>"#;
        let page = extractor().extract(html);
        assert_eq!(page.number_of_results, Some(1234));
    }

    #[test]
    fn test_custom_selectors() {
        let fields = CssFieldExtractor::from_selectors([
            (Field::Block, "div.result"),
            (Field::Title, "a.title"),
            (Field::Snippet, "span.desc"),
            (Field::Count, "#count"),
        ])
        .unwrap();
        let html = r#"<div id="count">7 results</div>
            <div class="result"><a class="title" href="https://example.com/">Ex</a><span class="desc">Text <a href="/x">link</a></span></div>"#;
        let page = ResultExtractor::with_fields(fields).extract(html);
        let result = page.results().next().unwrap();
        assert_eq!(result.title, "Ex");
        assert_eq!(result.content, "Text");
        assert_eq!(page.number_of_results, Some(7));
    }

    #[test]
    fn test_from_selectors_requires_every_field() {
        let err = CssFieldExtractor::from_selectors([(Field::Block, "li")]).unwrap_err();
        assert!(err.to_string().contains("No selector"));
    }

    #[test]
    fn test_from_selectors_rejects_bad_css() {
        let err = CssFieldExtractor::from_selectors([(Field::Block, "li[")]).unwrap_err();
        assert!(matches!(err, BingError::Parse(_)));
    }
}
