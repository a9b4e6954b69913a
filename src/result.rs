//! Search result types.

use serde::{Deserialize, Serialize};

use crate::RecordError;

/// A single organic search result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Result URL, always the decoded destination.
    pub url: String,
    /// Result title.
    pub title: String,
    /// Result description/snippet, with embedded links removed.
    pub content: String,
}

impl SearchResult {
    /// Creates a new search result.
    pub fn new(url: impl Into<String>, title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            content: content.into(),
        }
    }
}

/// Outcome of extracting one result block.
pub type ExtractedRecord = std::result::Result<SearchResult, RecordError>;

/// One page of extracted results, in Bing's ranking order.
#[derive(Debug, Default)]
pub struct ResultPage {
    entries: Vec<ExtractedRecord>,
    /// Bing's estimate of the total number of matches, if it could be read.
    pub number_of_results: Option<u64>,
}

impl ResultPage {
    /// Creates an empty page with an unknown result count.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a page from already extracted entries.
    pub fn from_entries(entries: Vec<ExtractedRecord>, number_of_results: Option<u64>) -> Self {
        Self {
            entries,
            number_of_results,
        }
    }

    /// Appends an entry, keeping document order.
    pub fn push(&mut self, entry: ExtractedRecord) {
        self.entries.push(entry);
    }

    /// All entries, successful or not, in document order.
    pub fn entries(&self) -> &[ExtractedRecord] {
        &self.entries
    }

    /// Successfully extracted results in document order.
    pub fn results(&self) -> impl Iterator<Item = &SearchResult> {
        self.entries.iter().filter_map(|e| e.as_ref().ok())
    }

    /// Per-record failures in document order.
    pub fn failures(&self) -> impl Iterator<Item = &RecordError> {
        self.entries.iter().filter_map(|e| e.as_ref().err())
    }

    /// Number of entries on the page, failures included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Converts the page into the flat item list handed to the aggregator.
    ///
    /// Failed records are dropped; a trailing count item is appended when
    /// the total is known.
    pub fn into_items(self) -> Vec<ResultItem> {
        let mut items: Vec<ResultItem> = self
            .entries
            .into_iter()
            .filter_map(|e| e.ok())
            .map(ResultItem::Result)
            .collect();
        if let Some(number_of_results) = self.number_of_results {
            items.push(ResultItem::NumberOfResults { number_of_results });
        }
        items
    }
}

/// Item of the list consumed by the aggregator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResultItem {
    /// A regular result record.
    Result(SearchResult),
    /// Terminal pseudo-record carrying the total-count estimate.
    NumberOfResults { number_of_results: u64 },
}
