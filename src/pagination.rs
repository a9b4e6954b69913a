//! Out-of-range pagination guard.
//!
//! When asked for an offset past the last match, Bing silently serves the
//! first page again instead of an empty page or an error. Comparing the
//! requested offset with the total count catches those recycled pages.

use tracing::debug;

use crate::request::page_offset;
use crate::ResultPage;

/// Whether `page` starts past a known, non-zero `total`.
///
/// A zero count carries no information about recycling, so it never
/// triggers the guard.
pub fn exceeds_total(page: u32, total: Option<u64>) -> bool {
    matches!(total, Some(total) if total > 0 && page_offset(page) > total)
}

/// Returns `results` unchanged, or an empty page with no count when the
/// requested page lies beyond the known non-zero total.
pub fn guard(page: u32, total: Option<u64>, results: ResultPage) -> ResultPage {
    if exceeds_total(page, total) {
        debug!(
            page,
            offset = page_offset(page),
            total = ?total,
            discarded = results.len(),
            "Requested page beyond result count, dropping recycled results"
        );
        return ResultPage::new();
    }
    results
}
