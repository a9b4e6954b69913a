//! Builds a [`LocaleTraitTable`] from Bing's market-codes reference page.

use scraper::{Html, Selector};
use tracing::{debug, info, warn};
use unic_langid::LanguageIdentifier;

use super::LocaleTraitTable;
use crate::fetcher::PageFetcher;
use crate::request::RequestDescriptor;
use crate::{BingError, Result};

/// Market codes: third column of the first table.
const MARKET_CODES_SELECTOR: &str = "table:nth-of-type(1) tbody tr td:nth-child(3)";

/// Language codes: second column of the third table.
const LANGUAGE_CODES_SELECTOR: &str = "table:nth-of-type(3) tbody tr td:nth-child(2)";

/// Market code Bing uses for "all regions".
pub const ALL_LOCALE_CODE: &str = "en-WW";

/// Language entries already covered by their base language.
pub const EXCLUDED_LANGUAGES: &[&str] = &["en-gb", "pt-br"];

/// Bing language codes that do not follow ISO 639.
pub const LANGUAGE_REMAP: &[(&str, &str)] = &[("jp", "ja")];

/// Bing market codes whose canonical locale differs from a literal parse.
pub const REGION_REMAP: &[(&str, &str)] = &[("en-ID", "id_ID"), ("no-NO", "nb_NO")];

/// Aliases inserted before any scraped entry so they always win.
const LANGUAGE_ALIASES: &[(&str, &str)] = &[("zh", "zh-hans")];

/// Fetches the reference page and builds a fresh table from it.
pub async fn refresh(fetcher: &dyn PageFetcher, url: &str) -> Result<LocaleTraitTable> {
    let html = fetcher.fetch(&RequestDescriptor::get(url)).await?;
    let table = LocaleTraitTable::from_reference_html(&html)?;
    info!(
        languages = table.languages.len(),
        regions = table.regions.len(),
        "Built Bing trait table"
    );
    Ok(table)
}

impl LocaleTraitTable {
    /// Builds a table from the HTML of the market-codes reference page.
    ///
    /// Fails only when the page yields no codes at all; individual bad
    /// entries are logged and skipped.
    pub fn from_reference_html(html: &str) -> Result<Self> {
        let document = Html::parse_document(html);
        let language_codes = column_text(&document, LANGUAGE_CODES_SELECTOR)?;
        let market_codes = column_text(&document, MARKET_CODES_SELECTOR)?;

        if language_codes.is_empty() && market_codes.is_empty() {
            return Err(BingError::Parse(
                "market-codes page contains no code tables".to_string(),
            ));
        }

        Ok(Self::from_codes(
            language_codes.iter().map(String::as_str),
            market_codes.iter().map(String::as_str),
        ))
    }

    /// Builds a table from already extracted language and market columns.
    pub fn from_codes<'a>(
        language_codes: impl IntoIterator<Item = &'a str>,
        market_codes: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        let mut table = Self::new();

        for (tag, code) in LANGUAGE_ALIASES {
            table.insert_language(*tag, *code);
        }

        for code in language_codes {
            if EXCLUDED_LANGUAGES.iter().any(|excluded| *excluded == code) {
                continue;
            }
            let Some(id) = parse_provider_code(remap(LANGUAGE_REMAP, code)) else {
                warn!(code, "Bing language is unknown to the locale parser");
                continue;
            };
            table.insert_language(language_tag(&id), code);
        }

        for code in market_codes {
            if code == ALL_LOCALE_CODE {
                table.all_locale = Some(code.to_string());
                continue;
            }
            let Some(tag) = parse_provider_code(remap(REGION_REMAP, code)).and_then(|id| region_tag(&id))
            else {
                warn!(code, "Bing market is unknown to the locale parser");
                continue;
            };
            table.insert_region(tag, code);
        }

        debug!(
            languages = table.languages.len(),
            regions = table.regions.len(),
            "Parsed Bing codes"
        );
        table
    }
}

fn column_text(document: &Html, selector: &str) -> Result<Vec<String>> {
    let selector = Selector::parse(selector)
        .map_err(|e| BingError::Parse(format!("Failed to parse selector: {:?}", e)))?;
    Ok(document
        .select(&selector)
        .map(|td| td.text().collect::<String>().trim().to_string())
        .filter(|code| !code.is_empty())
        .collect())
}

fn remap<'a>(table: &[(&str, &'a str)], code: &'a str) -> &'a str {
    table
        .iter()
        .find(|(from, _)| *from == code)
        .map(|(_, to)| *to)
        .unwrap_or(code)
}

fn parse_provider_code(code: &str) -> Option<LanguageIdentifier> {
    code.replace('-', "_")
        .parse::<LanguageIdentifier>()
        .ok()
        .filter(|id| id.language.as_str() != "und")
}

/// `language` or `language_Script`, e.g. `de`, `zh_Hant`.
fn language_tag(id: &LanguageIdentifier) -> String {
    match &id.script {
        Some(script) => format!("{}_{}", id.language.as_str(), script.as_str()),
        None => id.language.as_str().to_string(),
    }
}

/// `language-REGION`, e.g. `de-DE`; `None` when the code names no region.
fn region_tag(id: &LanguageIdentifier) -> Option<String> {
    id.region
        .as_ref()
        .map(|region| format!("{}-{}", id.language.as_str(), region.as_str()))
}
