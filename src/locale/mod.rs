//! Market and language code tables ("traits") for Bing.
//!
//! Bing identifies locales by its own market codes (`de-DE`, `en-WW`, ...)
//! and language codes (`de`, `zh-hans`, ...). [`LocaleTraitTable`] maps the
//! library's internal locale tags onto those codes. Tables are built once by
//! [`refresh`] and then only read; [`TraitStore`] swaps whole snapshots.

mod refresh;
mod store;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use unic_langid::LanguageIdentifier;

pub use refresh::{refresh, ALL_LOCALE_CODE, EXCLUDED_LANGUAGES, LANGUAGE_REMAP, REGION_REMAP};
pub use store::TraitStore;

/// Internal tag selecting every locale at once.
pub const ALL_LOCALES_TAG: &str = "all";

/// Likely market for a bare language tag, used when the table has no
/// `xx-XX` style entry for the language.
const LIKELY_REGIONS: &[(&str, &str)] = &[
    ("ar", "SA"),
    ("da", "DK"),
    ("en", "US"),
    ("ja", "JP"),
    ("ko", "KR"),
    ("nb", "NO"),
    ("sv", "SE"),
    ("zh", "CN"),
];

/// Script implied by a language-region pair when the tag carries none.
const LIKELY_SCRIPTS: &[(&str, &str)] = &[
    ("zh-CN", "Hans"),
    ("zh-SG", "Hans"),
    ("zh-HK", "Hant"),
    ("zh-MO", "Hant"),
    ("zh-TW", "Hant"),
];

/// A Bing language + market pair, both lowercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProviderLocale {
    /// Bing UI/content language code.
    pub language: String,
    /// Bing market code.
    pub region: String,
}

impl ProviderLocale {
    pub fn new(language: impl AsRef<str>, region: impl AsRef<str>) -> Self {
        Self {
            language: language.as_ref().to_lowercase(),
            region: region.as_ref().to_lowercase(),
        }
    }
}

impl Default for ProviderLocale {
    fn default() -> Self {
        Self::new("en", "us")
    }
}

/// Maps internal locale tags to Bing codes.
///
/// This is the boundary the request builder depends on; the trait table is
/// the implementation shipped with this crate.
pub trait LocaleResolver: Send + Sync {
    /// Bing language code for an internal tag, if one is known.
    fn language(&self, tag: &str) -> Option<String>;

    /// Bing market code for an internal tag, if one is known.
    fn region(&self, tag: &str) -> Option<String>;

    /// Resolves both codes, falling back to `default` independently for
    /// each half that has no mapping.
    fn resolve(&self, tag: Option<&str>, default: &ProviderLocale) -> ProviderLocale {
        let Some(tag) = tag else {
            return default.clone();
        };
        let language = self
            .language(tag)
            .unwrap_or_else(|| default.language.clone());
        let region = self.region(tag).unwrap_or_else(|| default.region.clone());
        ProviderLocale::new(language, region)
    }
}

/// Internal tag → Bing code mappings plus the "all locales" sentinel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocaleTraitTable {
    /// Internal language tag (`de`, `zh_Hans`) → Bing language code.
    pub languages: BTreeMap<String, String>,
    /// Internal region tag (`de-DE`) → Bing market code.
    pub regions: BTreeMap<String, String>,
    /// Bing code used when every locale is requested.
    pub all_locale: Option<String>,
}

impl LocaleTraitTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a table previously serialized with [`LocaleTraitTable::to_json`].
    pub fn from_json(json: &str) -> crate::Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| crate::BingError::Parse(format!("invalid trait table: {}", e)))
    }

    pub fn to_json(&self) -> crate::Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| crate::BingError::Other(format!("failed to serialize trait table: {}", e)))
    }

    /// Records a language mapping. The first mapping for a tag wins; later
    /// different codes are logged and dropped. Returns whether it was stored.
    pub fn insert_language(&mut self, tag: impl Into<String>, code: impl Into<String>) -> bool {
        insert_first_wins(&mut self.languages, "language", tag.into(), code.into())
    }

    /// Records a region mapping with the same first-wins policy.
    pub fn insert_region(&mut self, tag: impl Into<String>, code: impl Into<String>) -> bool {
        insert_first_wins(&mut self.regions, "region", tag.into(), code.into())
    }

    /// Bing language code for `tag`, or `default`.
    pub fn get_language(&self, tag: &str, default: &str) -> String {
        self.language(tag).unwrap_or_else(|| default.to_string())
    }

    /// Bing market code for `tag`, or `default`.
    pub fn get_region(&self, tag: &str, default: &str) -> String {
        self.region(tag).unwrap_or_else(|| default.to_string())
    }

    fn lookup_language(&self, id: &LanguageIdentifier) -> Option<String> {
        let language = id.language.as_str();
        let script = id
            .script
            .as_ref()
            .map(|s| s.as_str().to_string())
            .or_else(|| {
                let region = id.region.as_ref()?;
                let key = format!("{}-{}", language, region.as_str());
                lookup(LIKELY_SCRIPTS, &key).map(str::to_string)
            });

        if let Some(script) = script {
            if let Some(code) = self.languages.get(&format!("{}_{}", language, script)) {
                return Some(code.clone());
            }
        }
        self.languages.get(language).cloned()
    }

    fn lookup_region(&self, id: &LanguageIdentifier) -> Option<String> {
        let language = id.language.as_str();
        if let Some(region) = &id.region {
            return self
                .regions
                .get(&format!("{}-{}", language, region.as_str()))
                .cloned();
        }

        if let Some(region) = lookup(LIKELY_REGIONS, language) {
            if let Some(code) = self.regions.get(&format!("{}-{}", language, region)) {
                return Some(code.clone());
            }
        }
        self.regions
            .get(&format!("{}-{}", language, language.to_uppercase()))
            .cloned()
    }
}

impl LocaleResolver for LocaleTraitTable {
    fn language(&self, tag: &str) -> Option<String> {
        if tag == ALL_LOCALES_TAG {
            return self.all_locale.clone();
        }
        let id = parse_internal_tag(tag)?;
        self.lookup_language(&id)
    }

    fn region(&self, tag: &str) -> Option<String> {
        if tag == ALL_LOCALES_TAG {
            return self.all_locale.clone();
        }
        let id = parse_internal_tag(tag)?;
        self.lookup_region(&id)
    }
}

fn parse_internal_tag(tag: &str) -> Option<LanguageIdentifier> {
    match tag.parse::<LanguageIdentifier>() {
        Ok(id) if id.language.as_str() != "und" => Some(id),
        _ => {
            debug!(tag, "Unparsable locale tag");
            None
        }
    }
}

fn lookup<'a>(table: &[(&str, &'a str)], key: &str) -> Option<&'a str> {
    table.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
}

fn insert_first_wins(
    map: &mut BTreeMap<String, String>,
    kind: &str,
    tag: String,
    code: String,
) -> bool {
    match map.get(&tag) {
        Some(existing) => {
            if *existing != code {
                warn!(kind, tag = %tag, kept = %existing, ignored = %code, "Conflicting Bing locale code");
            }
            false
        }
        None => {
            map.insert(tag, code);
            true
        }
    }
}
