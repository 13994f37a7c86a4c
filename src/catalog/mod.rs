//! Commerce metadata for rated items.
//!
//! The catalog maps an item name to an image, a shop link and a price
//! string. It is display enrichment only: an item missing from the catalog
//! still shows all of its scores, with the commerce fields degraded to
//! "not available".

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Price text shown when an item has no catalog entry.
pub const PRICE_UNAVAILABLE: &str = "n/a";

/// Commerce metadata of one item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Product image URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub img: Option<String>,
    /// Shop page URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Free-form price text, e.g. "CHF 22.50 / kg".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
}

/// Lookup from item name to commerce metadata.
pub trait CatalogLookup {
    fn lookup(&self, item: &str) -> Option<&CatalogEntry>;
}

/// Catalog backed by a fixed map, usually the `[catalog]` config table.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    entries: BTreeMap<String, CatalogEntry>,
}

impl StaticCatalog {
    pub fn new(entries: BTreeMap<String, CatalogEntry>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl CatalogLookup for StaticCatalog {
    fn lookup(&self, item: &str) -> Option<&CatalogEntry> {
        self.entries.get(item)
    }
}

/// Resolved commerce data for one item, ready for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogView {
    pub image: Option<String>,
    pub link: Option<String>,
    pub price: String,
    /// Whether the item had a catalog entry at all.
    pub listed: bool,
}

impl CatalogView {
    /// Look an item up, falling back to "not available" fields.
    pub fn resolve(catalog: &dyn CatalogLookup, item: &str) -> Self {
        match catalog.lookup(item) {
            Some(entry) => Self {
                image: entry.img.clone(),
                link: entry.url.clone(),
                price: entry
                    .price
                    .clone()
                    .unwrap_or_else(|| PRICE_UNAVAILABLE.to_string()),
                listed: true,
            },
            None => {
                debug!("No catalog entry for '{}'", item);
                Self::unavailable()
            }
        }
    }

    pub fn unavailable() -> Self {
        Self {
            image: None,
            link: None,
            price: PRICE_UNAVAILABLE.to_string(),
            listed: false,
        }
    }
}
