use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Barcode symbology inferred from an extracted identifier's shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BarcodeFormat {
    /// 8-digit EAN-8.
    Ean8,
    /// 12-digit UPC-A.
    UpcA,
    /// 13-digit EAN-13.
    Ean13,
    /// Uppercase alphanumeric code of 6+ characters (SKU, model number).
    Alphanumeric,
    Unknown,
}

/// A string pulled out of noisy recognized text that might be a product code.
///
/// Immutable once produced. Candidates from the same extraction are ordered
/// by descending value length, then descending confidence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentifierCandidate {
    pub value: String,
    pub format: BarcodeFormat,
    /// Heuristic score in `[0, 100]`. A ranking signal, not a probability.
    pub confidence: u8,
}

/// A product image reference carried through source records into the
/// canonical product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    pub url: String,
    #[serde(default)]
    pub is_primary: bool,
}

/// A typed product identifier, e.g. `{kind: "upc", value: "012345678905"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductIdentifier {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: String,
}

/// The raw, partially populated product description returned by one
/// external source. Any field may be absent; the merger decides which
/// source's value wins per field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceRecord {
    pub name: Option<String>,
    pub brand: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub images: Vec<ImageRef>,
    #[serde(default)]
    pub identifiers: Vec<ProductIdentifier>,
    pub suggested_price: Option<f64>,
    /// Stable tag of the source that produced this record (e.g.
    /// `"open_food_facts"`).
    pub source_tag: String,
}

impl SourceRecord {
    /// Returns `true` if this record carries at least one populated field
    /// and therefore counts as a contributing source when merged.
    #[must_use]
    pub fn has_data(&self) -> bool {
        self.name.is_some()
            || self.brand.is_some()
            || self.category.is_some()
            || self.description.is_some()
            || self.suggested_price.is_some()
            || !self.images.is_empty()
            || !self.identifiers.is_empty()
    }
}

/// The single merged product description produced from one or more
/// source records. Never persisted by the engine itself.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CanonicalProduct {
    pub name: Option<String>,
    pub brand: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    /// Deduplicated by URL; exactly one entry is primary whenever the
    /// list is non-empty.
    #[serde(default)]
    pub images: Vec<ImageRef>,
    /// Deduplicated by `(type, value)` pair.
    #[serde(default)]
    pub identifiers: Vec<ProductIdentifier>,
    pub suggested_price: Option<f64>,
    /// Tags of every source that contributed at least one field.
    #[serde(default)]
    pub contributing_sources: Vec<String>,
}

impl CanonicalProduct {
    /// Returns the primary image, if any image survived the merge.
    #[must_use]
    pub fn primary_image(&self) -> Option<&ImageRef> {
        self.images.iter().find(|img| img.is_primary)
    }

    /// Returns the first identifier of the given kind, e.g. `"upc"`.
    #[must_use]
    pub fn identifier(&self, kind: &str) -> Option<&str> {
        self.identifiers
            .iter()
            .find(|id| id.kind == kind)
            .map(|id| id.value.as_str())
    }
}

/// One scraped retailer search result being evaluated as a potential
/// match for a canonical product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetailerListing {
    /// Retailer display name, e.g. `"Amazon"`.
    pub retailer: String,
    pub title: String,
    pub price: f64,
    /// ISO 4217 currency code (e.g., `"USD"`).
    pub currency: String,
    pub url: Option<String>,
    pub image_url: Option<String>,
}

/// A scored listing. `accepted` records the relevance-gate verdict;
/// ranked output only ever contains accepted results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub listing: RetailerListing,
    /// Textual match confidence in `[0, 100]`.
    pub confidence: u8,
    pub accepted: bool,
}

/// One observed price point in a product's history. The engine only
/// reads these; the sequence is append-only from the caller's side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceHistoryEntry {
    pub price: f64,
    pub observed_at: DateTime<Utc>,
    /// Where the observation came from (a retailer key or source tag).
    pub source: String,
}
