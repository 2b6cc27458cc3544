//! Textual matching of retailer listing titles against a canonical
//! product.
//!
//! There is no shared key between a canonical product and a scraped
//! listing, so matching is heuristic: a binary relevance gate keeps
//! unrelated market noise out entirely, and an additive confidence
//! score ranks what remains. Confidence is a 0–100 heuristic for
//! ranking and thresholds, not a probability.

use shelfscan_core::{CanonicalProduct, MatchResult, RetailerListing};

/// Points for the canonical brand appearing in the listing title.
const BRAND_POINTS: f64 = 40.0;
/// Maximum points for name-word overlap, scaled by the matched fraction.
const NAME_WORD_POINTS: f64 = 40.0;
/// Points for the full product name appearing verbatim in the title.
const EXACT_NAME_POINTS: f64 = 20.0;
/// Minimum fraction of name words that must appear for relevance when
/// the brand does not match.
const RELEVANCE_WORD_RATIO: f64 = 0.5;

/// Lowercased name words longer than two characters; short filler words
/// carry no matching signal.
fn name_tokens(name: &str) -> Vec<String> {
    name.split_whitespace()
        .filter(|word| word.len() > 2)
        .map(str::to_lowercase)
        .collect()
}

fn product_name(product: &CanonicalProduct) -> &str {
    product
        .name
        .as_deref()
        .filter(|name| !name.trim().is_empty())
        .expect("listing matching requires a canonical product with a name")
}

/// Binary relevance gate, applied before any scoring.
///
/// A listing passes if the title contains the canonical brand
/// (case-insensitive), or at least half of the product's name words
/// appear in the title. Listings failing both are market noise and are
/// dropped before ranking, not scored at zero.
///
/// # Panics
///
/// Panics if `product` has no non-empty name. A nameless canonical
/// product cannot be matched against and indicates a caller bug.
#[must_use]
pub fn is_relevant(title: &str, product: &CanonicalProduct) -> bool {
    let title_lower = title.to_lowercase();
    let name_lower = product_name(product).to_lowercase();

    if let Some(brand) = product.brand.as_deref().filter(|b| !b.trim().is_empty()) {
        if title_lower.contains(&brand.to_lowercase()) {
            return true;
        }
    }

    let tokens = name_tokens(&name_lower);
    if tokens.is_empty() {
        return false;
    }
    let matched = tokens
        .iter()
        .filter(|token| title_lower.contains(token.as_str()))
        .count();
    #[allow(clippy::cast_precision_loss)]
    let ratio = matched as f64 / tokens.len() as f64;
    ratio >= RELEVANCE_WORD_RATIO
}

/// Additive match confidence in `[0, 100]` for a listing title.
///
/// +40 for a brand substring match, up to +40 proportional to the
/// fraction of name words present, +20 when the full name appears
/// verbatim. Rounded to the nearest integer and capped.
///
/// # Panics
///
/// Panics if `product` has no non-empty name.
#[must_use]
pub fn match_confidence(title: &str, product: &CanonicalProduct) -> u8 {
    let title_lower = title.to_lowercase();
    let name_lower = product_name(product).to_lowercase();

    let mut confidence = 0.0_f64;

    if let Some(brand) = product.brand.as_deref().filter(|b| !b.trim().is_empty()) {
        if title_lower.contains(&brand.to_lowercase()) {
            confidence += BRAND_POINTS;
        }
    }

    let tokens = name_tokens(&name_lower);
    if !tokens.is_empty() {
        let matched = tokens
            .iter()
            .filter(|token| title_lower.contains(token.as_str()))
            .count();
        #[allow(clippy::cast_precision_loss)]
        let ratio = matched as f64 / tokens.len() as f64;
        confidence += ratio * NAME_WORD_POINTS;
    }

    if title_lower.contains(&name_lower) {
        confidence += EXACT_NAME_POINTS;
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let rounded = confidence.round().min(100.0) as u8;
    rounded
}

/// Scores one listing against the product. The relevance-gate verdict
/// is recorded in `accepted`; ranked output only keeps accepted results.
///
/// # Panics
///
/// Panics if `product` has no non-empty name.
#[must_use]
pub fn score_listing(product: &CanonicalProduct, listing: RetailerListing) -> MatchResult {
    let accepted = is_relevant(&listing.title, product);
    let confidence = if accepted {
        match_confidence(&listing.title, product)
    } else {
        0
    };
    MatchResult {
        listing,
        confidence,
        accepted,
    }
}

/// Builds the retailer search query: brand, name, and the first
/// identifier value, with punctuation stripped and whitespace collapsed.
///
/// # Panics
///
/// Panics if `product` has no non-empty name.
#[must_use]
pub fn build_search_query(product: &CanonicalProduct) -> String {
    let mut parts: Vec<&str> = Vec::new();
    if let Some(brand) = product.brand.as_deref().filter(|b| !b.trim().is_empty()) {
        parts.push(brand);
    }
    parts.push(product_name(product));
    if let Some(identifier) = product.identifiers.first() {
        parts.push(&identifier.value);
    }

    let joined = parts.join(" ");
    let cleaned: String = joined
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '_' {
                c
            } else {
                ' '
            }
        })
        .collect();
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
#[path = "matching_test.rs"]
mod matching_test;
