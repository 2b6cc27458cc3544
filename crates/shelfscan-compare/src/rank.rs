//! Ranking of accepted listings and savings arithmetic.

use serde::Serialize;

use shelfscan_core::{CanonicalProduct, MatchResult, RetailerListing};

use crate::matching::score_listing;

/// Ranked comparison output for one product.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonReport {
    /// Accepted listings, cheapest first; price ties broken by
    /// descending confidence.
    pub results: Vec<MatchResult>,
    /// Price of the cheapest accepted listing.
    pub best_price: Option<f64>,
    /// Amount saved versus the product's reference price. Zero when no
    /// listing beats it or no reference price is known.
    pub savings: f64,
    /// Savings as a percentage of the reference price, rounded to the
    /// nearest integer.
    pub savings_percentage: u32,
    /// How many retailers the listings were drawn from.
    pub searched_retailers: usize,
}

/// Gates, scores, and ranks `listings` against `product`.
///
/// Listings failing the relevance gate are absent from the output, not
/// scored at zero. Accepted listings are sorted ascending by price
/// (ties → descending confidence) and only then truncated to
/// `max_results` — truncating first could drop a cheaper late-scanned
/// listing. Savings are computed against
/// `product.suggested_price`.
///
/// # Panics
///
/// Panics if `product` has no non-empty name (see
/// [`crate::matching::score_listing`]).
#[must_use]
pub fn match_listings(
    product: &CanonicalProduct,
    listings: Vec<RetailerListing>,
    max_results: Option<usize>,
) -> ComparisonReport {
    let searched_retailers = {
        let mut retailers: Vec<&str> = listings.iter().map(|l| l.retailer.as_str()).collect();
        retailers.sort_unstable();
        retailers.dedup();
        retailers.len()
    };

    let mut results: Vec<MatchResult> = listings
        .into_iter()
        .map(|listing| score_listing(product, listing))
        .filter(|result| result.accepted)
        .collect();

    results.sort_by(|a, b| {
        a.listing
            .price
            .total_cmp(&b.listing.price)
            .then(b.confidence.cmp(&a.confidence))
    });

    if let Some(max) = max_results {
        results.truncate(max);
    }

    let best_price = results.first().map(|r| r.listing.price);
    let (savings, savings_percentage) = savings_against(product.suggested_price, best_price);

    ComparisonReport {
        results,
        best_price,
        savings,
        savings_percentage,
        searched_retailers,
    }
}

/// Savings amount and rounded percentage versus a reference price.
fn savings_against(reference: Option<f64>, best_price: Option<f64>) -> (f64, u32) {
    let (Some(reference), Some(best)) = (reference, best_price) else {
        return (0.0, 0);
    };
    if best >= reference || reference <= 0.0 {
        return (0.0, 0);
    }
    let savings = reference - best;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let percentage = ((savings / reference) * 100.0).round() as u32;
    (savings, percentage)
}

#[cfg(test)]
#[path = "rank_test.rs"]
mod rank_test;
