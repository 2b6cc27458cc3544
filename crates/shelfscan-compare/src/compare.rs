//! Live price comparison across retailers.

use std::time::Duration;

use futures::future::join_all;

use shelfscan_core::{CanonicalProduct, RateGovernor, RetailerListing};

use crate::error::CompareError;
use crate::matching::build_search_query;
use crate::rank::{match_listings, ComparisonReport};
use crate::scrape::ScraperRegistry;

/// Searches the configured retailers for a canonical product and ranks
/// the relevant listings by price.
///
/// Retailer failures and timeouts are absorbed: a retailer that
/// contributes nothing is indistinguishable from one never searched.
pub struct PriceComparer {
    registry: ScraperRegistry,
    governor: RateGovernor,
    per_retailer_timeout: Duration,
    default_max_results: usize,
}

impl PriceComparer {
    #[must_use]
    pub fn new(
        registry: ScraperRegistry,
        governor: RateGovernor,
        per_retailer_timeout: Duration,
        default_max_results: usize,
    ) -> Self {
        Self {
            registry,
            governor,
            per_retailer_timeout,
            default_max_results,
        }
    }

    /// Compares prices for `product` across `retailer_keys`.
    ///
    /// Unknown keys are logged and skipped. `max_results` defaults to
    /// the configured value; truncation happens after ranking.
    ///
    /// # Errors
    ///
    /// Returns [`CompareError::RateLimited`] if the governor rejects
    /// the caller. An empty market is not an error: the report simply
    /// carries no results.
    ///
    /// # Panics
    ///
    /// Panics if `product` has no non-empty name (see
    /// [`crate::matching::build_search_query`]).
    pub async fn compare(
        &self,
        caller_key: &str,
        product: &CanonicalProduct,
        retailer_keys: &[String],
        max_results: Option<usize>,
    ) -> Result<ComparisonReport, CompareError> {
        if !self.governor.admit(caller_key) {
            return Err(CompareError::RateLimited {
                caller: caller_key.to_owned(),
            });
        }

        let max = max_results.unwrap_or(self.default_max_results);
        let query = build_search_query(product);

        let scrapers: Vec<_> = retailer_keys
            .iter()
            .filter_map(|key| {
                let scraper = self.registry.get(key);
                if scraper.is_none() {
                    tracing::warn!(retailer = key.as_str(), "no scraper registered for retailer");
                }
                scraper
            })
            .collect();

        let timeout_ms =
            u64::try_from(self.per_retailer_timeout.as_millis()).unwrap_or(u64::MAX);
        let searches = scrapers.iter().map(|scraper| {
            let query = query.as_str();
            async move {
                let outcome =
                    tokio::time::timeout(self.per_retailer_timeout, scraper.fetch_listings(query, max))
                        .await
                        .unwrap_or_else(|_| {
                            Err(CompareError::Timeout {
                                retailer: scraper.retailer_name().to_owned(),
                                timeout_ms,
                            })
                        });
                (scraper.retailer_key(), outcome)
            }
        });

        let mut listings: Vec<RetailerListing> = Vec::new();
        for (key, outcome) in join_all(searches).await {
            match outcome {
                Ok(found) => {
                    tracing::debug!(retailer = key, count = found.len(), "retailer answered");
                    listings.extend(found);
                }
                Err(e) => {
                    tracing::warn!(retailer = key, error = %e, "retailer search failed");
                }
            }
        }

        let mut report = match_listings(product, listings, Some(max));
        report.searched_retailers = scrapers.len();
        Ok(report)
    }
}
