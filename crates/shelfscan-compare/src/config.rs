//! Comparison configuration and scraper registry construction.

use std::time::Duration;

use shelfscan_core::RateGovernor;

use crate::compare::PriceComparer;
use crate::error::CompareError;
use crate::scrape::{AmazonScraper, ListingScraper, ScraperRegistry, WalmartScraper};

/// Configuration for the price-comparison half of the engine.
#[derive(Debug, Clone)]
pub struct CompareConfig {
    /// Storefront base URL overrides, used by tests to point at mocks.
    pub amazon_url: Option<String>,
    pub walmart_url: Option<String>,
    /// Per-request HTTP timeout for each scraper, seconds.
    pub timeout_secs: u64,
    /// Per-retailer deadline applied by the fan-out, milliseconds.
    pub per_retailer_timeout_ms: u64,
    /// Default listing cap when the caller does not pass one.
    pub default_max_results: usize,
    /// Outbound rate limit: searches admitted per caller per window.
    pub max_searches_per_window: usize,
    pub window_ms: u64,
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            amazon_url: None,
            walmart_url: None,
            timeout_secs: 10,
            per_retailer_timeout_ms: 10_000,
            default_max_results: 5,
            max_searches_per_window: 10,
            window_ms: 60_000,
        }
    }
}

impl CompareConfig {
    /// Builds config from environment variables, falling back to
    /// defaults for anything unset.
    ///
    /// # Errors
    ///
    /// Returns an error string listing every variable that was set but
    /// could not be parsed.
    pub fn from_env() -> Result<Self, String> {
        let mut invalid = Vec::new();
        let mut config = Self {
            amazon_url: std::env::var("SHELFSCAN_AMAZON_URL").ok(),
            walmart_url: std::env::var("SHELFSCAN_WALMART_URL").ok(),
            ..Self::default()
        };

        parse_env("SHELFSCAN_SEARCH_TIMEOUT_SECS", &mut config.timeout_secs, &mut invalid);
        parse_env(
            "SHELFSCAN_SEARCH_PER_RETAILER_TIMEOUT_MS",
            &mut config.per_retailer_timeout_ms,
            &mut invalid,
        );
        parse_env(
            "SHELFSCAN_SEARCH_MAX_RESULTS",
            &mut config.default_max_results,
            &mut invalid,
        );
        parse_env(
            "SHELFSCAN_SEARCH_MAX_PER_WINDOW",
            &mut config.max_searches_per_window,
            &mut invalid,
        );
        parse_env("SHELFSCAN_SEARCH_WINDOW_MS", &mut config.window_ms, &mut invalid);

        if invalid.is_empty() {
            Ok(config)
        } else {
            Err(format!(
                "invalid compare environment variables: {}",
                invalid.join(", ")
            ))
        }
    }

    /// Builds the scraper registry.
    ///
    /// # Errors
    ///
    /// Returns [`CompareError::Http`] if an HTTP client cannot be built.
    pub fn registry(&self) -> Result<ScraperRegistry, CompareError> {
        let amazon: Box<dyn ListingScraper> = match &self.amazon_url {
            Some(url) => Box::new(AmazonScraper::with_base_url(self.timeout_secs, url)?),
            None => Box::new(AmazonScraper::new(self.timeout_secs)?),
        };
        let walmart: Box<dyn ListingScraper> = match &self.walmart_url {
            Some(url) => Box::new(WalmartScraper::with_base_url(self.timeout_secs, url)?),
            None => Box::new(WalmartScraper::new(self.timeout_secs)?),
        };
        Ok(ScraperRegistry::new(vec![amazon, walmart]))
    }

    /// Builds a ready-to-use comparer from this configuration.
    ///
    /// # Errors
    ///
    /// Returns [`CompareError::Http`] if an HTTP client cannot be built.
    pub fn comparer(&self) -> Result<PriceComparer, CompareError> {
        Ok(PriceComparer::new(
            self.registry()?,
            RateGovernor::new(
                self.max_searches_per_window,
                Duration::from_millis(self.window_ms),
            ),
            Duration::from_millis(self.per_retailer_timeout_ms),
            self.default_max_results,
        ))
    }
}

/// Overwrites `slot` with the parsed value of `key` when the variable is
/// set; records the key in `invalid` when it is set but unparseable.
fn parse_env<T: std::str::FromStr>(key: &str, slot: &mut T, invalid: &mut Vec<String>) {
    if let Ok(raw) = std::env::var(key) {
        match raw.parse() {
            Ok(value) => *slot = value,
            Err(_) => invalid.push(key.to_owned()),
        }
    }
}
