//! Lookup configuration and adapter registry construction.

use std::time::Duration;

use shelfscan_core::RateGovernor;

use crate::adapters::{
    BarcodeLookupAdapter, OpenFoodFactsAdapter, SourceAdapter, UpcItemDbAdapter,
};
use crate::error::LookupError;
use crate::resolve::Resolver;

/// Configuration for the lookup half of the engine.
///
/// The adapter registry is built from this struct at construction time
/// (no ambient globals). `UPCItemDB` and Open Food Facts are always
/// enabled; Barcode Lookup only when both its URL and API key are set.
#[derive(Debug, Clone)]
pub struct LookupConfig {
    pub upc_item_db_url: Option<String>,
    pub open_food_facts_url: Option<String>,
    pub barcode_lookup_url: Option<String>,
    pub barcode_lookup_api_key: Option<String>,
    /// Per-request HTTP timeout for each adapter, seconds.
    pub timeout_secs: u64,
    /// Additional attempts per adapter call on transient errors.
    pub max_retries: u32,
    pub backoff_base_ms: u64,
    /// Per-source deadline applied by the fan-out, milliseconds.
    pub per_source_timeout_ms: u64,
    /// Deadline for the whole fan-out operation, milliseconds.
    pub overall_deadline_ms: u64,
    /// Outbound rate limit: lookups admitted per caller per window.
    pub max_lookups_per_window: usize,
    pub window_ms: u64,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            upc_item_db_url: None,
            open_food_facts_url: None,
            barcode_lookup_url: None,
            barcode_lookup_api_key: None,
            timeout_secs: 5,
            max_retries: 2,
            backoff_base_ms: 500,
            per_source_timeout_ms: 5_000,
            overall_deadline_ms: 10_000,
            max_lookups_per_window: 10,
            window_ms: 60_000,
        }
    }
}

impl LookupConfig {
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
            upc_item_db_url: std::env::var("SHELFSCAN_UPC_ITEM_DB_URL").ok(),
            open_food_facts_url: std::env::var("SHELFSCAN_OPEN_FOOD_FACTS_URL").ok(),
            barcode_lookup_url: std::env::var("SHELFSCAN_BARCODE_LOOKUP_URL").ok(),
            barcode_lookup_api_key: std::env::var("SHELFSCAN_BARCODE_LOOKUP_API_KEY").ok(),
            ..Self::default()
        };

        parse_env("SHELFSCAN_LOOKUP_TIMEOUT_SECS", &mut config.timeout_secs, &mut invalid);
        parse_env("SHELFSCAN_LOOKUP_MAX_RETRIES", &mut config.max_retries, &mut invalid);
        parse_env("SHELFSCAN_LOOKUP_BACKOFF_BASE_MS", &mut config.backoff_base_ms, &mut invalid);
        parse_env(
            "SHELFSCAN_LOOKUP_PER_SOURCE_TIMEOUT_MS",
            &mut config.per_source_timeout_ms,
            &mut invalid,
        );
        parse_env(
            "SHELFSCAN_LOOKUP_OVERALL_DEADLINE_MS",
            &mut config.overall_deadline_ms,
            &mut invalid,
        );
        parse_env(
            "SHELFSCAN_LOOKUP_MAX_PER_WINDOW",
            &mut config.max_lookups_per_window,
            &mut invalid,
        );
        parse_env("SHELFSCAN_LOOKUP_WINDOW_MS", &mut config.window_ms, &mut invalid);

        if invalid.is_empty() {
            Ok(config)
        } else {
            Err(format!(
                "invalid lookup environment variables: {}",
                invalid.join(", ")
            ))
        }
    }

    /// Builds the adapter registry in source-priority order.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::Http`] if an HTTP client cannot be built.
    pub fn adapters(&self) -> Result<Vec<Box<dyn SourceAdapter>>, LookupError> {
        let mut adapters: Vec<Box<dyn SourceAdapter>> = Vec::new();

        let upc = match &self.upc_item_db_url {
            Some(url) => UpcItemDbAdapter::with_base_url(
                self.timeout_secs,
                self.max_retries,
                self.backoff_base_ms,
                url,
            )?,
            None => UpcItemDbAdapter::new(self.timeout_secs, self.max_retries, self.backoff_base_ms)?,
        };
        adapters.push(Box::new(upc));

        let off = match &self.open_food_facts_url {
            Some(url) => OpenFoodFactsAdapter::with_base_url(
                self.timeout_secs,
                self.max_retries,
                self.backoff_base_ms,
                url,
            )?,
            None => {
                OpenFoodFactsAdapter::new(self.timeout_secs, self.max_retries, self.backoff_base_ms)?
            }
        };
        adapters.push(Box::new(off));

        match (&self.barcode_lookup_url, &self.barcode_lookup_api_key) {
            (Some(url), Some(key)) => {
                adapters.push(Box::new(BarcodeLookupAdapter::new(
                    self.timeout_secs,
                    self.max_retries,
                    self.backoff_base_ms,
                    url,
                    key,
                )?));
            }
            _ => {
                tracing::debug!("barcode_lookup adapter disabled: URL or API key not configured");
            }
        }

        Ok(adapters)
    }

    /// Builds a ready-to-use resolver from this configuration.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::Http`] if an HTTP client cannot be built.
    pub fn resolver(&self) -> Result<Resolver, LookupError> {
        Ok(Resolver::new(
            self.adapters()?,
            RateGovernor::new(
                self.max_lookups_per_window,
                Duration::from_millis(self.window_ms),
            ),
            Duration::from_millis(self.per_source_timeout_ms),
            Duration::from_millis(self.overall_deadline_ms),
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_enable_the_two_keyless_adapters() {
        let adapters = LookupConfig::default().adapters().expect("build adapters");
        let tags: Vec<&str> = adapters.iter().map(|a| a.source_tag()).collect();
        assert_eq!(tags, vec!["upc_database", "open_food_facts"]);
    }

    #[test]
    fn barcode_lookup_requires_url_and_key() {
        let config = LookupConfig {
            barcode_lookup_url: Some("https://api.barcodelookup.example/v3/products".to_owned()),
            barcode_lookup_api_key: Some("key".to_owned()),
            ..LookupConfig::default()
        };
        let adapters = config.adapters().expect("build adapters");
        assert_eq!(adapters.len(), 3);
        assert_eq!(adapters[2].source_tag(), "barcode_lookup");
    }
}
