//! Retailer listing scrapers.
//!
//! Each retailer is a [`ListingScraper`] capability selected from the
//! [`ScraperRegistry`] by configuration key — page formats are entirely
//! the scraper's concern and opaque to the matching engine. Individual
//! result blocks that fail to parse are skipped, never fatal.

mod amazon;
mod walmart;

pub use amazon::AmazonScraper;
pub use walmart::WalmartScraper;

use std::time::Duration;

use futures::future::BoxFuture;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use regex::Regex;
use reqwest::Client;

use shelfscan_core::RetailerListing;

use crate::error::CompareError;

/// Browser-like profile; retailer storefronts block default
/// library user agents.
pub(crate) const BROWSER_UA: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// One retailer search capability.
pub trait ListingScraper: Send + Sync {
    /// Configuration key, e.g. `"amazon"`.
    fn retailer_key(&self) -> &'static str;

    /// Display name carried on listings, e.g. `"Amazon"`.
    fn retailer_name(&self) -> &'static str;

    /// Searches the retailer and returns up to `max_results` parsed
    /// listings.
    fn fetch_listings<'a>(
        &'a self,
        query: &'a str,
        max_results: usize,
    ) -> BoxFuture<'a, Result<Vec<RetailerListing>, CompareError>>;
}

/// Scrapers keyed by retailer, built from configuration at
/// construction time.
pub struct ScraperRegistry {
    scrapers: Vec<Box<dyn ListingScraper>>,
}

impl ScraperRegistry {
    #[must_use]
    pub fn new(scrapers: Vec<Box<dyn ListingScraper>>) -> Self {
        Self { scrapers }
    }

    /// Looks a scraper up by its configuration key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&dyn ListingScraper> {
        self.scrapers
            .iter()
            .find(|s| s.retailer_key() == key)
            .map(AsRef::as_ref)
    }

    /// All registered retailer keys, in registration order.
    #[must_use]
    pub fn keys(&self) -> Vec<&'static str> {
        self.scrapers.iter().map(|s| s.retailer_key()).collect()
    }
}

/// Builds the HTTP client shared shape for all scrapers.
pub(crate) fn build_client(timeout_secs: u64, user_agent: &str) -> Result<Client, CompareError> {
    let client = Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .user_agent(user_agent)
        .build()?;
    Ok(client)
}

/// Fetches a search page and returns its body, mapping non-2xx statuses
/// to [`CompareError::UnexpectedStatus`].
pub(crate) async fn fetch_page(client: &Client, url: &str) -> Result<String, CompareError> {
    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(CompareError::UnexpectedStatus {
            status: status.as_u16(),
            url: url.to_owned(),
        });
    }
    let body = response.text().await?;
    Ok(body)
}

/// Percent-encodes a search query for a URL query parameter.
pub(crate) fn encode_query(query: &str) -> String {
    utf8_percent_encode(query, NON_ALPHANUMERIC).to_string()
}

/// Splits a page into blocks starting at each occurrence of `marker`.
/// The slice before the first marker is discarded.
pub(crate) fn split_blocks<'a>(html: &'a str, marker: &str) -> Vec<&'a str> {
    let starts: Vec<usize> = html.match_indices(marker).map(|(i, _)| i).collect();
    starts
        .iter()
        .enumerate()
        .map(|(n, &start)| {
            let end = starts.get(n + 1).copied().unwrap_or(html.len());
            &html[start..end]
        })
        .collect()
}

/// Removes markup tags and collapses whitespace in captured inner HTML.
pub(crate) fn strip_tags(fragment: &str) -> String {
    let tags = Regex::new(r"(?is)<[^>]+>").expect("valid tags regex");
    let text = tags.replace_all(fragment, " ");
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Resolves a possibly relative listing href against the retailer origin.
pub(crate) fn absolute_url(base_url: &str, href: &str) -> String {
    if href.starts_with("http://") || href.starts_with("https://") {
        href.to_owned()
    } else {
        format!("{}{href}", base_url.trim_end_matches('/'))
    }
}
