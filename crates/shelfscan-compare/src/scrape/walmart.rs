//! Walmart search result scraper.

use futures::future::BoxFuture;
use futures::FutureExt;
use regex::Regex;
use reqwest::Client;

use shelfscan_core::RetailerListing;

use crate::error::CompareError;
use crate::scrape::{
    absolute_url, build_client, encode_query, fetch_page, split_blocks, strip_tags, ListingScraper,
    BROWSER_UA,
};

const DEFAULT_BASE_URL: &str = "https://www.walmart.com";
const RESULT_MARKER: &str = r#"data-testid="item-stack""#;

/// Scraper for Walmart search pages (`/search?q=<query>`).
pub struct WalmartScraper {
    client: Client,
    base_url: String,
}

impl WalmartScraper {
    /// Creates a scraper pointed at the production storefront.
    ///
    /// # Errors
    ///
    /// Returns [`CompareError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(timeout_secs: u64) -> Result<Self, CompareError> {
        Self::with_base_url(timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a scraper with a custom base URL (for wiremock tests).
    ///
    /// # Errors
    ///
    /// Returns [`CompareError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn with_base_url(timeout_secs: u64, base_url: &str) -> Result<Self, CompareError> {
        Ok(Self {
            client: build_client(timeout_secs, BROWSER_UA)?,
            base_url: base_url.trim_end_matches('/').to_owned(),
        })
    }

    async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<RetailerListing>, CompareError> {
        let url = format!("{}/search?q={}", self.base_url, encode_query(query));
        let html = fetch_page(&self.client, &url).await?;
        let listings = parse_search_results(&html, &self.base_url, max_results);
        tracing::debug!(
            retailer = "walmart",
            query,
            count = listings.len(),
            "parsed search results"
        );
        Ok(listings)
    }
}

/// Parses item-stack blocks into listings. Prefers the microdata
/// `content` attribute for prices, falling back to the element text.
pub(crate) fn parse_search_results(
    html: &str,
    base_url: &str,
    max_results: usize,
) -> Vec<RetailerListing> {
    let title_re = Regex::new(r#"(?is)data-automation-id="product-title"[^>]*>(.*?)</"#)
        .expect("valid title regex");
    let price_attr_re =
        Regex::new(r#"(?is)itemprop="price"[^>]*content="([^"]+)""#).expect("valid price regex");
    let price_text_re =
        Regex::new(r#"(?is)itemprop="price"[^>]*>([^<]+)<"#).expect("valid price regex");
    let link_re = Regex::new(r#"(?is)<a[^>]*href="([^"]+)""#).expect("valid link regex");
    let image_re = Regex::new(r#"(?is)<img[^>]*src="([^"]+)""#).expect("valid image regex");

    let mut listings = Vec::new();
    for block in split_blocks(html, RESULT_MARKER) {
        if listings.len() >= max_results {
            break;
        }

        let Some(title) = title_re
            .captures(block)
            .and_then(|cap| cap.get(1))
            .map(|m| strip_tags(m.as_str()))
            .filter(|t| !t.is_empty())
        else {
            continue;
        };

        let raw_price = price_attr_re
            .captures(block)
            .and_then(|cap| cap.get(1))
            .map(|m| m.as_str().to_owned())
            .or_else(|| {
                price_text_re
                    .captures(block)
                    .and_then(|cap| cap.get(1))
                    .map(|m| {
                        m.as_str()
                            .chars()
                            .filter(|c| c.is_ascii_digit() || *c == '.')
                            .collect()
                    })
            });
        let Some(price) = raw_price.and_then(|p| p.parse::<f64>().ok()) else {
            continue;
        };

        let url = link_re
            .captures(block)
            .and_then(|cap| cap.get(1))
            .map(|m| absolute_url(base_url, m.as_str()));
        let image_url = image_re
            .captures(block)
            .and_then(|cap| cap.get(1))
            .map(|m| m.as_str().to_owned());

        listings.push(RetailerListing {
            retailer: "Walmart".to_owned(),
            title,
            price,
            currency: "USD".to_owned(),
            url,
            image_url,
        });
    }
    listings
}

impl ListingScraper for WalmartScraper {
    fn retailer_key(&self) -> &'static str {
        "walmart"
    }

    fn retailer_name(&self) -> &'static str {
        "Walmart"
    }

    fn fetch_listings<'a>(
        &'a self,
        query: &'a str,
        max_results: usize,
    ) -> BoxFuture<'a, Result<Vec<RetailerListing>, CompareError>> {
        self.search(query, max_results).boxed()
    }
}
